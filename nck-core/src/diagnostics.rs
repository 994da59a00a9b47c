//! Diagnostic data structures for reporting modem runs.

use serde::{Deserialize, Serialize};

/// Per-symbol demodulation trace: the lag-1 statistic sampled at each
/// symbol boundary, alongside the smoothed value actually used for slicing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemodulationDiagnostics {
    pub lag1_raw: Vec<f64>,
    pub lag1_smoothed: Vec<f64>,
    pub symbol_samples: Vec<f64>,
    pub barker_timing_error: Option<i64>,
}

/// Summary of one encode/channel/decode round trip.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimulationReport {
    pub pre_fec_errors: usize,
    pub pre_fec_ber: f64,
    pub post_fec_errors: usize,
    pub post_fec_ber: f64,
    pub frame_error: bool,
}

/// Bundle returned alongside a decoded payload for CLI/telemetry use.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiagnosticsBundle {
    pub encoding_logs: Vec<String>,
    pub decoding_logs: Vec<String>,
    pub demodulation: DemodulationDiagnostics,
    pub report: SimulationReport,
}

/// Calculate Bit Error Rate between transmitted and received bits.
///
/// Returns the fraction of mismatched bits over the shorter of the two
/// sequences; `0.0` for empty input.
pub fn compute_ber(tx_bits: &[u8], rx_bits: &[u8]) -> f64 {
    if tx_bits.is_empty() || rx_bits.is_empty() {
        return 0.0;
    }

    let count = tx_bits.len().min(rx_bits.len());
    let errors = (0..count).filter(|&i| tx_bits[i] != rx_bits[i]).count();

    errors as f64 / count as f64
}

/// Calculate Frame Error Rate: the fraction of frames with at least one
/// bit error, given a per-frame bit-error count.
pub fn compute_fer(errors_per_frame: &[usize]) -> f64 {
    if errors_per_frame.is_empty() {
        return 0.0;
    }
    let failed = errors_per_frame.iter().filter(|&&e| e > 0).count();
    failed as f64 / errors_per_frame.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundle_is_empty() {
        let bundle = DiagnosticsBundle::default();
        assert!(bundle.demodulation.lag1_raw.is_empty());
        assert_eq!(bundle.report.pre_fec_errors, 0);
    }

    #[test]
    fn ber_zero_for_perfect_match() {
        let bits = vec![0, 1, 0, 1, 1, 0];
        assert_eq!(compute_ber(&bits, &bits), 0.0);
    }

    #[test]
    fn ber_calculation() {
        let tx = vec![0, 1, 0, 1, 1, 0, 1, 0];
        let rx = vec![0, 1, 1, 1, 1, 0, 0, 0]; // 2 errors out of 8
        assert!((compute_ber(&tx, &rx) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn fer_counts_any_error_as_a_frame_failure() {
        let per_frame = vec![0, 2, 0, 1];
        assert!((compute_fer(&per_frame) - 0.5).abs() < 1e-9);
    }
}
