//! Aggregates per-round simulation reports into run-level statistics.

use nck_core::diagnostics::SimulationReport;

use crate::logging::StatSummary;

/// Running min/mean/max/variance accumulator for one observed quantity.
#[derive(Debug, Clone, Default)]
struct RunningStat {
    count: usize,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl RunningStat {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn summary(&self) -> StatSummary {
        if self.count == 0 {
            return StatSummary {
                mean: 0.0,
                stddev: 0.0,
                min: 0.0,
                max: 0.0,
                samples: 0,
            };
        }
        let mean = self.sum / self.count as f64;
        let variance = (self.sum_sq / self.count as f64 - mean * mean).max(0.0);
        StatSummary {
            mean,
            stddev: variance.sqrt(),
            min: self.min,
            max: self.max,
            samples: self.count,
        }
    }
}

/// Collects [`SimulationReport`]s across repeated encode/channel/decode
/// trials, e.g. for an SNR sweep.
#[derive(Debug, Clone, Default)]
pub struct TelemetryAggregator {
    pre_fec_ber: RunningStat,
    post_fec_ber: RunningStat,
    frame_errors: usize,
    trials: usize,
}

impl TelemetryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &SimulationReport) {
        self.pre_fec_ber.push(report.pre_fec_ber);
        self.post_fec_ber.push(report.post_fec_ber);
        if report.frame_error {
            self.frame_errors += 1;
        }
        self.trials += 1;
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn frame_error_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.frame_errors as f64 / self.trials as f64
        }
    }

    pub fn pre_fec_ber_summary(&self) -> StatSummary {
        self.pre_fec_ber.summary()
    }

    pub fn post_fec_ber_summary(&self) -> StatSummary {
        self.post_fec_ber.summary()
    }

    pub fn frame_errors(&self) -> usize {
        self.frame_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(pre: f64, post: f64, frame_error: bool) -> SimulationReport {
        SimulationReport {
            pre_fec_errors: 0,
            pre_fec_ber: pre,
            post_fec_errors: 0,
            post_fec_ber: post,
            frame_error,
        }
    }

    #[test]
    fn aggregates_mean_across_trials() {
        let mut agg = TelemetryAggregator::new();
        agg.record(&report(0.1, 0.0, false));
        agg.record(&report(0.3, 0.0, false));
        assert_eq!(agg.trials(), 2);
        assert!((agg.pre_fec_ber_summary().mean - 0.2).abs() < 1e-9);
    }

    #[test]
    fn frame_error_rate_counts_failed_trials() {
        let mut agg = TelemetryAggregator::new();
        agg.record(&report(0.0, 0.0, false));
        agg.record(&report(0.5, 0.2, true));
        assert!((agg.frame_error_rate() - 0.5).abs() < 1e-9);
        assert_eq!(agg.frame_errors(), 1);
    }

    #[test]
    fn empty_aggregator_reports_zeroed_summary() {
        let agg = TelemetryAggregator::new();
        let summary = agg.post_fec_ber_summary();
        assert_eq!(summary.samples, 0);
        assert_eq!(agg.frame_error_rate(), 0.0);
    }
}
