//! NCK waveform detection.
//!
//! The mirror image of [`crate::modulator`]: an optional bandpass strips
//! out-of-band noise, the signal is mixed back to baseband and resampled to
//! `2*BW`, a streaming lag-1 autocorrelation recovers the per-sample hue
//! statistic, a lowpass at the keying rate smooths it, and the result is
//! sampled once per symbol and sliced into symbol values.

use std::f64::consts::PI;

use crate::config::ModemConfig;
use crate::dsp::{resample, SosFilter};
use crate::errors::Result;
use crate::lag1::lag1_stream;

const BANDPASS_ORDER: usize = 10;
const SMOOTHING_ORDER: usize = 2;

/// Recovered symbol stream plus the smoothed per-sample statistic it was
/// sliced from, kept around for diagnostics (eye-diagram style plots, BER
/// residual analysis).
#[derive(Debug, Clone)]
pub struct DemodResult {
    pub symbols: Vec<u8>,
    /// The smoothed statistic sampled at each symbol's decision point, in
    /// the same order as `symbols`. Soft-decision FEC derives its
    /// log-likelihood ratios from these rather than from the hard symbol
    /// values.
    pub symbol_stats: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub msg_start: usize,
}

/// Optional 10th-order zero-phase Butterworth bandpass ahead of mixing.
/// Skipped entirely for `0 < CF < BW`, where the passband would straddle DC
/// closely enough that a bandpass does more harm than good.
fn prefilter(cfg: &ModemConfig, signal: &[f64]) -> Vec<f64> {
    if cfg.cf <= 0.0 || cfg.cf < cfg.bw {
        return signal.to_vec();
    }
    let filt = SosFilter::butter_bandpass(BANDPASS_ORDER, cfg.cf, cfg.bw, cfg.fs);
    filt.filtfilt(signal)
}

/// Mix the (optionally prefiltered) signal down to baseband at `FS`, then
/// resample to the `2*BW` working rate used by lag-1 estimation. Returns
/// the baseband samples and whether the hue statistic must be negated
/// downstream (the two-stage `0 < CF < BW` path flips sign relative to the
/// single-stage path, mirroring the modulator's product-to-sum image).
fn mix_to_baseband(cfg: &ModemConfig, signal: &[f64]) -> (Vec<f64>, bool) {
    if cfg.cf <= 0.0 {
        return (resample(signal, cfg.fs, cfg.working_rate()), false);
    }

    if cfg.cf >= cfg.bw {
        let carrier = cfg.cf - cfg.bw / 2.0;
        let mixed: Vec<f64> = signal
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (2.0 * PI * carrier * i as f64 / cfg.fs).cos())
            .collect();
        (resample(&mixed, cfg.fs, cfg.working_rate()), false)
    } else {
        let mid_carrier = cfg.fs / 2.0 - cfg.bw / 2.0;
        let target_carrier = cfg.cf + cfg.bw / 2.0;
        let shift = mid_carrier - target_carrier;

        let stage1: Vec<f64> = signal
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (2.0 * PI * mid_carrier * i as f64 / cfg.fs).cos())
            .collect();
        let stage2: Vec<f64> = stage1
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (2.0 * PI * shift * i as f64 / cfg.fs).cos())
            .collect();
        (resample(&stage2, cfg.fs, cfg.working_rate()), true)
    }
}

fn peak_normalize(samples: &[f64]) -> Vec<f64> {
    let peak = samples.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak < 1e-12 {
        samples.to_vec()
    } else {
        samples.iter().map(|&x| x / peak).collect()
    }
}

/// Slice one symbol's smoothed statistic `v` into a symbol value.
/// `M=2` is a sign decision; `M=3`/`M=4` quantize into `M` equal bands
/// spanning `[-mx, mx]` where `mx = 0.9 * max(|min|, |max|)` over the whole
/// smoothed stream.
fn slice_symbol(v: f64, m_ary: u8, mx: f64) -> u8 {
    if m_ary == 2 {
        return if v < 0.0 { 1 } else { 0 };
    }
    let mi = -mx;
    let band_width = (mx - mi) / m_ary as f64;
    let mut band = ((v - mi) / band_width).floor() as i64;
    band = band.clamp(0, m_ary as i64 - 1);
    band as u8
}

/// Demodulate `signal` (captured at `cfg.fs`) into a symbol stream.
/// `msg_start` is the sample index (at `cfg.fs`) of the first ramp-up
/// sample; the demodulator converts it to a working-rate offset so the
/// first symbol-center sampling point lines up with the modulator's
/// layout.
pub fn demodulate(cfg: &ModemConfig, signal: &[f64], msg_start: usize) -> Result<DemodResult> {
    cfg.validate()?;
    let w = cfg.samples_per_symbol()?;

    let filtered = prefilter(cfg, signal);
    let (baseband, invert) = mix_to_baseband(cfg, &filtered);
    let baseband = peak_normalize(&baseband);

    let r1 = lag1_stream(&baseband, w);
    let discard = 2 * w;
    let r1_trimmed: Vec<f64> = if r1.len() > discard {
        r1[discard..].to_vec()
    } else {
        Vec::new()
    };

    let smoother = SosFilter::butter_lowpass(SMOOTHING_ORDER, cfg.kr, cfg.working_rate());
    let mut smoothed = smoother.filtfilt(&r1_trimmed);
    if invert {
        for v in smoothed.iter_mut() {
            *v = -*v;
        }
    }

    let working_msg_start = ((msg_start as f64) * cfg.working_rate() / cfg.fs).round() as i64;
    let start = (working_msg_start - discard as i64).max(0) as usize;

    let mx = 0.9
        * smoothed
            .iter()
            .fold(0.0f64, |acc, &v| acc.max(v.abs()));

    let mut symbols = Vec::new();
    let mut symbol_stats = Vec::new();
    let mut pos = start;
    while pos < smoothed.len() {
        symbols.push(slice_symbol(smoothed[pos], cfg.m_ary, mx));
        symbol_stats.push(smoothed[pos]);
        pos += w;
    }

    Ok(DemodResult {
        symbols,
        symbol_stats,
        smoothed,
        msg_start: start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulator::modulate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn baseband_loopback_recovers_symbols_at_high_snr() {
        let cfg = ModemConfig {
            cf: 0.0,
            fs: 8_000.0,
            bw: 200.0,
            kr: 20.0,
            m_ary: 2,
            ..ModemConfig::default()
        };
        cfg.validate().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let symbols = vec![0u8, 1, 0, 0, 1, 1, 0, 1];
        let signal = modulate(&cfg, &symbols, &mut rng).unwrap();

        let w = cfg.samples_per_symbol().unwrap();
        let msg_start = (w as f64 * cfg.fs / cfg.working_rate()).round() as usize;
        let result = demodulate(&cfg, &signal, msg_start).unwrap();
        assert!(!result.symbols.is_empty());
        assert!(result.smoothed.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn slice_symbol_binary_matches_sign_rule() {
        assert_eq!(slice_symbol(-0.5, 2, 1.0), 1);
        assert_eq!(slice_symbol(0.5, 2, 1.0), 0);
        assert_eq!(slice_symbol(0.0, 2, 1.0), 0);
    }

    #[test]
    fn slice_symbol_quaternary_spans_four_bands() {
        let mx = 1.0;
        assert_eq!(slice_symbol(-0.99, 4, mx), 0);
        assert_eq!(slice_symbol(-0.4, 4, mx), 1);
        assert_eq!(slice_symbol(0.4, 4, mx), 2);
        assert_eq!(slice_symbol(0.99, 4, mx), 3);
    }

    #[test]
    fn two_stage_demod_path_runs_without_panicking() {
        let cfg = ModemConfig {
            fs: 48_000.0,
            cf: 30.0,
            bw: 50.0,
            kr: 5.0,
            m_ary: 2,
            ..ModemConfig::default()
        };
        cfg.validate().unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let symbols = vec![0u8, 1, 0];
        let signal = modulate(&cfg, &symbols, &mut rng).unwrap();
        let result = demodulate(&cfg, &signal, 0).unwrap();
        assert!(result.smoothed.iter().all(|v| v.is_finite()));
    }
}
