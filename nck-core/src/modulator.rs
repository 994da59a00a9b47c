//! NCK waveform synthesis.
//!
//! A symbol stream becomes audio in three stages: a raised-cosine ramp-up,
//! one colored-noise block per symbol (at the `2*BW` working rate), and a
//! matching ramp-down, followed by upmixing to the configured center
//! frequency and a final resample to `FS`. Baseband (`CF == 0`) signals skip
//! the upmixing stage entirely.

use std::f64::consts::PI;

use rand::Rng;

use crate::config::{FilterMode, Hue, ModemConfig};
use crate::dsp::resample;
use crate::errors::Result;
use crate::noise::{colored_noise, white_noise, ShapingForm};

fn shaping_form(mode: FilterMode) -> ShapingForm {
    match mode {
        FilterMode::Iir => ShapingForm::Fir,
        FilterMode::Fft => ShapingForm::Fft,
    }
}

/// Raised-cosine ramp envelope: rising (`0.5*(1-cos(pi*i/w))`) ahead of the
/// first symbol, falling (`0.5*(cos(pi*i/w)-1)`) after the last, each
/// applied to an independent draw of white noise so the transmission starts
/// and ends without a hard edge.
fn ramp(w: usize, rising: bool, rng: &mut impl Rng) -> Vec<f64> {
    let carrier = white_noise(w, rng);
    (0..w)
        .map(|i| {
            let phase = PI * i as f64 / w as f64;
            let envelope = if rising {
                0.5 * (1.0 - phase.cos())
            } else {
                0.5 * (phase.cos() - 1.0)
            };
            carrier[i] * envelope
        })
        .collect()
}

/// Map a symbol value to its transmitted hue, applying the binary
/// spectral-inversion rule: when up-converting (`CF > 0`) a binary (`M=2`)
/// stream, the hue index is flipped before lookup so that after upmixing
/// the recovered baseband hue matches what the demodulator expects.
fn symbol_hue(cfg: &ModemConfig, symbol: u8) -> Hue {
    let table = cfg.hue_table();
    let index = if cfg.cf > 0.0 && cfg.m_ary == 2 {
        1 - symbol as usize
    } else {
        symbol as usize
    };
    table[index]
}

/// Synthesize the baseband (working-rate) burst: ramp-up, one noise block
/// per symbol, ramp-down.
fn synthesize_baseband(cfg: &ModemConfig, symbols: &[u8], w: usize, rng: &mut impl Rng) -> Vec<f64> {
    let form = shaping_form(cfg.filter_mode);
    let mut out = Vec::with_capacity(w * (symbols.len() + 2));
    out.extend(ramp(w, true, rng));
    for &symbol in symbols {
        let hue = symbol_hue(cfg, symbol);
        out.extend(colored_noise(w, hue, form, rng));
    }
    out.extend(ramp(w, false, rng));
    out
}

/// Single-stage upmix for `CF >= BW`: resample to the rate implied by the
/// `(CF+BW/2)/BW` scale factor, then mix by a cosine at the shifted carrier
/// `CF+BW/2`.
fn upmix_single_stage(baseband: &[f64], working_rate: f64, cf: f64, bw: f64) -> (Vec<f64>, f64) {
    let carrier = cf + bw / 2.0;
    let factor = carrier / bw;
    let intermediate_rate = working_rate * factor;
    let resampled = resample(baseband, working_rate, intermediate_rate);
    let mixed: Vec<f64> = resampled
        .iter()
        .enumerate()
        .map(|(i, &x)| x * (2.0 * PI * carrier * i as f64 / intermediate_rate).cos())
        .collect();
    (mixed, intermediate_rate)
}

/// Two-stage upmix for `0 < CF < BW`, where mixing directly by `CF+BW/2`
/// would leave too little room below Nyquist. The signal is first carried
/// up to `FS/2-BW/2`, then mixed down by the remaining difference to land
/// on `CF+BW/2`; the product-to-sum identity leaves an image at the sum
/// frequency which the final resample to `FS` discards.
fn upmix_two_stage(baseband: &[f64], working_rate: f64, cf: f64, bw: f64, fs: f64) -> (Vec<f64>, f64) {
    let mid_carrier = fs / 2.0 - bw / 2.0;
    let target_carrier = cf + bw / 2.0;
    let shift = mid_carrier - target_carrier;

    let stage1 = resample(baseband, working_rate, fs);
    let stage1_mixed: Vec<f64> = stage1
        .iter()
        .enumerate()
        .map(|(i, &x)| x * (2.0 * PI * mid_carrier * i as f64 / fs).cos())
        .collect();
    let stage2_mixed: Vec<f64> = stage1_mixed
        .iter()
        .enumerate()
        .map(|(i, &x)| x * (2.0 * PI * shift * i as f64 / fs).cos())
        .collect();
    (stage2_mixed, fs)
}

/// Synthesize the full transmitted waveform for `symbols` at `cfg.fs`.
/// Config invariants are validated eagerly so construction-time mistakes
/// never surface mid-modulation.
pub fn modulate(cfg: &ModemConfig, symbols: &[u8], rng: &mut impl Rng) -> Result<Vec<f64>> {
    cfg.validate()?;
    let w = cfg.samples_per_symbol()?;
    let working_rate = cfg.working_rate();

    let baseband = synthesize_baseband(cfg, symbols, w, rng);

    if cfg.cf <= 0.0 {
        return Ok(resample(&baseband, working_rate, cfg.fs));
    }

    let (upmixed, upmixed_rate) = if cfg.cf >= cfg.bw {
        upmix_single_stage(&baseband, working_rate, cfg.cf, cfg.bw)
    } else {
        upmix_two_stage(&baseband, working_rate, cfg.cf, cfg.bw, cfg.fs)
    };

    Ok(resample(&upmixed, upmixed_rate, cfg.fs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn baseband_output_length_matches_symbol_count() {
        let cfg = ModemConfig {
            cf: 0.0,
            ..ModemConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let symbols = vec![0u8, 1, 0, 1, 1];
        let out = modulate(&cfg, &symbols, &mut rng).unwrap();

        let w = cfg.samples_per_symbol().unwrap();
        let expected_working_samples = w * (symbols.len() + 2);
        let expected_len = (expected_working_samples as f64 * cfg.fs / cfg.working_rate()).round() as usize;
        assert!((out.len() as i64 - expected_len as i64).abs() <= 2);
    }

    #[test]
    fn passband_output_is_nonzero() {
        let cfg = ModemConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let symbols = vec![0u8, 1, 1, 0];
        let out = modulate(&cfg, &symbols, &mut rng).unwrap();
        let energy: f64 = out.iter().map(|x| x * x).sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn two_stage_upmix_path_runs_for_small_carrier() {
        let cfg = ModemConfig {
            fs: 48_000.0,
            cf: 30.0,
            bw: 50.0,
            kr: 5.0,
            m_ary: 2,
            ..ModemConfig::default()
        };
        cfg.validate().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let out = modulate(&cfg, &[0, 1, 0], &mut rng).unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn invalid_config_fails_before_synthesis() {
        let cfg = ModemConfig {
            kr: 7.0,
            ..ModemConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        assert!(modulate(&cfg, &[0, 1], &mut rng).is_err());
    }
}
