//! FFT-based resampling shared by the modulator's upmixing stage and the
//! demodulator's downmixing stage.
//!
//! NCK resamples at arbitrary, non-integer ratios (e.g. synthesizing a
//! burst at `2*BW` then lifting it to `FS`), so a polyphase or rational
//! resampler is overkill; instead this mirrors the FFT-domain approach the
//! reference implementation uses: take the DFT of the whole block, either
//! zero-pad (upsample) or truncate (downsample) the spectrum around DC, and
//! inverse-transform back, scaling for the new block length.

use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

/// Resample a real-valued signal from `from_rate` to `to_rate` using
/// frequency-domain zero-padding/truncation. The output length is
/// `round(input.len() * to_rate / from_rate)`.
pub fn resample(input: &[f64], from_rate: f64, to_rate: f64) -> Vec<f64> {
    if input.is_empty() || (from_rate - to_rate).abs() < 1e-9 {
        return input.to_vec();
    }

    let n_in = input.len();
    let n_out = ((n_in as f64) * to_rate / from_rate).round().max(1.0) as usize;

    let mut planner = FftPlanner::<f32>::new();
    let fft_fwd = planner.plan_fft_forward(n_in);
    let fft_inv = planner.plan_fft_inverse(n_out);

    let mut spectrum: Vec<Complex32> = input
        .iter()
        .map(|&x| Complex32::new(x as f32, 0.0))
        .collect();
    fft_fwd.process(&mut spectrum);

    let mut resized = vec![Complex32::new(0.0, 0.0); n_out];
    let half_in = n_in / 2;
    let half_out = n_out / 2;
    let half = half_in.min(half_out);

    // Positive frequencies (including DC) and negative frequencies, copied
    // symmetrically into the resized spectrum so the block stays real after
    // the inverse transform.
    for k in 0..=half {
        if k < n_in && k < n_out {
            resized[k] = spectrum[k];
        }
    }
    for k in 1..half {
        let src = n_in - k;
        let dst = n_out - k;
        resized[dst] = spectrum[src];
    }

    fft_inv.process(&mut resized);

    let scale = 1.0 / n_in as f32;
    resized.iter().map(|c| (c.re * scale) as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_preserves_length_ratio() {
        let input = vec![0.0; 1000];
        let out = resample(&input, 48_000.0, 8_000.0);
        assert!((out.len() as f64 - 1000.0 * 8_000.0 / 48_000.0).abs() < 2.0);
    }

    #[test]
    fn upsampling_preserves_low_frequency_tone() {
        let fs_in = 1_000.0;
        let fs_out = 4_000.0;
        let freq = 50.0;
        let n = 200;
        let input: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs_in).sin())
            .collect();

        let out = resample(&input, fs_in, fs_out);
        let rms = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt();

        assert!(rms(&out) > 0.3, "resampled tone lost energy: rms={}", rms(&out));
    }

    #[test]
    fn identity_when_rates_match() {
        let input = vec![1.0, 2.0, 3.0, -1.0];
        let out = resample(&input, 100.0, 100.0);
        assert_eq!(out, input);
    }
}
