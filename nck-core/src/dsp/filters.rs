//! Butterworth IIR filtering shared by the modulator and demodulator.
//!
//! The demodulator needs a zero-phase bandpass ahead of mixing (to reject
//! out-of-band noise before the lag-1 statistic sees it) and a zero-phase
//! lowpass after it (to smooth the raw per-sample statistic at the `KR`
//! time constant). Both are built from cascaded second-order sections run
//! forward and backward (`filtfilt`) so that group delay does not shift
//! the symbol boundaries being sliced downstream.

use std::f64::consts::PI;

/// A single second-order IIR section in direct-form II transposed layout.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Run the section forward over `input`, returning a new buffer.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let mut z1 = 0.0;
        let mut z2 = 0.0;
        let mut out = Vec::with_capacity(input.len());
        for &x in input {
            let y = self.b0 * x + z1;
            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;
            out.push(y);
        }
        out
    }
}

/// A cascade of second-order sections approximating an `order`-th Butterworth
/// response. `order` must be even (the designs used here are 2nd and 10th
/// order, i.e. 1 and 5 sections respectively).
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Lowpass Butterworth design of the given even `order`, normalized
    /// cutoff `cutoff_hz` at sample rate `fs`.
    pub fn butter_lowpass(order: usize, cutoff_hz: f64, fs: f64) -> Self {
        Self::design(order, cutoff_hz, fs, Kind::Lowpass)
    }

    /// Bandpass Butterworth design of the given even `order`, centered at
    /// `center_hz` with total width `bandwidth_hz`, at sample rate `fs`.
    /// Implemented as the cascade of a lowpass and highpass half-order
    /// pair per section, which is the standard prototype transform for a
    /// bandpass built from lowpass sections.
    pub fn butter_bandpass(order: usize, center_hz: f64, bandwidth_hz: f64, fs: f64) -> Self {
        let low = (center_hz - bandwidth_hz / 2.0).max(1.0);
        let high = center_hz + bandwidth_hz / 2.0;
        let mut sections = Self::design(order, high, fs, Kind::Lowpass).sections;
        sections.extend(Self::design(order, low, fs, Kind::Highpass).sections);
        Self { sections }
    }

    /// Apply the filter forward, then backward over the reversed output,
    /// canceling phase delay (the classic `scipy.signal.filtfilt` idiom).
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        let forward = self.run(input);
        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        reversed = self.run(&reversed);
        reversed.into_iter().rev().collect()
    }

    fn run(&self, input: &[f64]) -> Vec<f64> {
        let mut buf = input.to_vec();
        for section in &self.sections {
            buf = section.apply(&buf);
        }
        buf
    }

    fn design(order: usize, cutoff_hz: f64, fs: f64, kind: Kind) -> Self {
        assert!(order % 2 == 0, "only even-order designs are supported");
        let n_sections = order / 2;
        let warped = (PI * cutoff_hz / fs).tan();

        let mut sections = Vec::with_capacity(n_sections);
        for k in 0..n_sections {
            // Analog Butterworth pole angle for this section pair, then
            // bilinear-transform to a digital biquad.
            let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64) + PI / 2.0;
            let real = -warped * theta.sin();
            let imag = warped * theta.cos();
            sections.push(pole_pair_to_biquad(real, imag, warped, kind));
        }
        Self { sections }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Lowpass,
    Highpass,
}

fn pole_pair_to_biquad(pole_re: f64, pole_im: f64, warped: f64, kind: Kind) -> Biquad {
    // `pole_re + i*pole_im` is one conjugate pole of the analog Butterworth
    // prototype, already scaled to the prewarped cutoff `warped` (its
    // magnitude squared is `warped^2`). The lowpass section is
    // `H(s) = wc^2 / (s^2 - 2*Re(p)*s + |p|^2)`; the highpass section swaps
    // the numerator for `s^2` (the standard lowpass-to-highpass
    // `s -> wc/s` substitution applied to the same prototype). Both are
    // bilinear-transformed via `s = (z-1)/(z+1)` (the prewarp already
    // absorbs the usual `2*fs` scaling, so no extra constant is needed).
    let wc2 = warped * warped;

    // Denominator is shared between lowpass and highpass (same poles).
    let a0 = 1.0 - 2.0 * pole_re + wc2;
    let a1 = -2.0 + 2.0 * wc2;
    let a2 = 1.0 + 2.0 * pole_re + wc2;

    let (b0, b1, b2) = match kind {
        Kind::Lowpass => (wc2, 2.0 * wc2, wc2),
        Kind::Highpass => (1.0, -2.0, 1.0),
    };

    Biquad {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a1: a1 / a0,
        a2: a2 / a0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(fs: f64, freq: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let fs = 8_000.0;
        let filt = SosFilter::butter_lowpass(2, 200.0, fs);
        let low_tone = sine(fs, 50.0, 4000);
        let high_tone = sine(fs, 2_000.0, 4000);

        let low_out = filt.filtfilt(&low_tone);
        let high_out = filt.filtfilt(&high_tone);

        let rms = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt();
        assert!(rms(&low_out) > rms(&high_out));
    }

    #[test]
    fn filtfilt_preserves_length() {
        let fs = 8_000.0;
        let filt = SosFilter::butter_lowpass(2, 200.0, fs);
        let signal = sine(fs, 50.0, 513);
        assert_eq!(filt.filtfilt(&signal).len(), signal.len());
    }

    #[test]
    fn bandpass_passes_center_rejects_far_tone() {
        let fs = 48_000.0;
        let filt = SosFilter::butter_bandpass(10, 1_000.0, 100.0, fs);
        let in_band = sine(fs, 1_000.0, 4800);
        let out_of_band = sine(fs, 15_000.0, 4800);

        let in_band_out = filt.filtfilt(&in_band);
        let out_of_band_out = filt.filtfilt(&out_of_band);

        let rms = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() / v.len() as f64).sqrt();
        assert!(rms(&in_band_out) > rms(&out_of_band_out));
    }
}
