//! Channel modeling and impairment simulation.
//!
//! NCK transmits real-valued audio, so the channel model here is a single
//! additive-white-Gaussian-noise stage driven off a target SNR, plus an
//! optional fixed-frequency "birdie" interferer matching the one
//! `demo-nck`-style tooling injects for robustness testing.

use rand::Rng;
use rand_distr::StandardNormal;

/// Mean power of a real-valued signal.
pub fn signal_power(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| s * s).sum::<f64>() / samples.len() as f64
}

/// Add AWGN to `audio` so that the resulting SNR relative to `audio`'s own
/// power is approximately `snr_db`.
pub fn apply_awgn<R: Rng>(audio: &[f64], snr_db: f64, rng: &mut R) -> Vec<f64> {
    let p_signal = signal_power(audio);
    let snr_linear = 10f64.powf(snr_db / 10.0);
    let noise_power = if snr_linear > 0.0 {
        p_signal / snr_linear
    } else {
        0.0
    };
    let noise_std = noise_power.sqrt();

    audio
        .iter()
        .map(|&s| s + rng.sample::<f64, _>(StandardNormal) * noise_std)
        .collect()
}

/// Add a fixed-amplitude continuous-wave interferer ("birdie") at
/// `freq_hz`, sampled at `fs`.
pub fn apply_birdie(audio: &[f64], fs: f64, freq_hz: f64, amplitude: f64) -> Vec<f64> {
    let two_pi_f_over_fs = 2.0 * std::f64::consts::PI * freq_hz / fs;
    audio
        .iter()
        .enumerate()
        .map(|(i, &s)| s + amplitude * (two_pi_f_over_fs * i as f64).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn awgn_is_deterministic_with_seed() {
        let audio = vec![0.1, 0.2, 0.3, -0.1];
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        let noisy1 = apply_awgn(&audio, 3.0, &mut rng1);
        let noisy2 = apply_awgn(&audio, 3.0, &mut rng2);

        assert_eq!(noisy1, noisy2);
    }

    #[test]
    fn higher_snr_adds_less_noise_energy() {
        let audio = vec![1.0; 2000];
        let mut rng_lo = StdRng::seed_from_u64(1);
        let mut rng_hi = StdRng::seed_from_u64(1);

        let noisy_lo_snr = apply_awgn(&audio, -10.0, &mut rng_lo);
        let noisy_hi_snr = apply_awgn(&audio, 30.0, &mut rng_hi);

        let deviation = |v: &[f64]| -> f64 {
            v.iter().zip(audio.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>()
        };

        assert!(deviation(&noisy_lo_snr) > deviation(&noisy_hi_snr));
    }

    #[test]
    fn birdie_is_periodic_interference() {
        let audio = vec![0.0; 100];
        let tone = apply_birdie(&audio, 48_000.0, 1_000.0, 0.5);
        assert!(tone.iter().any(|&v| v.abs() > 0.0));
    }
}
