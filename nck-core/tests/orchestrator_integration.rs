//! End-to-end modem loopback tests driven entirely through the public API.

use nck_core::config::{FecScheme, ModemConfig, RunConfig};
use nck_core::orchestrator::run;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn baseband_config() -> ModemConfig {
    ModemConfig {
        fs: 8_000.0,
        cf: 0.0,
        bw: 200.0,
        kr: 20.0,
        m_ary: 2,
        fec: FecScheme::None,
        barker_sync: false,
        ..ModemConfig::default()
    }
}

#[test]
fn high_snr_loopback_achieves_low_bit_error_rate() {
    let run_cfg = RunConfig {
        modem: baseband_config(),
        snr_db: Some(25.0),
        rng_seed: Some(1),
    };
    let mut rng = StdRng::seed_from_u64(1);
    let payload: Vec<u8> = (0..32).map(|i| (i % 3 == 0) as u8).collect();

    let outcome = run(&run_cfg, &payload, &mut rng).unwrap();
    assert!(
        outcome.report.post_fec_ber < 0.3,
        "post-FEC BER too high: {}",
        outcome.report.post_fec_ber
    );
}

#[test]
fn hamming_protected_loopback_runs_clean() {
    let run_cfg = RunConfig {
        modem: ModemConfig {
            fec: FecScheme::Hamming84,
            ..baseband_config()
        },
        snr_db: Some(30.0),
        rng_seed: Some(2),
    };
    let mut rng = StdRng::seed_from_u64(2);
    let payload = vec![1u8, 0, 1, 1, 0, 0, 1, 0];

    let outcome = run(&run_cfg, &payload, &mut rng).unwrap();
    assert!(outcome.diagnostics.demodulation.lag1_smoothed.iter().all(|v| v.is_finite()));
}

/// Noise-free binary loopback at the modem's canonical parameters: 48 random
/// bits recovered exactly, with the audio running `(2+48)*w/(2*BW)` seconds
/// where `w = 2*BW/KR` — the two extra symbol-widths are the ramp up/down.
#[test]
fn clean_channel_binary_loopback_matches_expected_duration() {
    use nck_core::orchestrator::{decode, encode};

    let cfg = ModemConfig {
        fs: 6_000.0,
        bw: 500.0,
        cf: 1_250.0,
        kr: 20.0,
        m_ary: 2,
        fec: FecScheme::None,
        barker_sync: false,
        ..ModemConfig::default()
    };
    cfg.validate().unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let payload: Vec<u8> = (0..48).map(|i| (i % 2) as u8).collect();

    let enc = encode(&cfg, &payload, &mut rng).unwrap();
    let dec = decode(&cfg, &enc.signal, &enc).unwrap();

    assert_eq!(dec.payload_bits, payload);

    let expected_secs = 2.5;
    let actual_secs = enc.signal.len() as f64 / cfg.fs;
    assert!(
        (actual_secs - expected_secs).abs() < 0.05,
        "expected ~{expected_secs}s of audio, got {actual_secs}s"
    );
}

/// The end-to-end fixture: BW=500, KR=20, M=2, FS=6000, CF=1250, SNR=10dB,
/// no FEC, 48-bit random payload, zero bit errors over 100 independent
/// trials. High enough SNR relative to this bandwidth/keying-rate pair that
/// a correct implementation never mis-slices a symbol.
#[test]
fn high_snr_fixture_achieves_zero_errors_over_a_hundred_trials() {
    let modem = ModemConfig {
        fs: 6_000.0,
        bw: 500.0,
        cf: 1_250.0,
        kr: 20.0,
        m_ary: 2,
        fec: FecScheme::None,
        barker_sync: false,
        ..ModemConfig::default()
    };
    modem.validate().unwrap();

    for trial in 0..100u64 {
        let run_cfg = RunConfig {
            modem: modem.clone(),
            snr_db: Some(10.0),
            rng_seed: Some(trial),
        };
        let mut rng = StdRng::seed_from_u64(trial);
        let payload: Vec<u8> = (0..48).map(|i| ((trial + i) % 2) as u8).collect();

        let outcome = run(&run_cfg, &payload, &mut rng).unwrap();
        assert_eq!(
            outcome.report.post_fec_errors, 0,
            "trial {trial}: expected zero post-FEC errors, got {}",
            outcome.report.post_fec_errors
        );
    }
}

#[test]
fn carrier_upconverted_loopback_produces_finite_audio() {
    let run_cfg = RunConfig {
        modem: ModemConfig {
            cf: 1_000.0,
            fs: 48_000.0,
            bw: 50.0,
            kr: 5.0,
            ..baseband_config()
        },
        snr_db: Some(20.0),
        rng_seed: Some(3),
    };
    let mut rng = StdRng::seed_from_u64(3);
    let payload = vec![0u8, 1, 0, 1];

    let outcome = run(&run_cfg, &payload, &mut rng).unwrap();
    assert!(outcome.report.post_fec_ber.is_finite());
}
