mod config;
mod logging;
mod telemetry;

use clap::Parser;
use color_eyre::eyre::{eyre, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use config::{fec_from_flag, FileConfig};
use logging::{LogEvent, LogFormat, LogTarget, StatisticsEvent, StructuredLogger, TelemetryEvent};
use nck_core::config::{FecScheme, FilterMode, ModemConfig};
use nck_core::{channel, orchestrator};
use telemetry::TelemetryAggregator;

/// Noise Color Keying modem: encode a random payload, push it through a
/// simulated channel, and report how much of it survived.
#[derive(Parser, Debug)]
#[command(author, version, about = "Noise Color Keying modem simulator", long_about = None)]
struct Cli {
    /// Occupied noise bandwidth in Hz.
    #[arg(short = 'b', long = "bandwidth")]
    bw: Option<f64>,

    /// Center (carrier) frequency in Hz; 0 means baseband.
    #[arg(short = 'c', long = "center-freq")]
    cf: Option<f64>,

    /// Audio sample rate in Hz.
    #[arg(short = 'f', long = "sample-rate")]
    fs: Option<f64>,

    /// Keying rate in Baud.
    #[arg(short = 'k', long = "keying-rate")]
    kr: Option<f64>,

    /// Payload length in bits.
    #[arg(short = 'l', long = "length")]
    len: Option<usize>,

    /// Symbol arity: 2, 3, or 4.
    #[arg(short = 'M', long = "m-ary")]
    m_ary: Option<u8>,

    /// Forward error correction scheme: ft8, golay24, hamming84, ldpc96.
    #[arg(short = 'e', long = "ecc")]
    ecc: Option<String>,

    /// Barker sequence length (enables synchronization). Binary signaling only.
    #[arg(short = 'B', long = "barker")]
    barker: Option<usize>,

    /// Interleave codeword bits before modulation.
    #[arg(short = 'i', long = "interleave")]
    interleave: bool,

    /// Channel SNR in dB. Omit to run without added noise.
    #[arg(short = 's', long = "snr")]
    snr_db: Option<f64>,

    /// Use FFT-domain noise shaping instead of the time-domain FIR.
    #[arg(short = 't', long = "fft-shaping")]
    fft_shaping: bool,

    /// Write the modulated waveform to a 16-bit PCM WAV file.
    #[arg(short = 'w', long = "wav")]
    wav_output: Option<PathBuf>,

    /// Number of continuous-wave "birdie" interferers to inject.
    #[arg(short = 'y', long = "birdies")]
    birdies: Option<usize>,

    /// Render diagnostic plots (not supported by this build; logged and skipped).
    #[arg(short = 'p', long = "plots")]
    plots: bool,

    /// Number of encode/channel/decode trials to run.
    #[arg(long = "rounds", default_value_t = 1)]
    rounds: usize,

    /// RNG seed for reproducible runs.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Optional TOML file of defaults, overridden by any flag above.
    #[arg(long = "config")]
    config_file: Option<PathBuf>,

    /// Write a JSON results sidecar alongside stdout.
    #[arg(long = "json-out")]
    json_out: Option<PathBuf>,
}

fn build_modem_config(cli: &Cli, file: &FileConfig) -> Result<ModemConfig> {
    let mut cfg = ModemConfig::default();
    cfg.bw = cli.bw.or(file.bw).unwrap_or(cfg.bw);
    cfg.cf = cli.cf.or(file.cf).unwrap_or(cfg.cf);
    cfg.fs = cli.fs.or(file.fs).unwrap_or(cfg.fs);
    cfg.kr = cli.kr.or(file.kr).unwrap_or(cfg.kr);
    cfg.m_ary = cli.m_ary.or(file.m_ary).unwrap_or(cfg.m_ary);

    if cli.fft_shaping || file.fft_shaping.unwrap_or(false) {
        cfg.filter_mode = FilterMode::Fft;
    }

    let ecc_name = cli.ecc.clone().or_else(|| file.fec.clone());
    cfg.fec = match ecc_name {
        Some(name) => fec_from_flag(&name)?,
        None => FecScheme::None,
    };

    let barker_length = cli.barker.or(file.barker_length);
    if let Some(length) = barker_length {
        cfg.barker_sync = true;
        cfg.barker_length = length;
    }

    cfg.validate().wrap_err("invalid modem configuration")?;
    Ok(cfg)
}

fn write_wav(path: &std::path::Path, signal: &[f64], fs: f64) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: fs.round() as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in signal {
        let scaled = (sample * 14_000.0).round();
        let clamped = scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        writer.write_sample(clamped)?;
    }
    writer.finalize()?;
    Ok(())
}

fn inject_birdies(signal: &[f64], fs: f64, cfg: &ModemConfig, count: usize) -> Vec<f64> {
    let mut out = signal.to_vec();
    for i in 0..count {
        // Spread interferers above the occupied band so they contest the
        // receiver's bandpass skirts rather than sit inside the signal.
        let freq = cfg.cf + cfg.bw * (1.5 + i as f64);
        out = channel::apply_birdie(&out, fs, freq, 0.05);
    }
    out
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let file_config = match &cli.config_file {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let mut logger = StructuredLogger::new(LogFormat::Pretty, LogTarget::Stderr)?;

    let modem_cfg = build_modem_config(&cli, &file_config)?;

    if cli.plots {
        logger.log(LogEvent::Warn {
            message: "plot rendering was requested but this build has no plotting backend; skipping".into(),
        })?;
    }

    if !cli.interleave && modem_cfg.fec != FecScheme::None {
        logger.log(LogEvent::Info {
            message: "interleaving is always applied alongside FEC; -i has no effect on this build".into(),
        })?;
    }

    let payload_len = cli.len.or(file_config.payload_bits).unwrap_or(256);
    let birdie_count = cli.birdies.or(file_config.birdies).unwrap_or(0);
    let snr_db = cli.snr_db.or(file_config.snr_db);
    let seed = cli.seed.unwrap_or(0);

    let mut rng = StdRng::seed_from_u64(seed);

    logger.log(LogEvent::Info {
        message: format!(
            "running {} round(s): bw={} cf={} fs={} kr={} M={} fec={:?}",
            cli.rounds, modem_cfg.bw, modem_cfg.cf, modem_cfg.fs, modem_cfg.kr, modem_cfg.m_ary, modem_cfg.fec
        ),
    })?;

    let mut aggregator = TelemetryAggregator::new();
    let mut last_wav_signal: Option<Vec<f64>> = None;

    let progress = if cli.rounds > 1 {
        let bar = ProgressBar::new(cli.rounds as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} rounds ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    for round in 0..cli.rounds.max(1) {
        let payload: Vec<u8> = (0..payload_len).map(|_| rng.gen_range(0..2)).collect();

        let enc = orchestrator::encode(&modem_cfg, &payload, &mut rng)
            .wrap_err("failed to encode payload")?;

        let mut signal = enc.signal.clone();
        if let Some(snr) = snr_db {
            signal = channel::apply_awgn(&signal, snr, &mut rng);
        }
        if birdie_count > 0 {
            signal = inject_birdies(&signal, modem_cfg.fs, &modem_cfg, birdie_count);
        }

        let dec = orchestrator::decode(&modem_cfg, &signal, &enc).wrap_err("failed to decode signal")?;

        if round == 0 {
            for line in enc.logs.iter().chain(dec.logs.iter()) {
                logger.log(LogEvent::Info { message: line.clone() })?;
            }
        }

        let post_fec_ber = nck_core::diagnostics::compute_ber(&payload, &dec.payload_bits);
        let pre_fec_ber = nck_core::diagnostics::compute_ber(
            &payload,
            &dec.demod.symbols.iter().flat_map(|&s| {
                (0..modem_cfg.bits_per_symbol()).rev().map(move |i| (s >> i) & 1)
            }).collect::<Vec<u8>>(),
        );
        let report = nck_core::diagnostics::SimulationReport {
            pre_fec_errors: (pre_fec_ber * payload.len() as f64).round() as usize,
            pre_fec_ber,
            post_fec_errors: (post_fec_ber * payload.len() as f64).round() as usize,
            post_fec_ber,
            frame_error: !dec.fec_ok || dec.payload_bits != payload,
        };
        aggregator.record(&report);

        logger.log(LogEvent::Telemetry(TelemetryEvent {
            timestamp: chrono::Utc::now(),
            pre_fec_ber: report.pre_fec_ber,
            post_fec_ber: report.post_fec_ber,
            symbols_decoded: dec.demod.symbols.len(),
            barker_timing_error: dec.barker_timing_error,
            fec_ok: dec.fec_ok,
        }))?;

        if round == cli.rounds.saturating_sub(1) {
            last_wav_signal = Some(signal);
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let stats_event = StatisticsEvent {
        timestamp: chrono::Utc::now(),
        duration_secs: logger.elapsed(),
        pre_fec_ber: aggregator.pre_fec_ber_summary(),
        post_fec_ber: aggregator.post_fec_ber_summary(),
        trials: aggregator.trials(),
        frame_errors: aggregator.frame_errors(),
    };
    logger.log(LogEvent::Statistics(stats_event.clone()))?;

    if let Some(wav_path) = &cli.wav_output {
        let signal = last_wav_signal.ok_or_else(|| eyre!("no signal available to write"))?;
        write_wav(wav_path, &signal, modem_cfg.fs)?;
        logger.log(LogEvent::Info {
            message: format!("wrote {} samples to {}", signal.len(), wav_path.display()),
        })?;
    }

    if let Some(json_path) = &cli.json_out {
        let snr_key = snr_db.map(|s| s.to_string()).unwrap_or_else(|| "none".into());
        let entry = format!(
            "kr={} snr={:?} rounds={} fer={}",
            modem_cfg.kr, snr_db, aggregator.trials(), aggregator.frame_error_rate()
        );
        let mut snr_map = serde_json::Map::new();
        snr_map.insert(snr_key, serde_json::Value::String(entry));
        let mut data = serde_json::Map::new();
        data.insert(modem_cfg.kr.to_string(), serde_json::Value::Object(snr_map));

        let sidecar = serde_json::json!({
            "cfg": {
                "bw": modem_cfg.bw,
                "ecc": cli.ecc,
                "fs": modem_cfg.fs,
                "krl": [modem_cfg.kr],
                "dlength": payload_len,
                "olength": aggregator.trials(),
                "rounds": cli.rounds,
                "utc": chrono::Utc::now().to_rfc3339(),
            },
            "data": data,
        });
        std::fs::write(json_path, serde_json::to_string_pretty(&sidecar)?)?;
    }

    Ok(())
}
