//! End-to-end pipeline: payload bits in, audio out, and back.
//!
//! Mirrors the signal path described for the modem as a whole: the payload
//! is FEC-encoded block by block, bit-reversal interleaved within each
//! block, optionally framed with a Barker synchronization word, mapped to
//! symbols, and modulated. Receive reverses every stage. [`run`] wraps both
//! halves around a channel model for simulation and BER/FER reporting.

use rand::Rng;

use crate::barker;
use crate::channel;
use crate::codecs::{self, CodecResult};
use crate::config::{FecScheme, ModemConfig, RunConfig};
use crate::demodulator::{self, DemodResult};
use crate::diagnostics::{compute_ber, DiagnosticsBundle, SimulationReport};
use crate::errors::Result;
use crate::interleave;
use crate::logging::{LogConfig, SignalLogger};
use crate::modulator;

/// Confidence scale applied to the demodulator's smoothed statistic when
/// deriving a log-likelihood ratio for soft-decision FEC. The statistic is
/// already peak-normalized to roughly `[-1, 1]` by the lag-1 pipeline, so a
/// modest fixed gain keeps LLRs in the range the belief-propagation decoder
/// expects without needing an explicit noise estimate.
const LLR_SCALE: f64 = 4.0;

fn pad_to_multiple(bits: &[u8], multiple: usize) -> Vec<u8> {
    if multiple == 0 {
        return bits.to_vec();
    }
    let rem = bits.len() % multiple;
    let mut out = bits.to_vec();
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(multiple - rem));
    }
    out
}

fn fec_encode_blocks(scheme: FecScheme, bits: &[u8]) -> Vec<u8> {
    if scheme == FecScheme::None {
        return bits.to_vec();
    }
    let block = scheme.message_bits();
    let padded = pad_to_multiple(bits, block);
    padded
        .chunks(block)
        .flat_map(|chunk| codecs::encode(scheme, chunk))
        .collect()
}

fn is_soft_scheme(scheme: FecScheme) -> bool {
    matches!(scheme, FecScheme::Ldpc96 | FecScheme::Ft8Ldpc174)
}

/// Decode one FEC scheme's worth of codeword blocks back into message
/// bits, given either hard bits (block codes) or per-bit LLRs (LDPC
/// variants). Returns the recovered message bits and whether every block
/// decoded successfully.
fn fec_decode_blocks(scheme: FecScheme, hard_bits: &[u8], llrs: &[f64]) -> (Vec<u8>, bool) {
    if scheme == FecScheme::None {
        return (hard_bits.to_vec(), true);
    }
    let codeword_bits = scheme.codeword_bits();
    let mut message = Vec::new();
    let mut all_ok = true;

    if is_soft_scheme(scheme) {
        for chunk in llrs.chunks(codeword_bits) {
            if chunk.len() < codeword_bits {
                break;
            }
            let result: CodecResult = codecs::decode_soft(scheme, chunk, 200);
            all_ok &= result.success;
            message.extend(result.data);
        }
    } else {
        for chunk in hard_bits.chunks(codeword_bits) {
            if chunk.len() < codeword_bits {
                break;
            }
            let result: CodecResult = codecs::decode_hard(scheme, chunk);
            all_ok &= result.success;
            message.extend(result.data);
        }
    }

    (message, all_ok)
}

/// Interleave `bits` in chunks no larger than the bit-reversal table's
/// 8-bit span, so arbitrarily long payloads still interleave correctly.
fn interleave_blocks(bits: &[u8], block: usize) -> Vec<u8> {
    let block = block.clamp(1, 256);
    bits.chunks(block).flat_map(interleave::interleave).collect()
}

fn deinterleave_blocks(bits: &[u8], block: usize) -> Vec<u8> {
    let block = block.clamp(1, 256);
    bits.chunks(block).flat_map(interleave::deinterleave).collect()
}

fn bits_to_symbols(bits: &[u8], bits_per_symbol: usize) -> Vec<u8> {
    let padded = pad_to_multiple(bits, bits_per_symbol);
    padded
        .chunks(bits_per_symbol)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

fn symbols_to_bits(symbols: &[u8], bits_per_symbol: usize) -> Vec<u8> {
    symbols
        .iter()
        .flat_map(|&s| (0..bits_per_symbol).rev().map(move |i| (s >> i) & 1))
        .collect()
}

fn bit_to_pm1(b: u8) -> i8 {
    if b == 0 {
        1
    } else {
        -1
    }
}

fn pm1_to_bit(v: i8) -> u8 {
    if v < 0 {
        1
    } else {
        0
    }
}

/// Result of encoding a payload into a waveform, keeping everything the
/// receive side needs to line up on the same frame layout.
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    pub signal: Vec<f64>,
    pub tx_payload_bits: Vec<u8>,
    pub msg_start_sample: usize,
    pub barker_expected_lag: Option<usize>,
    pub logs: Vec<String>,
}

/// Encode `payload_bits` into an audio waveform at `cfg.fs`.
pub fn encode(cfg: &ModemConfig, payload_bits: &[u8], rng: &mut impl Rng) -> Result<EncodeOutput> {
    cfg.validate()?;
    let mut logger = SignalLogger::new(LogConfig::default());

    let coded = fec_encode_blocks(cfg.fec, payload_bits);
    logger.debug("FEC", format!("{:?} encoded {} bits -> {} bits", cfg.fec, payload_bits.len(), coded.len()));
    let interleave_block = if cfg.fec == FecScheme::None {
        coded.len().min(256).max(1)
    } else {
        cfg.fec.codeword_bits()
    };
    let interleaved = interleave_blocks(&coded, interleave_block);

    let bps = cfg.bits_per_symbol();
    let mut symbols = bits_to_symbols(&interleaved, bps);
    logger.debug("MODULATE", format!("{} symbols at {} bits/symbol", symbols.len(), bps));

    let mut barker_expected_lag = None;
    if cfg.barker_sync {
        let barker_seq = barker::sequence(cfg.barker_length);
        let pm1: Vec<i8> = symbols.iter().map(|&s| bit_to_pm1(s)).collect();
        let framed = barker::insert_at_midpoint(&pm1, &barker_seq);
        symbols = framed.into_iter().map(pm1_to_bit).collect();
        barker_expected_lag = Some(pm1.len() / 2);
        logger.debug("BARKER", format!("inserted length-{} sync word at lag {}", cfg.barker_length, barker_expected_lag.unwrap()));
    }

    let signal = modulator::modulate(cfg, &symbols, rng)?;
    let w = cfg.samples_per_symbol()?;
    let msg_start_sample = (w as f64 * cfg.fs / cfg.working_rate()).round() as usize;
    logger.info("MODULATE", format!("produced {} samples, msg_start={}", signal.len(), msg_start_sample));

    Ok(EncodeOutput {
        signal,
        tx_payload_bits: payload_bits.to_vec(),
        msg_start_sample,
        barker_expected_lag,
        logs: logger.entries().iter().map(|e| format!("[{}] {}: {}", e.level, e.subsystem, e.message)).collect(),
    })
}

/// Result of decoding a waveform back into payload bits.
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    pub payload_bits: Vec<u8>,
    pub fec_ok: bool,
    pub demod: DemodResult,
    pub barker_timing_error: Option<i64>,
    pub logs: Vec<String>,
}

/// Decode `signal` (captured at `cfg.fs`, `msg_start_sample` samples from
/// its start to the first real symbol) back into payload bits.
pub fn decode(cfg: &ModemConfig, signal: &[f64], enc: &EncodeOutput) -> Result<DecodeOutput> {
    cfg.validate()?;
    let mut logger = SignalLogger::new(LogConfig::default());

    let demod = demodulator::demodulate(cfg, signal, enc.msg_start_sample)?;
    logger.debug("DEMODULATE", format!("recovered {} symbols", demod.symbols.len()));

    let mut symbols = demod.symbols.clone();
    let mut stats = demod.symbol_stats.clone();
    let mut barker_timing_error = None;

    if cfg.barker_sync {
        let barker_seq = barker::sequence(cfg.barker_length);
        let pm1: Vec<f64> = symbols.iter().map(|&s| bit_to_pm1(s) as f64).collect();
        let (lag, _score) = barker::correlate(&pm1, &barker_seq);
        if let Some(expected) = enc.barker_expected_lag {
            barker_timing_error = Some(barker::timing_error(lag, expected));
            logger.debug("BARKER", format!("sync lag {} (expected {}), timing error {:?}", lag, expected, barker_timing_error));
        }
        let before: Vec<u8> = symbols[..lag.min(symbols.len())].to_vec();
        let after_start = (lag + cfg.barker_length).min(symbols.len());
        let after: Vec<u8> = symbols[after_start..].to_vec();
        let before_stats: Vec<f64> = stats[..lag.min(stats.len())].to_vec();
        let after_stats: Vec<f64> = stats[after_start.min(stats.len())..].to_vec();

        symbols = before.into_iter().chain(after).collect();
        stats = before_stats.into_iter().chain(after_stats).collect();
    }

    let bps = cfg.bits_per_symbol();
    let hard_bits = symbols_to_bits(&symbols, bps);
    let llr_bits: Vec<f64> = stats
        .iter()
        .flat_map(|&v| std::iter::repeat(v * LLR_SCALE).take(bps))
        .collect();

    let deinterleave_block = if cfg.fec == FecScheme::None {
        hard_bits.len().min(256).max(1)
    } else {
        cfg.fec.codeword_bits()
    };
    let deinterleaved_hard = deinterleave_blocks(&hard_bits, deinterleave_block);
    let deinterleaved_llr = if is_soft_scheme(cfg.fec) {
        deinterleave_blocks_f64(&llr_bits, deinterleave_block)
    } else {
        Vec::new()
    };

    let (mut message, fec_ok) = fec_decode_blocks(cfg.fec, &deinterleaved_hard, &deinterleaved_llr);
    message.truncate(enc.tx_payload_bits.len());
    logger.info("FEC", format!("{:?} decode {}", cfg.fec, if fec_ok { "ok" } else { "failed" }));

    Ok(DecodeOutput {
        payload_bits: message,
        fec_ok,
        demod,
        barker_timing_error,
        logs: logger.entries().iter().map(|e| format!("[{}] {}: {}", e.level, e.subsystem, e.message)).collect(),
    })
}

/// `deinterleave_blocks`'s float-valued sibling, used to carry LLRs through
/// the same bit-reversal permutation as the hard-decision path.
fn deinterleave_blocks_f64(values: &[f64], block: usize) -> Vec<f64> {
    let block = block.clamp(1, 256);
    values
        .chunks(block)
        .flat_map(|chunk| {
            let perm = interleave::bit_reversal_permutation(chunk.len());
            let mut out = vec![0.0; chunk.len()];
            for (i, &idx) in perm.iter().enumerate() {
                out[idx] = chunk[i];
            }
            out
        })
        .collect()
}

/// Full loopback: encode, pass through the channel model, decode, and
/// report BER/FER.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: SimulationReport,
    pub diagnostics: DiagnosticsBundle,
}

pub fn run(run_cfg: &RunConfig, payload_bits: &[u8], rng: &mut impl Rng) -> Result<RunOutcome> {
    let cfg = &run_cfg.modem;
    let enc = encode(cfg, payload_bits, rng)?;

    let channeled = match run_cfg.snr_db {
        Some(snr) => channel::apply_awgn(&enc.signal, snr, rng),
        None => enc.signal.clone(),
    };

    let dec = decode(cfg, &channeled, &enc)?;

    let pre_fec_ber = compute_ber(&enc.tx_payload_bits, &symbols_to_bits(&dec.demod.symbols, cfg.bits_per_symbol()));
    let post_fec_ber = compute_ber(&enc.tx_payload_bits, &dec.payload_bits);
    let post_fec_errors = (post_fec_ber * enc.tx_payload_bits.len() as f64).round() as usize;
    let pre_fec_errors = (pre_fec_ber * enc.tx_payload_bits.len() as f64).round() as usize;

    let report = SimulationReport {
        pre_fec_errors,
        pre_fec_ber,
        post_fec_errors,
        post_fec_ber,
        frame_error: !dec.fec_ok || dec.payload_bits != enc.tx_payload_bits,
    };

    let diagnostics = DiagnosticsBundle {
        encoding_logs: enc.logs.clone(),
        decoding_logs: dec.logs.clone(),
        demodulation: crate::diagnostics::DemodulationDiagnostics {
            lag1_raw: Vec::new(),
            lag1_smoothed: dec.demod.smoothed.clone(),
            symbol_samples: dec.demod.symbol_stats.clone(),
            barker_timing_error: dec.barker_timing_error,
        },
        report: report.clone(),
    };

    Ok(RunOutcome { report, diagnostics })
}
