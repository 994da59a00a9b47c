//! NCK core library
//!
//! A Rust-native implementation of the Noise Color Keying audio modem: a
//! symbol stream becomes a sequence of spectrally-tilted noise bursts,
//! detected on the other end by a streaming lag-1 autocorrelation. The
//! modules below cover the full signal path end to end — configuration,
//! FEC, interleaving, synchronization, modulation, demodulation, channel
//! modeling, and orchestration — each independently testable.

pub mod barker;
pub mod channel;
pub mod codecs;
pub mod config;
pub mod demodulator;
pub mod diagnostics;
pub mod dsp;
pub mod errors;
pub mod interleave;
pub mod lag1;
pub mod logging;
pub mod modulator;
pub mod noise;
pub mod orchestrator;

pub use config::{FecScheme, FilterMode, Hue, ModemConfig, RunConfig};
pub use errors::{NckError, Result};
pub use orchestrator::{run, RunOutcome};
