//! CLI-specific configuration: an optional TOML file of defaults, overridden
//! by whichever flags the user actually passed on the command line.

use color_eyre::eyre::{Context, Result};
use nck_core::config::FecScheme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults loadable from a TOML file; every field is optional so a config
/// file only needs to specify the knobs it cares about.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub bw: Option<f64>,
    pub cf: Option<f64>,
    pub fs: Option<f64>,
    pub kr: Option<f64>,
    pub m_ary: Option<u8>,
    pub fec: Option<String>,
    pub barker_length: Option<usize>,
    pub interleave: Option<bool>,
    pub snr_db: Option<f64>,
    pub fft_shaping: Option<bool>,
    pub payload_bits: Option<usize>,
    pub birdies: Option<usize>,
}

impl FileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).wrap_err("failed to parse TOML configuration")
    }
}

/// Map the `-e` flag's scheme name onto the library's [`FecScheme`].
pub fn fec_from_flag(name: &str) -> Result<FecScheme> {
    match name {
        "hamming84" => Ok(FecScheme::Hamming84),
        "golay24" => Ok(FecScheme::Golay24),
        "ldpc96" => Ok(FecScheme::Ldpc96),
        "ft8" => Ok(FecScheme::Ft8Ldpc174),
        other => Err(color_eyre::eyre::eyre!(
            "unknown FEC scheme '{other}' (expected ft8, golay24, hamming84, or ldpc96)"
        )),
    }
}
