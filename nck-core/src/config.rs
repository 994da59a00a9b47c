//! Configuration types for the NCK modem.

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

/// A single transmitted hue. The three named tilts are generated directly;
/// any other position between fully reddish (`-1.0`) and fully blueish
/// (`1.0`) is a `Fractional` mix of the two (used by M=4's off-axis
/// symbols). Modeled as a tagged choice rather than a bare float so each
/// generation path is dispatched explicitly instead of inferred from a
/// magic numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hue {
    Reddish,
    White,
    Blueish,
    /// `f` in `(-1, 1)`, excluding the three values already named above.
    Fractional(f64),
}

impl Hue {
    pub const REDDISH: Hue = Hue::Reddish;
    pub const WHITE: Hue = Hue::White;
    pub const BLUEISH: Hue = Hue::Blueish;

    pub fn value(self) -> f64 {
        match self {
            Hue::Reddish => -1.0,
            Hue::White => 0.0,
            Hue::Blueish => 1.0,
            Hue::Fractional(f) => f,
        }
    }
}

/// Forward error correction scheme applied to the payload before
/// interleaving and framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FecScheme {
    #[default]
    None,
    Hamming84,
    Golay24,
    Ldpc96,
    Ft8Ldpc174,
}

impl FecScheme {
    /// Message (pre-encode) bits consumed per codeword.
    pub fn message_bits(self) -> usize {
        match self {
            FecScheme::None => 0,
            FecScheme::Hamming84 => 4,
            FecScheme::Golay24 => 12,
            FecScheme::Ldpc96 => 50,
            FecScheme::Ft8Ldpc174 => 77,
        }
    }

    /// Codeword bits produced per message block.
    pub fn codeword_bits(self) -> usize {
        match self {
            FecScheme::None => 0,
            FecScheme::Hamming84 => 8,
            FecScheme::Golay24 => 24,
            FecScheme::Ldpc96 => 96,
            FecScheme::Ft8Ldpc174 => 174,
        }
    }
}

/// Which implementation shapes colored noise: a 2-tap FIR in the time
/// domain, or bin-wise weighting in the frequency domain. The two are
/// behaviorally interchangeable for detection purposes (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    Iir,
    Fft,
}

/// Modem-wide configuration: bandwidth, center frequency, sample rate,
/// keying rate and symbol arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModemConfig {
    /// Audio sample rate in Hz.
    pub fs: f64,
    /// Occupied noise bandwidth in Hz.
    pub bw: f64,
    /// Center (carrier) frequency in Hz. Zero means baseband transmission.
    pub cf: f64,
    /// Keying rate in Baud (symbols per second), may be less than 1.
    pub kr: f64,
    /// Symbol arity: 2, 3, or 4.
    pub m_ary: u8,
    /// Colored-noise shaping implementation.
    pub filter_mode: FilterMode,
    /// Forward error correction scheme.
    pub fec: FecScheme,
    /// Insert a Barker synchronization word (binary-only).
    pub barker_sync: bool,
    /// Barker sequence length when `barker_sync` is set.
    pub barker_length: usize,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            fs: 48_000.0,
            bw: 50.0,
            cf: 1_000.0,
            kr: 5.0,
            m_ary: 2,
            filter_mode: FilterMode::Iir,
            fec: FecScheme::None,
            barker_sync: false,
            barker_length: 13,
        }
    }
}

impl ModemConfig {
    /// Samples per symbol at the 2·BW working rate: `w = round(2·BW/KR)`,
    /// which must land on a positive integer.
    pub fn samples_per_symbol(&self) -> Result<usize> {
        let raw = 2.0 * self.bw / self.kr;
        let rounded = raw.round();
        if (raw - rounded).abs() > 1e-6 || rounded < 1.0 {
            return Err(ConfigError::InvalidFrameLayout {
                reason: format!("2*BW/KR = {} is not a positive integer", raw),
            }
            .into());
        }
        Ok(rounded as usize)
    }

    /// The working sample rate at which noise blocks, lag-1 estimation and
    /// symbol slicing all operate: `2·BW`.
    pub fn working_rate(&self) -> f64 {
        2.0 * self.bw
    }

    /// Validate the full set of invariants from the modem specification.
    pub fn validate(&self) -> Result<()> {
        if self.fs <= 0.0 || !self.fs.is_finite() {
            return Err(ConfigError::InvalidSampleRate { rate: self.fs }.into());
        }
        if self.bw <= 0.0 || !self.bw.is_finite() {
            return Err(ConfigError::InvalidSymbolRate {
                rate: self.bw as usize,
            }
            .into());
        }
        if !matches!(self.m_ary, 2 | 3 | 4) {
            return Err(ConfigError::InvalidFrameLayout {
                reason: format!("M-ary arity {} must be 2, 3, or 4", self.m_ary),
            }
            .into());
        }

        let nyquist_floor = self.cf + self.bw / 2.0;
        if self.fs < 2.0 * nyquist_floor {
            return Err(ConfigError::NyquistViolation {
                carrier_hz: self.cf,
                min_required_hz: 2.0 * nyquist_floor,
                actual_hz: self.fs,
            }
            .into());
        }

        if self.cf > 0.0 && self.cf < self.bw {
            let ceiling = self.cf + 1.5 * self.bw;
            if ceiling > self.fs / 2.0 {
                return Err(ConfigError::NyquistViolation {
                    carrier_hz: self.cf,
                    min_required_hz: 2.0 * ceiling,
                    actual_hz: self.fs,
                }
                .into());
            }
        }

        self.samples_per_symbol()?;

        if self.barker_sync && self.m_ary != 2 {
            return Err(ConfigError::InvalidFrameLayout {
                reason: "Barker synchronization requires binary (M=2) signaling".into(),
            }
            .into());
        }

        Ok(())
    }

    /// Hue lookup table for the configured arity, ordered by symbol value
    /// `0..M`. `M=2` is binary reddish/blueish, `M=3` adds white at the
    /// midpoint, `M=4` spaces four hues evenly across the range.
    pub fn hue_table(&self) -> Vec<Hue> {
        match self.m_ary {
            2 => vec![Hue::Reddish, Hue::Blueish],
            3 => vec![Hue::Reddish, Hue::White, Hue::Blueish],
            4 => vec![
                Hue::Reddish,
                Hue::Fractional(-1.0 / 3.0),
                Hue::Fractional(1.0 / 3.0),
                Hue::Blueish,
            ],
            other => unreachable!("validated m_ary out of range: {other}"),
        }
    }

    /// Bits carried per transmitted symbol.
    pub fn bits_per_symbol(&self) -> usize {
        match self.m_ary {
            2 => 1,
            3 => 1,
            4 => 2,
            other => unreachable!("validated m_ary out of range: {other}"),
        }
    }
}

/// Logging/diagnostics configuration shared between library callers and the
/// CLI. Kept separate from `ModemConfig` because it has no bearing on the
/// over-the-air signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub modem: ModemConfig,
    pub snr_db: Option<f64>,
    pub rng_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            modem: ModemConfig::default(),
            snr_db: None,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ModemConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_integer_samples_per_symbol() {
        let cfg = ModemConfig {
            kr: 7.0,
            ..ModemConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn samples_per_symbol_matches_working_rate_formula() {
        let cfg = ModemConfig::default();
        assert_eq!(cfg.samples_per_symbol().unwrap(), 20);
        assert_eq!(cfg.working_rate(), 100.0);
    }

    #[test]
    fn rejects_nyquist_violation() {
        let cfg = ModemConfig {
            fs: 1_000.0,
            cf: 10_000.0,
            bw: 50.0,
            ..ModemConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_barker_with_nonbinary_arity() {
        let cfg = ModemConfig {
            m_ary: 4,
            barker_sync: true,
            ..ModemConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn hue_table_sizes_match_arity() {
        for m in [2u8, 3, 4] {
            let cfg = ModemConfig {
                m_ary: m,
                ..ModemConfig::default()
            };
            assert_eq!(cfg.hue_table().len(), m as usize);
        }
    }
}
