//! NCK error types with granular categories

use thiserror::Error;

/// Top-level error type for all NCK operations
#[derive(Debug, Error)]
pub enum NckError {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("FEC error: {0}")]
    Fec(#[from] FecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("DSP processing error: {0}")]
    Dsp(#[from] DspError),
}

/// Encoding/modulation-specific errors
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Invalid block size: expected {expected}, got {actual}")]
    InvalidBlockSize { expected: usize, actual: usize },

    #[error("Message length {message_len} exceeds maximum {max_len}")]
    MessageTooLong { message_len: usize, max_len: usize },

    #[error("Generator matrix dimension mismatch: message={message_bits}, matrix_rows={matrix_rows}")]
    GeneratorDimensionMismatch {
        message_bits: usize,
        matrix_rows: usize,
    },

    #[error("Invalid modulation parameters: {details}")]
    InvalidModulation { details: String },
}

/// Demodulation/decoding-specific errors
#[derive(Debug, Error)]
pub enum DecodingError {
    #[error("Barker sync not found after {symbols_searched} symbols")]
    SyncNotFound { symbols_searched: usize },

    #[error("Invalid codeword: syndrome check failed")]
    InvalidCodeword,

    #[error("Demodulation failed: {reason}")]
    DemodulationFailed { reason: String },

    #[error("CRC mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("Insufficient samples: need {required}, have {available}")]
    InsufficientSamples { required: usize, available: usize },

    #[error("Belief propagation did not converge after {iterations} iterations")]
    ConvergenceFailed { iterations: usize },
}

/// FEC codec-specific errors (Hamming, Golay, LDPC, FT8)
#[derive(Debug, Error)]
pub enum FecError {
    #[error("Matrix construction failed: {reason}")]
    MatrixConstructionFailed { reason: String },

    #[error("Invalid code rate: k={k}, n={n}")]
    InvalidCodeRate { k: usize, n: usize },

    #[error("Parity check matrix has incompatible dimensions: {rows}x{cols}")]
    IncompatibleMatrixDimensions { rows: usize, cols: usize },

    #[error("Maximum iterations {max_iter} exceeded without convergence")]
    MaxIterationsExceeded { max_iter: usize },

    #[error("Uncorrectable error pattern")]
    Uncorrectable,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid sample rate: {rate} Hz (must be > 0)")]
    InvalidSampleRate { rate: f64 },

    #[error("Nyquist violation: carrier {carrier_hz} Hz requires sample rate > {min_required_hz} Hz, got {actual_hz} Hz")]
    NyquistViolation {
        carrier_hz: f64,
        min_required_hz: f64,
        actual_hz: f64,
    },

    #[error("Invalid bandwidth: {rate} Hz (must be > 0)")]
    InvalidSymbolRate { rate: usize },

    #[error("Invalid SNR: {snr_db} dB (must be finite)")]
    InvalidSnr { snr_db: f64 },

    #[error("Invalid modem configuration: {reason}")]
    InvalidFrameLayout { reason: String },
}

/// DSP processing errors
#[derive(Debug, Error)]
pub enum DspError {
    #[error("FFT size {size} is not a power of 2")]
    InvalidFftSize { size: usize },

    #[error("Filter design failed: {reason}")]
    FilterDesignFailed { reason: String },

    #[error("Resampling failed: {reason}")]
    ResampleFailed { reason: String },

    #[error("Buffer underrun: requested {requested}, available {available}")]
    BufferUnderrun { requested: usize, available: usize },
}

/// Result type alias for NCK operations
pub type Result<T> = std::result::Result<T, NckError>;
