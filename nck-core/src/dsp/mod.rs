//! Shared DSP primitives: Butterworth filtering and FFT-based resampling.

pub mod filters;
pub mod resample;

pub use filters::{Biquad, SosFilter};
pub use resample::resample;
