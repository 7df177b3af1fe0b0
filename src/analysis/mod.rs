//! Analysis Module
//!
//! Numeric building blocks of the audio-quality check:
//! - Delay estimation by cross-correlation
//! - Host/DUT spectrum comparison

pub mod delay;
pub mod spectrum;

pub use delay::{align, cross_correlation, estimate_delay};
pub use spectrum::{
    bin_range, compare_spectrum, evaluate_margins, fft_size, fixed_point, magnitude_spectrum,
    BinRange, SpectrumParams, SpectrumVerdict, FIXED_POINT_SCALE, MAX_FFT_SIZE,
};
