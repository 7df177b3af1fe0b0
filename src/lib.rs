//! Audio Quality - Host/DUT spectrum check
//!
//! Compares the frequency response of a device-under-test recording against
//! the host stimulus it was captured from.
//!
//! # Pipeline
//!
//! - Delay estimation: locate the DUT capture inside the host recording
//! - Spectrum comparison: normalized DUT/host transfer function checked
//!   against asymmetric margins
//! - Reporting: verdict, error bounds and fixed-point transfer function

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod processing;
pub mod report;
pub mod signal;

pub use error::{AudioQualityError, Result};
