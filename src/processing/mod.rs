//! Processing Module
//!
//! Typed processing stages built on the analysis primitives.

pub mod check;

pub use check::{
    check_spectrum, run_check, CheckOutcome, CheckSpectrumInput, ProcessingValue, ResultCode,
    StageOutput, ValueType,
};
