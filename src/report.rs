//! Check report
//!
//! A JSON record of a single spectrum check. It is kept as test evidence
//! next to the recordings it was computed from.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{BinRange, SpectrumParams};
use crate::engine::{file_sha256, SampleBuffer};
use crate::error::Result;
use crate::processing::{CheckOutcome, ResultCode};

/// Identification of an input recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub path: PathBuf,
    pub sha256: String,
    pub samples: usize,
    pub sample_rate: u32,
}

impl RecordingInfo {
    /// Describe a recording loaded from `path`
    pub fn from_file(path: &Path, buffer: &SampleBuffer) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            sha256: file_sha256(path)?,
            samples: buffer.len(),
            sample_rate: buffer.sample_rate,
        })
    }
}

/// Report of one host/DUT spectrum check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub result: ResultCode,
    pub delay_samples: usize,
    pub negative_min: f64,
    pub positive_max: f64,
    pub bins: BinRange,
    pub params: SpectrumParams,
    /// Normalized transfer function in 8-bit fixed point
    pub transfer_function: Vec<i16>,
    pub host: RecordingInfo,
    pub dut: RecordingInfo,
    pub generated_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn new(
        outcome: &CheckOutcome,
        params: SpectrumParams,
        host: RecordingInfo,
        dut: RecordingInfo,
    ) -> Self {
        Self {
            result: outcome.result_code(),
            delay_samples: outcome.delay,
            negative_min: outcome.verdict.negative_min,
            positive_max: outcome.verdict.positive_max,
            bins: outcome.verdict.bins,
            params,
            transfer_function: outcome.verdict.fixed_point(),
            host,
            dut,
            generated_at: Utc::now(),
        }
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a report written by [`CheckReport::write_json`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Generate a summary string for display
    pub fn summary(&self) -> String {
        let bin_hz = self.params.sampling_rate as f64 / self.bins.fft_size.max(1) as f64;
        let low_hz = self.bins.low as f64 * bin_hz;
        let high_hz = self.bins.high as f64 * bin_hz;
        format!(
            "Result: {}\n\
             Delay: {} samples\n\
             Band: {:.0}-{:.0} Hz (bins {}..{} of {})\n\
             Min: {:.4} (margin -{}%) | Max: {:.4} (margin +{}%)",
            self.result,
            self.delay_samples,
            low_hz,
            high_hz,
            self.bins.low,
            self.bins.high,
            self.bins.fft_size,
            self.negative_min,
            self.params.margin_low,
            self.positive_max,
            self.params.margin_high
        )
    }
}
