//! CLI Command Implementations
//!
//! Each command returns whether the run counts as a pass. The binary maps
//! a failed verdict to a non-zero exit status.

use std::path::Path;

use log::{info, warn};

use crate::analysis::estimate_delay;
use crate::config::CheckConfig;
use crate::engine::{export_interleaved, export_recording, import_recording, SampleBuffer};
use crate::error::{AudioQualityError, Result};
use crate::processing::{run_check, CheckSpectrumInput};
use crate::report::{CheckReport, RecordingInfo};
use crate::signal::generate_random;

/// Overrides for `check` given on the command line
#[derive(Debug, Clone, Default)]
pub struct CheckOverrides {
    pub f_low: Option<u32>,
    pub f_high: Option<u32>,
    pub margin_low: Option<f64>,
    pub margin_high: Option<f64>,
}

impl CheckOverrides {
    /// Apply the overrides on top of `config` and re-validate
    pub fn apply(&self, mut config: CheckConfig) -> Result<CheckConfig> {
        if let Some(f_low) = self.f_low {
            config.f_low = f_low;
        }
        if let Some(f_high) = self.f_high {
            config.f_high = f_high;
        }
        if let Some(margin_low) = self.margin_low {
            config.margin_low = margin_low;
        }
        if let Some(margin_high) = self.margin_high {
            config.margin_high = margin_high;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Load both recordings and require a common sample rate
fn load_pair(host_path: &Path, dut_path: &Path) -> Result<(SampleBuffer, SampleBuffer)> {
    let host = import_recording(host_path)?;
    let dut = import_recording(dut_path)?;

    if host.sample_rate != dut.sample_rate {
        return Err(AudioQualityError::InvalidParameter {
            name: "sample_rate",
            reason: format!(
                "host is {} Hz but DUT is {} Hz",
                host.sample_rate, dut.sample_rate
            ),
        });
    }
    if dut.len() > host.len() {
        warn!(
            "DUT recording ({} samples) is longer than host ({} samples)",
            dut.len(),
            host.len()
        );
    }

    Ok((host, dut))
}

/// Run the spectrum check on two WAV recordings.
pub fn check(
    host_path: &Path,
    dut_path: &Path,
    config_path: Option<&Path>,
    overrides: &CheckOverrides,
    report_path: Option<&Path>,
    tf_path: Option<&Path>,
) -> Result<bool> {
    info!(
        "Checking {} against {}",
        dut_path.display(),
        host_path.display()
    );

    let config = match config_path {
        Some(path) => CheckConfig::load(path)?,
        None => CheckConfig::default(),
    };
    let config = overrides.apply(config)?;

    let (host, dut) = load_pair(host_path, dut_path)?;
    let params = config.spectrum_params(host.sample_rate);

    let host_info = RecordingInfo::from_file(host_path, &host)?;
    let dut_info = RecordingInfo::from_file(dut_path, &dut)?;

    let outcome = run_check(&CheckSpectrumInput::new(host.samples, dut.samples, params))?;
    let report = CheckReport::new(&outcome, params, host_info, dut_info);

    println!("{}", report.summary());

    if let Some(path) = report_path {
        report.write_json(path)?;
        println!("Report written to: {}", path.display());
    }

    if let Some(path) = tf_path {
        let tf = SampleBuffer::new(report.transfer_function.clone(), params.sampling_rate);
        export_recording(&tf, path)?;
        println!("Transfer function written to: {}", path.display());
    }

    Ok(report.result.is_pass())
}

/// Print the estimated delay of the DUT recording.
pub fn delay(host_path: &Path, dut_path: &Path) -> Result<bool> {
    let (host, dut) = load_pair(host_path, dut_path)?;
    let delay = estimate_delay(&host.as_f64(), &dut.as_f64())?;

    println!(
        "Delay: {} samples ({:.2} ms)",
        delay,
        delay as f64 * 1000.0 / host.sample_rate as f64
    );

    Ok(true)
}

/// Options for `generate`
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub peak: i16,
    pub duration_ms: u32,
    pub rate: u32,
    pub f_low: u32,
    pub f_high: u32,
    pub stereo: bool,
    pub seed: Option<u64>,
}

/// Write a band-limited random stimulus.
pub fn generate(output: &Path, options: &GenerateOptions) -> Result<bool> {
    info!("Generating stimulus: {}", output.display());

    let samples = generate_random(
        options.peak,
        options.duration_ms,
        options.rate,
        options.f_low,
        options.f_high,
        options.stereo,
        options.seed,
    )?;
    let channels = if options.stereo { 2 } else { 1 };
    export_interleaved(&samples, channels, options.rate, output)?;

    println!(
        "Stimulus written: {} ({} ms, {}-{} Hz, {} ch @ {} Hz)",
        output.display(),
        options.duration_ms,
        options.f_low,
        options.f_high,
        channels,
        options.rate
    );

    Ok(true)
}
