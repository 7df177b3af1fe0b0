//! Check-spectrum processing stage
//!
//! The stage takes its inputs as an ordered list of typed values:
//!
//! | # | value        | type   |
//! |---|--------------|--------|
//! | 0 | host record  | Mono   |
//! | 1 | DUT record   | Mono   |
//! | 2 | sample rate  | I64    |
//! | 3 | low freq Hz  | I64    |
//! | 4 | high freq Hz | I64    |
//! | 5 | margin low % | Double |
//! | 6 | margin high %| Double |
//!
//! The list is validated once, at the boundary, into [`CheckSpectrumInput`].
//! The host record is aligned to the DUT record by cross-correlation before
//! the spectra are compared.

use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{align, compare_spectrum, estimate_delay, SpectrumParams, SpectrumVerdict};
use crate::error::{AudioQualityError, Result};

/// Type tag of a stage value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Mono,
    I64,
    Double,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Mono => "MONO",
            ValueType::I64 => "I64",
            ValueType::Double => "DOUBLE",
        };
        f.write_str(name)
    }
}

/// A typed value passed into or out of a processing stage
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingValue {
    /// Mono 16-bit samples
    Mono(Vec<i16>),
    /// 64-bit integer scalar
    I64(i64),
    /// Double precision scalar
    Double(f64),
}

impl ProcessingValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            ProcessingValue::Mono(_) => ValueType::Mono,
            ProcessingValue::I64(_) => ValueType::I64,
            ProcessingValue::Double(_) => ValueType::Double,
        }
    }
}

/// Stage result code
///
/// `Ok` means the stage ran to completion but the verdict failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultCode {
    Pass,
    Ok,
    Error,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Pass => "PASS",
            ResultCode::Ok => "OK",
            ResultCode::Error => "ERROR",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ResultCode::Pass)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a processing stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub result: ResultCode,
    pub values: Vec<ProcessingValue>,
}

impl StageOutput {
    fn error() -> Self {
        Self {
            result: ResultCode::Error,
            values: Vec::new(),
        }
    }

    /// Type tags of the output values
    pub fn types(&self) -> Vec<ValueType> {
        self.values.iter().map(ProcessingValue::value_type).collect()
    }
}

const INPUT_SIGNATURE: [ValueType; 7] = [
    ValueType::Mono,
    ValueType::Mono,
    ValueType::I64,
    ValueType::I64,
    ValueType::I64,
    ValueType::Double,
    ValueType::Double,
];

/// Validated inputs of the check-spectrum stage
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSpectrumInput {
    pub host: Vec<i16>,
    pub dut: Vec<i16>,
    pub params: SpectrumParams,
}

impl CheckSpectrumInput {
    pub fn new(host: Vec<i16>, dut: Vec<i16>, params: SpectrumParams) -> Self {
        Self { host, dut, params }
    }

    /// Validate an ordered list of stage values
    ///
    /// # Errors
    /// * `InvalidInputTypes` - If the count or any type tag does not match,
    ///   or a scalar is out of range
    pub fn from_values(values: &[ProcessingValue]) -> Result<Self> {
        if values.len() != INPUT_SIGNATURE.len() {
            return Err(AudioQualityError::InvalidInputTypes {
                reason: format!(
                    "expected {} values, got {}",
                    INPUT_SIGNATURE.len(),
                    values.len()
                ),
            });
        }

        for (index, (value, expected)) in values.iter().zip(INPUT_SIGNATURE.iter()).enumerate() {
            if value.value_type() != *expected {
                return Err(AudioQualityError::InvalidInputTypes {
                    reason: format!(
                        "value {} is {}, expected {}",
                        index,
                        value.value_type(),
                        expected
                    ),
                });
            }
        }

        match values {
            [
                ProcessingValue::Mono(host),
                ProcessingValue::Mono(dut),
                ProcessingValue::I64(rate),
                ProcessingValue::I64(f_low),
                ProcessingValue::I64(f_high),
                ProcessingValue::Double(margin_low),
                ProcessingValue::Double(margin_high),
            ] => {
                let params = SpectrumParams {
                    sampling_rate: scalar_u32("sampling_rate", *rate, 1)?,
                    f_low: scalar_u32("f_low", *f_low, 0)?,
                    f_high: scalar_u32("f_high", *f_high, 0)?,
                    margin_low: *margin_low,
                    margin_high: *margin_high,
                };
                Ok(Self::new(host.clone(), dut.clone(), params))
            }
            _ => Err(AudioQualityError::InvalidInputTypes {
                reason: "value layout does not match signature".to_string(),
            }),
        }
    }

    /// Stage values in signature order
    pub fn to_values(&self) -> Vec<ProcessingValue> {
        vec![
            ProcessingValue::Mono(self.host.clone()),
            ProcessingValue::Mono(self.dut.clone()),
            ProcessingValue::I64(self.params.sampling_rate as i64),
            ProcessingValue::I64(self.params.f_low as i64),
            ProcessingValue::I64(self.params.f_high as i64),
            ProcessingValue::Double(self.params.margin_low),
            ProcessingValue::Double(self.params.margin_high),
        ]
    }
}

fn scalar_u32(name: &str, value: i64, min: i64) -> Result<u32> {
    if value < min || value > u32::MAX as i64 {
        return Err(AudioQualityError::InvalidInputTypes {
            reason: format!("{} = {} is out of range", name, value),
        });
    }
    Ok(value as u32)
}

/// Result of a completed check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Offset of the DUT recording inside the host recording, in samples
    pub delay: usize,
    pub verdict: SpectrumVerdict,
}

impl CheckOutcome {
    pub fn result_code(&self) -> ResultCode {
        if self.verdict.pass {
            ResultCode::Pass
        } else {
            ResultCode::Ok
        }
    }
}

/// Align the host recording to the DUT recording and compare spectra
pub fn run_check(input: &CheckSpectrumInput) -> Result<CheckOutcome> {
    let host: Vec<f64> = input.host.iter().map(|&s| s as f64).collect();
    let dut: Vec<f64> = input.dut.iter().map(|&s| s as f64).collect();

    let delay = estimate_delay(&host, &dut)?;
    info!("delay {}, device recording samples {}", delay, dut.len());

    let aligned = align(&host, delay, dut.len());
    let verdict = compare_spectrum(aligned, &dut, &input.params)?;

    info!(
        "positive_max {:.4}, negative_min {:.4}, pass {}",
        verdict.positive_max, verdict.negative_min, verdict.pass
    );

    Ok(CheckOutcome { delay, verdict })
}

/// Run the check-spectrum stage on untyped stage values
///
/// Invalid inputs and analysis failures both produce `ResultCode::Error`
/// with no outputs. Otherwise the outputs are
/// `[Double(negative_min), Double(positive_max), Mono(transfer function × 256)]`.
pub fn check_spectrum(values: &[ProcessingValue]) -> StageOutput {
    let input = match CheckSpectrumInput::from_values(values) {
        Ok(input) => input,
        Err(e) => {
            warn!("check_spectrum: {}", e);
            return StageOutput::error();
        }
    };

    match run_check(&input) {
        Ok(outcome) => StageOutput {
            result: outcome.result_code(),
            values: vec![
                ProcessingValue::Double(outcome.verdict.negative_min),
                ProcessingValue::Double(outcome.verdict.positive_max),
                ProcessingValue::Mono(outcome.verdict.fixed_point()),
            ],
        },
        Err(e) => {
            warn!("check_spectrum: {} ({})", e, e.error_code());
            StageOutput::error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::generate_random;

    fn stimulus() -> Vec<i16> {
        generate_random(10000, 1000, 44100, 500, 15000, false, Some(11)).unwrap()
    }

    fn params() -> SpectrumParams {
        SpectrumParams {
            sampling_rate: 44100,
            f_low: 500,
            f_high: 15000,
            margin_low: 1.0,
            margin_high: 1.0,
        }
    }

    #[test]
    fn test_self_check_passes() {
        let host = stimulus();
        let input = CheckSpectrumInput::new(host.clone(), host, params());
        let output = check_spectrum(&input.to_values());

        assert_eq!(output.result, ResultCode::Pass);
        assert_eq!(
            output.types(),
            vec![ValueType::Double, ValueType::Double, ValueType::Mono]
        );
        match &output.values[2] {
            ProcessingValue::Mono(tf) => {
                assert_eq!(tf.len(), 169);
                assert!(tf.iter().all(|&v| v == 256 || v == 255));
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_delayed_capture_is_aligned() {
        let host = stimulus();
        let dut = host[3000..3000 + 8192].to_vec();
        let outcome = run_check(&CheckSpectrumInput::new(host, dut, params())).unwrap();

        assert_eq!(outcome.delay, 3000);
        assert!(outcome.verdict.pass);
        assert_eq!(outcome.result_code(), ResultCode::Pass);
    }

    #[test]
    fn test_filtered_capture_reports_ok() {
        let host = stimulus();
        let dut: Vec<i16> = (0..host.len())
            .map(|i| {
                let prev = if i > 0 { host[i - 1] as i32 } else { 0 };
                ((host[i] as i32 + prev) / 2) as i16
            })
            .collect();
        let output = check_spectrum(&CheckSpectrumInput::new(host, dut, params()).to_values());
        assert_eq!(output.result, ResultCode::Ok);
        assert_eq!(output.values.len(), 3);
    }

    #[test]
    fn test_wrong_type_is_error() {
        let host = stimulus();
        let mut values = CheckSpectrumInput::new(host.clone(), host, params()).to_values();
        values[5] = ProcessingValue::I64(1);

        let output = check_spectrum(&values);
        assert_eq!(output.result, ResultCode::Error);
        assert!(output.values.is_empty());

        let err = CheckSpectrumInput::from_values(&values).unwrap_err();
        assert!(err.to_string().contains("value 5 is I64, expected DOUBLE"));
    }

    #[test]
    fn test_wrong_arity_is_error() {
        let values = vec![ProcessingValue::Mono(vec![1, 2, 3])];
        assert_eq!(check_spectrum(&values).result, ResultCode::Error);
    }

    #[test]
    fn test_out_of_range_scalar_is_error() {
        let host = stimulus();
        let mut values = CheckSpectrumInput::new(host.clone(), host, params()).to_values();
        values[2] = ProcessingValue::I64(0);
        assert!(matches!(
            CheckSpectrumInput::from_values(&values),
            Err(AudioQualityError::InvalidInputTypes { .. })
        ));

        values[2] = ProcessingValue::I64(44100);
        values[3] = ProcessingValue::I64(-5);
        assert_eq!(check_spectrum(&values).result, ResultCode::Error);
    }

    #[test]
    fn test_silent_host_is_error() {
        let dut = stimulus();
        let host = vec![0; dut.len()];
        let output = check_spectrum(&CheckSpectrumInput::new(host, dut, params()).to_values());
        assert_eq!(output.result, ResultCode::Error);
    }

    #[test]
    fn test_result_code_labels() {
        assert_eq!(ResultCode::Pass.to_string(), "PASS");
        assert_eq!(ResultCode::Ok.as_str(), "OK");
        assert_eq!(
            serde_json::to_string(&ResultCode::Error).unwrap(),
            "\"ERROR\""
        );
    }
}
