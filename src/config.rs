//! Check configuration
//!
//! Band and margin settings for a spectrum check, loaded from a JSON file.
//! Fields left out of the file take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::SpectrumParams;
use crate::error::{AudioQualityError, Result};

/// Default lower band edge in Hz
pub const DEFAULT_F_LOW: u32 = 500;
/// Default upper band edge in Hz
pub const DEFAULT_F_HIGH: u32 = 15000;
/// Default margin on either side, in percent
pub const DEFAULT_MARGIN: f64 = 1.0;

/// Band and tolerance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Lower edge of the band of interest in Hz
    pub f_low: u32,
    /// Upper edge of the band of interest in Hz
    pub f_high: u32,
    /// Allowed deviation below 1.0, in percent
    pub margin_low: f64,
    /// Allowed deviation above 1.0, in percent
    pub margin_high: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            f_low: DEFAULT_F_LOW,
            f_high: DEFAULT_F_HIGH,
            margin_low: DEFAULT_MARGIN,
            margin_high: DEFAULT_MARGIN,
        }
    }
}

impl CheckConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AudioQualityError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        let config: CheckConfig =
            serde_json::from_str(&content).map_err(|e| AudioQualityError::Config {
                reason: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.margin_low >= 0.0) || !(self.margin_high >= 0.0) {
            return Err(AudioQualityError::Config {
                reason: format!(
                    "margins must be non-negative (low {}, high {})",
                    self.margin_low, self.margin_high
                ),
            });
        }
        if self.f_low >= self.f_high {
            return Err(AudioQualityError::Config {
                reason: format!(
                    "f_low ({} Hz) must be below f_high ({} Hz)",
                    self.f_low, self.f_high
                ),
            });
        }
        Ok(())
    }

    /// Comparator parameters for recordings at `sampling_rate`
    pub fn spectrum_params(&self, sampling_rate: u32) -> SpectrumParams {
        SpectrumParams {
            sampling_rate,
            f_low: self.f_low,
            f_high: self.f_high,
            margin_low: self.margin_low,
            margin_high: self.margin_high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("check.json");
        fs::write(&path, r#"{ "margin_high": 3.5 }"#).unwrap();

        let config = CheckConfig::load(&path).unwrap();
        assert_eq!(config.f_low, DEFAULT_F_LOW);
        assert_eq!(config.f_high, DEFAULT_F_HIGH);
        assert_eq!(config.margin_low, DEFAULT_MARGIN);
        assert_eq!(config.margin_high, 3.5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("check.json");
        let config = CheckConfig {
            f_low: 100,
            f_high: 8000,
            margin_low: 2.0,
            margin_high: 4.0,
        };
        config.save(&path).unwrap();
        assert_eq!(CheckConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let inverted = CheckConfig {
            f_low: 9000,
            f_high: 8000,
            ..CheckConfig::default()
        };
        assert!(inverted.validate().is_err());

        let negative = CheckConfig {
            margin_low: -1.0,
            ..CheckConfig::default()
        };
        assert_eq!(negative.validate().unwrap_err().error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("check.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CheckConfig::load(&path),
            Err(AudioQualityError::Config { .. })
        ));
    }

    #[test]
    fn test_spectrum_params() {
        let params = CheckConfig::default().spectrum_params(44100);
        assert_eq!(params.sampling_rate, 44100);
        assert_eq!(params.f_low, 500);
        assert_eq!(params.f_high, 15000);
    }
}
