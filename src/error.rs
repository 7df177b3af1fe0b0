//! Error handling for audio-quality checks
//!
//! Every error carries a stable code and, where it helps an operator,
//! recovery suggestions.

use thiserror::Error;

/// Result type alias for audio-quality operations
pub type Result<T> = std::result::Result<T, AudioQualityError>;

/// Main error type for audio-quality operations
#[derive(Error, Debug)]
pub enum AudioQualityError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Parameter Errors
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid stage inputs: {reason}")]
    InvalidInputTypes { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // Analysis Errors
    #[error("Empty frequency band: bins [{low}, {high}) of {fft_size}-point FFT")]
    EmptyBand {
        low: usize,
        high: usize,
        fft_size: usize,
    },

    #[error("Degenerate reference spectrum: host magnitude at bin {bin} is {magnitude}")]
    DegenerateReference { bin: usize, magnitude: f64 },

    #[error("Degenerate transfer function: mean ratio is {mean}")]
    DegenerateTransferFunction { mean: f64 },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AudioQualityError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AudioQualityError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AudioQualityError::InvalidAudio { .. } => "INVALID_AUDIO",
            AudioQualityError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AudioQualityError::EmptyAudio => "EMPTY_AUDIO",
            AudioQualityError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AudioQualityError::InvalidInputTypes { .. } => "INVALID_INPUT_TYPES",
            AudioQualityError::Config { .. } => "CONFIG_ERROR",
            AudioQualityError::EmptyBand { .. } => "EMPTY_BAND",
            AudioQualityError::DegenerateReference { .. } => "DEGENERATE_REFERENCE",
            AudioQualityError::DegenerateTransferFunction { .. } => "DEGENERATE_TRANSFER_FUNCTION",
            AudioQualityError::Io(_) => "IO_ERROR",
            AudioQualityError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error can be fixed by re-running with different inputs
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AudioQualityError::FileNotFound { .. }
                | AudioQualityError::InvalidParameter { .. }
                | AudioQualityError::Config { .. }
                | AudioQualityError::EmptyBand { .. }
                | AudioQualityError::DegenerateReference { .. }
                | AudioQualityError::DegenerateTransferFunction { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AudioQualityError::FileNotFound { .. } => vec![
                "Check the recording path is correct",
                "Verify the capture step completed and wrote its output",
            ],
            AudioQualityError::InvalidAudio { .. }
            | AudioQualityError::UnsupportedFormat { .. } => vec![
                "Re-export the recording as 16-bit PCM WAV",
                "Check if the file plays in another application",
            ],
            AudioQualityError::EmptyBand { .. } => vec![
                "Widen the band: f_high must map to a higher FFT bin than f_low",
                "Use a longer host recording to increase FFT resolution",
            ],
            AudioQualityError::DegenerateReference { .. } => vec![
                "The host stimulus has no energy in part of the band",
                "Regenerate the stimulus with a passband covering f_low..f_high",
            ],
            AudioQualityError::DegenerateTransferFunction { .. } => vec![
                "The device recording is silent across the band",
                "Check the DUT capture path and input gain",
            ],
            AudioQualityError::Config { .. } => vec![
                "Check the JSON config file against the documented fields",
                "Ensure margins are non-negative and f_low < f_high",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AudioQualityError::FileNotFound {
            path: "host.wav".to_string(),
            source: None,
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");

        let err = AudioQualityError::DegenerateReference {
            bin: 7,
            magnitude: 0.0,
        };
        assert_eq!(err.error_code(), "DEGENERATE_REFERENCE");
        assert!(err.to_string().contains("bin 7"));
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = AudioQualityError::EmptyBand {
            low: 10,
            high: 10,
            fft_size: 64,
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());
        assert!(!AudioQualityError::EmptyAudio.is_recoverable());
    }
}
