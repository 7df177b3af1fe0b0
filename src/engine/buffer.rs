//! Recording Buffer
//!
//! A captured recording as the check sees it: mono, 16-bit, with its
//! sampling rate. Host stimuli and DUT captures share this type.

use crate::error::{AudioQualityError, Result};

/// Full-scale value used when converting between i16 and float samples
const I16_FULL_SCALE: f32 = 32768.0;

/// Mono 16-bit recording
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Sample data
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from existing samples
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a mono buffer from interleaved samples, keeping `channel`
    ///
    /// # Errors
    /// * `InvalidParameter` - If `channel` is out of range or `channels` is zero
    /// * `InvalidAudio` - If the sample count is not a multiple of `channels`
    pub fn from_interleaved(
        interleaved: &[i16],
        channels: usize,
        channel: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channels == 0 || channel >= channels {
            return Err(AudioQualityError::InvalidParameter {
                name: "channel",
                reason: format!("channel {} of {}", channel, channels),
            });
        }
        if interleaved.len() % channels != 0 {
            return Err(AudioQualityError::InvalidAudio {
                reason: format!(
                    "Sample count {} is not divisible by channel count {}",
                    interleaved.len(),
                    channels
                ),
                source: None,
            });
        }

        let samples = interleaved
            .iter()
            .skip(channel)
            .step_by(channels)
            .copied()
            .collect();
        Ok(Self::new(samples, sample_rate))
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples as f64, unscaled
    pub fn as_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&s| s as f64).collect()
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Convert a float sample in [-1.0, 1.0] to i16 full scale
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * I16_FULL_SCALE).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
