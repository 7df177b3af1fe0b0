//! Stimulus generation
//!
//! Band-limited random noise is the stimulus the spectrum check is designed
//! around: it has a flat magnitude across the passband, so every retained
//! bin of the host recording carries energy.

use std::f64::consts::TAU;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{AudioQualityError, Result};

/// Generate band-limited random noise as 16-bit samples
///
/// The spectrum has unit magnitude and random phase on bins
/// `[N·f_low/rate, N·f_high/rate)` and is zero elsewhere. The result is
/// scaled so its largest absolute sample equals `peak_amplitude`.
///
/// # Arguments
/// * `peak_amplitude` - Peak absolute sample value
/// * `duration_ms` - Length of the signal in milliseconds
/// * `sampling_rate` - Sample rate in Hz
/// * `f_low` / `f_high` - Passband edges in Hz
/// * `stereo` - Interleave two identical channels
/// * `seed` - Fixed RNG seed for reproducible output
///
/// # Errors
/// * `InvalidParameter` - If the peak is not positive, the signal would be
///   empty or the passband maps to no bins
pub fn generate_random(
    peak_amplitude: i16,
    duration_ms: u32,
    sampling_rate: u32,
    f_low: u32,
    f_high: u32,
    stereo: bool,
    seed: Option<u64>,
) -> Result<Vec<i16>> {
    if peak_amplitude <= 0 {
        return Err(AudioQualityError::InvalidParameter {
            name: "peak_amplitude",
            reason: format!("{} must be greater than zero", peak_amplitude),
        });
    }
    if sampling_rate == 0 {
        return Err(AudioQualityError::InvalidParameter {
            name: "sampling_rate",
            reason: "must be greater than zero".to_string(),
        });
    }

    let n = (sampling_rate as u64 * duration_ms as u64 / 1000) as usize;
    if n < 2 {
        return Err(AudioQualityError::InvalidParameter {
            name: "duration_ms",
            reason: format!("{} ms at {} Hz is too short", duration_ms, sampling_rate),
        });
    }

    // DC and Nyquist stay empty so conjugate pairs never overlap
    let low = ((n as u64 * f_low as u64) / sampling_rate as u64).max(1) as usize;
    let high = (((n as u64 * f_high as u64) / sampling_rate as u64) as usize).min(n / 2);
    if high <= low {
        return Err(AudioQualityError::InvalidParameter {
            name: "f_high",
            reason: format!("band {}..{} Hz maps to no bins", f_low, f_high),
        });
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut spectrum = vec![Complex::new(0.0, 0.0); n];
    for k in low..high {
        let phase: f64 = rng.gen_range(0.0..TAU);
        let bin = Complex::from_polar(1.0, phase);
        spectrum[k] = bin;
        spectrum[n - k] = bin.conj();
    }

    let mut planner = FftPlanner::new();
    planner.plan_fft_inverse(n).process(&mut spectrum);

    let peak = spectrum.iter().map(|c| c.re.abs()).fold(0.0_f64, f64::max);
    if !(peak > 0.0) {
        return Err(AudioQualityError::InvalidParameter {
            name: "f_high",
            reason: "generated signal is silent".to_string(),
        });
    }

    let gain = peak_amplitude as f64 / peak;
    let mono: Vec<i16> = spectrum
        .iter()
        .map(|c| (c.re * gain).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        .collect();

    debug!(
        "generated {} samples, bins {}..{}, peak {}",
        n, low, high, peak_amplitude
    );

    if stereo {
        Ok(mono.iter().flat_map(|&s| [s, s]).collect())
    } else {
        Ok(mono)
    }
}

/// Generate a sine tone as 16-bit samples
pub fn sine(frequency: f64, amplitude: i16, len: usize, sampling_rate: u32) -> Vec<i16> {
    let angular_freq = TAU * frequency / sampling_rate.max(1) as f64;
    (0..len)
        .map(|i| ((angular_freq * i as f64).sin() * amplitude as f64).round() as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::magnitude_spectrum;

    #[test]
    fn test_length_and_peak() {
        let data = generate_random(10000, 1000, 44100, 500, 15000, false, Some(7)).unwrap();
        assert_eq!(data.len(), 44100);
        let peak = data.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert_eq!(peak, 10000);
    }

    #[test]
    fn test_stereo_interleaves_identical_channels() {
        let data = generate_random(8000, 100, 8000, 200, 3000, true, Some(1)).unwrap();
        assert_eq!(data.len(), 1600);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = generate_random(1000, 50, 16000, 100, 4000, false, Some(42)).unwrap();
        let b = generate_random(1000, 50, 16000, 100, 4000, false, Some(42)).unwrap();
        let c = generate_random(1000, 50, 16000, 100, 4000, false, Some(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_energy_stays_in_band() {
        let data = generate_random(10000, 1000, 8000, 1000, 2000, false, Some(3)).unwrap();
        let samples: Vec<f64> = data.iter().map(|&s| s as f64).collect();
        let spectrum = magnitude_spectrum(&samples, samples.len());

        let in_band: f64 = spectrum[1000..2000].iter().map(|m| m * m).sum();
        let below: f64 = spectrum[10..900].iter().map(|m| m * m).sum();
        let above: f64 = spectrum[2100..4000].iter().map(|m| m * m).sum();
        assert!(below < in_band * 1e-3);
        assert!(above < in_band * 1e-3);
    }

    #[test]
    fn test_invalid_band_rejected() {
        assert!(generate_random(1000, 100, 8000, 3000, 3000, false, None).is_err());
        assert!(generate_random(1000, 0, 8000, 100, 3000, false, None).is_err());
        assert!(generate_random(1000, 100, 0, 100, 3000, false, None).is_err());
    }

    #[test]
    fn test_non_positive_peak_rejected() {
        for peak in [0, -5000] {
            let err = generate_random(peak, 100, 8000, 200, 3000, false, Some(1)).unwrap_err();
            assert!(matches!(
                err,
                AudioQualityError::InvalidParameter {
                    name: "peak_amplitude",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_sine_amplitude() {
        let tone = sine(1000.0, 2000, 48, 48000);
        assert_eq!(tone[0], 0);
        assert_eq!(tone[12], 2000);
        assert_eq!(tone[36], -2000);
    }
}
