//! Delay estimation between a host and a DUT recording
//!
//! The DUT capture starts some unknown number of samples after the host
//! stimulus. The lag is found as the peak of the cross-correlation, which
//! is computed in the frequency domain.

use log::debug;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{AudioQualityError, Result};

/// Estimate where `dut` starts inside `host`, in samples
///
/// Only lags where the DUT recording fits completely inside the host
/// recording are searched (`0..=host.len() - dut.len()`). A DUT recording
/// longer than the host yields a delay of 0.
///
/// # Errors
/// * `EmptyAudio` - If either recording has no samples
pub fn estimate_delay(host: &[f64], dut: &[f64]) -> Result<usize> {
    if host.is_empty() || dut.is_empty() {
        return Err(AudioQualityError::EmptyAudio);
    }

    let max_lag = host.len().saturating_sub(dut.len());
    if max_lag == 0 {
        return Ok(0);
    }

    let correlation = cross_correlation(host, dut);

    let (delay, peak) = correlation
        .iter()
        .take(max_lag + 1)
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (lag, &value)| {
            if value > best.1 {
                (lag, value)
            } else {
                best
            }
        });

    debug!(
        "delay {} samples (peak {:.3}), search range 0..={}",
        delay, peak, max_lag
    );

    Ok(delay)
}

/// Slice `len` samples of `host` starting at `delay`
///
/// The slice is shorter than `len` when the host recording ends first.
pub fn align<T>(host: &[T], delay: usize, len: usize) -> &[T] {
    let start = delay.min(host.len());
    let end = start.saturating_add(len).min(host.len());
    &host[start..end]
}

/// Non-negative lags of the cross-correlation `r[k] = Σ host[k + i] · dut[i]`
///
/// Both inputs are zero-padded to a power of two that avoids circular
/// wrap-around, so entry `k` is exact for `k < host.len()`.
pub fn cross_correlation(host: &[f64], dut: &[f64]) -> Vec<f64> {
    if host.is_empty() || dut.is_empty() {
        return Vec::new();
    }

    let size = (host.len() + dut.len() - 1).next_power_of_two();

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let mut host_spectrum = padded(host, size);
    let mut dut_spectrum = padded(dut, size);
    forward.process(&mut host_spectrum);
    forward.process(&mut dut_spectrum);

    let mut product: Vec<Complex<f64>> = host_spectrum
        .iter()
        .zip(dut_spectrum.iter())
        .map(|(h, d)| h * d.conj())
        .collect();
    inverse.process(&mut product);

    // rustfft leaves the inverse unnormalized
    let scale = 1.0 / size as f64;
    product
        .iter()
        .take(host.len())
        .map(|c| c.re * scale)
        .collect()
}

fn padded(samples: &[f64], size: usize) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    buffer.resize(size, Complex::new(0.0, 0.0));
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn chirp(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 8000.0;
                (2.0 * std::f64::consts::PI * (200.0 + 1500.0 * t) * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_recovers_known_delay() {
        let host = chirp(4000);
        for delay in [0usize, 1, 37, 1000, 2999] {
            let dut = host[delay..delay + 1000].to_vec();
            assert_eq!(estimate_delay(&host, &dut).unwrap(), delay);
        }
    }

    #[test]
    fn test_delay_survives_gain_and_noise_floor() {
        let host = chirp(3000);
        let dut: Vec<f64> = host[512..1512]
            .iter()
            .enumerate()
            .map(|(i, s)| 0.3 * s + 0.001 * ((i % 7) as f64 - 3.0))
            .collect();
        assert_eq!(estimate_delay(&host, &dut).unwrap(), 512);
    }

    #[test]
    fn test_dut_longer_than_host() {
        let host = chirp(100);
        let dut = chirp(200);
        assert_eq!(estimate_delay(&host, &dut).unwrap(), 0);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            estimate_delay(&[], &[1.0]),
            Err(AudioQualityError::EmptyAudio)
        ));
    }

    #[test]
    fn test_cross_correlation_matches_direct_sum() {
        let host = [1.0, 2.0, -1.0, 0.5, 3.0];
        let dut = [0.5, -2.0];
        let fast = cross_correlation(&host, &dut);
        assert_eq!(fast.len(), host.len());

        for (lag, value) in fast.iter().enumerate() {
            let direct: f64 = dut
                .iter()
                .enumerate()
                .filter(|(i, _)| lag + i < host.len())
                .map(|(i, d)| host[lag + i] * d)
                .sum();
            assert_abs_diff_eq!(*value, direct, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_align_clamps_to_host() {
        let host = [1, 2, 3, 4, 5];
        assert_eq!(align(&host, 1, 3), &[2, 3, 4]);
        assert_eq!(align(&host, 3, 10), &[4, 5]);
        assert!(align(&host, 9, 2).is_empty());
    }
}
