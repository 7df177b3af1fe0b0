//! Spectrum comparison between a host (reference) and a DUT recording
//!
//! The comparator estimates the device transfer function as the ratio of
//! DUT to host FFT magnitudes over a band of interest, normalizes it to a
//! unit mean and checks it against asymmetric tolerance margins.
//!
//! # Resolution
//! The FFT is capped at [`MAX_FFT_SIZE`] points. Longer recordings are
//! truncated to the first window, which coarsens the bins and gives the
//! curve an averaging effect.

use log::debug;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::{AudioQualityError, Result};

/// Upper bound on the FFT window size
pub const MAX_FFT_SIZE: usize = 512;

/// Scale applied when quantizing the normalized transfer function
pub const FIXED_POINT_SCALE: f64 = 256.0;

/// Parameters for a single spectrum comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumParams {
    /// Sampling rate of both recordings in Hz
    pub sampling_rate: u32,
    /// Lower edge of the band of interest in Hz
    pub f_low: u32,
    /// Upper edge of the band of interest in Hz
    pub f_high: u32,
    /// Allowed deviation below 1.0, in percent
    pub margin_low: f64,
    /// Allowed deviation above 1.0, in percent
    pub margin_high: f64,
}

/// Half-open range of retained FFT bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRange {
    pub low: usize,
    pub high: usize,
    pub fft_size: usize,
}

impl BinRange {
    /// Number of retained bins
    pub fn len(&self) -> usize {
        self.high.saturating_sub(self.low)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a spectrum comparison
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumVerdict {
    /// True when the transfer function stays inside both margins
    pub pass: bool,
    /// Smallest normalized ratio (absolute value)
    pub negative_min: f64,
    /// Largest normalized ratio (absolute value)
    pub positive_max: f64,
    /// Normalized transfer function, one value per retained bin
    pub transfer_function: Vec<f64>,
    /// Bins the transfer function covers
    pub bins: BinRange,
}

impl SpectrumVerdict {
    /// Transfer function in 8-bit fixed point (value × 256)
    pub fn fixed_point(&self) -> Vec<i16> {
        fixed_point(&self.transfer_function)
    }
}

/// Pick the FFT size for a host recording of `host_len` samples
pub fn fft_size(host_len: usize) -> usize {
    if host_len > MAX_FFT_SIZE {
        MAX_FFT_SIZE
    } else {
        host_len
    }
}

/// Map a frequency band onto FFT bin indices
///
/// Indices use integer floor division. `low` is clamped to `N/2 - 1` and
/// `high` to `N/2`, so a band above Nyquist never indexes past the
/// half spectrum.
pub fn bin_range(fft_size: usize, sampling_rate: u32, f_low: u32, f_high: u32) -> BinRange {
    let rate = sampling_rate.max(1) as u64;
    let n = fft_size as u64;
    let half = fft_size / 2;

    let low = ((n * f_low as u64) / rate) as usize;
    let high = ((n * f_high as u64) / rate) as usize;

    BinRange {
        low: low.min(half.saturating_sub(1)),
        high: high.min(half),
        fft_size,
    }
}

/// Magnitude spectrum of `samples` using an `n`-point FFT
///
/// Input longer than `n` is truncated and shorter input is zero-padded.
pub fn magnitude_spectrum(samples: &[f64], n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .take(n)
        .map(|&s| Complex::new(s, 0.0))
        .collect();
    buffer.resize(n, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer.iter().map(|c| c.norm()).collect()
}

/// Check a normalized transfer function against the margins
///
/// Returns `(pass, negative_min, positive_max)`.
pub fn evaluate_margins(
    transfer_function: &[f64],
    margin_low: f64,
    margin_high: f64,
) -> (bool, f64, f64) {
    let max = transfer_function
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let min = transfer_function
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    let positive_max = max.abs();
    let negative_min = min.abs();

    let pass = positive_max < (margin_high / 100.0 + 1.0)
        && (1.0 - negative_min) < margin_low / 100.0;

    (pass, negative_min, positive_max)
}

/// Compare the DUT spectrum against the host spectrum
///
/// Both recordings are expected to be time aligned already.
///
/// # Errors
/// * `EmptyAudio` - If either recording has no samples
/// * `InvalidParameter` - If the sampling rate is zero
/// * `EmptyBand` - If the band maps to no FFT bins
/// * `DegenerateReference` - If a retained host bin has zero magnitude
/// * `DegenerateTransferFunction` - If the DUT is silent across the band
pub fn compare_spectrum(
    host: &[f64],
    dut: &[f64],
    params: &SpectrumParams,
) -> Result<SpectrumVerdict> {
    if host.is_empty() || dut.is_empty() {
        return Err(AudioQualityError::EmptyAudio);
    }
    if params.sampling_rate == 0 {
        return Err(AudioQualityError::InvalidParameter {
            name: "sampling_rate",
            reason: "must be greater than zero".to_string(),
        });
    }

    let n = fft_size(host.len());
    let bins = bin_range(n, params.sampling_rate, params.f_low, params.f_high);
    debug!(
        "f_low {} -> bin {}, f_high {} -> bin {}, rate {}, fft {}",
        params.f_low, bins.low, params.f_high, bins.high, params.sampling_rate, n
    );

    if bins.is_empty() {
        return Err(AudioQualityError::EmptyBand {
            low: bins.low,
            high: bins.high,
            fft_size: n,
        });
    }

    let host_spectrum = magnitude_spectrum(host, n);
    let dut_spectrum = magnitude_spectrum(dut, n);

    let mut ratios = Vec::with_capacity(bins.len());
    for bin in bins.low..bins.high {
        let reference = host_spectrum[bin];
        if !(reference > 0.0) || !reference.is_finite() {
            return Err(AudioQualityError::DegenerateReference {
                bin,
                magnitude: reference,
            });
        }
        ratios.push(dut_spectrum[bin] / reference);
    }

    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    if !(mean > 0.0) || !mean.is_finite() {
        return Err(AudioQualityError::DegenerateTransferFunction { mean });
    }

    let transfer_function: Vec<f64> = ratios.iter().map(|r| r / mean).collect();
    let (pass, negative_min, positive_max) =
        evaluate_margins(&transfer_function, params.margin_low, params.margin_high);

    debug!("positive_max {} negative_min {}", positive_max, negative_min);

    Ok(SpectrumVerdict {
        pass,
        negative_min,
        positive_max,
        transfer_function,
        bins,
    })
}

/// Quantize values to 8-bit fixed point
///
/// Each value is multiplied by 256 and truncated toward zero, saturating at
/// the `i16` range.
pub fn fixed_point(values: &[f64]) -> Vec<i16> {
    values.iter().map(|v| (v * FIXED_POINT_SCALE) as i16).collect()
}
