//! Fourier power spectral density by Welch's averaged periodogram.
//!
//! The estimate is computed the way the multifractal toolbox has always done
//! it: Hamming-windowed segments with 50% overlap, no detrending, one-sided
//! density scaling against an internal sampling rate of `2π`, arithmetic mean
//! over segments, then multiplied by 4. The frequency axis, by contrast, is in
//! the caller's units: `fs · k / n_fft` for `k = 0 ..= n_fft/2`.
//!
//! The ×4 and the `2π` convention belong together; for unit-variance white
//! noise the result is flat at `4/π`.

use crate::errors::{
    validate_all_finite, validate_sampling_frequency, SpectralAnalysisError, SpectralResult,
};
use crate::fft_ops::{
    detrend_signal, get_cached_fft_forward, one_sided_power_spectrum_with, validate_fft_size,
    DetrendingMethod, WindowType,
};
use crate::math_utils::constants::{TWO_PI, WELCH_ONE_SIDED_CORRECTION};
use crate::spectrum::SpectralEstimate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default FFT length.
pub const DEFAULT_N_FFT: usize = 4096;

/// Welch estimator settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WelchConfig {
    /// FFT length; raised to `segment_size` when smaller
    pub n_fft: usize,
    /// Segment length; `None` means `n_fft`
    pub segment_size: Option<usize>,
    /// Segment taper
    pub window: WindowType,
    /// Per-segment detrending
    pub detrend: DetrendingMethod,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            n_fft: DEFAULT_N_FFT,
            segment_size: None,
            window: WindowType::Hamming,
            detrend: DetrendingMethod::None,
        }
    }
}

impl WelchConfig {
    /// Default settings with the given FFT and segment lengths.
    pub fn with_lengths(n_fft: usize, segment_size: Option<usize>) -> Self {
        Self {
            n_fft,
            segment_size,
            ..Self::default()
        }
    }

    /// Resolve `(n_fft, segment_size)`: the segment defaults to `n_fft`, and
    /// `n_fft` is raised to cover one full segment. The resolved `n_fft` must
    /// not exceed [`MAX_FFT_SIZE`](crate::fft_ops::MAX_FFT_SIZE).
    pub fn resolved_lengths(&self) -> SpectralResult<(usize, usize)> {
        let segment = self.segment_size.unwrap_or(self.n_fft);
        if segment == 0 {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "segment_size".to_string(),
                value: 0.0,
                constraint: "must be > 0".to_string(),
            });
        }
        let n_fft = self.n_fft.max(segment);
        validate_fft_size(n_fft)?;
        Ok((n_fft, segment))
    }
}

/// Welch averaged-periodogram estimator.
#[derive(Debug, Clone, Default)]
pub struct WelchEstimator {
    config: WelchConfig,
}

impl WelchEstimator {
    /// Estimator with the given settings.
    pub fn new(config: WelchConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &WelchConfig {
        &self.config
    }

    /// Estimate the PSD of `signal` sampled at `fs`.
    ///
    /// Returns `n_fft/2 + 1` points spanning `[0, fs/2]` in ascending order.
    ///
    /// # Errors
    /// - `InsufficientData` for an empty signal
    /// - `InvalidParameter` for a bad `fs`, a zero segment size, or a signal so
    ///   short that the clamped segment no longer exceeds the overlap
    /// - `NumericalError` for non-finite samples
    pub fn estimate(&self, signal: &[f64], fs: f64) -> SpectralResult<SpectralEstimate> {
        validate_sampling_frequency(fs)?;
        if signal.is_empty() {
            return Err(SpectralAnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        validate_all_finite(signal, "signal")?;

        let (n_fft, requested_segment) = self.config.resolved_lengths()?;
        let overlap = requested_segment / 2;

        let segment = if signal.len() < requested_segment {
            log::warn!(
                "segment size {} exceeds signal length {}; using {}",
                requested_segment,
                signal.len(),
                signal.len()
            );
            signal.len()
        } else {
            requested_segment
        };

        if overlap >= segment {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "overlap".to_string(),
                value: overlap as f64,
                constraint: format!(
                    "must be less than the segment length {} (signal has {} samples)",
                    segment,
                    signal.len()
                ),
            });
        }

        let step = segment - overlap;
        let n_segments = (signal.len() - overlap) / step;
        log::debug!(
            "welch: n_fft={}, segment={}, overlap={}, segments={}",
            n_fft,
            segment,
            overlap,
            n_segments
        );

        let window = self.config.window.coefficients(segment);
        let window_energy: f64 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (TWO_PI * window_energy);

        let fft = get_cached_fft_forward(n_fft)?;
        let n_bins = n_fft / 2 + 1;
        let mut accumulated = vec![0.0; n_bins];
        for s in 0..n_segments {
            let start = s * step;
            let detrended = detrend_signal(&signal[start..start + segment], self.config.detrend);
            let tapered: Vec<f64> = detrended
                .iter()
                .zip(&window)
                .map(|(&x, &w)| x * w)
                .collect();
            let power = one_sided_power_spectrum_with(fft.as_ref(), &tapered);
            for (acc, p) in accumulated.iter_mut().zip(power) {
                *acc += p;
            }
        }

        // Fold negative frequencies: DC and (for even n_fft) Nyquist appear once
        let last_doubled = if n_fft % 2 == 0 { n_bins - 1 } else { n_bins };
        let values: Vec<f64> = accumulated
            .iter()
            .enumerate()
            .map(|(k, &sum)| {
                let fold = if k >= 1 && k < last_doubled { 2.0 } else { 1.0 };
                WELCH_ONE_SIDED_CORRECTION * fold * scale * sum / n_segments as f64
            })
            .collect();

        let frequencies: Vec<f64> = (0..n_bins)
            .map(|k| fs * k as f64 / n_fft as f64)
            .collect();

        SpectralEstimate::new(frequencies, values)
    }
}

/// Welch estimate with the default window and detrending.
///
/// `segment_size = None` uses `n_fft`; `n_fft` smaller than the segment is
/// raised to the segment length.
pub fn welch_estimation(
    signal: &[f64],
    fs: f64,
    n_fft: usize,
    segment_size: Option<usize>,
) -> SpectralResult<SpectralEstimate> {
    WelchEstimator::new(WelchConfig::with_lengths(n_fft, segment_size)).estimate(signal, fs)
}
