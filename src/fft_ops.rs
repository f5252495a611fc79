//! FFT plumbing for the periodogram estimators.
//!
//! Provides an LRU cache of `rustfft` plans, the window functions used to taper
//! Welch segments, segment detrending, and a one-sided power spectrum helper.
//! FFT plans are immutable once built, so sharing them across threads and
//! across estimator calls does not couple the estimates.

use crate::errors::{validate_allocation_size, SpectralAnalysisError, SpectralResult};
use lru::LruCache;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner, Length};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex};

/// Maximum number of cached plans
const MAX_CACHE_ENTRIES: usize = 64;
/// Maximum FFT size (2^24 points)
pub const MAX_FFT_SIZE: usize = 1 << 24;

type FftPlanCache = LruCache<usize, Arc<dyn Fft<f64>>>;

static FFT_CACHE: LazyLock<Mutex<FftPlanCache>> = LazyLock::new(|| {
    Mutex::new(LruCache::new(
        NonZeroUsize::new(MAX_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
    ))
});

/// Check an FFT length before any buffer of that length is allocated.
pub fn validate_fft_size(size: usize) -> SpectralResult<()> {
    if size == 0 {
        return Err(SpectralAnalysisError::FftError { size });
    }
    if size > MAX_FFT_SIZE {
        return Err(SpectralAnalysisError::InvalidParameter {
            parameter: "fft_size".to_string(),
            value: size as f64,
            constraint: format!("must be <= {}", MAX_FFT_SIZE),
        });
    }
    let bytes = size
        .checked_mul(std::mem::size_of::<Complex64>())
        .unwrap_or(usize::MAX);
    validate_allocation_size(bytes, "FFT buffer")
}

/// Get a cached forward FFT plan of the given size.
pub fn get_cached_fft_forward(size: usize) -> SpectralResult<Arc<dyn Fft<f64>>> {
    validate_fft_size(size)?;

    // A poisoned lock only means another thread panicked mid-insert; plans are still valid
    let mut cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(plan) = cache.get(&size) {
        return Ok(Arc::clone(plan));
    }

    let plan = FftPlanner::new().plan_fft_forward(size);
    cache.put(size, Arc::clone(&plan));
    Ok(plan)
}

/// Drop every cached plan.
pub fn clear_fft_cache() {
    let mut cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    cache.clear();
}

/// Number of plans currently cached.
pub fn fft_cache_len() -> usize {
    match FFT_CACHE.lock() {
        Ok(guard) => guard.len(),
        Err(poisoned) => poisoned.into_inner().len(),
    }
}

/// Taper applied to each Welch segment.
///
/// All windows use the periodic (DFT-even) definition, i.e. a symmetric window
/// of length `n + 1` with its last sample dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowType {
    /// No taper
    Rectangular,
    /// `0.5 - 0.5 cos(2πn/N)`
    Hann,
    /// `0.54 - 0.46 cos(2πn/N)`
    #[default]
    Hamming,
}

impl WindowType {
    /// Window coefficients of length `n`.
    pub fn coefficients(self, n: usize) -> Vec<f64> {
        match self {
            WindowType::Rectangular => vec![1.0; n],
            WindowType::Hann => cosine_window(n, 0.5),
            WindowType::Hamming => cosine_window(n, 0.54),
        }
    }
}

/// Generalised periodic Hamming window `α - (1 - α) cos(2πk/n)`.
fn cosine_window(n: usize, alpha: f64) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|k| alpha - (1.0 - alpha) * (2.0 * PI * k as f64 / n as f64).cos())
        .collect()
}

/// Detrending applied to each segment before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DetrendingMethod {
    /// Use the raw samples
    #[default]
    None,
    /// Subtract the segment mean
    RemoveMean,
    /// Subtract the least-squares line through the segment
    RemoveLinear,
}

/// Apply detrending to a segment.
pub fn detrend_signal(data: &[f64], method: DetrendingMethod) -> Vec<f64> {
    match method {
        DetrendingMethod::None => data.to_vec(),

        DetrendingMethod::RemoveMean => {
            if data.is_empty() {
                return Vec::new();
            }
            let mean = data.iter().sum::<f64>() / data.len() as f64;
            data.iter().map(|&x| x - mean).collect()
        }

        DetrendingMethod::RemoveLinear => {
            let n = data.len() as f64;
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            let mut sum_xy = 0.0;
            let mut sum_x2 = 0.0;

            for (i, &y) in data.iter().enumerate() {
                let x = i as f64;
                sum_x += x;
                sum_y += y;
                sum_xy += x * y;
                sum_x2 += x * x;
            }

            let det = n * sum_x2 - sum_x * sum_x;
            if det.abs() < f64::MIN_POSITIVE {
                // One sample: no line to fit
                return detrend_signal(data, DetrendingMethod::RemoveMean);
            }

            let slope = (n * sum_xy - sum_x * sum_y) / det;
            let intercept = (sum_y - slope * sum_x) / n;

            data.iter()
                .enumerate()
                .map(|(i, &y)| y - (intercept + slope * i as f64))
                .collect()
        }
    }
}

/// `|X_k|²` for `k = 0 ..= n_fft/2` of the zero-padded real input.
///
/// `data` longer than `n_fft` is truncated.
pub fn one_sided_power_spectrum(data: &[f64], n_fft: usize) -> SpectralResult<Vec<f64>> {
    let fft = get_cached_fft_forward(n_fft)?;
    Ok(one_sided_power_spectrum_with(fft.as_ref(), data))
}

/// [`one_sided_power_spectrum`] with a plan the caller already holds; the
/// FFT length is the plan's.
pub fn one_sided_power_spectrum_with(fft: &dyn Fft<f64>, data: &[f64]) -> Vec<f64> {
    let n_fft = fft.len();
    let mut buffer: Vec<Complex64> = data
        .iter()
        .take(n_fft)
        .map(|&x| Complex64::new(x, 0.0))
        .collect();
    buffer.resize(n_fft, Complex64::new(0.0, 0.0));

    fft.process(&mut buffer);

    buffer[..=n_fft / 2].iter().map(|c| c.norm_sqr()).collect()
}
