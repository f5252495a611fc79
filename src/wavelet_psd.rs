//! Wavelet power spectral density.
//!
//! The signal is decomposed once; the energy at scale `j` is the mean of the
//! squared detail coefficients and is placed at the octave-band centre
//! frequency `0.75 · fs / 2^j`. Points come out by increasing scale, i.e. by
//! decreasing frequency.

use crate::errors::{
    validate_data_length, validate_sampling_frequency, SpectralAnalysisError, SpectralResult,
};
use crate::log_view::{LogBase, LogSeries};
use crate::math_utils::constants::OCTAVE_CENTER_FACTOR;
use crate::math_utils::mean;
use crate::power::power;
use crate::regression::{fit, RegressionFit};
use crate::spectrum::SpectralEstimate;
use crate::wavelet::{
    DecompositionParams, DyadicDecomposition, FormalismParams, RegressionWeighting,
    WaveletDecomposition, WaveletFamily,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wavelet estimator settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaveletPsdConfig {
    /// Daubechies order (vanishing moments)
    pub n_moments: usize,
    /// Finest scale
    pub j1: usize,
    /// Coarsest scale
    pub j2: usize,
    /// Formalism settings forwarded to the decomposition
    pub formalism: FormalismParams,
}

impl Default for WaveletPsdConfig {
    fn default() -> Self {
        Self {
            n_moments: 2,
            j1: 1,
            j2: 13,
            formalism: FormalismParams::default(),
        }
    }
}

impl WaveletPsdConfig {
    /// Default settings with a given wavelet order.
    pub fn with_moments(n_moments: usize) -> Self {
        Self {
            n_moments,
            ..Self::default()
        }
    }

    fn decomposition_params(&self) -> DecompositionParams {
        DecompositionParams {
            family: WaveletFamily::Daubechies(self.n_moments),
            j1: self.j1,
            j2: self.j2,
            formalism: self.formalism.clone(),
        }
    }
}

/// Wavelet spectrum with its scale bookkeeping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleSpectrum {
    /// Scale index of each point
    pub scales: Vec<usize>,
    /// Number of coefficients behind each point
    pub coefficient_counts: Vec<usize>,
    /// Frequencies and energies
    pub estimate: SpectralEstimate,
}

impl ScaleSpectrum {
    /// Drop the scale bookkeeping.
    pub fn into_estimate(self) -> SpectralEstimate {
        self.estimate
    }
}

/// Centre frequency of dyadic scale `j`.
pub fn scale_frequency(fs: f64, j: usize) -> f64 {
    OCTAVE_CENTER_FACTOR * fs / 2f64.powi(j as i32)
}

/// Per-scale energy estimator over a [`WaveletDecomposition`].
#[derive(Debug, Clone, Default)]
pub struct WaveletPsdEstimator<D = DyadicDecomposition> {
    config: WaveletPsdConfig,
    decomposition: D,
}

impl WaveletPsdEstimator<DyadicDecomposition> {
    /// Estimator over the default dyadic decomposition.
    pub fn new(config: WaveletPsdConfig) -> Self {
        Self {
            config,
            decomposition: DyadicDecomposition,
        }
    }
}

impl<D: WaveletDecomposition> WaveletPsdEstimator<D> {
    /// Estimator over a custom decomposition.
    pub fn with_decomposition(config: WaveletPsdConfig, decomposition: D) -> Self {
        Self {
            config,
            decomposition,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &WaveletPsdConfig {
        &self.config
    }

    /// Spectrum ordered by increasing scale.
    pub fn estimate(&self, signal: &[f64], fs: f64) -> SpectralResult<SpectralEstimate> {
        self.estimate_detailed(signal, fs).map(ScaleSpectrum::into_estimate)
    }

    /// Spectrum together with the scale index and coefficient count of every point.
    pub fn estimate_detailed(&self, signal: &[f64], fs: f64) -> SpectralResult<ScaleSpectrum> {
        validate_sampling_frequency(fs)?;

        // The coefficient map lives only for this call
        let params = self.config.decomposition_params();
        let coefficients = self.decomposition.decompose(signal, &params)?;

        if coefficients.is_empty() {
            return Err(SpectralAnalysisError::DecompositionError {
                reason: "decomposition returned no scales".to_string(),
            });
        }
        if !coefficients.is_contiguous() {
            return Err(SpectralAnalysisError::DecompositionError {
                reason: format!(
                    "scales {:?} do not form a contiguous range",
                    coefficients.scales().collect::<Vec<_>>()
                ),
            });
        }

        let n_scales = coefficients.len();
        let mut scales = Vec::with_capacity(n_scales);
        let mut counts = Vec::with_capacity(n_scales);
        let mut frequencies = Vec::with_capacity(n_scales);
        let mut values = Vec::with_capacity(n_scales);

        for (j, coeffs) in coefficients.iter() {
            if coeffs.is_empty() {
                return Err(SpectralAnalysisError::DecompositionError {
                    reason: format!("scale {} has no coefficients", j),
                });
            }
            scales.push(j);
            counts.push(coeffs.len());
            frequencies.push(scale_frequency(fs, j));
            values.push(mean(&power(coeffs, 2)));
        }

        log::debug!(
            "wavelet PSD: {} samples, db{}, scales {}..={}",
            signal.len(),
            self.config.n_moments,
            scales[0],
            scales[n_scales - 1]
        );

        Ok(ScaleSpectrum {
            scales,
            coefficient_counts: counts,
            estimate: SpectralEstimate::new(frequencies, values)?,
        })
    }
}

/// Wavelet PSD with the default scale range and formalism settings.
pub fn wavelet_estimation(
    signal: &[f64],
    fs: f64,
    n_moments: usize,
) -> SpectralResult<SpectralEstimate> {
    WaveletPsdEstimator::new(WaveletPsdConfig::with_moments(n_moments)).estimate(signal, fs)
}

/// Fit `log S = slope · log f + intercept` over scales `[j_min, j_max]`.
///
/// For fractional Gaussian noise the slope is `1 - 2H`.
pub fn fit_spectral_slope(
    spectrum: &ScaleSpectrum,
    j_min: usize,
    j_max: usize,
    weighting: RegressionWeighting,
    base: LogBase,
) -> SpectralResult<RegressionFit> {
    if j_max <= j_min {
        return Err(SpectralAnalysisError::InvalidParameter {
            parameter: "j_max".to_string(),
            value: j_max as f64,
            constraint: format!("> j_min ({})", j_min),
        });
    }

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut w = Vec::new();
    for (i, &j) in spectrum.scales.iter().enumerate() {
        if j < j_min || j > j_max {
            continue;
        }
        let value = spectrum.estimate.values()[i];
        if value <= 0.0 {
            return Err(SpectralAnalysisError::NumericalError {
                reason: format!("zero energy at scale {}", j),
                operation: Some("fit_spectral_slope".to_string()),
            });
        }
        x.push(base.apply(spectrum.estimate.frequencies()[i]));
        y.push(base.apply(value));
        w.push(match weighting {
            RegressionWeighting::Uniform => 1.0,
            RegressionWeighting::CoefficientCount => spectrum.coefficient_counts[i] as f64,
        });
    }

    validate_data_length(&x, 2, "spectral slope scales")?;
    fit(&x, &y, &w, true)
}

/// Reference line for a fitted slope, spanning the fitted scales.
pub fn slope_reference_line(
    spectrum: &ScaleSpectrum,
    line: &RegressionFit,
    j_min: usize,
    j_max: usize,
    base: LogBase,
) -> LogSeries {
    let x: Vec<f64> = spectrum
        .scales
        .iter()
        .zip(spectrum.estimate.frequencies())
        .filter(|&(&j, _)| j >= j_min && j <= j_max)
        .map(|(_, &f)| base.apply(f))
        .collect();
    let y = x.iter().map(|&xi| line.predict(xi)).collect();
    LogSeries {
        label: format!("slope = {:.3}", line.slope),
        x,
        y,
    }
}
