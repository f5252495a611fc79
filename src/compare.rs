//! Top-level Fourier vs. wavelet PSD comparison.
//!
//! Runs both estimators on the same signal, then renders the two estimates as
//! overlaid log-log series. The estimators share nothing: each call builds
//! its own Welch buffers and its own decomposition context.

use crate::config::ComparisonConfig;
use crate::errors::{validate_all_finite, validate_sampling_frequency, SpectralResult};
use crate::log_view::{build_chart, LogBase, PlotSink};
use crate::regression::RegressionFit;
use crate::spectrum::SpectralEstimate;
use crate::wavelet_psd::{
    fit_spectral_slope, slope_reference_line, ScaleSpectrum, WaveletPsdConfig,
    WaveletPsdEstimator,
};
use crate::welch::{WelchConfig, WelchEstimator};

/// Legend label of the Welch series.
pub const FOURIER_LABEL: &str = "Fourier";
/// Legend label of the wavelet series.
pub const WAVELET_LABEL: &str = "Wavelet";

/// Both estimates of one comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct PsdComparison {
    /// Welch estimate, ascending frequency
    pub fourier: SpectralEstimate,
    /// Wavelet estimate with scale bookkeeping, descending frequency
    pub wavelet: ScaleSpectrum,
    /// Fitted spectral slope, when an overlay was requested
    pub slope: Option<RegressionFit>,
}

/// Estimate the PSD both ways and render the log-log comparison.
///
/// `n_fft` and `segment_size` configure the Welch estimator (see
/// [`WelchConfig`]), `n_moments` the Daubechies order of the wavelet
/// estimator.
///
/// # Example
/// ```rust
/// use fractal_spectrum::compare::compare_psd;
/// use fractal_spectrum::log_view::{LogBase, RecordingSink};
///
/// let signal: Vec<f64> = (0..2048).map(|i| (i as f64 * 0.3).sin()).collect();
/// let mut sink = RecordingSink::new();
/// let result = compare_psd(&signal, 1.0, 512, None, 2, LogBase::Base2, &mut sink).unwrap();
/// assert_eq!(result.fourier.len(), 257);
/// assert_eq!(sink.charts.len(), 1);
/// ```
pub fn compare_psd(
    signal: &[f64],
    fs: f64,
    n_fft: usize,
    segment_size: Option<usize>,
    n_moments: usize,
    log_base: LogBase,
    sink: &mut dyn PlotSink,
) -> SpectralResult<PsdComparison> {
    let config = ComparisonConfig {
        welch: WelchConfig::with_lengths(n_fft, segment_size),
        wavelet: WaveletPsdConfig::with_moments(n_moments),
        log_base,
        slope_overlay: None,
    };
    compare_psd_with_config(signal, fs, &config, sink)
}

/// [`compare_psd`] driven by a full [`ComparisonConfig`].
pub fn compare_psd_with_config(
    signal: &[f64],
    fs: f64,
    config: &ComparisonConfig,
    sink: &mut dyn PlotSink,
) -> SpectralResult<PsdComparison> {
    validate_sampling_frequency(fs)?;
    validate_all_finite(signal, "signal")?;

    let welch = WelchEstimator::new(config.welch.clone());
    let wavelet = WaveletPsdEstimator::new(config.wavelet.clone());

    #[cfg(feature = "parallel")]
    let (fourier, scale_spectrum) = rayon::join(
        || welch.estimate(signal, fs),
        || wavelet.estimate_detailed(signal, fs),
    );

    #[cfg(not(feature = "parallel"))]
    let (fourier, scale_spectrum) = (
        welch.estimate(signal, fs),
        wavelet.estimate_detailed(signal, fs),
    );

    let fourier = fourier?;
    let scale_spectrum = scale_spectrum?;

    let mut chart = build_chart(
        &[&fourier, &scale_spectrum.estimate],
        &[FOURIER_LABEL, WAVELET_LABEL],
        config.log_base,
    )?;

    let slope = match config.slope_overlay {
        Some((j_min, j_max)) => {
            let line = fit_spectral_slope(
                &scale_spectrum,
                j_min,
                j_max,
                config.wavelet.formalism.weighting,
                config.log_base,
            )?;
            chart = chart.with_reference_line(slope_reference_line(
                &scale_spectrum,
                &line,
                j_min,
                j_max,
                config.log_base,
            ));
            Some(line)
        }
        None => None,
    };

    sink.render(&chart)?;

    Ok(PsdComparison {
        fourier,
        wavelet: scale_spectrum,
        slope,
    })
}
