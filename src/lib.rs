//! # Fractal Spectrum
//!
//! Dual-estimator power spectral density analysis for fractal and
//! multifractal time series.
//!
//! The same signal is analysed two independent ways and the results are
//! compared on a log-log chart:
//!
//! - **Fourier**: Welch's averaged periodogram (Hamming window, 50% overlap)
//! - **Wavelet**: mean squared Daubechies detail coefficient per dyadic scale,
//!   placed at the octave-band centre frequency `0.75 · fs / 2^j`
//!
//! Both feed a thin rendering layer ([`log_view`]) that hands log-transformed
//! series to any [`PlotSink`]. The numerical building blocks, weighted
//! least-squares line fitting ([`regression`]) and elementwise exponentiation
//! with exact fast paths ([`power`]), are public for the scaling analyses
//! built on top.
//!
//! ## Quick Start
//!
//! ```rust
//! use fractal_spectrum::{compare_psd, generate_white_noise, GeneratorConfig, LogBase, RecordingSink};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let signal = generate_white_noise(&GeneratorConfig {
//!         length: 8192,
//!         seed: Some(7),
//!         ..Default::default()
//!     })?;
//!
//!     let mut sink = RecordingSink::new();
//!     let comparison = compare_psd(&signal, 1.0, 4096, None, 2, LogBase::Base2, &mut sink)?;
//!
//!     println!("Welch: {} bins", comparison.fourier.len());
//!     for (f, s) in comparison.wavelet.estimate.points() {
//!         println!("f = {:.5}  S = {:.4}", f, s);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for configurations and results
//! - `parallel`: run the two estimators concurrently with rayon

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod math_utils;
pub mod spectrum;

// Numerical primitives
pub mod power;
pub mod regression;

// Estimators
pub mod compare;
pub mod generators;
pub mod log_view;
pub mod wavelet;
pub mod wavelet_psd;
pub mod welch;

// Re-exports for convenience - main public API
pub use compare::{compare_psd, compare_psd_with_config, PsdComparison};
pub use config::ComparisonConfig;
pub use errors::{SpectralAnalysisError, SpectralResult};
pub use spectrum::SpectralEstimate;

// Estimator exports
pub use wavelet_psd::{
    fit_spectral_slope, scale_frequency, wavelet_estimation, ScaleSpectrum, WaveletPsdConfig,
    WaveletPsdEstimator,
};
pub use welch::{welch_estimation, WelchConfig, WelchEstimator};

// Decomposition exports
pub use wavelet::{
    DaubechiesWavelet, DecompositionParams, DyadicDecomposition, Formalism, FormalismParams,
    RegressionWeighting, ScaleCoefficientMap, WaveletDecomposition, WaveletFamily,
};

// Primitive exports
pub use power::{power, Exponent, ExponentClass};
pub use regression::{fit, fit_unweighted, regression_weights, RegressionFit, RegressionWeights};

// Rendering exports
pub use log_view::{
    render, to_log_series, DelimitedTextSink, LogBase, LogLogChart, LogSeries, PlotSink,
    RecordingSink,
};

// FFT operations exports
pub use fft_ops::{clear_fft_cache, get_cached_fft_forward, DetrendingMethod, WindowType};

// Data generation exports
pub use generators::{
    generate_fractional_gaussian_noise, generate_sinusoid, generate_white_noise, GeneratorConfig,
};
