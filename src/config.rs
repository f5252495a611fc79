//! # Comparison Configuration
//!
//! Settings for the dual-estimator comparison: the Welch and wavelet
//! estimator settings, the logarithm used for the chart, and an optional
//! spectral slope overlay.

use crate::log_view::LogBase;
use crate::wavelet_psd::WaveletPsdConfig;
use crate::welch::WelchConfig;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of a PSD comparison run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonConfig {
    /// Fourier (Welch) estimator settings
    pub welch: WelchConfig,
    /// Wavelet estimator settings
    pub wavelet: WaveletPsdConfig,
    /// Logarithm applied to both chart axes
    pub log_base: LogBase,
    /// Scale range `(j_min, j_max)` of the fitted slope line, if drawn
    pub slope_overlay: Option<(usize, usize)>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            welch: WelchConfig::default(),
            wavelet: WaveletPsdConfig::default(),
            log_base: LogBase::Base2,
            slope_overlay: None,
        }
    }
}

impl ComparisonConfig {
    /// Fine resolution: 16384-point FFT and segments, db3 wavelet
    pub fn fine_resolution() -> Self {
        Self {
            welch: WelchConfig::with_lengths(16_384, None),
            wavelet: WaveletPsdConfig::with_moments(3),
            ..Self::default()
        }
    }

    /// Coarse resolution: short segments for heavier averaging
    pub fn coarse_resolution() -> Self {
        Self {
            welch: WelchConfig::with_lengths(1024, Some(256)),
            ..Self::default()
        }
    }

    /// Same settings with a slope line fitted over scales `[j_min, j_max]`
    pub fn with_slope_overlay(mut self, j_min: usize, j_max: usize) -> Self {
        self.slope_overlay = Some((j_min, j_max));
        self
    }

    /// Same settings with a different logarithm
    pub fn with_log_base(mut self, log_base: LogBase) -> Self {
        self.log_base = log_base;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft_ops::WindowType;

    #[test]
    fn test_default_matches_estimator_defaults() {
        let config = ComparisonConfig::default();
        assert_eq!(config.welch.n_fft, 4096);
        assert_eq!(config.welch.segment_size, None);
        assert_eq!(config.welch.window, WindowType::Hamming);
        assert_eq!(config.wavelet.n_moments, 2);
        assert_eq!((config.wavelet.j1, config.wavelet.j2), (1, 13));
        assert_eq!(config.log_base, LogBase::Base2);
        assert!(config.slope_overlay.is_none());
    }

    #[test]
    fn test_presets() {
        let fine = ComparisonConfig::fine_resolution();
        assert_eq!(fine.welch.resolved_lengths().unwrap(), (16_384, 16_384));
        assert_eq!(fine.wavelet.n_moments, 3);

        let coarse = ComparisonConfig::coarse_resolution();
        assert_eq!(coarse.welch.resolved_lengths().unwrap(), (1024, 256));

        let overlay = ComparisonConfig::default()
            .with_slope_overlay(2, 8)
            .with_log_base(LogBase::Natural);
        assert_eq!(overlay.slope_overlay, Some((2, 8)));
        assert_eq!(overlay.log_base, LogBase::Natural);
    }
}
