//! Property tests for the two PSD estimators and the numerical primitives
//! they build on.

use assert_approx_eq::assert_approx_eq;
use fractal_spectrum::{
    fit, generate_sinusoid, generate_white_noise, power, scale_frequency, to_log_series,
    welch_estimation, GeneratorConfig, LogBase, SpectralEstimate, WaveletPsdConfig,
    WaveletPsdEstimator, WelchConfig, WelchEstimator,
};

#[test]
fn test_sinusoid_peak_location() {
    let fs = 100.0;
    let f0 = 12.5;
    let signal = generate_sinusoid(8192, fs, f0, 1.0, 0.3).unwrap();
    let estimate = welch_estimation(&signal, fs, 2048, None).unwrap();

    let f = estimate.frequencies();
    assert_eq!(f[0], 0.0);
    assert_approx_eq!(f[f.len() - 1], fs / 2.0, 1e-12);
    assert!(f.windows(2).all(|w| w[0] <= w[1]));

    let peak = estimate.peak_frequency().unwrap();
    let resolution = fs / 2048.0;
    assert!((peak - f0).abs() <= resolution, "peak at {}", peak);
}

#[test]
fn test_segment_larger_than_fft_is_promoted() {
    let signal = generate_white_noise(&GeneratorConfig {
        length: 5000,
        seed: Some(12),
        ..Default::default()
    })
    .unwrap();
    let promoted = welch_estimation(&signal, 2.0, 256, Some(1024)).unwrap();
    let explicit = welch_estimation(&signal, 2.0, 1024, Some(1024)).unwrap();
    assert_eq!(promoted, explicit);

    let config = WelchConfig::with_lengths(256, Some(1024));
    assert_eq!(config.resolved_lengths().unwrap(), (1024, 1024));
    assert_eq!(WelchEstimator::new(config).estimate(&signal, 2.0).unwrap(), explicit);
}

#[test]
fn test_wavelet_frequencies_are_exact() {
    let signal = generate_white_noise(&GeneratorConfig {
        length: 3000,
        seed: Some(4),
        ..Default::default()
    })
    .unwrap();
    for n_moments in 1..=4 {
        let spectrum = WaveletPsdEstimator::new(WaveletPsdConfig::with_moments(n_moments))
            .estimate_detailed(&signal, 44_100.0)
            .unwrap();
        for (&j, &f) in spectrum.scales.iter().zip(spectrum.estimate.frequencies()) {
            assert_eq!(f, (0.75 * 44_100.0) / 2f64.powi(j as i32));
            assert_eq!(f, scale_frequency(44_100.0, j));
        }
    }
}

#[test]
fn test_regression_recovers_line() {
    let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.5 - 3.0).collect();
    let y: Vec<f64> = x.iter().map(|&xi| -1.75 * xi + 0.4).collect();
    let line = fit(&x, &y, &vec![2.5; 20], true).unwrap();
    assert_approx_eq!(line.slope, -1.75, 1e-12);
    assert_approx_eq!(line.intercept, 0.4, 1e-12);

    // Reference: Var(a) = 1 / Σ w (x - x̄)² for unit-variance noise
    let mean_x = x.iter().sum::<f64>() / x.len() as f64;
    let spread: f64 = x.iter().map(|&xi| 2.5 * (xi - mean_x).powi(2)).sum();
    assert_approx_eq!(line.slope_variance.unwrap(), 1.0 / spread, 1e-14);
}

#[test]
fn test_power_fast_paths_match_generic() {
    let values: Vec<f64> = (0..50).map(|i| i as f64 * 0.37 - 4.0).collect();
    assert_eq!(power(&values, 1), values);
    let squared: Vec<f64> = values.iter().map(|v| v * v).collect();
    assert_eq!(power(&values, 2), squared);
    for e in 1..=10 {
        for (p, v) in power(&values, e).iter().zip(&values) {
            let reference = v.powi(e);
            assert!(
                (p - reference).abs() <= 1e-12 * reference.abs().max(1.0),
                "{}^{}: {} vs {}",
                v,
                e,
                p,
                reference
            );
        }
    }
}

#[test]
fn test_log_view_drops_zero_frequency() {
    let estimate = SpectralEstimate::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(to_log_series(&estimate, "s", LogBase::Base2).len(), 2);
    assert_eq!(to_log_series(&estimate, "s", LogBase::Natural).len(), 2);
}
