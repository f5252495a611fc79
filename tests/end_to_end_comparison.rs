//! End-to-end tests for the Fourier vs. wavelet PSD comparison
//!
//! These tests run the full pipeline on synthetic signals with known spectra
//! and check both estimates and what reaches the rendering sink.

use assert_approx_eq::assert_approx_eq;
use fractal_spectrum::{
    compare_psd, compare_psd_with_config, generate_fractional_gaussian_noise,
    generate_white_noise, ComparisonConfig, DelimitedTextSink, GeneratorConfig, LogBase,
    RecordingSink,
};

fn white_noise(length: usize, seed: u64) -> Vec<f64> {
    generate_white_noise(&GeneratorConfig {
        length,
        seed: Some(seed),
        ..Default::default()
    })
    .unwrap()
}

/// White noise of length 8192 at fs = 1 through the default pipeline.
#[test]
fn test_white_noise_end_to_end() {
    let signal = white_noise(8192, 2024);
    let mut sink = RecordingSink::new();
    let result = compare_psd(&signal, 1.0, 4096, None, 2, LogBase::Base2, &mut sink).unwrap();

    // Both estimators return non-negative values
    assert!(result.fourier.values().iter().all(|&v| v >= 0.0));
    assert!(result.wavelet.estimate.values().iter().all(|&v| v >= 0.0));

    // Fourier ascending over [0, fs/2]
    let f = result.fourier.frequencies();
    assert_eq!(f.len(), 2049);
    assert!(f.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(f[0], 0.0);
    assert_eq!(f[f.len() - 1], 0.5);

    // Wavelet descending, one point per scale produced
    let w = result.wavelet.estimate.frequencies();
    assert!(w.windows(2).all(|p| p[0] >= p[1]));
    assert_eq!(result.wavelet.scales.first(), Some(&1));
    // 8192 samples with db2 reach scale 11
    assert_eq!(result.wavelet.scales.last(), Some(&11));

    assert_eq!(sink.charts.len(), 1);
}

/// The Welch level of unit-variance white noise is 4/π in this convention.
#[test]
fn test_white_noise_levels() {
    let signal = white_noise(1 << 16, 7);
    let mut sink = RecordingSink::new();
    let result = compare_psd(&signal, 1.0, 1024, None, 2, LogBase::Base2, &mut sink).unwrap();

    let values = result.fourier.values();
    let interior = &values[1..values.len() - 1];
    let level = interior.iter().sum::<f64>() / interior.len() as f64;
    assert_approx_eq!(level, 4.0 / std::f64::consts::PI, 0.03);

    // Finest wavelet scales carry the unit variance
    for &v in &result.wavelet.estimate.values()[..4] {
        assert!((v - 1.0).abs() < 0.1, "wavelet energy {}", v);
    }
}

/// Long-memory noise: both spectra fall with frequency and the fitted
/// wavelet slope recovers 1 - 2H.
#[test]
fn test_fractional_noise_slope() {
    let hurst = 0.75;
    let signal = generate_fractional_gaussian_noise(
        &GeneratorConfig {
            length: 1 << 15,
            seed: Some(3),
            ..Default::default()
        },
        hurst,
    )
    .unwrap();

    let config = ComparisonConfig::fine_resolution().with_slope_overlay(3, 9);
    let mut sink = RecordingSink::new();
    let result = compare_psd_with_config(&signal, 1.0, &config, &mut sink).unwrap();

    let slope = result.slope.unwrap().slope;
    assert!((slope - (1.0 - 2.0 * hurst)).abs() < 0.15, "slope {}", slope);

    let chart = sink.last().unwrap();
    let line = chart.reference_line.as_ref().unwrap();
    assert_eq!(line.len(), 7);

    // Low-frequency Welch power exceeds high-frequency power
    let values = result.fourier.values();
    let low = values[1..65].iter().sum::<f64>();
    let high = values[values.len() - 65..values.len() - 1].iter().sum::<f64>();
    assert!(low > 2.0 * high, "low {} high {}", low, high);
}

/// Sink output is one row per plotted point.
#[test]
fn test_text_sink_output() {
    let signal = white_noise(2048, 99);
    let mut sink = DelimitedTextSink::new(Vec::new());
    let result = compare_psd(&signal, 1.0, 256, None, 2, LogBase::Natural, &mut sink).unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let rows: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    let expected = (result.fourier.len() - 1) + result.wavelet.estimate.len();
    assert_eq!(rows.len(), expected);
    assert!(text.contains("ln f"));
    assert!(rows.iter().all(|r| r.split(' ').count() == 3));
    assert!(rows[0].starts_with("Fourier "));
    assert!(rows[rows.len() - 1].starts_with("Wavelet "));
}

/// Natural and base-2 charts differ only by a constant factor.
#[test]
fn test_log_base_rescales_chart() {
    let signal = white_noise(4096, 5);
    let mut base2 = RecordingSink::new();
    let mut natural = RecordingSink::new();
    compare_psd(&signal, 1.0, 512, None, 2, LogBase::Base2, &mut base2).unwrap();
    compare_psd(&signal, 1.0, 512, None, 2, LogBase::Natural, &mut natural).unwrap();

    let a = &base2.last().unwrap().series[1];
    let b = &natural.last().unwrap().series[1];
    for (x2, xe) in a.x.iter().zip(&b.x) {
        assert_approx_eq!(x2 * std::f64::consts::LN_2, *xe, 1e-12);
    }
}
