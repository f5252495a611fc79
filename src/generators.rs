//! Synthetic signals with known spectra.
//!
//! Used to validate the estimators: white noise has a flat spectrum, a
//! sinusoid a single line, and fractional Gaussian noise a power law
//! `S(f) ~ f^(1 - 2H)` at low frequencies.

use crate::errors::{
    validate_allocation_size, validate_parameter, validate_sampling_frequency,
    SpectralAnalysisError, SpectralResult,
};
use num_complex::Complex64;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, StandardNormal};
use rustfft::FftPlanner;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Common generation parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of samples
    pub length: usize,
    /// Random seed for reproducible generation; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Sampling frequency (samples per unit time)
    pub sampling_frequency: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 1000,
            seed: None,
            sampling_frequency: 1.0,
        }
    }
}

fn rng_for(config: &GeneratorConfig) -> ChaCha20Rng {
    match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Gaussian white noise with unit variance.
pub fn generate_white_noise(config: &GeneratorConfig) -> SpectralResult<Vec<f64>> {
    validate_allocation_size(config.length * std::mem::size_of::<f64>(), "white noise")?;
    let mut rng = rng_for(config);
    Ok((0..config.length)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect())
}

/// `amplitude · sin(2π f0 t + phase)` sampled at `t = i / fs`.
pub fn generate_sinusoid(
    length: usize,
    fs: f64,
    f0: f64,
    amplitude: f64,
    phase: f64,
) -> SpectralResult<Vec<f64>> {
    validate_sampling_frequency(fs)?;
    validate_parameter(f0, 0.0, fs / 2.0, "f0")?;
    Ok((0..length)
        .map(|i| amplitude * (2.0 * PI * f0 * i as f64 / fs + phase).sin())
        .collect())
}

/// Fractional Gaussian noise with Hurst exponent `hurst` and unit variance,
/// by circulant embedding of the autocovariance.
pub fn generate_fractional_gaussian_noise(
    config: &GeneratorConfig,
    hurst: f64,
) -> SpectralResult<Vec<f64>> {
    validate_parameter(hurst, 0.01, 0.99, "hurst")?;
    let n = config.length;
    if n < 2 {
        return Err(SpectralAnalysisError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let m = (2 * n).next_power_of_two();
    validate_allocation_size(m * std::mem::size_of::<Complex64>(), "circulant embedding")?;

    let two_h = 2.0 * hurst;
    let autocov = |k: usize| -> f64 {
        let k = k as f64;
        0.5 * ((k + 1.0).powf(two_h) - 2.0 * k.powf(two_h) + (k - 1.0).abs().powf(two_h))
    };

    let mut eigen: Vec<Complex64> = (0..m)
        .map(|i| {
            let lag = if i <= m / 2 { i } else { m - i };
            Complex64::new(autocov(lag), 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(m);
    fft.process(&mut eigen);

    let max_eigen = eigen.iter().map(|c| c.re.abs()).fold(0.0, f64::max);
    let tolerance = 1e-10 * max_eigen;
    let mut lambdas = Vec::with_capacity(m);
    for c in &eigen {
        if c.re < -tolerance {
            return Err(SpectralAnalysisError::NumericalError {
                reason: format!("circulant embedding has negative eigenvalue {}", c.re),
                operation: Some("generate_fractional_gaussian_noise".to_string()),
            });
        }
        lambdas.push(c.re.max(0.0));
    }

    let mut rng = rng_for(config);
    let mut coeffs = vec![Complex64::new(0.0, 0.0); m];
    for k in 0..=m / 2 {
        if k == 0 || k == m / 2 {
            let z: f64 = StandardNormal.sample(&mut rng);
            coeffs[k] = Complex64::new((lambdas[k] / m as f64).sqrt() * z, 0.0);
        } else {
            let scale = (lambdas[k] / (2.0 * m as f64)).sqrt();
            let re: f64 = StandardNormal.sample(&mut rng);
            let im: f64 = StandardNormal.sample(&mut rng);
            coeffs[k] = Complex64::new(scale * re, scale * im);
            coeffs[m - k] = coeffs[k].conj();
        }
    }

    fft.process(&mut coeffs);
    Ok(coeffs[..n].iter().map(|c| c.re).collect())
}
