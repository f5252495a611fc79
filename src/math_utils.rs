//! Mathematical constants and floating-point helpers shared by the estimators.

/// Numerical constants used across the spectral estimators.
pub mod constants {
    /// Default epsilon for floating point comparisons
    pub const DEFAULT_EPSILON: f64 = 1e-12;

    /// Weighted spread of abscissae, relative to `Σ w x²`, treated as zero.
    /// Identical abscissae leave a residual spread of order ε² after centring.
    pub const DEGENERACY_TOLERANCE: f64 = 1e-24;

    /// 2π, the sampling rate handed to the periodogram primitive
    pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

    /// One-sided correction applied after the 2π-normalised Welch average
    pub const WELCH_ONE_SIDED_CORRECTION: f64 = 4.0;

    /// Octave-band centre of a dyadic scale, as a fraction of `fs / 2^j`
    pub const OCTAVE_CENTER_FACTOR: f64 = 0.75;

    /// √2, the sum of the Daubechies low-pass filter taps
    pub const SQRT_2: f64 = std::f64::consts::SQRT_2;
}

/// Safe floating point comparison functions
pub mod float_ops {
    use super::constants::DEFAULT_EPSILON;

    /// Relative closeness, falling back to absolute comparison near zero
    #[inline]
    pub fn approx_eq_rel(a: f64, b: f64, rel: f64) -> bool {
        let scale = a.abs().max(b.abs());
        if scale < DEFAULT_EPSILON {
            return true;
        }
        (a - b).abs() <= rel * scale
    }
}

/// Arithmetic mean; `NaN` for empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(4, 2), 6.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(10, 3), 120.0);
        assert_eq!(binomial(3, 4), 0.0);
    }

    #[test]
    fn test_approx_eq_rel() {
        assert!(float_ops::approx_eq_rel(1e6, 1e6 + 1e-4, 1e-9));
        assert!(!float_ops::approx_eq_rel(1.0, 1.1, 1e-3));
        assert!(float_ops::approx_eq_rel(0.0, 1e-15, 1e-9));
    }
}
