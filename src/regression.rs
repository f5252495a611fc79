//! Closed-form weighted least-squares line fitting.
//!
//! Finds `(a, b)` minimising `Σ_j w_j (y_j - (a x_j + b))²`. The fit is written
//! as explicit per-point slope and intercept weights,
//!
//! ```text
//! V0 = Σ w,  V1 = Σ w x,  V2 = Σ w x²,  D = V0 V2 - V1²
//! a  = Σ w_j (V0 x_j - V1) / D · y_j
//! b  = Σ w_j (V2 - V1 x_j) / D · y_j
//! ```
//!
//! evaluated in centred form (`D = V0 · Σ w (x - x̄)²`) so that abscissae with a
//! large offset and a small spread do not cancel catastrophically.

use crate::errors::{validate_all_finite, SpectralAnalysisError, SpectralResult};
use crate::math_utils::constants::DEGENERACY_TOLERANCE;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a weighted linear fit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegressionFit {
    /// Fitted slope `a`
    pub slope: f64,
    /// Fitted intercept `b`
    pub intercept: f64,
    /// `Σ (1/w_j) · slope_weight_j²`, only when requested
    pub slope_variance: Option<f64>,
}

impl RegressionFit {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Per-point linear weights of a fit: `a = Σ slope[j] y[j]`, `b = Σ intercept[j] y[j]`.
#[derive(Debug, Clone)]
pub struct RegressionWeights {
    /// Slope weights `w_j (V0 x_j - V1) / D`
    pub slope: Vec<f64>,
    /// Intercept weights `w_j (V2 - V1 x_j) / D`
    pub intercept: Vec<f64>,
    /// Determinant `D = V0 V2 - V1²` of the weighted normal equations
    pub determinant: f64,
}

/// Compute the slope and intercept weights for abscissae `x` and weights `weights`.
///
/// The weights depend on `x` only, so they can be reused to fit several
/// ordinate vectors against the same design (one per moment or cumulant order).
pub fn regression_weights(x: &[f64], weights: &[f64]) -> SpectralResult<RegressionWeights> {
    if x.is_empty() {
        return Err(SpectralAnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if weights.len() != x.len() {
        return Err(SpectralAnalysisError::LengthMismatch {
            name: "weights".to_string(),
            expected: x.len(),
            actual: weights.len(),
        });
    }
    validate_all_finite(x, "regression abscissae")?;
    if let Some((i, &w)) = weights
        .iter()
        .enumerate()
        .find(|(_, &w)| !(w.is_finite() && w > 0.0))
    {
        return Err(SpectralAnalysisError::InvalidParameter {
            parameter: format!("weights[{}]", i),
            value: w,
            constraint: "finite and > 0".to_string(),
        });
    }

    let v0: f64 = weights.iter().sum();
    let v1: f64 = weights.iter().zip(x).map(|(&w, &xi)| w * xi).sum();
    let v2: f64 = weights.iter().zip(x).map(|(&w, &xi)| w * xi * xi).sum();

    let x_bar = v1 / v0;
    let spread: f64 = weights
        .iter()
        .zip(x)
        .map(|(&w, &xi)| {
            let c = xi - x_bar;
            w * c * c
        })
        .sum();
    let determinant = v0 * spread;

    if spread == 0.0 || spread <= DEGENERACY_TOLERANCE * v2 {
        return Err(SpectralAnalysisError::DegenerateRegression { determinant });
    }

    let slope: Vec<f64> = weights
        .iter()
        .zip(x)
        .map(|(&w, &xi)| w * (xi - x_bar) / spread)
        .collect();
    let intercept: Vec<f64> = weights
        .iter()
        .zip(&slope)
        .map(|(&w, &s)| w / v0 - x_bar * s)
        .collect();

    Ok(RegressionWeights {
        slope,
        intercept,
        determinant,
    })
}

/// Weighted least-squares fit of `y ≈ a x + b`.
///
/// # Errors
/// - `InsufficientData` for empty input
/// - `LengthMismatch` when `x`, `y` and `weights` differ in length
/// - `InvalidParameter` for a zero, negative or non-finite weight
/// - `DegenerateRegression` when all `x` coincide (`D == 0`)
///
/// # Variance
/// `slope_variance` is `Σ (1/w_j) · slope_weight_j²`, which reduces to
/// `1 / Σ w (x - x̄)²`. It equals the textbook slope variance only when the
/// weights are inverse variances of `y`.
///
/// # Example
/// ```rust
/// use fractal_spectrum::regression::fit;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [3.0, 5.0, 7.0, 9.0];
/// let line = fit(&x, &y, &[1.0; 4], false).unwrap();
/// assert!((line.slope - 2.0).abs() < 1e-12);
/// assert!((line.intercept - 1.0).abs() < 1e-12);
/// ```
pub fn fit(x: &[f64], y: &[f64], weights: &[f64], want_variance: bool) -> SpectralResult<RegressionFit> {
    if y.len() != x.len() {
        return Err(SpectralAnalysisError::LengthMismatch {
            name: "y".to_string(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    let design = regression_weights(x, weights)?;
    validate_all_finite(y, "regression ordinates")?;

    let slope = design.slope.iter().zip(y).map(|(&s, &yi)| s * yi).sum();
    let intercept = design.intercept.iter().zip(y).map(|(&c, &yi)| c * yi).sum();

    let slope_variance = want_variance.then(|| {
        weights
            .iter()
            .zip(&design.slope)
            .map(|(&w, &s)| s * s / w)
            .sum()
    });

    Ok(RegressionFit {
        slope,
        intercept,
        slope_variance,
    })
}

/// Unweighted fit (all weights one).
pub fn fit_unweighted(x: &[f64], y: &[f64]) -> SpectralResult<RegressionFit> {
    fit(x, y, &vec![1.0; x.len()], false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_recovers_exact_line_with_constant_weights() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.5 - 3.0).collect();
        let y: Vec<f64> = x.iter().map(|&xi| -1.75 * xi + 4.2).collect();

        for w in [1.0, 0.01, 250.0] {
            let line = fit(&x, &y, &vec![w; x.len()], false).unwrap();
            assert_approx_eq!(line.slope, -1.75, 1e-12);
            assert_approx_eq!(line.intercept, 4.2, 1e-12);
            assert!(line.slope_variance.is_none());
        }
    }

    #[test]
    fn test_weights_do_not_matter_for_exact_data() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.5, 1.0, 1.5, 2.0, 2.5];
        let line = fit(&x, &y, &[1.0, 8.0, 2.0, 0.5, 3.0], true).unwrap();
        assert_approx_eq!(line.slope, 0.5, 1e-12);
        assert_approx_eq!(line.intercept, 0.0, 1e-12);
    }

    #[test]
    fn test_weighting_pulls_fit_towards_heavy_points() {
        // Two clusters disagree; the heavier one dominates
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 10.0];
        let light = fit(&x, &y, &[1.0, 1.0, 1.0, 1e-6], false).unwrap();
        let heavy = fit(&x, &y, &[1.0, 1.0, 1.0, 1e6], false).unwrap();
        assert!((light.slope - 1.0).abs() < 1e-3);
        assert!(heavy.slope > light.slope);
    }

    #[test]
    fn test_matches_normal_equations() {
        let x = [0.3, 1.1, 2.4, 3.9, 5.0, 6.2];
        let y = [1.0, 0.7, 2.9, 3.1, 5.6, 5.9];
        let w = [2.0, 1.0, 0.5, 3.0, 1.5, 1.0];

        let v0: f64 = w.iter().sum();
        let v1: f64 = w.iter().zip(&x).map(|(a, b)| a * b).sum();
        let v2: f64 = w.iter().zip(&x).map(|(a, b)| a * b * b).sum();
        let d = v0 * v2 - v1 * v1;
        let a: f64 = (0..6).map(|j| w[j] * (v0 * x[j] - v1) / d * y[j]).sum();
        let b: f64 = (0..6).map(|j| w[j] * (v2 - v1 * x[j]) / d * y[j]).sum();

        let line = fit(&x, &y, &w, false).unwrap();
        assert_approx_eq!(line.slope, a, 1e-12);
        assert_approx_eq!(line.intercept, b, 1e-12);
    }

    #[test]
    fn test_slope_variance_matches_reference() {
        // Reference: Var(a) of weighted least squares with w = 1/σ² is 1 / Σ w (x - x̄)²
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = [2.1, 3.9, 6.2, 7.8, 10.1, 12.0, 13.8];
        let w = [4.0, 2.0, 1.0, 1.0, 0.5, 0.25, 0.25];

        let v0: f64 = w.iter().sum();
        let x_bar: f64 = w.iter().zip(&x).map(|(a, b)| a * b).sum::<f64>() / v0;
        let spread: f64 = w.iter().zip(&x).map(|(a, b)| a * (b - x_bar).powi(2)).sum();

        let line = fit(&x, &y, &w, true).unwrap();
        let variance = line.slope_variance.unwrap();
        assert_approx_eq!(variance, 1.0 / spread, 1e-12);

        // Also against the raw-sum definition
        let design = regression_weights(&x, &w).unwrap();
        let raw: f64 = design
            .slope
            .iter()
            .zip(&w)
            .map(|(s, wi)| s * s / wi)
            .sum();
        assert_approx_eq!(variance, raw, 1e-15);
    }

    #[test]
    fn test_intercept_weights_sum_to_one() {
        let x = [1.0, 4.0, 9.0, 16.0];
        let design = regression_weights(&x, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_approx_eq!(design.intercept.iter().sum::<f64>(), 1.0, 1e-12);
        assert_approx_eq!(design.slope.iter().sum::<f64>(), 0.0, 1e-12);
        assert!(design.determinant > 0.0);
    }

    #[test]
    fn test_identical_abscissae_are_degenerate() {
        let x = [0.1, 0.1, 0.1, 0.1];
        let y = [1.0, 2.0, 3.0, 4.0];
        let result = fit(&x, &y, &[1.0; 4], false);
        assert!(matches!(
            result,
            Err(SpectralAnalysisError::DegenerateRegression { .. })
        ));

        let single = fit(&[2.0], &[1.0], &[1.0], false);
        assert!(matches!(
            single,
            Err(SpectralAnalysisError::DegenerateRegression { .. })
        ));

        let zeros = fit(&[0.0, 0.0], &[1.0, 2.0], &[1.0, 1.0], false);
        assert!(matches!(
            zeros,
            Err(SpectralAnalysisError::DegenerateRegression { .. })
        ));
    }

    #[test]
    fn test_large_offset_is_stable() {
        let x: Vec<f64> = (0..10).map(|i| 1e8 + i as f64).collect();
        let y: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 1.0).collect();
        let line = fit_unweighted(&x, &y).unwrap();
        assert_approx_eq!(line.slope, 3.0, 1e-6);
    }

    #[test]
    fn test_precondition_violations() {
        assert!(matches!(
            fit(&[], &[], &[], false),
            Err(SpectralAnalysisError::InsufficientData { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0], &[1.0, 1.0], false),
            Err(SpectralAnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0, 2.0], &[1.0], false),
            Err(SpectralAnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0, 2.0], &[1.0, 0.0], false),
            Err(SpectralAnalysisError::InvalidParameter { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0, 2.0], &[0.0, 0.0], false),
            Err(SpectralAnalysisError::InvalidParameter { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0, 2.0], &[1.0, -3.0], false),
            Err(SpectralAnalysisError::InvalidParameter { .. })
        ));
        assert!(matches!(
            fit(&[1.0, 2.0], &[1.0, f64::NAN], &[1.0, 1.0], false),
            Err(SpectralAnalysisError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_predict() {
        let line = fit_unweighted(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert_approx_eq!(line.predict(10.0), 21.0, 1e-12);
    }
}
