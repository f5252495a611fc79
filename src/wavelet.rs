//! Daubechies wavelets and the dyadic decomposition used by the wavelet PSD.
//!
//! The PSD estimator only consumes the [`WaveletDecomposition`] capability:
//! `decompose(signal, params) -> ScaleCoefficientMap`. [`DyadicDecomposition`]
//! is the default implementation, a Mallat pyramid that keeps only
//! border-free coefficients at each level.
//!
//! Filters are built by spectral factorisation rather than read from a table,
//! so any order from 1 (Haar) to [`MAX_VANISHING_MOMENTS`] is available.

use crate::errors::{
    validate_all_finite, validate_parameter, SpectralAnalysisError, SpectralResult,
};
use crate::math_utils::binomial;
use crate::math_utils::constants::SQRT_2;
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest supported Daubechies order; beyond it the factorisation loses precision.
pub const MAX_VANISHING_MOMENTS: usize = 20;

/// Coarsest scale a decomposition may request; a pyramid over any addressable
/// signal ends well before it.
pub const MAX_SCALE: usize = usize::BITS as usize;

const ROOT_MAX_ITERATIONS: usize = 1000;
const ROOT_TOLERANCE: f64 = 1e-14;

/// Wavelet family handed to the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WaveletFamily {
    /// Extremal-phase Daubechies wavelet with the given number of vanishing moments
    Daubechies(usize),
}

impl WaveletFamily {
    /// Conventional short name, e.g. `db2`.
    pub fn name(&self) -> String {
        match self {
            WaveletFamily::Daubechies(n) => format!("db{}", n),
        }
    }
}

/// Multifractal formalism the coefficients are destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Formalism {
    /// Wavelet coefficients (`wcmf`)
    #[default]
    WaveletCoefficient,
    /// Wavelet leaders (`wlmf`)
    WaveletLeader,
    /// Wavelet p-leaders (`p-leader`)
    WaveletPLeader,
}

/// Weighting of the per-scale log-log regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegressionWeighting {
    /// Every scale counts equally (`wtype = 0`)
    #[default]
    Uniform,
    /// Scales weighted by their number of coefficients (`wtype = 1`)
    CoefficientCount,
}

/// Formalism settings carried with a decomposition request.
///
/// The decomposition itself only reads `gamint` and `normalization`; the rest
/// travels with the coefficients for the downstream scaling analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormalismParams {
    /// Target formalism
    pub formalism: Formalism,
    /// Number of log-cumulants to estimate downstream
    pub n_cumul: usize,
    /// Fractional integration order applied to the coefficients
    pub gamint: f64,
    /// Regression weighting (`wtype`)
    pub weighting: RegressionWeighting,
    /// Exponent of p-leaders; `+inf` selects plain leaders
    pub p_exp: f64,
    /// Coefficient normalisation `p` of the L^p norm
    pub normalization: f64,
}

impl Default for FormalismParams {
    fn default() -> Self {
        Self {
            formalism: Formalism::WaveletCoefficient,
            n_cumul: 2,
            gamint: 0.5,
            weighting: RegressionWeighting::Uniform,
            p_exp: f64::INFINITY,
            normalization: 1.0,
        }
    }
}

/// One decomposition request: family, scale range and formalism settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionParams {
    /// Wavelet family
    pub family: WaveletFamily,
    /// Finest reported scale (1-based)
    pub j1: usize,
    /// Coarsest requested scale
    pub j2: usize,
    /// Formalism settings
    pub formalism: FormalismParams,
}

impl DecompositionParams {
    /// Check the scale range and formalism settings.
    pub fn validate(&self) -> SpectralResult<()> {
        let WaveletFamily::Daubechies(order) = self.family;
        validate_parameter(order as f64, 1.0, MAX_VANISHING_MOMENTS as f64, "n_moments")?;
        if self.j1 == 0 {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "j1".to_string(),
                value: 0.0,
                constraint: ">= 1".to_string(),
            });
        }
        if self.j2 > MAX_SCALE {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "j2".to_string(),
                value: self.j2 as f64,
                constraint: format!("<= {}", MAX_SCALE),
            });
        }
        if self.j2 < self.j1 {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "j2".to_string(),
                value: self.j2 as f64,
                constraint: format!(">= j1 ({})", self.j1),
            });
        }
        if !self.formalism.gamint.is_finite() {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "gamint".to_string(),
                value: self.formalism.gamint,
                constraint: "finite".to_string(),
            });
        }
        let p = self.formalism.normalization;
        if !(p.is_finite() && p > 0.0) {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "normalization".to_string(),
                value: p,
                constraint: "finite and > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Wavelet coefficients keyed by scale index `j`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleCoefficientMap {
    scales: BTreeMap<usize, Vec<f64>>,
}

impl ScaleCoefficientMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the coefficients of scale `j`, replacing any previous entry.
    pub fn insert(&mut self, j: usize, coefficients: Vec<f64>) {
        self.scales.insert(j, coefficients);
    }

    /// Coefficients at scale `j`.
    pub fn get(&self, j: usize) -> Option<&[f64]> {
        self.scales.get(&j).map(Vec::as_slice)
    }

    /// Scale indices in increasing order.
    pub fn scales(&self) -> impl Iterator<Item = usize> + '_ {
        self.scales.keys().copied()
    }

    /// `(j, coefficients)` in increasing `j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> + '_ {
        self.scales.iter().map(|(&j, c)| (j, c.as_slice()))
    }

    /// Number of scales.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// True when no scale is present.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Finest and coarsest scale present.
    pub fn range(&self) -> Option<(usize, usize)> {
        let first = *self.scales.keys().next()?;
        let last = *self.scales.keys().next_back()?;
        Some((first, last))
    }

    /// True when the scales form `[j_min, j_max]` with no gap.
    pub fn is_contiguous(&self) -> bool {
        match self.range() {
            Some((first, last)) => last - first + 1 == self.scales.len(),
            None => true,
        }
    }
}

impl FromIterator<(usize, Vec<f64>)> for ScaleCoefficientMap {
    fn from_iter<I: IntoIterator<Item = (usize, Vec<f64>)>>(iter: I) -> Self {
        Self {
            scales: iter.into_iter().collect(),
        }
    }
}

/// Capability consumed by the wavelet PSD estimator.
pub trait WaveletDecomposition {
    /// Decompose `signal` and return the detail coefficients of every scale in
    /// `[params.j1, params.j2]` the signal is long enough to support.
    fn decompose(
        &self,
        signal: &[f64],
        params: &DecompositionParams,
    ) -> SpectralResult<ScaleCoefficientMap>;
}

/// Daubechies analysis filter pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DaubechiesWavelet {
    vanishing_moments: usize,
    low_pass: Vec<f64>,
    high_pass: Vec<f64>,
}

impl DaubechiesWavelet {
    /// Build the extremal-phase Daubechies wavelet with `n` vanishing moments.
    pub fn new(n: usize) -> SpectralResult<Self> {
        validate_parameter(n as f64, 1.0, MAX_VANISHING_MOMENTS as f64, "n_moments")?;
        let low_pass = daubechies_low_pass(n)?;
        let len = low_pass.len();
        let high_pass = (0..len)
            .map(|k| {
                let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
                sign * low_pass[len - 1 - k]
            })
            .collect();
        Ok(Self {
            vanishing_moments: n,
            low_pass,
            high_pass,
        })
    }

    /// Number of vanishing moments.
    pub fn vanishing_moments(&self) -> usize {
        self.vanishing_moments
    }

    /// Decomposition low-pass (scaling) filter, length `2n`.
    pub fn low_pass(&self) -> &[f64] {
        &self.low_pass
    }

    /// Decomposition high-pass (wavelet) filter.
    pub fn high_pass(&self) -> &[f64] {
        &self.high_pass
    }

    /// Filter length.
    pub fn filter_len(&self) -> usize {
        self.low_pass.len()
    }
}

/// Low-pass filter `h(z) = ((1+z)/2)^n Q(z)` with `|Q|² = P(sin²(ω/2))`,
/// `P(y) = Σ_{k<n} C(n-1+k, k) y^k`, keeping the roots of `Q` inside the unit
/// circle. Coefficients are in ascending powers of `z` and sum to √2.
fn daubechies_low_pass(n: usize) -> SpectralResult<Vec<f64>> {
    let p: Vec<f64> = (0..n).map(|k| binomial(n - 1 + k, k)).collect();
    let y_roots = polynomial_roots(&p)?;

    let mut poly = vec![Complex64::new(1.0, 0.0)];
    for _ in 0..n {
        poly = multiply_linear(&poly, Complex64::new(1.0, 0.0));
    }
    for y in y_roots {
        // z + 1/z = 2 - 4y; the two roots are reciprocal
        let b = Complex64::new(2.0, 0.0) - 4.0 * y;
        let disc = (b * b - 4.0).sqrt();
        let z1 = (b + disc) / 2.0;
        let z2 = (b - disc) / 2.0;
        let inside = if z1.norm() < z2.norm() { z1 } else { z2 };
        poly = multiply_linear(&poly, -inside);
    }

    let taps: Vec<f64> = poly.iter().map(|c| c.re).collect();
    let sum: f64 = taps.iter().sum();
    if !sum.is_finite() || sum.abs() < f64::EPSILON {
        return Err(SpectralAnalysisError::NumericalError {
            reason: format!("Daubechies factorisation for order {} diverged", n),
            operation: Some("daubechies_low_pass".to_string()),
        });
    }
    Ok(taps.iter().map(|t| t * SQRT_2 / sum).collect())
}

/// Multiply polynomial `poly` (ascending powers) by `(z + c)`.
fn multiply_linear(poly: &[Complex64], c: Complex64) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); poly.len() + 1];
    for (i, &a) in poly.iter().enumerate() {
        out[i] += a * c;
        out[i + 1] += a;
    }
    out
}

fn evaluate(coeffs: &[f64], z: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}

/// All complex roots of `Σ coeffs[k] z^k` by Durand–Kerner iteration.
fn polynomial_roots(coeffs: &[f64]) -> SpectralResult<Vec<Complex64>> {
    let degree = coeffs.len().saturating_sub(1);
    if degree == 0 {
        return Ok(Vec::new());
    }
    let lead = coeffs[degree];
    let monic: Vec<f64> = coeffs.iter().map(|c| c / lead).collect();

    // Fujiwara-style radius bound for the starting circle
    let radius = (0..degree)
        .map(|k| monic[k].abs().powf(1.0 / (degree - k) as f64))
        .fold(0.0, f64::max)
        * 2.0;
    let radius = radius.max(1.0);
    let mut roots: Vec<Complex64> = (0..degree)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / degree as f64 + 0.4;
            Complex64::from_polar(radius, angle)
        })
        .collect();

    for _ in 0..ROOT_MAX_ITERATIONS {
        let mut max_step: f64 = 0.0;
        for i in 0..degree {
            let zi = roots[i];
            let mut denom = Complex64::new(1.0, 0.0);
            for (k, &zk) in roots.iter().enumerate() {
                if k != i {
                    denom *= zi - zk;
                }
            }
            let step = evaluate(&monic, zi) / denom;
            roots[i] = zi - step;
            max_step = max_step.max(step.norm() / zi.norm().max(1.0));
        }
        if max_step < ROOT_TOLERANCE {
            return Ok(roots);
        }
    }

    let residual = roots
        .iter()
        .map(|&z| evaluate(&monic, z).norm())
        .fold(0.0, f64::max);
    if residual < 1e-8 {
        Ok(roots)
    } else {
        Err(SpectralAnalysisError::NumericalError {
            reason: format!("root finding did not converge (residual {:e})", residual),
            operation: Some("polynomial_roots".to_string()),
        })
    }
}

/// One analysis step: valid convolution with both filters, decimated by two.
///
/// Returns `(detail, approximation)`, each of length `(n - L) / 2 + 1`.
fn analysis_step(approx: &[f64], low: &[f64], high: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let len = low.len();
    let count = (approx.len() - len) / 2 + 1;
    let mut detail = Vec::with_capacity(count);
    let mut next = Vec::with_capacity(count);
    for i in 0..count {
        let t = len - 1 + 2 * i;
        let mut d = 0.0;
        let mut a = 0.0;
        for k in 0..len {
            let x = approx[t - k];
            d += high[k] * x;
            a += low[k] * x;
        }
        detail.push(d);
        next.push(a);
    }
    (detail, next)
}

/// Shortest signal whose pyramid reaches scale `j` with filter length `len`.
///
/// Saturates at `usize::MAX` when no addressable signal is long enough.
pub fn min_length_for_scale(j: usize, len: usize) -> usize {
    (1..j).fold(len, |m, _| {
        m.saturating_sub(1).saturating_mul(2).saturating_add(len)
    })
}

/// Mallat pyramid over border-free coefficients.
///
/// Stateless: every call builds its own filters and scratch buffers, so one
/// instance may serve concurrent estimations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DyadicDecomposition;

impl WaveletDecomposition for DyadicDecomposition {
    fn decompose(
        &self,
        signal: &[f64],
        params: &DecompositionParams,
    ) -> SpectralResult<ScaleCoefficientMap> {
        params.validate()?;
        validate_all_finite(signal, "signal")?;

        let WaveletFamily::Daubechies(order) = params.family;
        let wavelet = DaubechiesWavelet::new(order)?;
        let len = wavelet.filter_len();

        let required = min_length_for_scale(params.j1, len);
        if signal.len() < required {
            return Err(SpectralAnalysisError::InsufficientData {
                required,
                actual: signal.len(),
            });
        }

        let exponent =
            params.formalism.gamint + 0.5 - 1.0 / params.formalism.normalization;

        let mut map = ScaleCoefficientMap::new();
        let mut approx = signal.to_vec();
        for j in 1..=params.j2 {
            if approx.len() < len {
                break;
            }
            let (detail, next) = analysis_step(&approx, wavelet.low_pass(), wavelet.high_pass());
            if j >= params.j1 {
                let factor = 2f64.powf(j as f64 * exponent);
                let scaled = if factor == 1.0 {
                    detail
                } else {
                    detail.into_iter().map(|d| d * factor).collect()
                };
                map.insert(j, scaled);
            }
            approx = next;
        }

        if let Some((_, last)) = map.range() {
            if last < params.j2 {
                log::warn!(
                    "{} decomposition of {} samples stops at scale {} (requested {})",
                    params.family.name(),
                    signal.len(),
                    last,
                    params.j2
                );
            }
        }
        Ok(map)
    }
}
