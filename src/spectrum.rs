//! Spectral estimate data model.

use crate::errors::{SpectralAnalysisError, SpectralResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Paired frequency and power sequences produced by one estimator.
///
/// Invariants, checked by [`SpectralEstimate::new`]: both sequences have the
/// same length, frequencies are non-negative, values are non-negative. The
/// ordering of the frequencies is the estimator's own: ascending for Welch,
/// descending (by increasing scale) for the wavelet estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralEstimate {
    frequencies: Vec<f64>,
    values: Vec<f64>,
}

impl SpectralEstimate {
    /// Build an estimate, validating the invariants.
    pub fn new(frequencies: Vec<f64>, values: Vec<f64>) -> SpectralResult<Self> {
        if frequencies.len() != values.len() {
            return Err(SpectralAnalysisError::LengthMismatch {
                name: "values".to_string(),
                expected: frequencies.len(),
                actual: values.len(),
            });
        }
        if let Some(&f) = frequencies.iter().find(|&&f| !(f >= 0.0 && f.is_finite())) {
            return Err(SpectralAnalysisError::InvalidParameter {
                parameter: "frequency".to_string(),
                value: f,
                constraint: "finite and >= 0".to_string(),
            });
        }
        if let Some(&v) = values.iter().find(|&&v| !(v >= 0.0)) {
            return Err(SpectralAnalysisError::NumericalError {
                reason: format!("spectral value {} is negative or NaN", v),
                operation: Some("SpectralEstimate::new".to_string()),
            });
        }
        Ok(Self {
            frequencies,
            values,
        })
    }

    /// Frequencies, in the units of the sampling rate.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Power (or energy) at each frequency.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when there are no points.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// `(frequency, value)` pairs in estimator order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies.iter().copied().zip(self.values.iter().copied())
    }

    /// Frequency of the largest value, ignoring the DC bin.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.points()
            .filter(|&(f, _)| f > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    /// Split into `(frequencies, values)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.frequencies, self.values)
    }
}
