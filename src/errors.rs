//! Error types and validation functions for spectral analysis.
//!
//! Every estimator in this crate reports failures through [`SpectralAnalysisError`].
//! Precondition violations (degenerate regression designs, mismatched lengths,
//! signals too short for the requested analysis) are signalled explicitly and are
//! never folded into `NaN` or infinite numeric results.

use std::sync::Arc;
use thiserror::Error;

/// Error types for spectral and regression operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum SpectralAnalysisError {
    /// Insufficient data for the requested analysis.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Two inputs that must have equal length do not.
    #[error("Length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Name of the offending input
        name: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Numerical computation error due to invalid values or instability.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// Weighted regression design is degenerate (all abscissae coincide).
    #[error("Degenerate regression design: determinant {determinant:e} is zero")]
    DegenerateRegression {
        /// Determinant `V0*V2 - V1^2` of the weighted normal equations
        determinant: f64,
    },

    /// FFT computation error.
    #[error("FFT computation failed: input size {size} not supported")]
    FftError {
        /// Input size that caused the FFT failure
        size: usize,
    },

    /// Wavelet decomposition failure or malformed decomposition output.
    #[error("Wavelet decomposition failed: {reason}")]
    DecompositionError {
        /// Reason for the failure
        reason: String,
    },

    /// I/O operation error, raised by rendering sinks.
    #[error("I/O operation failed: {operation}")]
    IoError {
        /// I/O operation that failed
        operation: String,
        /// Underlying error if available
        #[source]
        source: Option<Arc<std::io::Error>>,
    },
}

/// Result type for spectral analysis operations.
pub type SpectralResult<T> = Result<T, SpectralAnalysisError>;

impl SpectralAnalysisError {
    /// Wraps an I/O error raised while performing `operation`.
    pub fn io(operation: &str, source: std::io::Error) -> Self {
        SpectralAnalysisError::IoError {
            operation: operation.to_string(),
            source: Some(Arc::new(source)),
        }
    }
}

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use fractal_spectrum::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2, "test").is_ok());
/// assert!(validate_data_length(&data, 5, "test").is_err());
/// ```
pub fn validate_data_length(
    data: &[f64],
    min_required: usize,
    _operation: &str,
) -> SpectralResult<()> {
    if data.len() < min_required {
        Err(SpectralAnalysisError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use fractal_spectrum::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "gamint").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "gamint").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> SpectralResult<()> {
    if value.is_nan() {
        return Err(SpectralAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(SpectralAnalysisError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(SpectralAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates a sampling frequency: finite and strictly positive.
pub fn validate_sampling_frequency(fs: f64) -> SpectralResult<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(SpectralAnalysisError::InvalidParameter {
            parameter: "fs".to_string(),
            value: fs,
            constraint: "finite and > 0".to_string(),
        });
    }
    Ok(())
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value.
///
/// # Example
/// ```rust
/// use fractal_spectrum::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "test").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "test").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> SpectralResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(SpectralAnalysisError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
            operation: None,
        });
    }

    Ok(())
}

/// Validate an allocation request before building large scratch buffers.
///
/// Maximum allocation is 1 GiB.
pub fn validate_allocation_size(size: usize, operation: &str) -> SpectralResult<()> {
    const MAX_SAFE_ALLOCATION: usize = 1 << 30;

    if size > MAX_SAFE_ALLOCATION {
        return Err(SpectralAnalysisError::NumericalError {
            reason: format!(
                "Attempted allocation of {} bytes ({:.2} GB) in '{}' exceeds the limit of {} bytes",
                size,
                size as f64 / (1024.0 * 1024.0 * 1024.0),
                operation,
                MAX_SAFE_ALLOCATION
            ),
            operation: Some(operation.to_string()),
        });
    }

    Ok(())
}
