//! Elementwise exponentiation with fast paths for common exponents.
//!
//! [`power`] dispatches on an [`ExponentClass`] so that squaring coefficient
//! arrays (the hot path of every energy and structure-function computation)
//! never goes through a generic `powf`. Every fast path agrees with the generic
//! routine up to floating-point rounding.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest integer exponent handled by repeated multiplication.
pub const MAX_SMALL_INTEGER_EXPONENT: i32 = 10;

/// Exponent as supplied by the caller.
///
/// Integer and real exponents are kept apart: only an [`Exponent::Integer`]
/// takes the repeated-multiplication path, a real `3.0` goes through `powf`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Exponent {
    /// Integer exponent
    Integer(i32),
    /// Real exponent
    Real(f64),
}

impl From<i32> for Exponent {
    fn from(value: i32) -> Self {
        Exponent::Integer(value)
    }
}

impl From<f64> for Exponent {
    fn from(value: f64) -> Self {
        Exponent::Real(value)
    }
}

impl Exponent {
    /// Exponent as a float.
    pub fn value(self) -> f64 {
        match self {
            Exponent::Integer(e) => e as f64,
            Exponent::Real(e) => e,
        }
    }
}

/// Evaluation strategy selected for an exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExponentClass {
    /// `x^1`: values are copied unchanged
    Identity,
    /// `x^2`: `x * x`
    Square,
    /// `x^0.5`: `sqrt(x)`
    SquareRoot,
    /// Integer exponent in `[1, 10]`: repeated multiplication from ones
    SmallInteger(u32),
    /// Everything else, including `-1` and `0`: `powf`
    Generic(f64),
}

impl ExponentClass {
    /// Classify an exponent. The checks run in a fixed order; the first match wins.
    pub fn of(exponent: Exponent) -> Self {
        let value = exponent.value();
        if value == 1.0 {
            ExponentClass::Identity
        } else if value == 2.0 {
            ExponentClass::Square
        } else if value == 0.5 {
            ExponentClass::SquareRoot
        } else if value == -1.0 || value == 0.0 {
            ExponentClass::Generic(value)
        } else {
            match exponent {
                Exponent::Integer(e) if (1..=MAX_SMALL_INTEGER_EXPONENT).contains(&e) => {
                    ExponentClass::SmallInteger(e as u32)
                }
                _ => ExponentClass::Generic(value),
            }
        }
    }
}

/// Raise every element of `values` to `exponent`.
///
/// # Example
/// ```rust
/// use fractal_spectrum::power::power;
///
/// let squared = power(&[1.0, -2.0, 3.0], 2);
/// assert_eq!(squared, vec![1.0, 4.0, 9.0]);
///
/// let roots = power(&[4.0, 9.0], 0.5);
/// assert_eq!(roots, vec![2.0, 3.0]);
/// ```
pub fn power<E: Into<Exponent>>(values: &[f64], exponent: E) -> Vec<f64> {
    match ExponentClass::of(exponent.into()) {
        ExponentClass::Identity => values.to_vec(),
        ExponentClass::Square => values.iter().map(|&x| x * x).collect(),
        ExponentClass::SquareRoot => values.iter().map(|&x| x.sqrt()).collect(),
        ExponentClass::SmallInteger(e) => {
            let mut out = vec![1.0; values.len()];
            for _ in 0..e {
                for (acc, &x) in out.iter_mut().zip(values) {
                    *acc *= x;
                }
            }
            out
        }
        ExponentClass::Generic(e) => values.iter().map(|&x| x.powf(e)).collect(),
    }
}
