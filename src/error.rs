//! # Error Types
//!
//! This module defines the error type shared by every part of the simulation.
//! The taxonomy is narrow: a run is a closed numeric computation, so almost
//! every failure is a configuration problem detected at construction time.
//!
//! Conditions that are part of normal selection dynamics are *not* errors:
//! a degenerate rank distribution skips selection for one generation, and a
//! run that hits the generation cap is reported as capped out.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use evosel::error::{GeneticError, Result};
//!
//! fn check_even(population_size: usize) -> Result<()> {
//!     if population_size % 2 != 0 {
//!         return Err(GeneticError::Configuration(format!(
//!             "Crossover pairs individuals, population size {} is odd",
//!             population_size
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_even(100).is_ok());
//! assert!(check_even(99).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use evosel::error::{GeneticError, OptionExt};
//!
//! fn fittest(fitness: &[f64]) -> evosel::error::Result<f64> {
//!     fitness.iter().cloned().reduce(f64::max).ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//!
//! assert_eq!(fittest(&[1.0, 3.0, 2.0]).unwrap(), 3.0);
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// A precondition on the configuration was violated.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation required at least one individual.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// An operator would have changed the population size.
    #[error("Population size mismatch: expected {expected}, got {actual}")]
    PopulationSizeMismatch { expected: usize, actual: usize },

    /// Genotypes of unequal length were mixed in one population.
    #[error("Genotype length mismatch: expected {expected}, got {actual}")]
    GenotypeLengthMismatch { expected: usize, actual: usize },

    /// NaN or infinity where a finite value is required.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A sampling distribution could not be built.
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// An I/O operation of a report writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for GeneticError {
    fn from(error: serde_json::Error) -> Self {
        GeneticError::Serialization(error.to_string())
    }
}

/// A specialized Result type for simulation operations.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use evosel::error::ResultExt;
/// use std::fs::File;
///
/// fn open_report(path: &str) -> evosel::error::Result<()> {
///     File::open(path).context("Failed to open report")?;
///     Ok(())
/// }
///
/// assert!(open_report("/definitely/not/here.json").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to a `GeneticError` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for I/O results that keeps the `Io` error kind.
///
/// The message is prefixed with `context`, the `std::io::ErrorKind` is kept.
pub trait IoResultExt<T> {
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            GeneticError::Io(std::io::Error::new(e.kind(), format!("{}: {}", context, e)))
        })
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using
    /// a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}

/// Rejects NaN and infinite values with a descriptive error.
pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeneticError::InvalidNumericValue(format!(
            "{} must be finite, got {}",
            what, value
        )))
    }
}

/// Rejects probabilities outside `[0, 1]`.
pub(crate) fn ensure_probability(value: f64, what: &str) -> Result<f64> {
    ensure_finite(value, what)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(GeneticError::Configuration(format!(
            "{} must be in [0, 1], got {}",
            what, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_message() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("Failed to write report").unwrap_err();
        assert_eq!(err.to_string(), "Failed to write report: missing");
    }

    #[test]
    fn test_ensure_probability() {
        assert!(ensure_probability(0.0, "rate").is_ok());
        assert!(ensure_probability(1.0, "rate").is_ok());
        assert!(matches!(
            ensure_probability(1.5, "rate"),
            Err(GeneticError::Configuration(_))
        ));
        assert!(matches!(
            ensure_probability(f64::NAN, "rate"),
            Err(GeneticError::InvalidNumericValue(_))
        ));
    }

    #[test]
    fn test_size_mismatch_display() {
        let err = GeneticError::PopulationSizeMismatch {
            expected: 100,
            actual: 99,
        };
        assert_eq!(
            err.to_string(),
            "Population size mismatch: expected 100, got 99"
        );
    }
}
