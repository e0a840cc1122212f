//! Error Types for Detector Configuration and Input Failures
//!
//! ## Design Philosophy
//!
//! The detector runs on the sample path of a wearable or phone, so its errors
//! follow the same rules as the rest of the core:
//!
//! 1. **Small Size**: variants carry a few scalars and `&'static str` names only.
//! 2. **No Heap Allocation**: nothing here needs `alloc`.
//! 3. **Copy Semantics**: errors are cheap to return and to store in stats.
//!
//! ## Error Categories
//!
//! ### Configuration (fail fast at construction)
//! - `InvalidThreshold`: a threshold is NaN, infinite, zero or negative
//! - `InvalidDuration`: the cooldown or sample interval is zero
//! - `InvalidContact`: an emergency contact number is malformed
//!
//! ### Input
//! - `InvalidSample`: a sample axis is NaN or infinite
//!
//! Failures of the emergency action itself are not detector errors. They are
//! reported by the collaborator layer and never change detector state.
//!
//! ```rust
//! use guidex_core::{DetectorConfig, DetectorError, FallDetector};
//!
//! let config = DetectorConfig::default().with_fall_threshold(0.0);
//! match FallDetector::new(config) {
//!     Err(DetectorError::InvalidThreshold { name, .. }) => assert_eq!(name, "fall_threshold"),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for detector operations
pub type DetectorResult<T> = Result<T, DetectorError>;

/// Detector errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DetectorError {
    /// Threshold must be finite and strictly positive
    #[error("Threshold {name} = {value} must be finite and positive")]
    InvalidThreshold {
        /// Name of the offending configuration field
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// Duration must be non-zero
    #[error("Duration {name} must be greater than zero")]
    InvalidDuration {
        /// Name of the offending configuration field
        name: &'static str,
    },

    /// Sample contains NaN or infinite components
    #[error("Invalid sample: axis values must be finite")]
    InvalidSample,

    /// Contact number failed validation
    #[error("Invalid contact number: {reason}")]
    InvalidContact {
        /// What is wrong with the number
        reason: &'static str,
    },
}

impl DetectorError {
    /// True for errors raised while validating configuration
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::InvalidSample)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DetectorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidThreshold { name, value } =>
                defmt::write!(fmt, "Threshold {} = {} invalid", name, value),
            Self::InvalidDuration { name } =>
                defmt::write!(fmt, "Duration {} is zero", name),
            Self::InvalidSample =>
                defmt::write!(fmt, "Invalid sample"),
            Self::InvalidContact { reason } =>
                defmt::write!(fmt, "Invalid contact: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(DetectorError::InvalidDuration { name: "cooldown_ms" }.is_configuration());
        assert!(DetectorError::InvalidContact { reason: "empty" }.is_configuration());
        assert!(!DetectorError::InvalidSample.is_configuration());
    }

    #[test]
    fn error_fits_in_a_register_pair() {
        assert!(core::mem::size_of::<DetectorError>() <= 32);
    }
}
