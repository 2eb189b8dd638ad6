//! Domain validation errors for instance data.
//!
//! Returned by [`ProblemData::try_new`](super::ProblemData::try_new) when the
//! supplied parameters violate the shape or sign rules of a lot-sizing
//! instance.
//!
//! # Examples
//!
//! ```
//! use lotsizing_benders::domain::{DomainError, InstanceParams, ProblemData};
//!
//! let params = InstanceParams::uniform(1, 2);
//! let mut bad = params.clone();
//! bad.capacity = vec![10.0];
//!
//! assert!(matches!(
//!     ProblemData::try_new(bad),
//!     Err(DomainError::DimensionMismatch { field: "capacity", .. })
//! ));
//! ```

use thiserror::Error;

/// Errors that occur when instance invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// An instance needs at least one item and one period.
    #[error("instance must have at least one item and one period, got {items}x{periods}")]
    EmptyInstance {
        /// Number of items supplied.
        items: usize,
        /// Number of periods supplied.
        periods: usize,
    },

    /// A parameter table does not match the declared dimensions.
    #[error("{field} has shape {actual}, expected {expected}")]
    DimensionMismatch {
        /// Name of the offending parameter.
        field: &'static str,
        /// Expected shape, e.g. `3x12`.
        expected: String,
        /// Shape that was supplied.
        actual: String,
    },

    /// Demands, capacities and costs must be non-negative.
    #[error("{field}[{index}] must be non-negative, got {value}")]
    Negative {
        field: &'static str,
        index: String,
        value: f64,
    },

    /// NaN or infinite parameter.
    #[error("{field}[{index}] must be finite")]
    NonFinite { field: &'static str, index: String },
}
