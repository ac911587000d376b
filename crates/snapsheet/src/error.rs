#![forbid(unsafe_code)]

//! Error types for panel construction and re-configuration.
//!
//! Only configuration that leaves the panel with no valid resting position
//! is an error. Cosmetic bounds (fraction range, snap index, backdrop
//! opacity) are clamped silently instead.

use thiserror::Error;

/// Standard result type for snapsheet APIs.
pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    /// The snap configuration yields no usable resting position.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The container has no usable extent to position a panel in.
    #[error("container height must be finite and positive (got {height})")]
    InvalidContainerHeight { height: f64 },
}

impl SheetError {
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
