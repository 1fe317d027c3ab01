//! Error types for availability-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Validation failures raised at the engine boundary.
///
/// The interval algebra itself never fails; these errors are produced by the
/// validation layer before inputs reach it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// An interval whose start lies after its end.
    #[error("Invalid interval in {field}[{index}]: start {start} is after end {end}")]
    InvalidInterval {
        field: String,
        index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A scheduling window that is empty or inverted.
    #[error("Invalid window: window_start {start} must be before window_end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A slot policy field outside its accepted range.
    #[error("Invalid policy field {field}: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
