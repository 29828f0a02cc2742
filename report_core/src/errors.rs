//! # Error Types
//!
//! Structured error types for report_core. Every variant carries enough
//! context (offending field, series or path) to diagnose a failed run
//! without re-running it.
//!
//! ## Example
//!
//! ```rust
//! use report_core::errors::{ReportError, ReportResult};
//!
//! fn require_points(n: usize) -> ReportResult<()> {
//!     if n == 0 {
//!         return Err(ReportError::integrity("position", 1, 0));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_points(0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for report_core operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Structured error type for report generation.
///
/// Dataset and axis errors are fatal for a run. The one soft failure in the
/// pipeline (a missing illustrative image) never surfaces as an error; it is
/// turned into a placeholder note by the model builder.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ReportError {
    /// A required field has no matching column in the source table
    #[error("Missing required field '{field}' (available columns: {available:?})")]
    Schema {
        field: String,
        available: Vec<String>,
    },

    /// A required field contains a value that is not a finite number
    #[error("Non-numeric value in '{field}' at row {row}: {value:?}")]
    Type {
        field: String,
        row: usize,
        value: String,
    },

    /// Parallel series disagree in length (or the table is empty)
    #[error("Series '{series}' has {actual} values, expected {expected}")]
    Integrity {
        series: String,
        expected: usize,
        actual: usize,
    },

    /// An axis would collapse to zero extent
    #[error("Degenerate {axis}-axis: {reason}")]
    DegenerateAxis { axis: String, reason: String },

    /// Input could not be acquired
    #[error("I/O error: {operation} on '{path}' - {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    /// Input was read but could not be parsed
    #[error("Format error in '{path}': {reason}")]
    Format { path: String, reason: String },

    /// Output could not be produced
    #[error("Render failed: {reason}")]
    Render { reason: String },

    /// Report configuration is invalid
    #[error("Invalid configuration '{field}': {reason}")]
    Config { field: String, reason: String },
}

impl ReportError {
    /// Create a Schema error
    pub fn schema(field: impl Into<String>, available: Vec<String>) -> Self {
        ReportError::Schema {
            field: field.into(),
            available,
        }
    }

    /// Create a Type error
    pub fn type_error(field: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        ReportError::Type {
            field: field.into(),
            row,
            value: value.into(),
        }
    }

    /// Create an Integrity error
    pub fn integrity(series: impl Into<String>, expected: usize, actual: usize) -> Self {
        ReportError::Integrity {
            series: series.into(),
            expected,
            actual,
        }
    }

    /// Create a DegenerateAxis error
    pub fn degenerate_axis(axis: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::DegenerateAxis {
            axis: axis.into(),
            reason: reason.into(),
        }
    }

    /// Create an Io error
    pub fn io(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::Io {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Format error
    pub fn format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Render error
    pub fn render(reason: impl Into<String>) -> Self {
        ReportError::Render {
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same run could succeed.
    ///
    /// Always false: validation errors are deterministic and render errors
    /// are treated as non-retryable.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// True for errors raised while validating or scaling the dataset
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReportError::Schema { .. }
                | ReportError::Type { .. }
                | ReportError::Integrity { .. }
                | ReportError::DegenerateAxis { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ReportError::Schema { .. } => "SCHEMA_ERROR",
            ReportError::Type { .. } => "TYPE_ERROR",
            ReportError::Integrity { .. } => "INTEGRITY_ERROR",
            ReportError::DegenerateAxis { .. } => "DEGENERATE_AXIS",
            ReportError::Io { .. } => "IO_ERROR",
            ReportError::Format { .. } => "FORMAT_ERROR",
            ReportError::Render { .. } => "RENDER_ERROR",
            ReportError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::Render { .. } => 3,
            ReportError::Io { .. } | ReportError::Format { .. } => 2,
            err if err.is_validation() => 2,
            _ => 1,
        }
    }
}
