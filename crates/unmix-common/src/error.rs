//! Error types for unmix.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Iteration-cap exhaustion is deliberately absent: a solver that stops at
//! `max_iterations` still returns a usable result and reports it through
//! its convergence status.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 13,
//!   "category": "input",
//!   "message": "malformed compatibility pattern at row 3: expected 4 categories, found 5",
//!   "recoverable": true,
//!   "context": { "row": 3 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for unmix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or inconsistent solver input. Raised before any iteration.
    Input,
    /// Invalid solver settings.
    Config,
    /// A degenerate computation met during iteration.
    Numerical,
    /// File I/O and (de)serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for unmix.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("empty input: {what}")]
    EmptyInput { what: &'static str },

    #[error(
        "pattern/count length mismatch: {patterns} patterns but {counts} counts"
    )]
    LengthMismatch { patterns: usize, counts: usize },

    #[error(
        "invalid component count {components}: at least one component is required"
    )]
    InvalidComponentCount { components: usize },

    #[error("malformed compatibility pattern at row {row}: {reason}")]
    MalformedPattern { row: usize, reason: String },

    #[error("compatibility pattern at row {row} is compatible with no category")]
    EmptyPattern { row: usize },

    #[error("total count is zero: nothing to distribute")]
    ZeroTotalCount,

    #[error("total count overflows a 64-bit counter")]
    CountOverflow,

    #[error("observation {index} is not a finite number")]
    NonFiniteValue { index: usize },

    // Configuration errors (20-29)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Numerical errors (30-39)
    #[error("row {row} has zero compatible abundance at iteration {iteration}")]
    ZeroRowMass { row: usize, iteration: usize },

    #[error("sample variance is zero: every observation is identical")]
    ZeroSampleVariance,

    #[error(
        "variance of component {component} collapsed to {variance:e} at iteration {iteration}"
    )]
    VarianceCollapse {
        component: usize,
        iteration: usize,
        variance: f64,
    },

    #[error(
        "component {component} lost all responsibility at iteration {iteration}"
    )]
    ZeroResponsibility { component: usize, iteration: usize },

    #[error(
        "mean of component {component} is {mean:e} at iteration {iteration}; \
         exponential means must be positive"
    )]
    NonPositiveMean {
        component: usize,
        iteration: usize,
        mean: f64,
    },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Configuration errors
    /// - 30-39: Numerical errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::EmptyInput { .. } => 10,
            Error::LengthMismatch { .. } => 11,
            Error::InvalidComponentCount { .. } => 12,
            Error::MalformedPattern { .. } => 13,
            Error::EmptyPattern { .. } => 14,
            Error::ZeroTotalCount => 15,
            Error::CountOverflow => 16,
            Error::NonFiniteValue { .. } => 17,
            Error::InvalidConfig(_) => 20,
            Error::ZeroRowMass { .. } => 30,
            Error::ZeroSampleVariance => 31,
            Error::VarianceCollapse { .. } => 32,
            Error::ZeroResponsibility { .. } => 33,
            Error::NonPositiveMean { .. } => 34,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Parse { .. } => 62,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyInput { .. }
            | Error::LengthMismatch { .. }
            | Error::InvalidComponentCount { .. }
            | Error::MalformedPattern { .. }
            | Error::EmptyPattern { .. }
            | Error::ZeroTotalCount
            | Error::CountOverflow
            | Error::NonFiniteValue { .. } => ErrorCategory::Input,

            Error::InvalidConfig(_) => ErrorCategory::Config,

            Error::ZeroRowMass { .. }
            | Error::ZeroSampleVariance
            | Error::VarianceCollapse { .. }
            | Error::ZeroResponsibility { .. }
            | Error::NonPositiveMean { .. } => ErrorCategory::Numerical,

            Error::Io(_) | Error::Json(_) | Error::Parse { .. } => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Input and config errors are fixed by correcting what was supplied.
    /// Mixture degeneracies depend on the random start and may disappear
    /// with another seed or a different component count.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::ZeroSampleVariance => false,
            Error::CountOverflow => false,
            Error::ZeroRowMass { .. } => false,
            _ => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::EmptyInput { .. } => "Supply at least one observation or compatibility row.",
            Error::LengthMismatch { .. } => {
                "Every compatibility pattern needs exactly one count. Check for dropped rows."
            }
            Error::InvalidComponentCount { .. } => "Request at least one mixture component.",
            Error::MalformedPattern { .. } => {
                "Patterns must contain only '0'/'1' and all rows must have the same length."
            }
            Error::EmptyPattern { .. } => {
                "Each pattern must mark at least one compatible category with '1'."
            }
            Error::ZeroTotalCount => "At least one pattern must have a positive count.",
            Error::CountOverflow => "Counts are too large; rescale them before solving.",
            Error::NonFiniteValue { .. } => "Remove NaN or infinite values from the observations.",
            Error::InvalidConfig(_) => {
                "Check the settings file and solver flags. Run 'unmix config show' to inspect them."
            }
            Error::ZeroRowMass { .. } => {
                "A compatibility row lost all support. Check for categories never observed."
            }
            Error::ZeroSampleVariance => {
                "All observations are identical; a Gaussian mixture is undefined for them."
            }
            Error::VarianceCollapse { .. } | Error::ZeroResponsibility { .. } => {
                "A component collapsed. Retry with another --seed or fewer components."
            }
            Error::NonPositiveMean { .. } => {
                "Exponential mixtures need positive observations. Check for non-positive values."
            }
            Error::Io(_) => "Check that the input is readable and the output location is writable.",
            Error::Json(_) => "Invalid JSON. Check the syntax of the settings file.",
            Error::Parse { .. } => "Fix the reported line of the input file.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::EmptyInput { .. } => "Empty Input",
            Error::LengthMismatch { .. } => "Pattern/Count Mismatch",
            Error::InvalidComponentCount { .. } => "Invalid Component Count",
            Error::MalformedPattern { .. } => "Malformed Pattern",
            Error::EmptyPattern { .. } => "Empty Pattern",
            Error::ZeroTotalCount => "Zero Total Count",
            Error::CountOverflow => "Count Overflow",
            Error::NonFiniteValue { .. } => "Non-Finite Observation",
            Error::InvalidConfig(_) => "Invalid Configuration",
            Error::ZeroRowMass { .. } => "Degenerate Compatibility Row",
            Error::ZeroSampleVariance => "Zero Sample Variance",
            Error::VarianceCollapse { .. } => "Variance Collapse",
            Error::ZeroResponsibility { .. } => "Empty Component",
            Error::NonPositiveMean { .. } => "Non-Positive Exponential Mean",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
            Error::Parse { .. } => "Input Parse Error",
        }
    }

    /// Format for a terminal: headline, reason, fix.
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (row, component, iteration...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::LengthMismatch { patterns, counts } => {
                context.insert("patterns".to_string(), serde_json::json!(patterns));
                context.insert("counts".to_string(), serde_json::json!(counts));
            }
            Error::InvalidComponentCount { components } => {
                context.insert("components".to_string(), serde_json::json!(components));
            }
            Error::MalformedPattern { row, .. } | Error::EmptyPattern { row } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::NonFiniteValue { index } => {
                context.insert("index".to_string(), serde_json::json!(index));
            }
            Error::ZeroRowMass { row, iteration } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("iteration".to_string(), serde_json::json!(iteration));
            }
            Error::VarianceCollapse {
                component,
                iteration,
                ..
            }
            | Error::ZeroResponsibility {
                component,
                iteration,
            }
            | Error::NonPositiveMean {
                component,
                iteration,
                ..
            } => {
                context.insert("component".to_string(), serde_json::json!(component));
                context.insert("iteration".to_string(), serde_json::json!(iteration));
            }
            Error::Parse { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
