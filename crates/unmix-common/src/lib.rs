//! unmix common types and errors.
//!
//! This crate provides foundational types shared across the unmix crates:
//! - The error taxonomy with stable codes
//! - Solver configuration and per-problem defaults
//! - Output format specifications

pub mod config;
pub mod error;
pub mod output;

pub use config::{EmConfig, ProblemKind};
pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
