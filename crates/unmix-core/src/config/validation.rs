//! Semantic validation for settings files.
//!
//! Shape and types are checked by serde; this module checks that the values
//! make sense for a solver.

use thiserror::Error;
use unmix_common::ProblemKind;

use super::{SettingsFile, SolverOverrides};

/// Errors that can occur during semantic validation.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error(
        "{problem}.relative_tolerance must be positive and finite (got {value})"
    )]
    InvalidTolerance { problem: ProblemKind, value: f64 },
}

/// Validate every section present in a settings file.
pub fn validate_settings(settings: &SettingsFile) -> Result<(), ValidationError> {
    for kind in ProblemKind::ALL {
        if let Some(section) = settings.section(kind) {
            validate_overrides(kind, section)?;
        }
    }
    Ok(())
}

fn validate_overrides(
    problem: ProblemKind,
    section: &SolverOverrides,
) -> Result<(), ValidationError> {
    if let Some(value) = section.relative_tolerance {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::InvalidTolerance { problem, value });
        }
    }
    Ok(())
}
