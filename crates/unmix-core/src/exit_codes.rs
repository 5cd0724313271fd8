//! Exit codes for the `unmix` CLI.
//!
//! Exit codes communicate the solve outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Solve outcomes (results were written)
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Computation and I/O failures

use unmix_common::{Error, ErrorCategory};

/// Exit codes for unmix operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Solve Outcomes (0-1)
    // ========================================================================
    /// Converged within tolerance
    Converged = 0,

    /// Iteration cap reached; estimates written but provisional
    MaxIterations = 1,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Input data rejected
    InputError = 11,

    /// Settings file or solver settings rejected
    ConfigError = 12,

    // ========================================================================
    // Computation / I/O Errors (20-29)
    // ========================================================================
    /// Degenerate computation during iteration
    NumericalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if results were produced (codes 0-1).
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code indicates any error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Converged => "OK_CONVERGED",
            ExitCode::MaxIterations => "OK_MAX_ITERATIONS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::NumericalError => "ERR_NUMERICAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Map a solver or I/O error onto its exit code.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Numerical => ExitCode::NumericalError,
            ErrorCategory::Io => match err {
                Error::Parse { .. } => ExitCode::InputError,
                _ => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
