//! Solver configuration and per-problem defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default iteration cap shared by every problem kind.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default relative tolerance for the multinomial solver.
pub const DEFAULT_MULTINOMIAL_RTOLE: f64 = 1e-5;

/// Default relative tolerance for the mixture solvers.
pub const DEFAULT_MIXTURE_RTOLE: f64 = 1e-6;

/// The three estimation problems the engine solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    Multinomial,
    Gaussian,
    Exponential,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 3] = [
        ProblemKind::Multinomial,
        ProblemKind::Gaussian,
        ProblemKind::Exponential,
    ];

    /// Built-in configuration for this problem.
    pub fn default_config(self) -> EmConfig {
        let relative_tolerance = match self {
            ProblemKind::Multinomial => DEFAULT_MULTINOMIAL_RTOLE,
            ProblemKind::Gaussian | ProblemKind::Exponential => DEFAULT_MIXTURE_RTOLE,
        };
        EmConfig {
            verbose: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            relative_tolerance,
        }
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemKind::Multinomial => write!(f, "multinomial"),
            ProblemKind::Gaussian => write!(f, "gaussian"),
            ProblemKind::Exponential => write!(f, "exponential"),
        }
    }
}

/// Settings for a single solve. Read-only while the solver runs.
///
/// `max_iterations = 0` is accepted: the solver performs no pass and
/// returns its starting parameters unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmConfig {
    /// Emit per-iteration records and guard activations at elevated levels.
    #[serde(default)]
    pub verbose: bool,

    /// Upper bound on EM passes.
    pub max_iterations: usize,

    /// Convergence threshold on the RMS change of each tracked parameter.
    pub relative_tolerance: f64,
}

impl EmConfig {
    pub fn for_problem(kind: ProblemKind) -> Self {
        kind.default_config()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_relative_tolerance(mut self, relative_tolerance: f64) -> Self {
        self.relative_tolerance = relative_tolerance;
        self
    }

    /// Reject tolerances a solver cannot use.
    pub fn validate(&self) -> Result<()> {
        if !self.relative_tolerance.is_finite() || self.relative_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "relative_tolerance must be positive and finite, got {}",
                self.relative_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_differ_by_problem() {
        let m = EmConfig::for_problem(ProblemKind::Multinomial);
        let g = EmConfig::for_problem(ProblemKind::Gaussian);
        let e = EmConfig::for_problem(ProblemKind::Exponential);
        assert_eq!(m.relative_tolerance, 1e-5);
        assert_eq!(g.relative_tolerance, 1e-6);
        assert_eq!(e, g);
        assert_eq!(m.max_iterations, 1000);
        assert!(!m.verbose);
    }

    #[test]
    fn validate_rejects_bad_tolerance() {
        let base = EmConfig::for_problem(ProblemKind::Gaussian);
        for bad in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            let err = base.with_relative_tolerance(bad).validate().unwrap_err();
            assert_eq!(err.code(), 20);
        }
        assert!(base.validate().is_ok());
    }

    #[test]
    fn zero_iterations_is_valid() {
        let cfg = EmConfig::for_problem(ProblemKind::Multinomial).with_max_iterations(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn verbose_defaults_when_missing_from_json() {
        let cfg: EmConfig =
            serde_json::from_str(r#"{"max_iterations": 50, "relative_tolerance": 1e-4}"#).unwrap();
        assert!(!cfg.verbose);
        assert_eq!(cfg.max_iterations, 50);
    }

    #[test]
    fn problem_kind_display_matches_serde() {
        for kind in ProblemKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
