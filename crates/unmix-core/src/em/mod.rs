//! Expectation-Maximization solvers.
//!
//! Three entry points, each validating its input before allocating anything:
//!
//! - [`solve_multinomial`]: category abundances from compatibility counts
//! - [`solve_gaussian_mixture`]: means, variances and proportions of a
//!   univariate Gaussian mixture
//! - [`solve_exponential_mixture`]: means and proportions of a univariate
//!   exponential mixture
//!
//! Mixture solvers draw their starting point from a caller-supplied
//! generator, so identical seeds give identical runs and concurrent solves
//! never share random state.

pub mod exponential;
pub mod gaussian;
pub mod init;
mod mixture;
pub mod multinomial;
pub mod result;
mod trace;

pub use exponential::solve_exponential_mixture;
pub use gaussian::solve_gaussian_mixture;
pub use init::{random_exponential_init, random_gaussian_init, ExponentialInit, GaussianInit};
pub use mixture::LIKELIHOOD_FLOOR;
pub use multinomial::{solve_multinomial, CompatibilityCounts};
pub use result::{
    ConvergenceStatus, ExponentialResult, GaussianResult, MixtureIteration, MultinomialIteration,
    MultinomialResult,
};

use std::time::Instant;

use unmix_common::{EmConfig, Error, ProblemKind, Result};
use unmix_math::SampleSummary;

/// Resolve the effective configuration and reject unusable settings.
fn effective_config(config: Option<&EmConfig>, problem: ProblemKind) -> Result<EmConfig> {
    let cfg = config.copied().unwrap_or_else(|| EmConfig::for_problem(problem));
    cfg.validate()?;
    Ok(cfg)
}

/// Validate an observation vector and component count, then summarise it.
fn check_observations(values: &[f64], components: usize) -> Result<SampleSummary> {
    if components == 0 {
        return Err(Error::InvalidComponentCount { components });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteValue { index });
    }
    SampleSummary::from_values(values).ok_or(Error::EmptyInput {
        what: "observations",
    })
}

fn elapsed_micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
