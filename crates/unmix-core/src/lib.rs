//! unmix core library
//!
//! Maximum-likelihood estimation by Expectation-Maximization for:
//! - Multinomial de-coarsening (category abundances from compatibility counts)
//! - Univariate Gaussian mixture deconvolution
//! - Univariate exponential mixture deconvolution
//!
//! Around the solvers it provides input parsers, result writers, settings
//! file resolution, structured logging and exit codes for the `unmix`
//! binary, whose entry point is in `main.rs`.

pub mod config;
pub mod em;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod output;

pub use em::{
    solve_exponential_mixture, solve_gaussian_mixture, solve_multinomial, CompatibilityCounts,
    ConvergenceStatus, ExponentialResult, GaussianResult, MultinomialResult,
};
pub use unmix_common::{EmConfig, Error, ProblemKind, Result};
