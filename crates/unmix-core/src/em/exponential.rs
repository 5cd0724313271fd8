//! Univariate exponential mixture deconvolution.
//!
//! Components are parameterised by their mean, not their rate.

use std::time::Instant;

use rand::Rng;
use unmix_common::{EmConfig, Error, ProblemKind, Result};
use unmix_math::{exponential_pdf, rms_error};

use super::init::random_exponential_init;
use super::mixture::Workspace;
use super::result::{ConvergenceStatus, ExponentialResult, MixtureIteration};
use super::{check_observations, effective_config, elapsed_micros, trace};

#[derive(Debug, Clone)]
struct Params {
    probs: Vec<f64>,
    means: Vec<f64>,
}

fn check_mean(component: usize, iteration: usize, mean: f64) -> Result<f64> {
    if mean.is_finite() && mean > 0.0 {
        Ok(mean)
    } else {
        Err(Error::NonPositiveMean {
            component,
            iteration,
            mean,
        })
    }
}

/// Fit a `num_components`-component exponential mixture to `values`.
///
/// Stops once the RMS change of both the mean and proportion vectors is
/// below the tolerance, or after `max_iterations` passes.
///
/// # Errors
///
/// Input errors as for the Gaussian solver. `NonPositiveMean` when an
/// updated mean is not positive, which can only happen with non-positive
/// observations. `ZeroResponsibility` when a component loses all mass.
pub fn solve_exponential_mixture<R: Rng + ?Sized>(
    values: &[f64],
    num_components: usize,
    config: Option<&EmConfig>,
    rng: &mut R,
) -> Result<ExponentialResult> {
    let summary = check_observations(values, num_components)?;
    let cfg = effective_config(config, ProblemKind::Exponential)?;

    let start = Instant::now();
    trace::started(ProblemKind::Exponential, values.len(), num_components, &cfg);

    let init = random_exponential_init(&summary, num_components, rng);
    let mut current = Params {
        probs: init.probs.clone(),
        means: init.means.clone(),
    };
    let mut previous = current.clone();
    let mut ws = Workspace::new(values.len(), num_components);
    let n = ws.len() as f64;
    let tolerance = cfg.relative_tolerance;

    let mut history = Vec::new();
    let mut iteration = 1;
    let mut converged = false;

    while !converged && iteration <= cfg.max_iterations {
        std::mem::swap(&mut current, &mut previous);

        let floored = ws.expectation(values, &previous.probs, |j, x| {
            exponential_pdf(x, previous.means[j])
        });
        trace::guard_floor(&cfg, ProblemKind::Exponential, iteration, floored);

        for j in 0..num_components {
            let mass = ws.column_mass(j, iteration)?;
            current.probs[j] = mass / n;
            current.means[j] = check_mean(j, iteration, ws.weighted_mean(j, values, mass))?;
        }

        let step = MixtureIteration {
            iteration,
            proportion_error: rms_error(&current.probs, &previous.probs),
            mean_error: rms_error(&current.means, &previous.means),
            variance_error: None,
            floored_cells: floored,
        };
        converged = step.proportion_error < tolerance && step.mean_error < tolerance;
        trace::mixture_pass(&cfg, ProblemKind::Exponential, &step);
        history.push(step);

        iteration += 1;
    }

    let status = if converged {
        ConvergenceStatus::Converged
    } else {
        ConvergenceStatus::MaxIterationsReached
    };
    let elapsed_micros = elapsed_micros(start);
    trace::finished(
        &cfg,
        ProblemKind::Exponential,
        iteration,
        status,
        elapsed_micros,
    );

    Ok(ExponentialResult {
        num_exponentials: num_components,
        iterations_taken: iteration,
        status,
        means_init: init.means,
        probs_init: init.probs,
        means_final: current.means,
        probs_final: current.probs,
        history,
        elapsed_micros,
    })
}
