//! Solver diagnostics routed through `tracing`.
//!
//! With `verbose` set, per-pass records go out at INFO and guard
//! activations at WARN; otherwise they drop to TRACE and DEBUG so a default
//! subscriber stays quiet.

use unmix_common::{EmConfig, ProblemKind};

use super::result::{ConvergenceStatus, MixtureIteration, MultinomialIteration};
use crate::logging::event_names;

pub(crate) fn started(
    problem: ProblemKind,
    observations: usize,
    components: usize,
    cfg: &EmConfig,
) {
    tracing::debug!(
        event = event_names::EM_STARTED,
        problem = %problem,
        observations,
        components,
        max_iterations = cfg.max_iterations,
        relative_tolerance = cfg.relative_tolerance,
        "starting EM"
    );
}

pub(crate) fn multinomial_pass(cfg: &EmConfig, step: &MultinomialIteration) {
    if cfg.verbose {
        tracing::info!(
            event = event_names::EM_ITERATION,
            problem = "multinomial",
            iteration = step.iteration,
            rms_error = step.rms_error,
            "EM iteration"
        );
    } else {
        tracing::trace!(
            event = event_names::EM_ITERATION,
            problem = "multinomial",
            iteration = step.iteration,
            rms_error = step.rms_error,
            "EM iteration"
        );
    }
}

pub(crate) fn mixture_pass(cfg: &EmConfig, problem: ProblemKind, step: &MixtureIteration) {
    if cfg.verbose {
        tracing::info!(
            event = event_names::EM_ITERATION,
            problem = %problem,
            iteration = step.iteration,
            mean_error = step.mean_error,
            variance_error = ?step.variance_error,
            proportion_error = step.proportion_error,
            "EM iteration"
        );
    } else {
        tracing::trace!(
            event = event_names::EM_ITERATION,
            problem = %problem,
            iteration = step.iteration,
            mean_error = step.mean_error,
            variance_error = ?step.variance_error,
            proportion_error = step.proportion_error,
            "EM iteration"
        );
    }
}

pub(crate) fn guard_floor(cfg: &EmConfig, problem: ProblemKind, iteration: usize, floored: usize) {
    if floored == 0 {
        return;
    }
    if cfg.verbose {
        tracing::warn!(
            event = event_names::EM_GUARD_FLOOR,
            problem = %problem,
            iteration,
            floored_cells = floored,
            "zero likelihoods raised to floor"
        );
    } else {
        tracing::debug!(
            event = event_names::EM_GUARD_FLOOR,
            problem = %problem,
            iteration,
            floored_cells = floored,
            "zero likelihoods raised to floor"
        );
    }
}

pub(crate) fn finished(
    cfg: &EmConfig,
    problem: ProblemKind,
    iterations_taken: usize,
    status: ConvergenceStatus,
    elapsed_micros: u64,
) {
    if cfg.verbose {
        tracing::info!(
            event = event_names::EM_FINISHED,
            problem = %problem,
            iterations_taken,
            status = %status,
            elapsed_micros,
            "EM finished"
        );
    } else {
        tracing::debug!(
            event = event_names::EM_FINISHED,
            problem = %problem,
            iterations_taken,
            status = %status,
            elapsed_micros,
            "EM finished"
        );
    }
}
