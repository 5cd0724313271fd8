//! Univariate Gaussian mixture deconvolution.

use std::time::Instant;

use rand::Rng;
use unmix_common::{EmConfig, Error, ProblemKind, Result};
use unmix_math::{normal_pdf, rms_error};

use super::init::random_gaussian_init;
use super::mixture::Workspace;
use super::result::{ConvergenceStatus, GaussianResult, MixtureIteration};
use super::{check_observations, effective_config, elapsed_micros, trace};

#[derive(Debug, Clone)]
struct Params {
    probs: Vec<f64>,
    means: Vec<f64>,
    vars: Vec<f64>,
}

/// Fit a `num_components`-component Gaussian mixture to `values`.
///
/// Each pass updates proportions, then means, then variances, with the
/// variance taken about the mean computed in the same pass. The solve stops
/// once the RMS change of all three parameter vectors is below the
/// tolerance, or after `max_iterations` passes.
///
/// # Errors
///
/// Input errors (`EmptyInput`, `InvalidComponentCount`, `NonFiniteValue`,
/// `InvalidConfig`) are raised before anything is allocated.
/// `ZeroSampleVariance` when every observation is identical, which includes
/// a single observation. `ZeroResponsibility` or `VarianceCollapse` when a
/// component degenerates mid-solve.
pub fn solve_gaussian_mixture<R: Rng + ?Sized>(
    values: &[f64],
    num_components: usize,
    config: Option<&EmConfig>,
    rng: &mut R,
) -> Result<GaussianResult> {
    let summary = check_observations(values, num_components)?;
    let cfg = effective_config(config, ProblemKind::Gaussian)?;
    if summary.range() == 0.0 || summary.variance <= 0.0 {
        return Err(Error::ZeroSampleVariance);
    }

    let start = Instant::now();
    trace::started(ProblemKind::Gaussian, values.len(), num_components, &cfg);

    let init = random_gaussian_init(&summary, num_components, rng);
    let mut current = Params {
        probs: init.probs.clone(),
        means: init.means.clone(),
        vars: init.vars.clone(),
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
            normal_pdf(x, previous.means[j], previous.vars[j])
        });
        trace::guard_floor(&cfg, ProblemKind::Gaussian, iteration, floored);

        for j in 0..num_components {
            let mass = ws.column_mass(j, iteration)?;
            current.probs[j] = mass / n;
            let mean = ws.weighted_mean(j, values, mass);
            current.means[j] = mean;
            let variance = ws.weighted_variance(j, values, mean, mass);
            if !(variance.is_finite() && variance > 0.0) {
                return Err(Error::VarianceCollapse {
                    component: j,
                    iteration,
                    variance,
                });
            }
            current.vars[j] = variance;
        }

        let step = MixtureIteration {
            iteration,
            proportion_error: rms_error(&current.probs, &previous.probs),
            mean_error: rms_error(&current.means, &previous.means),
            variance_error: Some(rms_error(&current.vars, &previous.vars)),
            floored_cells: floored,
        };
        converged = step.proportion_error < tolerance
            && step.mean_error < tolerance
            && step.variance_error.is_some_and(|e| e < tolerance);
        trace::mixture_pass(&cfg, ProblemKind::Gaussian, &step);
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
        ProblemKind::Gaussian,
        iteration,
        status,
        elapsed_micros,
    );

    Ok(GaussianResult {
        num_gaussians: num_components,
        iterations_taken: iteration,
        status,
        means_init: init.means,
        vars_init: init.vars,
        probs_init: init.probs,
        means_final: current.means,
        vars_final: current.vars,
        probs_final: current.probs,
        history,
        elapsed_micros,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use unmix_math::SampleSummary;

    fn two_clusters() -> Vec<f64> {
        let mut v = Vec::new();
        for i in 0..50 {
            let jitter = (i % 10) as f64 * 0.1 - 0.45;
            v.push(jitter);
            v.push(10.0 + jitter);
        }
        v
    }

    #[test]
    fn single_component_recovers_sample_moments() {
        let values = [1.0, 2.0, 4.0, 7.0];
        let mut rng = StdRng::seed_from_u64(3);
        let res = solve_gaussian_mixture(&values, 1, None, &mut rng).unwrap();
        let s = SampleSummary::from_values(&values).unwrap();
        assert_eq!(res.status, ConvergenceStatus::Converged);
        assert_eq!(res.probs_final, vec![1.0]);
        assert!((res.means_final[0] - s.mean).abs() < 1e-12);
        assert!((res.vars_final[0] - s.variance).abs() < 1e-9);
        // First pass lands on the moments, second confirms them.
        assert_eq!(res.iterations_taken, 3);
        assert_eq!(res.history.len(), 2);
    }

    #[test]
    fn separated_clusters_are_recovered() {
        let values = two_clusters();
        let mut rng = StdRng::seed_from_u64(11);
        let res = solve_gaussian_mixture(&values, 2, None, &mut rng).unwrap();
        let sum: f64 = res.probs_final.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        let mut means = res.means_final.clone();
        means.sort_by(|a, b| a.total_cmp(b));
        assert!(means[0].abs() < 0.5, "{means:?}");
        assert!((means[1] - 10.0).abs() < 0.5, "{means:?}");
        assert!(res.vars_final.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn zero_iterations_returns_initial_guess() {
        let values = two_clusters();
        let cfg = EmConfig::for_problem(ProblemKind::Gaussian).with_max_iterations(0);
        let mut rng = StdRng::seed_from_u64(5);
        let res = solve_gaussian_mixture(&values, 3, Some(&cfg), &mut rng).unwrap();
        assert_eq!(res.means_init, res.means_final);
        assert_eq!(res.vars_init, res.vars_final);
        assert_eq!(res.probs_init, res.probs_final);
        assert_eq!(res.iterations_taken, 1);
        assert_eq!(res.status, ConvergenceStatus::MaxIterationsReached);
    }

    #[test]
    fn identical_values_have_no_variance() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            solve_gaussian_mixture(&[2.5], 1, None, &mut rng),
            Err(Error::ZeroSampleVariance)
        ));
        assert!(matches!(
            solve_gaussian_mixture(&[2.5, 2.5, 2.5], 2, None, &mut rng),
            Err(Error::ZeroSampleVariance)
        ));
    }

    #[test]
    fn input_checked_before_config() {
        let bad = EmConfig::for_problem(ProblemKind::Gaussian).with_relative_tolerance(-1.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            solve_gaussian_mixture(&[], 2, Some(&bad), &mut rng),
            Err(Error::EmptyInput { .. })
        ));
        assert!(matches!(
            solve_gaussian_mixture(&[1.0, 2.0], 2, Some(&bad), &mut rng),
            Err(Error::InvalidConfig(_))
        ));
    }
}
