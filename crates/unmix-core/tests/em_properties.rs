//! Property tests for the EM solvers.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use unmix_core::{
    solve_exponential_mixture, solve_gaussian_mixture, solve_multinomial, CompatibilityCounts,
    EmConfig, Error, ProblemKind,
};

/// Passes inspected at the end of a run.
const TAIL: usize = 8;

/// Rows of `categories` flags, each with at least one `1`, plus counts with
/// a positive total.
fn compat_table() -> impl Strategy<Value = (Vec<String>, Vec<u64>)> {
    (1usize..8, 1usize..12).prop_flat_map(|(categories, rows)| {
        let row = prop::collection::vec(any::<bool>(), categories).prop_map(|mut flags| {
            if !flags.iter().any(|&f| f) {
                flags[0] = true;
            }
            flags
                .into_iter()
                .map(|f| if f { '1' } else { '0' })
                .collect::<String>()
        });
        (
            prop::collection::vec(row, rows),
            prop::collection::vec(0u64..1000, rows),
        )
            .prop_map(|(patterns, mut counts)| {
                if counts.iter().all(|&c| c == 0) {
                    counts[0] = 1;
                }
                (patterns, counts)
            })
    })
}

/// Degenerate fits a random start may legitimately run into.
fn is_degenerate_fit(err: &Error) -> bool {
    matches!(
        err,
        Error::VarianceCollapse { .. }
            | Error::ZeroResponsibility { .. }
            | Error::NonPositiveMean { .. }
    )
}

/// The later half of the last `TAIL` errors must not average above the
/// earlier half. Runs shorter than `TAIL` passes are not judged.
fn check_tail_settles(label: &str, errors: &[f64]) -> Result<(), TestCaseError> {
    if errors.len() < TAIL {
        return Ok(());
    }
    let (early, late) = errors[errors.len() - TAIL..].split_at(TAIL / 2);
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let (early, late) = (mean(early), mean(late));
    prop_assert!(
        late <= early * (1.0 + 1e-9) + 1e-12,
        "{} rose over the last passes: {} -> {}",
        label,
        early,
        late
    );
    Ok(())
}

/// Two evenly filled unit-width blocks `gap` apart.
fn two_blocks(gap: f64, per_block: usize) -> Vec<f64> {
    let step = 1.0 / per_block as f64;
    (0..per_block)
        .map(|i| i as f64 * step)
        .flat_map(|x| [x, x + gap])
        .collect()
}

/// Exponential quantiles at two means, `per_rate` points each.
fn two_rates(ratio: f64, per_rate: usize) -> Vec<f64> {
    let quantile = |i: usize| -(1.0 - (i as f64 + 0.5) / per_rate as f64).ln();
    (0..per_rate)
        .flat_map(|i| [quantile(i), ratio * quantile(i)])
        .collect()
}

proptest! {
    #[test]
    fn multinomial_abundances_form_a_distribution((patterns, counts) in compat_table()) {
        let data = CompatibilityCounts::from_patterns(&patterns, &counts).unwrap();
        let result = solve_multinomial(&data, None).unwrap();

        prop_assert_eq!(result.values.len(), data.num_categories());
        let in_range = |v: f64| (0.0..=1.0 + 1e-12).contains(&v);
        prop_assert!(result.values.iter().all(|&v| in_range(v)));
        prop_assert!((result.values.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        let cap = EmConfig::for_problem(ProblemKind::Multinomial).max_iterations;
        prop_assert!(result.iterations_taken <= cap);
    }

    #[test]
    fn multinomial_never_credits_unseen_categories((patterns, counts) in compat_table()) {
        let data = CompatibilityCounts::from_patterns(&patterns, &counts).unwrap();
        let result = solve_multinomial(&data, None).unwrap();

        let mut seen = vec![false; data.num_categories()];
        for row in 0..data.num_patterns() {
            if data.count(row) > 0 {
                for &j in data.compatible(row) {
                    seen[j] = true;
                }
            }
        }
        for (j, &v) in result.values.iter().enumerate() {
            if !seen[j] {
                prop_assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn gaussian_proportions_sum_to_one(
        values in prop::collection::vec(-50.0f64..50.0, 8..60),
        k in 1usize..4,
        seed in any::<u64>(),
    ) {
        prop_assume!(values.iter().any(|&v| v != values[0]));
        let cfg = EmConfig::for_problem(ProblemKind::Gaussian).with_max_iterations(30);
        let mut rng = StdRng::seed_from_u64(seed);
        match solve_gaussian_mixture(&values, k, Some(&cfg), &mut rng) {
            Ok(result) => {
                prop_assert_eq!(result.num_gaussians, k);
                prop_assert!((result.probs_final.iter().sum::<f64>() - 1.0).abs() < 1e-6);
                prop_assert!(result.vars_final.iter().all(|&v| v > 0.0));
                prop_assert!((result.probs_init.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            }
            Err(err) => prop_assert!(is_degenerate_fit(&err), "unexpected error: {}", err),
        }
    }

    #[test]
    fn exponential_means_stay_positive(
        values in prop::collection::vec(0.01f64..100.0, 1..60),
        k in 1usize..4,
        seed in any::<u64>(),
    ) {
        let cfg = EmConfig::for_problem(ProblemKind::Exponential).with_max_iterations(30);
        let mut rng = StdRng::seed_from_u64(seed);
        match solve_exponential_mixture(&values, k, Some(&cfg), &mut rng) {
            Ok(result) => {
                prop_assert!(result.means_final.iter().all(|&m| m > 0.0));
                prop_assert!((result.probs_final.iter().sum::<f64>() - 1.0).abs() < 1e-6);
            }
            Err(err) => prop_assert!(is_degenerate_fit(&err), "unexpected error: {}", err),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn gaussian_errors_settle_at_the_end(
        gap in 8.0f64..40.0,
        per_block in 40usize..120,
        seed in any::<u64>(),
    ) {
        let values = two_blocks(gap, per_block);
        let mut rng = StdRng::seed_from_u64(seed);
        match solve_gaussian_mixture(&values, 2, None, &mut rng) {
            Ok(result) => {
                let h = &result.history;
                let means: Vec<f64> = h.iter().map(|p| p.mean_error).collect();
                let props: Vec<f64> = h.iter().map(|p| p.proportion_error).collect();
                let vars: Vec<f64> = h.iter().filter_map(|p| p.variance_error).collect();
                prop_assert_eq!(vars.len(), h.len());
                check_tail_settles("mean_error", &means)?;
                check_tail_settles("proportion_error", &props)?;
                check_tail_settles("variance_error", &vars)?;
            }
            Err(err) => prop_assert!(is_degenerate_fit(&err), "unexpected error: {}", err),
        }
    }

    #[test]
    fn exponential_errors_settle_at_the_end(
        ratio in 5.0f64..30.0,
        per_rate in 40usize..120,
        seed in any::<u64>(),
    ) {
        let values = two_rates(ratio, per_rate);
        let mut rng = StdRng::seed_from_u64(seed);
        match solve_exponential_mixture(&values, 2, None, &mut rng) {
            Ok(result) => {
                let h = &result.history;
                let means: Vec<f64> = h.iter().map(|p| p.mean_error).collect();
                let props: Vec<f64> = h.iter().map(|p| p.proportion_error).collect();
                prop_assert!(h.iter().all(|p| p.variance_error.is_none()));
                check_tail_settles("mean_error", &means)?;
                check_tail_settles("proportion_error", &props)?;
            }
            Err(err) => prop_assert!(is_degenerate_fit(&err), "unexpected error: {}", err),
        }
    }
}
