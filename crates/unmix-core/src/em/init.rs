//! Uniform-random starting points for the mixture solvers.
//!
//! Draws are integers in `0..10000` scaled by `1e-4`, so every starting
//! mean lies on a 1e-4 grid of `[min, max)` and every starting variance on
//! the same grid of `[0.4·var, 0.8·var)`. The generator is always supplied
//! by the caller; seeding it identically reproduces the draws exactly.

use rand::Rng;
use unmix_math::SampleSummary;

const DRAW_RESOLUTION: u32 = 10_000;

const VARIANCE_LOW: f64 = 0.4;
const VARIANCE_HIGH: f64 = 0.8;

/// Starting parameters for a Gaussian mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianInit {
    pub means: Vec<f64>,
    pub vars: Vec<f64>,
    pub probs: Vec<f64>,
}

/// Starting parameters for an exponential mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialInit {
    pub means: Vec<f64>,
    pub probs: Vec<f64>,
}

#[inline]
fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.random_range(0..DRAW_RESOLUTION)) / f64::from(DRAW_RESOLUTION)
}

#[inline]
fn scale(low: f64, high: f64, u: f64) -> f64 {
    (high - low) * u + low
}

/// Draw `k` Gaussian components from the sample summary.
///
/// Each component consumes two draws, mean first, then variance.
pub fn random_gaussian_init<R: Rng + ?Sized>(
    summary: &SampleSummary,
    k: usize,
    rng: &mut R,
) -> GaussianInit {
    let mut means = Vec::with_capacity(k);
    let mut vars = Vec::with_capacity(k);
    for _ in 0..k {
        means.push(scale(summary.min, summary.max, unit_draw(rng)));
        vars.push(scale(
            summary.variance * VARIANCE_LOW,
            summary.variance * VARIANCE_HIGH,
            unit_draw(rng),
        ));
    }
    GaussianInit {
        means,
        vars,
        probs: uniform_proportions(k),
    }
}

/// Draw `k` exponential component means from the sample summary.
///
/// A draw at or below zero is clamped to `f64::MIN_POSITIVE`, so every
/// starting mean is a valid exponential mean whatever the seed.
pub fn random_exponential_init<R: Rng + ?Sized>(
    summary: &SampleSummary,
    k: usize,
    rng: &mut R,
) -> ExponentialInit {
    let means = (0..k)
        .map(|_| {
            let mean = scale(summary.min, summary.max, unit_draw(rng));
            mean.max(f64::MIN_POSITIVE)
        })
        .collect();
    ExponentialInit {
        means,
        probs: uniform_proportions(k),
    }
}

fn uniform_proportions(k: usize) -> Vec<f64> {
    vec![1.0 / k as f64; k]
}
