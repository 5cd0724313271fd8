//! E-step and M-step machinery shared by the Gaussian and exponential solvers.
//!
//! The likelihood matrix is component-major: row `j` holds the `n`
//! responsibilities of component `j`, so per-component reductions run over
//! contiguous memory and go through the lane-chunked kernels.

use unmix_common::{Error, Result};
use unmix_math::{mul, sum, weighted_squared_deviation_sum};

/// Floor applied to a weighted likelihood that evaluates to exactly zero.
pub const LIKELIHOOD_FLOOR: f64 = 1e-6;

/// Per-solve scratch space. Allocated once, reused by every pass.
pub(crate) struct Workspace {
    n: usize,
    resp: Vec<f64>,
    row_totals: Vec<f64>,
    scratch: Vec<f64>,
}

impl Workspace {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            resp: vec![0.0; n * k],
            row_totals: vec![0.0; n],
            scratch: vec![0.0; n],
        }
    }

    fn column(&self, j: usize) -> &[f64] {
        &self.resp[j * self.n..(j + 1) * self.n]
    }

    /// Fill the likelihood matrix with normalized responsibilities.
    ///
    /// `density(j, x)` evaluates component `j` at `x`. Returns the number of
    /// cells raised to [`LIKELIHOOD_FLOOR`].
    pub(crate) fn expectation<F>(&mut self, values: &[f64], probs: &[f64], density: F) -> usize
    where
        F: Fn(usize, f64) -> f64,
    {
        let n = self.n;
        let mut floored = 0;
        self.row_totals.fill(0.0);

        for (j, col) in self.resp.chunks_exact_mut(n).enumerate() {
            let weight = probs[j];
            for ((cell, total), &x) in col.iter_mut().zip(self.row_totals.iter_mut()).zip(values) {
                let mut lh = density(j, x) * weight;
                if lh == 0.0 {
                    lh = LIKELIHOOD_FLOOR;
                    floored += 1;
                }
                *cell = lh;
                *total += lh;
            }
        }

        for col in self.resp.chunks_exact_mut(n) {
            for (cell, total) in col.iter_mut().zip(&self.row_totals) {
                *cell /= *total;
            }
        }

        floored
    }

    /// Responsibility mass of component `j`, rejecting an empty component.
    pub(crate) fn column_mass(&self, j: usize, iteration: usize) -> Result<f64> {
        let mass = sum(self.column(j));
        if !(mass.is_finite() && mass > 0.0) {
            return Err(Error::ZeroResponsibility {
                component: j,
                iteration,
            });
        }
        Ok(mass)
    }

    /// `Σ r·x / Σ r` for component `j`.
    pub(crate) fn weighted_mean(&mut self, j: usize, values: &[f64], mass: f64) -> f64 {
        let n = self.n;
        mul(&self.resp[j * n..(j + 1) * n], values, &mut self.scratch);
        sum(&self.scratch) / mass
    }

    /// `Σ r·(x - center)² / Σ r` for component `j`.
    pub(crate) fn weighted_variance(
        &self,
        j: usize,
        values: &[f64],
        center: f64,
        mass: f64,
    ) -> f64 {
        weighted_squared_deviation_sum(self.column(j), values, center) / mass
    }

    /// Number of observations.
    pub(crate) fn len(&self) -> usize {
        self.n
    }

    #[cfg(test)]
    pub(crate) fn responsibility(&self, j: usize, i: usize) -> f64 {
        self.resp[j * self.n + i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responsibilities_normalize_per_observation() {
        let values = [0.0, 1.0, 5.0];
        let mut ws = Workspace::new(3, 2);
        let floored = ws.expectation(&values, &[0.5, 0.5], |j, x| {
            if j == 0 {
                (-x).exp()
            } else {
                1.0
            }
        });
        assert_eq!(floored, 0);
        for i in 0..3 {
            let total = ws.responsibility(0, i) + ws.responsibility(1, i);
            assert!((total - 1.0).abs() < 1e-12);
        }
        assert!(ws.responsibility(0, 0) > ws.responsibility(0, 2));
    }

    #[test]
    fn zero_likelihood_is_floored() {
        let mut ws = Workspace::new(2, 2);
        let floored = ws.expectation(&[1.0, 2.0], &[0.5, 0.5], |_, _| 0.0);
        assert_eq!(floored, 4);
        assert!((ws.responsibility(0, 0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn weighted_moments() {
        let values = [1.0, 3.0];
        let mut ws = Workspace::new(2, 1);
        ws.expectation(&values, &[1.0], |_, _| 1.0);
        let mass = ws.column_mass(0, 1).unwrap();
        assert_eq!(mass, 2.0);
        let mean = ws.weighted_mean(0, &values, mass);
        assert_eq!(mean, 2.0);
        assert_eq!(ws.weighted_variance(0, &values, mean, mass), 1.0);
    }
}
