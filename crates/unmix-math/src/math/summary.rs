//! Summary statistics of an observation vector.

use serde::{Deserialize, Serialize};

use super::vect::sum;

/// Min, max, mean and population variance of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Number of observations.
    pub len: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population variance (divides by `len`, not `len - 1`).
    pub variance: f64,
}

impl SampleSummary {
    /// Summarise `values`.
    ///
    /// Returns None for an empty slice. NaN entries propagate into `mean`
    /// and `variance`; callers validate finiteness first.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;
        let (mut min, mut max) = (first, first);
        for &v in rest {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        let n = values.len() as f64;
        let mean = sum(values) / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Some(Self {
            len: values.len(),
            min,
            max,
            mean,
            variance,
        })
    }

    /// Width of the observed range.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
