//! Multinomial de-coarsening.
//!
//! Each observed pattern says which categories a read is compatible with,
//! not which one produced it. EM shares every pattern's count among its
//! compatible categories in proportion to the current abundances, then
//! re-estimates abundances as expected counts over the total.

use std::time::Instant;

use unmix_common::{EmConfig, Error, ProblemKind, Result};
use unmix_math::{div_scalar, rms_error, sum_counts};

use super::result::{ConvergenceStatus, MultinomialIteration, MultinomialResult};
use super::{effective_config, elapsed_micros, trace};

/// Validated compatibility patterns and their counts.
///
/// Stored sparsely: for every pattern row only the indices of compatible
/// categories are kept, so the E-step never scans incompatible cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityCounts {
    num_categories: usize,
    offsets: Vec<usize>,
    indices: Vec<usize>,
    counts: Vec<u64>,
    total: u64,
}

impl CompatibilityCounts {
    /// Build from `'0'`/`'1'` pattern strings, one per count.
    ///
    /// The first pattern fixes the number of categories; every other row
    /// must match it. Row indices in errors are 0-based.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S], counts: &[u64]) -> Result<Self> {
        let first = patterns.first().ok_or(Error::EmptyInput {
            what: "compatibility patterns",
        })?;
        if patterns.len() != counts.len() {
            return Err(Error::LengthMismatch {
                patterns: patterns.len(),
                counts: counts.len(),
            });
        }
        let num_categories = first.as_ref().len();
        let mut builder = Builder::new(num_categories, patterns.len())?;
        for (row, pattern) in patterns.iter().enumerate() {
            builder.push_row(row, pattern.as_ref().as_bytes())?;
        }
        builder.finish(counts)
    }

    /// Build from a row-major `num_patterns × num_categories` byte matrix.
    pub fn from_raw(
        matrix: &[u8],
        num_patterns: usize,
        num_categories: usize,
        counts: &[u64],
    ) -> Result<Self> {
        if num_patterns == 0 || matrix.is_empty() {
            return Err(Error::EmptyInput {
                what: "compatibility patterns",
            });
        }
        if num_patterns != counts.len() {
            return Err(Error::LengthMismatch {
                patterns: num_patterns,
                counts: counts.len(),
            });
        }
        let expected = num_patterns.checked_mul(num_categories);
        if expected != Some(matrix.len()) {
            return Err(Error::MalformedPattern {
                row: 0,
                reason: format!(
                    "matrix holds {} cells, expected {num_patterns} x {num_categories}",
                    matrix.len()
                ),
            });
        }
        let mut builder = Builder::new(num_categories, num_patterns)?;
        for (row, cells) in matrix.chunks_exact(num_categories).enumerate() {
            builder.push_row(row, cells)?;
        }
        builder.finish(counts)
    }

    pub fn num_categories(&self) -> usize {
        self.num_categories
    }

    pub fn num_patterns(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Categories compatible with pattern `row`.
    pub fn compatible(&self, row: usize) -> &[usize] {
        &self.indices[self.offsets[row]..self.offsets[row + 1]]
    }

    pub fn count(&self, row: usize) -> u64 {
        self.counts[row]
    }
}

struct Builder {
    num_categories: usize,
    offsets: Vec<usize>,
    indices: Vec<usize>,
}

impl Builder {
    fn new(num_categories: usize, rows: usize) -> Result<Self> {
        if num_categories == 0 {
            return Err(Error::MalformedPattern {
                row: 0,
                reason: "pattern has no categories".to_string(),
            });
        }
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);
        Ok(Self {
            num_categories,
            offsets,
            indices: Vec::new(),
        })
    }

    fn push_row(&mut self, row: usize, cells: &[u8]) -> Result<()> {
        if cells.len() != self.num_categories {
            return Err(Error::MalformedPattern {
                row,
                reason: format!(
                    "expected {} categories, found {}",
                    self.num_categories,
                    cells.len()
                ),
            });
        }
        let start = self.indices.len();
        for (j, &cell) in cells.iter().enumerate() {
            match cell {
                b'1' => self.indices.push(j),
                b'0' => {}
                other => {
                    return Err(Error::MalformedPattern {
                        row,
                        reason: format!(
                            "invalid flag {:?} at position {j}; expected '0' or '1'",
                            char::from(other)
                        ),
                    })
                }
            }
        }
        if self.indices.len() == start {
            return Err(Error::EmptyPattern { row });
        }
        self.offsets.push(self.indices.len());
        Ok(())
    }

    fn finish(self, counts: &[u64]) -> Result<CompatibilityCounts> {
        let total = sum_counts(counts).ok_or(Error::CountOverflow)?;
        if total == 0 {
            return Err(Error::ZeroTotalCount);
        }
        Ok(CompatibilityCounts {
            num_categories: self.num_categories,
            offsets: self.offsets,
            indices: self.indices,
            counts: counts.to_vec(),
            total,
        })
    }
}

/// Estimate category abundances from compatibility counts.
///
/// Starts from uniform abundances and iterates until the RMS change of the
/// abundance vector is at most `relative_tolerance` or `max_iterations`
/// passes have run. `iterations_taken` is the number of passes.
///
/// # Errors
///
/// `InvalidConfig` for an unusable tolerance. `ZeroRowMass` if a pattern
/// with a positive count loses all compatible abundance.
pub fn solve_multinomial(
    data: &CompatibilityCounts,
    config: Option<&EmConfig>,
) -> Result<MultinomialResult> {
    let cfg = effective_config(config, ProblemKind::Multinomial)?;
    let start = Instant::now();
    let n = data.num_categories();
    trace::started(ProblemKind::Multinomial, data.num_patterns(), n, &cfg);

    let total = data.total_count() as f64;
    let mut current = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];
    let mut expected = vec![0.0; n];
    let mut history = Vec::new();
    let mut status = ConvergenceStatus::MaxIterationsReached;
    let mut passes = 0;

    while passes < cfg.max_iterations {
        let iteration = passes + 1;

        expected.fill(0.0);
        for row in 0..data.num_patterns() {
            let count = data.count(row);
            if count == 0 {
                continue;
            }
            let compatible = data.compatible(row);
            let row_total: f64 = compatible.iter().map(|&j| current[j]).sum();
            if !(row_total.is_finite() && row_total > 0.0) {
                return Err(Error::ZeroRowMass { row, iteration });
            }
            let share = count as f64 / row_total;
            for &j in compatible {
                expected[j] += current[j] * share;
            }
        }

        div_scalar(&expected, total, &mut next);
        let step = MultinomialIteration {
            iteration,
            rms_error: rms_error(&next, &current),
        };
        std::mem::swap(&mut current, &mut next);
        passes = iteration;
        trace::multinomial_pass(&cfg, &step);
        history.push(step);

        if step.rms_error <= cfg.relative_tolerance {
            status = ConvergenceStatus::Converged;
            break;
        }
    }

    let elapsed_micros = elapsed_micros(start);
    trace::finished(
        &cfg,
        ProblemKind::Multinomial,
        passes,
        status,
        elapsed_micros,
    );

    Ok(MultinomialResult {
        values: current,
        iterations_taken: passes,
        status,
        history,
        elapsed_micros,
    })
}
