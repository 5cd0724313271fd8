//! Result records returned by the EM solvers.
//!
//! A record owns every array it reports. Dropping it frees them; `release()`
//! does the same eagerly for callers (FFI shims, long-lived containers) that
//! keep the record itself around. Release is idempotent.

use serde::{Deserialize, Serialize};

/// How a solve ended.
///
/// Reaching the iteration cap is not an error: the estimates are usable but
/// provisional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    Converged,
    MaxIterationsReached,
}

impl ConvergenceStatus {
    pub fn is_converged(self) -> bool {
        matches!(self, ConvergenceStatus::Converged)
    }
}

impl std::fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvergenceStatus::Converged => write!(f, "converged"),
            ConvergenceStatus::MaxIterationsReached => write!(f, "max_iterations_reached"),
        }
    }
}

/// One multinomial pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultinomialIteration {
    /// 1-based pass number.
    pub iteration: usize,
    /// RMS change of the abundance vector during this pass.
    pub rms_error: f64,
}

/// One mixture pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixtureIteration {
    /// Value of the iteration counter when the pass ran (starts at 1).
    pub iteration: usize,
    pub proportion_error: f64,
    pub mean_error: f64,
    /// Absent for exponential mixtures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_error: Option<f64>,
    /// Likelihood cells raised to the floor during the E-step.
    pub floored_cells: usize,
}

/// Category abundances recovered from compatibility counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialResult {
    /// One abundance per category, summing to ~1.
    pub values: Vec<f64>,
    /// Number of EM passes performed.
    pub iterations_taken: usize,
    pub status: ConvergenceStatus,
    pub history: Vec<MultinomialIteration>,
    pub elapsed_micros: u64,
}

impl MultinomialResult {
    /// Number of categories.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn release(&mut self) {
        self.values = Vec::new();
        self.history = Vec::new();
    }

    pub fn is_released(&self) -> bool {
        self.values.is_empty()
    }
}

/// Gaussian mixture estimates.
///
/// `iterations_taken` is the loop counter on exit: it starts at 1 and is
/// incremented after every pass, so a run that converges on its first pass
/// reports 2 and a run that exhausts `max_iterations` reports
/// `max_iterations + 1`. Use `status` to tell the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianResult {
    pub num_gaussians: usize,
    pub iterations_taken: usize,
    pub status: ConvergenceStatus,
    pub means_init: Vec<f64>,
    pub vars_init: Vec<f64>,
    pub probs_init: Vec<f64>,
    pub means_final: Vec<f64>,
    pub vars_final: Vec<f64>,
    pub probs_final: Vec<f64>,
    pub history: Vec<MixtureIteration>,
    pub elapsed_micros: u64,
}

impl GaussianResult {
    pub fn release(&mut self) {
        self.num_gaussians = 0;
        self.means_init = Vec::new();
        self.vars_init = Vec::new();
        self.probs_init = Vec::new();
        self.means_final = Vec::new();
        self.vars_final = Vec::new();
        self.probs_final = Vec::new();
        self.history = Vec::new();
    }

    pub fn is_released(&self) -> bool {
        self.num_gaussians == 0
    }
}

/// Exponential mixture estimates. Means are distribution means, not rates.
///
/// `iterations_taken` follows the same counter convention as
/// [`GaussianResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentialResult {
    pub num_exponentials: usize,
    pub iterations_taken: usize,
    pub status: ConvergenceStatus,
    pub means_init: Vec<f64>,
    pub probs_init: Vec<f64>,
    pub means_final: Vec<f64>,
    pub probs_final: Vec<f64>,
    pub history: Vec<MixtureIteration>,
    pub elapsed_micros: u64,
}

impl ExponentialResult {
    pub fn release(&mut self) {
        self.num_exponentials = 0;
        self.means_init = Vec::new();
        self.probs_init = Vec::new();
        self.means_final = Vec::new();
        self.probs_final = Vec::new();
        self.history = Vec::new();
    }

    pub fn is_released(&self) -> bool {
        self.num_exponentials == 0
    }
}
