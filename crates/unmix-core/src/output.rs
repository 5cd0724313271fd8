//! Result rendering.
//!
//! Text output prints one estimate per line with six decimal places for
//! multinomial runs, and a per-component table for mixtures. JSON output is
//! the full result record.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use unmix_common::{OutputFormat, Result};

use crate::em::{ExponentialResult, GaussianResult, MultinomialResult};
use crate::logging::event_names;

/// A result that can be rendered in every [`OutputFormat`].
pub trait Render: Serialize {
    fn render_text(&self) -> String;

    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => {
                let mut s = serde_json::to_string_pretty(self)?;
                s.push('\n');
                Ok(s)
            }
        }
    }
}

impl Render for MultinomialResult {
    fn render_text(&self) -> String {
        let mut out = String::with_capacity(self.values.len() * 10);
        for v in &self.values {
            let _ = writeln!(out, "{v:.6}");
        }
        out
    }
}

impl Render for GaussianResult {
    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "component\tmean\tvariance\tproportion");
        for j in 0..self.num_gaussians {
            let _ = writeln!(
                out,
                "{j}\t{:.6}\t{:.6}\t{:.6}",
                self.means_final[j], self.vars_final[j], self.probs_final[j]
            );
        }
        out
    }
}

impl Render for ExponentialResult {
    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "component\tmean\tproportion");
        for j in 0..self.num_exponentials {
            let _ = writeln!(
                out,
                "{j}\t{:.6}\t{:.6}",
                self.means_final[j], self.probs_final[j]
            );
        }
        out
    }
}

/// Write `result` to `path`, or to stdout when `path` is `None`.
pub fn write_result<T: Render>(
    result: &T,
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<()> {
    let rendered = result.render(format)?;
    match path {
        Some(path) => {
            fs::write(path, rendered.as_bytes())?;
            tracing::info!(
                event = event_names::OUTPUT_WRITTEN,
                path = %path.display(),
                format = %format,
                "results written"
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(rendered.as_bytes())?;
            lock.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::em::ConvergenceStatus;

    fn multinomial() -> MultinomialResult {
        MultinomialResult {
            values: vec![0.5, 0.25, 0.25],
            iterations_taken: 4,
            status: ConvergenceStatus::Converged,
            history: Vec::new(),
            elapsed_micros: 12,
        }
    }

    #[test]
    fn multinomial_text_six_decimals() {
        assert_eq!(
            multinomial().render(OutputFormat::Text).unwrap(),
            "0.500000\n0.250000\n0.250000\n"
        );
    }

    #[test]
    fn multinomial_json_has_record_fields() {
        let json = multinomial().render(OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["iterations_taken"], 4);
        assert_eq!(v["status"], "converged");
        assert_eq!(v["values"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn exponential_table() {
        let r = ExponentialResult {
            num_exponentials: 2,
            iterations_taken: 9,
            status: ConvergenceStatus::MaxIterationsReached,
            means_init: vec![1.0, 2.0],
            probs_init: vec![0.5, 0.5],
            means_final: vec![1.25, 7.5],
            probs_final: vec![0.75, 0.25],
            history: Vec::new(),
            elapsed_micros: 0,
        };
        let text = r.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "component\tmean\tproportion");
        assert_eq!(lines[1], "0\t1.250000\t0.750000");
        assert_eq!(lines[2], "1\t7.500000\t0.250000");
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_result(&multinomial(), OutputFormat::Text, Some(&path)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0.500000\n0.250000\n0.250000\n"
        );
    }
}
