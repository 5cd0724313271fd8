//! Parsers for solver input files.
//!
//! # Formats
//! - Compatibility counts: one `pattern,count` row per line, pattern of
//!   `0`/`1` flags, non-negative integer count
//! - Observations: one real number per line
//!
//! Blank lines are skipped and surrounding whitespace is trimmed. Errors
//! carry the 1-based line number of the offending row.

use std::fs;
use std::path::Path;

use unmix_common::{Error, Result};

use crate::em::CompatibilityCounts;
use crate::logging::event_names;

/// Parse a compatibility-count CSV file.
pub fn parse_compat_counts(path: &Path) -> Result<CompatibilityCounts> {
    let content = fs::read_to_string(path)?;
    let data = parse_compat_counts_content(&content)?;
    tracing::debug!(
        event = event_names::INPUT_PARSED,
        path = %path.display(),
        patterns = data.num_patterns(),
        categories = data.num_categories(),
        total_count = data.total_count(),
        "parsed compatibility counts"
    );
    Ok(data)
}

/// Parse compatibility-count content (for testing).
pub fn parse_compat_counts_content(content: &str) -> Result<CompatibilityCounts> {
    let mut patterns = Vec::new();
    let mut counts = Vec::new();
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (pattern, count) = line.split_once(',').ok_or_else(|| Error::Parse {
            line: line_no,
            message: "expected 'pattern,count'".to_string(),
        })?;
        let count = count.trim().parse::<u64>().map_err(|e| Error::Parse {
            line: line_no,
            message: format!("invalid count {:?}: {e}", count.trim()),
        })?;
        patterns.push(pattern.trim());
        counts.push(count);
        lines.push(line_no);
    }

    CompatibilityCounts::from_patterns(&patterns, &counts).map_err(|err| match err {
        Error::MalformedPattern { row, .. } | Error::EmptyPattern { row } => Error::Parse {
            line: lines.get(row).copied().unwrap_or(0),
            message: err.to_string(),
        },
        other => other,
    })
}

/// Parse an observation file.
pub fn parse_values(path: &Path) -> Result<Vec<f64>> {
    let content = fs::read_to_string(path)?;
    let values = parse_values_content(&content)?;
    tracing::debug!(
        event = event_names::INPUT_PARSED,
        path = %path.display(),
        observations = values.len(),
        "parsed observations"
    );
    Ok(values)
}

/// Parse observation content (for testing).
pub fn parse_values_content(content: &str) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let value = line.parse::<f64>().map_err(|e| Error::Parse {
            line: idx + 1,
            message: format!("invalid number {line:?}: {e}"),
        })?;
        if !value.is_finite() {
            return Err(Error::Parse {
                line: idx + 1,
                message: format!("non-finite value {line:?}"),
            });
        }
        values.push(value);
    }
    Ok(values)
}
