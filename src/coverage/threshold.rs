//! Full-coverage threshold enforcement

use serde_json::Value;
use thiserror::Error;

use super::{Category, CategoryStat, CoverageReport, Detail};
use crate::ignore::IgnoreList;

/// Build and utility scripts, then test sources
pub const DEFAULT_SKIP_PREFIXES: [&str; 2] = ["script", "test"];

/// First file/category found below full coverage
#[derive(Debug, Clone, Error)]
#[error("{category} coverage for {file} is at {percentage}% \n Missed hits:\n {missed}")]
pub struct ThresholdViolation {
    pub file: String,
    pub category: Category,
    pub hit: u64,
    pub found: u64,
    pub percentage: f64,
    /// JSON array of the unexercised detail entries
    pub missed: Value,
}

/// Which files get checked
#[derive(Debug, Clone)]
pub struct CoveragePolicy {
    pub skip_prefixes: Vec<String>,
    pub ignore: IgnoreList,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect(),
            ignore: IgnoreList::default(),
        }
    }
}

impl CoveragePolicy {
    pub fn new(skip_prefixes: Vec<String>, ignore: IgnoreList) -> Self {
        Self {
            skip_prefixes,
            ignore,
        }
    }

    fn is_skipped(&self, file: &str) -> bool {
        self.skip_prefixes.iter().any(|p| file.starts_with(p.as_str()))
    }
}

/// Progress event emitted while walking the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    Analyzing { file: &'a str },
    Ignoring { file: &'a str, pattern: &'a str },
}

impl std::fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Analyzing { file } => write!(f, "Analyzing coverage for {}", file),
            Diagnostic::Ignoring { file, .. } => write!(f, "Ignoring coverage for {}", file),
        }
    }
}

/// File counts of a passing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateSummary {
    pub checked: usize,
    pub ignored: usize,
    pub skipped: usize,
}

/// Walk the report in order and stop at the first category below 100%.
///
/// Files starting with a skip prefix are passed over silently. Every other
/// file is announced through `on_diagnostic`, then either ignored (first
/// matching ignore entry wins) or checked Branch, Function, Line.
pub fn enforce<'a, F>(
    report: &'a CoverageReport,
    policy: &'a CoveragePolicy,
    mut on_diagnostic: F,
) -> Result<GateSummary, ThresholdViolation>
where
    F: FnMut(&Diagnostic<'a>),
{
    let mut summary = GateSummary::default();

    for record in &report.files {
        let file = record.path.as_str();

        if policy.is_skipped(file) {
            summary.skipped += 1;
            continue;
        }

        on_diagnostic(&Diagnostic::Analyzing { file });

        if let Some(pattern) = policy.ignore.first_match(file) {
            on_diagnostic(&Diagnostic::Ignoring { file, pattern });
            summary.ignored += 1;
            continue;
        }

        check_category(file, Category::Branch, &record.branches)?;
        check_category(file, Category::Function, &record.functions)?;
        check_category(file, Category::Line, &record.lines)?;

        summary.checked += 1;
    }

    Ok(summary)
}

/// A category with `found == 0` counts as covered. The `hit < found` guard
/// also keeps `found` non-zero in the percentage below.
fn check_category<D: Detail>(
    file: &str,
    category: Category,
    stat: &CategoryStat<D>,
) -> Result<(), ThresholdViolation> {
    if stat.is_complete() {
        return Ok(());
    }

    let percentage = (100.0 * stat.hit as f64) / stat.found as f64;
    let missed = Value::Array(
        stat.missed()
            .filter_map(|detail| serde_json::to_value(detail).ok())
            .collect(),
    );

    Err(ThresholdViolation {
        file: file.to_string(),
        category,
        hit: stat.hit,
        found: stat.found,
        percentage,
        missed,
    })
}
