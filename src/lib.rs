//! Covgate - full coverage gate for CI pipelines
//!
//! Reads an LCOV report and fails unless every checked file has:
//! - 100% branch coverage
//! - 100% function coverage
//! - 100% line coverage
//!
//! Files under the skip prefixes (build scripts, tests) are never checked,
//! and files matching an entry of the ignore list are reported and skipped.

pub mod config;
pub mod coverage;
pub mod ignore;

pub use config::Config;
pub use coverage::{
    enforce, parse_lcov, parse_lcov_string, Category, CoveragePolicy, CoverageReport, Diagnostic,
    FileRecord, GateSummary, LcovError, ThresholdViolation,
};
pub use ignore::IgnoreList;
