//! Coverage module
//!
//! Provides:
//! - LCOV parsing
//! - Full-coverage threshold enforcement

mod lcov;
mod threshold;

pub use lcov::*;
pub use threshold::*;

use serde::Serialize;
use std::fmt;

/// Parsed coverage report, one record per `SF:` section, in report order
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub files: Vec<FileRecord>,
}

/// Coverage data for a single source file
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    pub path: String,
    pub branches: CategoryStat<BranchDetail>,
    pub functions: CategoryStat<FunctionDetail>,
    pub lines: CategoryStat<LineDetail>,
}

/// Hit/found counters of one category plus its per-location details
#[derive(Debug, Clone)]
pub struct CategoryStat<D> {
    pub hit: u64,
    pub found: u64,
    pub details: Vec<D>,
}

impl<D> Default for CategoryStat<D> {
    fn default() -> Self {
        Self {
            hit: 0,
            found: 0,
            details: Vec::new(),
        }
    }
}

impl<D: Detail> CategoryStat<D> {
    pub fn is_complete(&self) -> bool {
        self.hit >= self.found
    }

    /// Details whose location was never exercised
    pub fn missed(&self) -> impl Iterator<Item = &D> {
        self.details.iter().filter(|d| d.is_missed())
    }
}

/// A single instrumented location
pub trait Detail: Serialize {
    fn is_missed(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    pub line: u64,
    pub hit: u64,
}

impl Detail for LineDetail {
    fn is_missed(&self) -> bool {
        self.hit == 0
    }
}

/// `hit` stays `None` until an `FNDA` record names the function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDetail {
    pub name: String,
    pub line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<u64>,
}

impl Detail for FunctionDetail {
    fn is_missed(&self) -> bool {
        self.hit == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDetail {
    pub line: u64,
    pub block: BranchId,
    pub branch: BranchId,
    pub taken: u64,
}

/// Block or branch identifier of a `BRDA` record.
///
/// Usually numeric; lcov 2.x also writes exception blocks (`e0`) and
/// branch expressions (`jump to line 5`), which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BranchId {
    Index(u64),
    Name(String),
}

impl From<&str> for BranchId {
    fn from(field: &str) -> Self {
        match field.parse() {
            Ok(index) => BranchId::Index(index),
            Err(_) => BranchId::Name(field.to_string()),
        }
    }
}

impl Detail for BranchDetail {
    fn is_missed(&self) -> bool {
        self.taken == 0
    }
}

/// Coverage category, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Branch,
    Function,
    Line,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Branch => "Branch",
            Category::Function => "Function",
            Category::Line => "Line",
        };
        f.write_str(name)
    }
}
