//! LCOV format parser

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{BranchDetail, BranchId, CoverageReport, FileRecord, FunctionDetail, LineDetail};

#[derive(Debug, Error)]
pub enum LcovError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {tag} record on line {line_no}: '{text}'")]
    Malformed {
        tag: String,
        line_no: usize,
        text: String,
    },

    #[error("No coverage records found")]
    Empty,
}

/// Parse an LCOV file
pub fn parse_lcov(path: &Path) -> Result<CoverageReport, LcovError> {
    let content = fs::read_to_string(path).map_err(|source| LcovError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_lcov_string(&content)
}

/// Parse LCOV content from a string
pub fn parse_lcov_string(content: &str) -> Result<CoverageReport, LcovError> {
    let mut report = CoverageReport::default();
    let mut current: Option<FileRecord> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        let line_no = idx + 1;

        if line == "end_of_record" {
            if let Some(record) = current.take() {
                report.files.push(record);
            }
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };
        let malformed = || LcovError::Malformed {
            tag: tag.to_string(),
            line_no,
            text: line.to_string(),
        };

        if tag == "SF" {
            // An unterminated section is closed by the next one
            if let Some(record) = current.take() {
                report.files.push(record);
            }
            current = Some(FileRecord {
                path: value.to_string(),
                ..Default::default()
            });
            continue;
        }

        // Data outside of an SF section has no file to belong to
        let Some(record) = current.as_mut() else {
            continue;
        };

        match tag {
            "FN" => {
                let (start, rest) = value.split_once(',').ok_or_else(malformed)?;
                // Newer lcov writes FN:<start>,<end>,<name>
                let name = match rest.split_once(',') {
                    Some((end, name)) if end.parse::<u64>().is_ok() => name,
                    _ => rest,
                };
                record.functions.details.push(FunctionDetail {
                    name: name.to_string(),
                    line: number(start).ok_or_else(malformed)?,
                    hit: None,
                });
            }
            "FNDA" => {
                let (hits, name) = value.split_once(',').ok_or_else(malformed)?;
                let hits = number(hits).ok_or_else(malformed)?;
                if let Some(function) = record
                    .functions
                    .details
                    .iter_mut()
                    .find(|f| f.name == name && f.hit.is_none())
                {
                    function.hit = Some(hits);
                }
            }
            "FNF" => record.functions.found = number(value).ok_or_else(malformed)?,
            "FNH" => record.functions.hit = number(value).ok_or_else(malformed)?,
            "DA" => {
                let mut fields = value.split(',');
                let (Some(line), Some(hit)) = (fields.next(), fields.next()) else {
                    return Err(malformed());
                };
                record.lines.details.push(LineDetail {
                    line: number(line).ok_or_else(malformed)?,
                    hit: number(hit).ok_or_else(malformed)?,
                });
            }
            "LF" => record.lines.found = number(value).ok_or_else(malformed)?,
            "LH" => record.lines.hit = number(value).ok_or_else(malformed)?,
            "BRDA" => {
                // BRDA:<line>,<block>,<branch>,<taken>; a named branch may contain commas
                let (line, rest) = value.split_once(',').ok_or_else(malformed)?;
                let (ids, taken) = rest.rsplit_once(',').ok_or_else(malformed)?;
                let (block, branch) = ids.split_once(',').ok_or_else(malformed)?;
                record.branches.details.push(BranchDetail {
                    line: number(line).ok_or_else(malformed)?,
                    block: BranchId::from(block),
                    branch: BranchId::from(branch),
                    taken: if taken == "-" {
                        0
                    } else {
                        number(taken).ok_or_else(malformed)?
                    },
                });
            }
            "BRF" => record.branches.found = number(value).ok_or_else(malformed)?,
            "BRH" => record.branches.hit = number(value).ok_or_else(malformed)?,
            _ => {}
        }
    }

    if let Some(record) = current.take() {
        report.files.push(record);
    }

    if report.files.is_empty() {
        return Err(LcovError::Empty);
    }

    Ok(report)
}

fn number(field: &str) -> Option<u64> {
    field.trim().parse().ok()
}
