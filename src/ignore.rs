use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Substrings marking files exempt from coverage enforcement
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct IgnoreList(Vec<String>);

impl IgnoreList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(patterns.into_iter().map(Into::into).collect())
    }

    /// Load a JSON array of substrings
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ignore list: {}", path.display()))?;

        let list: IgnoreList = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as a JSON array of strings", path.display()))?;

        list.validate()?;

        Ok(list)
    }

    fn validate(&self) -> Result<()> {
        // "" is contained in every path
        if let Some(idx) = self.0.iter().position(|p| p.is_empty()) {
            anyhow::bail!(
                "Ignore list entry #{} is empty; empty entries are not allowed because they would ignore every file",
                idx
            );
        }
        Ok(())
    }

    /// First configured substring contained in `file`
    pub fn first_match(&self, file: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|pattern| file.contains(pattern.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_match_wins() {
        let list = IgnoreList::new(["vendor/", "lib", "generated"]);
        assert_eq!(list.first_match("vendor/lib.js"), Some("vendor/"));
        assert_eq!(list.first_match("src/lib.js"), Some("lib"));
        assert_eq!(list.first_match("src/main.js"), None);
    }

    #[test]
    fn test_load_ignore_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coverage.ignore.json");
        fs::write(&path, r#"["vendor/", "src/generated"]"#).unwrap();

        let list = IgnoreList::load(&path).unwrap();
        assert_eq!(list, IgnoreList::new(["vendor/", "src/generated"]));
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_reject_non_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coverage.ignore.json");
        fs::write(&path, r#"{"ignore": ["vendor/"]}"#).unwrap();

        assert!(IgnoreList::load(&path).is_err());
    }

    #[test]
    fn test_reject_empty_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coverage.ignore.json");
        fs::write(&path, r#"["vendor/", ""]"#).unwrap();

        let err = IgnoreList::load(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ignore list entry #1 is empty; empty entries are not allowed because they would ignore every file"
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(IgnoreList::load(&dir.path().join("missing.json")).is_err());
    }
}
