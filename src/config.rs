use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coverage::DEFAULT_SKIP_PREFIXES;

pub const CONFIG_FILE: &str = "covgate.toml";
pub const DEFAULT_REPORT: &str = "lcov.info";
pub const DEFAULT_IGNORE_FILE: &str = "coverage.ignore.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// LCOV report to enforce
    #[serde(default = "default_report")]
    pub report: PathBuf,
    /// JSON array of path substrings exempt from the gate
    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,
    /// Path prefixes never checked nor announced
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

fn default_report() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT)
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(DEFAULT_IGNORE_FILE)
}

fn default_skip_prefixes() -> Vec<String> {
    DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: default_report(),
            ignore_file: default_ignore_file(),
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, else `covgate.toml` in the working directory
    /// when present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        Self::resolve_in(Path::new("."), path)
    }

    /// Like [`Config::resolve`], looking for `covgate.toml` in `dir`
    pub fn resolve_in(dir: &Path, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = dir.join(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Command-line values win over the config file
    pub fn with_overrides(mut self, report: Option<PathBuf>, ignore_file: Option<PathBuf>) -> Self {
        if let Some(report) = report {
            self.report = report;
        }
        if let Some(ignore_file) = ignore_file {
            self.ignore_file = ignore_file;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.skip_prefixes.iter().any(|p| p.is_empty()) {
            anyhow::bail!("skip_prefixes must not contain an empty prefix");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
report = "coverage/lcov.info"
ignore_file = "ci/coverage.ignore.json"
skip_prefixes = ["scripts/", "tests/", "bench/"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.report, PathBuf::from("coverage/lcov.info"));
        assert_eq!(config.ignore_file, PathBuf::from("ci/coverage.ignore.json"));
        assert_eq!(config.skip_prefixes.len(), 3);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.report, PathBuf::from("lcov.info"));
        assert_eq!(config.skip_prefixes, vec!["script", "test"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<Config>("threshold = 90").is_err());
    }

    #[test]
    fn test_load_rejects_empty_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "skip_prefixes = [\"\"]\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempdir().unwrap();

        let config = Config::resolve_in(dir.path(), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_no_flags_reads_lcov_info_and_ignore_json() {
        let dir = tempdir().unwrap();

        let config = Config::resolve_in(dir.path(), None)
            .unwrap()
            .with_overrides(None, None);
        assert_eq!(config.report, PathBuf::from("lcov.info"));
        assert_eq!(config.ignore_file, PathBuf::from("coverage.ignore.json"));
        assert_eq!(config.skip_prefixes, vec!["script", "test"]);
    }

    #[test]
    fn test_default_config_file_is_picked_up() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "report = \"coverage/lcov.info\"\n").unwrap();

        let config = Config::resolve_in(dir.path(), None).unwrap();
        assert_eq!(config.report, PathBuf::from("coverage/lcov.info"));
        assert_eq!(config.ignore_file, PathBuf::from(DEFAULT_IGNORE_FILE));
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ci.toml");
        fs::write(
            &path,
            "report = \"coverage/lcov.info\"\nignore_file = \"ci/ignore.json\"\n",
        )
        .unwrap();

        let config = Config::resolve_in(dir.path(), Some(&path))
            .unwrap()
            .with_overrides(Some(PathBuf::from("other/lcov.info")), None);
        assert_eq!(config.report, PathBuf::from("other/lcov.info"));
        assert_eq!(config.ignore_file, PathBuf::from("ci/ignore.json"));

        let config = config.with_overrides(None, Some(PathBuf::from("cli.json")));
        assert_eq!(config.ignore_file, PathBuf::from("cli.json"));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempdir().unwrap();
        assert!(Config::resolve(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
