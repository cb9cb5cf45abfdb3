//! Reporter options
//!
//! Parses `tinted.toml` into the options bag handed to the reporters.
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "tinted.toml";

/// Options shared by the reporters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Name of the test framework shown in the banner
    #[serde(default = "default_framework")]
    pub framework: String,
    /// Version of the test framework shown in the banner
    #[serde(default = "default_framework_version")]
    pub framework_version: String,
    /// Program that re-runs a single test file (e.g. `ruby`, `bundle exec ruby`)
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

fn default_framework() -> String {
    "Minitest".to_string()
}

fn default_framework_version() -> String {
    "unknown".to_string()
}

fn default_command_prefix() -> String {
    "ruby".to_string()
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            framework: default_framework(),
            framework_version: default_framework_version(),
            command_prefix: default_command_prefix(),
        }
    }
}

impl ReporterOptions {
    /// Parse an options file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse options from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content).context("Failed to parse tinted.toml")?;
        options.validate()?;
        Ok(options)
    }

    /// Load options for a run.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
    /// `dir` is used if present, and the defaults otherwise.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        let fallback = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Self::from_path(&fallback)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.framework.trim().is_empty() {
            bail!("'framework' cannot be empty");
        }
        if self.command_prefix.trim().is_empty() {
            bail!("'command_prefix' cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let options = ReporterOptions::parse("").unwrap();
        assert_eq!(options, ReporterOptions::default());
        assert_eq!(options.framework, "Minitest");
        assert_eq!(options.framework_version, "unknown");
        assert_eq!(options.command_prefix, "ruby");
    }

    #[test]
    fn test_parse_overrides() {
        let options = ReporterOptions::parse(
            r#"
framework = "Minitest"
framework_version = "5.25.1"
command_prefix = "bundle exec ruby -Itest"
"#,
        )
        .unwrap();
        assert_eq!(options.framework_version, "5.25.1");
        assert_eq!(options.command_prefix, "bundle exec ruby -Itest");
    }

    #[test]
    fn test_parse_rejects_empty_command_prefix() {
        let err = ReporterOptions::parse(r#"command_prefix = "  ""#).unwrap_err();
        assert!(err.to_string().contains("command_prefix"));
    }

    #[test]
    fn test_parse_rejects_empty_framework() {
        assert!(ReporterOptions::parse(r#"framework = """#).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_toml() {
        assert!(ReporterOptions::parse("framework = ").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(ReporterOptions::load(Some(&missing), tmp.path()).is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let options = ReporterOptions::load(None, tmp.path()).unwrap();
        assert_eq!(options, ReporterOptions::default());
    }

    #[test]
    fn test_load_picks_up_default_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "command_prefix = \"jruby\"\n",
        )
        .unwrap();
        let options = ReporterOptions::load(None, tmp.path()).unwrap();
        assert_eq!(options.command_prefix, "jruby");
        assert_eq!(options.framework, "Minitest");
    }

    #[test]
    fn test_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(&path, "framework_version = \"5.1.0\"\n").unwrap();
        let options = ReporterOptions::load(Some(&path), Path::new("/nonexistent")).unwrap();
        assert_eq!(options.framework_version, "5.1.0");
    }
}
