// src/config/loader.rs
//! Harness settings loader
//!
//! Settings come from three layers, later ones winning: serde defaults, an
//! optional settings file (TOML or JSON, picked by extension) and `DSHAL_*`
//! environment variables. Explicit overrides, such as command line flags,
//! are applied last.

use crate::config::constants::{settings, ENV_PREFIX};
use crate::suite::Tier;
use ::config::{Config, ConfigError, Environment, File, Value};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backends the harness can drive.
pub const KNOWN_BACKENDS: &[&str] = &[settings::DEFAULT_BACKEND];

/// Runtime settings of one harness invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Platform profile to parse
    pub profile_path: PathBuf,
    /// Where to write the JSON run report, if anywhere
    pub report_path: Option<PathBuf>,
    pub tiers: Vec<Tier>,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
    pub backend: String,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from(settings::DEFAULT_PROFILE_PATH),
            report_path: None,
            tiers: vec![Tier::L1],
            log_filter: settings::DEFAULT_LOG_FILTER.to_string(),
            backend: settings::DEFAULT_BACKEND.to_string(),
        }
    }
}

impl HarnessSettings {
    /// Reject settings the harness cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::Message("at least one test tier must be selected".into()));
        }
        if !KNOWN_BACKENDS.contains(&self.backend.as_str()) {
            return Err(ConfigError::Message(format!(
                "unknown backend '{}', expected one of {:?}",
                self.backend, KNOWN_BACKENDS
            )));
        }
        if self.profile_path.as_os_str().is_empty() {
            return Err(ConfigError::Message("profile path is empty".into()));
        }
        Ok(())
    }
}

/// Builds [`HarnessSettings`] from file, environment and overrides.
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env_prefix: String,
    overrides: Vec<(String, Value)>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
            overrides: Vec::new(),
        }
    }

    /// Read settings from `path`; the file must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Force `key` to `value` regardless of file and environment.
    pub fn set_override<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Merge every layer and deserialize the result.
    pub fn load(&self) -> Result<HarnessSettings, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "reading harness settings file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tiers"),
        );

        for (key, value) in &self.overrides {
            builder = builder.set_override(key.as_str(), value.clone())?;
        }

        let settings: HarnessSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        debug!(
            profile = %settings.profile_path.display(),
            tiers = ?settings.tiers,
            backend = %settings.backend,
            "harness settings loaded"
        );
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::Builder;

    fn settings_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_DEFAULTS")
            .load()
            .unwrap();
        assert_eq!(settings, HarnessSettings::default());
        assert_eq!(settings.tiers, vec![Tier::L1]);
    }

    #[test]
    fn test_settings_file() {
        let file = settings_file(
            r#"
profile_path = "profiles/sink.toml"
report_path = "report.json"
tiers = ["l1", "l2"]
log_filter = "ds_hal_harness=debug"
"#,
        );

        let settings = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_FILE")
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(settings.profile_path, PathBuf::from("profiles/sink.toml"));
        assert_eq!(settings.report_path, Some(PathBuf::from("report.json")));
        assert_eq!(settings.tiers, vec![Tier::L1, Tier::L2]);
        assert_eq!(settings.log_filter, "ds_hal_harness=debug");
    }

    #[test]
    fn test_missing_file_fails() {
        let result = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_MISSING")
            .with_file("/nonexistent/harness.toml")
            .load();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        let file = settings_file("profile_path = \"from_file.toml\"");

        unsafe {
            std::env::set_var("DSHAL_TEST_ENV_PROFILE_PATH", "from_env.toml");
            std::env::set_var("DSHAL_TEST_ENV_TIERS", "l1,l3");
        }

        let settings = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_ENV")
            .with_file(file.path())
            .load();

        unsafe {
            std::env::remove_var("DSHAL_TEST_ENV_PROFILE_PATH");
            std::env::remove_var("DSHAL_TEST_ENV_TIERS");
        }

        let settings = settings.unwrap();
        assert_eq!(settings.profile_path, PathBuf::from("from_env.toml"));
        assert_eq!(settings.tiers, vec![Tier::L1, Tier::L3]);
    }

    #[test]
    fn test_override_wins() {
        let file = settings_file("profile_path = \"from_file.toml\"");
        let settings = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_OVERRIDE")
            .with_file(file.path())
            .set_override("profile_path", "from_flag.toml")
            .set_override("tiers", vec!["l2"])
            .load()
            .unwrap();
        assert_eq!(settings.profile_path, PathBuf::from("from_flag.toml"));
        assert_eq!(settings.tiers, vec![Tier::L2]);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let file = settings_file("backend = \"vendor-blob\"");
        let result = SettingsLoader::new()
            .with_env_prefix("DSHAL_TEST_BACKEND")
            .with_file(file.path())
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_tiers_rejected() {
        let settings = HarnessSettings {
            tiers: Vec::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
