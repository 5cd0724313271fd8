//! Settings-file loading for the `unmix` binary.
//!
//! This module handles:
//! - Loading `em.json` with per-problem solver overrides
//! - Config resolution order (CLI > env > XDG > defaults)
//! - Schema version checking and semantic validation
//!
//! Library callers never need this: solver entry points take an
//! `Option<&EmConfig>` directly.

pub mod validation;

pub use validation::{validate_settings, ValidationError};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unmix_common::{EmConfig, ProblemKind};

use crate::logging::event_names;

/// Schema version for settings files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Default XDG config directory name.
const CONFIG_DIR_NAME: &str = "unmix";

/// Settings file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "em.json";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "UNMIX_CONFIG";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

/// Partial solver settings. Absent fields keep the problem default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_tolerance: Option<f64>,
}

impl SolverOverrides {
    /// Apply the present fields on top of `base`.
    pub fn apply(&self, base: EmConfig) -> EmConfig {
        EmConfig {
            verbose: self.verbose.unwrap_or(base.verbose),
            max_iterations: self.max_iterations.unwrap_or(base.max_iterations),
            relative_tolerance: self.relative_tolerance.unwrap_or(base.relative_tolerance),
        }
    }
}

/// On-disk settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multinomial: Option<SolverOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaussian: Option<SolverOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponential: Option<SolverOverrides>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        SettingsFile {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            multinomial: None,
            gaussian: None,
            exponential: None,
        }
    }
}

impl SettingsFile {
    pub fn section(&self, kind: ProblemKind) -> Option<&SolverOverrides> {
        match kind {
            ProblemKind::Multinomial => self.multinomial.as_ref(),
            ProblemKind::Gaussian => self.gaussian.as_ref(),
            ProblemKind::Exponential => self.exponential.as_ref(),
        }
    }
}

/// Where the resolved settings came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    /// `--config <file>`.
    Explicit(PathBuf),
    /// `UNMIX_CONFIG`.
    Env(PathBuf),
    /// `$XDG_CONFIG_HOME/unmix/em.json`.
    Xdg(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Env(p) | ConfigSource::Xdg(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: SettingsFile,
    pub source: ConfigSource,
}

impl ResolvedConfig {
    /// Effective solver settings for one problem, before CLI flag overrides.
    pub fn for_problem(&self, kind: ProblemKind) -> EmConfig {
        let base = EmConfig::for_problem(kind);
        match self.settings.section(kind) {
            Some(section) => section.apply(base),
            None => base,
        }
    }

    /// Machine-readable view used by `unmix config show`.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            schema_version: self.settings.schema_version.clone(),
            source: self.source.clone(),
            multinomial: self.for_problem(ProblemKind::Multinomial),
            gaussian: self.for_problem(ProblemKind::Gaussian),
            exponential: self.for_problem(ProblemKind::Exponential),
        }
    }
}

/// Effective per-problem settings plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    pub schema_version: String,
    pub source: ConfigSource,
    pub multinomial: EmConfig,
    pub gaussian: EmConfig,
    pub exponential: EmConfig,
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit settings file (highest priority).
    pub config_path: Option<PathBuf>,
    /// Value of `UNMIX_CONFIG`, if set.
    pub env_path: Option<PathBuf>,
    /// Base config directory (`$XDG_CONFIG_HOME` or `~/.config`).
    pub config_home: Option<PathBuf>,
}

impl ConfigOptions {
    /// Capture the environment-dependent parts of resolution.
    pub fn from_env(config_path: Option<PathBuf>) -> Self {
        let env_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")));
        ConfigOptions {
            config_path,
            env_path,
            config_home,
        }
    }
}

/// Load configuration with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit `--config` file
/// 2. `UNMIX_CONFIG`
/// 3. `$XDG_CONFIG_HOME/unmix/em.json` (only if it exists)
/// 4. Built-in defaults
///
/// An explicitly named file that does not exist is an error; a missing XDG
/// file is not.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let source = resolve_source(options)?;

    let settings = match source.path() {
        Some(path) => {
            let settings = load_settings_file(path)?;
            tracing::debug!(
                event = event_names::CONFIG_LOADED,
                path = %path.display(),
                "loaded settings file"
            );
            settings
        }
        None => {
            tracing::debug!(
                event = event_names::CONFIG_DEFAULT_USED,
                "no settings file; using built-in defaults"
            );
            SettingsFile::default()
        }
    };

    validate_settings(&settings)?;

    Ok(ResolvedConfig { settings, source })
}

fn resolve_source(options: &ConfigOptions) -> Result<ConfigSource, ConfigError> {
    if let Some(path) = &options.config_path {
        ensure_exists(path)?;
        return Ok(ConfigSource::Explicit(path.clone()));
    }

    if let Some(path) = &options.env_path {
        ensure_exists(path)?;
        return Ok(ConfigSource::Env(path.clone()));
    }

    if let Some(home) = &options.config_home {
        let path = home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if path.is_file() {
            return Ok(ConfigSource::Xdg(path));
        }
    }

    Ok(ConfigSource::Defaults)
}

fn ensure_exists(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Load and version-check a settings file.
pub fn load_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parsed = serde_json::from_str::<SettingsFile>(&content);
    let settings = parsed.map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if settings.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: CONFIG_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version,
        });
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn isolated(home: &TempDir) -> ConfigOptions {
        ConfigOptions {
            config_path: None,
            env_path: None,
            config_home: Some(home.path().to_path_buf()),
        }
    }

    #[test]
    fn defaults_when_nothing_present() {
        let home = TempDir::new().unwrap();
        let resolved = load_config(&isolated(&home)).unwrap();
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(
            resolved.for_problem(ProblemKind::Gaussian),
            EmConfig::for_problem(ProblemKind::Gaussian)
        );
    }

    #[test]
    fn xdg_file_is_picked_up() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(CONFIG_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        let path = write(
            &dir,
            CONFIG_FILE_NAME,
            r#"{"schema_version":"1.0.0","multinomial":{"max_iterations":50}}"#,
        );
        let resolved = load_config(&isolated(&home)).unwrap();
        assert_eq!(resolved.source, ConfigSource::Xdg(path));
        let cfg = resolved.for_problem(ProblemKind::Multinomial);
        assert_eq!(cfg.max_iterations, 50);
        assert_eq!(cfg.relative_tolerance, 1e-5);
    }

    #[test]
    fn explicit_beats_env_beats_xdg() {
        let home = TempDir::new().unwrap();
        let explicit = write(
            home.path(),
            "a.json",
            r#"{"schema_version":"1.0.0","gaussian":{"relative_tolerance":1e-3}}"#,
        );
        let env = write(
            home.path(),
            "b.json",
            r#"{"schema_version":"1.0.0","gaussian":{"relative_tolerance":1e-4}}"#,
        );
        let mut options = isolated(&home);
        options.env_path = Some(env.clone());
        let resolved = load_config(&options).unwrap();
        assert_eq!(resolved.source, ConfigSource::Env(env));

        options.config_path = Some(explicit.clone());
        let resolved = load_config(&options).unwrap();
        assert_eq!(resolved.source, ConfigSource::Explicit(explicit));
        assert_eq!(
            resolved.for_problem(ProblemKind::Gaussian).relative_tolerance,
            1e-3
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let home = TempDir::new().unwrap();
        let mut options = isolated(&home);
        options.config_path = Some(home.path().join("nope.json"));
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn version_mismatch_rejected() {
        let home = TempDir::new().unwrap();
        let path = write(home.path(), "v.json", r#"{"schema_version":"9.9.9"}"#);
        let mut options = isolated(&home);
        options.config_path = Some(path);
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        let home = TempDir::new().unwrap();
        let path = write(home.path(), "bad.json", "{ not json");
        let mut options = isolated(&home);
        options.config_path = Some(path);
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn unknown_keys_rejected() {
        let home = TempDir::new().unwrap();
        let path = write(
            home.path(),
            "typo.json",
            r#"{"schema_version":"1.0.0","gaussian":{"max_iter":5}}"#,
        );
        let mut options = isolated(&home);
        options.config_path = Some(path);
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn semantic_errors_surface() {
        let home = TempDir::new().unwrap();
        let path = write(
            home.path(),
            "neg.json",
            r#"{"schema_version":"1.0.0","exponential":{"relative_tolerance":-1}}"#,
        );
        let mut options = isolated(&home);
        options.config_path = Some(path);
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn snapshot_reports_every_problem() {
        let resolved = ResolvedConfig {
            settings: SettingsFile::default(),
            source: ConfigSource::Defaults,
        };
        let json = serde_json::to_value(resolved.snapshot()).unwrap();
        assert_eq!(json["source"]["kind"], "defaults");
        assert_eq!(json["multinomial"]["relative_tolerance"], 1e-5);
        assert_eq!(json["exponential"]["max_iterations"], 1000);
    }
}
