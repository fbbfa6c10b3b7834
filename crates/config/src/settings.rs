// User settings, loaded from TOML

use std::fs;
use std::path::{Path, PathBuf};

use listwash_dedup::{ColumnPreferences, EngineError, MatchConfig};
use listwash_io::{PacingPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(#[from] EngineError),

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Everything a run can be tuned with. Every section and key is optional;
/// unknown keys are rejected so typos fail loudly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub matching: MatchConfig,
    pub columns: ColumnPreferences,
    pub pacing: PacingPolicy,
    pub retry: RetryPolicy,
}

impl Settings {
    /// Default settings file path (`<config dir>/listwash/config.toml`).
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("listwash");
        config_dir.join("config.toml")
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist. A missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::parse(&contents).map_err(|e| match e {
            SettingsError::Parse { source, .. } => SettingsError::Parse { path: path.clone(), source },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, SettingsError> {
        Self::parse(input)
    }

    fn parse(input: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(input).map_err(|source| SettingsError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.matching.validate()?;
        self.columns.validate()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
