//! Display preferences persisted as a small TOML file.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid preferences file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file yields the defaults.
    pub async fn load(&self) -> Result<Preferences, PreferencesError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Preferences::default()),
            Err(source) => {
                return Err(PreferencesError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&data).map_err(|source| PreferencesError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let encoded = toml::to_string_pretty(preferences)?;
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|source| PreferencesError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            target = "blogfront::preferences",
            path = %self.path.display(),
            dark_mode = preferences.dark_mode,
            "preferences saved"
        );
        Ok(())
    }

    /// Flip dark mode, persist it and return the new preferences.
    pub async fn toggle_dark_mode(&self) -> Result<Preferences, PreferencesError> {
        let mut preferences = self.load().await?;
        preferences.dark_mode = !preferences.dark_mode;
        self.save(&preferences).await?;
        Ok(preferences)
    }
}
