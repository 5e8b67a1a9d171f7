//! Engine policy configuration (TOML).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_RELEASE_WALK: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_release_walk must be at least 1")]
    ZeroReleaseWalk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Author recorded on engine-generated comments.
    pub system_user: String,
    /// Notifier recipient for security notices.
    pub security_team: String,
    /// Group whose members may approve security updates.
    pub security_group: String,
    /// Groups that may act on any update.
    pub admin_groups: Vec<String>,
    /// Groups that bypass package commit ACLs on submission.
    pub privileged_groups: Vec<String>,
    /// Upper bound on releases visited when checking update paths.
    pub max_release_walk: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_user: "relgate".to_string(),
            security_team: "security-team".to_string(),
            security_group: "security_respons".to_string(),
            admin_groups: vec!["releng".to_string()],
            privileged_groups: vec![
                "releng".to_string(),
                "security_respons".to_string(),
                "cvsadmin".to_string(),
            ],
            max_release_walk: DEFAULT_MAX_RELEASE_WALK,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.max_release_walk == 0 {
            return Err(ConfigError::ZeroReleaseWalk);
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }
}
