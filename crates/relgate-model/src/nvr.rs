//! Name-version-release identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Errors raised while parsing an NVR string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NvrError {
    #[error("build identifier is empty")]
    Empty,

    #[error("not a name-version-release identifier: {0}")]
    Malformed(String),
}

/// A parsed `name-version-release` build identifier.
///
/// The name may itself contain dashes; version and release never do, so the
/// split happens on the last two dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nvr {
    pub name: String,
    pub version: String,
    pub release: String,
}

impl Nvr {
    pub fn parse(raw: &str) -> Result<Self, NvrError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NvrError::Empty);
        }

        let mut parts = raw.rsplitn(3, '-');
        let release = parts.next().unwrap_or_default();
        let version = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if name.is_empty() || version.is_empty() || release.is_empty() {
            return Err(NvrError::Malformed(raw.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            release: release.to_string(),
        })
    }

    /// Epoch-version-release view with no epoch.
    pub fn evr(&self) -> Evr {
        Evr {
            epoch: None,
            version: self.version.clone(),
            release: self.release.clone(),
        }
    }
}

impl Display for Nvr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.version, self.release)
    }
}

/// Epoch-version-release triple; the unit of package version ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u32>,
    pub version: String,
    pub release: String,
}

impl Evr {
    /// A missing epoch orders like epoch zero.
    pub fn epoch_or_zero(&self) -> u32 {
        self.epoch.unwrap_or(0)
    }
}

impl Display for Evr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.epoch {
            Some(epoch) => write!(f, "{epoch}:{}-{}", self.version, self.release),
            None => write!(f, "{}-{}", self.version, self.release),
        }
    }
}
