//! Interfaces to the external systems the engine consults.
//!
//! The build system and ACL service are read before any mutation; the
//! notifier and bug tracker are called only after a unit of work commits
//! and their failures never undo it.

use relgate_model::{Evr, Nvr, NvrError, PackageAcl, Update};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

// ── Build system ──

/// A build as the build system reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedBuild {
    pub nvr: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u32>,
    pub version: String,
    pub release: String,
}

impl TaggedBuild {
    pub fn from_nvr(nvr: &Nvr, epoch: Option<u32>) -> Self {
        Self {
            nvr: nvr.to_string(),
            name: nvr.name.clone(),
            epoch,
            version: nvr.version.clone(),
            release: nvr.release.clone(),
        }
    }

    pub fn parse(nvr: &str, epoch: Option<u32>) -> Result<Self, NvrError> {
        Ok(Self::from_nvr(&Nvr::parse(nvr)?, epoch))
    }

    pub fn evr(&self) -> Evr {
        Evr {
            epoch: self.epoch,
            version: self.version.clone(),
            release: self.release.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildSystemError {
    #[error("no such tag: {0}")]
    TagNotFound(String),

    #[error("no such build: {0}")]
    BuildNotFound(String),

    #[error("build system unavailable: {0}")]
    Transport(String),
}

pub trait BuildSystem: Send + Sync {
    /// Names of the tags currently applied to `nvr`.
    fn list_tags(&self, nvr: &str) -> Result<Vec<String>, BuildSystemError>;

    fn get_build(&self, nvr: &str) -> Result<TaggedBuild, BuildSystemError>;

    /// Builds of `package` currently carrying `tag`.
    fn list_tagged(&self, tag: &str, package: &str) -> Result<Vec<TaggedBuild>, BuildSystemError>;
}

// ── Version ordering ──

pub trait VersionComparator: Send + Sync {
    fn compare(&self, left: &Evr, right: &Evr) -> Ordering;
}

// ── Authorization ──

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AclError {
    #[error("no ACL entry for package {0}")]
    UnknownPackage(String),

    #[error("ACL service unavailable: {0}")]
    Transport(String),
}

pub trait AclProvider: Send + Sync {
    /// Committers and groups allowed to push `package` on a `(collection, version)` branch.
    fn pushers_for(&self, package: &str, branch: &(String, String))
    -> Result<PackageAcl, AclError>;
}

// ── Notification ──

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "name", rename_all = "snake_case")]
pub enum Recipient {
    User(String),
    SecurityTeam(String),
    Admins,
}

impl Display for Recipient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(name) => write!(f, "{name}"),
            Self::SecurityTeam(address) => write!(f, "{address}"),
            Self::Admins => write!(f, "release engineering"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    New,
    Edited,
    Security,
    Testing,
    Stable,
    Unpush,
    Obsolete,
    Revoke,
    Deleted,
    Approved,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Edited => "edited",
            Self::Security => "security",
            Self::Testing => "testing",
            Self::Stable => "stable",
            Self::Unpush => "unpush",
            Self::Obsolete => "obsolete",
            Self::Revoke => "revoke",
            Self::Deleted => "deleted",
            Self::Approved => "approved",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync {
    fn send(
        &self,
        recipient: &Recipient,
        kind: NotificationKind,
        update: &Update,
    ) -> Result<(), NotifyError>;
}

// ── Bug tracker ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub security: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BugTrackerError {
    #[error("no such bug: {0}")]
    UnknownBug(u64),

    #[error("bug tracker unavailable: {0}")]
    Transport(String),
}

pub trait BugTracker: Send + Sync {
    fn bug_details(&self, bz_id: u64) -> Result<BugDetails, BugTrackerError>;

    fn add_comment(&self, bz_id: u64, update: &Update, text: &str) -> Result<(), BugTrackerError>;
}
