//! Source packages and their builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// People and groups allowed to commit to a package branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAcl {
    #[serde(default)]
    pub committers: BTreeSet<String>,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl PackageAcl {
    /// Whether `user` (a member of `user_groups`) may commit.
    pub fn allows<'a>(&self, user: &str, user_groups: impl IntoIterator<Item = &'a String>) -> bool {
        if self.committers.contains(user) {
            return true;
        }
        user_groups.into_iter().any(|g| self.groups.contains(g))
    }
}

/// A source package. Builds reference it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Cached committer ACL from the last submission that touched the package.
    #[serde(default)]
    pub acl: PackageAcl,
    #[serde(default)]
    pub suggest_reboot: bool,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acl: PackageAcl::default(),
            suggest_reboot: false,
        }
    }
}

/// One name-version-release build. Unique across the store by `nvr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub nvr: String,
    pub package: String,
    /// Owning update id; absent until attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<String>,
}

impl Build {
    pub fn new(nvr: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            nvr: nvr.into(),
            package: package.into(),
            update_id: None,
        }
    }
}
