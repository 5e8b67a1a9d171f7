//! Distribution releases and the build-system tags derived from them.

use serde::{Deserialize, Serialize};

/// A distribution release, e.g. `F20` / `Fedora 20` / `f20`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub long_name: String,
    /// Build-system distribution tag; its trailing number is the release version.
    pub dist_tag: String,
}

impl Release {
    pub fn new(
        name: impl Into<String>,
        long_name: impl Into<String>,
        dist_tag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            long_name: long_name.into(),
            dist_tag: dist_tag.into(),
        }
    }

    /// Tag a build must carry before it can be submitted.
    pub fn candidate_tag(&self) -> String {
        format!("{}-updates-candidate", self.dist_tag)
    }

    pub fn testing_tag(&self) -> String {
        format!("{}-updates-testing", self.dist_tag)
    }

    pub fn stable_tag(&self) -> String {
        format!("{}-updates", self.dist_tag)
    }

    /// Whether `key` names this release by short or long name.
    pub fn matches(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key) || self.long_name == key
    }

    /// Package ACL branch: collection and version, e.g. `("Fedora", "20")`.
    pub fn acl_branch(&self) -> (String, String) {
        let collection = self
            .long_name
            .split_whitespace()
            .next()
            .unwrap_or(self.long_name.as_str())
            .to_string();
        let version = self
            .long_name
            .split_whitespace()
            .last()
            .filter(|_| self.long_name.split_whitespace().count() > 1)
            .unwrap_or_default()
            .to_string();
        (collection, version)
    }
}
