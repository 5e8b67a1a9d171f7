use relgate_model::PackageAcl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{AdapterError, load_json};
use crate::collaborators::{AclError, AclProvider};

/// Package ACLs from a JSON map of package name to `{committers, groups}`.
///
/// A `"<package>@<collection> <version>"` key overrides the plain package
/// entry for that branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureAcl {
    packages: BTreeMap<String, PackageAcl>,
}

impl FixtureAcl {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        load_json(path.as_ref())
    }

    pub fn with_committer(mut self, package: &str, user: &str) -> Self {
        self.packages
            .entry(package.to_string())
            .or_default()
            .committers
            .insert(user.to_string());
        self
    }

    pub fn with_group(mut self, package: &str, group: &str) -> Self {
        self.packages
            .entry(package.to_string())
            .or_default()
            .groups
            .insert(group.to_string());
        self
    }
}

impl AclProvider for FixtureAcl {
    fn pushers_for(
        &self,
        package: &str,
        branch: &(String, String),
    ) -> Result<PackageAcl, AclError> {
        let branch_key = format!("{package}@{} {}", branch.0, branch.1);
        self.packages
            .get(&branch_key)
            .or_else(|| self.packages.get(package))
            .cloned()
            .ok_or_else(|| AclError::UnknownPackage(package.to_string()))
    }
}
