//! Typed update queries.
//!
//! Every field is an optional filter; an empty query matches everything.

use serde::{Deserialize, Serialize};

use crate::update::{Update, UpdateRequest, UpdateStatus, UpdateType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuery {
    /// Release short name (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UpdateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<UpdateType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<UpdateRequest>,
    /// Update title, package name, or build NVR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Matches updates referencing any of these bugs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bugs: Vec<u64>,
    /// Matches updates referencing any of these CVEs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cves: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed: Option<bool>,
    /// `Some(false)` selects updates still awaiting security approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl UpdateQuery {
    /// Pending security updates without security-team approval.
    pub fn security_queue() -> Self {
        Self {
            status: Some(UpdateStatus::Pending),
            update_type: Some(UpdateType::Security),
            approved: Some(false),
            ..Self::default()
        }
    }

    /// Filters that only need the update record itself.
    ///
    /// `package` is resolved by the store, which knows build ownership.
    pub fn matches_record(&self, update: &Update) -> bool {
        self.release
            .as_ref()
            .is_none_or(|r| update.release.eq_ignore_ascii_case(r))
            && self.status.is_none_or(|s| update.status == s)
            && self.update_type.is_none_or(|t| update.update_type == t)
            && self
                .submitter
                .as_ref()
                .is_none_or(|s| update.submitter == *s)
            && self.request.is_none_or(|r| update.request == Some(r))
            && self.pushed.is_none_or(|p| update.pushed == p)
            && self
                .approved
                .is_none_or(|a| update.approved.is_some() == a)
            && (self.bugs.is_empty() || self.bugs.iter().any(|b| update.bugs.contains(b)))
            && (self.cves.is_empty() || self.cves.iter().any(|c| update.cves.contains(c)))
    }
}
