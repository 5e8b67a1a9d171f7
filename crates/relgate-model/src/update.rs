//! Update records: the unit moved through pending → testing → stable.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::release::Release;

/// Raised when a textual enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseValueError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Bugfix,
    Enhancement,
    Newpackage,
    Security,
}

text_enum!(UpdateType, "update type", {
    Bugfix => "bugfix",
    Enhancement => "enhancement",
    Newpackage => "newpackage",
    Security => "security",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Pending,
    Testing,
    Stable,
    Obsolete,
    Unpushed,
}

text_enum!(UpdateStatus, "update status", {
    Pending => "pending",
    Testing => "testing",
    Stable => "stable",
    Obsolete => "obsolete",
    Unpushed => "unpushed",
});

/// Intent recorded for the external push process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRequest {
    Testing,
    Stable,
    Unpush,
    Obsolete,
}

text_enum!(UpdateRequest, "update request", {
    Testing => "testing",
    Stable => "stable",
    Unpush => "unpush",
    Obsolete => "obsolete",
});

/// A linked Bugzilla reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bugzilla {
    pub bz_id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub security: bool,
}

fn cve_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CVE-\d{4}-\d{4,}$").expect("cve regex must compile"))
}

/// Whether `value` looks like `CVE-YYYY-NNNN`.
pub fn is_cve_id(value: &str) -> bool {
    cve_id_re().is_match(value)
}

/// Append-only feedback on an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub karma: i8,
    #[serde(default)]
    pub anonymous: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub id: String,
    /// Comma-joined build NVRs.
    pub title: String,
    pub release: String,
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub status: UpdateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<UpdateRequest>,
    pub submitter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed: bool,
    #[serde(default)]
    pub close_bugs: bool,
    pub date_submitted: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_pushed: Option<DateTime<Utc>>,
    /// Build NVRs in submission order.
    pub builds: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub bugs: BTreeSet<u64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cves: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl Update {
    /// A fresh pending update with no request.
    pub fn new(
        builds: Vec<String>,
        release: impl Into<String>,
        update_type: UpdateType,
        submitter: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: builds.join(","),
            release: release.into(),
            update_type,
            status: UpdateStatus::Pending,
            request: None,
            submitter: submitter.into(),
            notes: String::new(),
            approved: None,
            pushed: false,
            close_bugs: false,
            date_submitted: now,
            date_modified: None,
            date_pushed: None,
            builds,
            bugs: BTreeSet::new(),
            cves: BTreeSet::new(),
            comments: Vec::new(),
        }
    }

    /// Replace the build list and re-derive the title.
    pub fn set_builds(&mut self, builds: Vec<String>) {
        self.title = builds.join(",");
        self.builds = builds;
    }

    /// Tag its builds currently carry in the build system.
    pub fn current_tag(&self, release: &Release) -> String {
        match self.status {
            UpdateStatus::Testing => release.testing_tag(),
            UpdateStatus::Stable => release.stable_tag(),
            UpdateStatus::Pending | UpdateStatus::Unpushed | UpdateStatus::Obsolete => {
                release.candidate_tag()
            }
        }
    }

    pub fn karma(&self) -> i32 {
        self.comments.iter().map(|c| i32::from(c.karma)).sum()
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn has_build(&self, nvr: &str) -> bool {
        self.builds.iter().any(|b| b == nvr)
    }

    pub fn touch_modified(&mut self, now: DateTime<Utc>) {
        self.date_modified = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("fixed time")
    }

    #[test]
    fn enum_values_round_trip_through_text() {
        assert_eq!("Stable".parse::<UpdateRequest>(), Ok(UpdateRequest::Stable));
        assert_eq!(UpdateStatus::Unpushed.to_string(), "unpushed");
        let err = "later".parse::<UpdateRequest>().expect_err("unknown request");
        assert_eq!(err.to_string(), "unknown update request: later");
    }

    #[test]
    fn new_update_is_pending_and_titled_by_builds() {
        let update = Update::new(
            vec!["foo-1.0-1".to_string(), "bar-2.0-1".to_string()],
            "F20",
            UpdateType::Bugfix,
            "alice",
            now(),
        );
        assert_eq!(update.title, "foo-1.0-1,bar-2.0-1");
        assert_eq!(update.status, UpdateStatus::Pending);
        assert_eq!(update.request, None);
        assert!(update.has_build("bar-2.0-1"));
        assert!(!update.has_build("foo-1.0"));
    }

    #[test]
    fn current_tag_tracks_status() {
        let release = Release::new("F20", "Fedora 20", "f20");
        let mut update = Update::new(vec!["foo-1.0-1".to_string()], "F20", UpdateType::Bugfix, "a", now());
        assert_eq!(update.current_tag(&release), "f20-updates-candidate");
        update.status = UpdateStatus::Testing;
        assert_eq!(update.current_tag(&release), "f20-updates-testing");
    }

    #[test]
    fn karma_sums_comments() {
        let mut update = Update::new(vec!["foo-1.0-1".to_string()], "F20", UpdateType::Bugfix, "a", now());
        for karma in [1, 1, -1, 0] {
            update.add_comment(Comment {
                author: "tester".to_string(),
                text: None,
                karma,
                anonymous: false,
                timestamp: now(),
            });
        }
        assert_eq!(update.karma(), 1);
    }

    #[test]
    fn cve_pattern() {
        assert!(is_cve_id("CVE-2014-0160"));
        assert!(!is_cve_id("cve-2014-0160"));
        assert!(!is_cve_id("CVE-14-1"));
    }
}
