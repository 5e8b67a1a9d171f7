//! # relgate-engine
//!
//! Update admission and request transitions over a `relgate-model` store.
//!
//! ```text
//! submit ─► ACL check ─► tag validation ─► update path walk ─► bug details
//!                (external lookups, concurrent per build, no lock held)
//!        ─► unit of work: teardown edited builds, insert builds,
//!           obsolete older updates, write update, apply request
//!        ─► notifications and bug comments (best effort)
//! ```
//!
//! Transitions (`request`, `revoke`, `delete`, `approve`, `comment`,
//! `obsolete_builds`) are single units of work over the same store.

pub mod adapters;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
mod fanout;
pub mod identity;
pub mod obsolete;
pub mod submit;
pub mod tag_validator;
pub mod transition;
pub mod update_path;
pub mod version;

pub use collaborators::{
    AclError, AclProvider, BugDetails, BugTracker, BugTrackerError, BuildSystem, BuildSystemError,
    NotificationKind, Notifier, NotifyError, Recipient, TaggedBuild, VersionComparator,
};
pub use config::{ConfigError, DEFAULT_MAX_RELEASE_WALK, EngineConfig};
pub use engine::{Collaborators, Effect, Engine, ObsoleteReport, TransitionOutcome};
pub use error::EngineError;
pub use identity::{Identity, authorized_for, require_authorized};
pub use obsolete::{Obsoleted, obsolete_older_builds};
pub use submit::{SubmitOutcome, SubmitRequest};
pub use tag_validator::{expected_tag, validate_build_tags};
pub use transition::{Transition, apply_request};
pub use update_path::{PathReport, UpdatePathChecker, WalkStop, previous_release_tag};
pub use version::{RpmVersionComparator, label_compare, rpmvercmp};
