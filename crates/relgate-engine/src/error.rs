//! Error taxonomy for admission and transitions.
//!
//! Every rejection leaves the store exactly as it was before the request.

use relgate_model::{AtomicStoreMutationError, StoreError, UpdateRequest, UpdateStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("{build} not tagged with {tag}")]
    UntaggedBuild { build: String, tag: String },

    #[error("invalid build: {build} ({reason})")]
    InvalidBuild { build: String, reason: String },

    #[error("broken update path: {candidate} is older than {conflicting} in {tag}")]
    BrokenUpdatePath {
        candidate: String,
        conflicting: String,
        tag: String,
    },

    #[error("update for {0} already exists")]
    DuplicateBuild(String),

    #[error("update {0} already exists")]
    DuplicateUpdate(String),

    #[error("{user} is not authorized to {action} {target}")]
    Unauthorized {
        user: String,
        action: String,
        target: String,
    },

    #[error("cannot edit stable update {0}")]
    CannotEditStable(String),

    #[error("cannot {action} stable update {title}")]
    CannotModifyStable { title: String, action: String },

    #[error("cannot delete pushed update {0}")]
    CannotDeletePushed(String),

    #[error("{title} already {status}")]
    AlreadyInState { title: String, status: UpdateStatus },

    #[error("{title} has already been submitted to {request}")]
    AlreadyRequested {
        title: String,
        request: UpdateRequest,
    },

    #[error("{0} has no outstanding request to revoke")]
    NoOutstandingRequest(String),

    #[error("karma must be one of (1, 0, -1), got {0}")]
    InvalidKarma(i64),

    #[error("an update requires at least one build")]
    NoBuilds,

    #[error("invalid CVE identifier: {0}")]
    InvalidCve(String),

    #[error("release tag {0} has no trailing version number")]
    MalformedReleaseTag(String),

    #[error("unable to look up commit access for {package}: {reason}")]
    AclLookup { package: String, reason: String },

    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn unauthorized(
        user: impl Into<String>,
        action: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::Unauthorized {
            user: user.into(),
            action: action.into(),
            target: target.into(),
        }
    }

    /// Validation failures that reject a submission outright.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UntaggedBuild { .. }
                | Self::InvalidBuild { .. }
                | Self::BrokenUpdatePath { .. }
                | Self::NoBuilds
                | Self::InvalidCve(_)
        )
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ReleaseNotFound(key) => Self::not_found("release", key),
            StoreError::UpdateNotFound(key) => Self::not_found("update", key),
            StoreError::BuildNotFound(key) => Self::not_found("build", key),
            StoreError::DuplicateBuild(nvr) => Self::DuplicateBuild(nvr),
            StoreError::DuplicateUpdate(title) => Self::DuplicateUpdate(title),
            other @ StoreError::Jsonl(_) => Self::Store(other.to_string()),
        }
    }
}

impl From<AtomicStoreMutationError<EngineError>> for EngineError {
    fn from(err: AtomicStoreMutationError<EngineError>) -> Self {
        match err {
            AtomicStoreMutationError::Mutation(inner) => inner,
            AtomicStoreMutationError::Store(source) => source.into(),
            other => Self::Store(other.to_string()),
        }
    }
}
