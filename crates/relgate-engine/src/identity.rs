//! Caller identity and update-level authorization.

use relgate_model::Update;
use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub groups: BTreeSet<String>,
}

impl Identity {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            groups: BTreeSet::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn in_any_group(&self, groups: &[String]) -> bool {
        groups.iter().any(|g| self.groups.contains(g))
    }
}

/// Submitter or administrator.
pub fn authorized_for(identity: &Identity, update: &Update, config: &EngineConfig) -> bool {
    identity.user == update.submitter || identity.in_any_group(&config.admin_groups)
}

pub fn require_authorized(
    identity: &Identity,
    update: &Update,
    config: &EngineConfig,
    action: &str,
) -> Result<(), EngineError> {
    if authorized_for(identity, update, config) {
        Ok(())
    } else {
        Err(EngineError::unauthorized(
            identity.user.clone(),
            action,
            update.title.clone(),
        ))
    }
}
