//! The engine façade: every operation runs as one unit of work against an
//! [`UpdateRepository`], and collaborator side effects are dispatched only
//! after that unit of work commits.

use chrono::Utc;
use relgate_model::{
    Comment, Release, Update, UpdateQuery, UpdateRepository, UpdateRequest, UpdateStatus,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::collaborators::{
    AclProvider, BugTracker, BuildSystem, NotificationKind, Notifier, Recipient, VersionComparator,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::identity::{Identity, require_authorized};
use crate::transition::{self, Transition};

/// External systems the engine consults.
#[derive(Clone)]
pub struct Collaborators {
    pub build_system: Arc<dyn BuildSystem>,
    pub acl: Arc<dyn AclProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub bug_tracker: Arc<dyn BugTracker>,
    pub comparator: Arc<dyn VersionComparator>,
}

/// A side effect deferred until its unit of work has committed.
#[derive(Debug, Clone)]
pub enum Effect {
    Notify {
        recipient: Recipient,
        kind: NotificationKind,
        update: Box<Update>,
    },
    BugComment {
        bz_id: u64,
        update: Box<Update>,
        text: String,
    },
}

impl Effect {
    pub(crate) fn notices(update: &Update, notices: &[(Recipient, NotificationKind)]) -> Vec<Self> {
        notices
            .iter()
            .map(|(recipient, kind)| Self::Notify {
                recipient: recipient.clone(),
                kind: *kind,
                update: Box::new(update.clone()),
            })
            .collect()
    }
}

/// Result of a bulk obsolete request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObsoleteReport {
    /// Titles of updates that moved to obsolete.
    pub obsoleted: Vec<String>,
    /// Per-build rejections; they do not stop the other builds.
    pub errors: Vec<String>,
}

/// An applied transition together with the update as committed.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub update: Update,
    pub transition: Transition,
}

pub struct Engine<R> {
    pub(crate) repo: R,
    pub(crate) collaborators: Collaborators,
    pub(crate) config: EngineConfig,
}

impl<R: UpdateRepository> Engine<R> {
    pub fn new(repo: R, collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            repo,
            collaborators,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Releases ──

    /// Add or replace a release. Returns true when it was not known before.
    pub fn register_release(&self, release: Release) -> Result<bool, EngineError> {
        let name = release.name.clone();
        let created = self
            .repo
            .mutate(|store| Ok::<_, EngineError>((store.upsert_release(release).is_none(), true)))?;
        info!("registered release {name}");
        Ok(created)
    }

    pub fn releases(&self) -> Result<Vec<Release>, EngineError> {
        Ok(self.repo.read(|store| store.releases().cloned().collect())?)
    }

    pub fn dist_tags(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.repo.read(|store| store.dist_tags())?)
    }

    // ── Reads ──

    pub fn update(&self, title: &str) -> Result<Update, EngineError> {
        self.repo
            .read(|store| store.update_by_title(title).cloned())?
            .ok_or_else(|| EngineError::not_found("update", title))
    }

    pub fn query(&self, query: &UpdateQuery) -> Result<Vec<Update>, EngineError> {
        Ok(self
            .repo
            .read(|store| store.query(query).into_iter().cloned().collect())?)
    }

    /// Pending security updates still waiting for approval.
    pub fn security_queue(&self) -> Result<Vec<Update>, EngineError> {
        self.query(&UpdateQuery::security_queue())
    }

    // ── Transitions ──

    /// Apply `action` to the update titled `title`.
    pub fn request(
        &self,
        identity: &Identity,
        title: &str,
        action: UpdateRequest,
    ) -> Result<TransitionOutcome, EngineError> {
        let now = Utc::now();
        let outcome = self.repo.mutate(|store| {
            let id = store.update_id_by_title(title)?;
            let update = store
                .update_mut(&id)
                .ok_or_else(|| EngineError::not_found("update", title))?;
            require_authorized(identity, update, &self.config, &format!("request {action} for"))?;
            let transition = transition::apply_request(update, action, &self.config, now)?;
            let changed = transition.changed;
            Ok::<_, EngineError>((
                TransitionOutcome {
                    update: update.clone(),
                    transition,
                },
                changed,
            ))
        })?;
        self.dispatch(Effect::notices(
            &outcome.update,
            &outcome.transition.notices,
        ));
        Ok(outcome)
    }

    /// Withdraw the outstanding request on `title`.
    pub fn revoke(&self, identity: &Identity, title: &str) -> Result<TransitionOutcome, EngineError> {
        let outcome = self.repo.mutate(|store| {
            let id = store.update_id_by_title(title)?;
            let update = store
                .update_mut(&id)
                .ok_or_else(|| EngineError::not_found("update", title))?;
            require_authorized(identity, update, &self.config, "revoke")?;
            let transition = transition::revoke(update)?;
            Ok::<_, EngineError>((
                TransitionOutcome {
                    update: update.clone(),
                    transition,
                },
                true,
            ))
        })?;
        self.dispatch(Effect::notices(
            &outcome.update,
            &outcome.transition.notices,
        ));
        Ok(outcome)
    }

    /// Remove an unpushed, non-stable update and its builds.
    pub fn delete(&self, identity: &Identity, title: &str) -> Result<Update, EngineError> {
        let removed = self.repo.mutate(|store| {
            let id = store.update_id_by_title(title)?;
            let update = store
                .update(&id)
                .ok_or_else(|| EngineError::not_found("update", title))?;
            require_authorized(identity, update, &self.config, "delete")?;
            if update.status == UpdateStatus::Stable {
                return Err(EngineError::CannotModifyStable {
                    title: update.title.clone(),
                    action: "delete".to_string(),
                });
            }
            if update.pushed {
                return Err(EngineError::CannotDeletePushed(update.title.clone()));
            }
            let removed = store
                .remove_update(&id)
                .ok_or_else(|| EngineError::not_found("update", title))?;
            Ok::<_, EngineError>((removed, true))
        })?;
        info!("deleted update {}", removed.title);
        self.dispatch(Effect::notices(
            &removed,
            &[(Recipient::Admins, NotificationKind::Deleted)],
        ));
        Ok(removed)
    }

    /// Append a comment. Karma must be -1, 0 or 1.
    pub fn comment(
        &self,
        identity: &Identity,
        title: &str,
        text: Option<&str>,
        karma: i64,
        anonymous: bool,
    ) -> Result<Update, EngineError> {
        let karma = match karma {
            -1..=1 => karma as i8,
            other => return Err(EngineError::InvalidKarma(other)),
        };
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "None")
            .map(str::to_string);
        let now = Utc::now();

        self.repo
            .mutate(|store| {
                let id = store.update_id_by_title(title)?;
                let update = store
                    .update_mut(&id)
                    .ok_or_else(|| EngineError::not_found("update", title))?;
                update.add_comment(Comment {
                    author: identity.user.clone(),
                    text,
                    karma,
                    anonymous,
                    timestamp: now,
                });
                Ok::<_, EngineError>((update.clone(), true))
            })
            .map_err(EngineError::from)
    }

    /// Security-team sign-off; the update is then requested for stable.
    pub fn approve(&self, identity: &Identity, title: &str) -> Result<TransitionOutcome, EngineError> {
        if !identity.in_group(&self.config.security_group) {
            return Err(EngineError::unauthorized(
                identity.user.clone(),
                "approve",
                title,
            ));
        }
        let now = Utc::now();
        let outcome = self.repo.mutate(|store| {
            let id = store.update_id_by_title(title)?;
            let update = store
                .update_mut(&id)
                .ok_or_else(|| EngineError::not_found("update", title))?;
            match update.status {
                UpdateStatus::Stable => {
                    return Err(EngineError::CannotModifyStable {
                        title: update.title.clone(),
                        action: "approve".to_string(),
                    });
                }
                // Retired updates only come back through an explicit request.
                UpdateStatus::Obsolete | UpdateStatus::Unpushed => {
                    return Err(EngineError::AlreadyInState {
                        title: update.title.clone(),
                        status: update.status,
                    });
                }
                UpdateStatus::Pending | UpdateStatus::Testing => {}
            }
            update.approved = Some(now);
            update.request = Some(UpdateRequest::Stable);
            update.pushed = false;
            update.date_pushed = None;
            info!("{} approved by {}", update.title, identity.user);
            let transition = Transition {
                message: format!("{} has been approved and submitted for stable", update.title),
                changed: true,
                notices: vec![(Recipient::Admins, NotificationKind::Approved)],
            };
            Ok::<_, EngineError>((
                TransitionOutcome {
                    update: update.clone(),
                    transition,
                },
                true,
            ))
        })?;
        self.dispatch(Effect::notices(
            &outcome.update,
            &outcome.transition.notices,
        ));
        Ok(outcome)
    }

    /// Obsolete the updates owning `nvrs`. Rejections are collected per
    /// build instead of aborting the rest.
    pub fn obsolete_builds(
        &self,
        identity: &Identity,
        nvrs: &[String],
    ) -> Result<ObsoleteReport, EngineError> {
        let now = Utc::now();
        let (report, effects) = self.repo.mutate(|store| {
            let mut report = ObsoleteReport::default();
            let mut effects = Vec::new();
            for nvr in nvrs {
                let Some(id) = store.update_for_build(nvr).map(|u| u.id.clone()) else {
                    report
                        .errors
                        .push(EngineError::not_found("build", nvr.clone()).to_string());
                    continue;
                };
                let Some(update) = store.update_mut(&id) else {
                    continue;
                };
                if let Err(err) = require_authorized(identity, update, &self.config, "obsolete") {
                    report.errors.push(err.to_string());
                    continue;
                }
                let transition =
                    transition::obsolete(update, None, &self.config.system_user, now);
                if transition.changed {
                    report.obsoleted.push(update.title.clone());
                    effects.extend(Effect::notices(update, &transition.notices));
                }
            }
            let changed = !report.obsoleted.is_empty();
            Ok::<_, EngineError>(((report, effects), changed))
        })?;
        self.dispatch(effects);
        Ok(report)
    }

    // ── Side effects ──

    /// Send notifications and bug comments. Failures are logged only.
    pub(crate) fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify {
                    recipient,
                    kind,
                    update,
                } => {
                    if let Err(err) = self.collaborators.notifier.send(&recipient, kind, &update) {
                        warn!("{kind} notification to {recipient} for {} failed: {err}", update.title);
                    }
                }
                Effect::BugComment {
                    bz_id,
                    update,
                    text,
                } => {
                    if let Err(err) = self.collaborators.bug_tracker.add_comment(bz_id, &update, &text)
                    {
                        warn!("comment on bug {bz_id} for {} failed: {err}", update.title);
                    }
                }
            }
        }
    }
}
