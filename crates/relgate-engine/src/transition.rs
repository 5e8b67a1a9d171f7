//! Update state machine.
//!
//! `status` is where an update is; `request` is what the push process has
//! been asked to do next. `unpush` and `obsolete` act immediately, while
//! `testing` and `stable` only record a request.

use chrono::{DateTime, Utc};
use relgate_model::{Comment, Update, UpdateRequest, UpdateStatus, UpdateType};
use tracing::info;

use crate::collaborators::{NotificationKind, Recipient};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Outcome of one transition attempt on an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Human-readable summary for the caller.
    pub message: String,
    /// False when the update already was in the requested state.
    pub changed: bool,
    /// Notifications to send once the change is committed.
    pub notices: Vec<(Recipient, NotificationKind)>,
}

impl Transition {
    fn unchanged(message: String) -> Self {
        Self {
            message,
            changed: false,
            notices: Vec::new(),
        }
    }
}

fn request_kind(action: UpdateRequest) -> NotificationKind {
    match action {
        UpdateRequest::Testing => NotificationKind::Testing,
        UpdateRequest::Stable => NotificationKind::Stable,
        UpdateRequest::Unpush => NotificationKind::Unpush,
        UpdateRequest::Obsolete => NotificationKind::Obsolete,
    }
}

/// Apply an action token to `update`.
///
/// Authorization is the caller's concern; this only enforces the state
/// rules.
pub fn apply_request(
    update: &mut Update,
    action: UpdateRequest,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Transition, EngineError> {
    match action {
        UpdateRequest::Unpush => unpush(update),
        UpdateRequest::Obsolete => Ok(obsolete(update, None, &config.system_user, now)),
        UpdateRequest::Testing | UpdateRequest::Stable => request_push(update, action, config),
    }
}

fn request_push(
    update: &mut Update,
    action: UpdateRequest,
    config: &EngineConfig,
) -> Result<Transition, EngineError> {
    if update.status.as_str() == action.as_str() {
        return Err(EngineError::AlreadyInState {
            title: update.title.clone(),
            status: update.status,
        });
    }
    if update.request == Some(action) {
        return Err(EngineError::AlreadyRequested {
            title: update.title.clone(),
            request: action,
        });
    }
    if update.status == UpdateStatus::Stable {
        return Err(EngineError::CannotModifyStable {
            title: update.title.clone(),
            action: action.to_string(),
        });
    }

    if action == UpdateRequest::Stable
        && update.update_type == UpdateType::Security
        && update.approved.is_none()
    {
        let security_notice = vec![(
            Recipient::SecurityTeam(config.security_team.clone()),
            NotificationKind::Security,
        )];
        if update.status == UpdateStatus::Testing {
            info!(
                "{} requested stable without security approval; left in testing",
                update.title
            );
            return Ok(Transition {
                message: format!(
                    "{} remains in testing while it awaits approval of the Security Team",
                    update.title
                ),
                changed: false,
                notices: security_notice,
            });
        }
        update.request = Some(UpdateRequest::Testing);
        update.pushed = false;
        update.date_pushed = None;
        info!(
            "{} requested stable without security approval; holding in testing",
            update.title
        );
        return Ok(Transition {
            message: format!(
                "{} will be pushed to testing while it awaits approval of the Security Team",
                update.title
            ),
            changed: true,
            notices: security_notice,
        });
    }

    update.request = Some(action);
    update.pushed = false;
    update.date_pushed = None;
    info!("{} has been submitted for {action}", update.title);
    Ok(Transition {
        message: format!("{} has been submitted for {action}", update.title),
        changed: true,
        notices: vec![(Recipient::Admins, request_kind(action))],
    })
}

/// Pull an update out of the repositories immediately.
pub fn unpush(update: &mut Update) -> Result<Transition, EngineError> {
    if update.status == UpdateStatus::Unpushed {
        return Ok(Transition::unchanged(format!(
            "{} is already unpushed",
            update.title
        )));
    }
    if update.status == UpdateStatus::Stable {
        return Err(EngineError::CannotModifyStable {
            title: update.title.clone(),
            action: UpdateRequest::Unpush.to_string(),
        });
    }

    update.status = UpdateStatus::Unpushed;
    update.request = None;
    update.pushed = false;
    update.date_pushed = None;
    info!("{} has been unpushed", update.title);
    Ok(Transition {
        message: format!("{} has been unpushed", update.title),
        changed: true,
        notices: vec![(Recipient::Admins, NotificationKind::Unpush)],
    })
}

/// Retire an update, optionally naming the build that superseded it.
pub fn obsolete(
    update: &mut Update,
    newer: Option<&str>,
    system_user: &str,
    now: DateTime<Utc>,
) -> Transition {
    if update.status == UpdateStatus::Obsolete {
        return Transition::unchanged(format!("{} is already obsolete", update.title));
    }

    update.status = UpdateStatus::Obsolete;
    update.request = None;
    if let Some(newer) = newer {
        update.add_comment(Comment {
            author: system_user.to_string(),
            text: Some(format!("This update has been obsoleted by {newer}")),
            karma: 0,
            anonymous: false,
            timestamp: now,
        });
    }
    info!("{} has been obsoleted", update.title);
    Transition {
        message: format!("{} has been obsoleted", update.title),
        changed: true,
        notices: vec![(
            Recipient::User(update.submitter.clone()),
            NotificationKind::Obsolete,
        )],
    }
}

/// Withdraw the outstanding request without touching status.
pub fn revoke(update: &mut Update) -> Result<Transition, EngineError> {
    let Some(request) = update.request.take() else {
        return Err(EngineError::NoOutstandingRequest(update.title.clone()));
    };
    info!("{} request {request} revoked", update.title);
    Ok(Transition {
        message: format!("{} {request} request revoked", update.title),
        changed: true,
        notices: vec![(Recipient::Admins, NotificationKind::Revoke)],
    })
}
