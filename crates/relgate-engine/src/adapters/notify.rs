use chrono::{DateTime, Utc};
use relgate_model::{Update, UpdateRequest, UpdateStatus};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::collaborators::{NotificationKind, Notifier, NotifyError, Recipient};

/// One delivered notification, as recorded by the outbox and memory notifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentNotification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub title: String,
    pub release: String,
    pub status: UpdateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<UpdateRequest>,
    pub sent_at: DateTime<Utc>,
}

impl SentNotification {
    fn new(recipient: &Recipient, kind: NotificationKind, update: &Update) -> Self {
        Self {
            recipient: recipient.clone(),
            kind,
            title: update.title.clone(),
            release: update.release.clone(),
            status: update.status,
            request: update.request,
            sent_at: Utc::now(),
        }
    }
}

/// Writes notifications to the log and nowhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(
        &self,
        recipient: &Recipient,
        kind: NotificationKind,
        update: &Update,
    ) -> Result<(), NotifyError> {
        info!("notify {recipient}: {kind} {}", update.title);
        Ok(())
    }
}

/// Appends each notification as a JSON line for a mailer to pick up.
#[derive(Debug)]
pub struct OutboxNotifier {
    path: PathBuf,
    append: Mutex<()>,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Notifier for OutboxNotifier {
    fn send(
        &self,
        recipient: &Recipient,
        kind: NotificationKind,
        update: &Update,
    ) -> Result<(), NotifyError> {
        let mut line = serde_json::to_string(&SentNotification::new(recipient, kind, update))
            .map_err(|e| NotifyError(e.to_string()))?;
        line.push('\n');

        let _guard = self
            .append
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| NotifyError(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .map_err(|e| NotifyError(format!("{}: {e}", self.path.display())))
    }
}

/// Keeps notifications in memory; can be told to fail every send.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<SentNotification>>,
    failing: bool,
}

impl MemoryNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sent_to(&self, recipient: &Recipient) -> Vec<NotificationKind> {
        self.sent()
            .into_iter()
            .filter(|n| &n.recipient == recipient)
            .map(|n| n.kind)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn send(
        &self,
        recipient: &Recipient,
        kind: NotificationKind,
        update: &Update,
    ) -> Result<(), NotifyError> {
        if self.failing {
            return Err(NotifyError("mail relay unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentNotification::new(recipient, kind, update));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgate_model::UpdateType;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_outbox() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "relgate-outbox-{}-{nanos}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn outbox_appends_one_line_per_notification() {
        let path = temp_outbox();
        let outbox = OutboxNotifier::new(&path);
        let update = Update::new(
            vec!["foo-1.2-3".to_string()],
            "F20",
            UpdateType::Bugfix,
            "alice",
            Utc::now(),
        );

        outbox
            .send(&Recipient::User("alice".to_string()), NotificationKind::New, &update)
            .expect("first send");
        outbox
            .send(&Recipient::Admins, NotificationKind::Testing, &update)
            .expect("second send");

        let raw = fs::read_to_string(&path).expect("outbox should exist");
        let sent: Vec<SentNotification> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("outbox line"))
            .collect();
        let _ = fs::remove_file(&path);

        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].kind, NotificationKind::New);
        assert_eq!(sent[1].recipient, Recipient::Admins);
        assert_eq!(sent[1].title, "foo-1.2-3");
    }
}
