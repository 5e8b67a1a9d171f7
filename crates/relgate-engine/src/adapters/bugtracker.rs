use relgate_model::Update;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::{AdapterError, load_json};
use crate::collaborators::{BugDetails, BugTracker, BugTrackerError};

/// Bug tracker over a fixed set of bugs; comments are kept and logged.
///
/// Loaded from a JSON map of bug id to `{title, security}`.
#[derive(Debug, Default)]
pub struct MemoryBugTracker {
    bugs: BTreeMap<u64, BugDetails>,
    comments: Mutex<Vec<(u64, String)>>,
}

impl MemoryBugTracker {
    pub fn new(bugs: BTreeMap<u64, BugDetails>) -> Self {
        Self {
            bugs,
            comments: Mutex::new(Vec::new()),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        Ok(Self::new(load_json(path.as_ref())?))
    }

    pub fn with_bug(mut self, bz_id: u64, title: &str, security: bool) -> Self {
        self.bugs.insert(
            bz_id,
            BugDetails {
                title: title.to_string(),
                security,
            },
        );
        self
    }

    /// Comments posted so far, as `(bug, text)`.
    pub fn comments(&self) -> Vec<(u64, String)> {
        self.comments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl BugTracker for MemoryBugTracker {
    fn bug_details(&self, bz_id: u64) -> Result<BugDetails, BugTrackerError> {
        self.bugs
            .get(&bz_id)
            .cloned()
            .ok_or(BugTrackerError::UnknownBug(bz_id))
    }

    fn add_comment(&self, bz_id: u64, update: &Update, text: &str) -> Result<(), BugTrackerError> {
        if !self.bugs.contains_key(&bz_id) {
            return Err(BugTrackerError::UnknownBug(bz_id));
        }
        info!("bug {bz_id} ({}): {text}", update.title);
        self.comments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((bz_id, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_map_parses_from_json() {
        let bugs: BTreeMap<u64, BugDetails> = serde_json::from_str(
            r#"{"1001": {"title": "heap overflow", "security": true}, "1002": {}}"#,
        )
        .expect("bug json");
        let tracker = MemoryBugTracker::new(bugs);

        assert!(tracker.bug_details(1001).expect("known").security);
        assert_eq!(tracker.bug_details(1002).expect("known"), BugDetails::default());
        assert_eq!(tracker.bug_details(7), Err(BugTrackerError::UnknownBug(7)));
    }
}
