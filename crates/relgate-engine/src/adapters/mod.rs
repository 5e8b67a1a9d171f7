//! Concrete collaborators: fixtures for tests and the CLI, plus the
//! `koji` command-line client.

mod acl;
mod bugtracker;
mod buildsys;
mod notify;

pub use acl::FixtureAcl;
pub use bugtracker::MemoryBugTracker;
pub use buildsys::{BuildSystemFixture, FixtureBuildSystem, KojiCli};
pub use notify::{LogNotifier, MemoryNotifier, OutboxNotifier, SentNotification};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, AdapterError> {
    let raw = fs::read_to_string(path).map_err(|e| AdapterError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| AdapterError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
