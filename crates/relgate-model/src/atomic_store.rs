//! Lock-scoped units of work over the update store.
//!
//! A mutation runs against a private working copy. The copy replaces the
//! committed state only when the mutator returns `Ok((_, true))`; any error
//! drops it, so a failed unit of work leaves no trace.

use crate::{StoreError, UpdateStore};
use chrono::Utc;
use std::error::Error as StdError;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const DEFAULT_LOCK_ATTEMPTS: u32 = 50;
pub const DEFAULT_LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

pub fn store_lock_path(store_path: &Path) -> PathBuf {
    let mut path: OsString = store_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

#[derive(Debug)]
pub enum AtomicStoreMutationError<E> {
    LockBusy { lock_path: String },
    LockIo { lock_path: String, message: String },
    Poisoned,
    Store(StoreError),
    Mutation(E),
}

impl<E> AtomicStoreMutationError<E> {
    fn lock_busy(lock_path: &Path) -> Self {
        Self::LockBusy {
            lock_path: lock_path.display().to_string(),
        }
    }

    fn lock_io(lock_path: &Path, message: impl Into<String>) -> Self {
        Self::LockIo {
            lock_path: lock_path.display().to_string(),
            message: message.into(),
        }
    }
}

impl<E: Display> Display for AtomicStoreMutationError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockBusy { lock_path } => write!(f, "update store lock busy: {lock_path}"),
            Self::LockIo { lock_path, message } => {
                write!(f, "failed to acquire update store lock {lock_path}: {message}")
            }
            Self::Poisoned => write!(f, "update store lock poisoned by a panicked writer"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Mutation(err) => write!(f, "{err}"),
        }
    }
}

impl<E> StdError for AtomicStoreMutationError<E> where
    E: Display + std::fmt::Debug + StdError + 'static
{
}

/// Storage seam for the engine: consistent reads and atomic units of work.
pub trait UpdateRepository: Send + Sync {
    /// Run `reader` against the committed state.
    fn read<T>(&self, reader: impl FnOnce(&UpdateStore) -> T) -> Result<T, StoreError>;

    /// Execute one unit of work.
    ///
    /// The mutator returns `(value, changed)` where:
    /// - `value` is returned to the caller
    /// - `changed=true` commits the working copy
    fn mutate<T, E, F>(&self, mutator: F) -> Result<T, AtomicStoreMutationError<E>>
    where
        F: FnOnce(&mut UpdateStore) -> Result<(T, bool), E>;
}

/// Process-local repository guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<UpdateStore>,
}

impl MemoryRepository {
    pub fn new(store: UpdateStore) -> Self {
        Self {
            state: Mutex::new(store),
        }
    }
}

impl UpdateRepository for MemoryRepository {
    fn read<T>(&self, reader: impl FnOnce(&UpdateStore) -> T) -> Result<T, StoreError> {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(reader(&guard))
    }

    fn mutate<T, E, F>(&self, mutator: F) -> Result<T, AtomicStoreMutationError<E>>
    where
        F: FnOnce(&mut UpdateStore) -> Result<(T, bool), E>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| AtomicStoreMutationError::Poisoned)?;
        let mut working = guard.clone();
        let (value, changed) = mutator(&mut working).map_err(AtomicStoreMutationError::Mutation)?;
        if changed {
            *guard = working;
        }
        Ok(value)
    }
}

/// Repository persisted as a JSONL snapshot, serialized by a sibling lock file.
#[derive(Debug, Clone)]
pub struct JsonlRepository {
    path: PathBuf,
    lock_attempts: u32,
    lock_retry_delay: Duration,
}

impl JsonlRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_attempts: DEFAULT_LOCK_ATTEMPTS,
            lock_retry_delay: DEFAULT_LOCK_RETRY_DELAY,
        }
    }

    /// Fail on the first busy lock instead of waiting.
    pub fn without_lock_wait(mut self) -> Self {
        self.lock_attempts = 1;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<UpdateStore, StoreError> {
        if self.path.exists() {
            UpdateStore::load_jsonl(&self.path)
        } else {
            Ok(UpdateStore::default())
        }
    }
}

impl UpdateRepository for JsonlRepository {
    fn read<T>(&self, reader: impl FnOnce(&UpdateStore) -> T) -> Result<T, StoreError> {
        let store = self.load()?;
        Ok(reader(&store))
    }

    fn mutate<T, E, F>(&self, mutator: F) -> Result<T, AtomicStoreMutationError<E>>
    where
        F: FnOnce(&mut UpdateStore) -> Result<(T, bool), E>,
    {
        let lock_path = store_lock_path(&self.path);
        let _lock = SnapshotLock::acquire(&lock_path, self.lock_attempts, self.lock_retry_delay)
            .map_err(|failure| match failure {
                LockFailure::Busy => AtomicStoreMutationError::lock_busy(&lock_path),
                LockFailure::Io(message) => AtomicStoreMutationError::lock_io(&lock_path, message),
            })?;

        let mut store = self.load().map_err(AtomicStoreMutationError::Store)?;
        let (value, changed) = mutator(&mut store).map_err(AtomicStoreMutationError::Mutation)?;
        if changed {
            store
                .save_jsonl(&self.path)
                .map_err(AtomicStoreMutationError::Store)?;
        }
        Ok(value)
    }
}

enum LockFailure {
    Busy,
    Io(String),
}

/// Writer lock on one update store snapshot.
///
/// Held from before the snapshot is loaded until after the replacement is
/// renamed into place, so concurrent submissions serialize on it. The
/// `<store>.lock` marker names the holding process; dropping the lock
/// removes it.
struct SnapshotLock {
    marker: PathBuf,
    _handle: File,
}

impl SnapshotLock {
    fn acquire(marker: &Path, attempts: u32, delay: Duration) -> Result<Self, LockFailure> {
        if let Some(dir) = marker.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| LockFailure::Io(e.to_string()))?;
        }

        for attempt in 1..=attempts.max(1) {
            match OpenOptions::new().write(true).create_new(true).open(marker) {
                Ok(mut handle) => {
                    let _ = writeln!(
                        handle,
                        "holder={} since={}",
                        std::process::id(),
                        Utc::now().to_rfc3339()
                    );
                    return Ok(Self {
                        marker: marker.to_path_buf(),
                        _handle: handle,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    if attempt < attempts {
                        std::thread::sleep(delay);
                    }
                }
                Err(err) => return Err(LockFailure::Io(err.to_string())),
            }
        }
        Err(LockFailure::Busy)
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.marker);
    }
}
