//! # relgate-model
//!
//! Record layer for distribution update state.
//!
//! This crate provides:
//! - `Release`, `Package`, `Build`, `Update` and their reference types
//! - NVR parsing and epoch-version-release values
//! - JSONL read/write (portable persistence)
//! - `UpdateStore` (canonical in-memory state) and typed `UpdateQuery`
//! - `UpdateRepository` units of work over memory or a JSONL file
//!
//! It intentionally knows nothing about build systems, version ordering
//! policy, or notification. Those concerns live in `relgate-engine`.
//!
//! ## Data model
//!
//! ```text
//! JSONL (on disk, one tagged record per line)
//!     ↕  hydrate / flush (under store.jsonl.lock)
//! UpdateStore (deterministic in-memory projection)
//! ```

pub mod atomic_store;
pub mod jsonl;
pub mod memory;
pub mod nvr;
pub mod package;
pub mod query;
pub mod release;
pub mod update;

pub use atomic_store::{
    AtomicStoreMutationError, DEFAULT_LOCK_ATTEMPTS, DEFAULT_LOCK_RETRY_DELAY, JsonlRepository,
    MemoryRepository, UpdateRepository, store_lock_path,
};
pub use jsonl::{
    JsonlError, StoreRecord, read_records, read_records_from_path, write_records,
    write_records_to_path,
};
pub use memory::{StoreError, UpdateStore};
pub use nvr::{Evr, Nvr, NvrError};
pub use package::{Build, Package, PackageAcl};
pub use query::UpdateQuery;
pub use release::Release;
pub use update::{
    Bugzilla, Comment, ParseValueError, Update, UpdateRequest, UpdateStatus, UpdateType,
    is_cve_id,
};
