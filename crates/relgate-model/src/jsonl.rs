//! Update store snapshots as JSONL.
//!
//! Each line is one tagged record: `"kind"` is `release`, `package`, `bug`,
//! `build` or `update`. A snapshot is written in that order so a reader
//! meets every release before the updates that name it. Loading checks
//! that every attached build points at an update present in the same
//! snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::package::{Build, Package};
use crate::release::Release;
use crate::update::{Bugzilla, Update};

const RECORD_KINDS: [&str; 5] = ["release", "package", "bug", "build", "update"];

/// One persisted line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreRecord {
    Release(Release),
    Package(Package),
    Bug(Bugzilla),
    Build(Build),
    Update(Box<Update>),
}

impl StoreRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Release(_) => "release",
            Self::Package(_) => "package",
            Self::Bug(_) => "bug",
            Self::Build(_) => "build",
            Self::Update(_) => "update",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("line {line}: not a JSON object: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: record has no \"kind\"")]
    MissingKind { line: usize },

    #[error("line {line}: unknown record kind {kind:?}")]
    UnknownKind { line: usize, kind: String },

    #[error("line {line}: invalid {kind} record: {message}")]
    InvalidRecord {
        line: usize,
        kind: String,
        message: String,
    },

    #[error("cannot encode {kind} record: {message}")]
    Encode { kind: &'static str, message: String },

    #[error("corrupted store: {0}")]
    Corrupt(String),
}

impl JsonlError {
    fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

fn decode_line(line_no: usize, raw: &str) -> Result<StoreRecord, JsonlError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| JsonlError::Syntax {
        line: line_no,
        message: e.to_string(),
    })?;
    let kind = match value.get("kind") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(JsonlError::MissingKind { line: line_no }),
    };
    if !RECORD_KINDS.contains(&kind.as_str()) {
        return Err(JsonlError::UnknownKind {
            line: line_no,
            kind,
        });
    }
    serde_json::from_value(value).map_err(|e| JsonlError::InvalidRecord {
        line: line_no,
        kind,
        message: e.to_string(),
    })
}

/// Attached builds must name an update from the same snapshot.
fn check_build_owners(records: &[StoreRecord]) -> Result<(), JsonlError> {
    let update_ids: BTreeSet<&str> = records
        .iter()
        .filter_map(|record| match record {
            StoreRecord::Update(update) => Some(update.id.as_str()),
            _ => None,
        })
        .collect();
    for record in records {
        if let StoreRecord::Build(build) = record
            && let Some(owner) = build.update_id.as_deref()
            && !update_ids.contains(owner)
        {
            return Err(JsonlError::Corrupt(format!(
                "build {} belongs to missing update {owner}",
                build.nvr
            )));
        }
    }
    Ok(())
}

/// Decode a snapshot. Blank lines are ignored; line numbers in errors are
/// 1-based.
pub fn read_records(reader: impl BufRead) -> Result<Vec<StoreRecord>, JsonlError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            ErrorKind::InvalidData => {
                JsonlError::Corrupt(format!("line {}: not valid UTF-8", idx + 1))
            }
            _ => JsonlError::Io {
                path: format!("line {}", idx + 1),
                message: e.to_string(),
            },
        })?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(decode_line(idx + 1, line.trim())?);
    }
    check_build_owners(&records)?;
    Ok(records)
}

/// Encode records, one per line.
pub fn write_records(writer: &mut impl Write, records: &[StoreRecord]) -> Result<(), JsonlError> {
    writer
        .write_all(encode_snapshot(records)?.as_bytes())
        .map_err(|e| JsonlError::io(Path::new("<writer>"), e))
}

fn encode_snapshot(records: &[StoreRecord]) -> Result<String, JsonlError> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| JsonlError::Encode {
            kind: record.kind(),
            message: e.to_string(),
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<StoreRecord>, JsonlError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| JsonlError::io(path, e))?;
    read_records(std::io::BufReader::new(file)).map_err(|err| match err {
        JsonlError::Corrupt(message) => {
            JsonlError::Corrupt(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Replace the snapshot at `path`.
///
/// The whole snapshot is encoded before anything touches the disk, then
/// written to a sibling temp file, synced, renamed over `path`, and the
/// directory entry synced.
pub fn write_records_to_path(
    path: impl AsRef<Path>,
    records: &[StoreRecord],
) -> Result<(), JsonlError> {
    let path = path.as_ref();
    let encoded = encode_snapshot(records)?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf);
    if let Some(dir) = &dir {
        fs::create_dir_all(dir).map_err(|e| JsonlError::io(dir, e))?;
    }

    let tmp_path = sibling_temp_path(path);
    let staged = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(encoded.as_bytes())?;
        file.flush()?;
        file.sync_all()
    });
    if let Err(err) = staged.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(JsonlError::io(path, err));
    }

    if let Some(dir) = &dir {
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|e| JsonlError::io(dir, e))?;
    }
    Ok(())
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.jsonl".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}
