//! Canonical in-memory representation of release/update state.
//!
//! This is the memory boundary for `relgate-model`:
//! - load/store JSONL
//! - enforce record-level uniqueness (build NVRs, update titles)
//! - answer typed queries deterministically

use crate::jsonl::{JsonlError, StoreRecord, read_records_from_path, write_records_to_path};
use crate::package::{Build, Package};
use crate::query::UpdateQuery;
use crate::release::Release;
use crate::update::{Bugzilla, Update};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors raised while loading or mutating the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("release not found: {0}")]
    ReleaseNotFound(String),

    #[error("update not found: {0}")]
    UpdateNotFound(String),

    #[error("build not found: {0}")]
    BuildNotFound(String),

    #[error("update for {0} already exists")]
    DuplicateBuild(String),

    #[error("update {0} already exists")]
    DuplicateUpdate(String),
}

/// Canonical in-memory state for releases, packages, bugs, builds and updates.
#[derive(Debug, Clone, Default)]
pub struct UpdateStore {
    releases: BTreeMap<String, Release>,
    packages: BTreeMap<String, Package>,
    bugs: BTreeMap<u64, Bugzilla>,
    builds: BTreeMap<String, Build>,
    updates: BTreeMap<String, Update>,
}

impl UpdateStore {
    /// Build a store from fully-materialized records.
    ///
    /// Duplicate keys resolve last-write-wins, matching append/overlay
    /// behavior when records are concatenated.
    pub fn from_records(records: Vec<StoreRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            match record {
                StoreRecord::Release(release) => {
                    store.releases.insert(release.name.clone(), release);
                }
                StoreRecord::Package(package) => {
                    store.packages.insert(package.name.clone(), package);
                }
                StoreRecord::Bug(bug) => {
                    store.bugs.insert(bug.bz_id, bug);
                }
                StoreRecord::Build(build) => {
                    store.builds.insert(build.nvr.clone(), build);
                }
                StoreRecord::Update(update) => {
                    store.updates.insert(update.id.clone(), *update);
                }
            }
        }
        store
    }

    /// Snapshot as records in deterministic order.
    pub fn records(&self) -> Vec<StoreRecord> {
        let mut records = Vec::with_capacity(
            self.releases.len()
                + self.packages.len()
                + self.bugs.len()
                + self.builds.len()
                + self.updates.len(),
        );
        records.extend(self.releases.values().cloned().map(StoreRecord::Release));
        records.extend(self.packages.values().cloned().map(StoreRecord::Package));
        records.extend(self.bugs.values().cloned().map(StoreRecord::Bug));
        records.extend(self.builds.values().cloned().map(StoreRecord::Build));
        records.extend(
            self.updates
                .values()
                .cloned()
                .map(|u| StoreRecord::Update(Box::new(u))),
        );
        records
    }

    /// Load store state from a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let records = read_records_from_path(path)?;
        Ok(Self::from_records(records))
    }

    /// Persist store state to a JSONL file.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        write_records_to_path(path, &self.records())?;
        Ok(())
    }

    // ── Releases ──

    /// Lookup a release by short or long name.
    pub fn release(&self, key: &str) -> Option<&Release> {
        self.releases
            .get(key)
            .or_else(|| self.releases.values().find(|r| r.matches(key)))
    }

    pub fn upsert_release(&mut self, release: Release) -> Option<Release> {
        self.releases.insert(release.name.clone(), release)
    }

    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    pub fn dist_tags(&self) -> Vec<String> {
        self.releases.values().map(|r| r.dist_tag.clone()).collect()
    }

    // ── Packages ──

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Fetch a package, creating it when absent.
    pub fn ensure_package(&mut self, name: &str) -> &mut Package {
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| Package::new(name))
    }

    // ── Bugs ──

    pub fn bug(&self, bz_id: u64) -> Option<&Bugzilla> {
        self.bugs.get(&bz_id)
    }

    pub fn upsert_bug(&mut self, bug: Bugzilla) {
        self.bugs.insert(bug.bz_id, bug);
    }

    // ── Builds ──

    pub fn build(&self, nvr: &str) -> Option<&Build> {
        self.builds.get(nvr)
    }

    /// Insert a new build. NVRs are unique across the store.
    pub fn insert_build(&mut self, build: Build) -> Result<(), StoreError> {
        if self.builds.contains_key(&build.nvr) {
            return Err(StoreError::DuplicateBuild(build.nvr));
        }
        self.builds.insert(build.nvr.clone(), build);
        Ok(())
    }

    pub fn remove_build(&mut self, nvr: &str) -> Option<Build> {
        self.builds.remove(nvr)
    }

    /// Point an existing build at its owning update.
    pub fn attach_build(&mut self, nvr: &str, update_id: &str) -> Result<(), StoreError> {
        let build = self
            .builds
            .get_mut(nvr)
            .ok_or_else(|| StoreError::BuildNotFound(nvr.to_string()))?;
        build.update_id = Some(update_id.to_string());
        Ok(())
    }

    /// Builds of `package` in NVR order.
    pub fn builds_of_package<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a Build> {
        self.builds.values().filter(move |b| b.package == package)
    }

    // ── Updates ──

    pub fn update(&self, id: &str) -> Option<&Update> {
        self.updates.get(id)
    }

    pub fn update_mut(&mut self, id: &str) -> Option<&mut Update> {
        self.updates.get_mut(id)
    }

    pub fn update_by_title(&self, title: &str) -> Option<&Update> {
        self.updates.values().find(|u| u.title == title)
    }

    /// Resolve a title to its update id.
    pub fn update_id_by_title(&self, title: &str) -> Result<String, StoreError> {
        self.update_by_title(title)
            .map(|u| u.id.clone())
            .ok_or_else(|| StoreError::UpdateNotFound(title.to_string()))
    }

    /// Owning update of a build, if attached.
    pub fn update_for_build(&self, nvr: &str) -> Option<&Update> {
        self.build(nvr)
            .and_then(|b| b.update_id.as_deref())
            .and_then(|id| self.update(id))
    }

    /// Insert a new update. Titles are unique across the store.
    pub fn insert_update(&mut self, update: Update) -> Result<(), StoreError> {
        if self.update_by_title(&update.title).is_some() {
            return Err(StoreError::DuplicateUpdate(update.title));
        }
        self.updates.insert(update.id.clone(), update);
        Ok(())
    }

    /// Remove an update together with its builds.
    pub fn remove_update(&mut self, id: &str) -> Option<Update> {
        let update = self.updates.remove(id)?;
        self.builds
            .retain(|_, build| build.update_id.as_deref() != Some(id));
        Some(update)
    }

    pub fn updates(&self) -> impl Iterator<Item = &Update> {
        self.updates.values()
    }

    /// Run a typed query; newest submissions first, ties broken by title.
    pub fn query(&self, query: &UpdateQuery) -> Vec<&Update> {
        let mut rows: Vec<&Update> = self
            .updates
            .values()
            .filter(|u| query.matches_record(u))
            .filter(|u| {
                query
                    .package
                    .as_ref()
                    .is_none_or(|key| self.update_matches_package(u, key))
            })
            .collect();
        rows.sort_by(|a, b| {
            b.date_submitted
                .cmp(&a.date_submitted)
                .then_with(|| a.title.cmp(&b.title))
        });
        rows
    }

    fn update_matches_package(&self, update: &Update, key: &str) -> bool {
        update.title == key
            || update.has_build(key)
            || update
                .builds
                .iter()
                .filter_map(|nvr| self.build(nvr))
                .any(|b| b.package == key)
    }
}
