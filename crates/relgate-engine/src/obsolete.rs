//! Obsoletion of superseded pending and testing updates.

use chrono::{DateTime, Utc};
use relgate_model::{Nvr, UpdateStatus, UpdateStore};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

use crate::collaborators::VersionComparator;
use crate::error::EngineError;
use crate::transition::{self, Transition};

/// An update retired because a newer build arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obsoleted {
    pub update_id: String,
    pub title: String,
    /// The older build that triggered the obsoletion.
    pub nvr: String,
    /// Bug references to carry over to the superseding update.
    pub bugs: BTreeSet<u64>,
    /// CVE references to carry over alongside the bugs.
    pub cves: BTreeSet<String>,
    pub transition: Transition,
}

/// Retire every update on `release` whose build of the same package is
/// older than `candidate`.
///
/// Only idle updates qualify: pending or testing, with no request. The
/// update identified by `exclude` is never touched. Matches are collected
/// before any is retired, so one pass never cascades.
pub fn obsolete_older_builds(
    store: &mut UpdateStore,
    candidate: &Nvr,
    release: &str,
    exclude: Option<&str>,
    comparator: &dyn VersionComparator,
    system_user: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Obsoleted>, EngineError> {
    let candidate_evr = candidate.evr();
    let candidate_nvr = candidate.to_string();

    let mut targets: Vec<(String, String)> = Vec::new();
    for build in store.builds_of_package(&candidate.name) {
        let Some(update_id) = build.update_id.as_deref() else {
            continue;
        };
        if exclude == Some(update_id) || targets.iter().any(|(id, _)| id == update_id) {
            continue;
        }
        let Some(update) = store.update(update_id) else {
            continue;
        };
        if !matches!(update.status, UpdateStatus::Pending | UpdateStatus::Testing) {
            continue;
        }
        if update.release != release {
            debug!("skipping obsoletion of {} on release {}", build.nvr, update.release);
            continue;
        }
        if update.request.is_some() {
            continue;
        }

        let existing = Nvr::parse(&build.nvr).map_err(|err| EngineError::InvalidBuild {
            build: build.nvr.clone(),
            reason: err.to_string(),
        })?;
        if comparator.compare(&existing.evr(), &candidate_evr) == Ordering::Less {
            targets.push((update_id.to_string(), build.nvr.clone()));
        }
    }

    let mut obsoleted = Vec::with_capacity(targets.len());
    for (update_id, nvr) in targets {
        let update = store
            .update_mut(&update_id)
            .ok_or_else(|| EngineError::not_found("update", update_id.clone()))?;
        debug!("obsoleting {nvr} in favour of {candidate_nvr}");
        let transition = transition::obsolete(update, Some(&candidate_nvr), system_user, now);
        obsoleted.push(Obsoleted {
            update_id,
            title: update.title.clone(),
            nvr,
            bugs: update.bugs.clone(),
            cves: update.cves.clone(),
            transition,
        });
    }
    Ok(obsoleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::RpmVersionComparator;
    use chrono::TimeZone;
    use relgate_model::{Build, Update, UpdateRequest, UpdateType};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("fixed time")
    }

    fn seed(store: &mut UpdateStore, nvr: &str, release: &str) -> String {
        let nvr_parts = Nvr::parse(nvr).expect("nvr");
        let mut update = Update::new(vec![nvr.to_string()], release, UpdateType::Bugfix, "alice", now());
        update.bugs.insert(100);
        update.cves.insert("CVE-2014-0160".to_string());
        let id = update.id.clone();
        store.ensure_package(&nvr_parts.name);
        store.insert_build(Build::new(nvr, nvr_parts.name.clone())).expect("build");
        store.insert_update(update).expect("update");
        store.attach_build(nvr, &id).expect("attach");
        id
    }

    fn run(store: &mut UpdateStore, candidate: &str, release: &str) -> Vec<Obsoleted> {
        obsolete_older_builds(
            store,
            &Nvr::parse(candidate).expect("nvr"),
            release,
            None,
            &RpmVersionComparator,
            "relgate",
            now(),
        )
        .expect("obsoletion should not fail")
    }

    #[test]
    fn older_idle_update_is_obsoleted_with_its_bugs_and_cves() {
        let mut store = UpdateStore::default();
        let old = seed(&mut store, "foo-1.0-1", "F20");

        let obsoleted = run(&mut store, "foo-1.1-1", "F20");
        assert_eq!(obsoleted.len(), 1);
        assert_eq!(obsoleted[0].update_id, old);
        assert_eq!(obsoleted[0].nvr, "foo-1.0-1");
        assert_eq!(obsoleted[0].bugs, BTreeSet::from([100]));
        assert_eq!(obsoleted[0].cves, BTreeSet::from(["CVE-2014-0160".to_string()]));

        let update = store.update(&old).expect("old update");
        assert_eq!(update.status, UpdateStatus::Obsolete);
        assert_eq!(
            update.comments.last().and_then(|c| c.text.as_deref()),
            Some("This update has been obsoleted by foo-1.1-1")
        );
    }

    #[test]
    fn other_releases_requests_and_newer_builds_are_left_alone() {
        let mut store = UpdateStore::default();
        let other_release = seed(&mut store, "foo-1.0-1.fc19", "F19");
        let requested = seed(&mut store, "foo-1.0-2", "F20");
        store
            .update_mut(&requested)
            .expect("update")
            .request = Some(UpdateRequest::Testing);
        let newer = seed(&mut store, "foo-2.0-1", "F20");

        let obsoleted = run(&mut store, "foo-1.1-1", "F20");
        assert!(obsoleted.is_empty());
        for id in [other_release, requested, newer] {
            assert_ne!(store.update(&id).expect("update").status, UpdateStatus::Obsolete);
        }
    }

    #[test]
    fn stable_and_excluded_updates_are_skipped() {
        let mut store = UpdateStore::default();
        let stable = seed(&mut store, "foo-1.0-1", "F20");
        store.update_mut(&stable).expect("update").status = UpdateStatus::Stable;
        let edited = seed(&mut store, "foo-1.0-2", "F20");

        let obsoleted = obsolete_older_builds(
            &mut store,
            &Nvr::parse("foo-1.1-1").expect("nvr"),
            "F20",
            Some(&edited),
            &RpmVersionComparator,
            "relgate",
            now(),
        )
        .expect("obsoletion");
        assert!(obsoleted.is_empty());
    }
}
