//! Submission coordinator: creation and editing of updates.
//!
//! Every external lookup (ACLs, build tags, update paths, bug details)
//! happens before the unit of work. The unit of work then runs against a
//! working copy of the store, so a failure at any step leaves nothing
//! behind: no builds, no packages, no obsoletions.

use chrono::{DateTime, Utc};
use relgate_model::{
    Build, Bugzilla, Nvr, PackageAcl, Release, Update, UpdateRepository, UpdateRequest,
    UpdateStatus, UpdateStore, UpdateType, is_cve_id,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::collaborators::{NotificationKind, Recipient};
use crate::engine::{Effect, Engine};
use crate::error::EngineError;
use crate::fanout::try_map_concurrent;
use crate::identity::{Identity, require_authorized};
use crate::obsolete::obsolete_older_builds;
use crate::tag_validator::validate_build_tags;
use crate::transition::{self, apply_request};
use crate::update_path::UpdatePathChecker;

/// The submission form: a new update, or an edit of `edited`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Build NVRs; entries may themselves be comma or space separated.
    pub builds: Vec<String>,
    pub release: String,
    pub update_type: UpdateType,
    pub notes: String,
    pub bugs: Vec<u64>,
    pub cves: Vec<String>,
    pub close_bugs: bool,
    pub suggest_reboot: bool,
    /// Title of the update being edited.
    pub edited: Option<String>,
    /// Request applied after creation; `None` leaves the update idle.
    pub request: Option<UpdateRequest>,
}

impl SubmitRequest {
    /// A new update requested for testing.
    pub fn new(builds: Vec<String>, release: impl Into<String>, update_type: UpdateType) -> Self {
        Self {
            builds,
            release: release.into(),
            update_type,
            notes: String::new(),
            bugs: Vec::new(),
            cves: Vec::new(),
            close_bugs: true,
            suggest_reboot: false,
            edited: None,
            request: Some(UpdateRequest::Testing),
        }
    }

    pub fn editing(mut self, title: impl Into<String>) -> Self {
        self.edited = Some(title.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub update: Update,
    /// Messages for the submitter, most important first.
    pub notes: Vec<String>,
    /// Titles of updates retired by this submission.
    pub obsoleted: Vec<String>,
    pub created: bool,
}

/// Parsed and de-duplicated build list.
fn normalize_builds(raw: &[String]) -> Result<Vec<Nvr>, EngineError> {
    let mut seen = BTreeSet::new();
    let mut builds = Vec::new();
    for entry in raw
        .iter()
        .flat_map(|b| b.split([',', ' ', '\t', '\n']))
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        let nvr = Nvr::parse(entry).map_err(|err| EngineError::InvalidBuild {
            build: entry.to_string(),
            reason: err.to_string(),
        })?;
        if !seen.insert(entry.to_string()) {
            return Err(EngineError::DuplicateBuild(entry.to_string()));
        }
        builds.push(nvr);
    }
    if builds.is_empty() {
        return Err(EngineError::NoBuilds);
    }
    Ok(builds)
}

fn normalize_cves(raw: &[String]) -> Result<BTreeSet<String>, EngineError> {
    raw.iter()
        .map(|cve| cve.trim().to_ascii_uppercase())
        .filter(|cve| !cve.is_empty())
        .map(|cve| {
            if is_cve_id(&cve) {
                Ok(cve)
            } else {
                Err(EngineError::InvalidCve(cve))
            }
        })
        .collect()
}

/// Everything learned from the outside world before the unit of work.
struct Validated {
    release: Release,
    builds: Vec<Nvr>,
    cves: BTreeSet<String>,
    acls: BTreeMap<String, PackageAcl>,
    bug_details: BTreeMap<u64, Bugzilla>,
    edited_id: Option<String>,
}

struct Committed {
    outcome: SubmitOutcome,
    effects: Vec<Effect>,
}

impl<R: UpdateRepository> Engine<R> {
    /// Create or edit an update.
    ///
    /// The request is borrowed so the caller keeps the form values for
    /// resubmission after a rejection.
    pub fn submit(
        &self,
        identity: &Identity,
        request: &SubmitRequest,
    ) -> Result<SubmitOutcome, EngineError> {
        let validated = self.validate_submission(identity, request)?;
        let now = Utc::now();
        let committed = self
            .repo
            .mutate(|store| {
                self.commit_submission(store, identity, request, &validated, now)
                    .map(|committed| (committed, true))
            })?;

        let update = &committed.outcome.update;
        if committed.outcome.created {
            info!("created update {} for {}", update.title, update.release);
        } else {
            info!("edited update {}", update.title);
        }
        self.dispatch(committed.effects);
        Ok(committed.outcome)
    }

    fn validate_submission(
        &self,
        identity: &Identity,
        request: &SubmitRequest,
    ) -> Result<Validated, EngineError> {
        let builds = normalize_builds(&request.builds)?;
        let cves = normalize_cves(&request.cves)?;

        let (release, edited, known_bugs) = self.repo.read(|store| {
            let release = store.release(&request.release).cloned();
            let edited = request
                .edited
                .as_deref()
                .map(|title| store.update_by_title(title).cloned());
            let known: BTreeSet<u64> = request
                .bugs
                .iter()
                .copied()
                .filter(|id| store.bug(*id).is_some())
                .collect();
            (release, edited, known)
        })?;
        let release = release.ok_or_else(|| EngineError::not_found("release", &request.release))?;
        let edited = match (edited, request.edited.as_deref()) {
            (Some(Some(update)), _) => Some(update),
            (Some(None), Some(title)) => return Err(EngineError::not_found("update", title)),
            _ => None,
        };
        if let Some(update) = &edited {
            require_authorized(identity, update, &self.config, "edit")?;
        }

        let acls = self.check_commit_access(identity, &release, &builds)?;

        let nvrs: Vec<String> = builds.iter().map(Nvr::to_string).collect();
        validate_build_tags(
            self.collaborators.build_system.as_ref(),
            &release,
            &nvrs,
            edited.as_ref(),
        )?;

        let checker = UpdatePathChecker::new(
            self.collaborators.build_system.as_ref(),
            self.collaborators.comparator.as_ref(),
            self.config.max_release_walk,
        );
        try_map_concurrent(&nvrs, |nvr| checker.check(&release, nvr))?;

        let unknown: Vec<u64> = request
            .bugs
            .iter()
            .copied()
            .filter(|id| !known_bugs.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let bug_details = try_map_concurrent(&unknown, |bz_id| Ok(self.fetch_bug(*bz_id)))?
            .into_iter()
            .map(|bug| (bug.bz_id, bug))
            .collect();

        Ok(Validated {
            release,
            builds,
            cves,
            acls,
            bug_details,
            edited_id: edited.map(|u| u.id),
        })
    }

    /// Every named package must be committable by the submitter unless the
    /// submitter holds a privileged group.
    fn check_commit_access(
        &self,
        identity: &Identity,
        release: &Release,
        builds: &[Nvr],
    ) -> Result<BTreeMap<String, PackageAcl>, EngineError> {
        let packages: Vec<String> = builds
            .iter()
            .map(|nvr| nvr.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let branch = release.acl_branch();
        let privileged = identity.in_any_group(&self.config.privileged_groups);

        let acls = try_map_concurrent(&packages, |package| {
            debug!("checking commit access to {package} on {} {}", branch.0, branch.1);
            let acl = self
                .collaborators
                .acl
                .pushers_for(package, &branch)
                .map_err(|err| EngineError::AclLookup {
                    package: package.clone(),
                    reason: err.to_string(),
                })?;
            if !privileged && !acl.allows(&identity.user, &identity.groups) {
                return Err(EngineError::unauthorized(
                    identity.user.clone(),
                    "commit to",
                    package.clone(),
                ));
            }
            Ok((package.clone(), acl))
        })?;
        Ok(acls.into_iter().collect())
    }

    fn fetch_bug(&self, bz_id: u64) -> Bugzilla {
        match self.collaborators.bug_tracker.bug_details(bz_id) {
            Ok(details) => Bugzilla {
                bz_id,
                title: details.title,
                security: details.security,
            },
            Err(err) => {
                warn!("unable to fetch details of bug {bz_id}: {err}");
                Bugzilla {
                    bz_id,
                    title: String::new(),
                    security: false,
                }
            }
        }
    }

    fn commit_submission(
        &self,
        store: &mut UpdateStore,
        identity: &Identity,
        request: &SubmitRequest,
        validated: &Validated,
        now: DateTime<Utc>,
    ) -> Result<Committed, EngineError> {
        let release = &validated.release;
        let mut notes = Vec::new();
        let mut obsoleted = Vec::new();
        let mut effects = Vec::new();
        let mut bugs: BTreeSet<u64> = request.bugs.iter().copied().collect();
        let mut cves = validated.cves.clone();

        // Tear down the edited update's builds; they are re-created below.
        if let Some(id) = validated.edited_id.as_deref() {
            let update = store
                .update_mut(id)
                .ok_or_else(|| EngineError::not_found("update", id))?;
            match update.status {
                UpdateStatus::Stable => {
                    return Err(EngineError::CannotEditStable(update.title.clone()));
                }
                UpdateStatus::Testing => {
                    let unpushed = transition::unpush(update)?;
                    effects.extend(Effect::notices(update, &unpushed.notices));
                }
                _ => {}
            }
            for nvr in update.builds.clone() {
                store.remove_build(&nvr);
            }
        }

        let mut update = match validated.edited_id.as_deref() {
            Some(id) => store
                .update(id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("update", id))?,
            None => Update::new(
                Vec::new(),
                release.name.clone(),
                request.update_type,
                identity.user.clone(),
                now,
            ),
        };

        for nvr in &validated.builds {
            let package = store.ensure_package(&nvr.name);
            if request.suggest_reboot {
                package.suggest_reboot = true;
            }
            if let Some(acl) = validated.acls.get(&nvr.name) {
                package.acl = acl.clone();
            }
            store.insert_build(Build::new(nvr.to_string(), nvr.name.clone()))?;

            for retired in obsolete_older_builds(
                store,
                nvr,
                &release.name,
                Some(update.id.as_str()),
                self.collaborators.comparator.as_ref(),
                &self.config.system_user,
                now,
            )? {
                bugs.extend(retired.bugs.iter().copied());
                cves.extend(retired.cves.iter().cloned());
                notes.push(format!("This update has obsoleted {}", retired.nvr));
                if let Some(old) = store.update(&retired.update_id) {
                    effects.extend(Effect::notices(old, &retired.transition.notices));
                }
                obsoleted.push(retired.title);
            }
        }

        let titles: Vec<String> = validated.builds.iter().map(Nvr::to_string).collect();
        update.set_builds(titles);
        update.release = release.name.clone();
        update.notes = request.notes.clone();
        update.update_type = request.update_type;
        update.close_bugs = request.close_bugs;
        update.cves = cves;

        for bz_id in &bugs {
            if store.bug(*bz_id).is_none() {
                let bug = validated.bug_details.get(bz_id).cloned().unwrap_or(Bugzilla {
                    bz_id: *bz_id,
                    title: String::new(),
                    security: false,
                });
                store.upsert_bug(bug);
            }
        }
        if bugs
            .iter()
            .filter_map(|id| store.bug(*id))
            .any(|bug| bug.security)
        {
            update.update_type = UpdateType::Security;
        }
        update.bugs = bugs;

        let created = validated.edited_id.is_none();
        if created {
            store.insert_update(update.clone())?;
        } else {
            if update.status == UpdateStatus::Unpushed {
                update.status = UpdateStatus::Pending;
            }
            update.touch_modified(now);
            if let Some(other) = store.update_by_title(&update.title)
                && other.id != update.id
            {
                return Err(EngineError::DuplicateUpdate(update.title.clone()));
            }
        }
        for nvr in &update.builds {
            store.attach_build(nvr, &update.id)?;
        }

        if let Some(action) = request.request
            && update.request != Some(action)
        {
            match apply_request(&mut update, action, &self.config, now) {
                Ok(applied) => {
                    notes.push(applied.message);
                    effects.extend(Effect::notices(&update, &applied.notices));
                }
                Err(err) => notes.push(err.to_string()),
            }
        }

        let submitter = Recipient::User(update.submitter.clone());
        if created {
            if update.update_type == UpdateType::Security {
                effects.extend(Effect::notices(
                    &update,
                    &[(
                        Recipient::SecurityTeam(self.config.security_team.clone()),
                        NotificationKind::Security,
                    )],
                ));
            }
            effects.extend(Effect::notices(&update, &[(submitter, NotificationKind::New)]));
            for bz_id in &update.bugs {
                effects.push(Effect::BugComment {
                    bz_id: *bz_id,
                    update: Box::new(update.clone()),
                    text: format!(
                        "{} has been submitted as an update for {}",
                        update.title, release.long_name
                    ),
                });
            }
            notes.insert(0, "Update successfully created".to_string());
        } else {
            effects.extend(Effect::notices(&update, &[(submitter, NotificationKind::Edited)]));
            notes.insert(0, "Update successfully edited".to_string());
        }

        let stored = store
            .update_mut(&update.id)
            .ok_or_else(|| EngineError::not_found("update", update.id.clone()))?;
        *stored = update.clone();

        Ok(Committed {
            outcome: SubmitOutcome {
                update,
                notes,
                obsoleted,
                created,
            },
            effects,
        })
    }
}
