use relgate_engine::adapters::{FixtureAcl, FixtureBuildSystem, MemoryBugTracker, MemoryNotifier};
use relgate_engine::{
    Collaborators, Engine, EngineConfig, EngineError, Identity, NotificationKind, Recipient,
    RpmVersionComparator, SubmitRequest,
};
use relgate_model::{
    MemoryRepository, Release, UpdateRepository, UpdateRequest, UpdateStatus, UpdateType,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};

struct Harness {
    engine: Engine<MemoryRepository>,
    koji: Arc<FixtureBuildSystem>,
    notifier: Arc<MemoryNotifier>,
    bugs: Arc<MemoryBugTracker>,
}

fn harness_with(notifier: MemoryNotifier) -> Harness {
    let koji = Arc::new(FixtureBuildSystem::default());
    for tag in ["f18", "f18-updates", "f19", "f19-updates", "f20", "f20-updates"] {
        koji.create_tag(tag);
    }
    let notifier = Arc::new(notifier);
    let bugs = Arc::new(
        MemoryBugTracker::default()
            .with_bug(100, "foo crashes on start", false)
            .with_bug(200, "foo leaks memory", false)
            .with_bug(300, "foo heap overflow", true),
    );
    let acl = FixtureAcl::default()
        .with_committer("foo", "alice")
        .with_committer("bar", "alice");

    let collaborators = Collaborators {
        build_system: koji.clone(),
        acl: Arc::new(acl),
        notifier: notifier.clone(),
        bug_tracker: bugs.clone(),
        comparator: Arc::new(RpmVersionComparator),
    };
    let engine = Engine::new(
        MemoryRepository::default(),
        collaborators,
        EngineConfig::default(),
    );
    engine
        .register_release(Release::new("F20", "Fedora 20", "f20"))
        .expect("register F20");
    engine
        .register_release(Release::new("F19", "Fedora 19", "f19"))
        .expect("register F19");

    Harness {
        engine,
        koji,
        notifier,
        bugs,
    }
}

fn harness() -> Harness {
    harness_with(MemoryNotifier::default())
}

fn alice() -> Identity {
    Identity::new("alice").with_group("packager")
}

fn releng() -> Identity {
    Identity::new("rel").with_group("releng")
}

fn candidate(h: &Harness, release: &str, nvr: &str) {
    h.koji.tag_build(&format!("{release}-updates-candidate"), nvr);
}

fn submit(builds: &str, release: &str) -> SubmitRequest {
    SubmitRequest::new(vec![builds.to_string()], release, UpdateType::Bugfix)
}

fn idle(builds: &str, release: &str) -> SubmitRequest {
    SubmitRequest {
        request: None,
        ..submit(builds, release)
    }
}

/// Move an update as the push process would.
fn mark_pushed(h: &Harness, title: &str, status: UpdateStatus) {
    h.engine
        .repository()
        .mutate(|store| {
            let id = store.update_id_by_title(title)?;
            let update = store.update_mut(&id).expect("update exists");
            update.status = status;
            update.request = None;
            update.pushed = true;
            Ok::<_, relgate_model::StoreError>(((), true))
        })
        .expect("push simulation");
}

fn build_count(h: &Harness) -> usize {
    h.engine
        .repository()
        .read(|store| store.builds_of_package("foo").count() + store.builds_of_package("bar").count())
        .expect("read store")
}

#[test]
fn untagged_build_is_rejected_until_tagged() {
    let h = harness();
    h.koji.add_build("foo-1.2-3");
    let request = submit("foo-1.2-3", "F20");

    let err = h.engine.submit(&alice(), &request).expect_err("untagged");
    assert_eq!(
        err,
        EngineError::UntaggedBuild {
            build: "foo-1.2-3".to_string(),
            tag: "f20-updates-candidate".to_string(),
        }
    );
    assert_eq!(build_count(&h), 0);
    assert_eq!(request.builds, vec!["foo-1.2-3".to_string()]);

    candidate(&h, "f20", "foo-1.2-3");
    let outcome = h.engine.submit(&alice(), &request).expect("tagged build");
    assert!(outcome.created);
    assert_eq!(outcome.update.status, UpdateStatus::Pending);
    assert_eq!(outcome.update.request, Some(UpdateRequest::Testing));
    assert_eq!(outcome.notes[0], "Update successfully created");
    assert_eq!(
        h.notifier.sent_to(&Recipient::User("alice".to_string())),
        vec![NotificationKind::New]
    );
    assert_eq!(
        h.notifier.sent_to(&Recipient::Admins),
        vec![NotificationKind::Testing]
    );

    let stored = h.engine.update("foo-1.2-3").expect("stored update");
    assert_eq!(stored.request, Some(UpdateRequest::Testing));
}

#[test]
fn older_build_than_stable_is_a_broken_update_path() {
    let h = harness();
    h.koji.tag_build("f20-updates", "foo-1.3-1");
    candidate(&h, "f20", "foo-1.2-3");

    let err = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect_err("regression");
    insta::assert_snapshot!(
        err.to_string(),
        @"broken update path: foo-1.2-3 is older than foo-1.3-1 in f20-updates"
    );
    assert!(h.engine.update("foo-1.2-3").is_err());
}

#[test]
fn regression_against_an_older_release_is_caught() {
    let h = harness();
    h.koji.tag_build("f19-updates", "foo-2.0-1");
    candidate(&h, "f20", "foo-1.2-3");

    let err = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect_err("regression in f19");
    assert!(matches!(err, EngineError::BrokenUpdatePath { tag, .. } if tag == "f19-updates"));
}

#[test]
fn build_system_outage_mid_walk_aborts_without_writing() {
    let h = harness();
    candidate(&h, "f20", "foo-1.0-1");
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &idle("foo-1.0-1", "F20"))
        .expect("first update");

    h.koji.fail("f19");
    let err = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect_err("outage");
    assert!(matches!(
        &err,
        EngineError::InvalidBuild { build, reason }
            if build == "foo-1.2-3" && reason.contains("unavailable")
    ));
    assert_eq!(build_count(&h), 1);
    assert!(h.engine.update("foo-1.2-3").is_err());
    assert_eq!(
        h.engine.update("foo-1.0-1").expect("first update").status,
        UpdateStatus::Pending
    );
    assert!(h.notifier.sent().iter().all(|n| n.title == "foo-1.0-1"));

    h.koji.restore("f19");
    let outcome = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("submission after recovery");
    assert_eq!(outcome.obsoleted, vec!["foo-1.0-1".to_string()]);
}

#[test]
fn unreachable_build_fails_tag_validation_as_invalid() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.koji.fail("foo-1.2-3");

    let err = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect_err("outage");
    assert!(matches!(err, EngineError::InvalidBuild { build, .. } if build == "foo-1.2-3"));
    assert_eq!(build_count(&h), 0);
}

#[test]
fn newer_build_obsoletes_idle_update_and_takes_its_bugs_and_cves() {
    let h = harness();
    candidate(&h, "f20", "foo-1.0-1");
    candidate(&h, "f20", "foo-1.1-1");

    let mut first = idle("foo-1.0-1", "F20");
    first.bugs = vec![100];
    first.cves = vec!["CVE-2014-0160".to_string()];
    h.engine.submit(&alice(), &first).expect("first update");

    let mut second = submit("foo-1.1-1", "F20");
    second.bugs = vec![200];
    second.cves = vec!["CVE-2014-0224".to_string()];
    let outcome = h.engine.submit(&alice(), &second).expect("second update");

    assert_eq!(outcome.obsoleted, vec!["foo-1.0-1".to_string()]);
    assert!(outcome
        .notes
        .contains(&"This update has obsoleted foo-1.0-1".to_string()));
    assert_eq!(outcome.update.bugs, BTreeSet::from([100, 200]));
    assert_eq!(
        outcome.update.cves,
        BTreeSet::from(["CVE-2014-0160".to_string(), "CVE-2014-0224".to_string()])
    );

    let old = h.engine.update("foo-1.0-1").expect("old update");
    assert_eq!(old.status, UpdateStatus::Obsolete);
    assert_eq!(old.request, None);
    assert_eq!(old.bugs, BTreeSet::from([100]));
    assert_eq!(
        old.comments.last().and_then(|c| c.text.as_deref()),
        Some("This update has been obsoleted by foo-1.1-1")
    );
}

#[test]
fn obsoletion_skips_other_releases_and_requested_updates() {
    let h = harness();
    candidate(&h, "f19", "foo-1.0-1.fc19");
    candidate(&h, "f20", "foo-1.0-2.fc20");
    candidate(&h, "f20", "foo-1.1-1.fc20");

    h.engine
        .submit(&alice(), &idle("foo-1.0-1.fc19", "F19"))
        .expect("f19 update");
    h.engine
        .submit(&alice(), &submit("foo-1.0-2.fc20", "F20"))
        .expect("requested f20 update");

    let outcome = h
        .engine
        .submit(&alice(), &submit("foo-1.1-1.fc20", "F20"))
        .expect("newer f20 update");
    assert!(outcome.obsoleted.is_empty());

    assert_eq!(
        h.engine.update("foo-1.0-1.fc19").expect("f19").status,
        UpdateStatus::Pending
    );
    let requested = h.engine.update("foo-1.0-2.fc20").expect("f20");
    assert_eq!(requested.status, UpdateStatus::Pending);
    assert_eq!(requested.request, Some(UpdateRequest::Testing));
}

#[test]
fn unapproved_security_update_is_held_in_testing() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");

    let mut request = submit("foo-1.2-3", "F20");
    request.bugs = vec![300];
    request.request = Some(UpdateRequest::Stable);
    let outcome = h.engine.submit(&alice(), &request).expect("no error for the submitter");

    assert_eq!(outcome.update.update_type, UpdateType::Security);
    assert_eq!(outcome.update.request, Some(UpdateRequest::Testing));
    assert!(outcome
        .notes
        .iter()
        .any(|n| n.ends_with("awaits approval of the Security Team")));
    let team = Recipient::SecurityTeam("security-team".to_string());
    assert!(h.notifier.sent_to(&team).contains(&NotificationKind::Security));

    let queue = h.engine.security_queue().expect("queue");
    assert_eq!(queue.len(), 1);

    let err = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Testing)
        .expect_err("already requested");
    assert!(matches!(err, EngineError::AlreadyRequested { .. }));

    let held = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Stable)
        .expect("held again, not an error");
    assert_eq!(held.update.request, Some(UpdateRequest::Testing));

    let err = h
        .engine
        .approve(&alice(), "foo-1.2-3")
        .expect_err("only the security group approves");
    assert!(matches!(err, EngineError::Unauthorized { .. }));

    let approver = Identity::new("sec").with_group("security_respons");
    let approved = h.engine.approve(&approver, "foo-1.2-3").expect("approve");
    assert_eq!(approved.update.request, Some(UpdateRequest::Stable));
    assert!(approved.update.approved.is_some());
    assert!(h.engine.security_queue().expect("queue").is_empty());
}

#[test]
fn unapproved_security_update_in_testing_stays_put_and_retired_ones_cannot_be_approved() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    let mut request = submit("foo-1.2-3", "F20");
    request.bugs = vec![300];
    h.engine.submit(&alice(), &request).expect("submit");
    mark_pushed(&h, "foo-1.2-3", UpdateStatus::Testing);

    let held = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Stable)
        .expect("held, not an error");
    assert!(!held.transition.changed);
    assert_eq!(held.update.status, UpdateStatus::Testing);
    assert_eq!(held.update.request, None);
    assert!(held.update.pushed);
    let team = Recipient::SecurityTeam("security-team".to_string());
    assert!(h.notifier.sent_to(&team).contains(&NotificationKind::Security));

    h.engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Obsolete)
        .expect("obsolete");
    let approver = Identity::new("sec").with_group("security_respons");
    let err = h
        .engine
        .approve(&approver, "foo-1.2-3")
        .expect_err("obsolete updates are not approved");
    assert!(matches!(
        err,
        EngineError::AlreadyInState { status: UpdateStatus::Obsolete, .. }
    ));
    let stored = h.engine.update("foo-1.2-3").expect("still stored");
    assert_eq!(stored.request, None);
    assert!(stored.approved.is_none());
}

#[test]
fn bug_comments_are_posted_for_new_updates() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    let mut request = submit("foo-1.2-3", "F20");
    request.bugs = vec![100];
    h.engine.submit(&alice(), &request).expect("submit");

    assert_eq!(
        h.bugs.comments(),
        vec![(
            100,
            "foo-1.2-3 has been submitted as an update for Fedora 20".to_string()
        )]
    );
}

#[test]
fn revoke_needs_an_outstanding_request() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &idle("foo-1.2-3", "F20"))
        .expect("submit");

    let err = h.engine.revoke(&alice(), "foo-1.2-3").expect_err("nothing to revoke");
    assert_eq!(err, EngineError::NoOutstandingRequest("foo-1.2-3".to_string()));

    h.engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Testing)
        .expect("request testing");
    let revoked = h.engine.revoke(&alice(), "foo-1.2-3").expect("revoke");
    assert_eq!(revoked.update.request, None);
    assert_eq!(revoked.update.status, UpdateStatus::Pending);
}

#[test]
fn unpush_and_obsolete_are_idempotent() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("submit");
    mark_pushed(&h, "foo-1.2-3", UpdateStatus::Testing);

    let first = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Unpush)
        .expect("unpush");
    assert!(first.transition.changed);
    assert_eq!(first.update.status, UpdateStatus::Unpushed);
    assert!(!first.update.pushed);

    let second = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Unpush)
        .expect("unpush again");
    assert!(!second.transition.changed);

    h.engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Obsolete)
        .expect("obsolete");
    let again = h
        .engine
        .request(&alice(), "foo-1.2-3", UpdateRequest::Obsolete)
        .expect("obsolete again");
    assert!(!again.transition.changed);
    assert_eq!(again.update.status, UpdateStatus::Obsolete);
}

#[test]
fn transitions_require_submitter_or_admin() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &idle("foo-1.2-3", "F20"))
        .expect("submit");

    let err = h
        .engine
        .request(&Identity::new("mallory"), "foo-1.2-3", UpdateRequest::Testing)
        .expect_err("stranger");
    insta::assert_snapshot!(err.to_string(), @"mallory is not authorized to request testing for foo-1.2-3");
    assert_eq!(h.engine.update("foo-1.2-3").expect("update").request, None);

    h.engine
        .request(&releng(), "foo-1.2-3", UpdateRequest::Testing)
        .expect("admin may act");
}

#[test]
fn editing_a_testing_update_unpushes_it_first() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    let outcome = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("submit");
    let id = outcome.update.id.clone();
    mark_pushed(&h, "foo-1.2-3", UpdateStatus::Testing);
    h.koji.untag_build("f20-updates-candidate", "foo-1.2-3");
    h.koji.tag_build("f20-updates-testing", "foo-1.2-3");
    candidate(&h, "f20", "bar-2.0-1");

    let edit = submit("foo-1.2-3,bar-2.0-1", "F20").editing("foo-1.2-3");
    let edited = h.engine.submit(&alice(), &edit).expect("edit");

    assert!(!edited.created);
    assert_eq!(edited.notes[0], "Update successfully edited");
    assert_eq!(edited.update.id, id);
    assert_eq!(edited.update.title, "foo-1.2-3,bar-2.0-1");
    assert_eq!(edited.update.status, UpdateStatus::Pending);
    assert_eq!(edited.update.request, Some(UpdateRequest::Testing));
    assert!(h.notifier.sent_to(&Recipient::Admins).contains(&NotificationKind::Unpush));
    assert!(h
        .notifier
        .sent_to(&Recipient::User("alice".to_string()))
        .contains(&NotificationKind::Edited));

    let owners = h
        .engine
        .repository()
        .read(|store| {
            ["foo-1.2-3", "bar-2.0-1"]
                .iter()
                .map(|nvr| store.build(nvr).and_then(|b| b.update_id.clone()))
                .collect::<Vec<_>>()
        })
        .expect("read");
    assert_eq!(owners, vec![Some(id.clone()), Some(id)]);
    assert!(h.engine.update("foo-1.2-3").is_err());
}

#[test]
fn stable_updates_cannot_be_edited_or_deleted() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("submit");
    mark_pushed(&h, "foo-1.2-3", UpdateStatus::Stable);
    h.koji.tag_build("f20-updates", "foo-1.2-3");
    candidate(&h, "f20", "foo-1.2-4");

    let err = h
        .engine
        .submit(&alice(), &submit("foo-1.2-4", "F20").editing("foo-1.2-3"))
        .expect_err("stable is final");
    assert_eq!(err, EngineError::CannotEditStable("foo-1.2-3".to_string()));
    assert!(h.engine.update("foo-1.2-4").is_err());

    let err = h.engine.delete(&alice(), "foo-1.2-3").expect_err("stable");
    assert!(matches!(err, EngineError::CannotModifyStable { .. }));
}

#[test]
fn submitter_needs_commit_access_unless_privileged() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");

    let err = h
        .engine
        .submit(&Identity::new("mallory"), &submit("foo-1.2-3", "F20"))
        .expect_err("no commit access");
    assert_eq!(
        err,
        EngineError::unauthorized("mallory", "commit to", "foo")
    );

    let outcome = h
        .engine
        .submit(&releng(), &submit("foo-1.2-3", "F20"))
        .expect("privileged submitter");
    assert_eq!(outcome.update.submitter, "rel");
    let acl = h
        .engine
        .repository()
        .read(|store| store.package("foo").map(|p| p.acl.clone()))
        .expect("read")
        .expect("package cached");
    assert!(acl.committers.contains("alice"));
}

#[test]
fn duplicate_build_rolls_back_the_whole_submission() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    candidate(&h, "f20", "bar-2.0-1");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("first");

    let err = h
        .engine
        .submit(&alice(), &submit("bar-2.0-1,foo-1.2-3", "F20"))
        .expect_err("foo is taken");
    insta::assert_snapshot!(err.to_string(), @"update for foo-1.2-3 already exists");

    let (bar_build, bar_package) = h
        .engine
        .repository()
        .read(|store| (store.build("bar-2.0-1").is_some(), store.package("bar").is_some()))
        .expect("read");
    assert!(!bar_build);
    assert!(!bar_package);
    assert_eq!(h.engine.query(&Default::default()).expect("query").len(), 1);
}

#[test]
fn concurrent_submissions_of_one_nvr_commit_once() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    let workers = 6;
    let barrier = Barrier::new(workers);

    let results: Vec<Result<_, EngineError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    h.engine.submit(&alice(), &submit("foo-1.2-3", "F20"))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should not panic"))
            .collect()
    });

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_eq!(err, EngineError::DuplicateBuild("foo-1.2-3".to_string()));
    }
    assert_eq!(build_count(&h), 1);
}

#[test]
fn delete_refuses_pushed_updates_and_cascades_builds() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    candidate(&h, "f20", "bar-2.0-1");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("foo");
    h.engine
        .submit(&alice(), &submit("bar-2.0-1", "F20"))
        .expect("bar");
    mark_pushed(&h, "bar-2.0-1", UpdateStatus::Testing);

    let err = h.engine.delete(&alice(), "bar-2.0-1").expect_err("pushed");
    assert_eq!(err, EngineError::CannotDeletePushed("bar-2.0-1".to_string()));

    let removed = h.engine.delete(&alice(), "foo-1.2-3").expect("delete");
    assert_eq!(removed.title, "foo-1.2-3");
    assert_eq!(build_count(&h), 1);
    assert!(h.notifier.sent_to(&Recipient::Admins).contains(&NotificationKind::Deleted));

    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("nvr is free again");
}

#[test]
fn comments_validate_karma() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("submit");

    let tester = Identity::new("tester");
    let err = h
        .engine
        .comment(&tester, "foo-1.2-3", Some("works"), 2, false)
        .expect_err("karma out of range");
    assert_eq!(err, EngineError::InvalidKarma(2));

    h.engine
        .comment(&tester, "foo-1.2-3", Some("works for me"), 1, false)
        .expect("comment");
    let update = h
        .engine
        .comment(&tester, "foo-1.2-3", Some("None"), 1, true)
        .expect("anonymous karma");
    assert_eq!(update.karma(), 2);
    assert_eq!(update.comments.last().and_then(|c| c.text.clone()), None);
}

#[test]
fn notifier_failures_do_not_fail_the_submission() {
    let h = harness_with(MemoryNotifier::failing());
    candidate(&h, "f20", "foo-1.2-3");
    let outcome = h
        .engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("best-effort notifications");
    assert!(outcome.created);
    assert!(h.notifier.sent().is_empty());
}

#[test]
fn bulk_obsolete_reports_rejections_per_build() {
    let h = harness();
    candidate(&h, "f20", "foo-1.2-3");
    candidate(&h, "f20", "bar-2.0-1");
    h.engine
        .submit(&alice(), &submit("foo-1.2-3", "F20"))
        .expect("foo");
    h.engine
        .submit(&releng(), &submit("bar-2.0-1", "F20"))
        .expect("bar");

    let report = h
        .engine
        .obsolete_builds(
            &alice(),
            &[
                "foo-1.2-3".to_string(),
                "bar-2.0-1".to_string(),
                "ghost-1-1".to_string(),
            ],
        )
        .expect("bulk obsolete");
    assert_eq!(report.obsoleted, vec!["foo-1.2-3".to_string()]);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(
        h.engine.update("bar-2.0-1").expect("bar").status,
        UpdateStatus::Pending
    );
}
