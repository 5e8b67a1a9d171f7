use relgate_engine::TransitionOutcome;
use relgate_model::UpdateRequest;
use serde_json::json;

use crate::cli::Backend;
use crate::support::{
    engine_or_exit, exit_with, identity_or_exit, print_json, update_json, update_line,
};

fn print_outcome(backend: &Backend, action: &str, outcome: &TransitionOutcome) {
    if backend.json {
        print_json(&json!({
            "action": action,
            "storePath": backend.store,
            "message": outcome.transition.message,
            "changed": outcome.transition.changed,
            "update": update_json(&outcome.update)
        }));
    } else {
        println!(
            "relgate {}\n  {}\n  {}",
            action.trim_start_matches("update."),
            outcome.transition.message,
            update_line(&outcome.update)
        );
    }
}

pub fn run_request(backend: &Backend, title: String, action: UpdateRequest) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let outcome = engine
        .request(&identity, &title, action)
        .unwrap_or_else(|e| exit_with(e));
    print_outcome(backend, "update.request", &outcome);
}

pub fn run_revoke(backend: &Backend, title: String) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let outcome = engine
        .revoke(&identity, &title)
        .unwrap_or_else(|e| exit_with(e));
    print_outcome(backend, "update.revoke", &outcome);
}

pub fn run_approve(backend: &Backend, title: String) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let outcome = engine
        .approve(&identity, &title)
        .unwrap_or_else(|e| exit_with(e));
    print_outcome(backend, "update.approve", &outcome);
}

pub fn run_delete(backend: &Backend, title: String) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let removed = engine
        .delete(&identity, &title)
        .unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "update.delete",
            "storePath": backend.store,
            "title": removed.title,
            "builds": removed.builds
        }));
    } else {
        println!("relgate delete\n  Deleted {}", removed.title);
    }
}

pub fn run_comment(
    backend: &Backend,
    title: String,
    text: Option<String>,
    karma: i64,
    anonymous: bool,
) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let update = engine
        .comment(&identity, &title, text.as_deref(), karma, anonymous)
        .unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "update.comment",
            "storePath": backend.store,
            "karma": update.karma(),
            "comments": update.comments.len(),
            "update": update_json(&update)
        }));
    } else {
        println!(
            "relgate comment\n  Comment added to {} (karma {})",
            update.title,
            update.karma()
        );
    }
}

pub fn run_obsolete(backend: &Backend, builds: Vec<String>) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);
    let report = engine
        .obsolete_builds(&identity, &builds)
        .unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "update.obsolete",
            "storePath": backend.store,
            "obsoleted": report.obsoleted,
            "errors": report.errors
        }));
    } else {
        println!(
            "relgate obsolete\n  Obsoleted: {}\n  Errors: {}",
            report.obsoleted.len(),
            report.errors.len()
        );
        for title in &report.obsoleted {
            println!("  - {title}");
        }
        for error in &report.errors {
            println!("  ! {error}");
        }
    }
    if report.obsoleted.is_empty() && !report.errors.is_empty() {
        std::process::exit(1);
    }
}
