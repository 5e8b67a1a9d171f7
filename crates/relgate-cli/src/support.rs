use relgate_engine::adapters::{
    FixtureAcl, FixtureBuildSystem, KojiCli, LogNotifier, MemoryBugTracker, OutboxNotifier,
};
use relgate_engine::{
    AclProvider, BugTracker, BuildSystem, Collaborators, Engine, EngineConfig, Identity, Notifier,
    RpmVersionComparator,
};
use relgate_model::{JsonlRepository, Update};
use serde_json::Value;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Backend;

pub const DEFAULT_STORE_PATH: &str = ".relgate/store.jsonl";
pub const LOG_ENV: &str = "RELGATE_LOG";

/// Log to stderr so stdout stays parseable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn exit_with(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn engine_or_exit(backend: &Backend) -> Engine<JsonlRepository> {
    let config = match &backend.config {
        Some(path) => EngineConfig::load(path).unwrap_or_else(|e| exit_with(e)),
        None => EngineConfig::default(),
    };

    let store = Path::new(&backend.store);
    if let Some(parent) = store.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            exit_with(format!("failed to create {}: {e}", parent.display()))
        });
    }

    let build_system: Arc<dyn BuildSystem> = match backend.buildsys.as_deref() {
        Some("koji") => {
            let client = KojiCli::default();
            Arc::new(match &backend.koji_profile {
                Some(profile) => client.with_profile(profile),
                None => client,
            })
        }
        Some(path) => Arc::new(FixtureBuildSystem::load(path).unwrap_or_else(|e| exit_with(e))),
        None => Arc::new(FixtureBuildSystem::default()),
    };
    let acl: Arc<dyn AclProvider> = match &backend.acl {
        Some(path) => Arc::new(FixtureAcl::load(path).unwrap_or_else(|e| exit_with(e))),
        None => Arc::new(FixtureAcl::default()),
    };
    let bug_tracker: Arc<dyn BugTracker> = match &backend.bugzilla {
        Some(path) => Arc::new(MemoryBugTracker::load(path).unwrap_or_else(|e| exit_with(e))),
        None => Arc::new(MemoryBugTracker::default()),
    };
    let notifier: Arc<dyn Notifier> = match &backend.outbox {
        Some(path) => Arc::new(OutboxNotifier::new(path)),
        None => Arc::new(LogNotifier),
    };

    debug!("opening update store {}", store.display());
    Engine::new(
        JsonlRepository::new(store),
        Collaborators {
            build_system,
            acl,
            notifier,
            bug_tracker,
            comparator: Arc::new(RpmVersionComparator),
        },
        config,
    )
}

pub fn identity_or_exit(backend: &Backend) -> Identity {
    let Some(user) = backend.user.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        exit_with("--user is required for this command");
    };
    backend
        .groups
        .iter()
        .fold(Identity::new(user), |identity, group| identity.with_group(group))
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn update_json(update: &Update) -> Value {
    serde_json::to_value(update).expect("json serialization")
}

/// One-line human summary of an update.
pub fn update_line(update: &Update) -> String {
    let request = update
        .request
        .map(|r| format!(" -> {r}"))
        .unwrap_or_default();
    format!(
        "{} [{} {}{}] {} karma={}",
        update.title,
        update.release,
        update.status,
        request,
        update.update_type,
        update.karma()
    )
}

pub fn print_update_details(update: &Update) {
    println!("{}", update.title);
    println!("  Release:   {}", update.release);
    println!("  Status:    {}", update.status);
    if let Some(request) = update.request {
        println!("  Request:   {request}");
    }
    println!("  Type:      {}", update.update_type);
    println!("  Submitter: {}", update.submitter);
    println!("  Karma:     {}", update.karma());
    if !update.bugs.is_empty() {
        let bugs: Vec<String> = update.bugs.iter().map(u64::to_string).collect();
        println!("  Bugs:      {}", bugs.join(", "));
    }
    if !update.cves.is_empty() {
        let cves: Vec<&str> = update.cves.iter().map(String::as_str).collect();
        println!("  CVEs:      {}", cves.join(", "));
    }
    if !update.notes.is_empty() {
        println!("  Notes:     {}", update.notes);
    }
    for comment in &update.comments {
        let author = if comment.anonymous {
            "anonymous"
        } else {
            comment.author.as_str()
        };
        println!(
            "  - {author} ({:+}): {}",
            comment.karma,
            comment.text.as_deref().unwrap_or("")
        );
    }
}
