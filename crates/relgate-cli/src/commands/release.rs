use relgate_model::Release;
use serde_json::json;

use crate::cli::Backend;
use crate::support::{engine_or_exit, exit_with, print_json};

pub fn run_add(backend: &Backend, name: String, long_name: String, dist_tag: String) {
    let engine = engine_or_exit(backend);
    let release = Release::new(name, long_name, dist_tag);
    let created = engine
        .register_release(release.clone())
        .unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "release.add",
            "storePath": backend.store,
            "created": created,
            "release": release
        }));
    } else {
        println!(
            "relgate release add\n  {} {}: {} (dist tag {})",
            if created { "Added" } else { "Replaced" },
            release.name,
            release.long_name,
            release.dist_tag
        );
    }
}

pub fn run_list(backend: &Backend) {
    let engine = engine_or_exit(backend);
    let releases = engine.releases().unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "release.list",
            "storePath": backend.store,
            "count": releases.len(),
            "items": releases
        }));
    } else {
        println!(
            "relgate release list\n  Path: {}\n  Count: {}",
            backend.store,
            releases.len()
        );
        for release in releases {
            println!(
                "  - {} [{}] {}",
                release.name, release.dist_tag, release.long_name
            );
        }
    }
}
