use relgate_model::{Update, UpdateQuery};
use serde_json::json;

use crate::cli::Backend;
use crate::support::{
    engine_or_exit, exit_with, print_json, print_update_details, update_json, update_line,
};

fn print_updates(backend: &Backend, action: &str, heading: &str, updates: &[Update]) {
    if backend.json {
        let items = updates.iter().map(update_json).collect::<Vec<_>>();
        print_json(&json!({
            "action": action,
            "storePath": backend.store,
            "count": items.len(),
            "items": items
        }));
    } else {
        println!(
            "relgate {heading}\n  Path: {}\n  Count: {}",
            backend.store,
            updates.len()
        );
        for update in updates {
            println!("  - {}", update_line(update));
        }
    }
}

pub fn run_list(backend: &Backend, query: UpdateQuery) {
    let engine = engine_or_exit(backend);
    let updates = engine.query(&query).unwrap_or_else(|e| exit_with(e));
    print_updates(backend, "update.list", "list", &updates);
}

pub fn run_security_queue(backend: &Backend) {
    let engine = engine_or_exit(backend);
    let updates = engine.security_queue().unwrap_or_else(|e| exit_with(e));
    print_updates(backend, "update.security_queue", "security-queue", &updates);
}

pub fn run_show(backend: &Backend, title: String) {
    let engine = engine_or_exit(backend);
    let update = engine.update(&title).unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "update.show",
            "storePath": backend.store,
            "update": update_json(&update)
        }));
    } else {
        print_update_details(&update);
    }
}

pub fn run_dist_tags(backend: &Backend) {
    let engine = engine_or_exit(backend);
    let tags = engine.dist_tags().unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "release.dist_tags",
            "count": tags.len(),
            "items": tags
        }));
    } else {
        for tag in tags {
            println!("{tag}");
        }
    }
}
