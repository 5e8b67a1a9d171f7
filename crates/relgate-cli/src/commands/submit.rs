use relgate_engine::SubmitRequest;
use relgate_model::{UpdateRequest, UpdateType};
use serde_json::json;

use crate::cli::Backend;
use crate::support::{
    engine_or_exit, exit_with, identity_or_exit, print_json, update_json, update_line,
};

pub struct Args {
    pub builds: Vec<String>,
    pub release: String,
    pub update_type: UpdateType,
    pub notes: String,
    pub bugs: Vec<u64>,
    pub cves: Vec<String>,
    pub no_close_bugs: bool,
    pub suggest_reboot: bool,
    pub edit: Option<String>,
    pub request: String,
}

fn parse_request_or_exit(raw: &str) -> Option<UpdateRequest> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw.is_empty() {
        return None;
    }
    Some(raw.parse().unwrap_or_else(|e| exit_with(e)))
}

pub fn run(backend: &Backend, args: Args) {
    let identity = identity_or_exit(backend);
    let engine = engine_or_exit(backend);

    let mut request = SubmitRequest::new(args.builds, args.release, args.update_type);
    request.notes = args.notes;
    request.bugs = args.bugs;
    request.cves = args.cves;
    request.close_bugs = !args.no_close_bugs;
    request.suggest_reboot = args.suggest_reboot;
    request.request = parse_request_or_exit(&args.request);
    if let Some(title) = args.edit {
        request = request.editing(title);
    }

    let outcome = engine
        .submit(&identity, &request)
        .unwrap_or_else(|e| exit_with(e));

    if backend.json {
        print_json(&json!({
            "action": "update.submit",
            "storePath": backend.store,
            "created": outcome.created,
            "notes": outcome.notes,
            "obsoleted": outcome.obsoleted,
            "update": update_json(&outcome.update)
        }));
    } else {
        println!("relgate submit\n  {}", update_line(&outcome.update));
        for note in &outcome.notes {
            println!("  - {note}");
        }
    }
}
