//! Relgate CLI: the `relgate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands, ReleaseCommands};

fn main() {
    support::init_logging();
    let cli = Cli::parse();
    let backend = &cli.backend;

    match cli.command {
        Commands::Release { command } => match command {
            ReleaseCommands::Add {
                name,
                long_name,
                dist_tag,
            } => commands::release::run_add(backend, name, long_name, dist_tag),
            ReleaseCommands::List => commands::release::run_list(backend),
        },

        Commands::Submit {
            builds,
            release,
            update_type,
            notes,
            bugs,
            cves,
            no_close_bugs,
            suggest_reboot,
            edit,
            request,
        } => commands::submit::run(
            backend,
            commands::submit::Args {
                builds,
                release,
                update_type,
                notes,
                bugs,
                cves,
                no_close_bugs,
                suggest_reboot,
                edit,
                request,
            },
        ),

        Commands::Request { title, action } => {
            commands::transition::run_request(backend, title, action)
        }

        Commands::Revoke { title } => commands::transition::run_revoke(backend, title),

        Commands::Delete { title } => commands::transition::run_delete(backend, title),

        Commands::Comment {
            title,
            text,
            karma,
            anonymous,
        } => commands::transition::run_comment(backend, title, text, karma, anonymous),

        Commands::Approve { title } => commands::transition::run_approve(backend, title),

        Commands::Obsolete { builds } => commands::transition::run_obsolete(backend, builds),

        Commands::List {
            release,
            status,
            update_type,
            submitter,
            request,
            package,
            bugs,
            cves,
            pushed,
            approved,
        } => commands::query::run_list(
            backend,
            relgate_model::UpdateQuery {
                release,
                status,
                update_type,
                submitter,
                request,
                package,
                bugs,
                cves,
                pushed,
                approved,
            },
        ),

        Commands::Show { title } => commands::query::run_show(backend, title),

        Commands::SecurityQueue => commands::query::run_security_queue(backend),

        Commands::DistTags => commands::query::run_dist_tags(backend),
    }
}
