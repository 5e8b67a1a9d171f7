use clap::{Args, Parser, Subcommand};
use relgate_model::{UpdateRequest, UpdateStatus, UpdateType};

use crate::support::DEFAULT_STORE_PATH;

#[derive(Parser)]
#[command(
    name = "relgate",
    about = "Relgate: admission and request transitions for distribution package updates",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub backend: Backend,

    #[command(subcommand)]
    pub command: Commands,
}

/// Store, collaborators and caller identity shared by every command.
#[derive(Args, Debug, Clone)]
pub struct Backend {
    /// Path to the update store JSONL
    #[arg(long, global = true, default_value = DEFAULT_STORE_PATH)]
    pub store: String,

    /// Build system: a fixture JSON path, or `koji` to use the koji CLI
    #[arg(long, global = true)]
    pub buildsys: Option<String>,

    /// koji profile used with `--buildsys koji`
    #[arg(long, global = true)]
    pub koji_profile: Option<String>,

    /// Package ACL fixture JSON
    #[arg(long, global = true)]
    pub acl: Option<String>,

    /// Bug details fixture JSON
    #[arg(long, global = true)]
    pub bugzilla: Option<String>,

    /// Append notifications to this JSONL outbox instead of logging them
    #[arg(long, global = true)]
    pub outbox: Option<String>,

    /// Engine config TOML
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Acting user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Group membership of the acting user (repeatable)
    #[arg(long = "group", global = true)]
    pub groups: Vec<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage releases
    Release {
        #[command(subcommand)]
        command: ReleaseCommands,
    },

    /// Submit a new update, or edit an existing one
    Submit {
        /// Build NVRs (comma or space separated lists are accepted)
        #[arg(required = true)]
        builds: Vec<String>,

        /// Target release (short or long name)
        #[arg(long)]
        release: String,

        /// Update type
        #[arg(long = "type", default_value = "bugfix")]
        update_type: UpdateType,

        /// Update notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Linked bug id (repeatable)
        #[arg(long = "bug")]
        bugs: Vec<u64>,

        /// Linked CVE id (repeatable)
        #[arg(long = "cve")]
        cves: Vec<String>,

        /// Do not close linked bugs when the update goes stable
        #[arg(long)]
        no_close_bugs: bool,

        /// Mark the packages as needing a reboot after update
        #[arg(long)]
        suggest_reboot: bool,

        /// Title of the update being edited
        #[arg(long)]
        edit: Option<String>,

        /// Request to apply after submission: testing, stable, or none
        #[arg(long, default_value = "testing")]
        request: String,
    },

    /// Apply a request (testing, stable, unpush, obsolete) to an update
    Request {
        /// Update title
        title: String,

        /// Requested action
        action: UpdateRequest,
    },

    /// Revoke the outstanding request of an update
    Revoke {
        /// Update title
        title: String,
    },

    /// Delete an update that has never been pushed
    Delete {
        /// Update title
        title: String,
    },

    /// Comment on an update, optionally with karma
    Comment {
        /// Update title
        title: String,

        /// Comment text
        #[arg(long)]
        text: Option<String>,

        /// Karma: -1, 0 or 1
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        karma: i64,

        /// Post anonymously
        #[arg(long)]
        anonymous: bool,
    },

    /// Approve a security update for stable
    Approve {
        /// Update title
        title: String,
    },

    /// Obsolete the updates owning the given builds
    Obsolete {
        /// Build NVRs
        #[arg(required = true)]
        builds: Vec<String>,
    },

    /// List updates with optional filters
    List {
        /// Filter by release
        #[arg(long)]
        release: Option<String>,

        /// Filter by status
        #[arg(long)]
        status: Option<UpdateStatus>,

        /// Filter by update type
        #[arg(long = "type")]
        update_type: Option<UpdateType>,

        /// Filter by submitter
        #[arg(long)]
        submitter: Option<String>,

        /// Filter by outstanding request
        #[arg(long)]
        request: Option<UpdateRequest>,

        /// Filter by package name, build NVR, or update title
        #[arg(long)]
        package: Option<String>,

        /// Filter by linked bug (repeatable)
        #[arg(long = "bug")]
        bugs: Vec<u64>,

        /// Filter by linked CVE (repeatable)
        #[arg(long = "cve")]
        cves: Vec<String>,

        /// Filter by pushed flag
        #[arg(long)]
        pushed: Option<bool>,

        /// Filter by security approval
        #[arg(long)]
        approved: Option<bool>,
    },

    /// Show one update
    Show {
        /// Update title
        title: String,
    },

    /// List pending security updates awaiting approval
    SecurityQueue,

    /// List the distribution tags of every release
    DistTags,
}

#[derive(Subcommand)]
pub enum ReleaseCommands {
    /// Register or replace a release
    Add {
        /// Short name, e.g. F20
        name: String,

        /// Long name, e.g. "Fedora 20"
        #[arg(long)]
        long_name: String,

        /// Build-system distribution tag, e.g. f20
        #[arg(long)]
        dist_tag: String,
    },

    /// List releases
    List,
}
