//! Build system clients: a JSON-backed fixture and the `koji` CLI.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process::Command;
use std::sync::RwLock;

use super::{AdapterError, load_json};
use crate::collaborators::{BuildSystem, BuildSystemError, TaggedBuild};

/// On-disk shape of a build system fixture.
///
/// ```json
/// {"tags": {"f20-updates-candidate": ["foo-1.2-3"], "f20": []},
///  "epochs": {"foo-1.2-3": 1}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSystemFixture {
    /// Builds known without any tag.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub builds: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub epochs: BTreeMap<String, u32>,
    /// Tag name to the NVRs carrying it.
    #[serde(default)]
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl BuildSystemFixture {
    fn knows_build(&self, nvr: &str) -> bool {
        self.builds.contains(nvr)
            || self.epochs.contains_key(nvr)
            || self.tags.values().any(|nvrs| nvrs.contains(nvr))
    }
}

/// In-process build system over a [`BuildSystemFixture`].
#[derive(Debug, Default)]
pub struct FixtureBuildSystem {
    state: RwLock<BuildSystemFixture>,
    /// Builds and tags whose lookups report a transport failure.
    outages: RwLock<BTreeSet<String>>,
}

impl FixtureBuildSystem {
    pub fn new(fixture: BuildSystemFixture) -> Self {
        Self {
            state: RwLock::new(fixture),
            outages: RwLock::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        Ok(Self::new(load_json(path.as_ref())?))
    }

    pub fn snapshot(&self) -> BuildSystemFixture {
        self.read().clone()
    }

    pub fn add_build(&self, nvr: &str) {
        self.write().builds.insert(nvr.to_string());
    }

    pub fn set_epoch(&self, nvr: &str, epoch: u32) {
        self.write().epochs.insert(nvr.to_string(), epoch);
    }

    pub fn create_tag(&self, tag: &str) {
        self.write().tags.entry(tag.to_string()).or_default();
    }

    /// Tag `nvr`, creating the tag and the build as needed.
    pub fn tag_build(&self, tag: &str, nvr: &str) {
        self.write()
            .tags
            .entry(tag.to_string())
            .or_default()
            .insert(nvr.to_string());
    }

    pub fn untag_build(&self, tag: &str, nvr: &str) {
        if let Some(nvrs) = self.write().tags.get_mut(tag) {
            nvrs.remove(nvr);
        }
    }

    /// Make every lookup naming `build_or_tag` fail as unreachable until
    /// [`FixtureBuildSystem::restore`] is called.
    pub fn fail(&self, build_or_tag: &str) {
        self.outages
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(build_or_tag.to_string());
    }

    pub fn restore(&self, build_or_tag: &str) {
        self.outages
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(build_or_tag);
    }

    fn reachable(&self, key: &str) -> Result<(), BuildSystemError> {
        let outages = self.outages.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if outages.contains(key) {
            return Err(BuildSystemError::Transport(format!("timed out looking up {key}")));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BuildSystemFixture> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BuildSystemFixture> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BuildSystem for FixtureBuildSystem {
    fn list_tags(&self, nvr: &str) -> Result<Vec<String>, BuildSystemError> {
        self.reachable(nvr)?;
        let state = self.read();
        if !state.knows_build(nvr) {
            return Err(BuildSystemError::BuildNotFound(nvr.to_string()));
        }
        Ok(state
            .tags
            .iter()
            .filter(|(_, nvrs)| nvrs.contains(nvr))
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    fn get_build(&self, nvr: &str) -> Result<TaggedBuild, BuildSystemError> {
        self.reachable(nvr)?;
        let state = self.read();
        if !state.knows_build(nvr) {
            return Err(BuildSystemError::BuildNotFound(nvr.to_string()));
        }
        TaggedBuild::parse(nvr, state.epochs.get(nvr).copied())
            .map_err(|err| BuildSystemError::BuildNotFound(format!("{nvr}: {err}")))
    }

    fn list_tagged(&self, tag: &str, package: &str) -> Result<Vec<TaggedBuild>, BuildSystemError> {
        self.reachable(tag)?;
        let state = self.read();
        let nvrs = state
            .tags
            .get(tag)
            .ok_or_else(|| BuildSystemError::TagNotFound(tag.to_string()))?;
        Ok(nvrs
            .iter()
            .filter_map(|nvr| TaggedBuild::parse(nvr, state.epochs.get(nvr).copied()).ok())
            .filter(|build| build.name == package)
            .collect())
    }
}

/// Thin client around the `koji` CLI.
#[derive(Debug, Clone)]
pub struct KojiCli {
    program: String,
    profile: Option<String>,
}

impl Default for KojiCli {
    fn default() -> Self {
        Self {
            program: "koji".to_string(),
            profile: None,
        }
    }
}

impl KojiCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Returns true if the client binary runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run(&self, args: &[&str]) -> Result<String, BuildSystemError> {
        let mut command = Command::new(&self.program);
        if let Some(profile) = &self.profile {
            command.args(["--profile", profile]);
        }
        let output = command.args(args).output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                BuildSystemError::Transport(format!("{} executable is not available in PATH", self.program))
            } else {
                BuildSystemError::Transport(format!("{} {}: {err}", self.program, args.join(" ")))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let message = [stderr, stdout]
                .into_iter()
                .find(|text| !text.is_empty())
                .unwrap_or_else(|| "unknown error".to_string());
            Err(classify_failure(&message))
        }
    }
}

impl BuildSystem for KojiCli {
    fn list_tags(&self, nvr: &str) -> Result<Vec<String>, BuildSystemError> {
        let stdout = self.run(&["list-tags", "--build", nvr])?;
        Ok(first_columns(&stdout))
    }

    fn get_build(&self, nvr: &str) -> Result<TaggedBuild, BuildSystemError> {
        let stdout = self.run(&["buildinfo", nvr])?;
        let (reported, epoch) = parse_buildinfo(&stdout)
            .ok_or_else(|| BuildSystemError::BuildNotFound(nvr.to_string()))?;
        TaggedBuild::parse(&reported, epoch)
            .map_err(|err| BuildSystemError::Transport(format!("unexpected build {reported}: {err}")))
    }

    fn list_tagged(&self, tag: &str, package: &str) -> Result<Vec<TaggedBuild>, BuildSystemError> {
        let stdout = self.run(&["list-tagged", "--quiet", tag, package])?;
        Ok(first_columns(&stdout)
            .iter()
            .filter_map(|nvr| TaggedBuild::parse(nvr, None).ok())
            .filter(|build| build.name == package)
            .collect())
    }
}

fn classify_failure(message: &str) -> BuildSystemError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("no such tag") || lowered.contains("no such entity in table tag") {
        BuildSystemError::TagNotFound(message.to_string())
    } else if lowered.contains("no such build") {
        BuildSystemError::BuildNotFound(message.to_string())
    } else {
        BuildSystemError::Transport(message.to_string())
    }
}

fn first_columns(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(ToOwned::to_owned)
        .collect()
}

/// `BUILD: <nvr> [<id>]` and an optional `Epoch: <n>` line.
fn parse_buildinfo(stdout: &str) -> Option<(String, Option<u32>)> {
    let mut nvr = None;
    let mut epoch = None;
    for line in stdout.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("BUILD:") {
            nvr = rest.split_whitespace().next().map(ToOwned::to_owned);
        } else if let Some(rest) = line.strip_prefix("Epoch:") {
            epoch = rest.trim().parse().ok();
        }
    }
    nvr.map(|nvr| (nvr, epoch))
}
