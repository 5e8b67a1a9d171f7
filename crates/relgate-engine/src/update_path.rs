//! Update path checking: a candidate build may never be older than a build
//! already shipped in its release or any earlier one.

use std::cmp::Ordering;
use tracing::{debug, warn};

use relgate_model::Release;

use crate::collaborators::{BuildSystem, BuildSystemError, TaggedBuild, VersionComparator};
use crate::error::EngineError;

/// Tag of the release before `tag`, found by decrementing its trailing
/// number. Release 1 has no predecessor.
pub fn previous_release_tag(tag: &str) -> Result<Option<String>, EngineError> {
    let prefix = tag.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &tag[prefix.len()..];
    if digits.is_empty() {
        return Err(EngineError::MalformedReleaseTag(tag.to_string()));
    }
    let number: u64 = digits
        .parse()
        .map_err(|_| EngineError::MalformedReleaseTag(tag.to_string()))?;
    if number <= 1 {
        return Ok(None);
    }
    Ok(Some(format!("{prefix}{}", number - 1)))
}

/// Why the backward walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStop {
    /// The build system does not know the release tag.
    TagNotFound,
    /// The oldest numbered release was reached.
    Floor,
    /// The configured number of releases was visited.
    Cap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReport {
    pub candidate: String,
    pub tags_checked: Vec<String>,
    pub stop: WalkStop,
}

pub struct UpdatePathChecker<'a> {
    build_system: &'a dyn BuildSystem,
    comparator: &'a dyn VersionComparator,
    max_release_walk: usize,
}

impl<'a> UpdatePathChecker<'a> {
    pub fn new(
        build_system: &'a dyn BuildSystem,
        comparator: &'a dyn VersionComparator,
        max_release_walk: usize,
    ) -> Self {
        Self {
            build_system,
            comparator,
            max_release_walk: max_release_walk.max(1),
        }
    }

    /// Resolve `nvr` in the build system and check it against every release
    /// from `release` backwards.
    pub fn check(&self, release: &Release, nvr: &str) -> Result<PathReport, EngineError> {
        let candidate = self
            .build_system
            .get_build(nvr)
            .map_err(|err| invalid_build(nvr, &err))?;
        self.check_build(release, &candidate)
    }

    pub fn check_build(
        &self,
        release: &Release,
        candidate: &TaggedBuild,
    ) -> Result<PathReport, EngineError> {
        let mut tag = release.dist_tag.clone();
        let mut tags_checked = Vec::new();
        let mut visited = 0;

        let stop = loop {
            if visited == self.max_release_walk {
                warn!(
                    "update path walk for {} stopped after {visited} releases at {tag}",
                    candidate.nvr
                );
                break WalkStop::Cap;
            }

            match self.check_tag(candidate, &tag)? {
                true => tags_checked.push(tag.clone()),
                false => {
                    debug!("release tag {tag} does not exist; end of history");
                    break WalkStop::TagNotFound;
                }
            }
            let updates_tag = format!("{tag}-updates");
            if self.check_tag(candidate, &updates_tag)? {
                tags_checked.push(updates_tag);
            }
            visited += 1;

            match previous_release_tag(&tag)? {
                Some(previous) => tag = previous,
                None => break WalkStop::Floor,
            }
        };

        Ok(PathReport {
            candidate: candidate.nvr.clone(),
            tags_checked,
            stop,
        })
    }

    /// Compare against everything of the same package in `tag`. Returns
    /// false when the tag does not exist.
    fn check_tag(&self, candidate: &TaggedBuild, tag: &str) -> Result<bool, EngineError> {
        let tagged = match self.build_system.list_tagged(tag, &candidate.name) {
            Ok(tagged) => tagged,
            Err(BuildSystemError::TagNotFound(_)) => return Ok(false),
            Err(err) => return Err(invalid_build(&candidate.nvr, &err)),
        };

        let candidate_evr = candidate.evr();
        for existing in tagged.iter().filter(|b| b.name == candidate.name) {
            if self.comparator.compare(&candidate_evr, &existing.evr()) == Ordering::Less {
                return Err(EngineError::BrokenUpdatePath {
                    candidate: candidate.nvr.clone(),
                    conflicting: existing.nvr.clone(),
                    tag: tag.to_string(),
                });
            }
        }
        Ok(true)
    }
}

fn invalid_build(nvr: &str, err: &BuildSystemError) -> EngineError {
    EngineError::InvalidBuild {
        build: nvr.to_string(),
        reason: err.to_string(),
    }
}
