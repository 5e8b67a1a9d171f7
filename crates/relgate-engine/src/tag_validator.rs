//! Build tag validation: every submitted build must carry the tag its
//! release expects before an update may reference it.

use relgate_model::{Release, Update};
use tracing::debug;

use crate::collaborators::BuildSystem;
use crate::error::EngineError;
use crate::fanout::try_map_concurrent;

/// Tag `nvr` must carry.
///
/// Builds already part of the update under edit keep whatever tag that
/// update's status implies; anything else must be a fresh candidate.
pub fn expected_tag(release: &Release, nvr: &str, edited: Option<&Update>) -> String {
    match edited {
        Some(update) if update.has_build(nvr) => update.current_tag(release),
        _ => release.candidate_tag(),
    }
}

/// Check every build's tags. Any lookup failure rejects the whole set.
pub fn validate_build_tags(
    build_system: &dyn BuildSystem,
    release: &Release,
    builds: &[String],
    edited: Option<&Update>,
) -> Result<(), EngineError> {
    try_map_concurrent(builds, |nvr| {
        debug!("validating build-system tags for {nvr}");
        let tags = build_system
            .list_tags(nvr)
            .map_err(|err| EngineError::InvalidBuild {
                build: nvr.clone(),
                reason: err.to_string(),
            })?;

        let expected = expected_tag(release, nvr, edited);
        if tags.iter().any(|t| *t == expected) {
            Ok(())
        } else {
            Err(EngineError::UntaggedBuild {
                build: nvr.clone(),
                tag: expected,
            })
        }
    })?;
    Ok(())
}
