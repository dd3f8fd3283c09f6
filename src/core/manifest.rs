//! Simulation manifest loading, validation and normalization.
//!
//! Two passes run at different pipeline stages: `validate_project` is the
//! pre-preparation gate (nothing is cached or fetched until it passes);
//! `load_with_defaults` runs during preparation and fills the optional
//! `title`/`platforms` attributes before the manifest is re-serialized into
//! the runner resource area.

use super::error::PipelineError;
use super::layout;
use super::types::{PlatformKind, ProjectConfig, SimulationManifest, DEFAULT_TITLE};
use std::path::Path;
use tracing::debug;

/// Parse a simulation manifest from a file.
pub fn parse_manifest_file(path: &Path) -> Result<SimulationManifest, PipelineError> {
    let content = crate::fsops::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PipelineError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Pre-preparation gate: the simulation directory and manifest must exist,
/// `states` must be non-empty and `initialState` must name one of them.
/// Runs before any cache mutation or fetch work.
pub fn validate_project(project_dir: &Path, config: &ProjectConfig) -> Result<(), PipelineError> {
    let simulation_dir = layout::simulation_dir(project_dir, config);
    if !simulation_dir.is_dir() {
        return Err(PipelineError::Precondition(format!(
            "can't find 'simulation' directory at {}",
            simulation_dir.display()
        )));
    }
    let manifest_path = layout::manifest_file(&simulation_dir);
    if !manifest_path.is_file() {
        return Err(PipelineError::Precondition(format!(
            "can't find '{}' manifest file in {}",
            layout::MANIFEST_FILE_NAME,
            simulation_dir.display()
        )));
    }
    let manifest = parse_manifest_file(&manifest_path)?;
    validate_manifest(&manifest)
}

/// Structural manifest checks shared by the gate and by tests.
pub fn validate_manifest(manifest: &SimulationManifest) -> Result<(), PipelineError> {
    if manifest.states.is_empty() {
        return Err(PipelineError::ManifestInvalid {
            field: "states",
            reason: "can't be empty".to_string(),
        });
    }
    match &manifest.initial_state {
        None => Err(PipelineError::ManifestInvalid {
            field: "initialState",
            reason: "must be specified".to_string(),
        }),
        Some(initial) if !manifest.states.contains_key(initial) => {
            Err(PipelineError::ManifestInvalid {
                field: "initialState",
                reason: format!("'{initial}' is not a key of 'states'"),
            })
        }
        Some(_) => Ok(()),
    }
}

/// Load the manifest and default its optional attributes: a blank `title`
/// becomes the fixed fallback, an empty `platforms` becomes every known
/// kind. Idempotent — defaulting an already-defaulted manifest is a no-op.
pub fn load_with_defaults(path: &Path) -> Result<SimulationManifest, PipelineError> {
    let mut manifest = parse_manifest_file(path)?;
    apply_defaults(&mut manifest);
    Ok(manifest)
}

/// Fill optional attributes in place. Duplicate platform entries collapse to
/// the first occurrence so the set semantics hold.
pub fn apply_defaults(manifest: &mut SimulationManifest) {
    if manifest.title.trim().is_empty() {
        manifest.title = DEFAULT_TITLE.to_string();
    }
    if manifest.platforms.is_empty() {
        manifest.platforms = PlatformKind::all().to_vec();
    } else {
        let mut seen = Vec::with_capacity(manifest.platforms.len());
        manifest.platforms.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });
    }
}

/// Serialize the finalized manifest into the runner resource area so the
/// generated runtime can consume it.
pub fn stage_manifest(
    manifest: &SimulationManifest,
    staged_path: &Path,
) -> Result<(), PipelineError> {
    let data = serde_json::to_string_pretty(manifest).map_err(|e| PipelineError::Parse {
        path: staged_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!("staging simulation manifest at {}", staged_path.display());
    crate::fsops::write_string(staged_path, &data)
}
