//! Runner template resolution and cache materialization.
//!
//! The runner is a versioned template project that, combined with injected
//! configuration, becomes the platform-specific wrapper around the
//! simulation. Resolution picks a version, and ensure-present guarantees
//! the matching cache slot is populated: tagged/default versions fetch once
//! per cache entry, a custom local directory is re-synced on every
//! invocation so local edits always show up.

pub mod git;

use crate::core::error::PipelineError;
use crate::core::types::{
    ProjectConfig, CUSTOM_RUNNER_VERSION, DEFAULT_RUNNER_VERSION, RUNNER_REPO_URL,
};
use crate::fsops;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Version-control metadata is never synced from a custom source directory.
const SYNC_EXCLUDE_PATTERN: &str = "**/.git*";

/// A resolved runner: which version and where its working directory lives.
///
/// `custom_source_dir` is `Some` exactly when `version` is `"custom"`. The
/// working directory persists across runs as an on-disk cache keyed by
/// version. Concurrent invocations against the same cache root are not
/// coordinated; in particular two custom-mode runs share the `custom` slot.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    pub version: String,
    pub working_directory: PathBuf,
    pub custom_source_dir: Option<PathBuf>,
}

impl RunnerHandle {
    pub fn is_custom(&self) -> bool {
        self.custom_source_dir.is_some()
    }
}

impl std::fmt::Display for RunnerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.custom_source_dir {
            Some(src) => write!(
                f,
                "runner '{}' at {} (custom source {})",
                self.version,
                self.working_directory.display(),
                src.display()
            ),
            None => write!(
                f,
                "runner '{}' at {}",
                self.version,
                self.working_directory.display()
            ),
        }
    }
}

/// Decide which runner to use. First match wins: an existing configured
/// custom directory, then a non-blank configured version tag, then the
/// fixed default tag. Custom source always takes priority over a configured
/// version.
pub fn resolve(config: &ProjectConfig, runners_dir: &Path) -> RunnerHandle {
    let custom_source_dir = config
        .runner
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir());

    let version = if custom_source_dir.is_some() {
        CUSTOM_RUNNER_VERSION.to_string()
    } else {
        config
            .runner
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_RUNNER_VERSION)
            .to_string()
    };

    RunnerHandle {
        working_directory: runners_dir.join(&version),
        version,
        custom_source_dir,
    }
}

/// Guarantee the runner's working directory is materialized.
///
/// A tagged/default runner is fetched from the runner repository only when
/// the cache slot was just created; a fetch failure is fatal with no retry.
/// A custom runner has its source content copied in on every invocation
/// (excluding version-control metadata), even when the slot already existed.
pub fn ensure_present(handle: &RunnerHandle) -> Result<(), PipelineError> {
    ensure_present_from(handle, RUNNER_REPO_URL)
}

/// Same as [`ensure_present`] with an explicit repository URL (tests point
/// this at local fixture repositories).
pub fn ensure_present_from(handle: &RunnerHandle, repo_url: &str) -> Result<(), PipelineError> {
    let created = fsops::create_dir_if_not_exists(&handle.working_directory)?;
    if created {
        debug!(
            "created runner '{}' cache slot {}",
            handle.version,
            handle.working_directory.display()
        );
        if !handle.is_custom() {
            info!("fetching runner template at '{}'", handle.version);
            // git permits cloning into the just-created empty directory.
            git::clone_by_tag(repo_url, &handle.version, &handle.working_directory)
                .map_err(|reason| PipelineError::Resolution {
                    version: handle.version.clone(),
                    reason,
                })?;
            debug!("runner content downloaded");
        }
    }
    if let Some(source) = &handle.custom_source_dir {
        // Local edits must always win; sync on every invocation.
        let exclude = Pattern::new(SYNC_EXCLUDE_PATTERN).expect("exclude pattern compiles");
        fsops::copy_dir_contents(source, &handle.working_directory, Some(&exclude))?;
        debug!("custom runner content synced from {}", source.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RunnerConfig;

    fn config_with_runner(runner: RunnerConfig) -> ProjectConfig {
        ProjectConfig {
            runner,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_default_version() {
        let cache = tempfile::tempdir().unwrap();
        let handle = resolve(&ProjectConfig::default(), cache.path());
        assert_eq!(handle.version, DEFAULT_RUNNER_VERSION);
        assert_eq!(handle.working_directory, cache.path().join(DEFAULT_RUNNER_VERSION));
        assert!(!handle.is_custom());
    }

    #[test]
    fn test_resolve_tagged_version() {
        let cache = tempfile::tempdir().unwrap();
        let config = config_with_runner(RunnerConfig {
            version: Some(" v0.3.0 ".to_string()),
            directory: None,
        });
        let handle = resolve(&config, cache.path());
        assert_eq!(handle.version, "v0.3.0");
        assert_eq!(handle.working_directory, cache.path().join("v0.3.0"));
    }

    #[test]
    fn test_resolve_blank_version_falls_back_to_default() {
        let cache = tempfile::tempdir().unwrap();
        let config = config_with_runner(RunnerConfig {
            version: Some("   ".to_string()),
            directory: None,
        });
        let handle = resolve(&config, cache.path());
        assert_eq!(handle.version, DEFAULT_RUNNER_VERSION);
    }

    #[test]
    fn test_custom_directory_takes_priority_over_version() {
        let cache = tempfile::tempdir().unwrap();
        let custom = tempfile::tempdir().unwrap();
        let config = config_with_runner(RunnerConfig {
            version: Some("v9.9.9".to_string()),
            directory: Some(custom.path().to_string_lossy().into_owned()),
        });
        let handle = resolve(&config, cache.path());
        assert_eq!(handle.version, CUSTOM_RUNNER_VERSION);
        assert_eq!(handle.working_directory, cache.path().join("custom"));
        assert_eq!(handle.custom_source_dir.as_deref(), Some(custom.path()));
    }

    #[test]
    fn test_nonexistent_custom_directory_ignored() {
        let cache = tempfile::tempdir().unwrap();
        let config = config_with_runner(RunnerConfig {
            version: None,
            directory: Some("/definitely/not/there".to_string()),
        });
        let handle = resolve(&config, cache.path());
        assert_eq!(handle.version, DEFAULT_RUNNER_VERSION);
        assert!(!handle.is_custom());
    }

    #[test]
    fn test_custom_syncs_every_invocation() {
        let cache = tempfile::tempdir().unwrap();
        let custom = tempfile::tempdir().unwrap();
        std::fs::write(custom.path().join("template.rs"), "v1").unwrap();

        let config = config_with_runner(RunnerConfig {
            version: None,
            directory: Some(custom.path().to_string_lossy().into_owned()),
        });
        let handle = resolve(&config, cache.path());

        ensure_present(&handle).unwrap();
        assert_eq!(
            std::fs::read_to_string(handle.working_directory.join("template.rs")).unwrap(),
            "v1"
        );

        // Edit the custom source; a second invocation must pick it up even
        // though the cache slot already exists.
        std::fs::write(custom.path().join("template.rs"), "v2").unwrap();
        ensure_present(&handle).unwrap();
        assert_eq!(
            std::fs::read_to_string(handle.working_directory.join("template.rs")).unwrap(),
            "v2"
        );
    }

    #[test]
    fn test_custom_sync_skips_git_metadata() {
        let cache = tempfile::tempdir().unwrap();
        let custom = tempfile::tempdir().unwrap();
        std::fs::write(custom.path().join("keep.rs"), "k").unwrap();
        std::fs::create_dir(custom.path().join(".git")).unwrap();
        std::fs::write(custom.path().join(".git/HEAD"), "ref").unwrap();

        let config = config_with_runner(RunnerConfig {
            version: None,
            directory: Some(custom.path().to_string_lossy().into_owned()),
        });
        let handle = resolve(&config, cache.path());
        ensure_present(&handle).unwrap();

        assert!(handle.working_directory.join("keep.rs").exists());
        assert!(!handle.working_directory.join(".git").exists());
    }

    #[test]
    fn test_fetch_failure_is_fatal_resolution_error() {
        let cache = tempfile::tempdir().unwrap();
        let handle = RunnerHandle {
            version: "v0.0.0".to_string(),
            working_directory: cache.path().join("v0.0.0"),
            custom_source_dir: None,
        };
        let err = ensure_present_from(&handle, "/nonexistent/repo.git").unwrap_err();
        assert!(matches!(err, PipelineError::Resolution { .. }));
    }

    #[test]
    fn test_existing_tagged_slot_not_refetched() {
        let cache = tempfile::tempdir().unwrap();
        let handle = RunnerHandle {
            version: "v1".to_string(),
            working_directory: cache.path().join("v1"),
            custom_source_dir: None,
        };
        // Pre-populate the slot: ensure_present must not try to fetch (a
        // fetch from this bogus URL would error).
        std::fs::create_dir_all(&handle.working_directory).unwrap();
        ensure_present_from(&handle, "/nonexistent/repo.git").unwrap();
    }
}
