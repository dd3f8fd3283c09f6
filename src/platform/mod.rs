//! Per-platform preparation profiles: where each platform's runner template
//! lives, which attributes get injected into its config template, and which
//! external task names run or package it.

pub mod android;
pub mod desktop;
pub mod html;

use crate::core::types::{PlatformKind, ProjectConfig, SimulationManifest};
use crate::inject::AttributeSet;
use std::path::{Path, PathBuf};

/// The platform's runner template directory inside a runner working
/// directory.
pub fn runner_dir(working_directory: &Path, platform: PlatformKind) -> PathBuf {
    let name = match platform {
        PlatformKind::Html => "html-runner",
        PlatformKind::Desktop => "desktop-runner",
        PlatformKind::Android => "android-runner",
    };
    working_directory.join(name)
}

/// The config template file injection rewrites, inside a platform runner
/// directory.
pub fn config_template_file(platform_runner_dir: &Path) -> PathBuf {
    platform_runner_dir.join("src").join("config.rs")
}

/// Default icon set bundled at the root of the runner working directory.
pub fn default_icons_dir(working_directory: &Path) -> PathBuf {
    working_directory.join("icons")
}

/// Ordered external task names that run the simulation on a platform.
pub fn run_tasks(platform: PlatformKind) -> &'static [&'static str] {
    match platform {
        PlatformKind::Html => &["serve-html"],
        PlatformKind::Desktop => &["run"],
        PlatformKind::Android => &["install-debug", "run-android"],
    }
}

/// Ordered external task names that produce a platform's production
/// artifacts.
pub fn export_tasks(platform: PlatformKind) -> &'static [&'static str] {
    match platform {
        PlatformKind::Html => &["build"],
        PlatformKind::Desktop => &["package-image"],
        PlatformKind::Android => &["package-release"],
    }
}

/// Where the external build action leaves a platform's finished artifacts,
/// relative to the platform runner directory.
pub fn artifact_dir(platform_runner_dir: &Path, platform: PlatformKind) -> PathBuf {
    match platform {
        PlatformKind::Html => platform_runner_dir.join("build").join("dist").join("webapp"),
        PlatformKind::Desktop => platform_runner_dir.join("build").join("package"),
        PlatformKind::Android => platform_runner_dir
            .join("build")
            .join("outputs")
            .join("release"),
    }
}

/// Build the attribute set injected into a platform's config template.
/// Each platform gets its own set; nothing is shared between them.
pub fn build_attributes(
    platform: PlatformKind,
    manifest: &SimulationManifest,
    config: &ProjectConfig,
) -> AttributeSet {
    match platform {
        PlatformKind::Html => html::attributes(manifest, config),
        PlatformKind::Desktop => desktop::attributes(config),
        PlatformKind::Android => android::attributes(config),
    }
}

/// Attributes every platform config template declares.
pub(crate) fn common_attributes(attrs: &mut AttributeSet, config: &ProjectConfig) {
    attrs.insert("LOG_LEVEL", config.effective_log_level());
    attrs.insert("DEBUG_MODE", config.debug_mode);
    if !config.log_topics.is_empty() {
        attrs.insert("LOG_TOPICS", config.log_topics.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_dirs() {
        let working = Path::new("/cache/main");
        assert_eq!(
            runner_dir(working, PlatformKind::Html),
            PathBuf::from("/cache/main/html-runner")
        );
        assert_eq!(
            runner_dir(working, PlatformKind::Android),
            PathBuf::from("/cache/main/android-runner")
        );
    }

    #[test]
    fn test_config_template_location() {
        assert_eq!(
            config_template_file(Path::new("/r/html-runner")),
            PathBuf::from("/r/html-runner/src/config.rs")
        );
    }

    #[test]
    fn test_task_mappings_differ_between_run_and_export() {
        for platform in PlatformKind::all() {
            assert!(!run_tasks(platform).is_empty());
            assert!(!export_tasks(platform).is_empty());
            assert_ne!(run_tasks(platform), export_tasks(platform));
        }
        assert_eq!(run_tasks(PlatformKind::Android), &["install-debug", "run-android"]);
        assert_eq!(export_tasks(PlatformKind::Desktop), &["package-image"]);
    }

    #[test]
    fn test_attribute_sets_are_distinct_per_platform() {
        let manifest = SimulationManifest {
            title: "T".into(),
            screen_width: 100,
            screen_height: 50,
            platforms: PlatformKind::all().to_vec(),
            states: Default::default(),
            initial_state: None,
        };
        let config = ProjectConfig::default();
        let html = build_attributes(PlatformKind::Html, &manifest, &config);
        let desktop = build_attributes(PlatformKind::Desktop, &manifest, &config);
        // Html carries title/dimensions; desktop does not.
        assert_eq!(html.len(), 5);
        assert_eq!(desktop.len(), 2);
    }
}
