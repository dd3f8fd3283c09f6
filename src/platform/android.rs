//! Android platform profile.
//!
//! Besides the declaration-style config template, the android runner takes
//! the simulation title through its string resources (markup injection) and
//! launcher icons through density-mapped drawable directories.

use super::common_attributes;
use crate::core::error::PipelineError;
use crate::core::types::ProjectConfig;
use crate::fsops;
use crate::inject::AttributeSet;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Default launcher icon file names, one per supported density.
pub const ICONS: [&str; 5] = [
    "icon48.png",
    "icon72.png",
    "icon96.png",
    "icon144.png",
    "icon192.png",
];

/// Attributes injected into the android runner config template.
pub fn attributes(config: &ProjectConfig) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    common_attributes(&mut attrs, config);
    attrs
}

/// Markup attributes injected into the android string resources.
pub fn string_attributes(title: &str) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    attrs.insert("app_name", title);
    attrs
}

/// The string resources file inside the android runner directory.
pub fn strings_file(android_runner_dir: &Path) -> std::path::PathBuf {
    android_runner_dir.join("res").join("values").join("strings.xml")
}

/// Map an icon pixel size to the android density directory suffix.
fn density_for(size: u32) -> Option<&'static str> {
    match size {
        48 => Some("mdpi"),
        72 => Some("hdpi"),
        96 => Some("xhdpi"),
        144 => Some("xxhdpi"),
        192 => Some("xxxhdpi"),
        _ => None,
    }
}

/// Copy density-mapped launcher icons from an icon source directory into the
/// android runner's `res/` tree (`drawable-<density>/ic_launcher.png`).
/// Missing or oddly-sized icons are logged and skipped.
pub fn stage_launcher_icons(
    icons_source_dir: &Path,
    android_runner_dir: &Path,
) -> Result<(), PipelineError> {
    let name_pattern = Regex::new(r"^icon(\d+)\.png$").expect("icon name pattern compiles");
    let res_dir = android_runner_dir.join("res");
    for icon in ICONS {
        let source = icons_source_dir.join(icon);
        if !source.is_file() {
            debug!("no {icon} in {}", icons_source_dir.display());
            continue;
        }
        let size: u32 = name_pattern
            .captures(icon)
            .and_then(|c| c[1].parse().ok())
            .expect("icon names in ICONS parse");
        let Some(density) = density_for(size) else {
            warn!("icon size {size}x{size} has no android density mapping");
            continue;
        };
        let target_dir = res_dir.join(format!("drawable-{density}"));
        fsops::create_dir_if_not_exists(&target_dir)?;
        let target = target_dir.join("ic_launcher.png");
        std::fs::copy(&source, &target)
            .map_err(|e| PipelineError::io("cannot copy icon", &source, e))?;
        debug!("staged launcher icon {icon} -> {}", target.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_attributes_carry_title() {
        let attrs = string_attributes("Orbit Lab");
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_strings_file_location() {
        assert_eq!(
            strings_file(Path::new("/r/android-runner")),
            std::path::PathBuf::from("/r/android-runner/res/values/strings.xml")
        );
    }

    #[test]
    fn test_density_mapping() {
        assert_eq!(density_for(48), Some("mdpi"));
        assert_eq!(density_for(192), Some("xxxhdpi"));
        assert_eq!(density_for(64), None);
    }

    #[test]
    fn test_stage_launcher_icons() {
        let icons = tempfile::tempdir().unwrap();
        let runner = tempfile::tempdir().unwrap();
        for icon in ICONS {
            std::fs::write(icons.path().join(icon), b"png-bytes").unwrap();
        }

        stage_launcher_icons(icons.path(), runner.path()).unwrap();

        for density in ["mdpi", "hdpi", "xhdpi", "xxhdpi", "xxxhdpi"] {
            let target = runner
                .path()
                .join("res")
                .join(format!("drawable-{density}"))
                .join("ic_launcher.png");
            assert!(target.is_file(), "missing {}", target.display());
        }
    }

    #[test]
    fn test_stage_launcher_icons_tolerates_missing_sources() {
        let icons = tempfile::tempdir().unwrap();
        let runner = tempfile::tempdir().unwrap();
        std::fs::write(icons.path().join("icon48.png"), b"png").unwrap();

        stage_launcher_icons(icons.path(), runner.path()).unwrap();
        assert!(runner.path().join("res/drawable-mdpi/ic_launcher.png").exists());
        assert!(!runner.path().join("res/drawable-hdpi").exists());
    }
}
