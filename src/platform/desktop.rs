//! Desktop platform profile.

use super::common_attributes;
use crate::core::types::ProjectConfig;
use crate::inject::AttributeSet;

/// Default icon file names the desktop runner expects in the staged icons
/// directory (png for windows, ico for linux, icns for mac).
pub const ICONS: [&str; 7] = [
    "icon32.png",
    "icon32.ico",
    "icon32.icns",
    "icon128.png",
    "icon128.ico",
    "icon128.icns",
    "logo.png",
];

/// Attributes injected into the desktop runner config template.
pub fn attributes(config: &ProjectConfig) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    common_attributes(&mut attrs, config);
    if let Some(dir) = config.dev_mode_dir.as_deref().map(str::trim) {
        if !dir.is_empty() {
            attrs.insert("DEV_MODE_DIR", dir);
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_attributes() {
        let attrs = attributes(&ProjectConfig::default());
        assert_eq!(attrs.len(), 2); // LOG_LEVEL + DEBUG_MODE
    }

    #[test]
    fn test_dev_mode_dir_included_when_set() {
        let config = ProjectConfig {
            dev_mode_dir: Some("/watch/me".into()),
            ..Default::default()
        };
        assert_eq!(attributes(&config).len(), 3);
    }

    #[test]
    fn test_blank_dev_mode_dir_ignored() {
        let config = ProjectConfig {
            dev_mode_dir: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(attributes(&config).len(), 2);
    }
}
