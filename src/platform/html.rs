//! Html (browser) platform profile. The only platform requiring static
//! type discovery — the pipeline persists a reflection listing next to the
//! staged resources after injection.

use super::common_attributes;
use crate::core::types::{ProjectConfig, SimulationManifest};
use crate::inject::AttributeSet;

/// Attributes injected into the html runner config template.
pub fn attributes(manifest: &SimulationManifest, config: &ProjectConfig) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    attrs.insert("TITLE", manifest.title.as_str());
    attrs.insert("SCREEN_WIDTH", manifest.screen_width);
    attrs.insert("SCREEN_HEIGHT", manifest.screen_height);
    common_attributes(&mut attrs, config);
    attrs
}
