//! Configuration and manifest schema types.
//!
//! `ProjectConfig` is the optional `simforge.yaml` at the project root;
//! `SimulationManifest` is the declarative `simulation.json` the generated
//! runtime consumes. Both derive Serialize/Deserialize for roundtripping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default tag of the runner-template repository used when none is configured.
pub const DEFAULT_RUNNER_VERSION: &str = "main";

/// URL of the runner-template repository.
pub const RUNNER_REPO_URL: &str = "https://github.com/simforge/simforge-runners.git";

/// Version label of a cache slot populated from a local directory.
pub const CUSTOM_RUNNER_VERSION: &str = "custom";

/// Title used when the manifest leaves it blank.
pub const DEFAULT_TITLE: &str = "Simulation";

// ============================================================================
// Platforms
// ============================================================================

/// A target runtime the simulation can be prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformKind {
    Html,
    Desktop,
    Android,
}

impl PlatformKind {
    /// Every known platform, in preparation order.
    pub fn all() -> [PlatformKind; 3] {
        [PlatformKind::Html, PlatformKind::Desktop, PlatformKind::Android]
    }

    /// Html runs in the browser without runtime type introspection;
    /// implementors of the extension points must be discovered at build time.
    pub fn requires_static_discovery(&self) -> bool {
        matches!(self, PlatformKind::Html)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "Html"),
            Self::Desktop => write!(f, "Desktop"),
            Self::Android => write!(f, "Android"),
        }
    }
}

impl std::str::FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "desktop" => Ok(Self::Desktop),
            "android" => Ok(Self::Android),
            other => Err(format!(
                "unknown platform '{other}' (expected html, desktop or android)"
            )),
        }
    }
}

// ============================================================================
// Simulation manifest
// ============================================================================

/// Declarative description of a simulation project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationManifest {
    /// Window/page title. Optional; defaulted at load.
    #[serde(default)]
    pub title: String,

    /// Initial screen width in pixels.
    pub screen_width: u32,

    /// Initial screen height in pixels.
    pub screen_height: u32,

    /// Target platforms. Optional; empty means all known kinds.
    #[serde(default)]
    pub platforms: Vec<PlatformKind>,

    /// Simulation states by name (order-preserving).
    #[serde(default)]
    pub states: IndexMap<String, StateSpec>,

    /// Name of the state the simulation starts in; must be a key of `states`.
    #[serde(default)]
    pub initial_state: Option<String>,
}

impl SimulationManifest {
    /// True when `platform` is in the manifest's (already defaulted) set.
    pub fn targets(&self, platform: PlatformKind) -> bool {
        self.platforms.contains(&platform)
    }
}

/// A single simulation state entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    /// Qualified name of the type implementing the state.
    #[serde(rename = "class")]
    pub type_name: String,

    /// Free-form state parameters handed to the runtime.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

// ============================================================================
// Project configuration (simforge.yaml)
// ============================================================================

/// Tool configuration at the project root. Every field is optional; a
/// missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Log level injected into runner configs (defaults to "info").
    #[serde(default)]
    pub log_level: Option<String>,

    /// When present, runners only emit logs for these topics.
    #[serde(default)]
    pub log_topics: Vec<String>,

    /// Debug flag injected into runner configs.
    #[serde(default)]
    pub debug_mode: bool,

    /// Directory watched by the desktop runner in dev mode.
    #[serde(default)]
    pub dev_mode_dir: Option<String>,

    /// Runner template selection.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Project identity and directory overrides.
    #[serde(default)]
    pub project: ProjectSection,

    /// Export overrides.
    #[serde(default)]
    pub export: ExportConfig,
}

impl ProjectConfig {
    /// Effective log level for injected runner configs.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Which runner template to use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Tag/branch of the runner repository. Blank means the default tag.
    #[serde(default)]
    pub version: Option<String>,

    /// Local runner project directory; takes priority over `version` and is
    /// re-synced into the cache on every invocation.
    #[serde(default)]
    pub directory: Option<String>,
}

/// Project identity handed to the external build actions, plus directory
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Override for the project `simulation/` directory.
    #[serde(default)]
    pub directory: Option<String>,

    /// Version string exported to the runner build.
    #[serde(default = "default_version")]
    pub version: String,

    /// Numeric version code exported to the runner build.
    #[serde(default = "default_version_code")]
    pub version_code: u32,

    /// Group/organization identifier exported to the runner build.
    #[serde(default = "default_group")]
    pub group: String,

    /// Marker types whose implementors are discovered for platforms without
    /// runtime introspection.
    #[serde(default = "default_reflection_markers")]
    pub reflection_markers: Vec<String>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            directory: None,
            version: default_version(),
            version_code: default_version_code(),
            group: default_group(),
            reflection_markers: default_reflection_markers(),
        }
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_version_code() -> u32 {
    1
}

fn default_group() -> String {
    "simforge.project".to_string()
}

fn default_reflection_markers() -> Vec<String> {
    vec![
        "simforge.runtime.state.SimulationState".to_string(),
        "simforge.runtime.entity.Component".to_string(),
    ]
}

/// Export destination override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination for production artifacts; defaults to the cache
    /// `distribution/` directory.
    #[serde(default)]
    pub directory: Option<String>,
}
