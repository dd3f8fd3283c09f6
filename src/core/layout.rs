//! Path derivations for the project and cache tree.
//!
//! All helpers are pure path math; nothing here touches the filesystem.
//! The layout:
//!
//! ```text
//! project/
//!   simforge.yaml
//!   simulation/            manifest + assets + icons (overridable)
//!   resources/             extra project assets staged alongside simulation assets
//!   build/
//!     classes/             compiled type descriptors (*.typeinfo)
//!     deps/                dependency archives (zip)
//!     simforge/            cache tree managed by this tool
//!       runners/<version>/
//!       resources/
//!       distribution/
//! ```

use super::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// File name of the simulation manifest inside the simulation directory.
pub const MANIFEST_FILE_NAME: &str = "simulation.json";

/// File name of the project configuration at the project root.
pub const CONFIG_FILE_NAME: &str = "simforge.yaml";

/// File name of the persisted discovery listing in the resource area.
pub const REFLECTION_FILE_NAME: &str = "reflection.simforge";

/// The project configuration file.
pub fn config_file(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// The simulation directory, honoring the `project.directory` override.
pub fn simulation_dir(project_dir: &Path, config: &ProjectConfig) -> PathBuf {
    match config.project.directory.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => project_dir.join("simulation"),
    }
}

/// The project manifest file inside the simulation directory.
pub fn manifest_file(simulation_dir: &Path) -> PathBuf {
    simulation_dir.join(MANIFEST_FILE_NAME)
}

/// The project `build/` directory produced by the project's own build.
pub fn build_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("build")
}

/// Root of the project's compiled type descriptors.
pub fn classes_dir(project_dir: &Path) -> PathBuf {
    build_dir(project_dir).join("classes")
}

/// Directory holding the project's dependency archives.
pub fn deps_dir(project_dir: &Path) -> PathBuf {
    build_dir(project_dir).join("deps")
}

/// Extra project assets directory staged alongside simulation assets.
pub fn project_resources_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("resources")
}

/// Root of the cache tree managed by this tool.
pub fn cache_dir(project_dir: &Path) -> PathBuf {
    build_dir(project_dir).join("simforge")
}

/// Parent of all cached runner working directories, keyed by version.
pub fn runners_dir(project_dir: &Path) -> PathBuf {
    cache_dir(project_dir).join("runners")
}

/// Staged resource area consumed by the runner templates.
pub fn resources_dir(project_dir: &Path) -> PathBuf {
    cache_dir(project_dir).join("resources")
}

/// Staged assets directory inside the resource area.
pub fn assets_dir(project_dir: &Path) -> PathBuf {
    resources_dir(project_dir).join("assets")
}

/// Staged icons directory inside the resource area.
pub fn icons_dir(project_dir: &Path) -> PathBuf {
    resources_dir(project_dir).join("icons")
}

/// The finalized manifest persisted for the generated runtime.
pub fn staged_manifest_file(project_dir: &Path) -> PathBuf {
    resources_dir(project_dir).join(MANIFEST_FILE_NAME)
}

/// The persisted discovery listing for platforms without runtime
/// introspection.
pub fn reflection_file(project_dir: &Path) -> PathBuf {
    resources_dir(project_dir).join(REFLECTION_FILE_NAME)
}

/// Production artifact destination, honoring the `export.directory` override.
pub fn distribution_dir(project_dir: &Path, config: &ProjectConfig) -> PathBuf {
    match config.export.directory.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cache_dir(project_dir).join("distribution"),
    }
}
