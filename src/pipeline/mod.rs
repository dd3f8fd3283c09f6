//! Pipeline orchestration.
//!
//! Sequences the preparation steps per target platform and hands off to the
//! external build-invocation collaborator:
//! require built project → cache tree → resolve runner → manifest +
//! asset/icon staging → per platform: config injection (and, for platforms
//! without runtime introspection, static type discovery) → run/export
//! delegation.
//!
//! Re-running is safe: directory creation is existence-checked, staging
//! overwrites unconditionally, custom runners re-sync, and injection always
//! starts from a pristine copy of each template file.

use crate::core::error::PipelineError;
use crate::core::layout;
use crate::core::manifest;
use crate::core::types::{PlatformKind, ProjectConfig, SimulationManifest};
use crate::exec;
use crate::fsops;
use crate::inject::declaration::DeclarationStrategy;
use crate::inject::markup::MarkupStrategy;
use crate::inject::{AttributeSet, ReplaceStrategy};
use crate::platform;
use crate::runner::{self, RunnerHandle};
use crate::scan;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variables handed to the external build actions.
pub const ENV_PROJECT_TITLE: &str = "SIMFORGE_PROJECT_TITLE";
pub const ENV_PROJECT_VERSION: &str = "SIMFORGE_PROJECT_VERSION";
pub const ENV_PROJECT_VERSION_CODE: &str = "SIMFORGE_PROJECT_VERSION_CODE";
pub const ENV_PROJECT_GROUP: &str = "SIMFORGE_PROJECT_GROUP";

/// Result of a successful preparation: the resolved runner and the
/// finalized manifest the platform steps worked from.
#[derive(Debug)]
pub struct PreparedSimulation {
    pub runner: RunnerHandle,
    pub manifest: SimulationManifest,
}

/// Prepare the simulation environment: materialize the runner, stage
/// resources, inject every configured platform's config template and
/// persist the discovery listing where static discovery is required.
pub fn prepare(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<PreparedSimulation, PipelineError> {
    info!("preparing simulation environment");
    if !layout::build_dir(project_dir).is_dir() {
        return Err(PipelineError::Precondition(
            "project must be built before preparing its simulation".to_string(),
        ));
    }
    if fsops::create_dir_if_not_exists(&layout::cache_dir(project_dir))? {
        debug!("created simulation cache directory");
    }

    let runner = prepare_runner(project_dir, config)?;
    let manifest = prepare_resources(project_dir, config, &runner)?;

    for platform in manifest.platforms.iter().copied() {
        debug!("preparing {platform} resources");
        prepare_platform(project_dir, config, &runner, &manifest, platform)?;
    }
    info!("simulation environment is ready");
    Ok(PreparedSimulation { runner, manifest })
}

fn prepare_runner(project_dir: &Path, config: &ProjectConfig) -> Result<RunnerHandle, PipelineError> {
    let runners_dir = layout::runners_dir(project_dir);
    if fsops::create_dir_if_not_exists(&runners_dir)? {
        debug!("created simulation runners directory");
    }
    let handle = runner::resolve(config, &runners_dir);
    runner::ensure_present(&handle)?;
    info!("using {handle}");
    Ok(handle)
}

fn prepare_resources(
    project_dir: &Path,
    config: &ProjectConfig,
    runner: &RunnerHandle,
) -> Result<SimulationManifest, PipelineError> {
    let resources_dir = layout::resources_dir(project_dir);
    if fsops::create_dir_if_not_exists(&resources_dir)? {
        debug!("created simulation resources directory");
    }

    let simulation_dir = layout::simulation_dir(project_dir, config);
    debug!("project simulation directory: {}", simulation_dir.display());
    stage_assets(project_dir, &simulation_dir)?;
    stage_icons(project_dir, &simulation_dir, runner)?;

    // Finalize the manifest and persist it for the generated runtime.
    let manifest = manifest::load_with_defaults(&layout::manifest_file(&simulation_dir))?;
    manifest::stage_manifest(&manifest, &layout::staged_manifest_file(project_dir))?;
    Ok(manifest)
}

/// Copy simulation assets and extra project resources into the staged
/// assets directory. Both sources are optional.
fn stage_assets(project_dir: &Path, simulation_dir: &Path) -> Result<(), PipelineError> {
    let staged_assets = layout::assets_dir(project_dir);
    let project_assets = simulation_dir.join("assets");
    if project_assets.is_dir() {
        debug!("'assets' directory located, copying content");
        fsops::copy_dir_contents(&project_assets, &staged_assets, None)?;
    }
    let project_resources = layout::project_resources_dir(project_dir);
    if project_resources.is_dir() {
        debug!("'resources' directory located, copying content");
        fsops::copy_dir_contents(&project_resources, &staged_assets, None)?;
    }
    Ok(())
}

/// Stage icons: runner-bundled defaults first, then project icons on top so
/// custom art always wins. Android launcher icons are density-mapped into
/// the android runner separately (see `prepare_platform`).
fn stage_icons(
    project_dir: &Path,
    simulation_dir: &Path,
    runner: &RunnerHandle,
) -> Result<(), PipelineError> {
    let staged_icons = layout::icons_dir(project_dir);
    fsops::create_dir_if_not_exists(&staged_icons)?;

    let defaults = platform::default_icons_dir(&runner.working_directory);
    if defaults.is_dir() {
        fsops::copy_dir_contents(&defaults, &staged_icons, None)?;
    }
    let project_icons = simulation_dir.join("icons");
    if project_icons.is_dir() {
        info!("'icons' directory located, copying content");
        fsops::copy_dir_contents(&project_icons, &staged_icons, None)?;
    }
    for icon in platform::desktop::ICONS {
        if !staged_icons.join(icon).is_file() {
            warn!("desktop icon '{icon}' missing from staged icons");
        }
    }
    Ok(())
}

fn prepare_platform(
    project_dir: &Path,
    config: &ProjectConfig,
    runner: &RunnerHandle,
    manifest: &SimulationManifest,
    platform_kind: PlatformKind,
) -> Result<(), PipelineError> {
    let platform_dir = platform::runner_dir(&runner.working_directory, platform_kind);
    let template = platform::config_template_file(&platform_dir);
    let mut attrs = platform::build_attributes(platform_kind, manifest, config);
    inject_template(
        &template,
        &mut attrs,
        &DeclarationStrategy::new(),
        runner.is_custom(),
    )?;

    match platform_kind {
        PlatformKind::Android => {
            // Title goes through the string resources, icons through the
            // density-mapped drawable tree.
            let strings = platform::android::strings_file(&platform_dir);
            let mut string_attrs = platform::android::string_attributes(&manifest.title);
            inject_template(
                &strings,
                &mut string_attrs,
                &MarkupStrategy::new(),
                runner.is_custom(),
            )?;
            platform::android::stage_launcher_icons(
                &layout::icons_dir(project_dir),
                &platform_dir,
            )?;
        }
        PlatformKind::Html => {
            persist_discovery_listing(project_dir, config)?;
        }
        PlatformKind::Desktop => {}
    }
    Ok(())
}

/// Rewrite a template file from its pristine copy.
///
/// Injection must never start from previously-injected output, so the first
/// pass snapshots the template to `<file>.orig` and every pass injects from
/// that snapshot. A custom runner re-syncs its sources each invocation, so
/// its snapshot is refreshed each run.
fn inject_template(
    template_path: &Path,
    attrs: &mut AttributeSet,
    strategy: &dyn ReplaceStrategy,
    refresh_pristine: bool,
) -> Result<(), PipelineError> {
    let pristine = pristine_path(template_path);
    if refresh_pristine || !pristine.exists() {
        let content = fsops::read_to_string(template_path)?;
        fsops::write_string(&pristine, &content)?;
    }
    let source = fsops::read_to_string(&pristine)?;
    let updated = crate::inject::rewrite(&source, attrs, strategy)?;
    debug!("injected {} attribute(s) into {}", attrs.len(), template_path.display());
    fsops::write_string(template_path, &updated)
}

fn pristine_path(template_path: &Path) -> PathBuf {
    let file_name = template_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    template_path.with_file_name(format!("{file_name}.orig"))
}

/// Discover implementors of the configured marker types and persist the
/// listing the browser runtime reads in place of reflection. No
/// implementors → no file (and any stale listing is removed).
fn persist_discovery_listing(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<(), PipelineError> {
    let classes_dir = layout::classes_dir(project_dir);
    let archives = scan::collect_archives(&layout::deps_dir(project_dir));
    let graph = scan::TypeGraph::build(&classes_dir, &archives);

    let mut found = BTreeSet::new();
    for marker in &config.project.reflection_markers {
        found.extend(graph.find_implementations(marker));
    }

    let listing = layout::reflection_file(project_dir);
    if found.is_empty() {
        debug!("no items to reflect");
        if listing.exists() {
            std::fs::remove_file(&listing)
                .map_err(|e| PipelineError::io("cannot remove", &listing, e))?;
        }
        return Ok(());
    }
    info!("discovered {} reflectable type(s)", found.len());
    scan::write_listing(&listing, &found)
}

/// Environment variables for the external run/export actions.
pub fn task_env(manifest: &SimulationManifest, config: &ProjectConfig) -> HashMap<String, String> {
    HashMap::from([
        (ENV_PROJECT_TITLE.to_string(), manifest.title.clone()),
        (
            ENV_PROJECT_VERSION.to_string(),
            config.project.version.clone(),
        ),
        (
            ENV_PROJECT_VERSION_CODE.to_string(),
            config.project.version_code.to_string(),
        ),
        (ENV_PROJECT_GROUP.to_string(), config.project.group.clone()),
    ])
}

/// Run the prepared simulation on one platform via the external
/// build-invocation collaborator.
pub fn run(
    config: &ProjectConfig,
    prepared: &PreparedSimulation,
    platform_kind: PlatformKind,
) -> Result<(), PipelineError> {
    if !prepared.manifest.targets(platform_kind) {
        return Err(PipelineError::Precondition(format!(
            "platform '{platform_kind}' is not configured in the simulation manifest"
        )));
    }
    exec::run_tasks(
        &prepared.runner.working_directory,
        &task_env(&prepared.manifest, config),
        platform::run_tasks(platform_kind),
    )
}

/// Produce production artifacts for every configured platform and collect
/// them as zip archives under the distribution directory.
pub fn export(
    project_dir: &Path,
    config: &ProjectConfig,
    prepared: &PreparedSimulation,
) -> Result<(), PipelineError> {
    info!("generating distribution artifacts");
    let distribution_dir = layout::distribution_dir(project_dir, config);
    if fsops::create_dir_if_not_exists(&distribution_dir)? {
        debug!("created distribution directory");
    }

    let env = task_env(&prepared.manifest, config);
    for platform_kind in prepared.manifest.platforms.iter().copied() {
        info!("exporting {platform_kind} artifacts");
        exec::run_tasks(
            &prepared.runner.working_directory,
            &env,
            platform::export_tasks(platform_kind),
        )?;

        let platform_dir = platform::runner_dir(&prepared.runner.working_directory, platform_kind);
        let artifacts = collect_artifacts(&platform::artifact_dir(&platform_dir, platform_kind))?;
        if artifacts.is_empty() {
            return Err(PipelineError::Precondition(format!(
                "[{platform_kind}] can't find any artifacts to archive"
            )));
        }
        let dest = distribution_dir
            .join(platform_kind.to_string())
            .join(format!("{}.zip", prepared.manifest.title));
        crate::archive::zip_items(&dest, &artifacts)?;
        info!("[{platform_kind}] artifacts collected at {}", dest.display());
    }
    Ok(())
}

fn collect_artifacts(artifact_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !artifact_dir.is_dir() {
        return Ok(Vec::new());
    }
    let read_dir = std::fs::read_dir(artifact_dir)
        .map_err(|e| PipelineError::io("cannot read dir", artifact_dir, e))?;
    let mut items: Vec<PathBuf> = read_dir.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    items.sort();
    Ok(items)
}

/// Remove the cached runners, staged resources and generated distribution
/// artifacts. Used when troubleshooting or to force a fresh fetch.
pub fn clean(project_dir: &Path) -> Result<(), PipelineError> {
    info!("cleaning simulation cache");
    if !layout::build_dir(project_dir).is_dir() {
        info!("project 'build' directory does not exist, nothing to do");
        return Ok(());
    }
    if !layout::cache_dir(project_dir).is_dir() {
        info!("simulation cache does not exist in 'build', nothing to do");
        return Ok(());
    }
    if fsops::remove_dir_if_exists(&layout::runners_dir(project_dir))? {
        info!("deleted cached runners");
    }
    if fsops::remove_dir_if_exists(&layout::resources_dir(project_dir))? {
        info!("deleted staged resources");
    }
    let default_distribution = layout::cache_dir(project_dir).join("distribution");
    if fsops::remove_dir_if_exists(&default_distribution)? {
        info!("deleted distribution artifacts");
    }
    Ok(())
}
