//! CLI subcommands — validate, prepare, run, export, clean.

use crate::core::error::PipelineError;
use crate::core::layout;
use crate::core::manifest;
use crate::core::types::{PlatformKind, ProjectConfig};
use crate::pipeline;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the project's simulation configuration
    Validate {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Prepare the simulation environment (runner, resources, platform configs)
    Prepare {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Prepare and run the simulation on one platform (dev mode)
    Run {
        /// Target platform: html, desktop or android
        platform: PlatformKind,

        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Generate production artifacts for every configured platform
    Export {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Delete cached runners, staged resources and distribution artifacts
    Clean {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), PipelineError> {
    match cmd {
        Commands::Validate { project } => cmd_validate(&project),
        Commands::Prepare { project } => cmd_prepare(&project),
        Commands::Run { platform, project } => cmd_run(&project, platform),
        Commands::Export { project } => cmd_export(&project),
        Commands::Clean { project } => pipeline::clean(&project),
    }
}

/// Load `simforge.yaml` from the project root; a missing file yields the
/// all-defaults configuration.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, PipelineError> {
    let path = layout::config_file(project_dir);
    if !path.is_file() {
        return Ok(ProjectConfig::default());
    }
    let content = crate::fsops::read_to_string(&path)?;
    serde_yaml_ng::from_str(&content).map_err(|e| PipelineError::Parse {
        path,
        reason: e.to_string(),
    })
}

fn cmd_validate(project_dir: &Path) -> Result<(), PipelineError> {
    let config = load_config(project_dir)?;
    manifest::validate_project(project_dir, &config)?;
    println!("OK: project simulation configuration is valid");
    Ok(())
}

fn cmd_prepare(project_dir: &Path) -> Result<(), PipelineError> {
    let config = load_config(project_dir)?;
    manifest::validate_project(project_dir, &config)?;
    let prepared = pipeline::prepare(project_dir, &config)?;
    println!(
        "Prepared '{}' for {} platform(s) with runner '{}'",
        prepared.manifest.title,
        prepared.manifest.platforms.len(),
        prepared.runner.version
    );
    Ok(())
}

fn cmd_run(project_dir: &Path, platform: PlatformKind) -> Result<(), PipelineError> {
    let config = load_config(project_dir)?;
    manifest::validate_project(project_dir, &config)?;
    let prepared = pipeline::prepare(project_dir, &config)?;
    pipeline::run(&config, &prepared, platform)
}

fn cmd_export(project_dir: &Path) -> Result<(), PipelineError> {
    let config = load_config(project_dir)?;
    manifest::validate_project(project_dir, &config)?;
    let prepared = pipeline::prepare(project_dir, &config)?;
    pipeline::export(project_dir, &config, &prepared)?;
    println!(
        "Artifacts exported to {}",
        layout::distribution_dir(project_dir, &config).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.effective_log_level(), "info");
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("simforge.yaml"), "log_level: trace\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.effective_log_level(), "trace");
    }

    #[test]
    fn test_load_config_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("simforge.yaml"), "log_level: [unclosed\n").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_validate_fails_on_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_validate(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Precondition(_)));
    }
}
