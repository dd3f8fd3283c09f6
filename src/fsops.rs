//! Filesystem helpers shared by the pipeline steps.

use crate::core::error::PipelineError;
use glob::Pattern;
use std::path::Path;

/// Create a directory (and parents) if it does not exist. Returns whether it
/// was newly created.
pub fn create_dir_if_not_exists(path: &Path) -> Result<bool, PipelineError> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(|e| PipelineError::io("cannot create dir", path, e))?;
    Ok(true)
}

/// Recursively copy the content of `src` into `dest`, overwriting existing
/// files. Entries whose path relative to `src` matches `exclude` are skipped;
/// a skipped directory prunes its whole subtree.
pub fn copy_dir_contents(
    src: &Path,
    dest: &Path,
    exclude: Option<&Pattern>,
) -> Result<(), PipelineError> {
    create_dir_if_not_exists(dest)?;
    copy_walk(src, src, dest, exclude)
}

fn copy_walk(
    base: &Path,
    current: &Path,
    dest: &Path,
    exclude: Option<&Pattern>,
) -> Result<(), PipelineError> {
    let read_dir = std::fs::read_dir(current)
        .map_err(|e| PipelineError::io("cannot read dir", current, e))?;
    let mut children: Vec<std::fs::DirEntry> = read_dir.filter_map(|e| e.ok()).collect();
    children.sort_by_key(|e| e.file_name());

    for entry in children {
        let path = entry.path();
        let rel = path
            .strip_prefix(base)
            .expect("walk stays under base");
        if let Some(pattern) = exclude {
            if pattern.matches_path(rel) {
                continue;
            }
        }
        let target = dest.join(rel);
        let ft = entry
            .file_type()
            .map_err(|e| PipelineError::io("cannot stat", &path, e))?;
        if ft.is_dir() {
            create_dir_if_not_exists(&target)?;
            copy_walk(base, &path, dest, exclude)?;
        } else if ft.is_file() {
            if let Some(parent) = target.parent() {
                create_dir_if_not_exists(parent)?;
            }
            std::fs::copy(&path, &target)
                .map_err(|e| PipelineError::io("cannot copy", &path, e))?;
        }
        // Symlinks are not part of runner templates; skipped.
    }
    Ok(())
}

/// Delete a directory tree if present. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, PipelineError> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path).map_err(|e| PipelineError::io("cannot remove dir", path, e))?;
    Ok(true)
}

/// Read a whole file into a string with path context on failure.
pub fn read_to_string(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|e| PipelineError::io("cannot read", path, e))
}

/// Write a string to a file, creating parent directories as needed.
pub fn write_string(path: &Path, content: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        create_dir_if_not_exists(parent)?;
    }
    std::fs::write(path, content).map_err(|e| PipelineError::io("cannot write", path, e))
}
