//! Zip packing of export artifacts.

use crate::core::error::PipelineError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Pack files and directories into a zip archive at `dest`. A directory
/// item is added recursively under its own name; a file item at the archive
/// root.
pub fn zip_items(dest: &Path, items: &[PathBuf]) -> Result<(), PipelineError> {
    if let Some(parent) = dest.parent() {
        crate::fsops::create_dir_if_not_exists(parent)?;
    }
    let file = std::fs::File::create(dest)
        .map_err(|e| PipelineError::io("cannot create archive", dest, e))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for item in items {
        let name = item
            .file_name()
            .ok_or_else(|| {
                PipelineError::Precondition(format!("cannot archive unnamed path {}", item.display()))
            })?
            .to_string_lossy()
            .into_owned();
        if item.is_dir() {
            add_directory(&mut writer, item, &name, options)?;
        } else {
            add_file(&mut writer, item, &name, options)?;
        }
    }

    writer
        .finish()
        .map_err(|e| PipelineError::Parse {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(())
}

fn add_file(
    writer: &mut zip::ZipWriter<std::fs::File>,
    path: &Path,
    entry_name: &str,
    options: SimpleFileOptions,
) -> Result<(), PipelineError> {
    writer
        .start_file(entry_name, options)
        .map_err(|e| PipelineError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut file =
        std::fs::File::open(path).map_err(|e| PipelineError::io("cannot open", path, e))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| PipelineError::io("cannot read", path, e))?;
    writer
        .write_all(&buf)
        .map_err(|e| PipelineError::io("cannot write entry for", path, e))?;
    Ok(())
}

fn add_directory(
    writer: &mut zip::ZipWriter<std::fs::File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<(), PipelineError> {
    let read_dir =
        std::fs::read_dir(dir).map_err(|e| PipelineError::io("cannot read dir", dir, e))?;
    let mut children: Vec<std::fs::DirEntry> = read_dir.filter_map(|e| e.ok()).collect();
    children.sort_by_key(|e| e.file_name());

    for entry in children {
        let path = entry.path();
        let entry_name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());
        if path.is_dir() {
            add_directory(writer, &path, &entry_name, options)?;
        } else {
            add_file(writer, &path, &entry_name, options)?;
        }
    }
    Ok(())
}
