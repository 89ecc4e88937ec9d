use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolboxError};
use crate::types::is_supported_image;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Fail unless `path` exists and is a directory
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ToolboxError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ToolboxError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Create a directory unless it already exists; existing content is left alone
pub fn create_dir_if_missing(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        log::debug!("Directory {:?} already exists, keeping it.", path);
    } else {
        fs::create_dir(path)?;
    }
    Ok(path.to_path_buf())
}

/// List the supported image files directly inside `dir`, sorted by path.
///
/// Extensions are matched case-insensitively; subdirectories and files with
/// any other extension are skipped.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// List the immediate subdirectories of `dir`, sorted by name
pub fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(subdirs)
}
