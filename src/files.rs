// File I/O helpers for day-files
// Async wrappers over tokio::fs plus the recursive markdown scan

use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

use crate::errors::{JournalError, JournalResult};

/// Create a directory and all missing parents, no-op when it exists
pub async fn ensureDir(path: &Path) -> JournalResult<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

pub async fn fileExists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Read the whole file, None on any failure
pub async fn readIfExists(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!("[readIfExists] Could not read {}: {}", path.display(), e);
            None
        }
    }
}

/// Overwrite a file with the full content, creating parent directories first
pub async fn writeWithDir(path: &Path, content: &str) -> JournalResult<()> {
    if let Some(parent) = path.parent() {
        ensureDir(parent).await.map_err(|e| JournalError::write(path, e))?;
    }
    fs::write(path, content).await.map_err(|e| JournalError::write(path, e))
}

/// Sibling backup path, e.g. 2024-01-15.md.backup.2024-01-15T09-30-00-123456Z
pub fn backupPathFor(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%6fZ");
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".backup.{}", stamp));
    PathBuf::from(name)
}

/// Copy the current file next to itself; None when there is nothing to back up
pub async fn backup(path: &Path) -> JournalResult<Option<PathBuf>> {
    if !fileExists(path).await {
        return Ok(None);
    }

    let backupPath = backupPathFor(path);
    fs::copy(path, &backupPath).await.map_err(|e| JournalError::write(&backupPath, e))?;
    tracing::debug!("[backup] {} -> {}", path.display(), backupPath.display());
    Ok(Some(backupPath))
}

pub async fn deleteFile(path: &Path) -> JournalResult<()> {
    fs::remove_file(path).await?;
    Ok(())
}

/// All visible *.md files below root, in walk order; a missing root yields nothing
pub fn listMarkdownFiles(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() &&
            e.path().extension().map(|ext| ext == "md").unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}
