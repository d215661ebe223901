//! File system utilities for bundling.
//!
//! Removal and creation helpers here are idempotent: a missing path is not an
//! error when removing, and an existing directory is not an error when creating.

use crate::bundler::error::{ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a single file if it exists.
///
/// Returns `true` when a file was actually removed.
pub async fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Lists the file names directly under `path`, sorted.
///
/// Returns `None` when the directory does not exist.
pub async fn list_dir(path: &Path) -> Result<Option<Vec<String>>> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).fs_context("reading directory", path),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory entry", path)?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(Some(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removing_missing_paths_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        remove_dir_all(&missing).await.unwrap();
        assert!(!remove_file(&missing.join("a.zip")).await.unwrap());
        assert!(list_dir(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_with_erase_drops_stale_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("install");
        std::fs::create_dir_all(target.join("old")).unwrap();
        std::fs::write(target.join("stale.txt"), b"x").unwrap();

        create_dir_all(&target, true).await.unwrap();

        assert_eq!(list_dir(&target).await.unwrap(), Some(Vec::new()));
    }
}
