//! In-process ZIP writer.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Writes every entry below `source_dir` into a new ZIP at `archive_path`.
///
/// Entry names are relative to `source_dir` and always use `/`. Walk order is
/// sorted so two runs over the same tree produce the same entry order.
pub async fn write_zip(source_dir: &Path, archive_path: &Path) -> Result<()> {
    let source_dir = source_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || write_zip_blocking(&source_dir, &archive_path))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

fn write_zip_blocking(source_dir: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path).fs_context("creating archive", archive_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let base_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = walkdir::WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1);

    let mut files = 0usize;
    for entry in walker {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(source_dir)?;
        let name = entry_name(rel_path);
        let metadata = entry.metadata()?;

        #[allow(unused_mut)]
        let mut options = base_options;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(metadata.permissions().mode());
        }

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            let options = options.large_file(metadata.len() >= u64::from(u32::MAX));
            writer.start_file(name, options)?;
            let mut source = File::open(entry.path()).fs_context("opening file to archive", entry.path())?;
            io::copy(&mut source, &mut writer).fs_context("compressing file", entry.path())?;
            files += 1;
        } else {
            log::warn!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    let mut inner = writer.finish()?;
    io::Write::flush(&mut inner).fs_context("flushing archive", archive_path)?;

    log::debug!("Archived {} file(s) from {}", files, source_dir.display());
    Ok(())
}

/// ZIP entry name for a path relative to the archive root.
fn entry_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
