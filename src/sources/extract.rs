//! Tarball extraction.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use tar::Archive;

/// Compression used by a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarBz2,
    TarGz,
}

impl ArchiveFormat {
    /// Infer the format from the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_lowercase();

        if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Ok(ArchiveFormat::TarBz2)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else {
            bail!("unsupported archive format: {}", path.display())
        }
    }
}

/// Extract an archive into `dest`, stripping the top-level directory
/// `strip_prefix` when entries live under it.
///
/// # Example
///
/// ```ignore
/// extract_archive(&archive, &src_dir, Some("boost_1_65_1"))?;
/// ```
pub fn extract_archive(archive: &Path, dest: &Path, strip_prefix: Option<&str>) -> Result<()> {
    let format = ArchiveFormat::from_path(archive)?;
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let reader = BufReader::new(file);

    let result = match format {
        ArchiveFormat::TarBz2 => unpack(bzip2::read::BzDecoder::new(reader), dest, strip_prefix),
        ArchiveFormat::TarGz => unpack(flate2::read::GzDecoder::new(reader), dest, strip_prefix),
    };
    result.with_context(|| format!("failed to extract {}", archive.display()))
}

fn unpack<R: Read>(reader: R, dest: &Path, strip_prefix: Option<&str>) -> Result<()> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut count = 0usize;
    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry.path().context("failed to get entry path")?.into_owned();

        let Some(relative) = strip_entry_path(&entry_path, strip_prefix) else {
            continue;
        };
        if !is_contained(&relative) {
            bail!(
                "tarball entry escapes destination directory: {}",
                entry_path.display()
            );
        }

        let output_path = dest.join(&relative);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        entry
            .unpack(&output_path)
            .with_context(|| format!("failed to extract: {}", output_path.display()))?;
        count += 1;
    }

    tracing::debug!("extracted {} entries into {}", count, dest.display());
    Ok(())
}

/// Path of an entry relative to the destination, or `None` for the
/// stripped top-level directory itself.
fn strip_entry_path(entry: &Path, strip_prefix: Option<&str>) -> Option<PathBuf> {
    let Some(prefix) = strip_prefix else {
        return Some(entry.to_path_buf());
    };

    match entry.strip_prefix(prefix.trim_end_matches('/')) {
        Ok(rest) if rest.as_os_str().is_empty() => None,
        Ok(rest) => Some(rest.to_path_buf()),
        Err(_) => Some(entry.to_path_buf()),
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
