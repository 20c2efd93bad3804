//! Release archive download, caching and checksum verification.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::core::errors::InstallError;
use crate::core::formula::Formula;
use crate::util::fs::ensure_dir;
use crate::util::hash::{digest_matches, sha256_file};
use crate::util::shell::Shell;

/// How the archive may be obtained.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Use this local archive instead of downloading
    pub archive: Option<PathBuf>,
    /// Directory downloads are cached in
    pub cache_dir: Option<PathBuf>,
    /// Refuse to touch the network
    pub offline: bool,
}

/// Produces a verified local copy of the formula's release archive.
pub struct ArchiveFetcher<'a> {
    formula: &'a Formula,
    options: FetchOptions,
}

impl<'a> ArchiveFetcher<'a> {
    pub fn new(formula: &'a Formula, options: FetchOptions) -> Self {
        ArchiveFetcher { formula, options }
    }

    /// Return the path of a verified archive, downloading if necessary.
    ///
    /// Nothing is built until this succeeds.
    pub fn fetch(&self, shell: &Shell) -> Result<PathBuf> {
        if let Some(local) = &self.options.archive {
            self.verify(local, self.formula.url)?;
            return Ok(local.clone());
        }

        let cache_dir = self
            .options
            .cache_dir
            .clone()
            .context("no cache directory available for downloads; pass --archive")?;
        ensure_dir(&cache_dir)?;
        let cached = cache_dir.join(self.formula.archive_file_name());

        if cached.exists() {
            match self.verify(&cached, self.formula.url) {
                Ok(()) => {
                    tracing::info!("Using cached archive {}", cached.display());
                    return Ok(cached);
                }
                Err(e) => {
                    tracing::warn!("discarding cached archive {}: {}", cached.display(), e);
                    std::fs::remove_file(&cached).with_context(|| {
                        format!("failed to remove stale archive: {}", cached.display())
                    })?;
                }
            }
        }

        if self.options.offline {
            return Err(InstallError::Download {
                url: self.formula.url.to_string(),
                reason: "offline mode is enabled and no cached archive exists".to_string(),
            }
            .into());
        }

        self.download(&cached, shell)?;
        if let Err(e) = self.verify(&cached, self.formula.url) {
            let _ = std::fs::remove_file(&cached);
            return Err(e);
        }

        Ok(cached)
    }

    fn verify(&self, path: &Path, url: &str) -> Result<()> {
        let actual = sha256_file(path)?;
        if !digest_matches(self.formula.sha256, &actual) {
            return Err(InstallError::ChecksumMismatch {
                url: url.to_string(),
                expected: self.formula.sha256.to_string(),
                actual,
            }
            .into());
        }

        tracing::debug!("archive hash verified: {}", &actual[..16]);
        Ok(())
    }

    /// Stream the archive to `dest` through a `.part` file.
    fn download(&self, dest: &Path, shell: &Shell) -> Result<()> {
        let url = Url::parse(self.formula.url)
            .with_context(|| format!("invalid archive URL: {}", self.formula.url))?;
        tracing::info!("Fetching archive from {}", url);

        let download_error = |reason: String| InstallError::Download {
            url: url.to_string(),
            reason,
        };

        let mut response = reqwest::blocking::get(url.clone())
            .map_err(|e| download_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())).into());
        }

        let progress = shell.bytes_progress(self.formula.archive_file_name(), response.content_length());
        let partial = dest.with_extension("part");
        {
            let file = File::create(&partial)
                .with_context(|| format!("failed to create {}", partial.display()))?;
            let mut writer = BufWriter::new(file);
            let mut buffer = [0u8; 64 * 1024];
            loop {
                let n = response
                    .read(&mut buffer)
                    .map_err(|e| download_error(e.to_string()))?;
                if n == 0 {
                    break;
                }
                writer
                    .write_all(&buffer[..n])
                    .with_context(|| format!("failed to write {}", partial.display()))?;
                progress.inc(n as u64);
            }
            writer
                .flush()
                .with_context(|| format!("failed to write {}", partial.display()))?;
        }
        progress.finish();

        std::fs::rename(&partial, dest)
            .with_context(|| format!("failed to move download to {}", dest.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hash::sha256_bytes;
    use tempfile::TempDir;

    fn formula_with_hash(sha256: &'static str) -> Formula {
        Formula {
            sha256,
            ..Formula::boost()
        }
    }

    #[test]
    fn test_local_archive_verified() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("boost_1_65_1.tar.bz2");
        std::fs::write(&archive, b"not really bzip2").unwrap();

        let hash: &'static str = Box::leak(sha256_bytes(b"not really bzip2").into_boxed_str());
        let formula = formula_with_hash(hash);
        let fetcher = ArchiveFetcher::new(
            &formula,
            FetchOptions {
                archive: Some(archive.clone()),
                ..FetchOptions::default()
            },
        );

        assert_eq!(fetcher.fetch(&Shell::default()).unwrap(), archive);
    }

    #[test]
    fn test_local_archive_checksum_mismatch() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("boost_1_65_1.tar.bz2");
        std::fs::write(&archive, b"tampered").unwrap();

        let formula = Formula::boost();
        let fetcher = ArchiveFetcher::new(
            &formula,
            FetchOptions {
                archive: Some(archive),
                ..FetchOptions::default()
            },
        );

        let err = fetcher.fetch(&Shell::default()).unwrap_err();
        match err.downcast_ref::<InstallError>() {
            Some(InstallError::ChecksumMismatch { expected, actual, .. }) => {
                assert_eq!(expected, formula.sha256);
                assert_eq!(actual, &sha256_bytes(b"tampered"));
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_cached_archive_reused() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("boost_1_65_1.tar.bz2"), b"cached").unwrap();

        let hash: &'static str = Box::leak(sha256_bytes(b"cached").into_boxed_str());
        let formula = formula_with_hash(hash);
        let fetcher = ArchiveFetcher::new(
            &formula,
            FetchOptions {
                cache_dir: Some(tmp.path().to_path_buf()),
                offline: true,
                ..FetchOptions::default()
            },
        );

        let path = fetcher.fetch(&Shell::default()).unwrap();
        assert_eq!(path, tmp.path().join("boost_1_65_1.tar.bz2"));
    }

    #[test]
    fn test_offline_with_bad_cache_fails_without_network() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("boost_1_65_1.tar.bz2");
        std::fs::write(&cached, b"corrupt").unwrap();

        let formula = Formula::boost();
        let fetcher = ArchiveFetcher::new(
            &formula,
            FetchOptions {
                cache_dir: Some(tmp.path().to_path_buf()),
                offline: true,
                ..FetchOptions::default()
            },
        );

        let err = fetcher.fetch(&Shell::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstallError>(),
            Some(InstallError::Download { .. })
        ));
        // The corrupt copy is gone so the next online run re-downloads
        assert!(!cached.exists());
    }
}
