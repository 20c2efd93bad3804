//! Preparing a patched upstream source tree.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::formula::Formula;
use crate::sources::archive::{ArchiveFetcher, FetchOptions};
use crate::sources::extract::extract_archive;
use crate::sources::patch::{apply_patches, PatchOutcome};
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::shell::{Shell, Status};

/// Where the source tree comes from.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// An already-extracted tree; fetch and checksum are skipped.
    Tree(PathBuf),
    /// Obtain the release archive and extract it into `dest`.
    Archive { fetch: FetchOptions, dest: PathBuf },
}

/// Produce a patched source tree ready for bootstrap.
pub fn prepare_source(formula: &Formula, spec: &SourceSpec, shell: &Shell) -> Result<PathBuf> {
    let source_dir = match spec {
        SourceSpec::Tree(dir) => dir.clone(),
        SourceSpec::Archive { fetch, dest } => {
            shell.status(Status::Fetching, format!("{} {}", formula.name, formula.url));
            // Errors out on a checksum mismatch
            let archive = ArchiveFetcher::new(formula, fetch.clone()).fetch(shell)?;
            shell.status(Status::Verified, format!("sha256 {}", formula.sha256));

            shell.status(Status::Extracting, dest.display());
            remove_dir_all_if_exists(dest)?;
            extract_archive(&archive, dest, Some(&formula.archive_root()))?;
            dest.clone()
        }
    };

    if !source_dir.join("bootstrap.sh").is_file() {
        bail!(
            "{} does not look like a Boost source tree (no bootstrap.sh)",
            source_dir.display()
        );
    }

    for (patch, outcome) in formula
        .patches
        .iter()
        .zip(apply_patches(&formula.patches, &source_dir)?)
    {
        match outcome {
            PatchOutcome::Applied => shell.status(Status::Patching, patch.name),
            PatchOutcome::AlreadyApplied => {
                shell.status(Status::Skipped, format!("{} (already applied)", patch.name))
            }
        }
    }

    Ok(source_dir)
}
