//! Vendored patch application.
//!
//! Patches ship inside the binary and are applied with `git apply`, which
//! works on plain (non-repository) directories. Repository discovery is
//! capped at the source tree so an enclosing checkout cannot change how
//! paths are resolved.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::formula::VendoredPatch;
use crate::util::process::{find_git, ProcessBuilder};

/// What happened to one patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyApplied,
}

/// Apply every patch to `source_dir`, in order.
pub fn apply_patches(patches: &[VendoredPatch], source_dir: &Path) -> Result<Vec<PatchOutcome>> {
    if patches.is_empty() {
        return Ok(Vec::new());
    }

    let git = find_git().context("git is required to apply source patches")?;
    let scratch = tempfile::tempdir().context("failed to create patch scratch directory")?;

    patches
        .iter()
        .map(|patch| {
            let patch_path = scratch.path().join(patch.name);
            std::fs::write(&patch_path, patch.contents)
                .with_context(|| format!("failed to write {}", patch_path.display()))?;
            apply_single_patch(&git, &patch_path, patch.name, source_dir)
        })
        .collect()
}

fn apply_single_patch(
    git: &Path,
    patch_path: &Path,
    name: &str,
    source_dir: &Path,
) -> Result<PatchOutcome> {
    let git_apply = |extra: &[&str]| {
        let mut cmd = ProcessBuilder::new(git)
            .arg("apply")
            .args(extra)
            .arg(patch_path)
            .cwd(source_dir);
        if let Some(parent) = source_dir.parent() {
            cmd = cmd.env("GIT_CEILING_DIRECTORIES", parent.to_string_lossy());
        }
        cmd.exec()
    };

    let check = git_apply(&["--check"])?;
    if !check.status.success() {
        let reverse = git_apply(&["--reverse", "--check"])?;
        if reverse.status.success() {
            tracing::info!("patch {} already applied", name);
            return Ok(PatchOutcome::AlreadyApplied);
        }

        bail!(
            "patch '{}' will not apply cleanly:\n{}",
            name,
            String::from_utf8_lossy(&check.stderr)
        );
    }

    let apply = git_apply(&[])?;
    if !apply.status.success() {
        bail!(
            "failed to apply patch '{}':\n{}",
            name,
            String::from_utf8_lossy(&apply.stderr)
        );
    }

    tracing::info!("applied patch {}", name);
    Ok(PatchOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORIGINAL: &str = "line one\nif $(real-version) < \"4.0.0\"\nline three\n";

    const PATCH: &str = "\
diff --git a/tools/check.jam b/tools/check.jam
--- a/tools/check.jam
+++ b/tools/check.jam
@@ -1,3 +1,3 @@
 line one
-if $(real-version) < \"4.0.0\"
+if [ version.version-less $(real-version) : 4 0 ]
 line three
";

    fn source_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("tools")).unwrap();
        std::fs::write(tmp.path().join("tools/check.jam"), ORIGINAL).unwrap();
        tmp
    }

    fn patches() -> Vec<VendoredPatch> {
        vec![VendoredPatch {
            name: "check.patch",
            upstream: "test",
            contents: PATCH,
        }]
    }

    #[test]
    fn test_apply_then_detect_applied() {
        if find_git().is_none() {
            return;
        }
        let tmp = source_tree();

        let outcome = apply_patches(&patches(), tmp.path()).unwrap();
        assert_eq!(outcome, vec![PatchOutcome::Applied]);
        let patched = std::fs::read_to_string(tmp.path().join("tools/check.jam")).unwrap();
        assert!(patched.contains("version.version-less"));

        let outcome = apply_patches(&patches(), tmp.path()).unwrap();
        assert_eq!(outcome, vec![PatchOutcome::AlreadyApplied]);
    }

    #[test]
    fn test_patch_that_does_not_apply() {
        if find_git().is_none() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("tools")).unwrap();
        std::fs::write(tmp.path().join("tools/check.jam"), "something else\n").unwrap();

        let err = apply_patches(&patches(), tmp.path()).unwrap_err();
        assert!(err.to_string().contains("will not apply cleanly"));
    }

    #[test]
    fn test_no_patches_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        assert!(apply_patches(&[], tmp.path()).unwrap().is_empty());
    }
}
