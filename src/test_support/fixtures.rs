//! On-disk fixtures for install and source-tree tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Create `root/prefix/lib` containing empty files with the given names.
///
/// Returns the prefix.
pub fn fake_install(root: &Path, libraries: &[&str]) -> PathBuf {
    let prefix = root.join("prefix");
    let lib = prefix.join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::create_dir_all(prefix.join("include/boost")).unwrap();
    for name in libraries {
        fs::write(lib.join(name), b"").unwrap();
    }
    prefix
}

/// Create the skeleton of an extracted Boost tree under `root/boost_1_65_1`.
pub fn fake_source_tree(root: &Path) -> PathBuf {
    let source = root.join("boost_1_65_1");
    fs::create_dir_all(source.join("tools/build/src/tools")).unwrap();
    fs::write(source.join("bootstrap.sh"), "#!/bin/sh\nexit 0\n").unwrap();
    fs::write(
        source.join("tools/build/src/tools/darwin.jam"),
        "# darwin toolset\n",
    )
    .unwrap();
    source
}

/// Compiler `--version` banners.
pub mod compiler_outputs {
    pub fn gcc_version(version: &str) -> String {
        format!("g++ (GCC) {version}\nCopyright (C) 2024 Free Software Foundation, Inc.\n")
    }

    pub fn clang_version(version: &str) -> String {
        format!("clang version {version}\nTarget: x86_64-unknown-linux-gnu\n")
    }

    pub fn apple_clang_version(version: &str) -> String {
        format!("Apple LLVM version {version} (clang-900.0.39.2)\nTarget: x86_64-apple-darwin17.4.0\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fake_install_layout() {
        let tmp = TempDir::new().unwrap();
        let prefix = fake_install(tmp.path(), &["libboost_system-mt.a"]);

        assert!(prefix.join("lib/libboost_system-mt.a").is_file());
        assert!(prefix.join("include/boost").is_dir());
    }

    #[test]
    fn test_fake_source_tree_has_bootstrap() {
        let tmp = TempDir::new().unwrap();
        let source = fake_source_tree(tmp.path());

        assert!(source.join("bootstrap.sh").is_file());
        assert!(!source.join("user-config.jam").exists());
    }
}
