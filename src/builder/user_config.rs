//! Generated `user-config.jam`.
//!
//! Boost.Build picks its compiler from the user config, so the host
//! compiler is declared there before bootstrap runs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Append one declaration line to the user config, creating it if needed.
///
/// Boost.Build rejects a toolset initialized twice, so a line already in
/// the file is not written again. Returns whether the file changed.
pub fn append_compiler_declaration(path: &Path, line: &str) -> Result<bool> {
    let existing = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read user config: {}", path.display()))
        }
    };
    if existing.lines().any(|l| l.trim() == line.trim()) {
        tracing::debug!("{} already declares `{}`", path.display(), line);
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open user config: {}", path.display()))?;

    writeln!(file, "{}", line)
        .with_context(|| format!("failed to write user config: {}", path.display()))?;

    tracing::debug!("appended `{}` to {}", line, path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_and_appends() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user-config.jam");

        assert!(append_compiler_declaration(&path, "using darwin : : /usr/bin/clang++ ;").unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "using darwin : : /usr/bin/clang++ ;\n"
        );

        append_compiler_declaration(&path, "using darwin : : /usr/bin/g++ ;").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with("using darwin : : /usr/bin/g++ ;\n"));
    }

    #[test]
    fn test_preserves_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user-config.jam");
        std::fs::write(&path, "# existing\n").unwrap();

        append_compiler_declaration(&path, "using darwin : : c++ ;").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# existing\nusing darwin : : c++ ;\n"
        );
    }

    #[test]
    fn test_same_declaration_is_written_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("user-config.jam");
        std::fs::write(&path, "# existing\nusing darwin : : /usr/bin/clang++ ;  \n").unwrap();

        let changed =
            append_compiler_declaration(&path, "using darwin : : /usr/bin/clang++ ;").unwrap();
        assert!(!changed);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# existing\nusing darwin : : /usr/bin/clang++ ;  \n"
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("user-config.jam");
        assert!(append_compiler_declaration(&path, "x").is_err());
    }
}
