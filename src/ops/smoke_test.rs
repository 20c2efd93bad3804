//! Post-install smoke test.
//!
//! Compiles a tiny program against the installed headers and libraries,
//! then runs it. The program asserts on the result of a string split, so a
//! zero exit means the install is usable.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::builder::toolchain::CommandSpec;
use crate::core::errors::InstallError;
use crate::util::fs::write_string;
use crate::util::process::ProcessBuilder;

/// Fixture compiled by the smoke test.
pub const SMOKE_TEST_SOURCE: &str = r#"#include <boost/algorithm/string.hpp>
#include <string>
#include <vector>
#include <assert.h>
using namespace boost::algorithm;
using namespace std;

int main()
{
  string str("a,b");
  vector<string> strVec;
  split(strVec, str, is_any_of(","));
  assert(strVec.size()==2);
  assert(strVec[0]=="a");
  assert(strVec[1]=="b");
  return 0;
}
"#;

/// Result of a passing smoke test.
#[derive(Debug, Clone)]
pub struct SmokeTestReport {
    pub compile_command: String,
    pub duration: Duration,
}

/// The compile command for the fixture inside `workdir`.
pub fn compile_command(cxx: &Path, prefix: &Path) -> CommandSpec {
    CommandSpec::new(cxx).args([
        "test.cpp".to_string(),
        "-std=c++1y".to_string(),
        format!("-I{}", prefix.join("include").display()),
        format!("-L{}", prefix.join("lib").display()),
        "-lboost_system".to_string(),
        "-o".to_string(),
        "test".to_string(),
    ])
}

/// Compile and run the fixture against the install at `prefix`.
pub fn run_smoke_test(cxx: &Path, prefix: &Path) -> Result<SmokeTestReport> {
    let start = Instant::now();
    let workdir = tempfile::Builder::new()
        .prefix("boostkeg-test")
        .tempdir()
        .context("failed to create smoke test directory")?;

    write_string(&workdir.path().join("test.cpp"), SMOKE_TEST_SOURCE)?;

    let compile = compile_command(cxx, prefix);
    tracing::debug!("{}", compile.display_command());
    let output = ProcessBuilder::new(&compile.program)
        .args(&compile.args)
        .cwd(workdir.path())
        .exec()?;
    if !output.status.success() {
        return Err(InstallError::SmokeTestFailed {
            stage: "compile".to_string(),
            code: output.status.code(),
            output: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }

    let lib_dir = prefix.join("lib");
    let output = ProcessBuilder::new(workdir.path().join("test"))
        .cwd(workdir.path())
        .env_prepend_path("LD_LIBRARY_PATH", &lib_dir)
        .env_prepend_path("DYLD_LIBRARY_PATH", &lib_dir)
        .exec()?;
    if !output.status.success() {
        return Err(InstallError::SmokeTestFailed {
            stage: "run".to_string(),
            code: output.status.code(),
            output: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }

    Ok(SmokeTestReport {
        compile_command: compile.display_command(),
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_checks_split() {
        assert!(SMOKE_TEST_SOURCE.contains("string str(\"a,b\");"));
        assert!(SMOKE_TEST_SOURCE.contains("is_any_of(\",\")"));
        assert!(SMOKE_TEST_SOURCE.contains("assert(strVec.size()==2);"));
        assert!(SMOKE_TEST_SOURCE.contains("assert(strVec[0]==\"a\");"));
        assert!(SMOKE_TEST_SOURCE.contains("assert(strVec[1]==\"b\");"));
    }

    #[test]
    fn test_compile_command() {
        let cmd = compile_command(Path::new("/usr/bin/clang++"), Path::new("/opt/boost"));
        assert_eq!(
            cmd.display_command(),
            "/usr/bin/clang++ test.cpp -std=c++1y -I/opt/boost/include -L/opt/boost/lib -lboost_system -o test"
        );
    }

    #[test]
    fn test_compile_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        // `false` ignores its arguments and exits 1
        let err = run_smoke_test(Path::new("false"), tmp.path()).unwrap_err();
        match err.downcast_ref::<InstallError>() {
            Some(InstallError::SmokeTestFailed { stage, code, .. }) => {
                assert_eq!(stage, "compile");
                assert_eq!(*code, Some(1));
            }
            other => panic!("expected SmokeTestFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_compiler_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(run_smoke_test(Path::new("/nonexistent/c++"), tmp.path()).is_err());
    }
}
