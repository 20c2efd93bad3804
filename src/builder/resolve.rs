//! Option resolution: flags + toolchain facts -> upstream command lines.
//!
//! The output is fully determined by the inputs. The only lookup that can
//! fail is the optional ICU prefix, which goes through a
//! [`DependencyLocator`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::toolchain::{CommandSpec, CompilerKind, ToolchainFacts};
use crate::core::dependency::DependencyLocator;
use crate::core::errors::InstallError;
use crate::core::formula::{ALWAYS_EXCLUDED_LIBRARIES, USER_CONFIG_FILE, USER_CONFIG_TOOLSET};
use crate::core::options::FeatureFlags;

/// Where the build reads from and installs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallLayout {
    /// Extracted upstream source tree (contains `bootstrap.sh`)
    pub source_dir: PathBuf,
    /// Install prefix
    pub prefix: PathBuf,
}

impl InstallLayout {
    pub fn new(source_dir: impl Into<PathBuf>, prefix: impl Into<PathBuf>) -> Self {
        InstallLayout {
            source_dir: source_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Library directory under the prefix.
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// Generated Boost.Build user config inside the source tree.
    pub fn user_config_path(&self) -> PathBuf {
        self.source_dir.join(USER_CONFIG_FILE)
    }
}

/// The resolved commands for one install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallPlan {
    /// Line appended to `user-config.jam` before anything runs
    pub user_config_line: String,
    /// Libraries passed to `--without-libraries`, base set first
    pub excluded_libraries: Vec<String>,
    /// `./bootstrap.sh ...`
    pub bootstrap: CommandSpec,
    /// `./b2 headers`
    pub headers: CommandSpec,
    /// `./b2 ... install`
    pub build: CommandSpec,
}

/// Libraries never built for this toolchain.
///
/// The union of the base set and the compiler-specific extras, in that
/// order. Boost.Log does not build with the GCC versions this release
/// targets.
pub fn excluded_libraries(compiler: CompilerKind) -> Vec<String> {
    let conditional: &[&str] = match compiler {
        CompilerKind::Gcc => &["log"],
        CompilerKind::Clang | CompilerKind::Other => &[],
    };
    ALWAYS_EXCLUDED_LIBRARIES
        .iter()
        .chain(conditional.iter().filter(|lib| !ALWAYS_EXCLUDED_LIBRARIES.contains(*lib)))
        .map(|lib| lib.to_string())
        .collect()
}

/// The `user-config.jam` line declaring the host compiler.
pub fn user_config_line(cxx: &Path) -> String {
    format!("using {} : : {} ;", USER_CONFIG_TOOLSET, cxx.display())
}

/// Resolves feature flags and toolchain facts into an [`InstallPlan`].
pub struct OptionResolver<'a> {
    flags: FeatureFlags,
    facts: &'a ToolchainFacts,
    layout: &'a InstallLayout,
    deps: &'a dyn DependencyLocator,
}

impl<'a> OptionResolver<'a> {
    pub fn new(
        flags: FeatureFlags,
        facts: &'a ToolchainFacts,
        layout: &'a InstallLayout,
        deps: &'a dyn DependencyLocator,
    ) -> Self {
        OptionResolver {
            flags,
            facts,
            layout,
            deps,
        }
    }

    /// Build all commands.
    pub fn resolve(&self) -> Result<InstallPlan, InstallError> {
        let excluded = excluded_libraries(self.facts.compiler);
        let bootstrap = self.bootstrap_command(&excluded)?;

        let plan = InstallPlan {
            user_config_line: user_config_line(&self.facts.cxx),
            headers: CommandSpec::new(self.b2()).arg("headers"),
            build: self.build_command(),
            bootstrap,
            excluded_libraries: excluded,
        };

        tracing::debug!("bootstrap: {}", plan.bootstrap.display_command());
        tracing::debug!("build: {}", plan.build.display_command());

        Ok(plan)
    }

    fn b2(&self) -> PathBuf {
        self.layout.source_dir.join("b2")
    }

    /// `--prefix` and `--libdir`; bootstrap does not derive libdir from prefix.
    fn prefix_args(&self) -> [String; 2] {
        [
            format!("--prefix={}", self.layout.prefix.display()),
            format!("--libdir={}", self.layout.lib_dir().display()),
        ]
    }

    fn bootstrap_command(&self, excluded: &[String]) -> Result<CommandSpec, InstallError> {
        let mut cmd = CommandSpec::new(self.layout.source_dir.join("bootstrap.sh"))
            .args(self.prefix_args());

        cmd = if self.flags.icu_support {
            let icu = self.deps.opt_prefix("icu4c")?;
            cmd.arg(format!("--with-icu={}", icu.display()))
        } else {
            cmd.arg("--without-icu")
        };

        Ok(cmd.arg(format!("--without-libraries={}", excluded.join(","))))
    }

    fn build_command(&self) -> CommandSpec {
        let threading = if self.flags.single_threading {
            "threading=multi,single"
        } else {
            "threading=multi"
        };
        let link = if self.flags.static_linking {
            "link=shared,static"
        } else {
            "link=shared"
        };

        let cmd = CommandSpec::new(self.b2())
            .args(self.prefix_args())
            .args([
                "-d2".to_string(),
                format!("-j{}", self.facts.jobs),
                "--layout=tagged".to_string(),
                format!("--user-config={}", USER_CONFIG_FILE),
                "-sNO_LZMA=1".to_string(),
                "install".to_string(),
            ])
            .args([threading, link, "cxxflags=-std=c++11"]);

        // cxxflags/linkflags survive b2's own C/C++ driver selection
        match self.facts.compiler {
            CompilerKind::Clang => {
                cmd.args(["cxxflags=-stdlib=libc++", "linkflags=-stdlib=libc++"])
            }
            CompilerKind::Gcc | CompilerKind::Other => cmd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::OptRootLocator;

    fn layout() -> InstallLayout {
        InstallLayout::new("/src/boost_1_65_1", "/opt/boost@1.65.1")
    }

    fn plan(flags: FeatureFlags, compiler: CompilerKind) -> InstallPlan {
        let facts = ToolchainFacts::new(compiler, "/usr/bin/c++", 8);
        let layout = layout();
        let deps = OptRootLocator::default().with_override("icu4c", "/nonexistent");
        OptionResolver::new(flags, &facts, &layout, &deps)
            .resolve()
            .unwrap()
    }

    fn count_prefixed(cmd: &CommandSpec, prefix: &str) -> Vec<String> {
        cmd.args
            .iter()
            .filter(|a| a.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_variant_truth_table() {
        for single in [false, true] {
            for stat in [false, true] {
                for compiler in [CompilerKind::Gcc, CompilerKind::Clang] {
                    let flags = FeatureFlags {
                        icu_support: false,
                        single_threading: single,
                        static_linking: stat,
                    };
                    let plan = plan(flags, compiler);

                    let threading = count_prefixed(&plan.build, "threading=");
                    let link = count_prefixed(&plan.build, "link=");
                    assert_eq!(threading.len(), 1);
                    assert_eq!(link.len(), 1);
                    assert_eq!(
                        threading[0],
                        if single { "threading=multi,single" } else { "threading=multi" }
                    );
                    assert_eq!(
                        link[0],
                        if stat { "link=shared,static" } else { "link=shared" }
                    );
                }
            }
        }
    }

    #[test]
    fn test_excluded_libraries() {
        assert_eq!(
            excluded_libraries(CompilerKind::Gcc),
            vec!["python", "mpi", "log"]
        );

        for kind in [CompilerKind::Clang, CompilerKind::Other] {
            assert_eq!(excluded_libraries(kind), vec!["python", "mpi"]);
        }
    }

    #[test]
    fn test_libcxx_flags_only_for_clang() {
        let clang = plan(FeatureFlags::default(), CompilerKind::Clang);
        assert!(clang.build.has_arg("cxxflags=-stdlib=libc++"));
        assert!(clang.build.has_arg("linkflags=-stdlib=libc++"));

        for kind in [CompilerKind::Gcc, CompilerKind::Other] {
            let plan = plan(FeatureFlags::default(), kind);
            assert!(!plan.build.args.iter().any(|a| a.contains("-stdlib=libc++")));
            assert!(plan.build.has_arg("cxxflags=-std=c++11"));
        }
    }

    #[test]
    fn test_default_clang_end_to_end() {
        let plan = plan(FeatureFlags::default(), CompilerKind::Clang);

        assert_eq!(
            plan.bootstrap.args,
            vec![
                "--prefix=/opt/boost@1.65.1",
                "--libdir=/opt/boost@1.65.1/lib",
                "--without-icu",
                "--without-libraries=python,mpi",
            ]
        );
        assert_eq!(
            plan.build.args,
            vec![
                "--prefix=/opt/boost@1.65.1",
                "--libdir=/opt/boost@1.65.1/lib",
                "-d2",
                "-j8",
                "--layout=tagged",
                "--user-config=user-config.jam",
                "-sNO_LZMA=1",
                "install",
                "threading=multi,single",
                "link=shared,static",
                "cxxflags=-std=c++11",
                "cxxflags=-stdlib=libc++",
                "linkflags=-stdlib=libc++",
            ]
        );
        assert_eq!(plan.headers.args, vec!["headers"]);
        assert_eq!(plan.build.program, PathBuf::from("/src/boost_1_65_1/b2"));
        assert_eq!(
            plan.bootstrap.program,
            PathBuf::from("/src/boost_1_65_1/bootstrap.sh")
        );
        assert_eq!(plan.user_config_line, "using darwin : : /usr/bin/c++ ;");
    }

    #[test]
    fn test_gcc_excludes_log_in_bootstrap() {
        let plan = plan(FeatureFlags::default(), CompilerKind::Gcc);
        assert!(plan.bootstrap.has_arg("--without-libraries=python,mpi,log"));
    }

    #[test]
    fn test_icu_prefix_from_locator() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("icu4c/lib")).unwrap();

        let facts = ToolchainFacts::new(CompilerKind::Clang, "clang++", 2);
        let layout = layout();
        let deps = OptRootLocator::new(Some(tmp.path().to_path_buf()));
        let flags = FeatureFlags {
            icu_support: true,
            ..FeatureFlags::default()
        };

        let plan = OptionResolver::new(flags, &facts, &layout, &deps)
            .resolve()
            .unwrap();
        let expected = format!("--with-icu={}", tmp.path().join("icu4c").display());
        assert!(plan.bootstrap.has_arg(&expected));
        assert!(!plan.bootstrap.has_arg("--without-icu"));
    }

    #[test]
    fn test_missing_icu_is_fatal() {
        let facts = ToolchainFacts::new(CompilerKind::Clang, "clang++", 2);
        let layout = layout();
        let deps = OptRootLocator::default();
        let flags = FeatureFlags {
            icu_support: true,
            ..FeatureFlags::default()
        };

        let err = OptionResolver::new(flags, &facts, &layout, &deps)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, InstallError::MissingDependency { .. }));
    }
}
