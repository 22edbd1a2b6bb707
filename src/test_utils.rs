//! Test utilities
//!
//! Generators for property-based testing and fixtures standing in for the
//! external tools (git remotes, vcpkg, lipo).

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate an architecture token recognized by the resolver
    pub fn arch_token() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("amd64"),
            Just("x86_64"),
            Just("i686"),
            Just("arm64"),
            Just("aarch64"),
            Just("universal2"),
        ]
    }

    /// Generate an OS token recognized by the resolver
    pub fn os_token() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("linux"),
            Just("macosx"),
            Just("darwin"),
            Just("win"),
        ]
    }

    /// Generate a free-form platform descriptor
    pub fn platform_descriptor() -> impl Strategy<Value = String> {
        (os_token(), "[0-9]{0,2}", arch_token())
            .prop_map(|(os, version, arch)| format!("{os}_{version}_{arch}"))
    }
}

#[cfg(test)]
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use tempfile::TempDir;

    /// Whether a git executable is available for fixtures
    pub fn git_available() -> bool {
        crate::infra::git::locate_git_cli().is_some()
    }

    /// Run git in `dir`, panicking on failure, and return trimmed stdout
    pub fn run_git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write an executable script
    #[cfg(unix)]
    pub fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create script directory");
        }
        std::fs::write(path, body).expect("Failed to write script");
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
    }

    /// Bootstrap script that drops a stub `vcpkg` next to itself
    pub const BOOTSTRAP_SCRIPT: &str = "#!/bin/sh\n\
        printf '#!/bin/sh\\necho vcpkg \"$@\"\\n' > vcpkg\n\
        chmod +x vcpkg\n";

    /// Merge tool that concatenates both inputs into the output
    pub const FAKE_LIPO: &str = "#!/bin/sh\n\
        [ \"$1\" = \"-create\" ] && [ \"$4\" = \"-output\" ] || exit 2\n\
        cat \"$2\" \"$3\" > \"$5\"\n";

    /// A local repository standing in for the upstream vcpkg remote
    ///
    /// Holds two commits: the first adds `README.md` and the bootstrap
    /// script, the second adds `CHANGELOG.md`.
    pub struct SourceRepo {
        dir: TempDir,
        commits: Vec<String>,
    }

    impl SourceRepo {
        /// Create the repository; requires git
        pub fn new() -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let path = dir.path();

            run_git(path, &["init", "--quiet"]);
            run_git(path, &["config", "uploadpack.allowAnySHA1InWant", "true"]);

            std::fs::write(path.join("README.md"), "vcpkg\n").expect("Failed to write README");
            std::fs::write(path.join("bootstrap-vcpkg.sh"), BOOTSTRAP_SCRIPT)
                .expect("Failed to write bootstrap script");
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(
                    path.join("bootstrap-vcpkg.sh"),
                    std::fs::Permissions::from_mode(0o755),
                )
                .expect("Failed to make bootstrap script executable");
            }
            std::fs::write(path.join("bootstrap-vcpkg.bat"), "@echo off\r\n")
                .expect("Failed to write bootstrap script");
            run_git(path, &["add", "."]);
            run_git(path, &["update-index", "--chmod=+x", "bootstrap-vcpkg.sh"]);
            run_git(path, &["commit", "--quiet", "-m", "initial"]);
            let first = run_git(path, &["rev-parse", "HEAD"]);

            std::fs::write(path.join("CHANGELOG.md"), "changes\n")
                .expect("Failed to write CHANGELOG");
            run_git(path, &["add", "."]);
            run_git(path, &["commit", "--quiet", "-m", "second"]);
            let second = run_git(path, &["rev-parse", "HEAD"]);

            Self {
                dir,
                commits: vec![first, second],
            }
        }

        /// Path of the repository
        pub fn path(&self) -> PathBuf {
            self.dir.path().to_path_buf()
        }

        /// `file://` URL, so shallow fetches go through the transport
        pub fn url(&self) -> String {
            format!("file://{}", self.dir.path().display())
        }

        /// The commit without `CHANGELOG.md`
        pub fn first_commit(&self) -> &str {
            &self.commits[0]
        }

        /// Tip of the default branch
        pub fn last_commit(&self) -> &str {
            &self.commits[1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_platform_descriptor_generator(platform in platform_descriptor()) {
            prop_assert!(platform.contains('_'));
            prop_assert!(platform.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }
}
