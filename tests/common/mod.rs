//! Common test utilities and helpers
//!
//! Shared fixtures for integration tests: temporary projects, a local git
//! remote standing in for the vcpkg repository and shell scripts standing in
//! for vcpkg and lipo.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory and provides utilities for setting up
/// test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the binary in `dir` with an isolated environment
pub fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vcpkg-provision"))
        .current_dir(dir)
        .env_remove("VCPKG_ROOT")
        .env_remove("VCPKG_DEFAULT_TRIPLET")
        .env("VCPKG_PROVISION_CONFIG_DIR", dir.join(".config"))
        .env("VCPKG_PROVISION_CACHE_DIR", dir.join(".cache"))
        .args(args)
        .output()
        .expect("Failed to execute vcpkg-provision")
}

/// Whether a working git executable is on PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
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

/// vcpkg stand-in that populates `<install-root>/<triplet>`
///
/// Every triplet gets a header naming it and a `libz.a` containing the
/// triplet, so merged libraries show both inputs. The arguments are logged
/// to `<install-root>/../vcpkg-calls.log`.
pub const FAKE_VCPKG: &str = r#"#!/bin/sh
triplet=""
root=""
while [ $# -gt 0 ]; do
  case "$1" in
    --triplet) triplet="$2"; shift 2 ;;
    --x-install-root) root="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo "$triplet" >> "$root/../vcpkg-calls.log"
mkdir -p "$root/$triplet/include" "$root/$triplet/lib"
printf '/* %s */\n' "$triplet" > "$root/$triplet/include/zlib.h"
printf '%s' "$triplet" > "$root/$triplet/lib/libz.a"
"#;

/// A local repository standing in for the upstream vcpkg remote
///
/// Holds two commits: the first adds `README.md` and the bootstrap scripts,
/// the second adds `CHANGELOG.md`.
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

        std::fs::write(path.join("CHANGELOG.md"), "changes\n").expect("Failed to write CHANGELOG");
        run_git(path, &["add", "."]);
        run_git(path, &["commit", "--quiet", "-m", "second"]);
        let second = run_git(path, &["rev-parse", "HEAD"]);

        Self {
            dir,
            commits: vec![first, second],
        }
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
