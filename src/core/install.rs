//! Manifest install
//!
//! Runs `vcpkg install` in manifest mode for a single triplet.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::env::ToolchainEnv;
use crate::core::triplet::default_triplet;
use crate::error::InstallError;
use crate::infra::process;

/// Name of the vcpkg executable inside the root
pub const VCPKG_EXECUTABLE: &str = if cfg!(windows) { "vcpkg.exe" } else { "vcpkg" };

/// One `vcpkg install` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Directory holding `vcpkg.json`; the working directory of vcpkg
    pub source_dir: PathBuf,
    /// Install root (`--x-install-root`)
    pub install_dir: Option<PathBuf>,
    /// Target triplet
    pub triplet: Option<String>,
    /// Dependency root
    pub root: PathBuf,
    /// Extra `--key value` options, passed in insertion order
    pub extra_options: Vec<(String, String)>,
}

impl InstallRequest {
    /// Request with only the required fields set
    pub fn new(source_dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            install_dir: None,
            triplet: None,
            root: root.into(),
            extra_options: Vec::new(),
        }
    }

    /// Set the install root
    #[must_use]
    pub fn install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Set the triplet
    #[must_use]
    pub fn triplet(mut self, triplet: impl Into<String>) -> Self {
        self.triplet = Some(triplet.into());
        self
    }

    /// Append an extra option
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_options.push((key.into(), value.into()));
        self
    }

    /// Path of the vcpkg executable
    pub fn executable(&self) -> PathBuf {
        self.root.join(VCPKG_EXECUTABLE)
    }

    /// Arguments passed to vcpkg
    pub fn install_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["install".into()];
        if let Some(triplet) = &self.triplet {
            args.push("--triplet".into());
            args.push(triplet.into());
        }
        if let Some(dir) = &self.install_dir {
            args.push("--x-install-root".into());
            args.push(dir.clone().into_os_string());
        }
        args.push("--vcpkg-root".into());
        args.push(self.root.clone().into_os_string());
        for (key, value) in &self.extra_options {
            args.push(format!("--{key}").into());
            args.push(value.into());
        }
        args
    }

    /// Tree vcpkg populates for this request, when both install root and
    /// triplet are known
    pub fn installed_tree(&self) -> Option<PathBuf> {
        match (&self.install_dir, &self.triplet) {
            (Some(dir), Some(triplet)) => Some(dir.join(triplet)),
            _ => None,
        }
    }
}

/// Run `vcpkg install` for a request
pub fn install_manifest(request: &InstallRequest, env: &ToolchainEnv) -> Result<(), InstallError> {
    let executable = request.executable();
    if !executable.is_file() {
        return Err(InstallError::ExecutableNotFound { path: executable });
    }

    let mut child_env = env.clone();
    child_env.set_root(&request.root);
    if let Some(triplet) = &request.triplet {
        child_env.set_default_triplet(triplet.as_str());
    }

    let mut cmd = Command::new(&executable);
    cmd.args(request.install_args())
        .current_dir(&request.source_dir);
    child_env.apply(&mut cmd);

    let label = request
        .triplet
        .as_deref()
        .or(child_env.default_triplet())
        .unwrap_or("default");
    tracing::info!("Installing vcpkg manifest for {label}");

    let output = process::run(&mut cmd).map_err(|source| InstallError::Failed {
        triplet: label.to_string(),
        source,
    })?;
    tracing::debug!("vcpkg install output:\n{output}");
    Ok(())
}

/// Give `env` the default triplet of `platform` unless one is already set
///
/// Windows installs then default to the static-library, dynamic-runtime
/// triplet instead of vcpkg's own dynamic default.
pub fn fill_default_triplet(env: &mut ToolchainEnv, platform: &str) {
    if env.default_triplet().is_some() {
        return;
    }
    match default_triplet(platform) {
        Ok(triplet) => {
            tracing::debug!("Default triplet for {platform}: {triplet}");
            env.set_default_triplet(triplet.to_string());
        }
        Err(e) => tracing::debug!("Leaving the default triplet to vcpkg: {e}"),
    }
}

/// Directory of an installed triplet under an install root
pub fn installed_tree(install_dir: &Path, triplet: &str) -> PathBuf {
    install_dir.join(triplet)
}
