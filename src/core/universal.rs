//! Universal (dual-architecture) install
//!
//! vcpkg uninstalls one triplet's packages when another triplet is installed
//! into the same install root, so the two architectures are installed into
//! separate staging roots, brought together, and merged into a
//! `universal2-<os>` tree.

use std::path::{Path, PathBuf};

use crate::core::env::ToolchainEnv;
use crate::core::install::{install_manifest, installed_tree, InstallRequest};
use crate::core::merge::{merge_trees, MergeTask, MergeTool};
use crate::core::triplet::{Arch, Os, Triplet};
use crate::error::UniversalError;
use crate::infra::filesystem;

/// Host and cross triplets for a machine architecture
pub fn split_host_cross(
    host: Arch,
    arm64: Triplet,
    x64: Triplet,
) -> Result<(Triplet, Triplet), UniversalError> {
    match host {
        Arch::Arm64 => Ok((arm64, x64)),
        Arch::X64 => Ok((x64, arm64)),
        other => Err(UniversalError::UnsupportedHost {
            arch: other.to_string(),
        }),
    }
}

fn check_pair(arm64: Triplet, x64: Triplet) -> Result<(), UniversalError> {
    let incompatible = |reason: &str| UniversalError::IncompatibleTriplets {
        arm64: arm64.to_string(),
        x64: x64.to_string(),
        reason: reason.to_string(),
    };

    if arm64.arch != Arch::Arm64 {
        return Err(incompatible("first triplet must target arm64"));
    }
    if x64.arch != Arch::X64 {
        return Err(incompatible("second triplet must target x64"));
    }
    if arm64.os != x64.os || arm64.variant != x64.variant {
        return Err(incompatible("triplets must share an OS and variant"));
    }
    Ok(())
}

/// Merge two installed triplet trees under `install_root`
///
/// `primary` supplies every non-library file. Any previous universal tree
/// is replaced. Returns the universal triplet's directory name.
pub fn merge_installed_triplets(
    install_root: &Path,
    primary: Triplet,
    secondary: Triplet,
    tool: &MergeTool,
) -> Result<String, UniversalError> {
    let universal = primary.to_universal().to_string();
    let task = MergeTask::new(
        installed_tree(install_root, &primary.to_string()),
        installed_tree(install_root, &secondary.to_string()),
        install_root.join(&universal),
    );

    for tree in [&task.primary, &task.secondary] {
        if !tree.is_dir() {
            return Err(UniversalError::MissingTree { path: tree.clone() });
        }
    }

    if task.destination.exists() {
        tracing::debug!("Removing stale {}", task.destination.display());
        filesystem::remove_dir_all(&task.destination)?;
    }

    merge_trees(&task, tool)?;
    Ok(universal)
}

/// Install a manifest for both architectures and merge the results
#[derive(Debug, Clone)]
pub struct UniversalInstall {
    source_dir: PathBuf,
    root: PathBuf,
    install_dir: PathBuf,
    arm64: Triplet,
    x64: Triplet,
    extra_options: Vec<(String, String)>,
    host: Option<Arch>,
    tool: MergeTool,
}

impl UniversalInstall {
    /// Plan a universal install of `source_dir`'s manifest for `os`
    pub fn new(
        source_dir: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        install_dir: impl Into<PathBuf>,
        os: Os,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            root: root.into(),
            install_dir: install_dir.into(),
            arm64: Triplet::new(Arch::Arm64, os),
            x64: Triplet::new(Arch::X64, os),
            extra_options: Vec::new(),
            host: None,
            tool: MergeTool::default(),
        }
    }

    /// Use explicit triplets for the two architectures
    #[must_use]
    pub fn triplets(mut self, arm64: Triplet, x64: Triplet) -> Self {
        self.arm64 = arm64;
        self.x64 = x64;
        self
    }

    /// Override the detected host architecture
    #[must_use]
    pub fn host_arch(mut self, arch: Arch) -> Self {
        self.host = Some(arch);
        self
    }

    /// Use a different merge tool
    #[must_use]
    pub fn merge_tool(mut self, tool: MergeTool) -> Self {
        self.tool = tool;
        self
    }

    /// Forward an extra option to both installs
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_options.push((key.into(), value.into()));
        self
    }

    /// Sibling of the install dir; `None` when the install dir has no name
    fn staging_dir(&self, label: &str) -> Option<PathBuf> {
        let name = self.install_dir.file_name()?.to_string_lossy();
        Some(
            self.install_dir
                .with_file_name(format!(".{name}-{label}-staging")),
        )
    }

    fn install_into(
        &self,
        staging: &Path,
        triplet: Triplet,
        env: &ToolchainEnv,
    ) -> Result<(), UniversalError> {
        filesystem::remove_dir_all(staging)?;
        filesystem::create_dir_all(staging)?;

        let mut request = InstallRequest::new(&self.source_dir, &self.root)
            .install_dir(staging)
            .triplet(triplet.to_string());
        request.extra_options = self.extra_options.clone();

        install_manifest(&request, env)?;
        Ok(())
    }

    /// Run both installs, merge, and publish the result to the install dir
    ///
    /// Returns the universal triplet's directory name.
    pub fn run(&self, env: &ToolchainEnv) -> Result<String, UniversalError> {
        check_pair(self.arm64, self.x64)?;

        // The install dir is replaced wholesale, so `.`, `..` and `/` would
        // take the staging roots down with it
        let invalid_dir = || UniversalError::InvalidInstallDir {
            path: self.install_dir.clone(),
        };
        let host_stage = self.staging_dir("host").ok_or_else(invalid_dir)?;
        let cross_stage = self.staging_dir("cross").ok_or_else(invalid_dir)?;

        let host = match self.host.or_else(Arch::host) {
            Some(arch) => arch,
            None => {
                return Err(UniversalError::UnsupportedHost {
                    arch: std::env::consts::ARCH.to_string(),
                })
            }
        };
        let (host_triplet, cross_triplet) = split_host_cross(host, self.arm64, self.x64)?;
        tracing::info!("Universal install: host {host_triplet}, cross {cross_triplet}");

        self.install_into(&host_stage, host_triplet, env)?;
        self.install_into(&cross_stage, cross_triplet, env)?;

        let cross_tree = installed_tree(&cross_stage, &cross_triplet.to_string());
        if !cross_tree.is_dir() {
            return Err(UniversalError::MissingTree { path: cross_tree });
        }
        filesystem::move_dir(
            &cross_tree,
            &installed_tree(&host_stage, &cross_triplet.to_string()),
        )?;

        let universal =
            merge_installed_triplets(&host_stage, host_triplet, cross_triplet, &self.tool)?;

        filesystem::remove_dir_all(&self.install_dir)?;
        filesystem::move_dir(&host_stage, &self.install_dir)?;
        filesystem::remove_dir_all(&cross_stage)?;

        tracing::info!(
            "Universal tree ready at {}",
            self.install_dir.join(&universal).display()
        );
        Ok(universal)
    }
}

/// Install for both architectures of `os` and merge into `install_dir`
pub fn merge_universal_install(
    source_dir: &Path,
    root: &Path,
    install_dir: &Path,
    os: Os,
    env: &ToolchainEnv,
) -> Result<String, UniversalError> {
    UniversalInstall::new(source_dir, root, install_dir, os).run(env)
}
