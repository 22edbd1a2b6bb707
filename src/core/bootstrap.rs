//! Dependency root bootstrap
//!
//! Ensures a vcpkg checkout exists under the build directory at the pinned
//! revision, then runs vcpkg's bootstrap script to build the `vcpkg`
//! executable.
//!
//! # Recovery
//!
//! An existing root is updated in place. If that fails the whole root is
//! deleted and cloned again; this happens at most once per call and a
//! failure of the fresh clone is fatal.

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults::{DEFAULT_FETCH_DEPTH, DEFAULT_ROOT_NAME};
use crate::config::urls::VCPKG_REPOSITORY;
use crate::core::env::ToolchainEnv;
use crate::error::BootstrapError;
use crate::infra::filesystem;
use crate::infra::git::{select_backend, SourceControl};
use crate::infra::process;

/// Platform-specific bootstrap entry point inside the root
pub const BOOTSTRAP_SCRIPT: &str = if cfg!(windows) {
    "bootstrap-vcpkg.bat"
} else {
    "bootstrap-vcpkg.sh"
};

/// A checkout of the vcpkg repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRoot {
    /// Location of the checkout
    pub path: PathBuf,
    /// Remote it was fetched from
    pub remote_url: String,
    /// Revision it is pinned to, if any
    pub pinned_revision: Option<String>,
}

impl DependencyRoot {
    /// Whether the checkout directory exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Where provisioning starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootState {
    /// A root exists and is fetched in place
    AttemptUpdate,
    /// No root exists (or it was just deleted) and one is cloned
    FreshClone,
}

impl RootState {
    /// Initial state for a root location
    pub fn initial(root: &Path) -> Self {
        if root.exists() {
            Self::AttemptUpdate
        } else {
            Self::FreshClone
        }
    }
}

/// What provisioning did to the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootAction {
    /// Cloned into an empty location
    Cloned,
    /// Existing root fetched and checked out
    Updated,
    /// Existing root failed to update and was replaced
    Recloned,
}

impl fmt::Display for RootAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloned => write!(f, "cloned"),
            Self::Updated => write!(f, "updated"),
            Self::Recloned => write!(f, "re-cloned"),
        }
    }
}

/// Result of [`Bootstrapper::provision`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// The ready-to-use root
    pub root: DependencyRoot,
    /// How it was obtained
    pub action: RootAction,
}

/// Bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Repository to clone
    pub remote_url: String,
    /// Directory name of the root inside the build directory
    pub root_name: String,
    /// History depth for clones and fetches
    pub depth: NonZeroU32,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            remote_url: VCPKG_REPOSITORY.to_string(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            depth: NonZeroU32::new(DEFAULT_FETCH_DEPTH).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Provisions the dependency root
#[derive(Debug)]
pub struct Bootstrapper {
    backend: Box<dyn SourceControl>,
    env: ToolchainEnv,
    options: BootstrapOptions,
}

impl Bootstrapper {
    /// Create a bootstrapper, selecting the source-control backend
    ///
    /// Telemetry is disabled before the backend is chosen so that every
    /// process it spawns inherits the setting.
    pub fn new(mut env: ToolchainEnv, options: BootstrapOptions) -> Result<Self, BootstrapError> {
        env.disable_metrics();
        let backend = select_backend(&env).map_err(BootstrapError::Backend)?;
        Ok(Self::with_backend(backend, env, options))
    }

    /// Create a bootstrapper around an explicit backend
    pub fn with_backend(
        backend: Box<dyn SourceControl>,
        env: ToolchainEnv,
        options: BootstrapOptions,
    ) -> Self {
        Self {
            backend,
            env,
            options,
        }
    }

    /// The backend in use
    pub fn backend(&self) -> &dyn SourceControl {
        self.backend.as_ref()
    }

    /// Environment handed to child processes
    pub fn env(&self) -> &ToolchainEnv {
        &self.env
    }

    /// Give up the bootstrapper, keeping the environment it produced
    pub fn into_env(self) -> ToolchainEnv {
        self.env
    }

    /// Location of the root for a build directory
    pub fn root_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(&self.options.root_name)
    }

    /// Ensure the root exists at `pinned_revision` and return its path
    pub fn ensure_dependency_root(
        &mut self,
        build_dir: &Path,
        pinned_revision: Option<&str>,
    ) -> Result<PathBuf, BootstrapError> {
        self.provision(build_dir, pinned_revision)
            .map(|provisioned| provisioned.root.path)
    }

    /// Use the root named by the environment, bootstrapping one otherwise
    pub fn resolve_or_bootstrap(
        &mut self,
        build_dir: &Path,
        pinned_revision: Option<&str>,
    ) -> Result<PathBuf, BootstrapError> {
        if let Some(root) = self.env.root() {
            tracing::info!("Using vcpkg root from environment: {}", root.display());
            return Ok(root.to_path_buf());
        }
        tracing::info!("VCPKG_ROOT not set, attempting to install vcpkg");
        self.ensure_dependency_root(build_dir, pinned_revision)
    }

    /// Ensure the root exists at `pinned_revision`, reporting what was done
    pub fn provision(
        &mut self,
        build_dir: &Path,
        pinned_revision: Option<&str>,
    ) -> Result<Provisioned, BootstrapError> {
        self.env.disable_metrics();
        filesystem::create_dir_all(build_dir)?;

        let root = self.root_path(build_dir);
        let action = self.materialize(&root, pinned_revision)?;
        tracing::info!("vcpkg root {action} at {}", root.display());

        self.run_bootstrap_script(&root)?;
        self.env.set_root(&root);

        Ok(Provisioned {
            root: DependencyRoot {
                path: root,
                remote_url: self.options.remote_url.clone(),
                pinned_revision: pinned_revision.map(str::to_string),
            },
            action,
        })
    }

    fn materialize(
        &self,
        root: &Path,
        pinned_revision: Option<&str>,
    ) -> Result<RootAction, BootstrapError> {
        let action = match RootState::initial(root) {
            RootState::AttemptUpdate => {
                tracing::info!("vcpkg already exists, attempting to update");
                match self
                    .backend
                    .fetch_and_checkout(root, pinned_revision, self.options.depth)
                {
                    Ok(()) => return Ok(RootAction::Updated),
                    Err(e) => {
                        tracing::warn!("Failed to update vcpkg, removing and re-cloning: {e}");
                        filesystem::remove_dir_all(root)?;
                        RootAction::Recloned
                    }
                }
            }
            RootState::FreshClone => RootAction::Cloned,
        };

        self.fresh_clone(root, pinned_revision)?;
        Ok(action)
    }

    fn fresh_clone(&self, root: &Path, pinned_revision: Option<&str>) -> Result<(), BootstrapError> {
        tracing::info!(
            "Cloning {} into {} using {}",
            self.options.remote_url,
            root.display(),
            self.backend.kind()
        );

        let result = self.backend.clone_shallow(
            root,
            &self.options.remote_url,
            self.options.depth,
            pinned_revision,
        );

        if let Err(source) = result {
            // Leave nothing half-cloned behind for the next invocation
            if let Err(e) = filesystem::remove_dir_all(root) {
                tracing::warn!("Could not clean up partial clone: {e}");
            }
            return Err(BootstrapError::Clone {
                root: root.to_path_buf(),
                source,
            });
        }
        Ok(())
    }

    fn run_bootstrap_script(&self, root: &Path) -> Result<(), BootstrapError> {
        tracing::info!("Running {BOOTSTRAP_SCRIPT}");
        let mut cmd = Command::new(root.join(BOOTSTRAP_SCRIPT));
        cmd.current_dir(root);
        self.env.apply(&mut cmd);

        process::run(&mut cmd).map_err(|source| BootstrapError::Script {
            root: root.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// Use the root named by `env`, bootstrapping one otherwise
///
/// No backend is selected when a root is already known, so a preset
/// `VCPKG_ROOT` works on machines without git.
pub fn resolve_root(
    env: &mut ToolchainEnv,
    options: BootstrapOptions,
    build_dir: &Path,
    pinned_revision: Option<&str>,
) -> Result<PathBuf, BootstrapError> {
    if let Some(root) = env.root() {
        tracing::info!("Using vcpkg root from environment: {}", root.display());
        return Ok(root.to_path_buf());
    }

    let mut bootstrapper = Bootstrapper::new(env.clone(), options)?;
    let root = bootstrapper.resolve_or_bootstrap(build_dir, pinned_revision)?;
    *env = bootstrapper.into_env();
    Ok(root)
}
