//! Error types for vcpkg-provision
//!
//! Domain-specific error types using thiserror.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::infra::git::GitError;
use crate::infra::process::ProcessError;

/// Remedy shown whenever the dependency root cannot be provisioned
pub const INSTALL_MANUALLY_HINT: &str =
    "Install vcpkg manually and set VCPKG_ROOT to the vcpkg root directory";

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Selecting a source-control backend
    BackendDetection,
    /// Cloning or updating the dependency root
    Clone,
    /// Running the bootstrap script
    Bootstrap,
    /// Running `vcpkg install`
    Install,
    /// Merging install trees
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BackendDetection => "backend detection",
            Self::Clone => "clone",
            Self::Bootstrap => "bootstrap",
            Self::Install => "install",
            Self::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// Triplet resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripletError {
    /// No architecture token found
    #[error("Cannot determine architecture from platform '{platform}'")]
    UnknownArchitecture { platform: String },

    /// No operating system token found
    #[error("Cannot determine operating system from platform '{platform}'")]
    UnknownOs { platform: String },

    /// Not a canonical `arch-os[-variant]` triplet
    #[error("Invalid triplet '{triplet}': expected <arch>-<os>[-static|-static-md]")]
    Malformed { triplet: String },
}

/// Pinned-revision manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest could not be read
    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Manifest is not valid JSON
    #[error("Failed to parse manifest '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Manifest has no baseline field
    #[error("Manifest '{path}' has no '{field}' field naming the vcpkg revision")]
    MissingBaseline { path: PathBuf, field: String },
}

/// Dependency root provisioning errors
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// No usable source-control backend
    #[error("No usable source-control backend. Install git and try again")]
    Backend(#[source] GitError),

    /// Clone of a fresh root failed
    #[error("Failed to clone vcpkg into '{root}'. {}", INSTALL_MANUALLY_HINT)]
    Clone {
        root: PathBuf,
        #[source]
        source: GitError,
    },

    /// Bootstrap script failed
    #[error("Failed to bootstrap vcpkg in '{root}'. {}", INSTALL_MANUALLY_HINT)]
    Script {
        root: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Filesystem error while preparing the root
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Manifest install errors
#[derive(Error, Debug)]
pub enum InstallError {
    /// vcpkg executable missing from the root
    #[error("vcpkg executable not found at '{path}'. Bootstrap the root or set VCPKG_ROOT")]
    ExecutableNotFound { path: PathBuf },

    /// `vcpkg install` failed
    #[error("vcpkg install failed for triplet '{triplet}'")]
    Failed {
        triplet: String,
        #[source]
        source: ProcessError,
    },
}

/// Tree merge errors
#[derive(Error, Debug)]
pub enum MergeError {
    /// Destination already present
    #[error("Merge destination '{path}' already exists")]
    DestinationExists { path: PathBuf },

    /// Primary tree missing
    #[error("Merge source '{path}' is not a directory")]
    MissingSource { path: PathBuf },

    /// Directory walk failed
    #[error("Failed to walk '{path}': {error}")]
    Walk { path: PathBuf, error: String },

    /// Merge tool failed for a library
    #[error("Failed to merge '{file}'")]
    Tool {
        file: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Filesystem error while mirroring the tree
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Universal install errors
#[derive(Error, Debug)]
pub enum UniversalError {
    /// Running machine is neither arm64 nor x64
    #[error("Unsupported host architecture '{arch}' for a universal build")]
    UnsupportedHost { arch: String },

    /// Triplets do not describe the expected architectures on one OS
    #[error("Triplets '{arm64}' and '{x64}' cannot be merged: {reason}")]
    IncompatibleTriplets {
        arm64: String,
        x64: String,
        reason: String,
    },

    /// Per-triplet tree missing after install
    #[error("Installed tree '{path}' not found")]
    MissingTree { path: PathBuf },

    /// Install dir does not end in a directory name it can be replaced by
    #[error("Install directory '{path}' must end in a directory name")]
    InvalidInstallDir { path: PathBuf },

    /// Install error
    #[error(transparent)]
    Install(#[from] InstallError),

    /// Merge error
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to move a directory
    #[error("Failed to move '{from}' to '{to}': {error}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Top-level vcpkg-provision error type
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Triplet error
    #[error(transparent)]
    Triplet(#[from] TripletError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Bootstrap error
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Install error
    #[error(transparent)]
    Install(#[from] InstallError),

    /// Merge error
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Universal install error
    #[error(transparent)]
    Universal(#[from] UniversalError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

impl ProvisionError {
    /// Stage the error belongs to, when it is tied to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Bootstrap(BootstrapError::Backend(_)) => Some(Stage::BackendDetection),
            Self::Bootstrap(BootstrapError::Clone { .. } | BootstrapError::Filesystem(_)) => {
                Some(Stage::Clone)
            }
            Self::Bootstrap(BootstrapError::Script { .. }) => Some(Stage::Bootstrap),
            Self::Install(_) | Self::Universal(UniversalError::Install(_)) => Some(Stage::Install),
            Self::Merge(_) | Self::Universal(_) => Some(Stage::Merge),
            Self::Triplet(_) | Self::Manifest(_) | Self::Config(_) | Self::Filesystem(_) => None,
        }
    }
}
