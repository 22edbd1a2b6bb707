//! File configuration
//!
//! Optional `vcpkg-provision.toml` overriding the built-in defaults:
//!
//! ```toml
//! [vcpkg]
//! remote_url = "https://github.com/microsoft/vcpkg.git"
//! root_name = "vcpkg"
//! depth = 1
//!
//! [merge]
//! tool = "/usr/bin/lipo"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::config::defaults::PROJECT_CONFIG_FILE;
use crate::core::bootstrap::BootstrapOptions;
use crate::core::merge::MergeTool;
use crate::error::ConfigError;
use crate::infra::dirs::ProvisionDirs;

/// Settings read from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Dependency root settings
    #[serde(default)]
    pub vcpkg: VcpkgConfig,

    /// Merge settings
    #[serde(default)]
    pub merge: MergeConfig,
}

/// `[vcpkg]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcpkgConfig {
    /// Repository to clone
    pub remote_url: Option<String>,

    /// Directory name of the root inside the build directory
    pub root_name: Option<String>,

    /// Clone and fetch depth
    pub depth: Option<NonZeroU32>,
}

/// `[merge]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Merge tool executable
    pub tool: Option<PathBuf>,
}

impl ProvisionConfig {
    /// Find the config file to use, if any
    ///
    /// The project file in `project_dir` wins over the user config file.
    pub fn discover(project_dir: &Path, dirs: &ProvisionDirs) -> Option<PathBuf> {
        [project_dir.join(PROJECT_CONFIG_FILE), dirs.config_path()]
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Load the explicit file, else the discovered one, else defaults
    pub fn load(
        explicit: Option<&Path>,
        project_dir: &Path,
        dirs: &ProvisionDirs,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::discover(project_dir, dirs) {
            Some(path) => Self::read(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a path; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Bootstrap settings with file overrides applied
    pub fn bootstrap_options(&self) -> BootstrapOptions {
        let defaults = BootstrapOptions::default();
        BootstrapOptions {
            remote_url: self.vcpkg.remote_url.clone().unwrap_or(defaults.remote_url),
            root_name: self.vcpkg.root_name.clone().unwrap_or(defaults.root_name),
            depth: self.vcpkg.depth.unwrap_or(defaults.depth),
        }
    }

    /// Merge tool with file overrides applied
    pub fn merge_tool(&self) -> MergeTool {
        self.merge
            .tool
            .as_ref()
            .map_or_else(MergeTool::default, MergeTool::new)
    }
}
