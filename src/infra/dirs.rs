//! Platform-specific directory management
//!
//! Follows XDG Base Directory Specification on Linux and standard locations
//! on macOS and Windows.
//!
//! Environment variables can override default directories:
//! - `VCPKG_PROVISION_CACHE_DIR` - Override cache directory
//! - `VCPKG_PROVISION_CONFIG_DIR` - Override config directory

use std::env;
use std::path::PathBuf;

/// Environment variable names for directory overrides
pub const ENV_CACHE_DIR: &str = "VCPKG_PROVISION_CACHE_DIR";
pub const ENV_CONFIG_DIR: &str = "VCPKG_PROVISION_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "vcpkg-provision";

/// Subdirectory holding bootstrapped roots
const BUILD_SUBDIR: &str = "build";

/// Platform-specific directory provider
#[derive(Debug, Clone)]
pub struct ProvisionDirs {
    cache_dir: PathBuf,
    config_dir: PathBuf,
}

impl ProvisionDirs {
    /// Resolve directories from the environment, then platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache_dir: env::var_os(ENV_CACHE_DIR)
                .filter(|v| !v.is_empty())
                .map_or_else(Self::platform_cache_dir, PathBuf::from),
            config_dir: env::var_os(ENV_CONFIG_DIR)
                .filter(|v| !v.is_empty())
                .map_or_else(Self::platform_config_dir, PathBuf::from),
        }
    }

    /// Use explicit directories
    #[must_use]
    pub fn with_paths(cache_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Cache directory
    ///
    /// - Linux: `$XDG_CACHE_HOME/vcpkg-provision` or `~/.cache/vcpkg-provision`
    /// - macOS: `~/Library/Caches/vcpkg-provision`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    /// Config directory
    ///
    /// - Linux: `$XDG_CONFIG_HOME/vcpkg-provision` or `~/.config/vcpkg-provision`
    /// - macOS: `~/Library/Application Support/vcpkg-provision`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Default build directory, where the dependency root is placed
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.cache_dir.join(BUILD_SUBDIR)
    }

    /// User config file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn platform_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".cache").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".cache").join(APP_NAME))
            })
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for ProvisionDirs {
    fn default() -> Self {
        Self::new()
    }
}
