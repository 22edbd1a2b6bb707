//! Default configuration values

/// Directory name of the dependency root inside the build directory
pub const DEFAULT_ROOT_NAME: &str = "vcpkg";

/// History depth used for every clone and fetch
pub const DEFAULT_FETCH_DEPTH: u32 = 1;

/// Name of the remote created for the dependency root
pub const REMOTE_NAME: &str = "origin";

/// External tool used to merge two static libraries into a universal one
pub const DEFAULT_MERGE_TOOL: &str = "lipo";

/// File extensions treated as static libraries by the merge engine
pub const STATIC_LIBRARY_EXTENSIONS: &[&str] = &["a"];

/// Manifest field naming the pinned dependency root revision
pub const BASELINE_FIELD: &str = "builtin-baseline";

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = "vcpkg-provision.toml";

/// Environment variables read or produced for the toolchain
pub mod env {
    /// Disables vcpkg telemetry
    pub const DISABLE_METRICS: &str = "VCPKG_DISABLE_METRICS";

    /// Location of the dependency root
    pub const ROOT: &str = "VCPKG_ROOT";

    /// Triplet used when `vcpkg install` gets no `--triplet`
    pub const DEFAULT_TRIPLET: &str = "VCPKG_DEFAULT_TRIPLET";

    /// Forces the git CLI backend over the in-process library
    pub const USE_CLI_GIT: &str = "INSTALL_VCPKG_USE_CLI_GIT";
}
