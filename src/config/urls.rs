//! Remote repository URLs

/// Upstream vcpkg repository
pub const VCPKG_REPOSITORY: &str = "https://github.com/microsoft/vcpkg.git";
