//! Triplet resolution
//!
//! Maps free-form platform descriptors (`win-amd64`,
//! `manylinux_2_17_x86_64`, `macosx-11.0-universal2`, ...) to vcpkg
//! triplets of the form `<arch>-<os>[-variant]`.
//!
//! Matching is by substring against ordered token tables; the first match
//! wins, so more specific tokens come before the ones they contain
//! (`x86_64` before `x86`, `arm64` before `arm`, `darwin` before `win`).

use std::fmt;
use std::str::FromStr;

use crate::error::TripletError;

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    X86,
    Arm64,
    Arm,
    Universal2,
}

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Osx,
    Windows,
}

/// Linkage variant suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Static libraries and static CRT
    Static,
    /// Static libraries with the dynamic CRT
    StaticMd,
}

const ARCH_TOKENS: &[(&str, Arch)] = &[
    ("amd64", Arch::X64),
    ("x86_64", Arch::X64),
    ("x64", Arch::X64),
    ("x86", Arch::X86),
    ("i686", Arch::X86),
    ("i386", Arch::X86),
    ("i586", Arch::X86),
    ("win32", Arch::X86),
    ("arm64", Arch::Arm64),
    ("aarch64", Arch::Arm64),
    ("arm", Arch::Arm),
    ("arm32", Arch::Arm),
    ("universal2", Arch::Universal2),
];

const OS_TOKENS: &[(&str, Os)] = &[
    ("linux", Os::Linux),
    ("macos", Os::Osx),
    ("osx", Os::Osx),
    ("darwin", Os::Osx),
    ("win", Os::Windows),
];

impl Arch {
    /// Name used in triplets
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::X86 => "x86",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::Universal2 => "universal2",
        }
    }

    /// Architecture of the running machine
    pub fn host() -> Option<Self> {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Map a `std::env::consts::ARCH` value
    pub fn from_rust_arch(arch: &str) -> Option<Self> {
        match arch {
            "x86_64" => Some(Self::X64),
            "x86" => Some(Self::X86),
            "aarch64" => Some(Self::Arm64),
            "arm" => Some(Self::Arm),
            _ => None,
        }
    }
}

impl Os {
    /// Name used in triplets
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::Windows => "windows",
        }
    }
}

impl Variant {
    /// Suffix appended to the triplet
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::StaticMd => "static-md",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vcpkg triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triplet {
    pub arch: Arch,
    pub os: Os,
    pub variant: Option<Variant>,
}

impl Triplet {
    /// Create a triplet without a variant
    pub fn new(arch: Arch, os: Os) -> Self {
        Self {
            arch,
            os,
            variant: None,
        }
    }

    /// Triplet for the running machine
    pub fn host() -> Result<Self, TripletError> {
        resolve(&host_platform())
    }

    /// Static variant; only Windows needs the suffix
    #[must_use]
    pub fn to_static_variant(self) -> Self {
        self.with_windows_variant(Variant::Static)
    }

    /// Static libraries with the dynamic runtime; only Windows needs the suffix
    #[must_use]
    pub fn to_static_dynamic_variant(self) -> Self {
        self.with_windows_variant(Variant::StaticMd)
    }

    /// The same OS with the `universal2` architecture
    #[must_use]
    pub fn to_universal(self) -> Self {
        Self {
            arch: Arch::Universal2,
            ..self
        }
    }

    fn with_windows_variant(self, variant: Variant) -> Self {
        if self.os == Os::Windows {
            Self {
                variant: Some(variant),
                ..self
            }
        } else {
            self
        }
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)?;
        if let Some(variant) = self.variant {
            write!(f, "-{}", variant.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for Triplet {
    type Err = TripletError;

    /// Parse the canonical `<arch>-<os>[-static|-static-md]` form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TripletError::Malformed {
            triplet: s.to_string(),
        };

        let (arch, rest) = s.split_once('-').ok_or_else(malformed)?;
        let (os, variant) = match rest.split_once('-') {
            Some((os, variant)) => (os, Some(variant)),
            None => (rest, None),
        };

        let arch = ARCH_TOKENS
            .iter()
            .map(|(_, arch)| *arch)
            .find(|candidate| candidate.as_str() == arch)
            .ok_or_else(malformed)?;
        let os = [Os::Linux, Os::Osx, Os::Windows]
            .into_iter()
            .find(|candidate| candidate.as_str() == os)
            .ok_or_else(malformed)?;
        let variant = match variant {
            None => None,
            Some("static") => Some(Variant::Static),
            Some("static-md") => Some(Variant::StaticMd),
            Some(_) => return Err(malformed()),
        };

        Ok(Self { arch, os, variant })
    }
}

/// Resolve a free-form platform descriptor to a triplet
pub fn resolve(platform: &str) -> Result<Triplet, TripletError> {
    let lowered = platform.to_lowercase();

    let arch = ARCH_TOKENS
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, arch)| *arch)
        .ok_or_else(|| TripletError::UnknownArchitecture {
            platform: platform.to_string(),
        })?;
    let os = OS_TOKENS
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, os)| *os)
        .ok_or_else(|| TripletError::UnknownOs {
            platform: platform.to_string(),
        })?;

    Ok(Triplet::new(arch, os))
}

/// Platform descriptor of the running machine, e.g. `linux-x86_64`
pub fn host_platform() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Triplet vcpkg should default to for a platform
///
/// Windows builds link vcpkg libraries statically against the dynamic CRT;
/// the other platforms link statically by default.
pub fn default_triplet(platform: &str) -> Result<Triplet, TripletError> {
    resolve(platform).map(Triplet::to_static_dynamic_variant)
}
