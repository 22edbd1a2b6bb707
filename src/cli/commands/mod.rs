//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod bootstrap;
pub mod doctor;
pub mod install;
pub mod merge;
pub mod triplet;
pub mod universal;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::bootstrap::resolve_root;
use crate::core::config::ProvisionConfig;
use crate::core::env::ToolchainEnv;
use crate::core::install::fill_default_triplet;
use crate::core::manifest::read_pinned_revision;
use crate::core::triplet::host_platform;
use crate::error::ProvisionError;
use crate::infra::dirs::ProvisionDirs;

/// Manifest file looked up in the source directory
pub const MANIFEST_FILE: &str = "vcpkg.json";

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a platform descriptor to a vcpkg triplet
    Triplet {
        /// Platform descriptor such as `macosx-11.0-arm64` (default: this machine)
        platform: Option<String>,

        /// Use the static variant (`-static` on Windows)
        #[arg(long = "static", conflicts_with_all = ["static_md", "default"])]
        static_variant: bool,

        /// Use the static-library, dynamic-runtime variant (`-static-md` on Windows)
        #[arg(long, conflicts_with = "default")]
        static_md: bool,

        /// Print the triplet used when VCPKG_DEFAULT_TRIPLET is unset
        #[arg(long)]
        default: bool,
    },

    /// Clone or update vcpkg at a pinned revision and bootstrap it
    Bootstrap {
        /// Directory the vcpkg root is placed in
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Pin to this revision
        #[arg(long, conflicts_with = "manifest")]
        revision: Option<String>,

        /// Read the pinned revision from this manifest's builtin-baseline
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Run `vcpkg install` for a manifest
    Install {
        /// Directory containing vcpkg.json
        #[arg(long, default_value = ".")]
        source_dir: PathBuf,

        /// Install root
        #[arg(long)]
        install_dir: Option<PathBuf>,

        /// Target triplet
        #[arg(long, env = "VCPKG_DEFAULT_TRIPLET")]
        triplet: Option<String>,

        #[command(flatten)]
        root: RootArgs,

        /// Extra vcpkg option as KEY=VALUE, passed as --KEY VALUE
        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },

    /// Install for arm64 and x64 and merge into a universal2 tree
    Universal {
        /// Directory containing vcpkg.json
        #[arg(long, default_value = ".")]
        source_dir: PathBuf,

        /// Install root; replaced wholesale
        #[arg(long)]
        install_dir: PathBuf,

        /// arm64 triplet
        #[arg(long, default_value = "arm64-osx")]
        arm64_triplet: crate::core::triplet::Triplet,

        /// x64 triplet
        #[arg(long, default_value = "x64-osx")]
        x64_triplet: crate::core::triplet::Triplet,

        /// Merge tool (default: lipo)
        #[arg(long)]
        tool: Option<PathBuf>,

        #[command(flatten)]
        root: RootArgs,

        /// Extra vcpkg option as KEY=VALUE, passed as --KEY VALUE
        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },

    /// Merge two install trees into a universal tree
    Merge {
        /// Tree supplying layout and non-library files
        primary: PathBuf,

        /// Tree supplying the second architecture
        secondary: PathBuf,

        /// Output tree; must not exist
        destination: PathBuf,

        /// Merge tool (default: lipo)
        #[arg(long)]
        tool: Option<PathBuf>,
    },

    /// Check git, the merge tool and the vcpkg root
    Doctor,
}

/// Where the vcpkg root comes from
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Existing vcpkg root; skips bootstrapping
    #[arg(long, env = "VCPKG_ROOT")]
    pub vcpkg_root: Option<PathBuf>,

    /// Directory vcpkg is bootstrapped into
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Pin to this revision instead of the manifest's builtin-baseline
    #[arg(long)]
    pub revision: Option<String>,
}

/// State shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// File configuration
    pub config: ProvisionConfig,
    /// Platform directories
    pub dirs: ProvisionDirs,
    /// Environment for child processes
    pub env: ToolchainEnv,
}

impl Context {
    /// Load configuration and capture the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let dirs = ProvisionDirs::new();
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let config =
            ProvisionConfig::load(config_path, &cwd, &dirs).map_err(ProvisionError::from)?;

        Ok(Self {
            config,
            dirs,
            env: ToolchainEnv::from_process_env(),
        })
    }

    /// Build directory from a flag, else the cache default
    pub fn build_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map_or_else(|| self.dirs.build_dir(), Path::to_path_buf)
    }
}

impl Commands {
    /// Execute the command
    pub async fn run(self, ctx: Context) -> Result<()> {
        match self {
            Self::Triplet {
                platform,
                static_variant,
                static_md,
                default,
            } => triplet::execute(platform.as_deref(), static_variant, static_md, default),
            Self::Bootstrap {
                build_dir,
                revision,
                manifest,
            } => bootstrap::execute(ctx, build_dir, revision, manifest).await,
            Self::Install {
                source_dir,
                install_dir,
                triplet,
                root,
                options,
            } => install::execute(ctx, source_dir, install_dir, triplet, root, options).await,
            Self::Universal {
                source_dir,
                install_dir,
                arm64_triplet,
                x64_triplet,
                tool,
                root,
                options,
            } => {
                universal::execute(
                    ctx,
                    universal::Args {
                        source_dir,
                        install_dir,
                        arm64_triplet,
                        x64_triplet,
                        tool,
                        root,
                        options,
                    },
                )
                .await
            }
            Self::Merge {
                primary,
                secondary,
                destination,
                tool,
            } => merge::execute(&ctx, primary, secondary, destination, tool).await,
            Self::Doctor => doctor::execute(&ctx),
        }
    }
}

/// Parse a `KEY=VALUE` pair
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim().trim_start_matches("--");
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Run blocking provisioning work off the async runtime
pub async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("Provisioning task failed to complete")?
}

/// Pinned revision from a flag, else from a manifest's baseline
///
/// A manifest that cannot be read or has no baseline is an error.
pub fn pinned_revision(flag: Option<String>, manifest: Option<&Path>) -> Result<Option<String>> {
    if flag.is_some() {
        return Ok(flag);
    }
    let Some(manifest) = manifest else {
        return Ok(None);
    };
    let revision = read_pinned_revision(manifest).map_err(ProvisionError::from)?;
    Ok(Some(revision))
}

/// The vcpkg root for an install, bootstrapping when none is preset
///
/// Updates `ctx.env` so children see the root.
pub fn prepare_root(ctx: &mut Context, args: RootArgs, source_dir: &Path) -> Result<PathBuf> {
    if let Some(root) = args.vcpkg_root {
        ctx.env.set_root(root);
    }
    // A preset root is used as is, so only a bootstrap needs the pin
    let revision = if ctx.env.root().is_some() {
        None
    } else {
        let manifest = source_dir.join(MANIFEST_FILE);
        pinned_revision(args.revision, manifest.is_file().then_some(manifest.as_path()))?
    };
    let build_dir = ctx.build_dir(args.build_dir.as_deref());

    let root = resolve_root(
        &mut ctx.env,
        ctx.config.bootstrap_options(),
        &build_dir,
        revision.as_deref(),
    )
    .map_err(ProvisionError::from)?;
    fill_default_triplet(&mut ctx.env, &host_platform());
    Ok(root)
}
