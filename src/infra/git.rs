//! Git operations
//!
//! Source-control backends used to materialize the dependency root. The
//! in-process backend is built on the gix crate; the CLI backend drives the
//! `git` executable. One of them is chosen once at startup by
//! [`select_backend`] and used for every operation afterwards.

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[cfg(feature = "gix")]
use crate::config::defaults::REMOTE_NAME;
use crate::core::env::ToolchainEnv;
use crate::infra::process::{self, ProcessError};

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Neither backend is usable
    #[error("{reason}")]
    NoBackend { reason: String },

    /// Failed to initialize a repository
    #[error("Failed to initialize repository at '{path}': {error}")]
    InitFailed { path: PathBuf, error: String },

    /// Failed to clone repository
    #[error("Failed to clone '{url}': {error}")]
    CloneFailed { url: String, error: String },

    /// Failed to fetch a ref
    #[error("Failed to fetch '{reference}' into '{repo}': {error}")]
    FetchFailed {
        repo: PathBuf,
        reference: String,
        error: String,
    },

    /// Failed to checkout ref
    #[error("Failed to checkout ref '{reference}' in '{repo}': {error}")]
    CheckoutFailed {
        repo: PathBuf,
        reference: String,
        error: String,
    },

    /// Invalid repository
    #[error("Invalid repository at '{path}': {error}")]
    InvalidRepository { path: PathBuf, error: String },

    /// Repository lacks its remote configuration
    #[error("Repository at '{path}' has no '{remote}' remote")]
    MissingRemote { path: PathBuf, remote: String },

    /// A git subprocess failed
    #[error(transparent)]
    CommandFailed(#[from] ProcessError),

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Available backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process gix library
    Library,
    /// External `git` executable
    Cli,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library => write!(f, "gix (in-process)"),
            Self::Cli => write!(f, "git CLI"),
        }
    }
}

/// Whether the in-process backend was compiled in
pub const fn library_backend_compiled() -> bool {
    cfg!(feature = "gix")
}

/// Decide which backend to use from what is available
///
/// The library wins unless it is missing or explicitly opted out of; the
/// CLI is the only fallback.
pub fn probe_backend(
    library_compiled: bool,
    force_cli: bool,
    cli_available: bool,
) -> Option<BackendKind> {
    if library_compiled && !force_cli {
        Some(BackendKind::Library)
    } else if cli_available {
        Some(BackendKind::Cli)
    } else {
        None
    }
}

/// Locate a working `git` executable on PATH
pub fn locate_git_cli() -> Option<PathBuf> {
    let git = which::which("git").ok()?;
    let works = Command::new(&git)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    works.then_some(git)
}

/// Select the backend for this process
pub fn select_backend(env: &ToolchainEnv) -> Result<Box<dyn SourceControl>, GitError> {
    let compiled = library_backend_compiled();
    let git = if compiled && !env.force_cli_git() {
        None
    } else {
        locate_git_cli()
    };

    match (probe_backend(compiled, env.force_cli_git(), git.is_some()), git) {
        #[cfg(feature = "gix")]
        (Some(BackendKind::Library), _) => {
            tracing::debug!("Using {} backend", BackendKind::Library);
            Ok(Box::new(LibraryBackend))
        }
        (Some(BackendKind::Cli), Some(git)) => {
            tracing::debug!("Using {} backend at {}", BackendKind::Cli, git.display());
            Ok(Box::new(CliBackend::new(git, env.clone())))
        }
        _ => Err(GitError::NoBackend {
            reason: "git not found, please install git and try again".to_string(),
        }),
    }
}

/// Operations the bootstrap orchestrator needs from source control
pub trait SourceControl: fmt::Debug + Send + Sync {
    /// Which implementation this is
    fn kind(&self) -> BackendKind;

    /// Create an empty repository at `target` with `origin` pointing at `remote_url`
    fn init(&self, target: &Path, remote_url: &str) -> Result<(), GitError>;

    /// Shallow clone of the remote's default branch into `target`
    fn clone_default_branch(
        &self,
        target: &Path,
        remote_url: &str,
        depth: NonZeroU32,
    ) -> Result<(), GitError>;

    /// Shallow fetch of `pinned_revision` (or the remote HEAD) and check it out
    fn fetch_and_checkout(
        &self,
        target: &Path,
        pinned_revision: Option<&str>,
        depth: NonZeroU32,
    ) -> Result<(), GitError>;

    /// Materialize a fresh checkout at `target`
    ///
    /// A pinned revision is fetched exactly; otherwise the default branch
    /// is cloned.
    fn clone_shallow(
        &self,
        target: &Path,
        remote_url: &str,
        depth: NonZeroU32,
        pinned_revision: Option<&str>,
    ) -> Result<(), GitError> {
        match pinned_revision {
            Some(revision) => {
                std::fs::create_dir_all(target).map_err(|e| GitError::IoError {
                    path: target.to_path_buf(),
                    error: e.to_string(),
                })?;
                self.init(target, remote_url)?;
                self.fetch_and_checkout(target, Some(revision), depth)
            }
            None => self.clone_default_branch(target, remote_url, depth),
        }
    }
}

/// Backend spawning the `git` executable
#[derive(Debug, Clone)]
pub struct CliBackend {
    git: PathBuf,
    env: ToolchainEnv,
}

impl CliBackend {
    /// Create a CLI backend using the given executable
    pub fn new(git: PathBuf, env: ToolchainEnv) -> Self {
        Self { git, env }
    }

    /// Path of the git executable
    pub fn git_path(&self) -> &Path {
        &self.git
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(cwd);
        self.env.apply(&mut cmd);
        cmd
    }
}

impl SourceControl for CliBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cli
    }

    fn init(&self, target: &Path, remote_url: &str) -> Result<(), GitError> {
        process::run(self.command(target).arg("init"))?;
        process::run(
            self.command(target)
                .args(["remote", "add", "origin"])
                .arg(remote_url),
        )?;
        Ok(())
    }

    fn clone_default_branch(
        &self,
        target: &Path,
        remote_url: &str,
        depth: NonZeroU32,
    ) -> Result<(), GitError> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| GitError::IoError {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;

        process::run(
            self.command(parent)
                .arg("clone")
                .arg(format!("--depth={depth}"))
                .arg(remote_url)
                .arg(target),
        )
        .map_err(|e| GitError::CloneFailed {
            url: remote_url.to_string(),
            error: e.to_string(),
        })?;
        Ok(())
    }

    fn fetch_and_checkout(
        &self,
        target: &Path,
        pinned_revision: Option<&str>,
        depth: NonZeroU32,
    ) -> Result<(), GitError> {
        // git would otherwise operate on an enclosing repository
        if !target.join(".git").exists() {
            return Err(GitError::InvalidRepository {
                path: target.to_path_buf(),
                error: "not a git checkout".to_string(),
            });
        }

        let mut fetch = self.command(target);
        fetch.arg("fetch").arg(format!("--depth={depth}")).arg("origin");
        if let Some(revision) = pinned_revision {
            fetch.arg(revision);
        }
        process::run(&mut fetch)?;

        process::run(
            self.command(target)
                .args(["-c", "advice.detachedHead=false", "checkout"])
                .arg(pinned_revision.unwrap_or("FETCH_HEAD")),
        )?;
        Ok(())
    }
}

/// Backend using the in-process gix library
#[cfg(feature = "gix")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryBackend;

#[cfg(feature = "gix")]
impl SourceControl for LibraryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Library
    }

    fn init(&self, target: &Path, remote_url: &str) -> Result<(), GitError> {
        let init_failed = |error: String| GitError::InitFailed {
            path: target.to_path_buf(),
            error,
        };

        let repo = gix::init(target).map_err(|e| init_failed(e.to_string()))?;
        let mut remote = repo
            .remote_at(remote_url)
            .map_err(|e| init_failed(e.to_string()))?;

        let config_path = repo.git_dir().join("config");
        let mut config = gix::config::File::from_path_no_includes(
            config_path.clone(),
            gix::config::Source::Local,
        )
        .map_err(|e| init_failed(e.to_string()))?;
        remote
            .save_as_to(REMOTE_NAME, &mut config)
            .map_err(|e| init_failed(e.to_string()))?;

        let mut file =
            std::fs::File::create(&config_path).map_err(|e| init_failed(e.to_string()))?;
        config
            .write_to(&mut file)
            .map_err(|e| init_failed(e.to_string()))?;
        Ok(())
    }

    fn clone_default_branch(
        &self,
        target: &Path,
        remote_url: &str,
        depth: NonZeroU32,
    ) -> Result<(), GitError> {
        use gix::remote::fetch::Shallow;

        let clone_failed = |error: String| GitError::CloneFailed {
            url: remote_url.to_string(),
            error,
        };

        let mut prepare = gix::prepare_clone(remote_url, target)
            .map_err(|e| clone_failed(e.to_string()))?
            .with_shallow(Shallow::DepthAtRemote(depth));

        let (mut checkout, _outcome) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| clone_failed(e.to_string()))?;

        checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| clone_failed(e.to_string()))?;
        Ok(())
    }

    fn fetch_and_checkout(
        &self,
        target: &Path,
        pinned_revision: Option<&str>,
        depth: NonZeroU32,
    ) -> Result<(), GitError> {
        use gix::remote::fetch::Shallow;
        use gix::remote::Direction;

        let reference = pinned_revision.unwrap_or("HEAD");
        let fetch_failed = |error: String| GitError::FetchFailed {
            repo: target.to_path_buf(),
            reference: reference.to_string(),
            error,
        };

        let repo = gix::open(target).map_err(|e| GitError::InvalidRepository {
            path: target.to_path_buf(),
            error: e.to_string(),
        })?;
        if repo.is_bare() {
            return Err(GitError::InvalidRepository {
                path: target.to_path_buf(),
                error: "repository is bare".to_string(),
            });
        }

        let mut remote = repo
            .find_remote(REMOTE_NAME)
            .map_err(|_| GitError::MissingRemote {
                path: target.to_path_buf(),
                remote: REMOTE_NAME.to_string(),
            })?;
        remote
            .replace_refspecs(Some(reference), Direction::Fetch)
            .map_err(|e| fetch_failed(e.to_string()))?;

        let outcome = remote
            .connect(Direction::Fetch)
            .map_err(|e| fetch_failed(e.to_string()))?
            .prepare_fetch(gix::progress::Discard, Default::default())
            .map_err(|e| fetch_failed(e.to_string()))?
            .with_shallow(Shallow::DepthAtRemote(depth))
            .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| fetch_failed(e.to_string()))?;

        // A full object id is used as is; tags and branches resolve through
        // the single refspec's mapping
        let commit_id = match pinned_revision.map(|r| gix::ObjectId::from_hex(r.as_bytes())) {
            Some(Ok(id)) => id,
            _ => outcome
                .ref_map
                .mappings
                .iter()
                .find_map(|mapping| mapping.remote.as_id())
                .map(ToOwned::to_owned)
                .ok_or_else(|| fetch_failed(format!("remote advertised no '{reference}'")))?,
        };

        checkout_commit(&repo, target, commit_id, reference)
    }
}

/// Write the tree of `commit_id` into the worktree and detach HEAD at it
#[cfg(feature = "gix")]
fn checkout_commit(
    repo: &gix::Repository,
    target: &Path,
    commit_id: gix::ObjectId,
    reference: &str,
) -> Result<(), GitError> {
    let checkout_failed = |error: String| GitError::CheckoutFailed {
        repo: target.to_path_buf(),
        reference: reference.to_string(),
        error,
    };

    let workdir = repo
        .work_dir()
        .ok_or_else(|| checkout_failed("repository has no worktree".to_string()))?
        .to_path_buf();

    let commit = repo
        .find_object(commit_id)
        .map_err(|e| checkout_failed(e.to_string()))?
        .peel_to_kind(gix::object::Kind::Commit)
        .map_err(|e| checkout_failed(e.to_string()))?
        .try_into_commit()
        .map_err(|e| checkout_failed(e.to_string()))?;
    let tree_id = commit
        .tree_id()
        .map_err(|e| checkout_failed(e.to_string()))?
        .detach();

    let mut index = repo
        .index_from_tree(&tree_id)
        .map_err(|e| checkout_failed(e.to_string()))?;
    remove_untracked_leftovers(repo, &workdir, &index).map_err(checkout_failed)?;

    let options = gix::worktree::state::checkout::Options {
        destination_is_initially_empty: false,
        overwrite_existing: true,
        ..Default::default()
    };

    let objects = repo
        .objects
        .clone()
        .into_arc()
        .map_err(|e| checkout_failed(e.to_string()))?;
    gix::worktree::state::checkout(
        &mut index,
        workdir,
        objects,
        &gix::progress::Discard,
        &gix::progress::Discard,
        &gix::interrupt::IS_INTERRUPTED,
        options,
    )
    .map_err(|e| checkout_failed(e.to_string()))?;
    index
        .write(Default::default())
        .map_err(|e| checkout_failed(e.to_string()))?;

    // Detached HEAD
    std::fs::write(repo.git_dir().join("HEAD"), format!("{commit_id}\n"))
        .map_err(|e| checkout_failed(e.to_string()))?;
    Ok(())
}

/// Delete worktree files tracked by the current index but absent from `next`
///
/// Empty parent directories left behind are removed as well.
#[cfg(feature = "gix")]
fn remove_untracked_leftovers(
    repo: &gix::Repository,
    workdir: &Path,
    next: &gix::index::File,
) -> Result<(), String> {
    use std::collections::HashSet;

    let previous = repo.index_or_empty().map_err(|e| e.to_string())?;
    let kept: HashSet<&gix::bstr::BStr> = next.entries().iter().map(|e| e.path(next)).collect();

    for entry in previous.entries() {
        let path = entry.path(&previous);
        if kept.contains(path) {
            continue;
        }
        let file = workdir.join(gix::path::from_bstr(path));
        tracing::debug!("Removing {} from the previous checkout", file.display());
        match std::fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(format!("Failed to remove '{}': {e}", file.display())),
        }

        let mut dir = file.parent();
        while let Some(parent) = dir {
            if parent == workdir || std::fs::remove_dir(parent).is_err() {
                break;
            }
            dir = parent.parent();
        }
    }
    Ok(())
}
