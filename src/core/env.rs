//! Toolchain environment
//!
//! vcpkg is configured through environment variables. Rather than mutating
//! the process environment, the values are captured once at startup into a
//! [`ToolchainEnv`] which is threaded through the orchestrator and the
//! install invoker and applied to every child process they spawn.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults::env as vars;

/// Environment handed to vcpkg, git and the bootstrap script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainEnv {
    disable_metrics: bool,
    root: Option<PathBuf>,
    default_triplet: Option<String>,
    force_cli_git: bool,
}

impl ToolchainEnv {
    /// Capture the relevant variables from the process environment
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Capture the relevant variables through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            disable_metrics: non_empty(vars::DISABLE_METRICS).is_some(),
            root: non_empty(vars::ROOT).map(PathBuf::from),
            default_triplet: non_empty(vars::DEFAULT_TRIPLET)
                .map(|v| v.to_string_lossy().into_owned()),
            force_cli_git: non_empty(vars::USE_CLI_GIT).is_some(),
        }
    }

    /// Whether telemetry is disabled for child processes
    pub fn metrics_disabled(&self) -> bool {
        self.disable_metrics
    }

    /// Disable vcpkg telemetry for every child process
    pub fn disable_metrics(&mut self) {
        self.disable_metrics = true;
    }

    /// Dependency root, if one is known
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Record the dependency root
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = Some(root.into());
    }

    /// Triplet vcpkg falls back to without `--triplet`
    pub fn default_triplet(&self) -> Option<&str> {
        self.default_triplet.as_deref()
    }

    /// Record the default triplet
    pub fn set_default_triplet(&mut self, triplet: impl Into<String>) {
        self.default_triplet = Some(triplet.into());
    }

    /// Whether the git CLI backend was requested over the library
    pub fn force_cli_git(&self) -> bool {
        self.force_cli_git
    }

    /// Builder-style override of the CLI backend opt-out
    #[must_use]
    pub fn with_force_cli_git(mut self, force: bool) -> Self {
        self.force_cli_git = force;
        self
    }

    /// Variables exported to child processes
    pub fn vars(&self) -> Vec<(&'static str, OsString)> {
        let mut env = Vec::new();
        if self.disable_metrics {
            env.push((vars::DISABLE_METRICS, OsString::from("true")));
        }
        if let Some(root) = &self.root {
            env.push((vars::ROOT, root.clone().into_os_string()));
        }
        if let Some(triplet) = &self.default_triplet {
            env.push((vars::DEFAULT_TRIPLET, OsString::from(triplet)));
        }
        env
    }

    /// Export the variables to a child process
    pub fn apply(&self, cmd: &mut Command) {
        cmd.envs(self.vars());
    }
}
