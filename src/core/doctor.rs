//! Environment checks
//!
//! Reports which source-control backend would be used, whether the merge
//! tool is present and whether a preset dependency root looks usable.

use serde::Serialize;
use std::path::Path;
use std::process::Command;

use crate::core::config::ProvisionConfig;
use crate::core::env::ToolchainEnv;
use crate::core::install::VCPKG_EXECUTABLE;
use crate::core::merge::MergeTool;
use crate::infra::git::{library_backend_compiled, locate_git_cli, probe_backend, BackendKind};

/// What a single check found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Finding {
    /// Usable, with an optional detail such as a version or path
    Usable { detail: Option<String> },
    /// Not usable
    Unusable { problem: String, remedy: String },
}

/// One line of the doctor output
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// What was checked
    pub subject: String,
    /// Whether provisioning fails without it
    pub required: bool,
    #[serde(flatten)]
    pub finding: Finding,
}

impl Check {
    fn usable(subject: impl Into<String>, required: bool, detail: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            required,
            finding: Finding::Usable { detail },
        }
    }

    fn unusable(
        subject: impl Into<String>,
        required: bool,
        problem: impl Into<String>,
        remedy: &str,
    ) -> Self {
        Self {
            subject: subject.into(),
            required,
            finding: Finding::Unusable {
                problem: problem.into(),
                remedy: remedy.to_string(),
            },
        }
    }

    /// Whether the check found what it looked for
    pub fn is_usable(&self) -> bool {
        matches!(self.finding, Finding::Usable { .. })
    }
}

/// Everything `doctor` found
#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
    /// Problems in the configuration file
    pub config_issues: Vec<String>,
}

impl DoctorReport {
    /// Required checks that failed
    pub fn blockers(&self) -> impl Iterator<Item = &Check> {
        self.checks
            .iter()
            .filter(|check| check.required && !check.is_usable())
    }

    /// No failed check and no config issue
    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(Check::is_usable) && self.config_issues.is_empty()
    }
}

/// Version number in `git --version` style output
fn parse_version(output: &str) -> Option<String> {
    let pattern = regex::Regex::new(r"(\d+\.\d+(?:\.\d+)?)").ok()?;
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn git_version(git: &Path) -> Option<String> {
    let output = Command::new(git).arg("--version").output().ok()?;
    parse_version(&String::from_utf8_lossy(&output.stdout))
}

/// Backend a bootstrap would use
pub fn check_backend(env: &ToolchainEnv) -> Check {
    const SUBJECT: &str = "Source control";
    let git = locate_git_cli();

    match probe_backend(library_backend_compiled(), env.force_cli_git(), git.is_some()) {
        Some(BackendKind::Cli) => {
            let detail = match git.as_deref().and_then(git_version) {
                Some(version) => format!("git {version}"),
                None => BackendKind::Cli.to_string(),
            };
            Check::usable(SUBJECT, true, Some(detail))
        }
        Some(kind) => Check::usable(SUBJECT, true, Some(kind.to_string())),
        None => Check::unusable(
            SUBJECT,
            true,
            "No usable git backend",
            "Install git, or unset INSTALL_VCPKG_USE_CLI_GIT",
        ),
    }
}

/// Merge tool; only required on macOS, where universal trees are built
pub fn check_merge_tool(tool: &MergeTool) -> Check {
    let subject = format!("Merge tool ({})", tool.program().display());
    let required = cfg!(target_os = "macos");

    match which::which(tool.program()) {
        Ok(path) => Check::usable(subject, required, Some(path.display().to_string())),
        Err(_) => Check::unusable(
            subject,
            required,
            "not found in PATH",
            "Install the Xcode command line tools (xcode-select --install)",
        ),
    }
}

/// A dependency root named by `VCPKG_ROOT`, if any
pub fn check_root(env: &ToolchainEnv) -> Option<Check> {
    const SUBJECT: &str = "VCPKG_ROOT";
    let root = env.root()?;

    let check = if !root.is_dir() {
        Check::unusable(
            SUBJECT,
            true,
            format!("'{}' is not a directory", root.display()),
            "Unset VCPKG_ROOT to let vcpkg be bootstrapped",
        )
    } else if !root.join(VCPKG_EXECUTABLE).is_file() {
        Check::unusable(
            SUBJECT,
            true,
            format!("no {VCPKG_EXECUTABLE} in '{}'", root.display()),
            "Run the bootstrap script in the vcpkg root",
        )
    } else {
        Check::usable(SUBJECT, true, Some(root.display().to_string()))
    };
    Some(check)
}

/// Run every check
pub fn run_doctor(env: &ToolchainEnv, config: &ProvisionConfig) -> DoctorReport {
    let mut report = DoctorReport::default();

    report.checks.push(check_backend(env));
    report.checks.push(check_merge_tool(&config.merge_tool()));
    report.checks.extend(check_root(env));

    if config
        .vcpkg
        .remote_url
        .as_deref()
        .is_some_and(|url| url.trim().is_empty())
    {
        report
            .config_issues
            .push("[vcpkg] remote_url is empty".to_string());
    }

    report
}
