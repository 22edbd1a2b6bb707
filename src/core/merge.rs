//! Universal binary merge
//!
//! Mirrors a primary install tree into a new destination, replacing each
//! static library with a fat binary built from the primary library and its
//! counterpart in the secondary tree.

use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::config::defaults::{DEFAULT_MERGE_TOOL, STATIC_LIBRARY_EXTENSIONS};
use crate::error::MergeError;
use crate::infra::filesystem;
use crate::infra::process::{self, ProcessError};

/// One merge: `primary` + `secondary` into `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTask {
    /// Tree whose layout and non-library files are reproduced
    pub primary: PathBuf,
    /// Tree supplying the second architecture of each library
    pub secondary: PathBuf,
    /// Output tree; must not exist yet
    pub destination: PathBuf,
}

impl MergeTask {
    /// Describe a merge
    pub fn new(
        primary: impl Into<PathBuf>,
        secondary: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            destination: destination.into(),
        }
    }
}

/// External tool combining two single-architecture libraries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTool {
    program: PathBuf,
}

impl Default for MergeTool {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_TOOL)
    }
}

impl MergeTool {
    /// Use `program` as the merge tool
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The tool's program path or name
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `<tool> -create <first> <second> -output <output>`
    pub fn merge(&self, first: &Path, second: &Path, output: &Path) -> Result<(), ProcessError> {
        process::run(
            Command::new(&self.program)
                .arg("-create")
                .arg(first)
                .arg(second)
                .arg("-output")
                .arg(output),
        )?;
        Ok(())
    }
}

/// Outcome of a merge, as paths relative to the trees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Files copied unchanged
    pub copied: Vec<PathBuf>,
    /// Libraries merged from both trees
    pub merged: Vec<PathBuf>,
    /// Libraries without a counterpart, left out of the destination
    pub skipped: Vec<PathBuf>,
}

/// Whether a file is a static library that needs merging
pub fn is_static_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| STATIC_LIBRARY_EXTENSIONS.contains(&ext))
}

/// Build the destination tree of `task`
pub fn merge_trees(task: &MergeTask, tool: &MergeTool) -> Result<MergeReport, MergeError> {
    if !task.primary.is_dir() {
        return Err(MergeError::MissingSource {
            path: task.primary.clone(),
        });
    }
    if task.destination.exists() {
        return Err(MergeError::DestinationExists {
            path: task.destination.clone(),
        });
    }

    tracing::info!(
        "Merging {} and {} into {}",
        task.primary.display(),
        task.secondary.display(),
        task.destination.display()
    );

    let mut report = MergeReport::default();
    for entry in WalkDir::new(&task.primary).follow_links(true) {
        let entry = entry.map_err(|e| MergeError::Walk {
            path: task.primary.clone(),
            error: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(&task.primary)
            .map_err(|e| MergeError::Walk {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?
            .to_path_buf();
        let target = task.destination.join(&relative);

        if entry.file_type().is_dir() {
            filesystem::create_dir_all(&target)?;
        } else if is_static_library(entry.path()) {
            let counterpart = task.secondary.join(&relative);
            if !counterpart.is_file() {
                tracing::warn!(
                    "No counterpart for {} in {}, skipping",
                    relative.display(),
                    task.secondary.display()
                );
                report.skipped.push(relative);
                continue;
            }
            tool.merge(entry.path(), &counterpart, &target)
                .map_err(|source| MergeError::Tool {
                    file: relative.clone(),
                    source,
                })?;
            tracing::debug!("Merged {}", relative.display());
            report.merged.push(relative);
        } else {
            filesystem::copy_file(entry.path(), &target)?;
            report.copied.push(relative);
        }
    }

    tracing::info!(
        "Merge complete: {} merged, {} copied, {} skipped",
        report.merged.len(),
        report.copied.len(),
        report.skipped.len()
    );
    Ok(report)
}
