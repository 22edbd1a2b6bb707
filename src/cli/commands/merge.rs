//! CLI command for `vcpkg-provision merge`

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::{blocking, Context};
use crate::cli::output::{is_json, print_detail, print_json, print_success, print_warning};
use crate::core::merge::{merge_trees, MergeTask, MergeTool};
use crate::error::ProvisionError;

/// Execute the merge command
pub async fn execute(
    ctx: &Context,
    primary: PathBuf,
    secondary: PathBuf,
    destination: PathBuf,
    tool: Option<PathBuf>,
) -> Result<()> {
    let tool = tool.map_or_else(|| ctx.config.merge_tool(), MergeTool::new);
    let task = MergeTask::new(primary, secondary, destination);

    let report = blocking(move || {
        merge_trees(&task, &tool)
            .map_err(ProvisionError::from)
            .map_err(Into::into)
    })
    .await?;

    if is_json() {
        print_json(&serde_json::json!({
            "status": "success",
            "merged": report.merged,
            "copied": report.copied,
            "skipped": report.skipped,
        }));
        return Ok(());
    }

    print_success(&format!(
        "Merged {} libraries, copied {} files",
        report.merged.len(),
        report.copied.len()
    ));
    if !report.skipped.is_empty() {
        print_warning(&format!(
            "{} libraries had no counterpart and were left out:",
            report.skipped.len()
        ));
        for path in &report.skipped {
            print_detail(&path.display().to_string());
        }
    }
    Ok(())
}
