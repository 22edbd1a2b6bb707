//! CLI command for `vcpkg-provision doctor`

use anyhow::{bail, Result};

use crate::cli::commands::Context;
use crate::cli::output::{is_json, print_detail, print_json, print_success, print_warning, status};
use crate::core::doctor::{run_doctor, Finding};

/// Execute the doctor command
///
/// Fails when a required check fails.
pub fn execute(ctx: &Context) -> Result<()> {
    let report = run_doctor(&ctx.env, &ctx.config);
    let blockers: Vec<&str> = report.blockers().map(|c| c.subject.as_str()).collect();

    if is_json() {
        print_json(&serde_json::json!({
            "status": if blockers.is_empty() { "success" } else { "error" },
            "checks": report.checks,
            "config_issues": report.config_issues,
        }));
    } else {
        for check in &report.checks {
            let optional = if check.required { "" } else { " [optional]" };
            match &check.finding {
                Finding::Usable { detail } => {
                    let detail = detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default();
                    print_detail(&format!(
                        "{} {}{detail}{optional}",
                        status::SUCCESS,
                        check.subject
                    ));
                }
                Finding::Unusable { problem, remedy } => {
                    print_detail(&format!("{} {}{optional}: {problem}", status::ERROR, check.subject));
                    print_detail(&format!("  {remedy}"));
                }
            }
        }
        for issue in &report.config_issues {
            print_warning(issue);
        }
        if report.is_clean() {
            print_success("Ready to provision vcpkg");
        }
    }

    if !blockers.is_empty() {
        bail!("Required checks failed: {}", blockers.join(", "));
    }
    Ok(())
}
