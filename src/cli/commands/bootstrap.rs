//! CLI command for `vcpkg-provision bootstrap`

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::{blocking, pinned_revision, Context};
use crate::cli::output::{create_spinner, is_json, print_json, print_success};
use crate::core::bootstrap::Bootstrapper;
use crate::error::ProvisionError;

/// Execute the bootstrap command
pub async fn execute(
    ctx: Context,
    build_dir: Option<PathBuf>,
    revision: Option<String>,
    manifest: Option<PathBuf>,
) -> Result<()> {
    let revision = pinned_revision(revision, manifest.as_deref())?;
    let build_dir = ctx.build_dir(build_dir.as_deref());

    let spinner = create_spinner("Provisioning vcpkg...");
    let result = blocking(move || {
        let mut bootstrapper = Bootstrapper::new(ctx.env, ctx.config.bootstrap_options())
            .map_err(ProvisionError::from)?;
        let backend = bootstrapper.backend().kind();
        let provisioned = bootstrapper
            .provision(&build_dir, revision.as_deref())
            .map_err(ProvisionError::from)?;
        Ok((provisioned, backend))
    })
    .await;
    spinner.finish_and_clear();
    let (provisioned, backend) = result?;
    let root = &provisioned.root;

    if is_json() {
        print_json(&serde_json::json!({
            "status": "success",
            "root": root.path,
            "action": provisioned.action.to_string(),
            "revision": root.pinned_revision,
            "remote": root.remote_url,
            "backend": backend.to_string(),
        }));
    } else {
        print_success(&format!(
            "vcpkg {} at {} ({backend})",
            provisioned.action,
            root.path.display()
        ));
        println!("{}", root.path.display());
    }
    Ok(())
}
