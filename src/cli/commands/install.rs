//! CLI command for `vcpkg-provision install`

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::{blocking, prepare_root, Context, RootArgs};
use crate::cli::output::{create_spinner, is_json, print_json, print_success};
use crate::core::install::{install_manifest, InstallRequest};
use crate::error::ProvisionError;

/// Execute the install command
pub async fn execute(
    mut ctx: Context,
    source_dir: PathBuf,
    install_dir: Option<PathBuf>,
    triplet: Option<String>,
    root: RootArgs,
    options: Vec<(String, String)>,
) -> Result<()> {
    let spinner = create_spinner("Installing vcpkg manifest...");
    let result = blocking(move || {
        let root = prepare_root(&mut ctx, root, &source_dir)?;

        let request = InstallRequest {
            source_dir,
            install_dir,
            triplet,
            root,
            extra_options: options,
        };
        install_manifest(&request, &ctx.env).map_err(ProvisionError::from)?;
        Ok(request)
    })
    .await;
    spinner.finish_and_clear();
    let request = result?;

    let tree = request.installed_tree();
    if is_json() {
        print_json(&serde_json::json!({
            "status": "success",
            "root": request.root,
            "triplet": request.triplet,
            "installed_tree": tree,
        }));
    } else {
        match tree {
            Some(tree) => print_success(&format!("Installed into {}", tree.display())),
            None => print_success("Installed vcpkg manifest"),
        }
    }
    Ok(())
}
