//! CLI command for `vcpkg-provision universal`

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::commands::{blocking, prepare_root, Context, RootArgs};
use crate::cli::output::{create_spinner, is_json, print_json, print_success};
use crate::core::merge::MergeTool;
use crate::core::triplet::Triplet;
use crate::core::universal::UniversalInstall;
use crate::error::ProvisionError;

/// Arguments of the universal command
#[derive(Debug)]
pub struct Args {
    pub source_dir: PathBuf,
    pub install_dir: PathBuf,
    pub arm64_triplet: Triplet,
    pub x64_triplet: Triplet,
    pub tool: Option<PathBuf>,
    pub root: RootArgs,
    pub options: Vec<(String, String)>,
}

/// Execute the universal command
pub async fn execute(mut ctx: Context, args: Args) -> Result<()> {
    let install_dir = args.install_dir.clone();
    let spinner = create_spinner("Installing arm64 and x64 and merging...");
    let result = blocking(move || {
        let root = prepare_root(&mut ctx, args.root, &args.source_dir)?;
        let tool = args
            .tool
            .map_or_else(|| ctx.config.merge_tool(), MergeTool::new);

        let install = args.options.into_iter().fold(
            UniversalInstall::new(&args.source_dir, root, &args.install_dir, args.arm64_triplet.os)
                .triplets(args.arm64_triplet, args.x64_triplet)
                .merge_tool(tool),
            |install, (key, value)| install.option(key, value),
        );
        let universal = install.run(&ctx.env).map_err(ProvisionError::from)?;
        Ok(universal)
    })
    .await;
    spinner.finish_and_clear();
    let universal = result?;

    if is_json() {
        print_json(&serde_json::json!({
            "status": "success",
            "triplet": universal,
            "installed_tree": install_dir.join(&universal),
        }));
    } else {
        print_success(&format!(
            "Universal tree at {}",
            install_dir.join(&universal).display()
        ));
        println!("{universal}");
    }
    Ok(())
}
