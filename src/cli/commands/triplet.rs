//! CLI command for `vcpkg-provision triplet`

use anyhow::Result;

use crate::cli::output::{is_json, print_json};
use crate::core::triplet::{default_triplet, host_platform, resolve, Triplet};
use crate::error::ProvisionError;

/// Execute the triplet command
pub fn execute(
    platform: Option<&str>,
    static_variant: bool,
    static_md: bool,
    default: bool,
) -> Result<()> {
    let triplet = match (platform, default) {
        (Some(platform), true) => default_triplet(platform),
        (Some(platform), false) => resolve(platform),
        (None, true) => default_triplet(&host_platform()),
        (None, false) => Triplet::host(),
    }
    .map_err(ProvisionError::from)?;

    let triplet = if static_variant {
        triplet.to_static_variant()
    } else if static_md {
        triplet.to_static_dynamic_variant()
    } else {
        triplet
    };

    if is_json() {
        print_json(&serde_json::json!({
            "triplet": triplet.to_string(),
            "arch": triplet.arch.to_string(),
            "os": triplet.os.to_string(),
        }));
    } else {
        // Plain output so build scripts can capture it
        println!("{triplet}");
    }
    Ok(())
}
