//! Version command implementation.

use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionOutput {
    version: &'static str,
    build: &'static str,
    schema_version: i32,
}

fn version_info() -> VersionOutput {
    VersionOutput {
        version: env!("CARGO_PKG_VERSION"),
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
        schema_version: CURRENT_SCHEMA_VERSION,
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let info = version_info();

    if json {
        println!("{}", serde_json::to_string(&info)?);
        return Ok(());
    }

    println!(
        "macrum {} ({}, schema v{})",
        info.version, info.build, info.schema_version
    );
    Ok(())
}
