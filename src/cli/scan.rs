//! Scan command implementation.
//!
//! Lists what a map references without touching the mod directory.

use std::path::PathBuf;

use clap::Args;

use crate::error::{PackError, Result};
use crate::extract::{extract_file, References};
use crate::output::{display_path, plural, Printer};

/// List the textures and skybox a map references
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// The source .map file
    #[arg(required = true)]
    pub map: PathBuf,

    /// Print JSON instead of a plain listing
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ScanArgs, printer: &Printer) -> Result<()> {
    printer.status("Scanning", &display_path(&args.map));
    let references = extract_file(&args.map)?;

    let listing = if args.json {
        render_json(&references)?
    } else {
        render_listing(&references)
    };
    print!("{}", listing);

    printer.info(
        "Found",
        &plural(references.textures.len(), "texture", "textures"),
    );
    Ok(())
}

/// One line per reference: `sky <name>` first, then `texture <id>` sorted.
pub fn render_listing(references: &References) -> String {
    let mut out = String::new();
    if let Some(sky) = references.skybox_name() {
        out.push_str(&format!("sky {}\n", sky));
    }
    for texture in &references.textures {
        out.push_str(&format!("texture {}\n", texture));
    }
    out
}

pub fn render_json(references: &References) -> Result<String> {
    let mut json = serde_json::to_string_pretty(references).map_err(|e| PackError::Config {
        message: format!("Failed to serialize references: {}", e),
        help: None,
    })?;
    json.push('\n');
    Ok(json)
}
