//! Pack command implementation.
//!
//! Builds a `PackConfig` from flags layered over `mappack.yaml` and runs
//! the packing pipeline.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{Compression, Manifest, PackConfig, MANIFEST_FILENAME};
use crate::error::{PackError, Result};
use crate::output::Printer;
use crate::pack::{PackReport, Packer};

/// Pack a map, its bsp and referenced assets into an archive
#[derive(Args, Debug, Default)]
pub struct PackArgs {
    /// The source .map file
    #[arg(long)]
    pub map: PathBuf,

    /// The compiled .bsp file
    #[arg(long)]
    pub bsp: Option<PathBuf>,

    /// Mod directory containing env/ and textures/ (baseq2, action, ...)
    #[arg(long)]
    pub moddir: Option<PathBuf>,

    /// Output archive, e.g. mapname.pkz (default: <map name>.pkz)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Manifest with default options (default: ./mappack.yaml if present)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Pack the original .map file
    #[arg(long, short = 'm')]
    pub include_map: bool,

    /// Don't pack .wal textures
    #[arg(long)]
    pub no_wal: bool,

    /// Pack .jpg textures and skybox faces
    #[arg(long, short = 'j')]
    pub jpg: bool,

    /// Pack .png textures
    #[arg(long, short = 'p')]
    pub png: bool,

    /// Pack .tga textures and skybox faces
    #[arg(long, short = 't')]
    pub tga: bool,

    /// Convert .png textures to .jpg
    #[arg(long)]
    pub convert_png: bool,

    /// Convert .tga textures to .png
    #[arg(long)]
    pub convert_tga: bool,

    /// Store entries without deflate compression
    #[arg(long)]
    pub no_compress: bool,
}

pub fn run(args: PackArgs, printer: &Printer) -> Result<PackReport> {
    let manifest = load_manifest(args.manifest.as_deref())?;
    let config = build_config(args, manifest)?;

    Packer::new(&config).run(printer)
}

/// Load the explicit manifest, or `./mappack.yaml` if it exists.
fn load_manifest(path: Option<&Path>) -> Result<Manifest> {
    match path {
        Some(path) => Manifest::load(path),
        None => {
            let default = Path::new(MANIFEST_FILENAME);
            if default.is_file() {
                Manifest::load(default)
            } else {
                Ok(Manifest::default())
            }
        }
    }
}

/// Layer command-line flags over manifest defaults. Flags can only turn
/// options on, except the `--no-*` flags which turn them off.
pub fn build_config(args: PackArgs, manifest: Manifest) -> Result<PackConfig> {
    let moddir = args
        .moddir
        .or(manifest.moddir)
        .ok_or_else(|| PackError::Config {
            message: "No mod directory given".to_string(),
            help: Some(format!(
                "Pass --moddir (e.g. --moddir baseq2) or set moddir in {}",
                MANIFEST_FILENAME
            )),
        })?;

    let output = match args.output {
        Some(output) => output,
        None => PathBuf::from(format!("{}.pkz", crate::config::map_stem(&args.map))),
    };

    let mut config = PackConfig::new(args.map, moddir, output);
    config.bsp = args.bsp;
    config.include_map = manifest.include_map || args.include_map;

    config.formats = manifest.formats;
    config.formats.wal &= !args.no_wal;
    config.formats.jpg |= args.jpg;
    config.formats.png |= args.png;
    config.formats.tga |= args.tga;

    config.conversions = manifest.conversions;
    config.conversions.png_to_jpg |= args.convert_png;
    config.conversions.tga_to_png |= args.convert_tga;

    config.compression = if args.no_compress {
        Compression::Stored
    } else {
        manifest.compression
    };

    tracing::debug!(?config, "pack configuration");
    Ok(config)
}
