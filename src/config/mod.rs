//! Packing configuration.
//!
//! `PackConfig` is the immutable input to a packing run. It is built once,
//! from CLI flags layered over an optional `mappack.yaml` manifest, and
//! passed by reference to every stage.

mod manifest;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use manifest::Manifest;

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "mappack.yaml";

/// Texture formats that may be packed. `wal` is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatFlags {
    pub wal: bool,
    pub jpg: bool,
    pub png: bool,
    pub tga: bool,
}

impl Default for FormatFlags {
    fn default() -> Self {
        Self {
            wal: true,
            jpg: false,
            png: false,
            tga: false,
        }
    }
}

impl FormatFlags {
    /// Number of enabled texture formats.
    pub fn enabled_count(&self) -> usize {
        [self.wal, self.jpg, self.png, self.tga]
            .iter()
            .filter(|&&on| on)
            .count()
    }

    /// Enable a format by extension name. Returns false for unknown names.
    pub fn enable(&mut self, extension: &str) -> bool {
        match extension.to_ascii_lowercase().as_str() {
            "wal" => self.wal = true,
            "jpg" | "jpeg" => self.jpg = true,
            "png" => self.png = true,
            "tga" => self.tga = true,
            _ => return false,
        }
        true
    }
}

/// Image conversions applied while packing textures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionFlags {
    /// Re-encode `.png` textures as `.jpg` (alpha dropped).
    pub png_to_jpg: bool,
    /// Re-encode `.tga` textures as `.png` (alpha kept).
    pub tga_to_png: bool,
}

/// Compression policy for every archive entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl Compression {
    pub fn from_enabled(compress: bool) -> Self {
        if compress {
            Compression::Deflated
        } else {
            Compression::Stored
        }
    }
}

/// Immutable input to a packing run.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Source `.map` file.
    pub map: PathBuf,
    /// Compiled `.bsp`, packed under `maps/` when given.
    pub bsp: Option<PathBuf>,
    /// Mod root (e.g. `baseq2`) containing `env/` and `textures/`.
    pub moddir: PathBuf,
    /// Output archive path (`.pkz` or `.zip`).
    pub output: PathBuf,
    /// Pack the source `.map` under `maps/`.
    pub include_map: bool,
    pub formats: FormatFlags,
    pub conversions: ConversionFlags,
    pub compression: Compression,
}

impl PackConfig {
    /// Create a config with default flags.
    pub fn new(
        map: impl Into<PathBuf>,
        moddir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            map: map.into(),
            bsp: None,
            moddir: moddir.into(),
            output: output.into(),
            include_map: false,
            formats: FormatFlags::default(),
            conversions: ConversionFlags::default(),
            compression: Compression::default(),
        }
    }

    /// Map base name: the file name up to its first `.`.
    pub fn map_stem(&self) -> String {
        map_stem(&self.map)
    }
}

/// File name of `path` up to its first `.` (`base1.final.map` -> `base1`).
pub fn map_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}
