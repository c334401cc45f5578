//! Project manifest (mappack.yaml) parsing.
//!
//! The manifest holds per-project packing defaults so that repeated runs
//! only need the map and output paths on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

use super::{Compression, ConversionFlags, FormatFlags};

/// Project manifest loaded from mappack.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Mod root directory. Relative paths are resolved against the
    /// manifest's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moddir: Option<PathBuf>,

    /// Pack the source `.map` alongside the bsp.
    pub include_map: bool,

    /// Texture formats to pack.
    pub formats: FormatFlags,

    /// Conversions to apply.
    pub conversions: ConversionFlags,

    /// Entry compression.
    pub compression: Compression,
}

impl Manifest {
    /// Load manifest from a mappack.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        let mut manifest = Self::parse(&content)?;

        if let (Some(moddir), Some(base)) = (&manifest.moddir, path.parent()) {
            if moddir.is_relative() {
                manifest.moddir = Some(base.join(moddir));
            }
        }

        Ok(manifest)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| PackError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check mappack.yaml syntax".to_string()),
        })
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| PackError::Config {
            message: format!("Failed to serialize manifest: {}", e),
            help: None,
        })
    }
}
