//! Init command implementation.
//!
//! Generates a `mappack.yaml` manifest. When a mod directory is given, its
//! `textures/` tree is scanned and every texture format found there is
//! enabled.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::config::{FormatFlags, Manifest, MANIFEST_FILENAME};
use crate::error::{PackError, Result};
use crate::output::{display_path, plural, Printer};
use crate::resolve::TEXTURES_DIR;

/// Initialize a project by generating a mappack.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write the manifest into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Mod directory to record and scan for texture formats
    #[arg(long)]
    pub moddir: Option<PathBuf>,

    /// Overwrite existing mappack.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(PackError::Config {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let mut manifest = Manifest {
        moddir: args.moddir.clone(),
        ..Default::default()
    };

    if let Some(moddir) = &args.moddir {
        let textures = moddir.join(TEXTURES_DIR);
        printer.status("Scanning", &display_path(&textures));

        let counts = count_texture_formats(&textures);
        if !counts.is_empty() {
            manifest.formats = detected_formats(&counts);
            let found: Vec<String> = counts
                .iter()
                .map(|(ext, n)| format!("{} {}", n, ext))
                .collect();
            printer.info("Discovered", &found.join(", "));
        }
    }

    let yaml = manifest.to_yaml()?;
    fs::write(&manifest_path, &yaml).map_err(|e| PackError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    printer.status(
        "Created",
        &format!(
            "{} ({} enabled)",
            display_path(&manifest_path),
            plural(manifest.formats.enabled_count(), "format", "formats")
        ),
    );

    Ok(())
}

/// Count files per known texture extension under `root`.
pub fn count_texture_formats(root: &Path) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    if !root.exists() {
        return counts;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if matches!(ext.as_str(), "wal" | "jpg" | "png" | "tga") {
            *counts.entry(ext).or_insert(0) += 1;
        }
    }

    counts
}

/// Enable exactly the formats present in `counts`.
fn detected_formats(counts: &BTreeMap<String, usize>) -> FormatFlags {
    let mut formats = FormatFlags {
        wal: false,
        ..Default::default()
    };
    for ext in counts.keys() {
        formats.enable(ext);
    }
    formats
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_args(path: &Path) -> InitArgs {
        InitArgs {
            path: path.to_path_buf(),
            moddir: None,
            force: false,
        }
    }

    #[test]
    fn test_init_creates_manifest() {
        let dir = tempdir().unwrap();

        run(init_args(dir.path()), &Printer::quiet()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_init_errors_if_manifest_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "include_map: true").unwrap();

        let result = run(init_args(dir.path()), &Printer::quiet());
        assert!(matches!(result, Err(PackError::Config { .. })));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "include_map: true").unwrap();

        let mut args = init_args(dir.path());
        args.force = true;
        run(args, &Printer::quiet()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert!(!manifest.include_map);
    }

    #[test]
    fn test_init_detects_texture_formats() {
        let dir = tempdir().unwrap();
        let moddir = dir.path().join("baseq2");
        fs::create_dir_all(moddir.join("textures/e1u1")).unwrap();
        fs::write(moddir.join("textures/e1u1/wall01.tga"), b"").unwrap();
        fs::write(moddir.join("textures/e1u1/wall02.TGA"), b"").unwrap();
        fs::write(moddir.join("textures/e1u1/wall01.png"), b"").unwrap();
        fs::write(moddir.join("textures/readme.txt"), b"").unwrap();

        let mut args = init_args(dir.path());
        args.moddir = Some(moddir.clone());
        run(args, &Printer::quiet()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(manifest.moddir, Some(moddir));
        assert_eq!(
            manifest.formats,
            FormatFlags {
                wal: false,
                jpg: false,
                png: true,
                tga: true,
            }
        );
    }

    #[test]
    fn test_count_texture_formats() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.wal"), b"").unwrap();
        fs::write(dir.path().join("b.wal"), b"").unwrap();
        fs::write(dir.path().join("c.jpg"), b"").unwrap();

        let counts = count_texture_formats(dir.path());
        assert_eq!(counts.get("wal"), Some(&2));
        assert_eq!(counts.get("jpg"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_count_nonexistent_directory() {
        assert!(count_texture_formats(Path::new("/nonexistent/textures")).is_empty());
    }
}
