//! Resolution of asset names to files under the mod directory.
//!
//! Skybox faces and textures are resolved the same way: every enabled
//! candidate format is tried for every name, in declared format order.
//! Formats are additive, so if both `wal` and `tga` exist both are packed.

use std::path::{Component, Path, PathBuf};

use crate::config::FormatFlags;

/// Skybox face suffixes in the engine's load order.
pub const SKYBOX_SUFFIXES: [&str; 6] = ["ft", "bk", "lf", "rt", "up", "dn"];

/// Archive/mod subdirectory for skybox faces.
pub const ENV_DIR: &str = "env";
/// Archive/mod subdirectory for textures.
pub const TEXTURES_DIR: &str = "textures";
/// Archive subdirectory for the map source and bsp.
pub const MAPS_DIR: &str = "maps";

/// A file extension considered during resolution, gated by a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCandidate {
    pub extension: &'static str,
    pub enabled: bool,
}

impl FormatCandidate {
    pub const fn new(extension: &'static str, enabled: bool) -> Self {
        Self { extension, enabled }
    }
}

/// Texture candidates: `wal`, `jpg`, `png`, `tga`.
pub fn texture_candidates(formats: &FormatFlags) -> Vec<FormatCandidate> {
    vec![
        FormatCandidate::new("wal", formats.wal),
        FormatCandidate::new("jpg", formats.jpg),
        FormatCandidate::new("png", formats.png),
        FormatCandidate::new("tga", formats.tga),
    ]
}

/// Skybox candidates: `pcx` is always tried, `tga` and `jpg` follow the
/// texture flags.
pub fn skybox_candidates(formats: &FormatFlags) -> Vec<FormatCandidate> {
    vec![
        FormatCandidate::new("pcx", true),
        FormatCandidate::new("tga", formats.tga),
        FormatCandidate::new("jpg", formats.jpg),
    ]
}

/// A set of names resolved against one subdirectory and candidate list.
#[derive(Debug, Clone)]
pub struct AssetGroup {
    pub subdir: &'static str,
    pub names: Vec<String>,
    pub candidates: Vec<FormatCandidate>,
}

impl AssetGroup {
    /// The six faces of skybox `name` under `env/`.
    pub fn skybox(name: &str, formats: &FormatFlags) -> Self {
        Self {
            subdir: ENV_DIR,
            names: SKYBOX_SUFFIXES
                .iter()
                .map(|suffix| format!("{name}{suffix}"))
                .collect(),
            candidates: skybox_candidates(formats),
        }
    }

    /// Texture identifiers under `textures/`.
    pub fn textures<'a>(
        identifiers: impl IntoIterator<Item = &'a String>,
        formats: &FormatFlags,
    ) -> Self {
        Self {
            subdir: TEXTURES_DIR,
            names: identifiers.into_iter().cloned().collect(),
            candidates: texture_candidates(formats),
        }
    }

    /// Number of (name, enabled format) pairs this group will attempt.
    pub fn attempts(&self) -> usize {
        self.names.len() * self.candidates.iter().filter(|c| c.enabled).count()
    }
}

/// Outcome of resolving one name in one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file exists.
    Found {
        /// Full path on disk.
        source: PathBuf,
        /// Archive entry name, e.g. `textures/e1u1/wall01.wal`.
        entry_name: String,
        extension: &'static str,
    },
    /// No file for an enabled format.
    Missing {
        /// File name relative to the subdirectory, e.g. `e1u1/wall01.tga`.
        file_name: String,
    },
}

/// Resolve every name in `group` against `root`.
///
/// Results are format-major: all names for the first enabled format, then
/// all names for the next. Disabled formats yield nothing. Only existence is
/// tested; nothing is opened or modified.
pub fn resolve(root: &Path, group: &AssetGroup) -> Vec<Resolution> {
    let mut resolutions = Vec::with_capacity(group.attempts());

    for candidate in group.candidates.iter().filter(|c| c.enabled) {
        for name in &group.names {
            let file_name = format!("{}.{}", name, candidate.extension);
            let Some(relative) = confined_name(&file_name) else {
                tracing::trace!(file = %file_name, "name escapes the mod directory");
                resolutions.push(Resolution::Missing { file_name });
                continue;
            };
            let source = root.join(group.subdir).join(&relative);

            if source.is_file() {
                tracing::trace!(path = %source.display(), "resolved");
                resolutions.push(Resolution::Found {
                    source,
                    entry_name: format!("{}/{}", group.subdir, relative),
                    extension: candidate.extension,
                });
            } else {
                tracing::trace!(path = %source.display(), "not found");
                resolutions.push(Resolution::Missing { file_name });
            }
        }
    }

    resolutions
}

/// Forward-slash form of `file_name` that stays inside the subdirectory.
///
/// Root and drive prefixes are dropped, so `/tmp/x.wal` becomes `tmp/x.wal`.
/// A `..` component makes the name unresolvable.
fn confined_name(file_name: &str) -> Option<String> {
    let mut parts = Vec::new();
    for component in Path::new(file_name).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
