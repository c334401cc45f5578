//! Reference extraction from `.map` source files.
//!
//! Scans level geometry line by line and collects the texture identifiers
//! used by brush faces, plus the skybox named by the worldspawn `"sky"` key.
//!
//! A brush face line looks like:
//!
//! ```text
//! ( 0 0 0 ) ( 128 0 0 ) ( 0 128 0 ) e1u1/wall01 0 0 0 1 1
//! ```
//!
//! and the skybox key like:
//!
//! ```text
//! "sky" "unit1_"
//! ```

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{PackError, Result};

/// Brush face: three parenthesised plane points followed by the texture.
///
/// Group 1 is the texture identifier. A space must follow it; the rest of
/// the line (offsets, rotation, scale) is ignored.
fn texture_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\(.*?\) \(.*?\) \(.*?\) (\S+) ").expect("texture pattern is valid")
    })
}

/// Worldspawn skybox key. Group 1 is the skybox base name.
fn skybox_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"^"sky" "(.*?)""#).expect("skybox pattern is valid"))
}

/// Asset references discovered in a map file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    /// Texture identifiers, relative to `textures/` and without extension.
    pub textures: BTreeSet<String>,
    /// Skybox base name from the first `"sky"` key, if any.
    pub skybox: Option<String>,
}

impl References {
    /// The skybox name, if one was found and is non-empty.
    pub fn skybox_name(&self) -> Option<&str> {
        self.skybox.as_deref().filter(|name| !name.is_empty())
    }
}

/// Line-at-a-time extractor.
///
/// The texture rule is tried on every line. The skybox rule is only tried
/// when the texture rule failed on that line, and only until the first
/// skybox match.
#[derive(Debug, Default)]
pub struct ReferenceExtractor {
    references: References,
    found_skybox: bool,
}

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its line terminator).
    pub fn feed_line(&mut self, line: &str) {
        if let Some(caps) = texture_pattern().captures(line) {
            self.references.textures.insert(caps[1].to_string());
        } else if !self.found_skybox {
            if let Some(caps) = skybox_pattern().captures(line) {
                self.references.skybox = Some(caps[1].to_string());
                self.found_skybox = true;
            }
        }
    }

    pub fn finish(self) -> References {
        self.references
    }
}

/// Extract references from map source text.
pub fn extract_references(source: &str) -> References {
    let mut extractor = ReferenceExtractor::new();
    for line in source.lines() {
        extractor.feed_line(line);
    }
    extractor.finish()
}

/// Extract references from a buffered reader.
///
/// Invalid UTF-8 is replaced rather than rejected, so a stray byte in a
/// comment never aborts the scan.
pub fn extract_from_reader<R: BufRead>(mut reader: R) -> Result<References> {
    let mut extractor = ReferenceExtractor::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        extractor.feed_line(line.trim_end_matches(['\n', '\r']));
    }

    Ok(extractor.finish())
}

/// Extract references from a map file on disk.
pub fn extract_file(path: &Path) -> Result<References> {
    let file = File::open(path).map_err(|e| PackError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to open map file: {}", e),
    })?;

    let references = extract_from_reader(BufReader::new(file)).map_err(|e| match e {
        PackError::IoError(e) => PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read map file: {}", e),
        },
        other => other,
    })?;

    tracing::debug!(
        path = %path.display(),
        textures = references.textures.len(),
        skybox = ?references.skybox,
        "extracted references"
    );

    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tempfile::tempdir;

    const FACE: &str = "( 0 0 0 ) ( 128 0 0 ) ( 0 128 0 ) e1u1/wall01 0 0 0 1 1";

    #[test]
    fn test_extracts_texture_from_face() {
        let refs = extract_references(FACE);
        assert_eq!(refs.textures.len(), 1);
        assert!(refs.textures.contains("e1u1/wall01"));
        assert_eq!(refs.skybox, None);
    }

    #[test]
    fn test_duplicate_textures_collapse() {
        let source = format!("{FACE}\n{FACE}\n( 1 2 3 ) ( 4 5 6 ) ( 7 8 9 ) e1u1/floor1 0 0 0 1 1\n{FACE}");
        let refs = extract_references(&source);

        let textures: Vec<&str> = refs.textures.iter().map(String::as_str).collect();
        assert_eq!(textures, vec!["e1u1/floor1", "e1u1/wall01"]);
    }

    #[test]
    fn test_extracts_skybox() {
        let source = "{\n\"classname\" \"worldspawn\"\n\"sky\" \"unit1_\"\n}";
        let refs = extract_references(source);
        assert_eq!(refs.skybox.as_deref(), Some("unit1_"));
        assert_eq!(refs.skybox_name(), Some("unit1_"));
    }

    #[test]
    fn test_first_skybox_wins() {
        let source = "\"sky\" \"first_\"\n\"sky\" \"second_\"";
        let refs = extract_references(source);
        assert_eq!(refs.skybox.as_deref(), Some("first_"));
    }

    #[test]
    fn test_textures_still_collected_after_skybox() {
        let source = format!("\"sky\" \"space\"\n{FACE}");
        let refs = extract_references(&source);
        assert_eq!(refs.skybox.as_deref(), Some("space"));
        assert!(refs.textures.contains("e1u1/wall01"));
    }

    #[test]
    fn test_face_line_never_sets_skybox() {
        let line = "( \"sky\" ) ( 0 ) ( 0 ) \"sky\" \"hidden\"";
        let refs = extract_references(line);
        assert!(refs.textures.contains("\"sky\""));
        assert_eq!(refs.skybox, None);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let source = "( 0 0 0 ) ( 1 1 1 )\n( 0 0 0 ) ( 1 1 1 ) ( 2 2 2 ) notrailingspace\n\"sky\"\n  \"sky\" \"indented\"\n// comment";
        let refs = extract_references(source);
        assert!(refs.textures.is_empty());
        assert_eq!(refs.skybox, None);
    }

    #[test]
    fn test_empty_skybox_is_found_but_unnamed() {
        let source = "\"sky\" \"\"\n\"sky\" \"later\"";
        let refs = extract_references(source);
        assert_eq!(refs.skybox.as_deref(), Some(""));
        assert_eq!(refs.skybox_name(), None);
    }

    #[test]
    fn test_reader_handles_crlf_and_invalid_utf8() {
        let mut bytes = b"// \xff\xfe junk\r\n".to_vec();
        bytes.extend_from_slice(FACE.as_bytes());
        bytes.extend_from_slice(b"\r\n\"sky\" \"dusk_\"\r\n");

        let refs = extract_from_reader(Cursor::new(bytes)).unwrap();
        assert!(refs.textures.contains("e1u1/wall01"));
        assert_eq!(refs.skybox.as_deref(), Some("dusk_"));
    }

    struct BrokenReader;

    impl std::io::Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device went away"))
        }
    }

    #[test]
    fn test_reader_error_is_returned() {
        let result = extract_from_reader(BufReader::new(BrokenReader));
        match result {
            Err(PackError::IoError(e)) => assert_eq!(e.to_string(), "device went away"),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_file_missing_is_error() {
        let dir = tempdir().unwrap();
        let result = extract_file(&dir.path().join("nope.map"));
        assert!(matches!(result, Err(PackError::Io { .. })));
    }

    #[test]
    fn test_extract_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base1.map");
        std::fs::write(&path, format!("{FACE}\n\"sky\" \"unit1_\"\n")).unwrap();

        let refs = extract_file(&path).unwrap();
        assert!(refs.textures.contains("e1u1/wall01"));
        assert_eq!(refs.skybox.as_deref(), Some("unit1_"));
    }
}
