//! Zip archive output.
//!
//! `ArchiveWriter` owns the output file for the whole run. Every entry is
//! written with the same compression, timestamp and permissions so that
//! identical inputs produce byte-identical archives.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::Compression;
use crate::error::{PackError, Result};

/// Deflate level used when compression is enabled.
pub const DEFLATE_LEVEL: i64 = 9;

/// Where an entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Copy this file verbatim.
    File(PathBuf),
    /// Write these bytes.
    Bytes(Vec<u8>),
}

/// A named entry to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash path inside the archive.
    pub name: String,
    pub source: EntrySource,
}

impl ArchiveEntry {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::File(path.into()),
        }
    }

    pub fn bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Bytes(bytes),
        }
    }
}

/// Summary returned when the archive is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: usize,
}

/// Single writer for the output archive.
pub struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveWriter {
    /// Create the archive at `path`, truncating any existing file.
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        let file = File::create(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to create archive: {}", e),
        })?;

        tracing::debug!(path = %path.display(), ?compression, "opened archive");

        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(BufWriter::new(file)),
            options: entry_options(compression),
            entries: 0,
        })
    }

    /// Copy the file at `source` into the archive as `name`.
    ///
    /// The source is read fully before the entry is started, so an
    /// unreadable file never leaves a partial entry behind.
    pub fn add_file(&mut self, name: &str, source: &Path) -> Result<()> {
        let bytes = fs::read(source).map_err(|e| PackError::Io {
            path: source.to_path_buf(),
            message: format!("Failed to read: {}", e),
        })?;

        self.add_bytes(name, &bytes)?;
        tracing::trace!(entry = name, source = %source.display(), "wrote file entry");
        Ok(())
    }

    /// Write `bytes` into the archive as `name`.
    ///
    /// A failed write removes the started entry.
    pub fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        if let Err(e) = self.zip.write_all(bytes) {
            self.zip.abort_file()?;
            return Err(PackError::Archive {
                message: format!("Failed to write {}: {}", name, e),
            });
        }

        self.entries += 1;
        tracing::trace!(entry = name, len = bytes.len(), "wrote byte entry");
        Ok(())
    }

    /// Write an entry from either source.
    pub fn add(&mut self, entry: &ArchiveEntry) -> Result<()> {
        match &entry.source {
            EntrySource::File(path) => self.add_file(&entry.name, path),
            EntrySource::Bytes(bytes) => self.add_bytes(&entry.name, bytes),
        }
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the central directory and flush to disk.
    pub fn finish(self) -> Result<ArchiveSummary> {
        let path = self.path;
        let mut writer = self.zip.finish()?;
        writer.flush().map_err(|e| PackError::Io {
            path: path.clone(),
            message: format!("Failed to flush archive: {}", e),
        })?;

        tracing::debug!(path = %path.display(), entries = self.entries, "finalized archive");

        Ok(ArchiveSummary {
            path,
            entries: self.entries,
        })
    }
}

fn entry_options(compression: Compression) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    match compression {
        Compression::Stored => options.compression_method(CompressionMethod::Stored),
        Compression::Deflated => options
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(DEFLATE_LEVEL)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn read_entries(path: &Path) -> Vec<(String, Vec<u8>, CompressionMethod)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            out.push((entry.name().to_string(), bytes, entry.compression()));
        }
        out
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pkz");

        let writer = ArchiveWriter::create(&path, Compression::Deflated).unwrap();
        assert!(writer.is_empty());
        let summary = writer.finish().unwrap();

        assert_eq!(summary.entries, 0);
        assert!(read_entries(&path).is_empty());
    }

    #[test]
    fn test_file_and_byte_entries() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("wall01.wal");
        std::fs::write(&source, b"wal bytes").unwrap();
        let path = dir.path().join("out.pkz");

        let mut writer = ArchiveWriter::create(&path, Compression::Stored).unwrap();
        writer.add_file("textures/e1u1/wall01.wal", &source).unwrap();
        writer
            .add(&ArchiveEntry::bytes("textures/e1u1/wall01.jpg", b"jpg".to_vec()))
            .unwrap();
        assert_eq!(writer.len(), 2);
        writer.finish().unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "textures/e1u1/wall01.wal");
        assert_eq!(entries[0].1, b"wal bytes");
        assert_eq!(entries[0].2, CompressionMethod::Stored);
        assert_eq!(entries[1].0, "textures/e1u1/wall01.jpg");
        assert_eq!(entries[1].1, b"jpg");
    }

    #[test]
    fn test_deflate_applies_to_every_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pkz");

        let mut writer = ArchiveWriter::create(&path, Compression::Deflated).unwrap();
        writer.add_bytes("a.txt", &[b'a'; 512]).unwrap();
        writer.add_bytes("b.txt", &[b'b'; 512]).unwrap();
        writer.finish().unwrap();

        for (_, bytes, method) in read_entries(&path) {
            assert_eq!(bytes.len(), 512);
            assert_eq!(method, CompressionMethod::Deflated);
        }
    }

    #[test]
    fn test_missing_source_file_leaves_archive_usable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pkz");

        let mut writer = ArchiveWriter::create(&path, Compression::Deflated).unwrap();
        let err = writer
            .add_file("maps/base1.bsp", &dir.path().join("missing.bsp"))
            .unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));

        writer.add_bytes("maps/base1.map", b"{}").unwrap();
        writer.finish().unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "maps/base1.map");
    }

    #[test]
    fn test_unreadable_source_leaves_no_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pkz");
        let not_a_file = dir.path().join("textures");
        std::fs::create_dir_all(&not_a_file).unwrap();

        let mut writer = ArchiveWriter::create(&path, Compression::Deflated).unwrap();
        let err = writer.add_file("textures/wall.wal", &not_a_file).unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
        assert!(writer.is_empty());
        writer.finish().unwrap();

        assert!(read_entries(&path).is_empty());
    }

    #[test]
    fn test_duplicate_name_is_rejected_and_first_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pkz");

        let mut writer = ArchiveWriter::create(&path, Compression::Stored).unwrap();
        writer.add_bytes("textures/x.png", b"first").unwrap();
        assert!(writer.add_bytes("textures/x.png", b"second").is_err());
        assert_eq!(writer.len(), 1);
        writer.finish().unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, b"first");
    }

    #[test]
    fn test_identical_input_gives_identical_archive() {
        let dir = tempdir().unwrap();
        let write = |name: &str| {
            let path = dir.path().join(name);
            let mut writer = ArchiveWriter::create(&path, Compression::Deflated).unwrap();
            writer.add_bytes("env/sky_ft.pcx", b"face").unwrap();
            writer.finish().unwrap();
            std::fs::read(path).unwrap()
        };

        assert_eq!(write("a.pkz"), write("b.pkz"));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let result = ArchiveWriter::create(
            &dir.path().join("no/such/dir/out.pkz"),
            Compression::Stored,
        );
        assert!(matches!(result, Err(PackError::Io { .. })));
    }
}
