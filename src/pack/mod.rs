//! The packing pipeline.
//!
//! A run moves forward through fixed stages:
//!
//! ```text
//! Extract -> SourceArtifacts -> Skybox -> Textures -> Done
//! ```
//!
//! Only two things abort a run: the map cannot be read, or the archive
//! cannot be created or finalized. Every per-asset problem becomes a
//! [`PackEvent`] and the run carries on.
//!
//! # Example
//!
//! ```ignore
//! use mappack::{PackConfig, Packer, Printer};
//!
//! let config = PackConfig::new("maps/base1.map", "baseq2", "base1.pkz");
//! let report = Packer::new(&config).run(&Printer::new())?;
//! println!("{} entries", report.entries().len());
//! ```

mod report;

use std::fs;
use std::path::Path;

use crate::archive::ArchiveWriter;
use crate::config::{ConversionFlags, PackConfig};
use crate::convert::{convert, swap_extension, ConversionRule};
use crate::error::{PackError, Result};
use crate::extract::{extract_file, References};
use crate::output::{display_path, plural, progress, Printer};
use crate::resolve::{resolve, AssetGroup, Resolution, MAPS_DIR};

pub use report::{PackEvent, PackReport};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Extract,
    SourceArtifacts,
    Skybox,
    Textures,
    Done,
}

/// Drives extraction, resolution, conversion and archive writes for one
/// configuration.
pub struct Packer<'a> {
    config: &'a PackConfig,
    stage: Stage,
}

impl<'a> Packer<'a> {
    pub fn new(config: &'a PackConfig) -> Self {
        Self {
            config,
            stage: Stage::Init,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stages only move forward");
        tracing::debug!(from = ?self.stage, to = ?next, "stage");
        self.stage = next;
    }

    /// Run the whole pipeline and write the archive.
    pub fn run(mut self, printer: &Printer) -> Result<PackReport> {
        let config = self.config;

        self.advance(Stage::Extract);
        printer.status("Scanning", &display_path(&config.map));
        let references = extract_file(&config.map)?;
        printer.info(
            "Found",
            &format!(
                "{}{}",
                plural(references.textures.len(), "texture", "textures"),
                references
                    .skybox_name()
                    .map(|sky| format!(", skybox {}", sky))
                    .unwrap_or_default()
            ),
        );

        let mut report = PackReport::new();
        report.textures = references.textures.len();
        report.skybox = references.skybox_name().map(str::to_string);
        report.expected = expected_attempts(config, &references);

        let mut archive = ArchiveWriter::create(&config.output, config.compression)?;

        self.advance(Stage::SourceArtifacts);
        self.pack_source_artifacts(&mut archive, &mut report, printer);

        self.advance(Stage::Skybox);
        if let Some(sky) = references.skybox_name() {
            let group = AssetGroup::skybox(sky, &config.formats);
            pack_group(&config.moddir, &group, None, &mut archive, &mut report, printer);
        }

        self.advance(Stage::Textures);
        let group = AssetGroup::textures(&references.textures, &config.formats);
        pack_group(
            &config.moddir,
            &group,
            Some(&config.conversions),
            &mut archive,
            &mut report,
            printer,
        );

        let summary = archive.finish()?;
        self.advance(Stage::Done);

        printer.status(
            "Finished",
            &format!(
                "{} in {} ({} missing, {} failed)",
                plural(summary.entries, "entry", "entries"),
                display_path(&summary.path),
                report.missing().len(),
                report.failures().len()
            ),
        );
        report.archive = Some(summary.path);

        Ok(report)
    }

    /// `maps/<stem>.map` when requested, then `maps/<stem>.bsp` when given.
    fn pack_source_artifacts(
        &self,
        archive: &mut ArchiveWriter,
        report: &mut PackReport,
        printer: &Printer,
    ) {
        let stem = self.config.map_stem();

        if self.config.include_map {
            let entry = format!("{}/{}.map", MAPS_DIR, stem);
            pack_file(&self.config.map, &entry, archive, report, printer);
        }

        if let Some(bsp) = &self.config.bsp {
            let entry = format!("{}/{}.bsp", MAPS_DIR, stem);
            pack_file(bsp, &entry, archive, report, printer);
        }
    }
}

/// Estimated attempts: source artifacts plus every enabled (name, format)
/// pair in the skybox and texture groups.
fn expected_attempts(config: &PackConfig, references: &References) -> usize {
    let artifacts = usize::from(config.include_map) + usize::from(config.bsp.is_some());
    let skybox = references
        .skybox_name()
        .map(|sky| AssetGroup::skybox(sky, &config.formats).attempts())
        .unwrap_or(0);
    artifacts + skybox + references.textures.len() * config.formats.enabled_count()
}

/// Resolve a group and write what exists. `conversions` is `None` for
/// groups that are never re-encoded.
fn pack_group(
    root: &Path,
    group: &AssetGroup,
    conversions: Option<&ConversionFlags>,
    archive: &mut ArchiveWriter,
    report: &mut PackReport,
    printer: &Printer,
) {
    for resolution in resolve(root, group) {
        match resolution {
            Resolution::Missing { file_name } => {
                printer.warning(
                    "Missing",
                    &format!(
                        "{} {}",
                        progress(report.attempted() + 1, report.expected),
                        printer.dim(&format!("could not find {}", file_name))
                    ),
                );
                report.push(PackEvent::Missing { file: file_name });
            }
            Resolution::Found {
                source,
                entry_name,
                extension,
            } => {
                let rule = conversions
                    .and_then(|flags| ConversionRule::for_extension(extension, flags));
                match rule {
                    Some(rule) => {
                        pack_converted(&source, &entry_name, rule, archive, report, printer)
                    }
                    None => pack_file(&source, &entry_name, archive, report, printer),
                }
            }
        }
    }
}

/// Copy a file verbatim, reporting the outcome.
fn pack_file(
    source: &Path,
    entry: &str,
    archive: &mut ArchiveWriter,
    report: &mut PackReport,
    printer: &Printer,
) {
    let counter = progress(report.attempted() + 1, report.expected);

    if !source.is_file() {
        printer.warning(
            "Missing",
            &format!("{} could not find {}", counter, display_path(source)),
        );
        report.push(PackEvent::Missing {
            file: display_path(source),
        });
        return;
    }

    match archive.add_file(entry, source) {
        Ok(()) => {
            printer.status("Packed", &format!("{} {}", counter, entry));
            report.push(PackEvent::Packed {
                entry: entry.to_string(),
            });
        }
        Err(e) => {
            printer.error("Failed", &format!("{} {}: {}", counter, entry, e));
            report.push(PackEvent::Failed {
                file: display_path(source),
                reason: e.to_string(),
            });
        }
    }
}

/// Re-encode a file and write it under the rule's target extension. The
/// original format is never written, even on failure.
fn pack_converted(
    source: &Path,
    entry: &str,
    rule: ConversionRule,
    archive: &mut ArchiveWriter,
    report: &mut PackReport,
    printer: &Printer,
) {
    let counter = progress(report.attempted() + 1, report.expected);
    let target = swap_extension(entry, rule.to);
    printer.info(
        "Converting",
        &format!("{} {} to {}", counter, entry, rule.to),
    );

    let result = fs::read(source)
        .map_err(|e| PackError::Io {
            path: source.to_path_buf(),
            message: format!("Failed to read: {}", e),
        })
        .and_then(|bytes| convert(&bytes, rule, source))
        .and_then(|converted| archive.add_bytes(&target, &converted.bytes));

    match result {
        Ok(()) => {
            printer.status("Packed", &format!("{} {}", counter, target));
            report.push(PackEvent::Converted {
                source: entry.to_string(),
                entry: target,
            });
        }
        Err(e) => {
            printer.error("Failed", &format!("{} {}: {}", counter, entry, e));
            report.push(PackEvent::Failed {
                file: display_path(source),
                reason: e.to_string(),
            });
        }
    }
}
