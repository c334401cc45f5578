//! Per-asset outcomes of a packing run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One attempted asset and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PackEvent {
    /// File copied verbatim.
    Packed { entry: String },
    /// File re-encoded and written under a new extension.
    Converted { source: String, entry: String },
    /// No file for an enabled format.
    Missing { file: String },
    /// The file exists but could not be read, decoded or written.
    Failed { file: String, reason: String },
}

impl fmt::Display for PackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackEvent::Packed { entry } => write!(f, "packed {}", entry),
            PackEvent::Converted { source, entry } => {
                write!(f, "converted {} -> {}", source, entry)
            }
            PackEvent::Missing { file } => write!(f, "could not find {}", file),
            PackEvent::Failed { file, reason } => write!(f, "failed {}: {}", file, reason),
        }
    }
}

/// Accumulates events for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackReport {
    /// Estimated number of assets to attempt. Informational only.
    pub expected: usize,
    /// Number of texture identifiers discovered.
    pub textures: usize,
    /// Skybox name, if one was found.
    pub skybox: Option<String>,
    /// Archive written, set once the archive is finalized.
    pub archive: Option<PathBuf>,
    events: Vec<PackEvent>,
}

impl PackReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PackEvent) {
        self.events.push(event);
    }

    /// Events in the order they happened.
    pub fn events(&self) -> &[PackEvent] {
        &self.events
    }

    /// Number of attempts so far.
    pub fn attempted(&self) -> usize {
        self.events.len()
    }

    /// Archive entry names written, in write order.
    pub fn entries(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PackEvent::Packed { entry } | PackEvent::Converted { entry, .. } => {
                    Some(entry.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Files that were looked for and not found.
    pub fn missing(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PackEvent::Missing { file } => Some(file.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Files that existed but failed.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PackEvent::Failed { file, reason } => Some((file.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn converted_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PackEvent::Converted { .. }))
            .count()
    }

    /// True when nothing was missing or failed.
    pub fn is_clean(&self) -> bool {
        self.events
            .iter()
            .all(|e| matches!(e, PackEvent::Packed { .. } | PackEvent::Converted { .. }))
    }
}
