//! mappack - Map asset packer
//!
//! A library for collecting the textures and skybox a `.map` file uses and
//! writing them, with the compiled bsp, into a single distributable archive.

pub mod archive;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod output;
pub mod pack;
pub mod resolve;

pub use archive::{ArchiveEntry, ArchiveSummary, ArchiveWriter, EntrySource};
pub use config::{Compression, ConversionFlags, FormatFlags, Manifest, PackConfig};
pub use convert::{convert, ConversionRule, Converted};
pub use error::{PackError, Result};
pub use extract::{extract_file, extract_from_reader, extract_references, References};
pub use output::Printer;
pub use pack::{PackEvent, PackReport, Packer, Stage};
pub use resolve::{resolve, AssetGroup, FormatCandidate, Resolution};
