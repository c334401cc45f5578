//! In-memory image re-encoding.
//!
//! Two conversions exist and at most one applies to a given source format:
//! `png -> jpg` (alpha dropped) and `tga -> png` (alpha kept).

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::config::ConversionFlags;
use crate::error::{PackError, Result};

/// JPEG quality used for `png -> jpg`.
pub const JPEG_QUALITY: u8 = 75;

/// Channel layout forced before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourLayout {
    Rgb,
    Rgba,
}

/// Re-encoding of one source format into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub from: &'static str,
    pub to: &'static str,
    pub layout: ColourLayout,
}

impl ConversionRule {
    pub const PNG_TO_JPG: ConversionRule = ConversionRule {
        from: "png",
        to: "jpg",
        layout: ColourLayout::Rgb,
    };

    pub const TGA_TO_PNG: ConversionRule = ConversionRule {
        from: "tga",
        to: "png",
        layout: ColourLayout::Rgba,
    };

    /// The enabled rule for files with `extension`, if any.
    pub fn for_extension(extension: &str, flags: &ConversionFlags) -> Option<ConversionRule> {
        match extension {
            "png" if flags.png_to_jpg => Some(Self::PNG_TO_JPG),
            "tga" if flags.tga_to_png => Some(Self::TGA_TO_PNG),
            _ => None,
        }
    }

    fn source_format(&self) -> ImageFormat {
        match self.from {
            "png" => ImageFormat::Png,
            "tga" => ImageFormat::Tga,
            _ => ImageFormat::Jpeg,
        }
    }
}

/// Re-encoded image bytes.
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    /// Extension of the encoded bytes.
    pub extension: &'static str,
}

/// Decode `bytes` as `rule.from`, force the colour layout and encode as
/// `rule.to`. `path` is only used for error messages.
pub fn convert(bytes: &[u8], rule: ConversionRule, path: &Path) -> Result<Converted> {
    let image_error = |message: String| PackError::Image {
        path: path.to_path_buf(),
        message,
    };

    let decoded = image::load_from_memory_with_format(bytes, rule.source_format())
        .map_err(|e| image_error(format!("Failed to decode {}: {}", rule.from, e)))?;

    let mut out = Vec::new();
    match rule.layout {
        ColourLayout::Rgb => {
            let rgb = decoded.to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| image_error(format!("Failed to encode {}: {}", rule.to, e)))?;
        }
        ColourLayout::Rgba => {
            DynamicImage::ImageRgba8(decoded.to_rgba8())
                .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                .map_err(|e| image_error(format!("Failed to encode {}: {}", rule.to, e)))?;
        }
    }

    tracing::debug!(
        path = %path.display(),
        from = rule.from,
        to = rule.to,
        bytes = out.len(),
        "converted"
    );

    Ok(Converted {
        bytes: out,
        extension: rule.to,
    })
}

/// Replace the extension of an archive entry name.
pub fn swap_extension(entry_name: &str, extension: &str) -> String {
    let stem = match entry_name.rfind('.') {
        Some(dot) if !entry_name[dot..].contains('/') => &entry_name[..dot],
        _ => entry_name,
    };
    format!("{}.{}", stem, extension)
}
