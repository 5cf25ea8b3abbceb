//! Raster decode and output encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use stitch_common::{StitchError, StitchResult};

use crate::{png, Raster};

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// Match a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> StitchResult<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                StitchError::UnsupportedFormat(format!(
                    "cannot infer an image format from '{}' (use .png, .jpg, .jpeg or .webp)",
                    path.display()
                ))
            })
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| StitchError::UnsupportedFormat(s.to_string()))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lossy encoder settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// 1-100
    pub jpeg_quality: u8,
    /// 0.0-100.0
    pub webp_quality: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            webp_quality: 85.0,
        }
    }
}

/// Decode PNG/JPEG/WebP bytes into an RGB raster.
pub fn decode(bytes: &[u8]) -> Result<Raster, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Encode a raster in the requested format.
pub fn encode(raster: &Raster, format: OutputFormat, options: &EncodeOptions) -> StitchResult<Vec<u8>> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(StitchError::EncodeError(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }

    match format {
        OutputFormat::Png => png::create_png_auto(raster.as_raw(), width as usize, height as usize)
            .map_err(StitchError::EncodeError),
        OutputFormat::Jpeg => {
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.clamp(1, 100))
                .encode(raster.as_raw(), width, height, ColorType::Rgb8)
                .map_err(|e| StitchError::EncodeError(format!("JPEG encoding failed: {}", e)))?;
            Ok(out)
        }
        OutputFormat::Webp => {
            let encoded = webp::Encoder::from_rgb(raster.as_raw(), width, height)
                .encode(options.webp_quality.clamp(0.0, 100.0));
            Ok(encoded.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(OutputFormat::from_extension("PNG"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::Webp));
        assert_eq!(OutputFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(OutputFormat::from_path("out/full_disk.jpeg").unwrap(), OutputFormat::Jpeg);
        let err = OutputFormat::from_path("no_extension").unwrap_err();
        assert!(matches!(err, StitchError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(OutputFormat::Webp.content_type(), "image/webp");
    }

    #[test]
    fn test_encode_empty_image_fails() {
        let empty = Raster::new(0, 0);
        let err = encode(&empty, OutputFormat::Png, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, StitchError::EncodeError(_)));
    }
}
