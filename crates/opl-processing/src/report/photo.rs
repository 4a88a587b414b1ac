//! Image preparation for embedding in the report

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::ReportError;

/// Widest image (in pixels) embedded in the report; larger photos are downscaled.
pub const MAX_EMBED_WIDTH_PX: u32 = 1600;

const JPEG_QUALITY: u8 = 85;

/// An image re-encoded as baseline RGB JPEG, ready to become a DCTDecode XObject.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl PreparedImage {
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let data = std::fs::read(path).map_err(|e| ReportError::ReadImage {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&data)
    }

    /// Decode any supported format, downscale wide images and re-encode as JPEG.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReportError> {
        let mut img = image::load_from_memory(data)?;

        let (width, height) = img.dimensions();
        if width > MAX_EMBED_WIDTH_PX {
            let scaled_height =
                ((height as u64 * MAX_EMBED_WIDTH_PX as u64) / width as u64).max(1) as u32;
            img = img.resize_exact(MAX_EMBED_WIDTH_PX, scaled_height, FilterType::Triangle);
        }

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            encoder.encode_image(&rgb)?;
        }

        Ok(Self {
            width,
            height,
            jpeg: buffer.into_inner(),
        })
    }

    /// Height in points when drawn `width_pt` wide.
    pub fn height_for_width(&self, width_pt: f32) -> f32 {
        width_pt * self.height as f32 / self.width as f32
    }
}
