//! Image loading for query and corpus photos
//!
//! Decodes the common photographic formats (JPEG, PNG) into an OpenCV Mat in
//! BGR layout for consistent downstream processing. EXIF orientation is
//! applied during loading so that photos taken on rotated phones are matched
//! the way they are displayed.

use crate::error::{Result, SearchError};
use image::metadata::Orientation;
use image::{DynamicImage, ImageReader};
use opencv::core::Mat;
use opencv::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

/// Load an image from disk and convert to an OpenCV Mat (BGR format)
///
/// EXIF orientation is honored: the returned Mat always has the display
/// orientation. A missing or unreadable EXIF block is ignored.
///
/// # Arguments
///
/// * `path` - Path to the image file
///
/// # Returns
///
/// OpenCV Mat in BGR format (standard OpenCV color format)
///
/// # Errors
///
/// Returns `SearchError::ImageLoad` if the file cannot be opened, the
/// format is unsupported, or decoding fails.
pub fn load_image(path: &Path) -> Result<Mat> {
    ImageFormat::from_extension(path).ok_or_else(|| SearchError::ImageLoad {
        message: format!("Unsupported image format: {}", path.display()),
        source: None,
    })?;

    let reader = ImageReader::open(path).map_err(|e| {
        SearchError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let mut img: DynamicImage = reader.decode().map_err(|e| {
        SearchError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    if let Some(orientation) = read_exif_orientation(path) {
        img.apply_orientation(orientation);
    }

    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    rgb_to_bgr_mat(&rgb_img.into_raw(), width as i32, height as i32)
}

/// Read the EXIF orientation tag, if any
///
/// Returns `None` for files without EXIF data (most PNGs) or with an
/// orientation value outside the valid 1-8 range.
fn read_exif_orientation(path: &Path) -> Option<Orientation> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new()
        .read_from_container(&mut bufreader)
        .ok()?;

    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    Orientation::from_exif(u8::try_from(value).ok()?)
}

/// Convert an interleaved RGB byte buffer into an OpenCV BGR Mat
fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    if rgb_data.len() != (width as usize) * (height as usize) * 3 {
        return Err(SearchError::Processing(format!(
            "Pixel buffer size {} does not match {}x{} RGB image",
            rgb_data.len(),
            width,
            height
        )));
    }

    let mut bgr_data = vec![0u8; rgb_data.len()];
    for (dst, src) in bgr_data.chunks_exact_mut(3).zip(rgb_data.chunks_exact(3)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
    }

    let flat = Mat::from_slice(&bgr_data)
        .map_err(|e| SearchError::opencv("Mat creation from pixel buffer", e))?;
    let shaped = flat
        .reshape(3, height)
        .map_err(|e| SearchError::opencv("Mat reshape", e))?;
    shaped
        .try_clone()
        .map_err(|e| SearchError::opencv("Mat clone", e))
}
