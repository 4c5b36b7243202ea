//! Subject isolation via automatic thresholding and bounding-box crop
//!
//! Implements the preprocessing stage that:
//! - Suppresses sensor noise with a Gaussian blur
//! - Binarizes with Otsu's inter-class variance maximization
//! - Extracts external contours of the connected regions
//! - Crops to the bounding rectangle of the largest contour
//!
//! Isolation failure is never fatal: a photo with no detectable foreground
//! (uniform lighting, no contrast) is matched whole.
//!
//! Algorithm tag: `algo-otsu-subject-crop`

use crate::config::CropConfig;
use crate::constants::crop::{BLUR_KERNEL_SIZE, THRESHOLD_MAX_VALUE};
use crate::error::{Result, SearchError};
use opencv::{
    core::{Mat, Point, Rect, Size, Vector, BORDER_DEFAULT},
    imgproc::{
        bounding_rect, contour_area, cvt_color, find_contours, gaussian_blur, threshold,
        CHAIN_APPROX_SIMPLE, COLOR_BGR2GRAY, RETR_EXTERNAL, THRESH_BINARY, THRESH_OTSU,
    },
    prelude::*,
};

type VectorOfPoint = Vector<Point>;

/// An image together with the bounding rectangle used to produce it
///
/// When no foreground region is found, `region` is `None` and `image` is the
/// unmodified input. The crop region, when present, is always at least 1x1.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    /// Cropped (or original) BGR image
    pub image: Mat,
    /// Crop rectangle in original image coordinates, `None` when uncropped
    pub region: Option<Rect>,
}

impl CroppedImage {
    /// Wrap an image that was not cropped
    fn full(image: &Mat) -> Self {
        Self {
            image: image.clone(),
            region: None,
        }
    }

    /// Whether a foreground region was isolated
    pub fn was_cropped(&self) -> bool {
        self.region.is_some()
    }
}

/// Subject cropper isolating the photographed item from its background
pub struct SubjectCropper {
    blur_kernel_size: i32,
}

impl Default for SubjectCropper {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectCropper {
    /// Create a subject cropper with default parameters
    pub fn new() -> Self {
        Self {
            blur_kernel_size: BLUR_KERNEL_SIZE,
        }
    }

    /// Create a subject cropper from configuration
    pub fn with_config(config: &CropConfig) -> Self {
        Self {
            blur_kernel_size: config.blur_kernel_size,
        }
    }

    /// Crop an image to its dominant foreground region
    ///
    /// # Arguments
    ///
    /// * `image` - Input BGR image
    ///
    /// # Returns
    ///
    /// The cropped image, or the original image unchanged when no contour is
    /// found or any processing step fails. This method never errors; the
    /// whole-image fallback is the documented degradation.
    pub fn crop(&self, image: &Mat) -> CroppedImage {
        let rect = match self.detect_subject(image) {
            Ok(Some(rect)) => rect,
            _ => return CroppedImage::full(image),
        };

        match Mat::roi(image, rect).and_then(|roi| roi.try_clone()) {
            Ok(cropped) => CroppedImage {
                image: cropped,
                region: Some(rect),
            },
            Err(_) => CroppedImage::full(image),
        }
    }

    /// Locate the bounding rectangle of the largest external contour
    fn detect_subject(&self, image: &Mat) -> Result<Option<Rect>> {
        let mut gray = Mat::default();
        cvt_color(
            image,
            &mut gray,
            COLOR_BGR2GRAY,
            0,
        )
        .map_err(|e| SearchError::opencv("grayscale conversion", e))?;

        let mut blurred = Mat::default();
        gaussian_blur(
            &gray,
            &mut blurred,
            Size::new(self.blur_kernel_size, self.blur_kernel_size),
            0.0,
            0.0,
            BORDER_DEFAULT,
        )
        .map_err(|e| SearchError::opencv("Gaussian blur", e))?;

        let mut binary = Mat::default();
        threshold(
            &blurred,
            &mut binary,
            0.0,
            THRESHOLD_MAX_VALUE,
            THRESH_BINARY | THRESH_OTSU,
        )
        .map_err(|e| SearchError::opencv("Otsu threshold", e))?;

        let mut contours = Vector::<VectorOfPoint>::new();
        find_contours(
            &binary,
            &mut contours,
            RETR_EXTERNAL,
            CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| SearchError::opencv("contour detection", e))?;

        if contours.is_empty() {
            return Ok(None);
        }

        let mut best_contour: Option<VectorOfPoint> = None;
        let mut best_area = f64::MIN;
        for contour in contours.iter() {
            let area = contour_area(&contour, false)
                .map_err(|e| SearchError::opencv("contour area", e))?;
            if area > best_area {
                best_area = area;
                best_contour = Some(contour);
            }
        }

        let contour = match best_contour {
            Some(contour) => contour,
            None => return Ok(None),
        };

        let rect =
            bounding_rect(&contour).map_err(|e| SearchError::opencv("bounding rectangle", e))?;
        if rect.width < 1 || rect.height < 1 {
            return Ok(None);
        }

        Ok(Some(rect))
    }
}
