//! Hue/saturation histogram fingerprinting and correlation scoring
//!
//! Computes a 2D color-distribution fingerprint per image:
//! - Resize to a fixed canonical size to remove scale bias
//! - Convert to HSV and bin the hue and saturation channels jointly
//! - L2-normalize the histogram
//!
//! Two fingerprints are compared by Pearson correlation, rescaled from
//! [-1,1] to [0,1].
//!
//! Algorithm tag: `algo-hs-histogram-correlation`

use crate::config::HistogramConfig;
use crate::constants::histogram::{
    CANONICAL_SIZE, HUE_BINS, HUE_RANGE, SATURATION_BINS, SATURATION_RANGE,
};
use crate::error::{Result, SearchError};
use opencv::{
    core::{no_array, normalize, Mat, Size, Vector, NORM_L2},
    imgproc::{
        calc_hist, compare_hist, cvt_color, resize, COLOR_BGR2HSV, HISTCMP_CORREL, INTER_LINEAR,
    },
    prelude::*,
};

/// A 2D hue/saturation histogram, L2-normalized
///
/// All bin values are non-negative. The normalization targets unit L2 norm,
/// not a probability distribution; the downstream comparison is
/// correlation-based and does not require bins to sum to 1.
#[derive(Debug, Clone)]
pub struct ColorFingerprint {
    hist: Mat,
}

impl ColorFingerprint {
    /// Histogram bin grid as (hue bins, saturation bins)
    pub fn bin_counts(&self) -> (i32, i32) {
        (self.hist.rows(), self.hist.cols())
    }
}

/// Color profiler producing and comparing histogram fingerprints
pub struct ColorProfiler {
    canonical_size: i32,
    hue_bins: i32,
    saturation_bins: i32,
}

impl Default for ColorProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorProfiler {
    /// Create a profiler with default parameters
    pub fn new() -> Self {
        Self {
            canonical_size: CANONICAL_SIZE,
            hue_bins: HUE_BINS,
            saturation_bins: SATURATION_BINS,
        }
    }

    /// Create a profiler from configuration
    pub fn with_config(config: &HistogramConfig) -> Self {
        Self {
            canonical_size: config.canonical_size,
            hue_bins: config.hue_bins,
            saturation_bins: config.saturation_bins,
        }
    }

    /// Compute the color fingerprint of an image
    ///
    /// # Arguments
    ///
    /// * `image` - Input BGR image
    ///
    /// # Errors
    ///
    /// Returns `SearchError::OpenCv` if resizing, color conversion, or
    /// histogram computation fails.
    pub fn fingerprint(&self, image: &Mat) -> Result<ColorFingerprint> {
        let mut resized = Mat::default();
        resize(
            image,
            &mut resized,
            Size::new(self.canonical_size, self.canonical_size),
            0.0,
            0.0,
            INTER_LINEAR,
        )
        .map_err(|e| SearchError::opencv("canonical resize", e))?;

        let mut hsv = Mat::default();
        cvt_color(
            &resized,
            &mut hsv,
            COLOR_BGR2HSV,
            0,
        )
        .map_err(|e| SearchError::opencv("HSV conversion", e))?;

        let mut images = Vector::<Mat>::new();
        images.push(hsv);
        let channels = Vector::<i32>::from_slice(&[0, 1]);
        let hist_size = Vector::<i32>::from_slice(&[self.hue_bins, self.saturation_bins]);
        let ranges = Vector::<f32>::from_slice(&[
            HUE_RANGE[0],
            HUE_RANGE[1],
            SATURATION_RANGE[0],
            SATURATION_RANGE[1],
        ]);

        let mut hist = Mat::default();
        calc_hist(
            &images,
            &channels,
            &no_array(),
            &mut hist,
            &hist_size,
            &ranges,
            false,
        )
        .map_err(|e| SearchError::opencv("histogram computation", e))?;

        let mut normalized = Mat::default();
        normalize(&hist, &mut normalized, 1.0, 0.0, NORM_L2, -1, &no_array())
            .map_err(|e| SearchError::opencv("histogram normalization", e))?;

        Ok(ColorFingerprint { hist: normalized })
    }

    /// Score the color similarity of two fingerprints
    ///
    /// # Returns
    ///
    /// `(correlation + 1) / 2`, clamped to [0,1]. Symmetric in its arguments;
    /// a fingerprint scored against itself yields 1.0.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::OpenCv` if histogram comparison fails.
    pub fn color_score(&self, a: &ColorFingerprint, b: &ColorFingerprint) -> Result<f64> {
        let correlation = compare_hist(&a.hist, &b.hist, HISTCMP_CORREL)
            .map_err(|e| SearchError::opencv("histogram comparison", e))?;

        Ok(((correlation + 1.0) / 2.0).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn solid_mat(rows: i32, cols: i32, bgr: (f64, f64, f64)) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(bgr.0, bgr.1, bgr.2, 0.0))
            .unwrap()
    }

    #[test]
    fn test_fingerprint_geometry() {
        let image = solid_mat(100, 100, (0.0, 0.0, 255.0));
        let fp = ColorProfiler::new().fingerprint(&image).unwrap();
        assert_eq!(fp.bin_counts(), (50, 50));
    }

    #[test]
    fn test_self_score_is_one() {
        let profiler = ColorProfiler::new();
        let image = solid_mat(120, 80, (0.0, 0.0, 255.0));
        let fp = profiler.fingerprint(&image).unwrap();

        let score = profiler.color_score(&fp, &fp).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_symmetric() {
        let profiler = ColorProfiler::new();
        let red = profiler
            .fingerprint(&solid_mat(100, 100, (0.0, 0.0, 255.0)))
            .unwrap();
        let blue = profiler
            .fingerprint(&solid_mat(100, 100, (255.0, 0.0, 0.0)))
            .unwrap();

        let ab = profiler.color_score(&red, &blue).unwrap();
        let ba = profiler.color_score(&blue, &red).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_different_hues_score_below_self() {
        let profiler = ColorProfiler::new();
        let red = profiler
            .fingerprint(&solid_mat(100, 100, (0.0, 0.0, 255.0)))
            .unwrap();
        let blue = profiler
            .fingerprint(&solid_mat(100, 100, (255.0, 0.0, 0.0)))
            .unwrap();

        let cross = profiler.color_score(&red, &blue).unwrap();
        let same = profiler.color_score(&red, &red).unwrap();

        assert!((0.0..=1.0).contains(&cross));
        assert!(cross < same);
    }

    #[test]
    fn test_resize_removes_scale_bias() {
        let profiler = ColorProfiler::new();
        let small = profiler
            .fingerprint(&solid_mat(32, 32, (0.0, 255.0, 0.0)))
            .unwrap();
        let large = profiler
            .fingerprint(&solid_mat(512, 384, (0.0, 255.0, 0.0)))
            .unwrap();

        let score = profiler.color_score(&small, &large).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }
}
