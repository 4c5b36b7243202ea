//! ORB keypoint descriptor extraction
//!
//! Produces up to a fixed cap of 256-bit binary descriptors from salient
//! image regions, tolerant to modest rotation and scale change. Images with
//! too little texture (a blank card, a heavily blurred photo) yield an
//! explicit empty descriptor set rather than an error.
//!
//! Algorithm tag: `algo-orb-descriptor-extraction`

use crate::config::FeatureConfig;
use crate::constants::features::{
    EDGE_THRESHOLD, FAST_THRESHOLD, MAX_FEATURES, PATCH_SIZE, PYRAMID_LEVELS, SCALE_FACTOR,
};
use crate::error::{Result, SearchError};
use opencv::{
    core::{no_array, KeyPoint, Mat, Vector},
    features2d::{ORB_ScoreType, ORB},
    imgproc::{cvt_color, COLOR_BGR2GRAY},
    prelude::*,
};

/// An ordered sequence of fixed-length binary feature descriptors
///
/// Backed by an OpenCV Mat with one 32-byte descriptor per row. The empty
/// state is explicit: a textureless image produces a zero-row set, never a
/// null stand-in.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descriptors: Mat,
}

impl DescriptorSet {
    /// The explicit "no descriptors" state
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_mat(descriptors: Mat) -> Self {
        Self { descriptors }
    }

    /// Number of descriptors in the set
    pub fn len(&self) -> usize {
        if self.descriptors.empty() {
            0
        } else {
            self.descriptors.rows() as usize
        }
    }

    /// Whether the set holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn as_mat(&self) -> &Mat {
        &self.descriptors
    }
}

/// ORB feature extractor with a bounded descriptor count
pub struct OrbExtractor {
    max_features: i32,
    fast_threshold: i32,
}

impl Default for OrbExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbExtractor {
    /// Create an extractor with default parameters
    pub fn new() -> Self {
        Self {
            max_features: MAX_FEATURES,
            fast_threshold: FAST_THRESHOLD,
        }
    }

    /// Create an extractor from configuration
    pub fn with_config(config: &FeatureConfig) -> Self {
        Self {
            max_features: config.max_features,
            fast_threshold: config.fast_threshold,
        }
    }

    /// Extract binary descriptors from an image
    ///
    /// # Arguments
    ///
    /// * `image` - Input BGR image
    ///
    /// # Returns
    ///
    /// A possibly empty [`DescriptorSet`]. Low-texture images are not an
    /// error; they simply produce no keypoints.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::OpenCv` if the underlying detector fails.
    pub fn extract(&self, image: &Mat) -> Result<DescriptorSet> {
        let mut gray = Mat::default();
        cvt_color(
            image,
            &mut gray,
            COLOR_BGR2GRAY,
            0,
        )
        .map_err(|e| SearchError::opencv("grayscale conversion", e))?;

        let mut orb = ORB::create(
            self.max_features,
            SCALE_FACTOR,
            PYRAMID_LEVELS,
            EDGE_THRESHOLD,
            0,
            2,
            ORB_ScoreType::HARRIS_SCORE,
            PATCH_SIZE,
            self.fast_threshold,
        )
        .map_err(|e| SearchError::opencv("ORB construction", e))?;

        let mut keypoints = Vector::<KeyPoint>::new();
        let mut descriptors = Mat::default();
        orb.detect_and_compute(
            &gray,
            &no_array(),
            &mut keypoints,
            &mut descriptors,
            false,
        )
        .map_err(|e| SearchError::opencv("ORB detect and compute", e))?;

        if descriptors.empty() {
            return Ok(DescriptorSet::empty());
        }

        Ok(DescriptorSet::from_mat(descriptors))
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

    fn noise_mat(seed: u64, rows: i32, cols: i32) -> Mat {
        let mut data = vec![0u8; (rows * cols * 3) as usize];
        let mut state = seed;
        for byte in data.iter_mut() {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *byte = (state >> 33) as u8;
        }
        Mat::from_slice(&data)
            .unwrap()
            .reshape(3, rows)
            .unwrap()
            .try_clone()
            .unwrap()
    }

    #[test]
    fn test_descriptor_set_empty_state() {
        let set = DescriptorSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_extract_textureless_image_yields_empty_set() {
        let image = solid_mat(200, 200, (0.0, 0.0, 255.0));
        let set = OrbExtractor::new().extract(&image).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_extract_textured_image_yields_descriptors() {
        let image = noise_mat(42, 256, 256);
        let set = OrbExtractor::new().extract(&image).unwrap();
        assert!(!set.is_empty());
        assert_eq!(set.as_mat().cols(), 32);
    }

    #[test]
    fn test_extract_respects_feature_cap() {
        let config = FeatureConfig {
            max_features: 50,
            fast_threshold: FAST_THRESHOLD,
        };
        let image = noise_mat(7, 256, 256);
        let set = OrbExtractor::with_config(&config).extract(&image).unwrap();
        assert!(set.len() <= 50);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let image = noise_mat(99, 128, 128);
        let extractor = OrbExtractor::new();
        let a = extractor.extract(&image).unwrap();
        let b = extractor.extract(&image).unwrap();
        assert_eq!(a.len(), b.len());
    }
}
