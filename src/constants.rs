//! Empirical constants for the matching pipeline
//!
//! Every tuned value used by the pipeline lives here with a name and a doc
//! comment. These numbers encode behavior inherited from the production
//! matcher; they are defaults to override through [`SearchConfig`], not
//! values to re-derive.
//!
//! [`SearchConfig`]: crate::config::SearchConfig

/// Subject isolation (preprocessing) parameters
pub mod crop {
    /// Gaussian blur kernel side length applied before thresholding (must be odd)
    pub const BLUR_KERNEL_SIZE: i32 = 7;

    /// Binarization threshold ceiling handed to Otsu (value itself is computed)
    pub const THRESHOLD_MAX_VALUE: f64 = 255.0;
}

/// Keypoint extraction parameters
pub mod features {
    /// Maximum number of ORB features retained per image
    pub const MAX_FEATURES: i32 = 1500;

    /// Pyramid decimation ratio between octave levels
    pub const SCALE_FACTOR: f32 = 1.2;

    /// Number of pyramid levels
    pub const PYRAMID_LEVELS: i32 = 8;

    /// Border size where features are not detected, and BRIEF patch size
    pub const EDGE_THRESHOLD: i32 = 31;
    pub const PATCH_SIZE: i32 = 31;

    /// FAST corner detection threshold
    pub const FAST_THRESHOLD: i32 = 20;
}

/// Descriptor matching parameters
pub mod matching {
    /// Lowe ratio: a nearest neighbor only counts when its distance is below
    /// this fraction of the second-nearest distance
    pub const RATIO_THRESHOLD: f64 = 0.75;

    /// Good-match count treated as a saturated (1.0) structural score
    pub const STRONG_MATCH_COUNT: f64 = 200.0;
}

/// Color fingerprint parameters
pub mod histogram {
    /// Canonical square side length images are resized to before profiling
    pub const CANONICAL_SIZE: i32 = 256;

    /// Histogram bin counts over the hue and saturation channels
    pub const HUE_BINS: i32 = 50;
    pub const SATURATION_BINS: i32 = 50;

    /// OpenCV 8-bit HSV channel ranges: hue in [0,180), saturation in [0,256)
    pub const HUE_RANGE: [f32; 2] = [0.0, 180.0];
    pub const SATURATION_RANGE: [f32; 2] = [0.0, 256.0];
}

/// Score fusion parameters
pub mod fusion {
    /// Weight of the keypoint (structural) similarity component
    pub const STRUCTURAL_WEIGHT: f64 = 0.6;

    /// Weight of the color histogram similarity component
    pub const COLOR_WEIGHT: f64 = 0.4;

    /// Decimal digits the fused score is rounded to
    pub const SCORE_DECIMALS: u32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fusion_weights_sum_to_one() {
        assert!((fusion::STRUCTURAL_WEIGHT + fusion::COLOR_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_threshold_rejects_ambiguous_matches() {
        assert!(matching::RATIO_THRESHOLD > 0.0 && matching::RATIO_THRESHOLD < 1.0);
    }

    #[test]
    fn test_blur_kernel_is_odd() {
        assert_eq!(crop::BLUR_KERNEL_SIZE % 2, 1);
    }

    #[test]
    fn test_histogram_geometry() {
        assert!(histogram::HUE_BINS > 0 && histogram::SATURATION_BINS > 0);
        assert!(histogram::HUE_RANGE[0] < histogram::HUE_RANGE[1]);
        assert!(histogram::SATURATION_RANGE[0] < histogram::SATURATION_RANGE[1]);
    }
}
