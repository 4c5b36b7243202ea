//! Configuration structures for the photomatch search pipeline.
//!
//! This module defines all tunable parameters for similarity search,
//! organized into logical groups for subject isolation, feature extraction,
//! descriptor matching, color profiling, and score fusion.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use photomatch::SearchConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = SearchConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = SearchConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`CropConfig`]: subject isolation before scoring
//! - [`FeatureConfig`]: ORB keypoint extraction
//! - [`MatchingConfig`]: nearest-neighbor ratio test and normalization
//! - [`HistogramConfig`]: hue/saturation fingerprint geometry
//! - [`FusionConfig`]: component weighting and rounding

use crate::constants;
use serde::{Deserialize, Serialize};

/// Complete search pipeline configuration.
///
/// Contains all parameters needed to score a corpus against a query image.
/// Can be serialized to/from JSON for reproducible experiments. The defaults
/// reproduce the production matcher's tuned behavior exactly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Subject isolation configuration
    pub crop: CropConfig,

    /// Keypoint extraction configuration
    pub features: FeatureConfig,

    /// Descriptor matching configuration
    pub matching: MatchingConfig,

    /// Color fingerprint configuration
    pub histogram: HistogramConfig,

    /// Score fusion configuration
    pub fusion: FusionConfig,
}

/// Subject isolation parameters applied before feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    /// Gaussian blur kernel side length (must be odd)
    pub blur_kernel_size: i32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: constants::crop::BLUR_KERNEL_SIZE,
        }
    }
}

/// ORB keypoint extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Maximum number of features retained per image
    pub max_features: i32,

    /// FAST corner detection threshold
    pub fast_threshold: i32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: constants::features::MAX_FEATURES,
            fast_threshold: constants::features::FAST_THRESHOLD,
        }
    }
}

/// Descriptor matching parameters.
///
/// Controls the nearest-neighbor ratio test and how a good-match count is
/// normalized into a [0,1] structural score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Lowe ratio threshold (0.0-1.0)
    pub ratio_threshold: f64,

    /// Good-match count that saturates the structural score at 1.0
    pub strong_match_count: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: constants::matching::RATIO_THRESHOLD,
            strong_match_count: constants::matching::STRONG_MATCH_COUNT,
        }
    }
}

/// Color fingerprint parameters.
///
/// Controls the canonical resize and the hue/saturation histogram geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Canonical square side length for the pre-histogram resize
    pub canonical_size: i32,

    /// Hue bin count
    pub hue_bins: i32,

    /// Saturation bin count
    pub saturation_bins: i32,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            canonical_size: constants::histogram::CANONICAL_SIZE,
            hue_bins: constants::histogram::HUE_BINS,
            saturation_bins: constants::histogram::SATURATION_BINS,
        }
    }
}

/// Score fusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Weight of the structural (keypoint) component
    pub structural_weight: f64,

    /// Weight of the color (histogram) component
    pub color_weight: f64,

    /// Decimal digits the fused score is rounded to
    pub score_decimals: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            structural_weight: constants::fusion::STRUCTURAL_WEIGHT,
            color_weight: constants::fusion::COLOR_WEIGHT,
            score_decimals: constants::fusion::SCORE_DECIMALS,
        }
    }
}

impl SearchConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
