//! Descriptor-set comparison via nearest-neighbor ratio testing
//!
//! Compares two descriptor sets with a brute-force Hamming matcher:
//! - Every descriptor in the first set is matched to its two nearest
//!   neighbors in the second
//! - A match counts as "good" only when the nearest distance is below the
//!   ratio threshold times the second-nearest distance, rejecting ambiguous
//!   matches from repetitive texture
//! - The good-match count is normalized against the strong-match constant
//!   and capped at 1.0
//!
//! Algorithm tag: `algo-hamming-ratio-match`

use crate::config::MatchingConfig;
use crate::constants::matching::{RATIO_THRESHOLD, STRONG_MATCH_COUNT};
use crate::error::{Result, SearchError};
use crate::features::DescriptorSet;
use opencv::{
    core::{no_array, DMatch, Vector, NORM_HAMMING},
    features2d::BFMatcher,
    prelude::*,
};

/// Structural similarity scorer over binary descriptor sets
pub struct DescriptorScorer {
    ratio_threshold: f64,
    strong_match_count: f64,
}

impl Default for DescriptorScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorScorer {
    /// Create a scorer with default parameters
    pub fn new() -> Self {
        Self {
            ratio_threshold: RATIO_THRESHOLD,
            strong_match_count: STRONG_MATCH_COUNT,
        }
    }

    /// Create a scorer from configuration
    pub fn with_config(config: &MatchingConfig) -> Self {
        Self {
            ratio_threshold: config.ratio_threshold,
            strong_match_count: config.strong_match_count,
        }
    }

    /// Score the structural similarity of two descriptor sets
    ///
    /// # Arguments
    ///
    /// * `query` - Descriptors from the query image
    /// * `candidate` - Descriptors from a corpus image
    ///
    /// # Returns
    ///
    /// A score in [0,1]. Either side being empty is defined as 0.0; the
    /// matcher is not invoked in that case.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::OpenCv` if brute-force matching fails.
    pub fn structural_score(
        &self,
        query: &DescriptorSet,
        candidate: &DescriptorSet,
    ) -> Result<f64> {
        if query.is_empty() || candidate.is_empty() {
            return Ok(0.0);
        }

        let matcher = BFMatcher::create(NORM_HAMMING, false)
            .map_err(|e| SearchError::opencv("matcher construction", e))?;

        let mut matches = Vector::<Vector<DMatch>>::new();
        matcher
            .knn_train_match(
                query.as_mat(),
                candidate.as_mat(),
                &mut matches,
                2,
                &no_array(),
                false,
            )
            .map_err(|e| SearchError::opencv("kNN descriptor match", e))?;

        let mut good = 0usize;
        for pair in matches.iter() {
            // The candidate set may be too small for two neighbors
            if pair.len() != 2 {
                continue;
            }
            let best = pair
                .get(0)
                .map_err(|e| SearchError::opencv("match access", e))?;
            let second = pair
                .get(1)
                .map_err(|e| SearchError::opencv("match access", e))?;
            if f64::from(best.distance) < self.ratio_threshold * f64::from(second.distance) {
                good += 1;
            }
        }

        Ok((good as f64 / self.strong_match_count).min(1.0))
    }
}
