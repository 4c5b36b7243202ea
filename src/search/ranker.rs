//! Candidate scoring, score fusion, and ranking
//!
//! One search request is one logical unit of work:
//! - The query image is cropped, descriptor-extracted, and color-profiled once
//! - Every corpus candidate is independently decoded, cropped, extracted,
//!   profiled, and scored against the query
//! - Structural and color components are fused with fixed weights and the
//!   candidates are stably sorted by fused score, descending
//!
//! Candidate scorings share no mutable state, so they run across a rayon
//! worker pool; the only synchronization point is the final collect-then-sort
//! merge. Per-candidate failures follow the documented degradation rules: an
//! undecodable image is excluded, a failed extraction or fingerprint shows up
//! as a zero score component. Only an unusable query aborts the request.
//!
//! Algorithm tag: `algo-weighted-score-fusion`

use crate::color::{ColorFingerprint, ColorProfiler};
use crate::config::SearchConfig;
use crate::corpus::{CandidateRecord, CorpusSource};
use crate::detection::SubjectCropper;
use crate::error::{Result, SearchError};
use crate::features::{DescriptorScorer, DescriptorSet, OrbExtractor};
use opencv::core::Mat;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Request-scoped cancellation handle
///
/// Cloning shares the underlying flag. Cancelling abandons in-flight
/// candidate scoring; the search then returns [`SearchError::Cancelled`]
/// instead of a partial ranking.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the search holding this token
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Relaxed)
    }
}

/// One scored corpus candidate
#[derive(Debug, Clone)]
pub struct RankedMatch {
    /// Candidate identifier as supplied by the corpus
    pub id: String,
    /// Keypoint similarity component in [0,1]
    pub structural: f64,
    /// Color similarity component in [0,1]
    pub color: f64,
    /// Fused score in [0,1], rounded per configuration
    pub score: f64,
    /// Cropped candidate image, ready for result display
    pub image: Mat,
}

/// Full ordering of successfully scored candidates, best first
#[derive(Debug, Clone, Default)]
pub struct RankedResult {
    /// Candidates sorted by fused score descending; ties keep corpus
    /// enumeration order
    pub matches: Vec<RankedMatch>,
    /// Number of candidates the corpus enumerated, including any excluded
    /// for decode failure
    pub corpus_size: usize,
}

impl RankedResult {
    /// The best `k` matches (or fewer, when the ranking is shorter)
    pub fn top(&self, k: usize) -> &[RankedMatch] {
        &self.matches[..self.matches.len().min(k)]
    }

    /// Number of ranked matches
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no candidate survived scoring
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Similarity searcher ranking a corpus against one query image
pub struct Searcher {
    config: SearchConfig,
    cropper: SubjectCropper,
    extractor: OrbExtractor,
    scorer: DescriptorScorer,
    profiler: ColorProfiler,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    /// Create a searcher with default configuration
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    /// Create a searcher from configuration
    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            cropper: SubjectCropper::with_config(&config.crop),
            extractor: OrbExtractor::with_config(&config.features),
            scorer: DescriptorScorer::with_config(&config.matching),
            profiler: ColorProfiler::with_config(&config.histogram),
            config,
        }
    }

    /// Rank a corpus of candidate images against a query image
    ///
    /// # Arguments
    ///
    /// * `query` - Decoded BGR query image
    /// * `corpus` - Read-only snapshot of candidate images
    ///
    /// # Returns
    ///
    /// All successfully scored candidates in descending fused-score order.
    /// An empty corpus yields an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the corpus itself cannot be enumerated;
    /// individual candidate failures are excluded silently.
    pub fn search(&self, query: &Mat, corpus: &dyn CorpusSource) -> Result<RankedResult> {
        self.search_with_cancel(query, corpus, &CancelToken::new())
    }

    /// Rank a corpus, abandoning work when `token` is cancelled
    ///
    /// # Errors
    ///
    /// As [`search`](Self::search), plus `SearchError::Cancelled` when the
    /// token trips before the ranking completes.
    pub fn search_with_cancel(
        &self,
        query: &Mat,
        corpus: &dyn CorpusSource,
        token: &CancelToken,
    ) -> Result<RankedResult> {
        let query_crop = self.cropper.crop(query);
        // A query without texture or with an unprofilable color distribution
        // still searches; the corresponding component is 0 everywhere.
        let query_descriptors = self
            .extractor
            .extract(&query_crop.image)
            .unwrap_or_default();
        let query_fingerprint = self.profiler.fingerprint(&query_crop.image).ok();

        let candidates = corpus.candidates()?;
        let corpus_size = candidates.len();

        let scored: Vec<Option<RankedMatch>> = candidates
            .into_par_iter()
            .map(|record| {
                if token.is_cancelled() {
                    return None;
                }
                self.score_candidate(record, &query_descriptors, query_fingerprint.as_ref())
            })
            .collect();

        if token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        // The parallel collect preserves enumeration order, so the stable
        // sort keeps that order on ties.
        let mut matches: Vec<RankedMatch> = scored.into_iter().flatten().collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Ok(RankedResult {
            matches,
            corpus_size,
        })
    }

    /// Score a single candidate, or exclude it when it cannot be decoded
    fn score_candidate(
        &self,
        record: CandidateRecord,
        query_descriptors: &DescriptorSet,
        query_fingerprint: Option<&ColorFingerprint>,
    ) -> Option<RankedMatch> {
        let image = record.image.decode().ok()?;
        let cropped = self.cropper.crop(&image);

        let descriptors = self.extractor.extract(&cropped.image).unwrap_or_default();
        let structural = self
            .scorer
            .structural_score(query_descriptors, &descriptors)
            .unwrap_or(0.0);

        let color = match (query_fingerprint, self.profiler.fingerprint(&cropped.image).ok()) {
            (Some(query_fp), Some(candidate_fp)) => self
                .profiler
                .color_score(query_fp, &candidate_fp)
                .unwrap_or(0.0),
            _ => 0.0,
        };

        let fused = self.config.fusion.structural_weight * structural
            + self.config.fusion.color_weight * color;
        let score = round_score(fused, self.config.fusion.score_decimals);

        Some(RankedMatch {
            id: record.id,
            structural,
            color,
            score,
            image: cropped.image,
        })
    }
}

/// Round a score to a fixed number of decimal digits
fn round_score(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use opencv::core::{Scalar, CV_8UC3};

    fn solid_mat(rows: i32, cols: i32, bgr: (f64, f64, f64)) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(bgr.0, bgr.1, bgr.2, 0.0))
            .unwrap()
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456, 4), 0.1235);
        assert_eq!(round_score(0.5, 4), 0.5);
        assert_eq!(round_score(0.99995, 4), 1.0);
    }

    #[test]
    fn test_empty_corpus_yields_empty_result() {
        let searcher = Searcher::new();
        let query = solid_mat(64, 64, (0.0, 0.0, 255.0));
        let corpus = InMemoryCorpus::new(Vec::new());

        let result = searcher.search(&query, &corpus).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.corpus_size, 0);
    }

    #[test]
    fn test_textureless_query_scores_color_only() {
        let searcher = Searcher::new();
        let query = solid_mat(64, 64, (0.0, 0.0, 255.0));
        let corpus = InMemoryCorpus::from_images(vec![(
            "duplicate".to_string(),
            solid_mat(64, 64, (0.0, 0.0, 255.0)),
        )]);

        let result = searcher.search(&query, &corpus).unwrap();
        assert_eq!(result.len(), 1);

        let best = &result.matches[0];
        assert_eq!(best.structural, 0.0);
        assert!((best.color - 1.0).abs() < 1e-6);
        // Fused score collapses to the color component alone
        assert_eq!(best.score, round_score(0.4 * best.color, 4));
    }

    #[test]
    fn test_cancelled_token_aborts_search() {
        let searcher = Searcher::new();
        let query = solid_mat(64, 64, (0.0, 0.0, 255.0));
        let corpus = InMemoryCorpus::from_images(vec![(
            "only".to_string(),
            solid_mat(64, 64, (255.0, 0.0, 0.0)),
        )]);

        let token = CancelToken::new();
        token.cancel();

        let result = searcher.search_with_cancel(&query, &corpus, &token);
        assert!(matches!(result, Err(SearchError::Cancelled)));
    }

    #[test]
    fn test_top_clamps_to_result_length() {
        let searcher = Searcher::new();
        let query = solid_mat(64, 64, (0.0, 0.0, 255.0));
        let corpus = InMemoryCorpus::from_images(vec![
            ("a".to_string(), solid_mat(64, 64, (0.0, 0.0, 255.0))),
            ("b".to_string(), solid_mat(64, 64, (255.0, 0.0, 0.0))),
        ]);

        let result = searcher.search(&query, &corpus).unwrap();
        assert_eq!(result.top(10).len(), 2);
        assert_eq!(result.top(1).len(), 1);
    }
}
