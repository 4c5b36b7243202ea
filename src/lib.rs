//! # photomatch
//!
//! A Rust crate for content-based similarity search over lost & found item
//! photos.
//!
//! Given a query photo of a lost item, the library ranks a corpus of stored
//! "found item" photos by visual similarity so a human can confirm a match.
//! The approach is deliberately classical:
//! - Isolating the photographed item from background clutter (Otsu
//!   thresholding and bounding-box crop)
//! - ORB binary keypoint descriptors with a nearest-neighbor ratio test
//! - A hue/saturation histogram fingerprint compared by correlation
//! - Weighted fusion of both similarity components into one ranking score
//!
//! ## Example
//!
//! ```rust,no_run
//! use photomatch::search_found_items;
//! use std::path::Path;
//!
//! let results = search_found_items(Path::new("lost/phone.jpg"), Path::new("uploads/found"))?;
//! for found in results.top(9) {
//!     println!("{} · {:.0}% confidence", found.id, found.score * 100.0);
//! }
//! # Ok::<(), photomatch::SearchError>(())
//! ```

use std::path::Path;

pub mod color;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod detection;
pub mod error;
pub mod features;
pub mod image_loader;
pub mod search;

pub use color::{ColorFingerprint, ColorProfiler};
pub use config::SearchConfig;
pub use corpus::{CandidateImage, CandidateRecord, CorpusSource, DirectoryCorpus, InMemoryCorpus};
pub use detection::{CroppedImage, SubjectCropper};
pub use error::{Result, SearchError};
pub use features::{DescriptorScorer, DescriptorSet, OrbExtractor};
pub use search::{CancelToken, RankedMatch, RankedResult, Searcher};

/// Search a directory of found-item photos for matches to a query photo
///
/// This is the main entry point for applications that keep their corpus on
/// disk. It loads and prepares the query image, then ranks every readable
/// image under `corpus_dir` with the default configuration.
///
/// # Arguments
///
/// * `query_path` - Path to the query (lost item) photo
/// * `corpus_dir` - Directory tree of stored found-item photos
///
/// # Returns
///
/// A [`RankedResult`] ordered best match first
///
/// # Errors
///
/// Returns `SearchError` only when the query image itself cannot be loaded;
/// unreadable corpus entries are excluded silently and an empty corpus
/// yields an empty result.
pub fn search_found_items(query_path: &Path, corpus_dir: &Path) -> Result<RankedResult> {
    let query = image_loader::load_image(query_path)?;
    let corpus = DirectoryCorpus::new(corpus_dir);
    Searcher::new().search(&query, &corpus)
}
