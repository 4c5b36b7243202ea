//! Score fusion and ranking module
//!
//! Orchestrates the full pipeline for one search request: query
//! preparation, per-candidate scoring, weighted score fusion, and the final
//! stable ordering.

pub mod ranker;

pub use ranker::{CancelToken, RankedMatch, RankedResult, Searcher};
