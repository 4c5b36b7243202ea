//! Keypoint feature extraction and matching module
//!
//! This module produces compact binary descriptors for salient image regions
//! and turns descriptor-set comparisons into a structural similarity score.

pub mod matching;
pub mod orb;

pub use matching::DescriptorScorer;
pub use orb::{DescriptorSet, OrbExtractor};
