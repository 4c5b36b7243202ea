//! Color distribution profiling module
//!
//! This module reduces an image to a hue/saturation histogram fingerprint
//! and compares fingerprints by correlation.

pub mod histogram;

pub use histogram::{ColorFingerprint, ColorProfiler};
