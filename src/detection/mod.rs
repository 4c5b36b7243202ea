//! Subject isolation module
//!
//! This module handles the computer vision task of separating a photographed
//! item from background clutter before feature extraction and color
//! profiling.

pub mod subject;

pub use subject::{CroppedImage, SubjectCropper};
