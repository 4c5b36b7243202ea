//! Corpus accessor boundary
//!
//! The searcher only requires a finite sequence of readable image resources;
//! where those come from (a directory of uploaded found-item photos, a test
//! fixture, an application-managed store) is the caller's concern. The corpus
//! is treated as a read-only snapshot per search: nothing here mutates or
//! caches it.

use crate::error::Result;
use crate::image_loader;
use opencv::core::Mat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// A single candidate image offered by a corpus
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    /// Stable identifier reported back in the ranking (typically the path)
    pub id: String,
    /// Where the pixel data comes from
    pub image: CandidateImage,
}

/// Candidate pixel data, decoded lazily by the searcher
#[derive(Debug, Clone)]
pub enum CandidateImage {
    /// Decode from disk at scoring time
    Path(PathBuf),
    /// Already-decoded BGR buffer, shared rather than copied per search
    Decoded(Arc<Mat>),
}

impl CandidateImage {
    /// Decode into a shared BGR Mat
    ///
    /// Pre-decoded candidates hand out the same underlying buffer; only the
    /// `Path` variant touches the filesystem.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::ImageLoad` for unreadable or corrupt files. The
    /// searcher treats this as exclusion of the single candidate, never as a
    /// fatal error for the whole ranking pass.
    pub(crate) fn decode(&self) -> Result<Arc<Mat>> {
        match self {
            CandidateImage::Path(path) => image_loader::load_image(path).map(Arc::new),
            CandidateImage::Decoded(mat) => Ok(Arc::clone(mat)),
        }
    }
}

/// Source of candidate images for one search request
pub trait CorpusSource {
    /// Enumerate all candidates available to this search
    ///
    /// The returned order is the corpus enumeration order used for breaking
    /// score ties, so implementations should make it deterministic.
    fn candidates(&self) -> Result<Vec<CandidateRecord>>;
}

/// Corpus backed by a directory tree of image files
///
/// Walks the tree recursively and keeps files with a supported photographic
/// extension (jpg/jpeg/png, case-insensitive). Candidates are sorted by path
/// so the enumeration order is reproducible across filesystems.
pub struct DirectoryCorpus {
    root: PathBuf,
}

impl DirectoryCorpus {
    /// Create a corpus over the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn has_supported_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(image_loader::is_supported_extension)
    }
}

impl CorpusSource for DirectoryCorpus {
    fn candidates(&self) -> Result<Vec<CandidateRecord>> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Self::has_supported_extension(path))
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|path| CandidateRecord {
                id: path.to_string_lossy().into_owned(),
                image: CandidateImage::Path(path),
            })
            .collect())
    }
}

/// Corpus backed by already-decoded images
///
/// Useful for embedding the searcher in an application that manages its own
/// storage, and for tests.
pub struct InMemoryCorpus {
    records: Vec<CandidateRecord>,
}

impl InMemoryCorpus {
    /// Create a corpus from pre-built candidate records
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    /// Create a corpus from (identifier, decoded image) pairs
    pub fn from_images(images: Vec<(String, Mat)>) -> Self {
        Self {
            records: images
                .into_iter()
                .map(|(id, mat)| CandidateRecord {
                    id,
                    image: CandidateImage::Decoded(Arc::new(mat)),
                })
                .collect(),
        }
    }
}

impl CorpusSource for InMemoryCorpus {
    fn candidates(&self) -> Result<Vec<CandidateRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn write_png(path: &Path) {
        image::RgbImage::from_pixel(8, 8, image::Rgb([255, 0, 0]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_directory_corpus_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("wallets");
        std::fs::create_dir(&nested).unwrap();

        write_png(&dir.path().join("b.png"));
        write_png(&nested.join("a.png"));
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        std::fs::write(dir.path().join("thumbs.db"), b"junk").unwrap();

        let corpus = DirectoryCorpus::new(dir.path());
        let candidates = corpus.candidates().unwrap();

        assert_eq!(candidates.len(), 2);
        // Sorted by full path: b.png at the root precedes wallets/a.png
        assert!(candidates[0].id.ends_with("b.png"));
        assert!(candidates[1].id.ends_with("a.png"));
    }

    #[test]
    fn test_directory_corpus_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = DirectoryCorpus::new(dir.path());
        assert!(corpus.candidates().unwrap().is_empty());
    }

    #[test]
    fn test_directory_corpus_missing_directory() {
        let corpus = DirectoryCorpus::new("/nonexistent/found/items");
        // A missing root yields no candidates rather than an error
        assert!(corpus.candidates().unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_corpus_preserves_order() {
        let mat =
            Mat::new_rows_cols_with_default(4, 4, CV_8UC3, Scalar::new(0.0, 0.0, 255.0, 0.0))
                .unwrap();
        let corpus = InMemoryCorpus::from_images(vec![
            ("first".to_string(), mat.clone()),
            ("second".to_string(), mat),
        ]);

        let candidates = corpus.candidates().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "first");
        assert_eq!(candidates[1].id, "second");
    }

    #[test]
    fn test_in_memory_corpus_shares_pixel_buffers() {
        use opencv::prelude::*;

        let mat =
            Mat::new_rows_cols_with_default(16, 16, CV_8UC3, Scalar::new(0.0, 255.0, 0.0, 0.0))
                .unwrap();
        let data_ptr = mat.data();

        let corpus = InMemoryCorpus::from_images(vec![("only".to_string(), mat)]);

        // Enumerating and decoding must not copy the pixel buffer
        let candidates = corpus.candidates().unwrap();
        let decoded = candidates[0].image.decode().unwrap();
        assert_eq!(decoded.data(), data_ptr);
    }
}
