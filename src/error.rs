//! Error types for the photomatch library

use thiserror::Error;

/// Result type alias for photomatch operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for similarity search operations
///
/// Per-candidate failures never surface here: an unreadable corpus image is
/// excluded from the ranking and degraded extraction results show up only as
/// a zero score component. These variants cover the failures that abort a
/// whole search request, most importantly an unusable query image.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// OpenCV operation failed
    #[error("OpenCV error during {operation}")]
    OpenCv {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },

    /// Generic processing error
    #[error("Processing error: {0}")]
    Processing(String),

    /// Invalid configuration or input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Search was cancelled through its [`CancelToken`](crate::search::CancelToken)
    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCv {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            SearchError::ImageLoad { .. } => {
                "Could not read the photo. Please upload a valid JPEG or PNG image.".to_string()
            }
            SearchError::Cancelled => "The search was cancelled.".to_string(),
            _ => "Image matching failed. Please try again with a different photo.".to_string(),
        }
    }
}
