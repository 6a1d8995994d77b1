//! Error types for divergir

use thiserror::Error;

/// Result type alias for divergir operations
pub type Result<T> = std::result::Result<T, DivergirError>;

/// Errors that can occur while computing metrics
#[derive(Error, Debug)]
pub enum DivergirError {
    /// Malformed or missing CLI arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tile and mask vectors disagree on dimensionality
    #[error("Dimension mismatch: tile has {tile} dimensions, mask has {mask}")]
    DimensionMismatch {
        /// Tile vector length
        tile: usize,
        /// Mask vector length
        mask: usize,
    },

    /// Zero-length extent vector
    #[error("Empty extent: at least one dimension is required")]
    EmptyExtent,

    /// Non-positive block, domain, or warp-size value
    #[error("Invalid extent: {name} must be a positive integer, got {value}")]
    InvalidExtent {
        /// Which argument was rejected
        name: &'static str,
        /// The offending value
        value: i64,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
