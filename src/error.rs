//! Error types for Voronoi diagram construction

use std::fmt;

/// Errors that can occur while setting up a diagram build
///
/// These are construction-time validation failures only. Degenerate
/// geometry (duplicate sites, collinear sites, empty input) is never an
/// error: [`Graph::build`](crate::Graph::build) always returns a
/// well-formed, possibly empty graph for such input.
#[derive(Debug, Clone)]
pub enum VoronoiError {
    /// Bounding rectangle dimensions were non-positive or non-finite
    InvalidBounds(String),
    /// A site carried a NaN or infinite coordinate (index into the input)
    InvalidSite(usize),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidBounds(msg) => write!(f, "invalid bounds: {}", msg),
            VoronoiError::InvalidSite(index) => {
                write!(f, "site {} has a non-finite coordinate", index)
            }
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
