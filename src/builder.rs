//! Fluent construction of a [`Graph`]
//!
//! [`Graph::build`] is the whole API for callers that already hold a slice
//! of sites; the builder adds incremental site collection and validated
//! bounds on top of it.

use crate::error::{Result, VoronoiError};
use crate::geometry::Vertex;
use crate::graph::Graph;

/// Builder for computing a [`Graph`] with validation
///
/// # Example
///
/// ```rust
/// use fortune_voronoi::{Vertex, VoronoiBuilder};
///
/// let graph = VoronoiBuilder::new()
///     .bounds(100.0, 100.0)
///     .unwrap()
///     .site(Vertex::new(25.0, 50.0))
///     .site(Vertex::new(75.0, 50.0))
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.cells().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VoronoiBuilder {
    sites: Vec<Vertex>,
    x_bound: f64,
    y_bound: f64,
}

impl VoronoiBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - bounds: the unit square, `1.0 x 1.0`
    /// - sites: empty
    pub fn new() -> Self {
        Self {
            sites: Vec::new(),
            x_bound: 1.0,
            y_bound: 1.0,
        }
    }

    /// Set the clipping rectangle to `[0, x_bound] x [0, y_bound]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidBounds` if either dimension is non-positive or
    /// non-finite.
    pub fn bounds(mut self, x_bound: f64, y_bound: f64) -> Result<Self> {
        if !x_bound.is_finite() || !y_bound.is_finite() || x_bound <= 0.0 || y_bound <= 0.0 {
            return Err(VoronoiError::InvalidBounds(format!(
                "expected positive finite dimensions, got {}x{}",
                x_bound, y_bound
            )));
        }
        self.x_bound = x_bound;
        self.y_bound = y_bound;
        Ok(self)
    }

    /// Add a single site
    pub fn site(mut self, site: Vertex) -> Self {
        self.sites.push(site);
        self
    }

    /// Add every site from an iterator
    pub fn sites<I>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = Vertex>,
    {
        self.sites.extend(sites);
        self
    }

    /// Compute the diagram
    ///
    /// # Errors
    ///
    /// Returns `InvalidSite` if any collected site has a NaN or infinite
    /// coordinate.
    pub fn build(self) -> Result<Graph> {
        Graph::build(&self.sites, self.x_bound, self.y_bound)
    }
}

impl Default for VoronoiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let graph = VoronoiBuilder::new().build().unwrap();
        assert_eq!(graph.bounds(), (1.0, 1.0));
        assert!(graph.cells().is_empty());
    }

    #[test]
    fn test_builder_collects_sites() {
        let graph = VoronoiBuilder::new()
            .bounds(100.0, 100.0)
            .unwrap()
            .site(Vertex::new(25.0, 50.0))
            .sites([Vertex::new(75.0, 25.0), Vertex::new(75.0, 75.0)])
            .build()
            .unwrap();

        assert_eq!(graph.sites().len(), 3);
        assert_eq!(graph.cells().len(), 3);
    }

    #[test]
    fn test_builder_invalid_bounds() {
        assert!(VoronoiBuilder::new().bounds(0.0, 100.0).is_err());
        assert!(VoronoiBuilder::new().bounds(100.0, -1.0).is_err());
        assert!(VoronoiBuilder::new().bounds(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn test_builder_invalid_site() {
        let result = VoronoiBuilder::new()
            .site(Vertex::new(f64::INFINITY, 0.5))
            .build();
        assert!(result.is_err());
    }
}
