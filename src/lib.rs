//! Fortune's sweep-line Voronoi diagrams clipped to a bounding rectangle
//!
//! A standalone library for computing the Voronoi tessellation of a set of
//! 2D points, returning closed per-site cell polygons suitable for
//! rendering, spatial partitioning or map generation.
//!
//! # Quick Start
//!
//! ```rust
//! use fortune_voronoi::*;
//!
//! let sites = [
//!     Vertex::new(20.0, 30.0),
//!     Vertex::new(70.0, 25.0),
//!     Vertex::new(50.0, 80.0),
//! ];
//! let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
//!
//! for cell in graph.cells() {
//!     let polygon = graph.cell_polygon(cell);
//!     println!("site {} has {} corners", cell.site, polygon.len());
//! }
//! ```
//!
//! The coordinate system is y-down: the rectangle spans `[0, x_bound]` by
//! `[0, y_bound]` with the origin in the top-left corner. Cell half-edges
//! wind consistently (clockwise in this system).
//!
//! # Features
//!
//! - `serde`: Enables serialization support for the computed graph

// Modules
pub mod error;
pub mod geometry;
pub mod graph;
pub mod builder;

mod clip;
mod rbtree;
mod sweep;

// Re-export core types for convenience
pub use builder::VoronoiBuilder;
pub use error::{Result, VoronoiError};
pub use geometry::{is_defined, Vertex, UNDEFINED};
pub use graph::{Cell, Edge, Graph, HalfEdge, Site};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
