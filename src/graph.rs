//! Output data model and the top-level build driver
//!
//! A [`Graph`] owns the three read-only sequences callers consume: sites
//! (sorted, each pointing at its cell), edges (every retained edge with two
//! defined endpoints) and cells (closed boundaries of ordered half-edges).
//! It is assembled once by [`Graph::build`] and immutable afterwards.

use std::cmp::Ordering;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::{Vertex, UNDEFINED};

/// An input point that owns a Voronoi cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Position of the site
    pub point: Vertex,
    /// Index into [`Graph::cells`], or `None` if the site ended up without
    /// a usable cell (duplicate site, or a degenerate/fully clipped cell)
    pub cell: Option<usize>,
}

/// A full edge separating two sites (or a synthesized border segment)
///
/// Orientation invariant: traversing `p0 -> p1` keeps `left_site` on the
/// left.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Site on the left of `p0 -> p1`
    pub left_site: usize,
    /// Site on the right, `None` for border edges along the rectangle
    pub right_site: Option<usize>,
    /// Start point, [`UNDEFINED`](crate::geometry::UNDEFINED) until computed
    pub p0: Vertex,
    /// End point, [`UNDEFINED`](crate::geometry::UNDEFINED) until computed
    pub p1: Vertex,
}

impl Edge {
    fn new(left_site: usize, right_site: usize) -> Self {
        Self {
            left_site,
            right_site: Some(right_site),
            p0: UNDEFINED,
            p1: UNDEFINED,
        }
    }

    /// Record `vertex` as the start point of the transition from
    /// `left_site` to `right_site`
    ///
    /// The first assignment also fixes the edge's orientation; a second
    /// assignment from the mirrored transition fills the other endpoint.
    pub(crate) fn set_start_point(&mut self, left_site: usize, right_site: usize, vertex: Vertex) {
        if !crate::geometry::is_defined(self.p0) && !crate::geometry::is_defined(self.p1) {
            self.p0 = vertex;
            self.left_site = left_site;
            self.right_site = Some(right_site);
        } else if self.left_site == right_site {
            self.p1 = vertex;
        } else {
            self.p0 = vertex;
        }
    }

    pub(crate) fn set_end_point(&mut self, left_site: usize, right_site: usize, vertex: Vertex) {
        self.set_start_point(right_site, left_site, vertex);
    }
}

/// An edge as seen from one of its two bounding sites
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// The owning site
    pub site: usize,
    /// Index into [`Graph::edges`]
    pub edge: usize,
    /// Polar angle of the edge as seen from the site; cells sort their
    /// half-edges by descending angle for a consistent winding
    pub angle: f64,
}

/// A site's closed boundary as an ordered sequence of half-edges
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// The site this cell belongs to
    pub site: usize,
    /// Boundary half-edges in consistent winding order
    pub half_edges: Vec<HalfEdge>,
    /// Transient closing-pass flag, always false once `build` returns
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) close_me: bool,
}

impl Cell {
    fn new(site: usize) -> Self {
        Self {
            site,
            half_edges: Vec::new(),
            close_me: false,
        }
    }
}

/// A Voronoi cell graph computed from a collection of sites
///
/// # Example
///
/// ```
/// use fortune_voronoi::{Graph, Vertex};
///
/// let sites = [Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0)];
/// let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
///
/// assert_eq!(graph.cells().len(), 2);
/// for cell in graph.cells() {
///     assert!(cell.half_edges.len() >= 3);
/// }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub(crate) sites: Vec<Site>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) x_bound: f64,
    pub(crate) y_bound: f64,
}

impl Graph {
    /// Compute the Voronoi diagram of `sites`, clipped to
    /// `[0, x_bound] x [0, y_bound]`
    ///
    /// Sites are sorted ascending by `(y, x)` before the sweep; the
    /// returned [`sites`](Graph::sites) sequence is in that order, each
    /// entry carrying its final cell index. Sites outside the rectangle
    /// still shape the diagram but their own cells may be clipped away.
    ///
    /// Degenerate input (duplicates, collinear runs, empty input) never
    /// fails; the affected sites simply end up with `cell == None`.
    /// Rebuilding from the same input yields a bit-identical graph.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBounds` for non-positive or non-finite bounds, and
    /// `InvalidSite` for a NaN or infinite site coordinate.
    pub fn build(sites: &[Vertex], x_bound: f64, y_bound: f64) -> Result<Graph> {
        if !x_bound.is_finite() || !y_bound.is_finite() || x_bound <= 0.0 || y_bound <= 0.0 {
            return Err(VoronoiError::InvalidBounds(format!(
                "expected positive finite dimensions, got {}x{}",
                x_bound, y_bound
            )));
        }
        for (index, point) in sites.iter().enumerate() {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(VoronoiError::InvalidSite(index));
            }
        }

        let mut ordered: Vec<Site> = sites
            .iter()
            .map(|&point| Site { point, cell: None })
            .collect();
        ordered.sort_unstable_by(|a, b| {
            (a.point.y, a.point.x)
                .partial_cmp(&(b.point.y, b.point.x))
                .unwrap_or(Ordering::Equal)
        });

        let mut graph = Graph {
            sites: ordered,
            // capacity hints only; a diagram of n sites has O(n) of each
            edges: Vec::with_capacity(sites.len() * 2),
            cells: Vec::with_capacity(sites.len()),
            x_bound,
            y_bound,
        };

        debug!(
            "building voronoi graph: {} sites, bounds {}x{}",
            graph.sites.len(),
            x_bound,
            y_bound
        );
        crate::sweep::run(&mut graph);
        graph.finish();
        debug!(
            "voronoi graph done: {} edges, {} cells",
            graph.edges.len(),
            graph.cells.len()
        );
        Ok(graph)
    }

    /// The input sites sorted by `(y, x)`, each with its final cell index
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Every retained edge; both endpoints are always defined and inside
    /// the bounding rectangle
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// One cell per site that ended up with a non-degenerate closed
    /// boundary
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The clipping rectangle as `(x_bound, y_bound)`
    #[inline]
    pub fn bounds(&self) -> (f64, f64) {
        (self.x_bound, self.y_bound)
    }

    /// Start point of a half-edge, as traversed around its cell
    #[inline]
    pub fn half_edge_start(&self, half_edge: &HalfEdge) -> Vertex {
        let edge = &self.edges[half_edge.edge];
        if edge.left_site == half_edge.site {
            edge.p0
        } else {
            edge.p1
        }
    }

    /// End point of a half-edge, as traversed around its cell
    #[inline]
    pub fn half_edge_end(&self, half_edge: &HalfEdge) -> Vertex {
        let edge = &self.edges[half_edge.edge];
        if edge.left_site == half_edge.site {
            edge.p1
        } else {
            edge.p0
        }
    }

    /// The cell's boundary polygon: the ordered start points of its
    /// half-edges
    pub fn cell_polygon(&self, cell: &Cell) -> Vec<Vertex> {
        cell.half_edges
            .iter()
            .map(|half_edge| self.half_edge_start(half_edge))
            .collect()
    }

    /// Register a cell for `site` and point the site at it
    pub(crate) fn create_cell(&mut self, site: usize) {
        self.sites[site].cell = Some(self.cells.len());
        self.cells.push(Cell::new(site));
    }

    /// Append a new edge separating `left_site` and `right_site`, with
    /// optional seed endpoints
    pub(crate) fn create_edge(
        &mut self,
        left_site: usize,
        right_site: usize,
        va: Option<Vertex>,
        vb: Option<Vertex>,
    ) -> usize {
        let index = self.edges.len();
        let mut edge = Edge::new(left_site, right_site);
        if let Some(va) = va {
            edge.set_start_point(left_site, right_site, va);
        }
        if let Some(vb) = vb {
            edge.set_end_point(left_site, right_site, vb);
        }
        self.edges.push(edge);
        index
    }

    /// Append a synthesized border edge owned by `site` alone
    pub(crate) fn create_border_edge(&mut self, site: usize, va: Vertex, vb: Vertex) -> usize {
        let index = self.edges.len();
        self.edges.push(Edge {
            left_site: site,
            right_site: None,
            p0: va,
            p1: vb,
        });
        index
    }

    /// Wrap `edge` as a half-edge owned by `left_site`
    pub(crate) fn make_half_edge(
        &self,
        edge: usize,
        left_site: usize,
        right_site: Option<usize>,
    ) -> HalfEdge {
        let angle = match right_site {
            // interior edge: angle of the direction toward the neighbor
            Some(right_site) => {
                let l = self.sites[left_site].point;
                let r = self.sites[right_site].point;
                (r.y - l.y).atan2(r.x - l.x)
            }
            // border edge: perpendicular of the edge direction, oriented
            // to look away from the owning site
            None => {
                let e = &self.edges[edge];
                if e.left_site == left_site {
                    (e.p1.x - e.p0.x).atan2(e.p0.y - e.p1.y)
                } else {
                    (e.p0.x - e.p1.x).atan2(e.p1.y - e.p0.y)
                }
            }
        };
        HalfEdge {
            site: left_site,
            edge,
            angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::same_vertex;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_sites(count: usize, bound: f64, seed: u64) -> Vec<Vertex> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| Vertex::new(rng.gen_range(0.0..bound), rng.gen_range(0.0..bound)))
            .collect()
    }

    /// Every cell's half-edges must chain end-to-start under exact
    /// floating-point equality.
    fn assert_cells_closed(graph: &Graph) {
        for cell in graph.cells() {
            let n = cell.half_edges.len();
            assert!(n >= 3, "cell for site {} has {} half-edges", cell.site, n);
            for i in 0..n {
                let end = graph.half_edge_end(&cell.half_edges[i]);
                let start = graph.half_edge_start(&cell.half_edges[(i + 1) % n]);
                assert!(
                    same_vertex(end, start),
                    "cell for site {} is open between half-edges {} and {}",
                    cell.site,
                    i,
                    (i + 1) % n
                );
            }
        }
    }

    fn assert_edges_in_bounds(graph: &Graph) {
        let (xb, yb) = graph.bounds();
        for edge in graph.edges() {
            for v in [edge.p0, edge.p1] {
                assert!(crate::geometry::is_defined(v));
                assert!(v.x >= 0.0 && v.x <= xb, "x out of bounds: {}", v.x);
                assert!(v.y >= 0.0 && v.y <= yb, "y out of bounds: {}", v.y);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let graph = Graph::build(&[], 100.0, 100.0).unwrap();
        assert!(graph.sites().is_empty());
        assert!(graph.edges().is_empty());
        assert!(graph.cells().is_empty());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Graph::build(&[], 0.0, 100.0).is_err());
        assert!(Graph::build(&[], 100.0, -1.0).is_err());
        assert!(Graph::build(&[], f64::NAN, 100.0).is_err());
        assert!(Graph::build(&[], 100.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_site() {
        let sites = [Vertex::new(1.0, 1.0), Vertex::new(f64::NAN, 2.0)];
        match Graph::build(&sites, 100.0, 100.0) {
            Err(crate::VoronoiError::InvalidSite(index)) => assert_eq!(index, 1),
            other => panic!("expected InvalidSite, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_single_site_fills_bounds() {
        let graph = Graph::build(&[Vertex::new(50.0, 50.0)], 100.0, 100.0).unwrap();

        assert_eq!(graph.cells().len(), 1);
        let cell = &graph.cells()[0];
        assert_eq!(cell.half_edges.len(), 4);
        assert_eq!(graph.sites()[0].cell, Some(0));
        assert_cells_closed(&graph);

        // the boundary is the bounding rectangle itself
        let mut corners: Vec<(f64, f64)> = graph
            .cell_polygon(cell)
            .iter()
            .map(|v| (v.x, v.y))
            .collect();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            corners,
            vec![(0.0, 0.0), (0.0, 100.0), (100.0, 0.0), (100.0, 100.0)]
        );
    }

    #[test]
    fn test_two_sites_vertical_bisector() {
        let sites = [Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0)];
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();

        assert_eq!(graph.cells().len(), 2);
        assert_cells_closed(&graph);
        assert_edges_in_bounds(&graph);

        // exactly one interior edge: the bisector at x = 50, full height
        let bisectors: Vec<&Edge> = graph
            .edges()
            .iter()
            .filter(|e| e.right_site.is_some())
            .collect();
        assert_eq!(bisectors.len(), 1);
        let bisector = bisectors[0];
        assert_eq!(bisector.p0.x, 50.0);
        assert_eq!(bisector.p1.x, 50.0);
        let mut ys = [bisector.p0.y, bisector.p1.y];
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(ys, [0.0, 100.0]);

        // each cell: the bisector plus three border half-edges
        for cell in graph.cells() {
            assert_eq!(cell.half_edges.len(), 4);
            let border_count = cell
                .half_edges
                .iter()
                .filter(|he| graph.edges()[he.edge].right_site.is_none())
                .count();
            assert_eq!(border_count, 3);
        }
    }

    #[test]
    fn test_duplicate_sites() {
        let sites = [Vertex::new(50.0, 50.0), Vertex::new(50.0, 50.0)];
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();

        // the duplicate gets no cell; the survivor owns the rectangle
        assert_eq!(graph.cells().len(), 1);
        let with_cell = graph.sites().iter().filter(|s| s.cell.is_some()).count();
        assert_eq!(with_cell, 1);
        assert_cells_closed(&graph);
    }

    #[test]
    fn test_collinear_sites() {
        // three collinear sites: must not crash, degenerate cells are
        // allowed but whatever is returned must be well-formed
        let sites = [
            Vertex::new(20.0, 50.0),
            Vertex::new(50.0, 50.0),
            Vertex::new(80.0, 50.0),
        ];
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
        assert!(graph.cells().len() <= 3);
        assert_cells_closed(&graph);
        assert_edges_in_bounds(&graph);
    }

    #[test]
    fn test_site_outside_bounds() {
        let sites = [Vertex::new(50.0, 50.0), Vertex::new(500.0, 500.0)];
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
        // the far site participates but its cell is clipped away
        assert_cells_closed(&graph);
        assert_edges_in_bounds(&graph);
        let outside = graph
            .sites()
            .iter()
            .find(|s| s.point.x > 100.0)
            .expect("outside site is retained in sites()");
        assert_eq!(outside.cell, None);
    }

    #[test]
    fn test_deterministic_rebuild() {
        let sites = random_sites(40, 100.0, 7);
        let a = Graph::build(&sites, 100.0, 100.0).unwrap();
        let b = Graph::build(&sites, 100.0, 100.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_sites_well_formed() {
        for seed in [1u64, 2, 3, 4] {
            let sites = random_sites(60, 100.0, seed);
            let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
            assert_eq!(graph.sites().len(), 60);
            assert!(!graph.cells().is_empty());
            assert_cells_closed(&graph);
            assert_edges_in_bounds(&graph);
        }
    }

    #[test]
    fn test_dense_random_sites_closed() {
        // dense inputs make clipped endpoints land sub-epsilon off the
        // border; every cell must still chain up under exact equality
        for seed in 1u64..=8 {
            let sites = random_sites(400, 100.0, seed);
            let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
            assert_cells_closed(&graph);
            assert_edges_in_bounds(&graph);
        }
    }

    /// Sign of the cross product of `(b - a)` and `(p - a)`.
    fn orient(a: Vertex, b: Vertex, p: Vertex) -> f64 {
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
    }

    /// Strictly-inside test for a convex polygon with unknown winding.
    fn strictly_inside(polygon: &[Vertex], p: Vertex) -> bool {
        let n = polygon.len();
        let mut sign = 0.0f64;
        for i in 0..n {
            let cross = orient(polygon[i], polygon[(i + 1) % n], p);
            if cross.abs() < 1e-9 {
                return false;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_cells_contain_nearest_site() {
        let sites = random_sites(50, 100.0, 11);
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();

        let polygons: Vec<(usize, Vec<Vertex>)> = graph
            .cells()
            .iter()
            .map(|cell| (cell.site, graph.cell_polygon(cell)))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut checked = 0;
        for _ in 0..500 {
            let p = Vertex::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0));
            let nearest = graph
                .sites()
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.point
                        .distance_squared(p)
                        .partial_cmp(&b.point.distance_squared(p))
                        .unwrap()
                })
                .map(|(i, _)| i)
                .unwrap();
            for (site, polygon) in &polygons {
                if strictly_inside(polygon, p) {
                    let d_cell = graph.sites()[*site].point.distance_squared(p);
                    let d_near = graph.sites()[nearest].point.distance_squared(p);
                    assert!(
                        d_cell <= d_near + 1e-9,
                        "point {:?} inside cell of site {} but nearer to site {}",
                        p,
                        site,
                        nearest
                    );
                    checked += 1;
                }
            }
        }
        assert!(checked > 100, "too few samples landed inside cells");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_graph_serialization() {
        let sites = [Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0)];
        let graph = Graph::build(&sites, 100.0, 100.0).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, restored);
    }
}
