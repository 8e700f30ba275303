//! Finishing passes: edge clipping, half-edge assembly, cell closing
//!
//! Once both event streams are exhausted the sweep leaves edges with
//! missing endpoints (open toward the hull). These are connected to the
//! bounding rectangle along their bisector direction, clipped with
//! Liang-Barsky, wrapped into per-cell half-edges sorted by angle, and the
//! remaining boundary gaps are bridged with synthesized border edges along
//! the rectangle perimeter.

use std::cmp::Ordering;

use log::debug;

use crate::geometry::{eq_eps, gt_eps, is_defined, lt_eps, Vertex, EPSILON, UNDEFINED};
use crate::graph::Graph;

impl Graph {
    /// Run all finishing passes after the sweep
    pub(crate) fn finish(&mut self) {
        self.clip_edges();
        self.assemble_half_edges();
        self.close_cells();
        self.prune_cells();
    }

    /// Connect dangling edges to the border, clip everything to the
    /// rectangle, and drop edges left wholly outside or collapsed to a
    /// point
    fn clip_edges(&mut self) {
        let before = self.edges.len();
        for index in 0..self.edges.len() {
            let keep = self.connect_edge(index) && self.clip_edge(index) && {
                // clip intersections are interpolated and can land a few
                // ulps off the rectangle; border-walk vertices use the
                // exact bounds, so endpoints must be snapped onto them
                // for the closure identity checks to hold
                let p0 = self.snap_to_bounds(self.edges[index].p0);
                let p1 = self.snap_to_bounds(self.edges[index].p1);
                self.edges[index].p0 = p0;
                self.edges[index].p1 = p1;
                (p0.x - p1.x).abs() >= EPSILON || (p0.y - p1.y).abs() >= EPSILON
            };
            if !keep {
                self.edges[index].p0 = UNDEFINED;
                self.edges[index].p1 = UNDEFINED;
            }
        }
        self.edges
            .retain(|edge| is_defined(edge.p0) && is_defined(edge.p1));
        if self.edges.len() != before {
            debug!("dropped {} edges during clipping", before - self.edges.len());
        }
    }

    /// Complete an edge with a missing endpoint by intersecting its
    /// bisector line with the bounding rectangle
    ///
    /// Returns false if the edge lies outside the rectangle and should be
    /// discarded.
    fn connect_edge(&mut self, index: usize) -> bool {
        let edge = self.edges[index];
        if is_defined(edge.p1) {
            return true;
        }

        let (xl, xr, yt, yb) = (0.0, self.x_bound, 0.0, self.y_bound);
        let l_site = edge.left_site;
        let r_site = edge.right_site.expect("sweep edges separate two sites");
        let l = self.sites[l_site].point;
        let r = self.sites[r_site].point;
        let fx = (l.x + r.x) / 2.0;
        let fy = (l.y + r.y) / 2.0;

        // whether the edge gets connected or discarded, both cells end at
        // the border and will need closing
        self.mark_close_me(l_site);
        self.mark_close_me(r_site);

        let mut va = edge.p0;
        let vb;
        if r.y == l.y {
            // vertical bisector
            if fx < xl || fx >= xr {
                return false;
            }
            if l.x > r.x {
                // downward
                if !is_defined(va) || va.y < yt {
                    va = Vertex::new(fx, yt);
                } else if va.y >= yb {
                    return false;
                }
                vb = Vertex::new(fx, yb);
            } else {
                // upward
                if !is_defined(va) || va.y > yb {
                    va = Vertex::new(fx, yb);
                } else if va.y < yt {
                    return false;
                }
                vb = Vertex::new(fx, yt);
            }
        } else {
            let fm = (l.x - r.x) / (r.y - l.y);
            let fb = fy - fm * fx;
            if !(-1.0..=1.0).contains(&fm) {
                // closer to vertical than horizontal
                if l.x > r.x {
                    if !is_defined(va) || va.y < yt {
                        va = Vertex::new((yt - fb) / fm, yt);
                    } else if va.y >= yb {
                        return false;
                    }
                    vb = Vertex::new((yb - fb) / fm, yb);
                } else {
                    if !is_defined(va) || va.y > yb {
                        va = Vertex::new((yb - fb) / fm, yb);
                    } else if va.y < yt {
                        return false;
                    }
                    vb = Vertex::new((yt - fb) / fm, yt);
                }
            } else {
                // closer to horizontal than vertical
                if l.y < r.y {
                    if !is_defined(va) || va.x < xl {
                        va = Vertex::new(xl, fm * xl + fb);
                    } else if va.x >= xr {
                        return false;
                    }
                    vb = Vertex::new(xr, fm * xr + fb);
                } else {
                    if !is_defined(va) || va.x > xr {
                        va = Vertex::new(xr, fm * xr + fb);
                    } else if va.x < xl {
                        return false;
                    }
                    vb = Vertex::new(xl, fm * xl + fb);
                }
            }
        }

        self.edges[index].p0 = va;
        self.edges[index].p1 = vb;
        true
    }

    /// Liang-Barsky clipping of the edge segment against the rectangle
    ///
    /// Returns false if the segment lies entirely outside.
    fn clip_edge(&mut self, index: usize) -> bool {
        let edge = self.edges[index];
        let (ax, ay) = (edge.p0.x, edge.p0.y);
        let (bx, by) = (edge.p1.x, edge.p1.y);
        let (xl, xr, yt, yb) = (0.0, self.x_bound, 0.0, self.y_bound);
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        let dx = bx - ax;
        let dy = by - ay;

        // left side
        let q = ax - xl;
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        let r = -q / dx;
        if dx < 0.0 {
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        } else if dx > 0.0 {
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        }

        // right side
        let q = xr - ax;
        if dx == 0.0 && q < 0.0 {
            return false;
        }
        let r = q / dx;
        if dx < 0.0 {
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        } else if dx > 0.0 {
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        }

        // top side
        let q = ay - yt;
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        let r = -q / dy;
        if dy < 0.0 {
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        } else if dy > 0.0 {
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        }

        // bottom side
        let q = yb - ay;
        if dy == 0.0 && q < 0.0 {
            return false;
        }
        let r = q / dy;
        if dy < 0.0 {
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        } else if dy > 0.0 {
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        }

        if t0 > 0.0 {
            self.edges[index].p0 = Vertex::new(ax + t0 * dx, ay + t0 * dy);
        }
        if t1 < 1.0 {
            self.edges[index].p1 = Vertex::new(ax + t1 * dx, ay + t1 * dy);
        }
        if t0 > 0.0 || t1 < 1.0 {
            self.mark_close_me(edge.left_site);
            if let Some(r_site) = edge.right_site {
                self.mark_close_me(r_site);
            }
        }
        true
    }

    /// Move a coordinate within [`EPSILON`] of a rectangle side onto that
    /// side exactly
    fn snap_to_bounds(&self, v: Vertex) -> Vertex {
        let mut v = v;
        if eq_eps(v.x, 0.0) {
            v.x = 0.0;
        } else if eq_eps(v.x, self.x_bound) {
            v.x = self.x_bound;
        }
        if eq_eps(v.y, 0.0) {
            v.y = 0.0;
        } else if eq_eps(v.y, self.y_bound) {
            v.y = self.y_bound;
        }
        v
    }

    fn mark_close_me(&mut self, site: usize) {
        if let Some(cell) = self.sites[site].cell {
            self.cells[cell].close_me = true;
        }
    }

    /// Wrap every retained edge as a half-edge on each adjacent cell and
    /// sort each cell's boundary into winding order (descending angle)
    fn assemble_half_edges(&mut self) {
        for index in 0..self.edges.len() {
            let edge = self.edges[index];
            let half_edge = self.make_half_edge(index, edge.left_site, edge.right_site);
            if let Some(cell) = self.sites[edge.left_site].cell {
                self.cells[cell].half_edges.push(half_edge);
            }
            if let Some(r_site) = edge.right_site {
                let half_edge = self.make_half_edge(index, r_site, Some(edge.left_site));
                if let Some(cell) = self.sites[r_site].cell {
                    self.cells[cell].half_edges.push(half_edge);
                }
            }
        }
        for cell in &mut self.cells {
            cell.half_edges
                .sort_unstable_by(|a, b| b.angle.partial_cmp(&a.angle).unwrap_or(Ordering::Equal));
        }
    }

    /// Bridge every endpoint gap in each flagged cell with border edges
    /// walking the rectangle perimeter
    fn close_cells(&mut self) {
        let (xl, xr, yt, yb) = (0.0, self.x_bound, 0.0, self.y_bound);

        // a diagram with a single cell has no edges at all: its boundary
        // is the whole rectangle (provided the site is actually inside)
        if self.cells.len() == 1 && self.cells[0].half_edges.is_empty() {
            let site = self.cells[0].site;
            let p = self.sites[site].point;
            if p.x >= xl && p.x <= xr && p.y >= yt && p.y <= yb {
                let corners = [
                    Vertex::new(xl, yt),
                    Vertex::new(xl, yb),
                    Vertex::new(xr, yb),
                    Vertex::new(xr, yt),
                    Vertex::new(xl, yt),
                ];
                for pair in corners.windows(2) {
                    let edge = self.create_border_edge(site, pair[0], pair[1]);
                    let half_edge = self.make_half_edge(edge, site, None);
                    self.cells[0].half_edges.push(half_edge);
                }
            }
            self.cells[0].close_me = false;
            return;
        }

        for cell_index in 0..self.cells.len() {
            if !self.cells[cell_index].close_me {
                continue;
            }
            let site = self.cells[cell_index].site;

            let mut i_left = 0;
            while i_left < self.cells[cell_index].half_edges.len() {
                let count = self.cells[cell_index].half_edges.len();
                let end = self.half_edge_end(&self.cells[cell_index].half_edges[i_left]);
                let start =
                    self.half_edge_start(&self.cells[cell_index].half_edges[(i_left + 1) % count]);

                if (end.x - start.x).abs() >= EPSILON || (end.y - start.y).abs() >= EPSILON {
                    // gap at the rectangle boundary: walk the perimeter
                    // from `end` until `start` is reached, one side at a
                    // time (left-down, bottom-right, right-up, top-left)
                    let mut va = end;
                    let vz = start;
                    let mut walked = 0;
                    loop {
                        walked += 1;
                        assert!(walked <= 5, "cell closing left the rectangle perimeter");

                        let (vb, last_segment);
                        if eq_eps(va.x, xl) && lt_eps(va.y, yb) {
                            // downward along the left side
                            last_segment = eq_eps(vz.x, xl);
                            vb = Vertex::new(xl, if last_segment { vz.y } else { yb });
                        } else if eq_eps(va.y, yb) && lt_eps(va.x, xr) {
                            // rightward along the bottom side
                            last_segment = eq_eps(vz.y, yb);
                            vb = Vertex::new(if last_segment { vz.x } else { xr }, yb);
                        } else if eq_eps(va.x, xr) && gt_eps(va.y, yt) {
                            // upward along the right side
                            last_segment = eq_eps(vz.x, xr);
                            vb = Vertex::new(xr, if last_segment { vz.y } else { yt });
                        } else if eq_eps(va.y, yt) && gt_eps(va.x, xl) {
                            // leftward along the top side
                            last_segment = eq_eps(vz.y, yt);
                            vb = Vertex::new(if last_segment { vz.x } else { xl }, yt);
                        } else {
                            unreachable!("gap endpoint is not on the rectangle border");
                        }

                        let edge = self.create_border_edge(site, va, vb);
                        let half_edge = self.make_half_edge(edge, site, None);
                        i_left += 1;
                        self.cells[cell_index].half_edges.insert(i_left, half_edge);
                        if last_segment {
                            break;
                        }
                        va = vb;
                    }
                }
                i_left += 1;
            }
            self.cells[cell_index].close_me = false;
        }
    }

    /// Drop cells that never became a usable polygon: fewer than three
    /// half-edges, or a site outside the rectangle. Sites keep
    /// `cell == None` as the degeneracy flag.
    fn prune_cells(&mut self) {
        let (xl, xr, yt, yb) = (0.0, self.x_bound, 0.0, self.y_bound);
        let mut remap: Vec<Option<usize>> = Vec::with_capacity(self.cells.len());
        let mut kept = 0;
        for cell in &self.cells {
            let p = self.sites[cell.site].point;
            let inside = p.x >= xl && p.x <= xr && p.y >= yt && p.y <= yb;
            if cell.half_edges.len() >= 3 && inside {
                remap.push(Some(kept));
                kept += 1;
            } else {
                remap.push(None);
            }
        }
        if kept == self.cells.len() {
            return;
        }
        debug!("dropped {} degenerate cells", self.cells.len() - kept);
        let mut index = 0;
        self.cells.retain(|_| {
            let keep = remap[index].is_some();
            index += 1;
            keep
        });
        for site in &mut self.sites {
            site.cell = site.cell.and_then(|cell| remap[cell]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Site;

    /// A graph mid-finish: two sites, one raw edge, cells registered.
    fn two_site_fixture(l: Vertex, r: Vertex) -> Graph {
        let mut graph = Graph {
            sites: vec![
                Site {
                    point: l,
                    cell: None,
                },
                Site {
                    point: r,
                    cell: None,
                },
            ],
            edges: Vec::new(),
            cells: Vec::new(),
            x_bound: 100.0,
            y_bound: 100.0,
        };
        graph.create_cell(0);
        graph.create_cell(1);
        graph.create_edge(0, 1, None, None);
        graph
    }

    #[test]
    fn test_connect_vertical_bisector() {
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        assert!(graph.connect_edge(0));
        let edge = graph.edges()[0];
        // same y, left site west of right site: traced bottom-up at x=50
        assert_eq!(edge.p0, Vertex::new(50.0, 100.0));
        assert_eq!(edge.p1, Vertex::new(50.0, 0.0));
        assert!(graph.cells()[0].close_me);
        assert!(graph.cells()[1].close_me);
    }

    #[test]
    fn test_connect_bisector_outside_box() {
        // both sites far east: the bisector misses the rectangle
        let mut graph = two_site_fixture(Vertex::new(300.0, 50.0), Vertex::new(500.0, 50.0));
        assert!(!graph.connect_edge(0));
    }

    #[test]
    fn test_clip_edge_wholly_outside() {
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        graph.edges[0].p0 = Vertex::new(-10.0, -5.0);
        graph.edges[0].p1 = Vertex::new(-10.0, 40.0);
        assert!(!graph.clip_edge(0));
    }

    #[test]
    fn test_clip_edge_partial() {
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        graph.edges[0].p0 = Vertex::new(-50.0, 50.0);
        graph.edges[0].p1 = Vertex::new(50.0, 50.0);
        assert!(graph.clip_edge(0));
        let edge = graph.edges()[0];
        assert_eq!(edge.p0, Vertex::new(0.0, 50.0));
        assert_eq!(edge.p1, Vertex::new(50.0, 50.0));
        assert!(graph.cells()[0].close_me);
    }

    #[test]
    fn test_clipped_endpoint_snaps_onto_border() {
        // an endpoint a few ulps below y = 0 must come out of clipping at
        // exactly 0.0, or the border walk can never meet it
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        graph.edges[0].p0 = Vertex::new(20.0, -4.4e-16);
        graph.edges[0].p1 = Vertex::new(30.0, 50.0);
        graph.clip_edges();
        assert_eq!(graph.edges()[0].p0.y, 0.0);
        assert_eq!(graph.edges()[0].p0.x, 20.0);
    }

    #[test]
    fn test_zero_length_edge_dropped() {
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        let v = Vertex::new(50.0, 50.0);
        graph.edges[0].p0 = v;
        graph.edges[0].p1 = Vertex::new(v.x + 1e-12, v.y);
        graph.clip_edges();
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_prune_remaps_site_cells() {
        let mut graph = two_site_fixture(Vertex::new(25.0, 50.0), Vertex::new(75.0, 50.0));
        // give the second cell a plausible closed boundary, leave the
        // first degenerate
        graph.cells[1].half_edges = vec![
            graph.make_half_edge(0, 1, Some(0)),
            graph.make_half_edge(0, 1, Some(0)),
            graph.make_half_edge(0, 1, Some(0)),
        ];
        graph.edges[0].p0 = Vertex::new(50.0, 0.0);
        graph.edges[0].p1 = Vertex::new(50.0, 100.0);
        graph.prune_cells();
        assert_eq!(graph.cells().len(), 1);
        assert_eq!(graph.sites()[0].cell, None);
        assert_eq!(graph.sites()[1].cell, Some(0));
    }

    #[test]
    fn test_full_finish_horizontal_pair() {
        // sites stacked vertically: horizontal bisector at y = 50
        let mut graph = two_site_fixture(Vertex::new(50.0, 10.0), Vertex::new(50.0, 90.0));
        graph.finish();

        assert_eq!(graph.cells().len(), 2);
        for cell in graph.cells() {
            assert_eq!(cell.half_edges.len(), 4);
            assert!(!cell.close_me);
        }
        let bisector = graph
            .edges()
            .iter()
            .find(|e| e.right_site.is_some())
            .expect("bisector retained");
        assert_eq!(bisector.p0.y, 50.0);
        assert_eq!(bisector.p1.y, 50.0);
    }
}
