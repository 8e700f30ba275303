//! Beachline maintenance: arc insertion on site events, arc removal on
//! circle events
//!
//! The beachline's in-order sequence is the left-to-right run of parabolic
//! arcs cut by the sweep line. Positions are never stored; they are
//! recomputed from the defining sites and the current directrix via the
//! breakpoint formulas below.

use crate::geometry::{Vertex, EPSILON};
use crate::rbtree::NodeId;

use super::{BeachArc, Fortune};

impl<'a> Fortune<'a> {
    /// x of the breakpoint between `arc` and its left neighbor at the
    /// given directrix
    fn left_break_point(&self, arc: NodeId, directrix: f64) -> f64 {
        let focus = self.site_point(self.beachline.item(arc).site);
        let rfocx = focus.x;
        let rfocy = focus.y;
        let pby2 = rfocy - directrix;
        // focus on the directrix: the arc degenerates to a vertical line
        if pby2 == 0.0 {
            return rfocx;
        }
        let Some(l_arc) = self.beachline.prev(arc) else {
            return f64::NEG_INFINITY;
        };
        let l_focus = self.site_point(self.beachline.item(l_arc).site);
        let lfocx = l_focus.x;
        let lfocy = l_focus.y;
        let plby2 = lfocy - directrix;
        if plby2 == 0.0 {
            return lfocx;
        }
        let hl = lfocx - rfocx;
        let aby2 = 1.0 / pby2 - 1.0 / plby2;
        let b = hl / plby2;
        if aby2 != 0.0 {
            return (-b
                + (b * b
                    - 2.0 * aby2
                        * (hl * hl / (-2.0 * plby2) - lfocy + plby2 / 2.0 + rfocy - pby2 / 2.0))
                    .sqrt())
                / aby2
                + rfocx;
        }
        // both parabolas at the same distance from the directrix
        (rfocx + lfocx) / 2.0
    }

    /// x of the breakpoint between `arc` and its right neighbor
    fn right_break_point(&self, arc: NodeId, directrix: f64) -> f64 {
        if let Some(r_arc) = self.beachline.next(arc) {
            return self.left_break_point(r_arc, directrix);
        }
        let focus = self.site_point(self.beachline.item(arc).site);
        if focus.y == directrix {
            focus.x
        } else {
            f64::INFINITY
        }
    }

    fn alloc_arc(&mut self, site: usize) -> NodeId {
        self.beachline.alloc(BeachArc {
            site,
            edge: None,
            circle_event: None,
        })
    }

    /// Detach the arc's pending circle event and drop the arc from the
    /// beachline
    fn detach_beach_section(&mut self, arc: NodeId) {
        self.detach_circle_event(arc);
        self.beachline.remove(arc);
    }

    /// Process a site event: insert the new arc above `site.x`
    pub(crate) fn add_beach_section(&mut self, site: usize) {
        let point = self.site_point(site);
        let x = point.x;
        let directrix = point.y;

        // locate the arc whose interval contains x at the current directrix
        let mut l_arc = None;
        let mut r_arc = None;
        let mut node = self.beachline.root();
        while let Some(n) = node {
            let dxl = self.left_break_point(n, directrix) - x;
            if dxl > EPSILON {
                // falls somewhere left of the left edge of this arc
                node = self.beachline.left(n);
            } else {
                let dxr = x - self.right_break_point(n, directrix);
                if dxr > EPSILON {
                    // falls somewhere right of the right edge of this arc
                    match self.beachline.right(n) {
                        Some(right) => node = Some(right),
                        None => {
                            l_arc = Some(n);
                            break;
                        }
                    }
                } else {
                    if dxl > -EPSILON {
                        // falls exactly on the left edge of this arc
                        l_arc = self.beachline.prev(n);
                        r_arc = Some(n);
                    } else if dxr > -EPSILON {
                        // falls exactly on the right edge of this arc
                        l_arc = Some(n);
                        r_arc = self.beachline.next(n);
                    } else {
                        // falls strictly within this arc
                        l_arc = Some(n);
                        r_arc = Some(n);
                    }
                    break;
                }
            }
        }

        let new_arc = self.alloc_arc(site);
        self.beachline.insert_after(l_arc, new_arc);

        match (l_arc, r_arc) {
            // first arc on the beachline: nothing to trace yet
            (None, None) => {}

            // the new arc splits an existing one in two
            (Some(split), Some(right)) if split == right => {
                self.detach_circle_event(split);

                let split_site = self.beachline.item(split).site;
                let copy = self.alloc_arc(split_site);
                self.beachline.insert_after(Some(new_arc), copy);

                // both new transitions trace the same fresh edge
                let edge = self.graph.create_edge(split_site, site, None, None);
                self.beachline.item_mut(new_arc).edge = Some(edge);
                self.beachline.item_mut(copy).edge = Some(edge);

                self.attach_circle_event(split);
                self.attach_circle_event(copy);
            }

            // the new arc becomes the rightmost one
            (Some(left), None) => {
                let l_site = self.beachline.item(left).site;
                let edge = self.graph.create_edge(l_site, site, None, None);
                self.beachline.item_mut(new_arc).edge = Some(edge);
            }

            // the new arc lands exactly on the breakpoint between two
            // existing arcs, which both survive
            (Some(left), Some(right)) => {
                self.detach_circle_event(left);
                self.detach_circle_event(right);

                // circumcenter of the three sites: the breakpoint the two
                // old arcs were converging to
                let l_site = self.beachline.item(left).site;
                let r_site = self.beachline.item(right).site;
                let a = self.site_point(l_site);
                let bx = point.x - a.x;
                let by = point.y - a.y;
                let c = self.site_point(r_site);
                let cx = c.x - a.x;
                let cy = c.y - a.y;
                let d = 2.0 * (bx * cy - by * cx);
                let hb = bx * bx + by * by;
                let hc = cx * cx + cy * cy;
                let vertex = Vertex::new(
                    a.x + (cy * hb - by * hc) / d,
                    a.y + (bx * hc - cx * hb) / d,
                );

                let r_edge = self.beachline.item(right).edge.expect("interior arc traces an edge");
                self.graph.edges[r_edge].set_start_point(l_site, r_site, vertex);

                let edge = self.graph.create_edge(l_site, site, None, Some(vertex));
                self.beachline.item_mut(new_arc).edge = Some(edge);
                let edge = self.graph.create_edge(site, r_site, None, Some(vertex));
                self.beachline.item_mut(right).edge = Some(edge);

                self.attach_circle_event(left);
                self.attach_circle_event(right);
            }

            (None, Some(_)) => {
                unreachable!("an arc with a right edge at -inf cannot exist")
            }
        }
    }

    /// Process a circle event: `arc` vanishes at its event's center
    pub(crate) fn remove_beach_section(&mut self, arc: NodeId) {
        let event = self
            .beachline
            .item(arc)
            .circle_event
            .expect("fired arc carries its circle event");
        let (x, y_center) = {
            let event = self.circle_events.item(event);
            (event.x, event.y_center)
        };
        let vertex = Vertex::new(x, y_center);

        let mut previous = self.beachline.prev(arc);
        let mut next = self.beachline.next(arc);

        // all transitions vanishing at this vertex, left to right
        let mut disappearing: Vec<NodeId> = vec![arc];
        self.detach_beach_section(arc);

        // a degenerate event can collapse several arcs at once; gather the
        // neighbors whose pending events share this vanishing point
        let mut l_arc = previous.expect("vanishing arc has a left neighbor");
        while let Some(ev) = self.beachline.item(l_arc).circle_event {
            let shares = {
                let e = self.circle_events.item(ev);
                (x - e.x).abs() < EPSILON && (y_center - e.y_center).abs() < EPSILON
            };
            if !shares {
                break;
            }
            previous = self.beachline.prev(l_arc);
            disappearing.insert(0, l_arc);
            self.detach_beach_section(l_arc);
            l_arc = previous.expect("collapsing arc has a left neighbor");
        }
        // the surviving left neighbor joins the transition list; its own
        // prediction is stale now
        disappearing.insert(0, l_arc);
        self.detach_circle_event(l_arc);

        let mut r_arc = next.expect("vanishing arc has a right neighbor");
        while let Some(ev) = self.beachline.item(r_arc).circle_event {
            let shares = {
                let e = self.circle_events.item(ev);
                (x - e.x).abs() < EPSILON && (y_center - e.y_center).abs() < EPSILON
            };
            if !shares {
                break;
            }
            next = self.beachline.next(r_arc);
            disappearing.push(r_arc);
            self.detach_beach_section(r_arc);
            r_arc = next.expect("collapsing arc has a right neighbor");
        }
        disappearing.push(r_arc);
        self.detach_circle_event(r_arc);

        // every disappearing transition's edge gains the vanishing vertex
        for i in 1..disappearing.len() {
            let right = disappearing[i];
            let left = disappearing[i - 1];
            let edge = self.beachline.item(right).edge.expect("transition traces an edge");
            let l_site = self.beachline.item(left).site;
            let r_site = self.beachline.item(right).site;
            self.graph.edges[edge].set_start_point(l_site, r_site, vertex);
        }

        // the surviving neighbors become adjacent and trace a new edge
        // seeded at the vanishing vertex
        let first = disappearing[0];
        let last = disappearing[disappearing.len() - 1];
        let l_site = self.beachline.item(first).site;
        let r_site = self.beachline.item(last).site;
        let edge = self.graph.create_edge(l_site, r_site, None, Some(vertex));
        self.beachline.item_mut(last).edge = Some(edge);

        self.attach_circle_event(first);
        self.attach_circle_event(last);
    }
}
