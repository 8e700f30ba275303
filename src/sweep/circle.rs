//! Circle-event prediction and queue maintenance
//!
//! The queue is the second instantiation of the arena red-black tree,
//! ordered ascending by `(y, x)` where `y` is the sweep position at which
//! the event fires. A cached pointer to the earliest event makes the
//! driver's peek O(1).

use crate::rbtree::NodeId;

use super::{CircleEvent, Fortune};

impl<'a> Fortune<'a> {
    /// Predict a vanishing point for `arc` from its two neighbors, and
    /// queue the event if the three sites actually converge
    pub(crate) fn attach_circle_event(&mut self, arc: NodeId) {
        let (Some(l_arc), Some(r_arc)) = (self.beachline.prev(arc), self.beachline.next(arc))
        else {
            return;
        };
        let l_site = self.beachline.item(l_arc).site;
        let c_site = self.beachline.item(arc).site;
        let r_site = self.beachline.item(r_arc).site;
        if l_site == r_site {
            return;
        }

        // circumcircle of the three sites, relative to the middle one
        let b = self.site_point(c_site);
        let a = self.site_point(l_site);
        let c = self.site_point(r_site);
        let ax = a.x - b.x;
        let ay = a.y - b.y;
        let cx = c.x - b.x;
        let cy = c.y - b.y;

        // if the three sites make a left turn (or are collinear), the
        // breakpoints diverge and the middle arc never vanishes; the
        // slack absorbs near-collinear roundoff
        let d = 2.0 * (ax * cy - ay * cx);
        if d >= -2e-12 {
            return;
        }

        let ha = ax * ax + ay * ay;
        let hc = cx * cx + cy * cy;
        let x = (cy * ha - ay * hc) / d;
        let y = (ax * hc - cx * ha) / d;
        let y_center = y + b.y;

        // the event fires when the sweep reaches the circle's bottom
        let event = self.circle_events.alloc(CircleEvent {
            arc,
            x: x + b.x,
            y: y_center + (x * x + y * y).sqrt(),
            y_center,
        });
        self.beachline.item_mut(arc).circle_event = Some(event);

        // insertion point in (y, x) ascending order
        let (ey, ex) = {
            let e = self.circle_events.item(event);
            (e.y, e.x)
        };
        let mut predecessor = None;
        let mut node = self.circle_events.root();
        while let Some(n) = node {
            let other = self.circle_events.item(n);
            if ey < other.y || (ey == other.y && ex <= other.x) {
                match self.circle_events.left(n) {
                    Some(left) => node = Some(left),
                    None => {
                        predecessor = self.circle_events.prev(n);
                        break;
                    }
                }
            } else {
                match self.circle_events.right(n) {
                    Some(right) => node = Some(right),
                    None => {
                        predecessor = Some(n);
                        break;
                    }
                }
            }
        }
        self.circle_events.insert_after(predecessor, event);
        if predecessor.is_none() {
            self.first_circle = Some(event);
        }
    }

    /// Invalidate and dequeue the arc's pending event, if any
    pub(crate) fn detach_circle_event(&mut self, arc: NodeId) {
        if let Some(event) = self.beachline.item(arc).circle_event {
            if self.circle_events.prev(event).is_none() {
                self.first_circle = self.circle_events.next(event);
            }
            self.circle_events.remove(event);
            self.beachline.item_mut(arc).circle_event = None;
        }
    }
}
