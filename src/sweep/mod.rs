//! Fortune sweep state and event loop
//!
//! The sweep advances through two event streams: site events (the sorted
//! input sites) and circle events (predicted arc vanishing points). Both
//! the beachline and the circle-event queue are instances of the arena
//! red-black tree; arcs and events live only for the duration of one
//! [`run`] call.

mod beachline;
mod circle;

use crate::geometry::Vertex;
use crate::graph::Graph;
use crate::rbtree::{NodeId, RbTree};

/// One site's contribution to the beachline at the current sweep position
pub(crate) struct BeachArc {
    /// Defining site of the parabolic arc
    site: usize,
    /// Edge being traced between this arc and its left neighbor
    edge: Option<usize>,
    /// Pending vanishing prediction, if any
    circle_event: Option<NodeId>,
}

/// A predicted future moment when an arc shrinks to zero width
pub(crate) struct CircleEvent {
    arc: NodeId,
    x: f64,
    /// Sweep position at which the event fires (circle bottom)
    y: f64,
    /// Circle center y, the vanishing vertex's y coordinate
    y_center: f64,
}

pub(crate) struct Fortune<'a> {
    graph: &'a mut Graph,
    beachline: RbTree<BeachArc>,
    circle_events: RbTree<CircleEvent>,
    /// Earliest pending circle event, kept current across queue edits
    first_circle: Option<NodeId>,
}

impl<'a> Fortune<'a> {
    fn new(graph: &'a mut Graph) -> Self {
        Self {
            graph,
            beachline: RbTree::new(),
            circle_events: RbTree::new(),
            first_circle: None,
        }
    }

    #[inline]
    fn site_point(&self, site: usize) -> Vertex {
        self.graph.sites[site].point
    }
}

/// Run the sweep over `graph.sites` (already sorted ascending by `(y, x)`)
///
/// Consumes whichever of the next site event or the earliest circle event
/// comes first in `(y, x)` order, until both streams are exhausted.
/// Consecutive coincident sites are consumed without creating a cell or an
/// arc, so duplicates end up with no cell.
pub(crate) fn run(graph: &mut Graph) {
    let site_count = graph.sites.len();
    let mut fortune = Fortune::new(graph);
    let mut site_idx = 0usize;
    let mut last_site: Option<Vertex> = None;

    loop {
        let circle = fortune.first_circle;

        let take_site = if site_idx < site_count {
            match circle {
                None => true,
                Some(event) => {
                    let point = fortune.graph.sites[site_idx].point;
                    let event = fortune.circle_events.item(event);
                    point.y < event.y || (point.y == event.y && point.x < event.x)
                }
            }
        } else {
            false
        };

        if take_site {
            let point = fortune.graph.sites[site_idx].point;
            let duplicate = last_site.map_or(false, |l| l.x == point.x && l.y == point.y);
            if !duplicate {
                fortune.graph.create_cell(site_idx);
                fortune.add_beach_section(site_idx);
                last_site = Some(point);
            }
            site_idx += 1;
        } else if let Some(event) = circle {
            let arc = fortune.circle_events.item(event).arc;
            fortune.remove_beach_section(arc);
        } else {
            break;
        }
    }
}
