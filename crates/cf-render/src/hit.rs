//! Hit testing: screen point → flow node lookup.
//!
//! Inverts the camera transform, then tests point-in-shape per node
//! front-to-back (last painted = topmost).

use crate::camera::Camera;
use crate::shape::node_contains;
use cf_core::NodeIndex;
use cf_core::flowgraph::FlowGraph;
use kurbo::Point;

/// Find the topmost node at screen position (sx, sy).
/// Returns `None` on background.
#[must_use]
pub fn node_at(fg: &FlowGraph, camera: &Camera, sx: f64, sy: f64) -> Option<NodeIndex> {
    let p = camera.to_model(Point::new(sx, sy));
    fg.nodes_in_order()
        .iter()
        .rev()
        .copied()
        .find(|&idx| {
            let node = fg.node(idx);
            node_contains(node.kind, node.x, node.y, p)
        })
}
