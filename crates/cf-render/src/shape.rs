//! Per-kind node geometry and palette.
//!
//! Geometry is built in model coordinates around the node's center point;
//! the camera affine is applied afterwards by the paint pass. Point tests
//! mirror the geometry: exact for ellipse, box and diamond, bounding-box
//! approximation for the slanted shapes.

use cf_core::FlowKind;
use cf_core::layout::node_size;
use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape};

/// Corner radius of process/declaration boxes.
const CORNER_RADIUS: f64 = 8.0;
/// Horizontal skew of the input/output parallelogram.
const SKEW: f64 = 15.0;
/// Width of the hexagon's side notches.
const NOTCH: f64 = 20.0;

/// Fill color per node kind, CSS hex.
#[must_use]
pub fn node_fill(kind: FlowKind) -> &'static str {
    match kind {
        FlowKind::Start => "#4CAF50",
        FlowKind::End => "#f44336",
        FlowKind::Process => "#2196F3",
        FlowKind::Decision => "#FF9800",
        FlowKind::Input => "#9C27B0",
        FlowKind::Output => "#00BCD4",
        FlowKind::Loop => "#795548",
        FlowKind::Declaration => "#607D8B",
    }
}

/// The node's outline as a path centered on (cx, cy).
#[must_use]
pub fn node_path(kind: FlowKind, cx: f64, cy: f64) -> BezPath {
    let (w, h) = node_size(kind);
    let (hw, hh) = (w / 2.0, h / 2.0);
    match kind {
        FlowKind::Start | FlowKind::End => {
            Ellipse::new(Point::new(cx, cy), (hw, hh), 0.0).to_path(0.1)
        }
        FlowKind::Process | FlowKind::Declaration => {
            RoundedRect::new(cx - hw, cy - hh, cx + hw, cy + hh, CORNER_RADIUS).to_path(0.1)
        }
        FlowKind::Decision => polygon(&[
            (cx, cy - hh),
            (cx + hw, cy),
            (cx, cy + hh),
            (cx - hw, cy),
        ]),
        FlowKind::Input | FlowKind::Output => polygon(&[
            (cx - hw + SKEW, cy - hh),
            (cx + hw, cy - hh),
            (cx + hw - SKEW, cy + hh),
            (cx - hw, cy + hh),
        ]),
        FlowKind::Loop => polygon(&[
            (cx - hw + NOTCH, cy - hh),
            (cx + hw - NOTCH, cy - hh),
            (cx + hw, cy),
            (cx + hw - NOTCH, cy + hh),
            (cx - hw + NOTCH, cy + hh),
            (cx - hw, cy),
        ]),
    }
}

/// Axis-aligned bounding box of the node's shape.
#[must_use]
pub fn node_bounds(kind: FlowKind, cx: f64, cy: f64) -> Rect {
    let (w, h) = node_size(kind);
    Rect::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
}

/// Point-in-shape test in model coordinates.
#[must_use]
pub fn node_contains(kind: FlowKind, cx: f64, cy: f64, p: Point) -> bool {
    let (w, h) = node_size(kind);
    let (hw, hh) = (w / 2.0, h / 2.0);
    let dx = p.x - cx;
    let dy = p.y - cy;
    match kind {
        // Ellipse equation.
        FlowKind::Start | FlowKind::End => {
            (dx / hw) * (dx / hw) + (dy / hh) * (dy / hh) <= 1.0
        }
        // Taxicab diamond test.
        FlowKind::Decision => dx.abs() / hw + dy.abs() / hh <= 1.0,
        // Boxes exactly, slanted shapes by bounding box.
        _ => dx.abs() <= hw && dy.abs() <= hh,
    }
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        path.move_to((x, y));
        for &(x, y) in iter {
            path.line_to((x, y));
        }
        path.close_path();
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_test_matches_the_equation() {
        // Start ellipse is 80×40: center hits, rim corner misses.
        assert!(node_contains(FlowKind::Start, 0.0, 0.0, Point::new(0.0, 0.0)));
        assert!(node_contains(FlowKind::Start, 0.0, 0.0, Point::new(39.0, 0.0)));
        assert!(!node_contains(
            FlowKind::Start,
            0.0,
            0.0,
            Point::new(39.0, 19.0)
        ));
    }

    #[test]
    fn diamond_test_is_taxicab() {
        // Decision diamond is 120×80.
        assert!(node_contains(
            FlowKind::Decision,
            0.0,
            0.0,
            Point::new(30.0, 20.0)
        ));
        assert!(!node_contains(
            FlowKind::Decision,
            0.0,
            0.0,
            Point::new(50.0, 30.0)
        ));
    }

    #[test]
    fn box_test_uses_the_full_extent() {
        // Process box is 140×60.
        assert!(node_contains(
            FlowKind::Process,
            0.0,
            0.0,
            Point::new(69.0, 29.0)
        ));
        assert!(!node_contains(
            FlowKind::Process,
            0.0,
            0.0,
            Point::new(71.0, 0.0)
        ));
    }

    #[test]
    fn paths_cover_the_node_extent() {
        for kind in [
            FlowKind::Start,
            FlowKind::Process,
            FlowKind::Decision,
            FlowKind::Input,
            FlowKind::Output,
            FlowKind::Loop,
            FlowKind::Declaration,
        ] {
            let bbox = node_path(kind, 100.0, 200.0).bounding_box();
            let expect = node_bounds(kind, 100.0, 200.0);
            assert!((bbox.width() - expect.width()).abs() < 1.0, "{kind:?}");
            assert!((bbox.height() - expect.height()).abs() < 1.0, "{kind:?}");
        }
    }
}
