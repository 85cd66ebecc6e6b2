//! Layout engine: assigns a position to every flow node.
//!
//! Vertical stacking in emission order with fixed spacing, a shared
//! horizontal center line, and symmetric left/right offsets for the
//! immediate branch targets of a decision. Offsets never persist below a
//! merge point: only targets nested inside the decision's block leave
//! the center line.

use crate::classify::FlowKind;
use crate::flowgraph::{EdgeKind, FlowGraph};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

/// Spacing and placement constants.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// The shared center line.
    pub center_x: f64,
    /// Vertical position of the Start node.
    pub start_y: f64,
    /// Vertical gap between consecutive nodes.
    pub base_spacing: f64,
    /// Extra gap after a decision node, leaving room for branch labels.
    pub decision_extra: f64,
    /// Horizontal offset of a decision's immediate branch targets.
    pub branch_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            center_x: 400.0,
            start_y: 80.0,
            base_spacing: 120.0,
            decision_extra: 40.0,
            branch_offset: 180.0,
        }
    }
}

/// Shape extent by node kind, width × height. Positions refer to shape
/// centers, so half-extents pad the bounding box.
#[must_use]
pub fn node_size(kind: FlowKind) -> (f64, f64) {
    match kind {
        FlowKind::Start | FlowKind::End => (80.0, 40.0),
        FlowKind::Process => (140.0, 60.0),
        FlowKind::Decision => (120.0, 80.0),
        FlowKind::Input | FlowKind::Output => (120.0, 50.0),
        FlowKind::Loop => (140.0, 70.0),
        FlowKind::Declaration => (130.0, 50.0),
    }
}

/// Assign x/y to every node in the graph.
pub fn layout(fg: &mut FlowGraph, config: &LayoutConfig) {
    let order: Vec<NodeIndex> = fg.nodes_in_order().to_vec();

    // Vertical pass: stack in emission order.
    let mut y = config.start_y;
    for &idx in &order {
        let is_decision = fg.graph[idx].kind == FlowKind::Decision;
        let node = &mut fg.graph[idx];
        node.x = config.center_x;
        node.y = y;
        y += config.base_spacing;
        if is_decision {
            y += config.decision_extra;
        }
    }

    // Horizontal pass: offset the immediate branch targets of each
    // decision. A branch target sits one nesting level below its decision;
    // a merge point (or an `else if` continuing the chain, or End) sits at
    // the decision's own level and stays centered.
    let decisions: Vec<NodeIndex> = order
        .iter()
        .copied()
        .filter(|&i| fg.graph[i].kind == FlowKind::Decision)
        .collect();
    for dec in decisions {
        let branch_target = |fg: &FlowGraph, kind: EdgeKind| {
            fg.graph
                .edges_directed(dec, Direction::Outgoing)
                .find(|e| e.weight().kind == kind)
                .map(|e| e.target())
        };
        let true_target = branch_target(fg, EdgeKind::DecisionTrue);
        let false_target = branch_target(fg, EdgeKind::DecisionFalse);
        let dec_nesting = fg.graph[dec].nesting;

        if let Some(t) = true_target {
            if t != fg.end && fg.graph[t].nesting > dec_nesting {
                fg.graph[t].x = config.center_x + config.branch_offset;
            }
        }
        if let Some(f) = false_target {
            if Some(f) != true_target && f != fg.end && fg.graph[f].nesting > dec_nesting {
                fg.graph[f].x = config.center_x - config.branch_offset;
            }
        }
    }
}

/// A drawable viewport, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Camera parameters that frame the whole graph in a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

/// Margin kept clear around the graph when fitting.
pub const FIT_MARGIN: f64 = 80.0;
/// Fitting never zooms in beyond this.
pub const FIT_MAX_SCALE: f64 = 2.0;

/// Tightest scale (capped) and translation that place every node's
/// bounding box, plus the margin, inside the viewport.
#[must_use]
pub fn fit_to_view(fg: &FlowGraph, viewport: Viewport) -> CameraFit {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &idx in fg.nodes_in_order() {
        let node = fg.node(idx);
        let (w, h) = node_size(node.kind);
        min_x = min_x.min(node.x - w / 2.0);
        max_x = max_x.max(node.x + w / 2.0);
        min_y = min_y.min(node.y - h / 2.0);
        max_y = max_y.max(node.y + h / 2.0);
    }

    let graph_w = max_x - min_x;
    let graph_h = max_y - min_y;
    let avail_w = (viewport.width - 2.0 * FIT_MARGIN).max(1.0);
    let avail_h = (viewport.height - 2.0 * FIT_MARGIN).max(1.0);

    let scale = (avail_w / graph_w).min(avail_h / graph_h).min(FIT_MAX_SCALE);
    let pan_x = (viewport.width - graph_w * scale) / 2.0 - min_x * scale;
    let pan_y = (viewport.height - graph_h * scale) / 2.0 - min_y * scale;

    CameraFit {
        scale,
        pan_x,
        pan_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn laid_out(lines: &[&str]) -> FlowGraph {
        let mut fg = FlowGraph::from_lines(lines.iter().copied());
        layout(&mut fg, &LayoutConfig::default());
        fg
    }

    fn node_of_kind(fg: &FlowGraph, kind: FlowKind) -> NodeIndex {
        fg.nodes_in_order()
            .iter()
            .copied()
            .find(|&i| fg.node(i).kind == kind)
            .expect("node of kind")
    }

    #[test]
    fn nodes_stack_top_to_bottom() {
        let fg = laid_out(&["printf(\"a\");", "printf(\"b\");"]);
        let order = fg.nodes_in_order();
        let ys: Vec<f64> = order.iter().map(|&i| fg.node(i).y).collect();
        assert_eq!(ys, vec![80.0, 200.0, 320.0, 440.0]);
    }

    #[test]
    fn decisions_add_extra_spacing_below() {
        let fg = laid_out(&["if (x) {", "printf(\"a\");", "}"]);
        let dec = node_of_kind(&fg, FlowKind::Decision);
        let out = node_of_kind(&fg, FlowKind::Output);
        assert_eq!(fg.node(out).y - fg.node(dec).y, 160.0);
    }

    #[test]
    fn branch_targets_offset_symmetrically() {
        let fg = laid_out(&[
            "if (x) {",
            "printf(\"a\");",
            "}",
            "else {",
            "printf(\"b\");",
            "}",
        ]);
        let outs: Vec<NodeIndex> = fg
            .nodes_in_order()
            .iter()
            .copied()
            .filter(|&i| fg.node(i).kind == FlowKind::Output)
            .collect();
        assert_eq!(fg.node(outs[0]).x, 400.0 + 180.0);
        assert_eq!(fg.node(outs[1]).x, 400.0 - 180.0);
    }

    #[test]
    fn merge_point_returns_to_center() {
        // No else: the false edge targets End, which must stay centered.
        let fg = laid_out(&["if (x) {", "printf(\"a\");", "}"]);
        assert_eq!(fg.node(fg.end).x, 400.0);
    }

    #[test]
    fn fit_to_view_respects_margin_and_max_scale() {
        let fg = laid_out(&[
            "int x = 0;",
            "if (x) {",
            "printf(\"a\");",
            "}",
            "while (x) {",
            "x = x - 1;",
            "}",
        ]);
        let viewport = Viewport {
            width: 900.0,
            height: 600.0,
        };
        let fit = fit_to_view(&fg, viewport);
        assert!(fit.scale <= FIT_MAX_SCALE);
        for &idx in fg.nodes_in_order() {
            let node = fg.node(idx);
            let (w, h) = node_size(node.kind);
            let left = (node.x - w / 2.0) * fit.scale + fit.pan_x;
            let right = (node.x + w / 2.0) * fit.scale + fit.pan_x;
            let top = (node.y - h / 2.0) * fit.scale + fit.pan_y;
            let bottom = (node.y + h / 2.0) * fit.scale + fit.pan_y;
            assert!(left >= FIT_MARGIN - 1e-9, "left {left}");
            assert!(right <= viewport.width - FIT_MARGIN + 1e-9, "right {right}");
            assert!(top >= FIT_MARGIN - 1e-9, "top {top}");
            assert!(
                bottom <= viewport.height - FIT_MARGIN + 1e-9,
                "bottom {bottom}"
            );
        }
    }

    #[test]
    fn small_graphs_cap_at_max_scale() {
        let fg = laid_out(&[]);
        let fit = fit_to_view(
            &fg,
            Viewport {
                width: 4000.0,
                height: 4000.0,
            },
        );
        assert_eq!(fit.scale, FIT_MAX_SCALE);
    }
}
