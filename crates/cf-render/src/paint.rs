//! Flow graph → backend-neutral paint operations.
//!
//! A stateless pass: graph + camera + interaction state in, a display
//! list out. The list is ordered back-to-front (edges, then nodes, then
//! text) and already camera-transformed, so a canvas backend replays it
//! verbatim.

use crate::camera::Camera;
use crate::shape::{node_fill, node_path};
use cf_core::flowgraph::{EdgeKind, FlowGraph};
use cf_core::layout::{Viewport, node_size};
use cf_core::{Ident, NodeIndex};
use kurbo::{BezPath, Point, RoundedRect, Shape};

// ─── Display list ────────────────────────────────────────────────────────

/// One drawing command, in screen coordinates. Colors are CSS strings.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill {
        path: BezPath,
        color: &'static str,
    },
    Stroke {
        path: BezPath,
        color: &'static str,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    Text {
        text: String,
        /// Center of the text run.
        x: f64,
        y: f64,
        size: f64,
        color: &'static str,
    },
}

/// The full frame, replayed in order by the backend.
#[derive(Debug, Default)]
pub struct DisplayList {
    pub ops: Vec<PaintOp>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ─── Theme ───────────────────────────────────────────────────────────────

/// Canvas colors not tied to a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasTheme {
    pub background: &'static str,
    pub outline: &'static str,
    pub hover_outline: &'static str,
    pub execution_outline: &'static str,
    pub node_text: &'static str,
    pub pill_bg: &'static str,
    pub pill_text: &'static str,
    pub empty_message: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        CanvasTheme {
            background: "#ffffff",
            outline: "#333333",
            hover_outline: "#000000",
            execution_outline: "#FFD700",
            node_text: "#ffffff",
            pill_bg: "#ffffff",
            pill_text: "#333333",
            empty_message: "#999999",
        }
    }

    pub fn dark() -> Self {
        CanvasTheme {
            background: "#1e1e1e",
            outline: "#dddddd",
            hover_outline: "#ffffff",
            execution_outline: "#FFD700",
            node_text: "#ffffff",
            pill_bg: "#2d2d2d",
            pill_text: "#dddddd",
            empty_message: "#777777",
        }
    }
}

// ─── Render options ──────────────────────────────────────────────────────

/// Interaction state threaded through a frame.
#[derive(Debug)]
pub struct RenderOptions<'a> {
    pub viewport: Viewport,
    pub theme: CanvasTheme,
    pub hover: Option<NodeIndex>,
    /// Node ids currently highlighted as the simulated execution path.
    pub execution_path: &'a [Ident],
}

impl RenderOptions<'_> {
    pub fn new(viewport: Viewport) -> Self {
        RenderOptions {
            viewport,
            theme: CanvasTheme::light(),
            hover: None,
            execution_path: &[],
        }
    }
}

// ─── Constants ───────────────────────────────────────────────────────────

/// Beyond this horizontal distance an edge routes as a cubic curve.
const CURVE_THRESHOLD: f64 = 100.0;
const ARROW_SIZE: f64 = 12.0;
const NODE_FONT: f64 = 12.0;
const LABEL_FONT: f64 = 11.0;
const LINE_HEIGHT: f64 = 14.0;
/// Approximate glyph advance at `NODE_FONT`, for wrapping.
const CHAR_WIDTH: f64 = 7.0;
/// Inner horizontal padding of a node shape.
const TEXT_PAD: f64 = 10.0;

// ─── Entry point ─────────────────────────────────────────────────────────

/// Paint one frame. Stateless: same inputs, same list.
#[must_use]
pub fn render(fg: &FlowGraph, camera: &Camera, opts: &RenderOptions) -> DisplayList {
    let mut list = DisplayList::default();

    if fg.node_count() == 2 {
        list.ops.push(PaintOp::Text {
            text: "Add blocks to build your flowchart".to_string(),
            x: opts.viewport.width / 2.0,
            y: opts.viewport.height / 2.0,
            size: 16.0,
            color: opts.theme.empty_message,
        });
    }

    for (source, target, kind) in fg.edges() {
        paint_edge(&mut list, fg, camera, opts, source, target, kind);
    }
    for &idx in fg.nodes_in_order() {
        paint_node(&mut list, fg, camera, opts, idx);
    }

    log::trace!("frame painted: {} ops", list.ops.len());
    list
}

// ─── Nodes ───────────────────────────────────────────────────────────────

fn paint_node(
    list: &mut DisplayList,
    fg: &FlowGraph,
    camera: &Camera,
    opts: &RenderOptions,
    idx: NodeIndex,
) {
    let node = fg.node(idx);
    let mut path = node_path(node.kind, node.x, node.y);
    path.apply_affine(camera.affine());

    list.ops.push(PaintOp::Fill {
        path: path.clone(),
        color: node_fill(node.kind),
    });

    let hovered = opts.hover == Some(idx);
    let executed = opts.execution_path.contains(&node.id);
    let (outline, width) = if executed {
        (opts.theme.execution_outline, 4.0)
    } else if hovered {
        (opts.theme.hover_outline, 3.0)
    } else {
        (opts.theme.outline, 2.0)
    };
    list.ops.push(PaintOp::Stroke {
        path,
        color: outline,
        width: width * camera.scale,
        dash: None,
    });

    // Wrapped label, centered in the shape.
    let (w, _) = node_size(node.kind);
    let max_chars = ((w - 2.0 * TEXT_PAD) / CHAR_WIDTH).max(1.0) as usize;
    let lines = wrap_label(&node.label, max_chars);
    let first_y = node.y - LINE_HEIGHT * (lines.len() as f64 - 1.0) / 2.0;
    for (i, line) in lines.into_iter().enumerate() {
        let p = camera.to_screen(Point::new(node.x, first_y + i as f64 * LINE_HEIGHT));
        list.ops.push(PaintOp::Text {
            text: line,
            x: p.x,
            y: p.y,
            size: NODE_FONT * camera.scale,
            color: opts.theme.node_text,
        });
    }
}

/// Greedy word wrap to a character budget per line. Words longer than the
/// budget get a line of their own.
fn wrap_label(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ─── Edges ───────────────────────────────────────────────────────────────

fn edge_style(kind: EdgeKind) -> (&'static str, f64, Option<[f64; 2]>) {
    match kind {
        EdgeKind::Sequential => ("#555555", 2.0, None),
        EdgeKind::DecisionTrue => ("#4CAF50", 3.0, None),
        EdgeKind::DecisionFalse => ("#f44336", 3.0, None),
        EdgeKind::LoopEntry => ("#FF9800", 2.0, None),
        EdgeKind::LoopFeedback => ("#9C27B0", 2.0, Some([5.0, 5.0])),
    }
}

fn paint_edge(
    list: &mut DisplayList,
    fg: &FlowGraph,
    camera: &Camera,
    opts: &RenderOptions,
    source: NodeIndex,
    target: NodeIndex,
    kind: EdgeKind,
) {
    let a = fg.node(source);
    let b = fg.node(target);
    let (_, ah) = node_size(a.kind);
    let (_, bh) = node_size(b.kind);

    // Downward edges leave the bottom and enter the top; feedback edges
    // run the other way round.
    let (from, to) = if b.y >= a.y {
        (
            Point::new(a.x, a.y + ah / 2.0),
            Point::new(b.x, b.y - bh / 2.0),
        )
    } else {
        (
            Point::new(a.x, a.y - ah / 2.0),
            Point::new(b.x, b.y + bh / 2.0),
        )
    };

    let mut path = BezPath::new();
    path.move_to(from);
    let before_end = if (to.x - from.x).abs() > CURVE_THRESHOLD {
        let mid_y = (from.y + to.y) / 2.0;
        path.curve_to(
            Point::new(from.x, mid_y),
            Point::new(to.x, mid_y),
            to,
        );
        Point::new(to.x, mid_y)
    } else {
        path.line_to(to);
        from
    };
    path.apply_affine(camera.affine());

    let (color, width, dash) = edge_style(kind);
    list.ops.push(PaintOp::Stroke {
        path,
        color,
        width: width * camera.scale,
        dash: dash.map(|[on, off]| [on * camera.scale, off * camera.scale]),
    });

    // Arrowhead at the target end, aligned with the incoming direction.
    let mut arrow = arrowhead(before_end, to);
    arrow.apply_affine(camera.affine());
    list.ops.push(PaintOp::Fill { path: arrow, color });

    if let Some(label) = kind.label() {
        let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        paint_pill(list, camera, opts, mid, label);
    }
}

/// A filled triangle at `tip`, pointing from `tail` toward `tip`.
fn arrowhead(tail: Point, tip: Point) -> BezPath {
    let angle = (tip.y - tail.y).atan2(tip.x - tail.x);
    let left = angle + std::f64::consts::PI - 0.45;
    let right = angle + std::f64::consts::PI + 0.45;
    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to((
        tip.x + ARROW_SIZE * left.cos(),
        tip.y + ARROW_SIZE * left.sin(),
    ));
    path.line_to((
        tip.x + ARROW_SIZE * right.cos(),
        tip.y + ARROW_SIZE * right.sin(),
    ));
    path.close_path();
    path
}

/// Pill-shaped label at an edge midpoint.
fn paint_pill(
    list: &mut DisplayList,
    camera: &Camera,
    opts: &RenderOptions,
    center: Point,
    label: &str,
) {
    let w = label.chars().count() as f64 * CHAR_WIDTH + 12.0;
    let h = LINE_HEIGHT + 4.0;
    let mut pill = RoundedRect::new(
        center.x - w / 2.0,
        center.y - h / 2.0,
        center.x + w / 2.0,
        center.y + h / 2.0,
        h / 2.0,
    )
    .to_path(0.1);
    pill.apply_affine(camera.affine());
    list.ops.push(PaintOp::Fill {
        path: pill.clone(),
        color: opts.theme.pill_bg,
    });
    list.ops.push(PaintOp::Stroke {
        path: pill,
        color: opts.theme.outline,
        width: 1.0 * camera.scale,
        dash: None,
    });
    let p = camera.to_screen(center);
    list.ops.push(PaintOp::Text {
        text: label.to_string(),
        x: p.x,
        y: p.y,
        size: LABEL_FONT * camera.scale,
        color: opts.theme.pill_text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::layout::{LayoutConfig, layout};
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn laid_out(lines: &[&str]) -> FlowGraph {
        let mut fg = FlowGraph::from_lines(lines.iter().copied());
        layout(&mut fg, &LayoutConfig::default());
        fg
    }

    fn texts(list: &DisplayList) -> Vec<&str> {
        list.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_graph_paints_the_empty_message() {
        let fg = laid_out(&[]);
        let list = render(&fg, &Camera::default(), &RenderOptions::new(VIEWPORT));
        assert!(
            texts(&list)
                .iter()
                .any(|t| t.contains("Add blocks"))
        );
    }

    #[test]
    fn every_node_gets_fill_stroke_and_text() {
        let fg = laid_out(&["printf(\"hi\");"]);
        let list = render(&fg, &Camera::default(), &RenderOptions::new(VIEWPORT));
        let fills = list
            .ops
            .iter()
            .filter(|op| matches!(op, PaintOp::Fill { .. }))
            .count();
        // 3 node fills + 2 arrowheads.
        assert_eq!(fills, 5);
        assert!(texts(&list).contains(&"Start"));
        assert!(texts(&list).contains(&"End"));
    }

    #[test]
    fn branch_edges_carry_pill_labels() {
        let fg = laid_out(&["if (x) {", "printf(\"a\");", "}"]);
        let list = render(&fg, &Camera::default(), &RenderOptions::new(VIEWPORT));
        let t = texts(&list);
        assert!(t.contains(&"Yes"));
        assert!(t.contains(&"No"));
    }

    #[test]
    fn feedback_edges_are_dashed() {
        let fg = laid_out(&["while (i < 10) {", "i = i + 1;", "}"]);
        let list = render(&fg, &Camera::default(), &RenderOptions::new(VIEWPORT));
        let dashed = list.ops.iter().any(|op| {
            matches!(
                op,
                PaintOp::Stroke {
                    color: "#9C27B0",
                    dash: Some(_),
                    ..
                }
            )
        });
        assert!(dashed, "expected a dashed feedback stroke");
    }

    #[test]
    fn execution_path_changes_the_outline() {
        let fg = laid_out(&["printf(\"hi\");"]);
        let path = [Ident::start(), Ident::flow_node(0), Ident::end()];
        let mut opts = RenderOptions::new(VIEWPORT);
        opts.execution_path = &path;
        let list = render(&fg, &Camera::default(), &opts);
        let gold = list
            .ops
            .iter()
            .filter(|op| matches!(op, PaintOp::Stroke { color: "#FFD700", .. }))
            .count();
        assert_eq!(gold, 3);
    }

    #[test]
    fn long_labels_wrap() {
        let lines = wrap_label("Print: \"a very long message here\"", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 12 || !l.contains(' ')));
    }
}
