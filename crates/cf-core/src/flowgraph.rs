//! Flow graph builder: classified lines → nodes and edges.
//!
//! The graph is a derived, disposable projection — rebuilt wholesale from
//! the model on every change, never patched incrementally. A synthetic
//! Start node is always emitted first and a synthetic End node last;
//! every program node sits between them in source order.
//!
//! Brace depth is the only structural notion here. Matching a block's
//! closing brace is a forward scan with a counter; when the input is
//! unbalanced the scan fails and the builder degrades to a plain
//! sequential chain, omitting the branch and feedback edges it could not
//! resolve.

use crate::classify::{Classified, FlowKind, StmtKind, classify_line};
use crate::id::Ident;
use crate::model::ProgramModel;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use smallvec::SmallVec;
use std::collections::HashSet;

/// One visual element of the flowchart.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub id: Ident,
    pub kind: FlowKind,
    pub label: String,
    /// Index of the originating block; `None` for synthetic Start/End.
    pub block_index: Option<usize>,
    /// Assigned by the layout pass; zero until then.
    pub x: f64,
    pub y: f64,
    /// Brace depth at the point of classification.
    pub nesting: usize,
}

/// Edge kind; the display label is a function of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Sequential,
    DecisionTrue,
    DecisionFalse,
    LoopEntry,
    LoopFeedback,
}

impl EdgeKind {
    pub fn label(self) -> Option<&'static str> {
        match self {
            EdgeKind::Sequential => None,
            EdgeKind::DecisionTrue => Some("Yes"),
            EdgeKind::DecisionFalse => Some("No"),
            EdgeKind::LoopEntry => Some("Enter"),
            EdgeKind::LoopFeedback => Some("Loop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEdge {
    pub kind: EdgeKind,
}

/// The derived flowchart: nodes, edges, and the emission order the layout
/// pass walks.
#[derive(Debug)]
pub struct FlowGraph {
    pub graph: StableDiGraph<FlowNode, FlowEdge>,
    pub start: NodeIndex,
    pub end: NodeIndex,
    // Programs are tens of blocks; most graphs fit inline.
    order: SmallVec<[NodeIndex; 32]>,
}

/// Per-line structural facts gathered in the first pass.
struct LineInfo {
    classified: Classified,
    opens: usize,
    closes: usize,
    depth: usize,
}

/// A node emitted for a program line.
struct Emitted {
    idx: NodeIndex,
    line: usize,
    stmt: StmtKind,
}

impl FlowGraph {
    /// Build the flowchart for the current model state.
    #[must_use]
    pub fn build(model: &ProgramModel) -> Self {
        Self::from_lines(model.blocks().iter().map(|b| b.rendered_line.as_str()))
    }

    /// Same construction over raw lines, used by tests.
    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let infos = scan_lines(lines);
        let mut graph = StableDiGraph::new();
        let mut order = SmallVec::new();

        let start = graph.add_node(FlowNode {
            id: Ident::start(),
            kind: FlowKind::Start,
            label: "Start".to_string(),
            block_index: None,
            x: 0.0,
            y: 0.0,
            nesting: 0,
        });
        order.push(start);

        // Emit program nodes in source order. Excluded lines, structural
        // braces, else markers, and return statements produce no node;
        // control flow routes around them.
        let mut emitted = Vec::new();
        for (line, info) in infos.iter().enumerate() {
            if let Classified::Node { stmt, kind, label } = &info.classified {
                if *stmt == StmtKind::Return {
                    continue;
                }
                let idx = graph.add_node(FlowNode {
                    id: Ident::flow_node(line),
                    kind: *kind,
                    label: label.clone(),
                    block_index: Some(line),
                    x: 0.0,
                    y: 0.0,
                    nesting: info.depth,
                });
                order.push(idx);
                emitted.push(Emitted {
                    idx,
                    line,
                    stmt: *stmt,
                });
            }
        }

        let end = graph.add_node(FlowNode {
            id: Ident::end(),
            kind: FlowKind::End,
            label: "End".to_string(),
            block_index: None,
            x: 0.0,
            y: 0.0,
            nesting: 0,
        });
        order.push(end);

        connect(&mut graph, &infos, &emitted, start, end);
        log::trace!(
            "flow graph rebuilt: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        FlowGraph {
            graph,
            start,
            end,
            order,
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &FlowNode {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node indices in emission order: Start, program nodes, End.
    pub fn nodes_in_order(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn index_of(&self, id: Ident) -> Option<NodeIndex> {
        self.order.iter().copied().find(|&i| self.graph[i].id == id)
    }

    /// All edges as (source, target, kind), for downstream crates that
    /// should not need petgraph's edge traits.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, EdgeKind)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight().kind))
    }

    /// The kind of the edge from `a` to `b`, if one exists.
    pub fn edge_kind(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeKind> {
        self.graph
            .find_edge(a, b)
            .map(|e| self.graph[e].kind)
    }
}

fn scan_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<LineInfo> {
    let mut infos = Vec::new();
    let mut depth: usize = 0;
    for text in lines {
        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        infos.push(LineInfo {
            classified: classify_line(text),
            opens,
            closes,
            depth,
        });
        depth = (depth + opens).saturating_sub(closes);
    }
    infos
}

/// Line index of the close brace matching the block opened at `open`,
/// or `None` when the line opens no block or the input is unbalanced.
fn matching_close(infos: &[LineInfo], open: usize) -> Option<usize> {
    if infos[open].opens == 0 {
        return None;
    }
    let mut depth: isize = 0;
    for (j, info) in infos.iter().enumerate().skip(open) {
        depth += info.opens as isize;
        depth -= info.closes as isize;
        if depth <= 0 {
            return (j > open).then_some(j);
        }
    }
    None
}

fn connect(
    graph: &mut StableDiGraph<FlowNode, FlowEdge>,
    infos: &[LineInfo],
    emitted: &[Emitted],
    start: NodeIndex,
    end: NodeIndex,
) {
    // First emitted node whose line index is in [from, to).
    let first_in = |from: usize, to: usize| {
        emitted
            .iter()
            .find(|e| e.line >= from && e.line < to)
            .map(|e| e.idx)
    };
    // Last emitted node strictly inside (open, close).
    let last_in = |open: usize, close: usize| {
        emitted
            .iter()
            .rev()
            .find(|e| e.line > open && e.line < close)
    };
    let add = |graph: &mut StableDiGraph<FlowNode, FlowEdge>, a, b, kind| {
        graph.add_edge(a, b, FlowEdge { kind });
    };

    add(
        graph,
        start,
        emitted.first().map_or(end, |e| e.idx),
        EdgeKind::Sequential,
    );

    // Loop-body tails get a feedback edge instead of the default
    // sequential one; collect them before the edge pass.
    let mut feedback_tails: HashSet<usize> = HashSet::new();
    for em in emitted {
        if matches!(em.stmt, StmtKind::Loop(_)) {
            if let Some(close) = matching_close(infos, em.line) {
                if let Some(tail) = last_in(em.line, close) {
                    feedback_tails.insert(tail.line);
                }
            }
        }
    }

    for (k, em) in emitted.iter().enumerate() {
        let next = emitted.get(k + 1).map_or(end, |e| e.idx);
        match em.stmt {
            StmtKind::Condition => {
                // True branch: the immediate successor in source order.
                add(graph, em.idx, next, EdgeKind::DecisionTrue);
                match matching_close(infos, em.line) {
                    Some(close) => {
                        let target = false_target(infos, emitted, close)
                            .or_else(|| first_in(close, infos.len()))
                            .unwrap_or(end);
                        add(graph, em.idx, target, EdgeKind::DecisionFalse);
                    }
                    // Unbalanced input: the false edge cannot be resolved
                    // and is omitted.
                    None => {
                        log::warn!(
                            "unbalanced braces: dropping false edge of decision at line {}",
                            em.line
                        );
                    }
                }
            }
            StmtKind::Loop(_) => match matching_close(infos, em.line) {
                Some(close) => {
                    if let Some(body_first) = first_in(em.line + 1, close) {
                        add(graph, em.idx, body_first, EdgeKind::LoopEntry);
                    }
                    if let Some(tail) = last_in(em.line, close) {
                        add(graph, tail.idx, em.idx, EdgeKind::LoopFeedback);
                    }
                    // Loop exit. The close line itself may carry a node
                    // (a do-while tail), hence the inclusive bound.
                    let exit = first_in(close, infos.len())
                        .filter(|&idx| idx != em.idx)
                        .unwrap_or(end);
                    add(graph, em.idx, exit, EdgeKind::Sequential);
                }
                // A body-less loop line, or unbalanced input: fall back to
                // the sequential chain.
                None => add(graph, em.idx, next, EdgeKind::Sequential),
            },
            _ => {
                if !feedback_tails.contains(&em.line) {
                    add(graph, em.idx, next, EdgeKind::Sequential);
                }
            }
        }
    }
}

/// Resolve a decision's false-branch target given the line index of its
/// closing brace: the first node after a bare `else`, the `else if` node
/// itself, or `None` when no else construct follows (the caller then
/// routes past the block to the merge point).
fn false_target(infos: &[LineInfo], emitted: &[Emitted], close: usize) -> Option<NodeIndex> {
    let mut j = close + 1;
    while j < infos.len() {
        match &infos[j].classified {
            Classified::Excluded => j += 1,
            Classified::ElseMarker => {
                // First node after the else opener.
                return emitted.iter().find(|e| e.line > j).map(|e| e.idx);
            }
            Classified::Node {
                stmt: StmtKind::Condition,
                ..
            } => {
                // An `else if` chain continues the decision.
                return emitted.iter().find(|e| e.line == j).map(|e| e.idx);
            }
            _ => return None,
        }
    }
    None
}
