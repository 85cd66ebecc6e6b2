//! Program structure analysis: node counts and a coarse complexity score.

use crate::classify::FlowKind;
use crate::flowgraph::FlowGraph;

/// Coarse difficulty banding shown to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Summary of the derived flowchart's structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAnalysis {
    /// All nodes, synthetic Start/End included.
    pub total_nodes: usize,
    pub decisions: usize,
    pub loops: usize,
    /// Cyclomatic-ish score: 1 + decisions + 2 × loops.
    pub complexity: u32,
    pub difficulty: Difficulty,
}

/// Analyze the flowchart. Defined for every graph, including the empty
/// Start→End one.
#[must_use]
pub fn analyze(fg: &FlowGraph) -> ProgramAnalysis {
    let mut decisions = 0usize;
    let mut loops = 0usize;
    for &idx in fg.nodes_in_order() {
        match fg.node(idx).kind {
            FlowKind::Decision => decisions += 1,
            FlowKind::Loop => loops += 1,
            _ => {}
        }
    }
    let complexity = 1 + decisions as u32 + 2 * loops as u32;
    let difficulty = if complexity < 2 {
        Difficulty::Beginner
    } else if complexity < 5 {
        Difficulty::Intermediate
    } else {
        Difficulty::Advanced
    };
    ProgramAnalysis {
        total_nodes: fg.node_count(),
        decisions,
        loops,
        complexity,
        difficulty,
    }
}
