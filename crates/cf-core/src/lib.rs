pub mod analysis;
pub mod classify;
pub mod flowgraph;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod registry;
pub mod synth;

pub use analysis::{Difficulty, ProgramAnalysis, analyze};
pub use classify::{Classified, FlowKind, LoopStyle, StmtKind, classify_line};
pub use flowgraph::{EdgeKind, FlowEdge, FlowGraph, FlowNode};
pub use id::Ident;
pub use layout::{CameraFit, LayoutConfig, Viewport, fit_to_view, layout, node_size};
pub use lint::{LintDiagnostic, LintSeverity, lint_program};
pub use model::{ModelError, PlacedBlock, ProgramModel};
pub use registry::{BlockRegistry, BlockTemplate, Category, FieldKind, FieldSpec, render_line};
pub use synth::synthesize;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
