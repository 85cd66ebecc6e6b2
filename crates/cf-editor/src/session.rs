//! The editing session: one explicit context object owning the model and
//! all of its derived projections.
//!
//! No hidden singletons — everything the UI needs hangs off this struct.
//! Projections (source text, flow graph, lint findings, analysis) are
//! recomputed wholesale whenever the model revision moves; they are never
//! patched incrementally.

use crate::commands::{CommandStack, ModelMutation};
use cf_core::analysis::{ProgramAnalysis, analyze};
use cf_core::flowgraph::FlowGraph;
use cf_core::id::Ident;
use cf_core::layout::{CameraFit, LayoutConfig, Viewport, fit_to_view, layout};
use cf_core::lint::{LintDiagnostic, lint_program};
use cf_core::model::{ModelError, ProgramModel};
use cf_core::registry::BlockRegistry;
use cf_core::synth::synthesize;
use cf_render::paint::{DisplayList, RenderOptions, render};
use cf_render::camera::Camera;
use std::collections::HashMap;

/// Undo depth kept per session.
const UNDO_DEPTH: usize = 100;

pub struct EditorSession {
    registry: BlockRegistry,
    model: ProgramModel,
    commands: CommandStack,
    layout_config: LayoutConfig,

    // Derived projections, valid for `derived_revision`.
    derived_revision: Option<u64>,
    source: String,
    graph: FlowGraph,
    diagnostics: Vec<LintDiagnostic>,
    analysis: ProgramAnalysis,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        let model = ProgramModel::new();
        let graph = FlowGraph::build(&model);
        let analysis = analyze(&graph);
        let mut session = EditorSession {
            registry: BlockRegistry::builtin(),
            model,
            commands: CommandStack::new(UNDO_DEPTH),
            layout_config: LayoutConfig::default(),
            derived_revision: None,
            source: String::new(),
            graph,
            diagnostics: Vec::new(),
            analysis,
        };
        session.refresh();
        session
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn model(&self) -> &ProgramModel {
        &self.model
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &[LintDiagnostic] {
        &self.diagnostics
    }

    pub fn analysis(&self) -> ProgramAnalysis {
        self.analysis
    }

    /// Camera framing the current laid-out graph in `viewport`.
    pub fn fit(&self, viewport: Viewport) -> CameraFit {
        fit_to_view(&self.graph, viewport)
    }

    /// Paint the current graph with the given camera and interaction
    /// state.
    pub fn paint(&self, camera: &Camera, opts: &RenderOptions) -> DisplayList {
        render(&self.graph, camera, opts)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    pub fn insert_block(
        &mut self,
        at: usize,
        template_id: Ident,
        values: HashMap<String, String>,
    ) -> Result<(), ModelError> {
        self.execute(
            ModelMutation::Insert {
                at,
                template_id,
                values,
            },
            "insert block",
        )
    }

    pub fn remove_block(&mut self, index: usize) -> Result<(), ModelError> {
        self.execute(ModelMutation::Remove { index }, "remove block")
    }

    pub fn update_block_fields(
        &mut self,
        index: usize,
        values: HashMap<String, String>,
    ) -> Result<(), ModelError> {
        self.execute(ModelMutation::UpdateFields { index, values }, "edit fields")
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        self.execute(ModelMutation::Reorder { from, to }, "reorder blocks")
    }

    /// Bracket a drag gesture: everything in between undoes as one step.
    pub fn begin_drag(&mut self) {
        self.commands.begin_batch(&self.model);
    }

    pub fn end_drag(&mut self) {
        self.commands.end_batch(&self.model);
        self.refresh();
    }

    pub fn undo(&mut self) -> Option<String> {
        let desc = self.commands.undo(&mut self.model, &self.registry);
        self.refresh();
        desc
    }

    pub fn redo(&mut self) -> Option<String> {
        let desc = self.commands.redo(&mut self.model, &self.registry);
        self.refresh();
        desc
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    // ─── Derivation ──────────────────────────────────────────────────────

    /// Recompute every projection if the model moved since the last
    /// derivation. Mutating methods call this themselves; external model
    /// writes (auto-save restore) need an explicit call.
    pub fn refresh(&mut self) {
        let revision = self.model.revision();
        if self.derived_revision == Some(revision) {
            return;
        }
        self.source = synthesize(&self.model);
        let mut graph = FlowGraph::build(&self.model);
        layout(&mut graph, &self.layout_config);
        self.graph = graph;
        self.diagnostics = lint_program(&self.model);
        self.analysis = analyze(&self.graph);
        self.derived_revision = Some(revision);
        log::debug!(
            "projections rebuilt at revision {revision}: {} nodes, {} findings",
            self.graph.node_count(),
            self.diagnostics.len()
        );
    }

    /// Direct mutable model access for restore paths; caller must
    /// `refresh()` afterwards.
    pub fn model_mut(&mut self) -> &mut ProgramModel {
        &mut self.model
    }

    fn execute(&mut self, mutation: ModelMutation, description: &str) -> Result<(), ModelError> {
        self.commands
            .execute(&mut self.model, &self.registry, mutation, description)?;
        self.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::FlowKind;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_session_has_an_empty_start_end_graph() {
        let session = EditorSession::new();
        assert_eq!(session.source(), "");
        assert_eq!(session.graph().node_count(), 2);
        assert!(session.diagnostics().is_empty());
    }

    #[test]
    fn inserting_blocks_updates_every_projection() {
        let mut session = EditorSession::new();
        for (i, id) in ["include", "main", "printf", "return", "closebrace"]
            .iter()
            .enumerate()
        {
            session
                .insert_block(i, Ident::intern(id), HashMap::new())
                .unwrap();
        }
        assert!(session.source().contains("printf(\"Hello, World!\");"));
        assert_eq!(session.graph().node_count(), 3);
        assert!(session.diagnostics().is_empty());
        assert_eq!(session.analysis().complexity, 1);
    }

    #[test]
    fn field_edit_changes_only_that_line() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("printf"), values(&[("text", "one")]))
            .unwrap();
        session
            .insert_block(1, Ident::intern("printf"), values(&[("text", "two")]))
            .unwrap();

        session
            .update_block_fields(0, values(&[("text", "edited")]))
            .unwrap();
        assert!(session.source().contains("edited"));
        assert!(session.source().contains("two"));
        assert!(!session.source().contains("one"));
    }

    #[test]
    fn undo_rolls_back_projections_too() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("if"), HashMap::new())
            .unwrap();
        assert_eq!(session.analysis().decisions, 1);

        session.undo().unwrap();
        assert_eq!(session.analysis().decisions, 0);
        assert_eq!(session.graph().node_count(), 2);
        assert!(session.can_redo());
    }

    #[test]
    fn drag_gesture_is_one_undo_step() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("printf"), HashMap::new())
            .unwrap();

        session.begin_drag();
        session
            .insert_block(1, Ident::intern("scanf"), HashMap::new())
            .unwrap();
        session.reorder(0, 1).unwrap();
        session.end_drag();
        assert_eq!(session.model().len(), 2);

        session.undo().unwrap();
        assert_eq!(session.model().len(), 1);
    }

    #[test]
    fn graph_nodes_are_positioned_after_refresh() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("printf"), HashMap::new())
            .unwrap();
        let fg = session.graph();
        let out = fg
            .nodes_in_order()
            .iter()
            .copied()
            .find(|&i| fg.node(i).kind == FlowKind::Output)
            .unwrap();
        assert!(fg.node(out).y > 0.0);
    }

    #[test]
    fn paint_produces_a_display_list() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("printf"), HashMap::new())
            .unwrap();
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let camera: Camera = session.fit(viewport).into();
        let list = session.paint(&camera, &RenderOptions::new(viewport));
        assert!(!list.is_empty());
    }

    #[test]
    fn lint_surfaces_structural_problems() {
        let mut session = EditorSession::new();
        session
            .insert_block(0, Ident::intern("main"), HashMap::new())
            .unwrap();
        assert!(
            session
                .diagnostics()
                .iter()
                .any(|d| d.rule == "unbalanced-braces")
        );
    }
}
