//! The program model: an ordered sequence of placed blocks.
//!
//! Order is significant — it is the program's line order. The model is the
//! single source of truth; the synthesizer and the flow pipeline are
//! derived, disposable projections recomputed in full on every change.
//! Every mutating operation leaves the model internally consistent
//! (rendered lines match field values) before returning, and bumps the
//! revision counter that downstream stages watch.

use crate::id::Ident;
use crate::registry::{BlockRegistry, render_line};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A placed instance of a template with user-filled parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub template_id: Ident,
    pub field_values: HashMap<String, String>,
    /// The pattern with placeholders substituted. Always consistent with
    /// `field_values`; recomputed on every field edit.
    pub rendered_line: String,
}

/// Errors from model mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownTemplate(Ident),
    IndexOutOfBounds { index: usize, len: usize },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownTemplate(id) => write!(f, "unknown block template `{id}`"),
            ModelError::IndexOutOfBounds { index, len } => {
                write!(f, "block index {index} out of bounds (len {len})")
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// The ordered block sequence.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    blocks: Vec<PlacedBlock>,
    revision: u64,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic change counter. Downstream stages compare against the
    /// revision they last derived from and recompute when it moved.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, index: usize) -> Option<&PlacedBlock> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[PlacedBlock] {
        &self.blocks
    }

    /// Insert a template instance at `at` (clamped to the end), rendering
    /// its line from `values` merged over the template defaults.
    pub fn insert_block(
        &mut self,
        at: usize,
        template_id: Ident,
        values: HashMap<String, String>,
        registry: &BlockRegistry,
    ) -> Result<(), ModelError> {
        let template = registry
            .lookup(template_id)
            .ok_or(ModelError::UnknownTemplate(template_id))?;
        let rendered_line = render_line(template, &values);
        let at = at.min(self.blocks.len());
        self.blocks.insert(
            at,
            PlacedBlock {
                template_id,
                field_values: values,
                rendered_line,
            },
        );
        self.touch();
        Ok(())
    }

    /// Remove the block at `index`. Later blocks shift down — no gaps.
    pub fn remove_block(&mut self, index: usize) -> Result<PlacedBlock, ModelError> {
        if index >= self.blocks.len() {
            return Err(self.out_of_bounds(index));
        }
        let removed = self.blocks.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Replace the field values of the block at `index` and re-render its
    /// line before returning. No other block is touched.
    pub fn update_block_fields(
        &mut self,
        index: usize,
        values: HashMap<String, String>,
        registry: &BlockRegistry,
    ) -> Result<(), ModelError> {
        if index >= self.blocks.len() {
            return Err(self.out_of_bounds(index));
        }
        let template_id = self.blocks[index].template_id;
        let template = registry
            .lookup(template_id)
            .ok_or(ModelError::UnknownTemplate(template_id))?;
        let rendered_line = render_line(template, &values);
        let block = &mut self.blocks[index];
        block.field_values = values;
        block.rendered_line = rendered_line;
        self.touch();
        Ok(())
    }

    /// Move the block at `from` to position `to` (drop reordering).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        let len = self.blocks.len();
        if from >= len {
            return Err(self.out_of_bounds(from));
        }
        if to >= len {
            return Err(self.out_of_bounds(to));
        }
        if from != to {
            let block = self.blocks.remove(from);
            self.blocks.insert(to, block);
            self.touch();
        }
        Ok(())
    }

    /// An owned copy of the ordered sequence, for persistence and for the
    /// derivation stages.
    pub fn snapshot(&self) -> Vec<PlacedBlock> {
        self.blocks.clone()
    }

    /// Replace the whole sequence from a snapshot (undo, auto-save restore).
    /// Lines are re-rendered against the registry so the consistency
    /// invariant holds even for snapshots from an older catalog.
    pub fn restore(
        &mut self,
        snapshot: Vec<PlacedBlock>,
        registry: &BlockRegistry,
    ) -> Result<(), ModelError> {
        let mut blocks = Vec::with_capacity(snapshot.len());
        for mut block in snapshot {
            let template = registry
                .lookup(block.template_id)
                .ok_or(ModelError::UnknownTemplate(block.template_id))?;
            block.rendered_line = render_line(template, &block.field_values);
            blocks.push(block);
        }
        self.blocks = blocks;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn out_of_bounds(&self, index: usize) -> ModelError {
        ModelError::IndexOutOfBounds {
            index,
            len: self.blocks.len(),
        }
    }
}
