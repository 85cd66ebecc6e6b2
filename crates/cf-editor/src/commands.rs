//! Undo/Redo command stack.
//!
//! Every model mutation is wrapped in a reversible `Command`. Commands are
//! pushed to a stack; undo pops and applies the inverse.
//!
//! Drag gestures use **snapshot batching**: the full block sequence is
//! captured at the start and end of the gesture, so undo/redo replaces the
//! whole model in a single step (no per-mutation inverse chain).

use cf_core::id::Ident;
use cf_core::model::{ModelError, PlacedBlock, ProgramModel};
use cf_core::registry::BlockRegistry;
use std::collections::HashMap;

/// One model mutation, replayable in either direction.
#[derive(Debug, Clone)]
pub enum ModelMutation {
    Insert {
        at: usize,
        template_id: Ident,
        values: HashMap<String, String>,
    },
    Remove {
        index: usize,
    },
    UpdateFields {
        index: usize,
        values: HashMap<String, String>,
    },
    Reorder {
        from: usize,
        to: usize,
    },
}

impl ModelMutation {
    fn apply(&self, model: &mut ProgramModel, registry: &BlockRegistry) -> Result<(), ModelError> {
        match self {
            ModelMutation::Insert {
                at,
                template_id,
                values,
            } => model.insert_block(*at, *template_id, values.clone(), registry),
            ModelMutation::Remove { index } => model.remove_block(*index).map(|_| ()),
            ModelMutation::UpdateFields { index, values } => {
                model.update_block_fields(*index, values.clone(), registry)
            }
            ModelMutation::Reorder { from, to } => model.reorder(*from, *to),
        }
    }
}

/// A command capturing both a forward mutation and its inverse.
#[derive(Debug, Clone)]
pub enum Command {
    /// Single mutation with its inverse (non-batch operations).
    Single {
        forward: Box<ModelMutation>,
        inverse: Box<ModelMutation>,
        description: String,
    },
    /// Snapshot-based batch: the full block sequence before and after a
    /// gesture.
    Snapshot {
        blocks_before: Vec<PlacedBlock>,
        blocks_after: Vec<PlacedBlock>,
        description: String,
    },
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured at the start of a batch.
    batch_snapshot: Option<Vec<PlacedBlock>>,
    /// Whether any mutations occurred during the current batch.
    batch_dirty: bool,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch group. All mutations until `end_batch()` are applied
    /// live but tracked as one atomic undo step.
    pub fn begin_batch(&mut self, model: &ProgramModel) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(model.snapshot());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes, if anything
    /// changed, push one snapshot command to the undo stack.
    pub fn end_batch(&mut self, model: &ProgramModel) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if self.batch_dirty {
                let blocks_after = model.snapshot();
                let blocks_before = self.batch_snapshot.take().unwrap_or_default();
                if !blocks_equal(&blocks_before, &blocks_after) {
                    self.push(Command::Snapshot {
                        blocks_before,
                        blocks_after,
                        description: "drag edit".to_string(),
                    });
                }
            }
            self.batch_snapshot = None;
            self.batch_dirty = false;
        }
    }

    /// Apply a mutation to the model and push it to the undo stack.
    pub fn execute(
        &mut self,
        model: &mut ProgramModel,
        registry: &BlockRegistry,
        mutation: ModelMutation,
        description: &str,
    ) -> Result<(), ModelError> {
        if self.batch_depth > 0 {
            // Inside a batch: apply live, the snapshot at end_batch()
            // captures the cumulative effect.
            mutation.apply(model, registry)?;
            self.batch_dirty = true;
            return Ok(());
        }

        let inverse = compute_inverse(model, &mutation)?;
        mutation.apply(model, registry)?;
        self.push(Command::Single {
            forward: Box::new(mutation),
            inverse: Box::new(inverse),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Undo the last command. Returns its description.
    pub fn undo(
        &mut self,
        model: &mut ProgramModel,
        registry: &BlockRegistry,
    ) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                inverse,
                description,
                ..
            } => {
                if let Err(e) = inverse.apply(model, registry) {
                    log::warn!("undo failed: {e}");
                }
                description.clone()
            }
            Command::Snapshot {
                blocks_before,
                description,
                ..
            } => {
                if let Err(e) = model.restore(blocks_before.clone(), registry) {
                    log::warn!("undo restore failed: {e}");
                }
                description.clone()
            }
        };
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(
        &mut self,
        model: &mut ProgramModel,
        registry: &BlockRegistry,
    ) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                forward,
                description,
                ..
            } => {
                if let Err(e) = forward.apply(model, registry) {
                    log::warn!("redo failed: {e}");
                }
                description.clone()
            }
            Command::Snapshot {
                blocks_after,
                description,
                ..
            } => {
                if let Err(e) = model.restore(blocks_after.clone(), registry) {
                    log::warn!("redo restore failed: {e}");
                }
                description.clone()
            }
        };
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // New action invalidates the redo history.
        self.redo_stack.clear();
    }
}

/// Compute the inverse mutation needed to undo `mutation`, reading any
/// state it will destroy from the current model.
fn compute_inverse(
    model: &ProgramModel,
    mutation: &ModelMutation,
) -> Result<ModelMutation, ModelError> {
    match mutation {
        ModelMutation::Insert { at, .. } => Ok(ModelMutation::Remove {
            index: (*at).min(model.len()),
        }),
        ModelMutation::Remove { index } => {
            let block = model.block(*index).ok_or(ModelError::IndexOutOfBounds {
                index: *index,
                len: model.len(),
            })?;
            Ok(ModelMutation::Insert {
                at: *index,
                template_id: block.template_id,
                values: block.field_values.clone(),
            })
        }
        ModelMutation::UpdateFields { index, .. } => {
            let block = model.block(*index).ok_or(ModelError::IndexOutOfBounds {
                index: *index,
                len: model.len(),
            })?;
            Ok(ModelMutation::UpdateFields {
                index: *index,
                values: block.field_values.clone(),
            })
        }
        ModelMutation::Reorder { from, to } => Ok(ModelMutation::Reorder {
            from: *to,
            to: *from,
        }),
    }
}

fn blocks_equal(a: &[PlacedBlock], b: &[PlacedBlock]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.template_id == y.template_id && x.rendered_line == y.rendered_line
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::synth::synthesize;
    use pretty_assertions::assert_eq;

    fn setup() -> (ProgramModel, BlockRegistry, CommandStack) {
        (
            ProgramModel::new(),
            BlockRegistry::builtin(),
            CommandStack::new(100),
        )
    }

    fn insert(id: &str, at: usize) -> ModelMutation {
        ModelMutation::Insert {
            at,
            template_id: Ident::intern(id),
            values: HashMap::new(),
        }
    }

    #[test]
    fn insert_then_undo_restores_the_model() {
        let (mut model, reg, mut stack) = setup();
        stack
            .execute(&mut model, &reg, insert("printf", 0), "insert printf")
            .unwrap();
        assert_eq!(model.len(), 1);

        let desc = stack.undo(&mut model, &reg).unwrap();
        assert_eq!(desc, "insert printf");
        assert!(model.is_empty());

        stack.redo(&mut model, &reg).unwrap();
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn remove_undo_brings_the_block_back_in_place() {
        let (mut model, reg, mut stack) = setup();
        for (i, id) in ["include", "main", "printf"].iter().enumerate() {
            stack
                .execute(&mut model, &reg, insert(id, i), "insert")
                .unwrap();
        }
        let before = synthesize(&model);

        stack
            .execute(&mut model, &reg, ModelMutation::Remove { index: 1 }, "remove")
            .unwrap();
        assert_eq!(model.len(), 2);

        stack.undo(&mut model, &reg).unwrap();
        assert_eq!(synthesize(&model), before);
    }

    #[test]
    fn field_update_undo_restores_old_values() {
        let (mut model, reg, mut stack) = setup();
        stack
            .execute(&mut model, &reg, insert("printf", 0), "insert")
            .unwrap();

        let mut values = HashMap::new();
        values.insert("text".to_string(), "edited".to_string());
        stack
            .execute(
                &mut model,
                &reg,
                ModelMutation::UpdateFields { index: 0, values },
                "edit field",
            )
            .unwrap();
        assert_eq!(model.block(0).unwrap().rendered_line, "printf(\"edited\");");

        stack.undo(&mut model, &reg).unwrap();
        assert_eq!(
            model.block(0).unwrap().rendered_line,
            "printf(\"Hello, World!\");"
        );
    }

    #[test]
    fn batch_collapses_to_one_undo_step() {
        let (mut model, reg, mut stack) = setup();
        stack
            .execute(&mut model, &reg, insert("printf", 0), "insert")
            .unwrap();

        stack.begin_batch(&model);
        stack
            .execute(&mut model, &reg, insert("return", 1), "drag")
            .unwrap();
        stack
            .execute(
                &mut model,
                &reg,
                ModelMutation::Reorder { from: 0, to: 1 },
                "drag",
            )
            .unwrap();
        stack.end_batch(&model);
        assert_eq!(model.len(), 2);

        stack.undo(&mut model, &reg).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.block(0).unwrap().template_id, Ident::intern("printf"));
    }

    #[test]
    fn empty_batch_pushes_nothing() {
        let (model, _reg, mut stack) = setup();
        stack.begin_batch(&model);
        stack.end_batch(&model);
        assert!(!stack.can_undo());
    }

    #[test]
    fn new_action_clears_redo() {
        let (mut model, reg, mut stack) = setup();
        stack
            .execute(&mut model, &reg, insert("printf", 0), "a")
            .unwrap();
        stack.undo(&mut model, &reg).unwrap();
        assert!(stack.can_redo());

        stack
            .execute(&mut model, &reg, insert("scanf", 0), "b")
            .unwrap();
        assert!(!stack.can_redo());
    }
}
