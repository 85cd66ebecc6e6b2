//! Text-editor collaborator port.
//!
//! The core treats the code editor as an opaque sink/source of the
//! synthesized text. Writing only when the content actually changed keeps
//! the editor's own undo history and scroll position intact.

/// What the embedding editor widget must provide.
pub trait TextEditor {
    fn value(&self) -> String;
    fn set_value(&mut self, text: &str);
    /// Byte offset of the cursor.
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, pos: usize);
    /// Re-indent / prettify. Optional; default is a no-op.
    fn format_document(&mut self) {}
}

/// Push the synthesized source into the editor, restoring the cursor when
/// it still lands inside the new text. No-op when the content matches.
pub fn sync_source(editor: &mut dyn TextEditor, source: &str) {
    if editor.value() == source {
        return;
    }
    let cursor = editor.cursor();
    editor.set_value(source);
    editor.set_cursor(cursor.min(source.len()));
}

/// In-memory editor, used in tests and headless runs.
#[derive(Debug, Default)]
pub struct BufferEditor {
    text: String,
    cursor: usize,
}

impl TextEditor for BufferEditor {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.cursor.min(self.text.len());
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.text.len());
    }
}
