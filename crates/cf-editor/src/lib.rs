pub mod commands;
pub mod runner;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod text;

pub use commands::{Command, CommandStack, ModelMutation};
pub use runner::{ExecService, RunGate, RunOutcome, RunRequest, execution_path, run_program};
pub use schedule::{DEBOUNCE_DELAY, Debouncer};
pub use session::EditorSession;
pub use storage::{Autosave, KvStore, Preferences, ThemeChoice, load_preferences, save_preferences};
pub use text::{BufferEditor, TextEditor, sync_source};
