//! Code synthesizer: ProgramModel → source text.
//!
//! A deterministic, purely textual transform over the model snapshot.
//! Indentation tracks brace depth; brace balance itself is not validated
//! here (the linter reports that separately, as an advisory).

use crate::model::ProgramModel;

/// One indent level.
const INDENT_UNIT: &str = "    ";

/// Render the ordered block sequence as a single source string.
///
/// A line that is exactly `}` dedents before it is emitted; a line
/// containing `{` indents everything after it. The level never goes
/// below zero.
#[must_use]
pub fn synthesize(model: &ProgramModel) -> String {
    synthesize_lines(model.blocks().iter().map(|b| b.rendered_line.as_str()))
}

/// Same transform over raw lines, used by tests and by the linter.
pub fn synthesize_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut level: usize = 0;

    for line in lines {
        if line == "}" {
            level = level.saturating_sub(1);
        }
        for _ in 0..level {
            out.push_str(INDENT_UNIT);
        }
        out.push_str(line);
        out.push('\n');
        if line.contains('{') {
            level += 1;
        }
    }

    out
}
