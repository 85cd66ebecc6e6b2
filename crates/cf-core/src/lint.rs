//! Advisory lint pass over the program model.
//!
//! Pattern heuristics, not a parser. Findings are non-blocking: synthesis
//! and flowchart derivation run regardless, and the worst case is a
//! warning banner next to a best-effort rendering.

use crate::model::ProgramModel;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed — likely a mistake.
    Warning,
    /// Informational — heuristic, may be a false positive.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The block this diagnostic refers to; `None` for whole-program
    /// findings.
    pub block_index: Option<usize>,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "unbalanced-braces").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the model and return diagnostics.
#[must_use]
pub fn lint_program(model: &ProgramModel) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_brace_balance(model, &mut diags);
    lint_include(model, &mut diags);
    lint_entry_point(model, &mut diags);
    lint_return_in_main(model, &mut diags);
    lint_semicolons(model, &mut diags);
    lint_case_fallthrough(model, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Warn when opening and closing braces do not balance across the program.
fn lint_brace_balance(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    let mut opens = 0usize;
    let mut closes = 0usize;
    for block in model.blocks() {
        opens += block.rendered_line.matches('{').count();
        closes += block.rendered_line.matches('}').count();
    }
    if opens != closes {
        diags.push(LintDiagnostic {
            block_index: None,
            message: format!(
                "Unbalanced braces: {opens} opening vs {closes} closing. The flowchart is a best-effort approximation."
            ),
            severity: LintSeverity::Warning,
            rule: "unbalanced-braces",
        });
    }
}

/// Warn when a non-empty program has no entry-point signature.
fn lint_entry_point(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    if model.is_empty() {
        return;
    }
    let has_main = model
        .blocks()
        .iter()
        .any(|b| b.rendered_line.contains("int main()") || b.rendered_line.contains("void main()"));
    if !has_main {
        diags.push(LintDiagnostic {
            block_index: None,
            message: "No `main` function found — the program will not compile.".to_string(),
            severity: LintSeverity::Warning,
            rule: "missing-entry-point",
        });
    }
}

/// Info when I/O calls are used without any `#include` line.
fn lint_include(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    let uses_io = model
        .blocks()
        .iter()
        .any(|b| b.rendered_line.contains("printf") || b.rendered_line.contains("scanf"));
    let has_include = model
        .blocks()
        .iter()
        .any(|b| b.rendered_line.trim_start().starts_with("#include"));
    if uses_io && !has_include {
        diags.push(LintDiagnostic {
            block_index: None,
            message: "I/O calls without `#include <stdio.h>`.".to_string(),
            severity: LintSeverity::Warning,
            rule: "missing-include",
        });
    }
}

/// Info when `main` never returns a value.
fn lint_return_in_main(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    let has_int_main = model
        .blocks()
        .iter()
        .any(|b| b.rendered_line.contains("int main()"));
    let has_return = model
        .blocks()
        .iter()
        .any(|b| b.rendered_line.trim_start().starts_with("return"));
    if has_int_main && !has_return {
        diags.push(LintDiagnostic {
            block_index: None,
            message: "`int main()` has no `return` statement.".to_string(),
            severity: LintSeverity::Info,
            rule: "missing-return",
        });
    }
}

/// Info when a statement-looking line does not end with a semicolon.
fn lint_semicolons(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    for (index, block) in model.blocks().iter().enumerate() {
        let line = block.rendered_line.trim();
        if needs_semicolon(line) && !line.ends_with(';') {
            diags.push(LintDiagnostic {
                block_index: Some(index),
                message: format!("Possible missing semicolon: `{line}`."),
                severity: LintSeverity::Info,
                rule: "missing-semicolon",
            });
        }
    }
}

/// Info when a `case` label is followed by another `case`/`default`
/// without a `break;` in between.
fn lint_case_fallthrough(model: &ProgramModel, diags: &mut Vec<LintDiagnostic>) {
    let mut open_case: Option<usize> = None;
    for (index, block) in model.blocks().iter().enumerate() {
        let line = block.rendered_line.trim();
        let is_label = line.starts_with("case ") || line == "default:";
        if is_label {
            if let Some(prev) = open_case {
                diags.push(LintDiagnostic {
                    block_index: Some(prev),
                    message: "`case` falls through to the next label — add `break;` if unintended."
                        .to_string(),
                    severity: LintSeverity::Info,
                    rule: "case-fallthrough",
                });
            }
            open_case = Some(index);
        } else if line.starts_with("break") || line == "}" {
            open_case = None;
        }
    }
}

/// Whether a line looks like a statement that should end with `;`.
/// Block openers/closers, labels, preprocessor lines and comments are out.
fn needs_semicolon(line: &str) -> bool {
    if line.is_empty()
        || line.ends_with('{')
        || line.ends_with('}')
        || line.ends_with(':')
        || line.starts_with('#')
        || line.starts_with("//")
        || line.starts_with("/*")
        || line.ends_with("*/")
        || line == "else"
    {
        return false;
    }
    true
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Ident;
    use crate::registry::BlockRegistry;
    use std::collections::HashMap;

    fn model_from(ids: &[&str]) -> ProgramModel {
        let reg = BlockRegistry::builtin();
        let mut model = ProgramModel::new();
        for (i, id) in ids.iter().enumerate() {
            model
                .insert_block(i, Ident::intern(id), HashMap::new(), &reg)
                .unwrap();
        }
        model
    }

    #[test]
    fn lint_unbalanced_braces() {
        let model = model_from(&["main", "printf"]);
        let diags = lint_program(&model);
        assert!(
            diags.iter().any(|d| d.rule == "unbalanced-braces"),
            "expected unbalanced-braces diagnostic"
        );
    }

    #[test]
    fn lint_missing_entry_point() {
        let model = model_from(&["printf"]);
        let diags = lint_program(&model);
        assert!(
            diags.iter().any(|d| d.rule == "missing-entry-point"),
            "expected missing-entry-point diagnostic"
        );
    }

    #[test]
    fn semicolon_heuristic_spares_structure_and_comments() {
        assert!(!needs_semicolon("int main() {"));
        assert!(!needs_semicolon("}"));
        assert!(!needs_semicolon("case 1:"));
        assert!(!needs_semicolon("#define MAX 100"));
        assert!(!needs_semicolon("// comment"));
        assert!(needs_semicolon("printf(\"x\")"));
        assert!(needs_semicolon("x = 1"));
    }

    #[test]
    fn lint_missing_include_and_return() {
        let model = model_from(&["main", "printf", "closebrace"]);
        let diags = lint_program(&model);
        assert!(diags.iter().any(|d| d.rule == "missing-include"));
        assert!(diags.iter().any(|d| d.rule == "missing-return"));
    }

    #[test]
    fn lint_case_fallthrough() {
        let reg = BlockRegistry::builtin();
        let mut model = ProgramModel::new();
        let mut case1 = HashMap::new();
        case1.insert("value".to_string(), "1".to_string());
        model
            .insert_block(0, Ident::intern("case"), case1, &reg)
            .unwrap();
        model
            .insert_block(1, Ident::intern("printf"), HashMap::new(), &reg)
            .unwrap();
        let mut case2 = HashMap::new();
        case2.insert("value".to_string(), "2".to_string());
        model
            .insert_block(2, Ident::intern("case"), case2, &reg)
            .unwrap();
        let diags = lint_program(&model);
        let fallthrough: Vec<_> = diags
            .iter()
            .filter(|d| d.rule == "case-fallthrough")
            .collect();
        assert_eq!(fallthrough.len(), 1);
        assert_eq!(fallthrough[0].block_index, Some(0));
    }

    #[test]
    fn lint_break_silences_fallthrough() {
        let mut model = ProgramModel::new();
        let reg = BlockRegistry::builtin();
        for (i, id) in ["case", "printf", "break", "default"].iter().enumerate() {
            model
                .insert_block(i, Ident::intern(id), HashMap::new(), &reg)
                .unwrap();
        }
        let diags = lint_program(&model);
        assert!(diags.iter().all(|d| d.rule != "case-fallthrough"));
    }

    #[test]
    fn lint_clean_program_no_diags() {
        let model = model_from(&["include", "main", "printf", "return", "closebrace"]);
        let diags = lint_program(&model);
        assert!(diags.is_empty(), "clean program should lint clean: {diags:?}");
    }
}
