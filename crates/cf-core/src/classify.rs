//! Flow classifier: one rendered source line → a flow-node kind and label.
//!
//! This is deliberately a toy classifier — ordered pattern rules over the
//! line text, first match wins — not a parser. The rule order is
//! load-bearing: a line can match several rules (an output call also
//! contains `=`-free parens, a declaration also contains `=`), and the
//! earlier rule decides.

use serde::{Deserialize, Serialize};

/// Visual kind of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Start,
    End,
    Process,
    Decision,
    Loop,
    Input,
    Output,
    Declaration,
}

/// Which loop construct a loop line uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopStyle {
    For,
    While,
    DoWhile,
}

/// Semantic statement kind, richer than [`FlowKind`]: `Return` and
/// `Assignment` both render as generic process shapes, but the graph
/// builder treats them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtKind {
    Output,
    Input,
    Condition,
    Loop(LoopStyle),
    Return,
    Declaration,
    Assignment,
    Other,
}

impl StmtKind {
    /// The shape kind used for a node of this statement kind.
    pub fn flow_kind(self) -> FlowKind {
        match self {
            StmtKind::Output => FlowKind::Output,
            StmtKind::Input => FlowKind::Input,
            StmtKind::Condition => FlowKind::Decision,
            StmtKind::Loop(_) => FlowKind::Loop,
            StmtKind::Declaration => FlowKind::Declaration,
            StmtKind::Return | StmtKind::Assignment | StmtKind::Other => FlowKind::Process,
        }
    }
}

/// Result of classifying one rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Preprocessor directives and the program-entry signature: present in
    /// the source, absent from the flowchart.
    Excluded,
    /// A standalone `}`: consumed structurally to decrement nesting.
    CloseBrace,
    /// A bare `else` opener: structural branch marker, not a node.
    ElseMarker,
    /// A line that becomes a flow node.
    Node {
        stmt: StmtKind,
        kind: FlowKind,
        label: String,
    },
}

/// Longest label before truncation.
const LABEL_BUDGET: usize = 20;

/// Classify one rendered line. First matching rule wins.
pub fn classify_line(line: &str) -> Classified {
    let code = line.trim();

    if code.is_empty() {
        return Classified::Excluded;
    }
    if code == "}" {
        return Classified::CloseBrace;
    }
    // Rule 1: preprocessor directives never reach the flowchart.
    if code.starts_with('#') {
        return Classified::Excluded;
    }
    // Rule 2: the entry-point signature never reaches the flowchart.
    if code.contains("int main()") || code.contains("void main()") {
        return Classified::Excluded;
    }
    if code == "else {" || code == "else" {
        return Classified::ElseMarker;
    }

    // Rule 3: output calls.
    if has_keyword(code, "printf") || has_keyword(code, "puts") {
        return node(StmtKind::Output, output_label(code));
    }
    // Rule 4: input calls.
    if has_keyword(code, "scanf") || has_keyword(code, "gets") {
        return node(StmtKind::Input, input_label(code));
    }
    // Rule 5: conditionals. Catches `else if (...)` too.
    if has_keyword(code, "if") && code.contains('(') {
        return node(StmtKind::Condition, condition_label(code));
    }
    // Rule 6: loops.
    if has_keyword(code, "for") {
        return node(StmtKind::Loop(LoopStyle::For), for_label(code));
    }
    if has_keyword(code, "while") {
        // Covers both `while (...) {` and the `} while (...);` tail of a
        // do-while; the builder resolves which is which by position.
        return node(StmtKind::Loop(LoopStyle::While), while_label(code));
    }
    if has_keyword(code, "do") {
        return node(StmtKind::Loop(LoopStyle::DoWhile), "Loop".to_string());
    }
    // Rule 7: return statements.
    if has_keyword(code, "return") {
        return node(StmtKind::Return, "Return".to_string());
    }
    // Rule 8: declarations — a known type keyword followed by an identifier.
    if let Some(name) = declared_identifier(code) {
        return node(StmtKind::Declaration, format!("Declare: {name}"));
    }
    // Rule 9: assignments — `=` present, `==` absent.
    if code.contains('=') && !code.contains("==") {
        return node(StmtKind::Assignment, assignment_label(code));
    }
    // Rule 10: generic process.
    node(StmtKind::Other, truncate_label(code))
}

fn node(stmt: StmtKind, label: String) -> Classified {
    Classified::Node {
        stmt,
        kind: stmt.flow_kind(),
        label,
    }
}

/// Keyword match with identifier boundaries, so `double` is not a `do`
/// loop and `printfx` is not an output call.
fn has_keyword(code: &str, keyword: &str) -> bool {
    let bytes = code.as_bytes();
    let mut from = 0;
    while let Some(pos) = code[from..].find(keyword) {
        let start = from + pos;
        let end = start + keyword.len();
        let before_ok = start == 0 || !is_ident_char(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_ident_char(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
    }
    false
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Truncate to the label budget with an ellipsis marker.
pub fn truncate_label(code: &str) -> String {
    if code.chars().count() > LABEL_BUDGET {
        let head: String = code.chars().take(LABEL_BUDGET - 3).collect();
        format!("{head}...")
    } else {
        code.to_string()
    }
}

/// Pull the first quoted literal argument, e.g. `Print: "Hello"`.
fn output_label(code: &str) -> String {
    if let Some(open) = code.find('"') {
        if let Some(len) = code[open + 1..].find('"') {
            let literal = &code[open + 1..open + 1 + len];
            return format!("Print: \"{literal}\"");
        }
    }
    "Output".to_string()
}

/// Pull the destination variable of a read call, e.g. `Read: number`.
fn input_label(code: &str) -> String {
    if let Some(amp) = code.find('&') {
        let rest = &code[amp + 1..];
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() {
            return format!("Read: {name}");
        }
    }
    "Input".to_string()
}

/// The condition text between the first parens, verbatim.
fn condition_label(code: &str) -> String {
    paren_group(code)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "Condition".to_string())
}

/// The middle clause of a `for` header, e.g. `For: i < n`.
fn for_label(code: &str) -> String {
    let clauses: Vec<&str> = code.splitn(3, ';').collect();
    if clauses.len() >= 2 {
        let cond = clauses[1].trim();
        if !cond.is_empty() {
            return format!("For: {cond}");
        }
    }
    "For Loop".to_string()
}

/// The loop condition of a `while` header, e.g. `While: i < 10`.
fn while_label(code: &str) -> String {
    paren_group(code)
        .map(|c| format!("While: {c}"))
        .unwrap_or_else(|| "While Loop".to_string())
}

/// Text between the first `(` and the first `)` after it, trimmed.
fn paren_group(code: &str) -> Option<&str> {
    let open = code.find('(')?;
    let close = code[open + 1..].find(')')?;
    let inner = code[open + 1..open + 1 + close].trim();
    (!inner.is_empty()).then_some(inner)
}

/// If the line declares a variable (`int x`, `float total = 0;`),
/// return the declared identifier.
fn declared_identifier(code: &str) -> Option<String> {
    const TYPES: [&str; 6] = ["int", "float", "double", "char", "long", "short"];
    let mut words = code.split_whitespace();
    let first = words.next()?;
    if !TYPES.contains(&first) {
        return None;
    }
    let second = words.next()?;
    let name: String = second
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// `<lhs> = <rhs>` with the trailing semicolon stripped.
fn assignment_label(code: &str) -> String {
    match code.split_once('=') {
        Some((lhs, rhs)) => {
            let lhs = lhs.trim();
            let rhs = rhs.trim().trim_end_matches(';').trim();
            if lhs.is_empty() || rhs.is_empty() {
                "Assignment".to_string()
            } else {
                format!("{lhs} = {rhs}")
            }
        }
        None => "Assignment".to_string(),
    }
}
