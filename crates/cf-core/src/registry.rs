//! Static catalog of code-fragment templates.
//!
//! A template is pure data: a display label, a source pattern with
//! `${name}` placeholders, and the ordered list of editable fields that
//! fill those placeholders. Substitution is a pure function — no DOM, no
//! side effects — so the catalog is independently testable.

use crate::id::Ident;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Palette grouping for a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Io,
    Variables,
    Control,
    Loops,
    Functions,
    Preprocessor,
    Memory,
    Operators,
    Misc,
}

/// What kind of input a field accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// One of an enumerated list of choices.
    Choice(Vec<String>),
}

/// One editable field of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Hint shown when the field is empty.
    pub placeholder: String,
    /// Value substituted when the user supplies none.
    pub default: String,
}

impl FieldSpec {
    fn text(name: &str, placeholder: &str, default: &str) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            placeholder: placeholder.into(),
            default: default.into(),
        }
    }

    fn choice(name: &str, options: &[&str], default: &str) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Choice(options.iter().map(|s| s.to_string()).collect()),
            placeholder: default.into(),
            default: default.into(),
        }
    }
}

/// An immutable catalog entry. Created at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub id: Ident,
    /// Short label shown in the palette, e.g. `printf("...")`.
    pub display: String,
    /// Source pattern with `${name}` placeholders.
    pub pattern: String,
    pub category: Category,
    pub fields: Vec<FieldSpec>,
}

impl BlockTemplate {
    fn new(id: &str, display: &str, pattern: &str, category: Category, fields: Vec<FieldSpec>) -> Self {
        Self {
            id: Ident::intern(id),
            display: display.into(),
            pattern: pattern.into(),
            category,
            fields,
        }
    }
}

/// Substitute every declared placeholder in `template` with the supplied
/// value, falling back to the field default when the value is absent or
/// empty. Placeholders with no declared field are left verbatim — this is
/// deliberate, not an error.
pub fn render_line(template: &BlockTemplate, values: &HashMap<String, String>) -> String {
    let mut line = template.pattern.clone();
    for field in &template.fields {
        let value = values
            .get(&field.name)
            .filter(|v| !v.is_empty())
            .unwrap_or(&field.default);
        line = line.replace(&format!("${{{}}}", field.name), value);
    }
    line
}

/// The template catalog, keyed by id, preserving palette order.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    templates: HashMap<Ident, BlockTemplate>,
    order: Vec<Ident>,
}

impl BlockRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn insert(&mut self, template: BlockTemplate) {
        let id = template.id;
        if self.templates.insert(id, template).is_none() {
            self.order.push(id);
        }
    }

    /// Look up a template by id.
    pub fn lookup(&self, id: Ident) -> Option<&BlockTemplate> {
        self.templates.get(&id)
    }

    /// All templates in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockTemplate> {
        self.order.iter().filter_map(|id| self.templates.get(id))
    }

    /// Templates belonging to one palette category.
    pub fn by_category(&self, category: Category) -> Vec<&BlockTemplate> {
        self.iter().filter(|t| t.category == category).collect()
    }

    /// Case-insensitive palette search over id, display label, and pattern.
    pub fn search(&self, term: &str) -> Vec<&BlockTemplate> {
        let term = term.to_lowercase();
        self.iter()
            .filter(|t| {
                t.id.as_str().to_lowercase().contains(&term)
                    || t.display.to_lowercase().contains(&term)
                    || t.pattern.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The built-in C catalog.
    pub fn builtin() -> Self {
        use Category::*;
        let mut reg = Self::empty();
        let templates = [
            BlockTemplate::new(
                "printf",
                "printf(\"...\")",
                "printf(\"${text}\");",
                Io,
                vec![FieldSpec::text("text", "Hello, World!", "Hello, World!")],
            ),
            BlockTemplate::new(
                "scanf",
                "scanf(\"...\", &...)",
                "scanf(\"${format}\", &${variable});",
                Io,
                vec![
                    FieldSpec::text("format", "%d", "%d"),
                    FieldSpec::text("variable", "number", "number"),
                ],
            ),
            BlockTemplate::new(
                "variable",
                "variable declaration",
                "${type} ${name} = ${value};",
                Variables,
                vec![
                    FieldSpec::choice(
                        "type",
                        &["int", "float", "char", "double", "long", "short"],
                        "int",
                    ),
                    FieldSpec::text("name", "variable", "number"),
                    FieldSpec::text("value", "0", "0"),
                ],
            ),
            BlockTemplate::new(
                "assign",
                "assignment",
                "${variable} = ${value};",
                Variables,
                vec![
                    FieldSpec::text("variable", "variable", "number"),
                    FieldSpec::text("value", "value", "42"),
                ],
            ),
            BlockTemplate::new(
                "array",
                "array declaration",
                "${type} ${name}[${size}];",
                Variables,
                vec![
                    FieldSpec::choice("type", &["int", "float", "char", "double"], "int"),
                    FieldSpec::text("name", "array", "numbers"),
                    FieldSpec::text("size", "10", "10"),
                ],
            ),
            BlockTemplate::new(
                "if",
                "if (...) {",
                "if (${condition}) {",
                Control,
                vec![FieldSpec::text(
                    "condition",
                    "number % 2 == 0",
                    "number % 2 == 0",
                )],
            ),
            BlockTemplate::new("else", "else {", "else {", Control, vec![]),
            BlockTemplate::new(
                "elseif",
                "else if (...) {",
                "else if (${condition}) {",
                Control,
                vec![FieldSpec::text("condition", "condition", "number > 0")],
            ),
            BlockTemplate::new(
                "for",
                "for (...; ...; ...) {",
                "for (${init}; ${condition}; ${update}) {",
                Loops,
                vec![
                    FieldSpec::text("init", "int i = 0", "int i = 0"),
                    FieldSpec::text("condition", "i < n", "i < n"),
                    FieldSpec::text("update", "i++", "i++"),
                ],
            ),
            BlockTemplate::new(
                "while",
                "while (...) {",
                "while (${condition}) {",
                Loops,
                vec![FieldSpec::text("condition", "condition", "i < 10")],
            ),
            BlockTemplate::new("dowhile", "do {", "do {", Loops, vec![]),
            BlockTemplate::new(
                "whileend",
                "} while (...);",
                "} while (${condition});",
                Loops,
                vec![FieldSpec::text("condition", "condition", "i < 10")],
            ),
            BlockTemplate::new("break", "break;", "break;", Control, vec![]),
            BlockTemplate::new("continue", "continue;", "continue;", Control, vec![]),
            BlockTemplate::new(
                "function",
                "function declaration",
                "${returnType} ${name}(${parameters}) {",
                Functions,
                vec![
                    FieldSpec::choice(
                        "returnType",
                        &["void", "int", "float", "char", "double"],
                        "int",
                    ),
                    FieldSpec::text("name", "functionName", "calculate"),
                    FieldSpec::text("parameters", "int a, int b", "int x, int y"),
                ],
            ),
            BlockTemplate::new(
                "return",
                "return ...",
                "return ${value};",
                Functions,
                vec![FieldSpec::text("value", "value", "0")],
            ),
            BlockTemplate::new(
                "switch",
                "switch (...) {",
                "switch (${variable}) {",
                Control,
                vec![FieldSpec::text("variable", "variable", "choice")],
            ),
            BlockTemplate::new(
                "case",
                "case ...:",
                "case ${value}:",
                Control,
                vec![FieldSpec::text("value", "1", "1")],
            ),
            BlockTemplate::new("default", "default:", "default:", Control, vec![]),
            BlockTemplate::new(
                "comment",
                "// comment",
                "// ${text}",
                Misc,
                vec![FieldSpec::text("text", "Comment text", "This is a comment")],
            ),
            BlockTemplate::new(
                "multicomment",
                "/* comment */",
                "/* ${text} */",
                Misc,
                vec![FieldSpec::text("text", "Comment text", "Multi-line comment")],
            ),
            BlockTemplate::new(
                "define",
                "#define ...",
                "#define ${name} ${value}",
                Preprocessor,
                vec![
                    FieldSpec::text("name", "CONSTANT", "MAX_SIZE"),
                    FieldSpec::text("value", "100", "100"),
                ],
            ),
            BlockTemplate::new(
                "include",
                "#include <...>",
                "#include <${header}>",
                Preprocessor,
                vec![FieldSpec::choice(
                    "header",
                    &["stdio.h", "stdlib.h", "string.h", "math.h", "time.h", "ctype.h"],
                    "stdio.h",
                )],
            ),
            BlockTemplate::new(
                "sizeof",
                "sizeof(...)",
                "sizeof(${type})",
                Operators,
                vec![FieldSpec::text("type", "int", "int")],
            ),
            BlockTemplate::new(
                "malloc",
                "malloc(...)",
                "${variable} = (${type}*)malloc(${size} * sizeof(${type}));",
                Memory,
                vec![
                    FieldSpec::text("variable", "ptr", "ptr"),
                    FieldSpec::choice("type", &["int", "float", "char", "double"], "int"),
                    FieldSpec::text("size", "10", "10"),
                ],
            ),
            BlockTemplate::new(
                "free",
                "free(...)",
                "free(${variable});",
                Memory,
                vec![FieldSpec::text("variable", "ptr", "ptr")],
            ),
            // Structural blocks without fields.
            BlockTemplate::new("main", "int main() {", "int main() {", Functions, vec![]),
            BlockTemplate::new("closebrace", "}", "}", Control, vec![]),
        ];
        for t in templates {
            reg.insert(t);
        }
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_substitutes_supplied_values() {
        let reg = BlockRegistry::builtin();
        let t = reg.lookup(Ident::intern("printf")).unwrap();
        let line = render_line(t, &values(&[("text", "hi")]));
        assert_eq!(line, "printf(\"hi\");");
    }

    #[test]
    fn render_falls_back_to_defaults() {
        let reg = BlockRegistry::builtin();
        let t = reg.lookup(Ident::intern("variable")).unwrap();
        // Empty string counts as absent.
        let line = render_line(t, &values(&[("name", ""), ("value", "7")]));
        assert_eq!(line, "int number = 7;");
    }

    #[test]
    fn render_replaces_repeated_placeholders() {
        let reg = BlockRegistry::builtin();
        let t = reg.lookup(Ident::intern("malloc")).unwrap();
        let line = render_line(t, &values(&[("type", "double")]));
        assert_eq!(line, "ptr = (double*)malloc(10 * sizeof(double));");
    }

    #[test]
    fn undeclared_placeholders_stay_verbatim() {
        let t = BlockTemplate::new("odd", "odd", "use ${mystery};", Category::Misc, vec![]);
        let line = render_line(&t, &HashMap::new());
        assert_eq!(line, "use ${mystery};");
    }

    #[test]
    fn lookup_and_search() {
        let reg = BlockRegistry::builtin();
        assert!(reg.lookup(Ident::intern("scanf")).is_some());
        assert!(reg.lookup(Ident::intern("nope")).is_none());
        assert!(reg.search("print").iter().any(|t| t.id.as_str() == "printf"));
        assert!(!reg.by_category(Category::Loops).is_empty());
    }
}
