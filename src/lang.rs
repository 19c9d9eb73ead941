// src/lang.rs
//! Language classification and the per-language ruleset interface.
//!
//! Classification is extension-first with a content-sniffing fallback.
//! Everything downstream of the classifier is polymorphic over
//! [`LanguageRules`]: one implementation per supported language supplies
//! the tree-sitter grammar, the naming convention, and the per-node AST
//! fact collection. `Unknown` has no ruleset and always takes the
//! token-only path.

use crate::model::{AstFacts, DeclKind, Declaration, FunctionInfo, PatternHit, PatternKind};
use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Jsx,
    Python,
    Unknown,
}

impl Language {
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Self::Python),
            "jsx" => Some(Self::Jsx),
            "js" => Some(Self::JavaScript),
            _ => None,
        }
    }

    /// Extension-based primary decision, content sniffing fallback.
    /// Unresolvable content is `Unknown`, never an error.
    #[must_use]
    pub fn classify(filename: &str, content: &str) -> Self {
        let ext = filename.rsplit_once('.').map(|(_, e)| e);
        if let Some(lang) = ext.and_then(Self::from_ext) {
            return lang;
        }
        Self::sniff(content)
    }

    fn sniff(content: &str) -> Self {
        let py = 2 * RE_PY_DEF.find_iter(content).count()
            + 2 * RE_PY_IMPORT.find_iter(content).count()
            + RE_PY_KEYWORD.find_iter(content).count();
        let js = 2 * RE_JS_FUNCTION.find_iter(content).count()
            + 2 * RE_JS_ARROW.find_iter(content).count()
            + RE_JS_DECL.find_iter(content).count();

        if py > js && py >= 2 {
            Self::Python
        } else if js > py && js >= 2 {
            if RE_JSX_TAG.is_match(content) {
                Self::Jsx
            } else {
                Self::JavaScript
            }
        } else {
            Self::Unknown
        }
    }

    /// Stable lowercase key, used in config (`disabled_languages`) and logs.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

static RE_PY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:def|class)\s+\w+").unwrap());
static RE_PY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:from\s+[\w.]+\s+)?import\s+\w").unwrap());
static RE_PY_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:elif|self|pass|None)\b").unwrap());
static RE_JS_FUNCTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfunction\b").unwrap());
static RE_JS_ARROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=>").unwrap());
static RE_JS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:const|let|var)\s+\w").unwrap());
static RE_JSX_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\s*[A-Za-z][\w.]*\s*>|<[A-Z][\w.]*[\s/>]").unwrap());

/// The casing convention a language expects of functions and variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    Snake,
    Camel,
}

/// Capability interface for one supported language: classification hints,
/// parser grammar, and the AST fact collection the extractors rely on.
pub trait LanguageRules: Send + Sync {
    fn language(&self) -> Language;

    fn grammar(&self) -> tree_sitter::Language;

    fn naming_style(&self) -> NamingStyle;

    /// JSX components are PascalCase by convention.
    fn allows_pascal_functions(&self) -> bool {
        false
    }

    /// Node kinds that add a level of nesting inside a function body.
    fn is_nesting_kind(&self, kind: &str) -> bool;

    /// Called once for every node during the adapter's walk. Pushes
    /// functions, declarations, imports, doc markers and anti-pattern
    /// hits into `facts`.
    fn visit(&self, node: Node<'_>, source: &str, facts: &mut AstFacts);
}

/// Selects the ruleset for a classified language. `Unknown` has none.
#[must_use]
pub fn rules_for(language: Language) -> Option<&'static dyn LanguageRules> {
    match language {
        Language::Python => Some(&PY_RULES),
        Language::JavaScript => Some(&JS_RULES),
        Language::Jsx => Some(&JSX_RULES),
        Language::Unknown => None,
    }
}

static PY_RULES: PythonRules = PythonRules;
static JS_RULES: JavaScriptRules = JavaScriptRules { jsx: false };
static JSX_RULES: JavaScriptRules = JavaScriptRules { jsx: true };

/// Maximum nesting depth of control structures under `node`.
fn max_nesting(rules: &dyn LanguageRules, node: Node<'_>) -> usize {
    fn walk(rules: &dyn LanguageRules, node: Node<'_>, current: usize) -> usize {
        let mut deepest = current;
        for child in node.children(&mut node.walk()) {
            let depth = if rules.is_nesting_kind(child.kind()) {
                current + 1
            } else {
                current
            };
            deepest = deepest.max(walk(rules, child, depth));
        }
        deepest
    }
    walk(rules, node, 0)
}

fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn start_line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

struct PythonRules;

impl LanguageRules for PythonRules {
    fn language(&self) -> Language {
        Language::Python
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_python::language()
    }

    fn naming_style(&self) -> NamingStyle {
        NamingStyle::Snake
    }

    fn is_nesting_kind(&self, kind: &str) -> bool {
        matches!(
            kind,
            "if_statement"
                | "for_statement"
                | "while_statement"
                | "try_statement"
                | "with_statement"
                | "match_statement"
        )
    }

    fn visit(&self, node: Node<'_>, source: &str, facts: &mut AstFacts) {
        match node.kind() {
            "function_definition" => self.collect_function(node, source, facts),
            "class_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    facts.declarations.push(Declaration {
                        name: node_text(name, source).to_string(),
                        line: start_line(name),
                        kind: DeclKind::Class,
                        uses: 0,
                    });
                }
            }
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        facts.declarations.push(Declaration {
                            name: node_text(left, source).to_string(),
                            line: start_line(left),
                            kind: DeclKind::Variable,
                            uses: 0,
                        });
                    }
                }
            }
            "import_statement" | "import_from_statement" => {
                collect_python_imports(node, source, facts);
            }
            "except_clause" => {
                // An except clause with nothing but its block names no
                // exception type.
                if node.named_child_count() <= 1 {
                    facts.patterns.push(PatternHit {
                        kind: PatternKind::BareExcept,
                        line: start_line(node),
                    });
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                if let Some(value) = node.child_by_field_name("value") {
                    if matches!(value.kind(), "list" | "dictionary" | "set") {
                        facts.patterns.push(PatternHit {
                            kind: PatternKind::MutableDefaultArg,
                            line: start_line(node),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

impl PythonRules {
    fn collect_function(&self, node: Node<'_>, source: &str, facts: &mut AstFacts) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, source).to_string();

        let mut params = 0;
        if let Some(param_list) = node.child_by_field_name("parameters") {
            for child in param_list.named_children(&mut param_list.walk()) {
                let Some(param) = python_param_name(child, source) else {
                    continue;
                };
                if param == "self" || param == "cls" {
                    continue;
                }
                params += 1;
                facts.declarations.push(Declaration {
                    name: param.to_string(),
                    line: start_line(child),
                    kind: DeclKind::Parameter,
                    uses: 0,
                });
            }
        }

        let has_doc = python_docstring(node, facts);
        let public = !name.starts_with('_');

        facts.functions.push(FunctionInfo {
            name,
            start_line: start_line(node),
            end_line: node.end_position().row + 1,
            params,
            nesting: max_nesting(self, node),
            has_doc,
            public,
        });
    }
}

fn python_param_name<'a>(node: Node<'a>, source: &'a str) -> Option<&'a str> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source));
    }
    if let Some(name) = node.child_by_field_name("name") {
        if name.kind() == "identifier" {
            return Some(node_text(name, source));
        }
    }
    node.named_children(&mut node.walk())
        .find(|c| c.kind() == "identifier")
        .map(|c| node_text(c, source))
}

/// Records the docstring of a function body, if present, and returns
/// whether one was found.
fn python_docstring(func: Node<'_>, facts: &mut AstFacts) -> bool {
    let Some(body) = func.child_by_field_name("body") else {
        return false;
    };
    let Some(first) = body.named_child(0) else {
        return false;
    };
    if first.kind() != "expression_statement" {
        return false;
    }
    let Some(expr) = first.named_child(0) else {
        return false;
    };
    if expr.kind() != "string" {
        return false;
    }
    for row in expr.start_position().row..=expr.end_position().row {
        facts.doc_lines.push(row + 1);
    }
    true
}

fn collect_python_imports(node: Node<'_>, source: &str, facts: &mut AstFacts) {
    let from_import = node.kind() == "import_from_statement";
    for child in node.named_children(&mut node.walk()) {
        match child.kind() {
            "dotted_name" => {
                // `import a.b` binds `a`; `from m import x` binds `x`,
                // where `m` sits in the module_name field.
                if from_import
                    && node
                        .child_by_field_name("module_name")
                        .is_some_and(|m| m == child)
                {
                    continue;
                }
                let text = node_text(child, source);
                let bound = if from_import {
                    text
                } else {
                    text.split('.').next().unwrap_or(text)
                };
                facts.declarations.push(Declaration {
                    name: bound.to_string(),
                    line: start_line(child),
                    kind: DeclKind::Import,
                    uses: 0,
                });
            }
            "aliased_import" => {
                if let Some(alias) = child.child_by_field_name("alias") {
                    facts.declarations.push(Declaration {
                        name: node_text(alias, source).to_string(),
                        line: start_line(alias),
                        kind: DeclKind::Import,
                        uses: 0,
                    });
                }
            }
            "wildcard_import" => {}
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// JavaScript / JSX (same grammar, different conventions)
// ---------------------------------------------------------------------------

struct JavaScriptRules {
    jsx: bool,
}

impl LanguageRules for JavaScriptRules {
    fn language(&self) -> Language {
        if self.jsx {
            Language::Jsx
        } else {
            Language::JavaScript
        }
    }

    fn grammar(&self) -> tree_sitter::Language {
        // The JavaScript grammar carries the JSX productions.
        tree_sitter_javascript::language()
    }

    fn naming_style(&self) -> NamingStyle {
        NamingStyle::Camel
    }

    fn allows_pascal_functions(&self) -> bool {
        self.jsx
    }

    fn is_nesting_kind(&self, kind: &str) -> bool {
        matches!(
            kind,
            "if_statement"
                | "for_statement"
                | "for_in_statement"
                | "while_statement"
                | "do_statement"
                | "switch_statement"
                | "try_statement"
        )
    }

    fn visit(&self, node: Node<'_>, source: &str, facts: &mut AstFacts) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.collect_function(node, node, source, facts);
            }
            "method_definition" => self.collect_function(node, node, source, facts),
            "variable_declarator" => self.collect_declarator(node, source, facts),
            "class_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    facts.declarations.push(Declaration {
                        name: node_text(name, source).to_string(),
                        line: start_line(name),
                        kind: DeclKind::Class,
                        uses: 0,
                    });
                }
            }
            "import_statement" => collect_js_imports(node, source, facts),
            "comment" => {
                if node_text(node, source).starts_with("/**") {
                    facts.doc_ends.push(node.end_position().row + 1);
                }
            }
            _ => {}
        }
    }
}

impl JavaScriptRules {
    /// `span` is the node whose lines the function occupies; `def` is the
    /// node carrying name/parameters (they differ for `const f = () => ..`).
    fn collect_function(&self, span: Node<'_>, def: Node<'_>, source: &str, facts: &mut AstFacts) {
        let Some(name_node) = def.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, source).to_string();
        let params = self.collect_params(def, source, facts);

        facts.functions.push(FunctionInfo {
            name: name.clone(),
            start_line: start_line(span),
            end_line: span.end_position().row + 1,
            params,
            nesting: max_nesting(self, span),
            has_doc: false, // attached later from doc_ends
            public: !name.starts_with('_'),
        });
    }

    fn collect_declarator(&self, node: Node<'_>, source: &str, facts: &mut AstFacts) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        if name_node.kind() != "identifier" {
            return;
        }
        let name = node_text(name_node, source).to_string();

        let function_value = node.child_by_field_name("value").filter(|v| {
            matches!(v.kind(), "arrow_function" | "function" | "function_expression")
        });

        if let Some(value) = function_value {
            let params = self.collect_params(value, source, facts);
            facts.functions.push(FunctionInfo {
                name: name.clone(),
                start_line: start_line(node),
                end_line: node.end_position().row + 1,
                params,
                nesting: max_nesting(self, node),
                has_doc: false,
                public: !name.starts_with('_'),
            });
            facts.declarations.push(Declaration {
                name,
                line: start_line(name_node),
                kind: DeclKind::Function,
                uses: 0,
            });
        } else {
            facts.declarations.push(Declaration {
                name,
                line: start_line(name_node),
                kind: DeclKind::Variable,
                uses: 0,
            });
        }
    }

    fn collect_params(&self, def: Node<'_>, source: &str, facts: &mut AstFacts) -> usize {
        // Arrow functions with a single bare parameter use the
        // `parameter` field instead of a formal_parameters list.
        if let Some(single) = def.child_by_field_name("parameter") {
            facts.declarations.push(Declaration {
                name: node_text(single, source).to_string(),
                line: start_line(single),
                kind: DeclKind::Parameter,
                uses: 0,
            });
            return 1;
        }
        let Some(list) = def.child_by_field_name("parameters") else {
            return 0;
        };
        let mut count = 0;
        for child in list.named_children(&mut list.walk()) {
            count += 1;
            let ident = if child.kind() == "identifier" {
                Some(child)
            } else {
                child.child_by_field_name("name").filter(|n| n.kind() == "identifier")
            };
            if let Some(ident) = ident {
                facts.declarations.push(Declaration {
                    name: node_text(ident, source).to_string(),
                    line: start_line(ident),
                    kind: DeclKind::Parameter,
                    uses: 0,
                });
            }
        }
        count
    }
}

fn collect_js_imports(node: Node<'_>, source: &str, facts: &mut AstFacts) {
    fn walk(node: Node<'_>, source: &str, facts: &mut AstFacts) {
        match node.kind() {
            "import_specifier" => {
                let bound = node
                    .child_by_field_name("alias")
                    .or_else(|| node.child_by_field_name("name"));
                if let Some(bound) = bound {
                    facts.declarations.push(Declaration {
                        name: node_text(bound, source).to_string(),
                        line: start_line(bound),
                        kind: DeclKind::Import,
                        uses: 0,
                    });
                }
            }
            "identifier" => {
                // Default or namespace import binding.
                facts.declarations.push(Declaration {
                    name: node_text(node, source).to_string(),
                    line: start_line(node),
                    kind: DeclKind::Import,
                    uses: 0,
                });
            }
            _ => {
                for child in node.named_children(&mut node.walk()) {
                    walk(child, source, facts);
                }
            }
        }
    }
    if let Some(clause) = node
        .named_children(&mut node.walk())
        .find(|c| c.kind() == "import_clause")
    {
        walk(clause, source, facts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins() {
        assert_eq!(Language::classify("app.py", "function f() {}"), Language::Python);
        assert_eq!(Language::classify("app.jsx", ""), Language::Jsx);
        assert_eq!(Language::classify("app.js", ""), Language::JavaScript);
    }

    #[test]
    fn sniffs_python() {
        let src = "import os\n\ndef main():\n    pass\n";
        assert_eq!(Language::classify("script", src), Language::Python);
    }

    #[test]
    fn sniffs_jsx() {
        let src = "const App = () => {\n  return <Widget title=\"hi\"></Widget>;\n};\n";
        assert_eq!(Language::classify("component", src), Language::Jsx);
    }

    #[test]
    fn unresolvable_is_unknown() {
        assert_eq!(Language::classify("notes.txt", "just some prose"), Language::Unknown);
        assert_eq!(Language::classify("empty", ""), Language::Unknown);
    }
}
