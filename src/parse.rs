// src/parse.rs
//! Parser adapter: turns a `SourceUnit` into a `SyntaxModel`.
//!
//! The full path runs a tree-sitter parse and one AST walk, delegating
//! per-node fact collection to the language's `LanguageRules`. When the
//! parse fails, or the language is unknown, a lexical fallback fills the
//! same model shape from lines, tokens and a few regex heuristics with
//! `parse_ok = false`. A malformed file degrades the report's precision;
//! it never fails the analysis.

use crate::lang::{rules_for, Language, LanguageRules};
use crate::model::{
    infer_indent_unit, AstFacts, DeclKind, Declaration, FunctionInfo, Line, PatternHit,
    PatternKind, SourceUnit, SyntaxModel, Token, TokenKind,
};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;
use tree_sitter::{Node, Parser};

/// Builds the syntactic model for one source unit.
#[must_use]
pub fn build_model(unit: &SourceUnit) -> SyntaxModel {
    let lex = lex(&unit.content, unit.language);
    let lines = build_lines(&unit.content, &lex);

    let (facts, parse_ok) = match rules_for(unit.language) {
        Some(rules) => match grammar_facts(rules, &unit.content) {
            Some(facts) => (facts, true),
            None => {
                tracing::warn!(
                    language = unit.language.key(),
                    file = %unit.filename,
                    "parse failed, falling back to token-only analysis"
                );
                (lexical_facts(unit.language, &lines), false)
            }
        },
        None => (lexical_facts(unit.language, &lines), false),
    };

    finalize(unit.language, parse_ok, facts, lex, lines)
}

fn grammar_facts(rules: &'static dyn LanguageRules, content: &str) -> Option<AstFacts> {
    let mut parser = Parser::new();
    parser.set_language(rules.grammar()).ok()?;
    let tree = parser.parse(content, None)?;
    if tree.root_node().has_error() {
        return None;
    }
    let mut facts = AstFacts::default();
    walk(rules, tree.root_node(), content, &mut facts);
    Some(facts)
}

fn walk(rules: &dyn LanguageRules, node: Node<'_>, source: &str, facts: &mut AstFacts) {
    rules.visit(node, source, facts);
    for child in node.children(&mut node.walk()) {
        walk(rules, child, source, facts);
    }
}

fn finalize(
    language: Language,
    parse_ok: bool,
    mut facts: AstFacts,
    lex: LexOutput,
    mut lines: Vec<Line>,
) -> SyntaxModel {
    // Identifier occurrence counts feed the unused-binding checks.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &lex.tokens {
        if token.kind == TokenKind::Ident {
            *counts.entry(token.text.as_str()).or_insert(0) += 1;
        }
    }

    facts.declarations.sort_by_key(|d| d.line);
    let mut seen: HashSet<(String, DeclKind)> = HashSet::new();
    facts
        .declarations
        .retain(|d| seen.insert((d.name.clone(), d.kind)));
    for decl in &mut facts.declarations {
        decl.uses = counts
            .get(decl.name.as_str())
            .copied()
            .unwrap_or(0)
            .saturating_sub(1);
    }

    let doc_ends: HashSet<usize> = facts.doc_ends.iter().copied().collect();
    for func in &mut facts.functions {
        if func.start_line > 1 && doc_ends.contains(&(func.start_line - 1)) {
            func.has_doc = true;
        }
    }
    facts.functions.sort_by_key(|f| f.start_line);
    facts.patterns.sort_by_key(|p| p.line);

    let mut comment_lines: BTreeSet<usize> = lex.comment_lines;
    comment_lines.extend(facts.doc_lines.iter().copied());

    // Docstring lines read as documentation, not code.
    let doc_lines: HashSet<usize> = facts.doc_lines.iter().copied().collect();
    for line in &mut lines {
        if doc_lines.contains(&line.number) {
            line.comment_only = true;
        }
    }

    SyntaxModel {
        language,
        parse_ok,
        lines,
        tokens: lex.tokens,
        functions: facts.functions,
        declarations: facts.declarations,
        patterns: facts.patterns,
        comment_lines: comment_lines.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

struct LexOutput {
    tokens: Vec<Token>,
    comment_lines: BTreeSet<usize>,
    code_lines: BTreeSet<usize>,
}

const MULTI_OPS: &[&str] = &[
    "===", "!==", ">>>", "**=", "<<=", ">>=", "==", "!=", "<=", ">=", "=>", "&&", "||", "??",
    "**", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "++", "--", "->", ":=",
    "//",
];

fn lex(content: &str, language: Language) -> LexOutput {
    let chars: Vec<char> = content.chars().collect();
    let hash_comments = matches!(language, Language::Python | Language::Unknown);
    let slash_comments = matches!(
        language,
        Language::JavaScript | Language::Jsx | Language::Unknown
    );

    let mut out = LexOutput {
        tokens: Vec::new(),
        comment_lines: BTreeSet::new(),
        code_lines: BTreeSet::new(),
    };
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if hash_comments && c == '#' {
            let start = i;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            out.comment_lines.insert(line);
            push(&mut out.tokens, TokenKind::Comment, &chars[start..i], line);
            continue;
        }

        if slash_comments && c == '/' && chars.get(i + 1) == Some(&'/') {
            let start = i;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            out.comment_lines.insert(line);
            push(&mut out.tokens, TokenKind::Comment, &chars[start..i], line);
            continue;
        }

        if slash_comments && c == '/' && chars.get(i + 1) == Some(&'*') {
            let (start, start_line) = (i, line);
            i += 2;
            while i < chars.len() {
                if chars[i] == '\n' {
                    line += 1;
                } else if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            for l in start_line..=line {
                out.comment_lines.insert(l);
            }
            push(&mut out.tokens, TokenKind::Comment, &chars[start..i], start_line);
            continue;
        }

        // Python triple-quoted strings span lines and stay code.
        if hash_comments && (c == '"' || c == '\'') && is_triple(&chars, i, c) {
            let (start, start_line) = (i, line);
            i += 3;
            while i < chars.len() && !is_triple(&chars, i, c) {
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            i = (i + 3).min(chars.len());
            for l in start_line..=line {
                out.code_lines.insert(l);
            }
            push(&mut out.tokens, TokenKind::Str, &chars[start..i], start_line);
            continue;
        }

        if c == '"' || c == '\'' || c == '`' {
            let (start, start_line) = (i, line);
            let quote = c;
            i += 1;
            while i < chars.len() {
                match chars[i] {
                    '\\' => i += 1,
                    '\n' => {
                        if quote != '`' {
                            break;
                        }
                        line += 1;
                    }
                    q if q == quote => {
                        i += 1;
                        break;
                    }
                    _ => {}
                }
                i += 1;
            }
            for l in start_line..=line {
                out.code_lines.insert(l);
            }
            push(&mut out.tokens, TokenKind::Str, &chars[start..i], start_line);
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            out.code_lines.insert(line);
            push(&mut out.tokens, TokenKind::Ident, &chars[start..i], line);
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                i += 1;
            }
            out.code_lines.insert(line);
            push(&mut out.tokens, TokenKind::Number, &chars[start..i], line);
            continue;
        }

        // Maximal-munch operator match, then single punctuation.
        let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
        let op = MULTI_OPS.iter().find(|op| rest.starts_with(**op));
        let len = op.map_or(1, |op| op.len());
        out.code_lines.insert(line);
        push(&mut out.tokens, TokenKind::Punct, &chars[i..i + len], line);
        i += len;
    }

    out
}

fn is_triple(chars: &[char], i: usize, quote: char) -> bool {
    chars.get(i) == Some(&quote) && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
}

fn push(tokens: &mut Vec<Token>, kind: TokenKind, text: &[char], line: usize) {
    tokens.push(Token {
        kind,
        text: text.iter().collect(),
        line,
    });
}

fn build_lines(content: &str, lex: &LexOutput) -> Vec<Line> {
    content
        .lines()
        .enumerate()
        .map(|(idx, raw)| {
            let number = idx + 1;
            let mut indent_spaces = 0;
            let mut indent_tabs = 0;
            for ch in raw.chars() {
                match ch {
                    ' ' => indent_spaces += 1,
                    '\t' => indent_tabs += 1,
                    _ => break,
                }
            }
            let blank = raw.trim().is_empty();
            Line {
                number,
                text: raw.to_string(),
                indent_spaces,
                indent_tabs,
                width: raw.chars().count(),
                trailing_ws: raw.ends_with(' ') || raw.ends_with('\t'),
                blank,
                comment_only: lex.comment_lines.contains(&number)
                    && !lex.code_lines.contains(&number),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lexical fallback
// ---------------------------------------------------------------------------

static RE_PY_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)def\s+([A-Za-z_]\w*)\s*\(([^)]*)").unwrap());
static RE_PY_BARE_EXCEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*except\s*:").unwrap());
static RE_PY_MUTABLE_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\s*[\[{]").unwrap());
static RE_PY_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*=(?:[^=]|$)").unwrap());
static RE_PY_IMPORT_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+([\w.]+)").unwrap());
static RE_PY_IMPORT_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*from\s+[\w.]+\s+import\s+(.+)").unwrap());
static RE_PY_DOCSTRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:r|f|b)?(?:"""|''')"#).unwrap());

static RE_JS_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)").unwrap());
static RE_JS_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?(?:\(([^)]*)\)|[A-Za-z_$][\w$]*)\s*=>",
    )
    .unwrap()
});
static RE_JS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap());
static RE_JS_IMPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+([A-Za-z_$][\w$]*)").unwrap());
static RE_JS_IMPORT_NAMED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+.*\{([^}]*)\}").unwrap());

/// Regex approximation of the AST facts, used when no grammar applies.
/// Known precision loss, by contract never a failure.
fn lexical_facts(language: Language, lines: &[Line]) -> AstFacts {
    let mut facts = AstFacts::default();
    let unit = infer_indent_unit(lines);

    let python_like = matches!(language, Language::Python | Language::Unknown);
    let js_like = matches!(
        language,
        Language::JavaScript | Language::Jsx | Language::Unknown
    );

    for line in lines {
        if line.blank || line.comment_only {
            continue;
        }
        if python_like {
            scan_python_line(line, lines, unit, &mut facts);
        }
        if js_like {
            scan_js_line(line, lines, &mut facts);
        }
    }
    facts
}

fn indent_level(line: &Line, unit: usize) -> usize {
    line.indent_tabs + line.indent_spaces / unit.max(1)
}

fn scan_python_line(line: &Line, lines: &[Line], unit: usize, facts: &mut AstFacts) {
    if let Some(caps) = RE_PY_DEF.captures(&line.text) {
        let name = caps[2].to_string();
        let params = count_params(&caps[3]);
        let base = indent_level(line, unit);

        // The body runs while lines stay more indented than the def.
        let mut end = line.number;
        let mut deepest = base;
        for next in &lines[line.number..] {
            if next.blank {
                continue;
            }
            let level = indent_level(next, unit);
            if level <= base {
                break;
            }
            deepest = deepest.max(level);
            end = next.number;
        }

        let has_doc = lines
            .get(line.number)
            .is_some_and(|next| RE_PY_DOCSTRING.is_match(&next.text));

        facts.functions.push(FunctionInfo {
            public: !name.starts_with('_'),
            name,
            start_line: line.number,
            end_line: end,
            params,
            nesting: deepest.saturating_sub(base + 1),
            has_doc,
        });

        if RE_PY_MUTABLE_DEFAULT.is_match(&caps[3]) {
            facts.patterns.push(PatternHit {
                kind: PatternKind::MutableDefaultArg,
                line: line.number,
            });
        }
        return;
    }

    if RE_PY_BARE_EXCEPT.is_match(&line.text) {
        facts.patterns.push(PatternHit {
            kind: PatternKind::BareExcept,
            line: line.number,
        });
    }
    if let Some(caps) = RE_PY_IMPORT_PLAIN.captures(&line.text) {
        let bound = caps[1].split('.').next().unwrap_or(&caps[1]).to_string();
        facts.declarations.push(Declaration {
            name: bound,
            line: line.number,
            kind: DeclKind::Import,
            uses: 0,
        });
    } else if let Some(caps) = RE_PY_IMPORT_FROM.captures(&line.text) {
        for piece in caps[1].split(',') {
            let bound = piece
                .rsplit(" as ")
                .next()
                .unwrap_or(piece)
                .trim()
                .trim_matches('(')
                .trim_matches(')');
            if !bound.is_empty() && bound != "*" {
                facts.declarations.push(Declaration {
                    name: bound.to_string(),
                    line: line.number,
                    kind: DeclKind::Import,
                    uses: 0,
                });
            }
        }
    } else if let Some(caps) = RE_PY_ASSIGN.captures(&line.text) {
        facts.declarations.push(Declaration {
            name: caps[1].to_string(),
            line: line.number,
            kind: DeclKind::Variable,
            uses: 0,
        });
    }
}

fn scan_js_line(line: &Line, lines: &[Line], facts: &mut AstFacts) {
    let func = RE_JS_FUNC
        .captures(&line.text)
        .map(|c| (c[1].to_string(), count_params(c.get(2).map_or("", |m| m.as_str()))))
        .or_else(|| {
            RE_JS_ARROW.captures(&line.text).map(|c| {
                (
                    c[1].to_string(),
                    c.get(2).map_or(1, |m| count_params(m.as_str())),
                )
            })
        });

    if let Some((name, params)) = func {
        let end = js_block_end(line, lines);
        let has_doc = line.number > 1
            && lines
                .get(line.number - 2)
                .is_some_and(|prev| prev.text.trim_end().ends_with("*/"));
        facts.functions.push(FunctionInfo {
            public: !name.starts_with('_'),
            name,
            start_line: line.number,
            end_line: end,
            params,
            nesting: 0,
            has_doc,
        });
    }

    for caps in RE_JS_DECL.captures_iter(&line.text) {
        facts.declarations.push(Declaration {
            name: caps[1].to_string(),
            line: line.number,
            kind: DeclKind::Variable,
            uses: 0,
        });
    }
    if let Some(caps) = RE_JS_IMPORT_NAMED.captures(&line.text) {
        for piece in caps[1].split(',') {
            let bound = piece.rsplit(" as ").next().unwrap_or(piece).trim();
            if !bound.is_empty() {
                facts.declarations.push(Declaration {
                    name: bound.to_string(),
                    line: line.number,
                    kind: DeclKind::Import,
                    uses: 0,
                });
            }
        }
    } else if let Some(caps) = RE_JS_IMPORT_DEFAULT.captures(&line.text) {
        facts.declarations.push(Declaration {
            name: caps[1].to_string(),
            line: line.number,
            kind: DeclKind::Import,
            uses: 0,
        });
    }
}

/// Follows brace balance from the opening line. Expression-bodied arrows
/// end where they start.
fn js_block_end(start: &Line, lines: &[Line]) -> usize {
    let mut balance = 0i64;
    let mut opened = false;
    for line in lines[start.number - 1..].iter() {
        for ch in line.text.chars() {
            match ch {
                '{' => {
                    balance += 1;
                    opened = true;
                }
                '}' => balance -= 1,
                _ => {}
            }
        }
        if opened && balance <= 0 {
            return line.number;
        }
    }
    if opened {
        lines.last().map_or(start.number, |l| l.number)
    } else {
        start.number
    }
}

fn count_params(params: &str) -> usize {
    params
        .split(',')
        .filter(|p| p.chars().any(|c| c.is_alphanumeric() || c == '_' || c == '$'))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(filename: &str, content: &str) -> SyntaxModel {
        let language = Language::classify(filename, content);
        build_model(&SourceUnit::new(filename, content, language))
    }

    #[test]
    fn python_functions_and_docstrings() {
        let src = "\
import os

def documented(a, b):
    \"\"\"Adds things.\"\"\"
    return a + b

def bare(x):
    return x
";
        let m = model("sample.py", src);
        assert!(m.parse_ok);
        assert_eq!(m.functions.len(), 2);
        assert!(m.functions[0].has_doc);
        assert!(!m.functions[1].has_doc);
        assert_eq!(m.functions[0].params, 2);
        // `os` is imported and never mentioned again.
        let os_decl = m.declarations.iter().find(|d| d.name == "os").unwrap();
        assert_eq!(os_decl.kind, DeclKind::Import);
        assert_eq!(os_decl.uses, 0);
    }

    #[test]
    fn python_bare_except_hit() {
        let src = "\
def risky():
    try:
        go()
    except:
        pass
";
        let m = model("risky.py", src);
        assert!(m.parse_ok);
        assert!(m
            .patterns
            .iter()
            .any(|p| p.kind == PatternKind::BareExcept && p.line == 4));
    }

    #[test]
    fn javascript_arrow_function_collected() {
        let src = "\
const add = (a, b) => {
  return a + b;
};
";
        let m = model("math.js", src);
        assert!(m.parse_ok);
        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].name, "add");
        assert_eq!(m.functions[0].params, 2);
        assert_eq!(m.functions[0].end_line, 3);
    }

    #[test]
    fn parse_failure_degrades_to_lexical() {
        let src = "def broken(:\n    return ((\n";
        let m = model("broken.py", src);
        assert!(!m.parse_ok);
        // The lexical scan still sees the function name.
        assert!(m.functions.iter().any(|f| f.name == "broken"));
    }

    #[test]
    fn unknown_language_is_token_only() {
        let m = model("notes.txt", "some prose, nothing else\n");
        assert!(!m.parse_ok);
        assert!(m.functions.is_empty());
        assert!(m.logical_lines() > 0);
    }

    #[test]
    fn comment_lines_tracked() {
        let src = "# top\nx = 1  # trailing\n";
        let m = model("c.py", src);
        assert!(m.is_comment_line(1));
        assert!(m.is_comment_line(2));
        assert_eq!(m.code_lines(), 1);
        assert!(m.lines[0].comment_only);
        assert!(!m.lines[1].comment_only);
    }
}
