// src/model.rs
//! The normalized syntactic model shared by every extractor.
//!
//! Everything here is plain owned data. The parser adapter builds one
//! `SyntaxModel` per analysis, the six extractors read it concurrently,
//! and it is dropped when the report is assembled. Nothing borrows the
//! tree-sitter tree, so the model is `Sync` for free.

use crate::lang::Language;

/// One uploaded file: declared name, full text, detected language.
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub filename: String,
    pub content: String,
    pub language: Language,
}

impl SourceUnit {
    #[must_use]
    pub fn new(filename: &str, content: &str, language: Language) -> Self {
        Self {
            filename: filename.to_string(),
            content: content.to_string(),
            language,
        }
    }
}

/// Lexical facts about a single physical line.
#[derive(Debug, Clone)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    pub text: String,
    /// Spaces in the leading indentation run.
    pub indent_spaces: usize,
    /// Tabs in the leading indentation run.
    pub indent_tabs: usize,
    /// Width in characters (not bytes).
    pub width: usize,
    pub trailing_ws: bool,
    pub blank: bool,
    /// True when the line holds nothing but a comment.
    pub comment_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Comment,
    Punct,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line the token starts on.
    pub line: usize,
}

/// A named function or method, with the structural facts the
/// modularity and documentation extractors need.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub params: usize,
    pub nesting: usize,
    pub has_doc: bool,
    pub public: bool,
}

impl FunctionInfo {
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// True when `line` falls inside this function's span.
    #[must_use]
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    Parameter,
    Function,
    Class,
    Import,
}

/// A named binding and how often the rest of the file mentions it.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub line: usize,
    pub kind: DeclKind,
    /// Identifier occurrences beyond the declaration itself.
    pub uses: usize,
}

/// Language anti-patterns sighted by the parser adapter. The best
/// practices extractor turns these into findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    BareExcept,
    MutableDefaultArg,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternHit {
    pub kind: PatternKind,
    pub line: usize,
}

/// Facts collected while walking the AST (or, in degraded mode, while
/// scanning lines lexically). Folded into the `SyntaxModel`.
#[derive(Debug, Default)]
pub struct AstFacts {
    pub functions: Vec<FunctionInfo>,
    pub declarations: Vec<Declaration>,
    pub patterns: Vec<PatternHit>,
    /// End lines of doc-style comments, used to attach docs to the
    /// function starting on the following line.
    pub doc_ends: Vec<usize>,
    /// Extra lines that count as documentation (Python docstrings).
    pub doc_lines: Vec<usize>,
}

/// Normalized view of one source file.
#[derive(Debug)]
pub struct SyntaxModel {
    pub language: Language,
    /// False when the grammar parse failed and the lexical fallback
    /// filled this model instead.
    pub parse_ok: bool,
    pub lines: Vec<Line>,
    pub tokens: Vec<Token>,
    pub functions: Vec<FunctionInfo>,
    pub declarations: Vec<Declaration>,
    pub patterns: Vec<PatternHit>,
    /// Sorted, deduplicated 1-based numbers of comment lines
    /// (docstring lines included).
    pub comment_lines: Vec<usize>,
}

impl SyntaxModel {
    /// Non-blank lines.
    #[must_use]
    pub fn logical_lines(&self) -> usize {
        self.lines.iter().filter(|l| !l.blank).count()
    }

    /// Non-blank lines that are not comment-only. Lines with trailing
    /// comments still count as code; docstring lines do not.
    #[must_use]
    pub fn code_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| !l.blank && !l.comment_only)
            .count()
    }

    #[must_use]
    pub fn comment_line_count(&self) -> usize {
        self.comment_lines.len()
    }

    #[must_use]
    pub fn is_comment_line(&self, number: usize) -> bool {
        self.comment_lines.binary_search(&number).is_ok()
    }

    /// The innermost function whose span contains `line`, preferring the
    /// latest-starting match so nested functions win over their parent.
    #[must_use]
    pub fn enclosing_function(&self, line: usize) -> Option<&FunctionInfo> {
        self.functions
            .iter()
            .filter(|f| f.contains_line(line))
            .max_by_key(|f| f.start_line)
    }
}

/// Most common positive indentation step between consecutive space-indented
/// lines. Falls back to 4 when the file gives no signal.
#[must_use]
pub fn infer_indent_unit(lines: &[Line]) -> usize {
    let mut diff_counts: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    let mut prev_indent: Option<usize> = None;
    for line in lines {
        if line.blank || line.indent_tabs > 0 {
            continue;
        }
        if let Some(prev) = prev_indent {
            if line.indent_spaces > prev {
                *diff_counts.entry(line.indent_spaces - prev).or_insert(0) += 1;
            }
        }
        prev_indent = Some(line.indent_spaces);
    }
    diff_counts
        .into_iter()
        .max_by_key(|&(diff, count)| (count, std::cmp::Reverse(diff)))
        .map_or(4, |(diff, _)| diff)
}
