// src/metrics/practices.rs
//! Language-specific anti-patterns and unused bindings.
//!
//! AST-sighted patterns (bare except, mutable default arguments) arrive
//! through the model; coercion-prone equality and `var` declarations are
//! read straight off the token stream so they survive degraded mode.

use super::{Category, Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::lang::Language;
use crate::model::{DeclKind, PatternKind, SyntaxModel, TokenKind};
use std::collections::HashSet;

pub fn extract(model: &SyntaxModel, _rules: &RuleConfig) -> MetricResult {
    let mut issues = Vec::new();

    for hit in &model.patterns {
        let finding = match hit.kind {
            PatternKind::BareExcept => Finding::new(
                FindingKind::BareExcept,
                hit.line,
                format!("Bare except clause at line {}", hit.line),
            ),
            PatternKind::MutableDefaultArg => Finding::new(
                FindingKind::MutableDefaultArg,
                hit.line,
                format!("Mutable default argument at line {}", hit.line),
            ),
        };
        issues.push(finding);
    }

    if matches!(model.language, Language::JavaScript | Language::Jsx) {
        scan_js_tokens(model, &mut issues);
    }

    let function_names: HashSet<&str> =
        model.functions.iter().map(|f| f.name.as_str()).collect();

    for decl in &model.declarations {
        if decl.uses > 0 {
            continue;
        }
        match decl.kind {
            DeclKind::Import => {
                issues.push(Finding::new(
                    FindingKind::UnusedImport,
                    decl.line,
                    format!("Import `{}` at line {} is never used", decl.name, decl.line),
                ));
            }
            DeclKind::Variable if decl.name != "_" && !function_names.contains(decl.name.as_str()) => {
                issues.push(Finding::new(
                    FindingKind::UnusedVariable,
                    decl.line,
                    format!(
                        "Variable `{}` at line {} is assigned but never used",
                        decl.name, decl.line
                    ),
                ));
            }
            _ => {}
        }
    }

    issues.sort_by_key(|f| f.line);
    let raw = issues.len() as f64;
    MetricResult::new(Category::BestPractices, raw, issues)
}

fn scan_js_tokens(model: &SyntaxModel, issues: &mut Vec<Finding>) {
    for (i, token) in model.tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Punct if token.text == "==" || token.text == "!=" => {
                let strict = if token.text == "==" { "===" } else { "!==" };
                issues.push(Finding::new(
                    FindingKind::LooseEquality,
                    token.line,
                    format!(
                        "Operator `{}` at line {} coerces types (use `{strict}`)",
                        token.text, token.line
                    ),
                ));
            }
            TokenKind::Ident if token.text == "var" => {
                let next_is_name = model
                    .tokens
                    .get(i + 1)
                    .is_some_and(|t| t.kind == TokenKind::Ident);
                if next_is_name {
                    issues.push(Finding::new(
                        FindingKind::VarKeyword,
                        token.line,
                        format!(
                            "`var` declaration at line {} (prefer `const` or `let`)",
                            token.line
                        ),
                    ));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceUnit;
    use crate::parse::build_model;

    fn analyze(filename: &str, content: &str) -> MetricResult {
        let language = Language::classify(filename, content);
        let unit = SourceUnit::new(filename, content, language);
        extract(&build_model(&unit), &RuleConfig::default())
    }

    #[test]
    fn python_antipatterns() {
        let src = "\
import os
import json

def load(path, cache=[]):
    try:
        return json.loads(read(path))
    except:
        return cache
";
        let result = analyze("load.py", src);
        let kinds: Vec<_> = result.issues.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&FindingKind::BareExcept));
        assert!(kinds.contains(&FindingKind::MutableDefaultArg));
        // `os` is imported but never touched; `json` is used.
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::UnusedImport && f.message.contains("`os`")));
        assert!(!result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::UnusedImport && f.message.contains("`json`")));
    }

    #[test]
    fn javascript_loose_equality_and_var() {
        let src = "\
var counter = 0;
function bump(x) {
  if (x == null) {
    return counter;
  }
  counter += 1;
  return counter;
}
";
        let result = analyze("bump.js", src);
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::LooseEquality && f.line == 3));
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::VarKeyword && f.line == 1));
    }

    #[test]
    fn strict_equality_is_fine() {
        let src = "\
const check = (x) => {
  return x === null;
};
";
        let result = analyze("check.js", src);
        assert!(!result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::LooseEquality));
    }

    #[test]
    fn clean_file_counts_zero(){
        let src = "\
def add_totals(values):
    total = 0
    for item in values:
        total = total + item
    return total
";
        let result = analyze("sums.py", src);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.raw_value, 0.0);
    }
}
