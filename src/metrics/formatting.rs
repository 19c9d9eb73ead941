// src/metrics/formatting.rs
//! Whitespace discipline: indentation, trailing blanks, line length.

use super::{Category, Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::model::{infer_indent_unit, SyntaxModel};
use std::collections::BTreeSet;

pub fn extract(model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    let unit = infer_indent_unit(&model.lines);
    let mut issues = Vec::new();
    let mut offending: BTreeSet<usize> = BTreeSet::new();

    for line in &model.lines {
        if line.indent_spaces > 0 && line.indent_tabs > 0 {
            offending.insert(line.number);
            issues.push(Finding::new(
                FindingKind::MixedIndentation,
                line.number,
                format!("Line {} mixes tabs and spaces", line.number),
            ));
        }

        if line.trailing_ws {
            offending.insert(line.number);
            issues.push(Finding::new(
                FindingKind::TrailingWhitespace,
                line.number,
                format!("Line {} has trailing whitespace", line.number),
            ));
        }

        if line.width > rules.max_line_length {
            offending.insert(line.number);
            issues.push(Finding::new(
                FindingKind::LongLine,
                line.number,
                format!(
                    "Line {} is {} characters (limit {})",
                    line.number, line.width, rules.max_line_length
                ),
            ));
        }

        if !line.blank
            && line.indent_tabs == 0
            && unit > 1
            && line.indent_spaces % unit != 0
        {
            offending.insert(line.number);
            issues.push(Finding::new(
                FindingKind::IrregularIndentStep,
                line.number,
                format!(
                    "Line {} is indented {} spaces, off the {}-space grid",
                    line.number, line.indent_spaces, unit
                ),
            ));
        }
    }

    let logical = model.logical_lines();
    let raw = if logical == 0 {
        0.0
    } else {
        (offending.len() as f64 / logical as f64).min(1.0)
    };
    MetricResult::new(Category::Formatting, raw, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;
    use crate::model::SourceUnit;
    use crate::parse::build_model;

    fn analyze(content: &str) -> MetricResult {
        let unit = SourceUnit::new("sample.py", content, Language::Python);
        extract(&build_model(&unit), &RuleConfig::default())
    }

    #[test]
    fn clean_file_has_no_findings() {
        let src = "\
def pick(items):
    for item in items:
        keep(item)
    return items
";
        let result = analyze(src);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.raw_value, 0.0);
    }

    #[test]
    fn mixed_tabs_and_spaces_flagged() {
        let src = "def f():\n \tx = 1\n";
        let result = analyze(src);
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::MixedIndentation && f.line == 2));
    }

    #[test]
    fn trailing_whitespace_and_long_lines() {
        let long = "x".repeat(120);
        let src = format!("value = 1 \ny = \"{long}\"\n");
        let result = analyze(&src);
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::TrailingWhitespace && f.line == 1));
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::LongLine && f.line == 2));
    }
}
