// src/metrics/docs.rs
//! Documentation coverage: comment density and docs on public functions.

use super::{Category, Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::lang::Language;
use crate::model::SyntaxModel;

pub fn extract(model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    let mut issues = Vec::new();

    let doc_noun = match model.language {
        Language::Python => "docstring",
        _ => "doc comment",
    };

    let mut public_total = 0usize;
    let mut undocumented = 0usize;
    for func in &model.functions {
        if !func.public {
            continue;
        }
        public_total += 1;
        if !func.has_doc {
            undocumented += 1;
            issues.push(Finding::new(
                FindingKind::MissingDoc,
                func.start_line,
                format!(
                    "Function `{}` at line {} lacks a {doc_noun}",
                    func.name, func.start_line
                ),
            ));
        }
    }

    let code = model.code_lines();
    let comments = model.comment_line_count();
    let ratio = if code == 0 {
        0.0
    } else {
        comments as f64 / code as f64
    };

    // Tiny files get a pass on density; there is nothing to narrate yet.
    let shortfall = if code >= rules.min_lines_for_ratio && ratio < rules.min_comment_ratio {
        ((rules.min_comment_ratio - ratio) / rules.min_comment_ratio).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if shortfall > 0.0 {
        issues.push(Finding::new(
            FindingKind::LowCommentRatio,
            1,
            format!(
                "Comments cover {:.0}% of code lines (aim for at least {:.0}%)",
                ratio * 100.0,
                rules.min_comment_ratio * 100.0
            ),
        ));
    }

    let undoc_fraction = if public_total == 0 {
        0.0
    } else {
        undocumented as f64 / public_total as f64
    };

    let raw = (0.7 * undoc_fraction + 0.3 * shortfall).clamp(0.0, 1.0);
    MetricResult::new(Category::Documentation, raw, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceUnit;
    use crate::parse::build_model;

    fn analyze(content: &str) -> MetricResult {
        let unit = SourceUnit::new("sample.py", content, Language::Python);
        extract(&build_model(&unit), &RuleConfig::default())
    }

    #[test]
    fn fully_documented_scores_clean() {
        let src = "\
def greet(name):
    \"\"\"Say hello.\"\"\"
    return f\"hi {name}\"
";
        let result = analyze(src);
        assert_eq!(result.raw_value, 0.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn missing_docstring_is_flagged_once_per_function() {
        let src = "\
def parse(text):
    return text.strip()
";
        let result = analyze(src);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, FindingKind::MissingDoc);
        assert!(result.issues[0].message.contains("`parse`"));
        assert!(result.issues[0].message.contains("docstring"));
        assert!(result.raw_value > 0.0);
    }

    #[test]
    fn private_functions_are_exempt() {
        let src = "\
def _helper(x):
    return x
";
        let result = analyze(src);
        assert!(result.issues.is_empty());
        assert_eq!(result.raw_value, 0.0);
    }
}
