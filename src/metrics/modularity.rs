// src/metrics/modularity.rs
//! Function size, nesting depth and parameter counts.

use super::{Category, Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::model::SyntaxModel;

pub fn extract(model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    let mut issues = Vec::new();
    let mut violating = 0usize;

    for func in &model.functions {
        let mut offended = false;

        let lines = func.line_count();
        if lines > rules.max_function_lines {
            offended = true;
            issues.push(Finding::new(
                FindingKind::LongFunction,
                func.start_line,
                format!(
                    "Function `{}` at line {} exceeds {} lines ({} lines)",
                    func.name, func.start_line, rules.max_function_lines, lines
                ),
            ));
        }

        if func.nesting > rules.max_nesting_depth {
            offended = true;
            issues.push(Finding::new(
                FindingKind::DeepNesting,
                func.start_line,
                format!(
                    "Function `{}` at line {} nests {} levels deep (limit {})",
                    func.name, func.start_line, func.nesting, rules.max_nesting_depth
                ),
            ));
        }

        if func.params > rules.max_function_args {
            offended = true;
            issues.push(Finding::new(
                FindingKind::LongParameterList,
                func.start_line,
                format!(
                    "Function `{}` at line {} takes {} parameters (limit {})",
                    func.name, func.start_line, func.params, rules.max_function_args
                ),
            ));
        }

        if offended {
            violating += 1;
        }
    }

    let raw = if model.functions.is_empty() {
        0.0
    } else {
        violating as f64 / model.functions.len() as f64
    };
    MetricResult::new(Category::Modularity, raw, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;
    use crate::model::{FunctionInfo, SyntaxModel};

    fn empty_model() -> SyntaxModel {
        SyntaxModel {
            language: Language::Python,
            parse_ok: true,
            lines: Vec::new(),
            tokens: Vec::new(),
            functions: Vec::new(),
            declarations: Vec::new(),
            patterns: Vec::new(),
            comment_lines: Vec::new(),
        }
    }

    fn func(name: &str, start: usize, end: usize, params: usize, nesting: usize) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            start_line: start,
            end_line: end,
            params,
            nesting,
            has_doc: true,
            public: true,
        }
    }

    #[test]
    fn flags_each_structural_limit() {
        let mut model = empty_model();
        model.functions.push(func("huge", 1, 80, 2, 1));
        model.functions.push(func("deep", 90, 100, 2, 6));
        model.functions.push(func("wide", 110, 115, 9, 1));
        model.functions.push(func("fine", 120, 125, 2, 1));

        let result = extract(&model, &RuleConfig::default());
        assert_eq!(result.issues.len(), 3);
        assert!((result.raw_value - 0.75).abs() < f64::EPSILON);
        assert!(result
            .issues
            .iter()
            .any(|f| f.kind == FindingKind::LongFunction && f.message.contains("`huge`")));
    }

    #[test]
    fn no_functions_is_clean() {
        let result = extract(&empty_model(), &RuleConfig::default());
        assert_eq!(result.raw_value, 0.0);
        assert!(result.issues.is_empty());
    }
}
