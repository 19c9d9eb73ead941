// src/metrics/naming.rs
//! Identifier casing consistency and descriptiveness.

use super::{Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::lang::{rules_for, NamingStyle};
use crate::model::{DeclKind, SyntaxModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Snake,
    Camel,
    Pascal,
    Screaming,
    /// Single lowercase word, compatible with both conventions.
    Flat,
    /// Mixed shapes like `Foo_bar`.
    Other,
}

pub fn extract(model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    let lang_rules = rules_for(model.language);
    let expected = lang_rules.map(|r| r.naming_style());
    let pascal_functions_ok = lang_rules.is_some_and(|r| r.allows_pascal_functions());

    let expected = expected.or_else(|| dominant_style(model));

    let mut issues = Vec::new();
    let mut checked = 0usize;
    let mut bad = 0usize;

    for func in &model.functions {
        checked += 1;
        let case = case_of(&func.name);
        let pascal_ok = pascal_functions_ok && case == Case::Pascal;
        if !pascal_ok && !conforms(case, expected) {
            bad += 1;
            issues.push(casing_finding("Function", &func.name, func.start_line, expected));
        }
    }

    for decl in &model.declarations {
        let noun = match decl.kind {
            DeclKind::Variable => "Variable",
            DeclKind::Parameter => "Parameter",
            DeclKind::Class => "Class",
            // Imports mirror external module names; functions are
            // covered above.
            DeclKind::Import | DeclKind::Function => continue,
        };
        checked += 1;

        let case = case_of(&decl.name);
        if decl.kind == DeclKind::Class {
            // Classes are PascalCase in every supported language,
            // regardless of the function/variable convention.
            if !matches!(case, Case::Pascal | Case::Flat | Case::Screaming) {
                bad += 1;
                issues.push(Finding::new(
                    FindingKind::InconsistentCasing,
                    decl.line,
                    format!(
                        "Class `{}` at line {} does not follow PascalCase",
                        decl.name, decl.line
                    ),
                ));
            }
        } else if !conforms(case, expected) {
            bad += 1;
            issues.push(casing_finding(noun, &decl.name, decl.line, expected));
        }

        if decl.kind != DeclKind::Class
            && decl.name.len() == 1
            && decl.name != "_"
            && !small_scope(model, decl.line, rules)
        {
            bad += 1;
            issues.push(Finding::new(
                FindingKind::NonDescriptiveName,
                decl.line,
                format!(
                    "{noun} `{}` at line {} is not descriptive",
                    decl.name, decl.line
                ),
            ));
        }
    }

    let raw = if checked == 0 {
        0.0
    } else {
        (bad as f64 / checked as f64).min(1.0)
    };
    MetricResult::new(super::Category::Naming, raw, issues)
}

fn small_scope(model: &SyntaxModel, line: usize, rules: &RuleConfig) -> bool {
    model
        .enclosing_function(line)
        .is_some_and(|f| f.line_count() <= rules.small_scope_lines)
}

fn casing_finding(noun: &str, name: &str, line: usize, expected: Option<NamingStyle>) -> Finding {
    let convention = match expected {
        Some(NamingStyle::Snake) => "snake_case",
        Some(NamingStyle::Camel) => "camelCase",
        None => "the file's dominant convention",
    };
    Finding::new(
        FindingKind::InconsistentCasing,
        line,
        format!("{noun} `{name}` at line {line} does not follow {convention}"),
    )
}

fn conforms(case: Case, expected: Option<NamingStyle>) -> bool {
    match expected {
        Some(NamingStyle::Snake) => {
            matches!(case, Case::Snake | Case::Flat | Case::Screaming)
        }
        Some(NamingStyle::Camel) => {
            matches!(case, Case::Camel | Case::Flat | Case::Screaming)
        }
        // No convention to enforce; only malformed names count.
        None => case != Case::Other,
    }
}

fn case_of(name: &str) -> Case {
    let stripped = name.trim_matches('_');
    if stripped.is_empty() {
        return Case::Flat;
    }
    let has_underscore = stripped.contains('_');
    let has_upper = stripped.chars().any(|c| c.is_uppercase());
    let has_lower = stripped.chars().any(|c| c.is_lowercase());
    let first_upper = stripped.chars().next().is_some_and(char::is_uppercase);

    if has_upper && !has_lower {
        return Case::Screaming;
    }
    if has_underscore {
        if has_upper {
            Case::Other
        } else {
            Case::Snake
        }
    } else if !has_upper {
        Case::Flat
    } else if first_upper {
        Case::Pascal
    } else {
        Case::Camel
    }
}

/// For unknown languages: whichever multi-word convention the file itself
/// uses most. `None` when the file gives no signal.
fn dominant_style(model: &SyntaxModel) -> Option<NamingStyle> {
    let mut snake = 0usize;
    let mut camel = 0usize;
    let names = model
        .functions
        .iter()
        .map(|f| f.name.as_str())
        .chain(model.declarations.iter().map(|d| d.name.as_str()));
    for name in names {
        match case_of(name) {
            Case::Snake => snake += 1,
            Case::Camel => camel += 1,
            _ => {}
        }
    }
    match snake.cmp(&camel) {
        std::cmp::Ordering::Greater => Some(NamingStyle::Snake),
        std::cmp::Ordering::Less => Some(NamingStyle::Camel),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;
    use crate::model::SourceUnit;
    use crate::parse::build_model;

    #[test]
    fn bad_class_name_gets_pascal_advice() {
        let src = "class my_widget:\n    pass\n";
        let unit = SourceUnit::new("w.py", src, Language::Python);
        let result = extract(&build_model(&unit), &RuleConfig::default());

        let finding = result
            .issues
            .iter()
            .find(|f| f.message.contains("`my_widget`"))
            .unwrap();
        assert!(finding.message.contains("PascalCase"), "{}", finding.message);
        assert!(!finding.message.contains("snake_case"), "{}", finding.message);
    }

    #[test]
    fn pascal_class_name_is_clean() {
        let src = "class WidgetStore:\n    pass\n";
        let unit = SourceUnit::new("w.py", src, Language::Python);
        let result = extract(&build_model(&unit), &RuleConfig::default());
        assert!(result.issues.is_empty(), "{:?}", result.issues);
    }

    #[test]
    fn case_classification() {
        assert_eq!(case_of("total_count"), Case::Snake);
        assert_eq!(case_of("totalCount"), Case::Camel);
        assert_eq!(case_of("TotalCount"), Case::Pascal);
        assert_eq!(case_of("MAX_SIZE"), Case::Screaming);
        assert_eq!(case_of("total"), Case::Flat);
        assert_eq!(case_of("Total_count"), Case::Other);
        assert_eq!(case_of("_private"), Case::Flat);
    }

    #[test]
    fn screaming_passes_both_conventions() {
        assert!(conforms(Case::Screaming, Some(NamingStyle::Snake)));
        assert!(conforms(Case::Screaming, Some(NamingStyle::Camel)));
        assert!(!conforms(Case::Camel, Some(NamingStyle::Snake)));
        assert!(!conforms(Case::Snake, Some(NamingStyle::Camel)));
    }
}
