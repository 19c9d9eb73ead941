// tests/engine_props.rs
//! Contract-level properties of the analysis pipeline.

use critiq_core::report::AnalysisReport;
use critiq_core::{Engine, EngineConfig};

fn analyze(filename: &str, content: &str) -> AnalysisReport {
    Engine::with_defaults()
        .analyze(filename, content)
        .expect("analysis should not fail")
}

fn assert_bounds(report: &AnalysisReport) {
    let b = &report.breakdown;
    assert!(b.naming <= 10);
    assert!(b.modularity <= 20);
    assert!(b.comments <= 20);
    assert!(b.formatting <= 15);
    assert!(b.reusability <= 15);
    assert!(b.best_practices <= 20);
    assert!(report.overall_score <= 100);
    assert_eq!(report.overall_score, b.total());
}

const MESSY_PY: &str = "\
import os
import sys

def process(a, b, c, d, e, f, g):
    try:
        found = 1
        if a:
            if b:
                if c:
                    if d:
                        if e:
                            return found
    except:
        pass
";

const CLEAN_PY: &str = "\
def add_totals(values):
    total = 0
    for item in values:
        total = total + item
    return total
";

#[test]
fn breakdown_sums_to_overall_for_all_inputs() {
    for (name, src) in [
        ("clean.py", CLEAN_PY),
        ("messy.py", MESSY_PY),
        ("tiny.js", "const x = 1;\n"),
        ("empty.py", ""),
        ("prose.txt", "nothing resembling code here\n"),
    ] {
        let report = analyze(name, src);
        assert_bounds(&report);
    }
}

#[test]
fn analysis_is_idempotent() {
    let first = analyze("messy.py", MESSY_PY);
    let second = analyze("messy.py", MESSY_PY);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn empty_file_scores_minimum_without_crashing() {
    let report = analyze("empty.py", "");
    assert_eq!(report.overall_score, 0);
    assert_eq!(report.breakdown.total(), 0);
}

#[test]
fn full_docs_and_no_duplication_hit_their_caps() {
    let src = "\
def greet(name):
    \"\"\"Build a greeting.\"\"\"
    return \"hi \" + name
";
    let report = analyze("greet.py", src);
    assert_eq!(report.breakdown.comments, 20);
    assert_eq!(report.breakdown.reusability, 15);
}

#[test]
fn unparsable_file_degrades_instead_of_failing() {
    let src = "def broken(:\n    return ((\n";
    let report = analyze("broken.py", src);
    assert!(!report.parse_ok);
    assert_bounds(&report);

    // The external shape is still complete.
    let json = serde_json::to_value(&report).unwrap();
    for key in [
        "naming",
        "modularity",
        "comments",
        "formatting",
        "reusability",
        "best_practices",
    ] {
        assert!(json["breakdown"].get(key).is_some(), "missing {key}");
    }
    assert!(json.get("parse_ok").is_none());
}

#[test]
fn recommendations_are_capped_and_distinct() {
    let config = EngineConfig {
        max_recommendations: 3,
        ..EngineConfig::default()
    };
    let report = Engine::new(config).analyze("messy.py", MESSY_PY).unwrap();
    assert!(report.recommendations.len() <= 3);

    let mut deduped = report.recommendations.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), report.recommendations.len());
}

#[test]
fn five_line_python_example() {
    let report = analyze("sums.py", CLEAN_PY);
    assert_eq!(report.breakdown.naming, 10);
    assert_eq!(report.breakdown.modularity, 20);
    assert!(report.breakdown.comments < 20);
    assert_eq!(report.breakdown.formatting, 15);
    assert_eq!(report.breakdown.reusability, 15);
    assert_eq!(report.breakdown.best_practices, 20);
    assert_eq!(report.overall_score, report.breakdown.total());

    let docstring_recs: Vec<_> = report
        .recommendations
        .iter()
        .filter(|r| r.contains("docstring"))
        .collect();
    assert_eq!(docstring_recs.len(), 1);
    assert!(docstring_recs[0].contains("`add_totals`"));
}

#[test]
fn messy_file_surfaces_the_worst_problems_first() {
    let report = analyze("messy.py", MESSY_PY);
    assert!(report.overall_score < 80);
    // Bare except is the highest-severity finding in this file.
    assert!(report.recommendations[0].contains("Bare except"));
}
