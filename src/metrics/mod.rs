// src/metrics/mod.rs
//! The six metric extractors.
//!
//! Each extractor is a pure function over the shared `SyntaxModel`; none
//! depends on another, so they fan out across rayon tasks and join before
//! scoring. An extractor that panics is replaced by a worst-case result
//! for its category so the pipeline always reaches the report.

pub mod docs;
pub mod formatting;
pub mod modularity;
pub mod naming;
pub mod practices;
pub mod reuse;

use crate::config::RuleConfig;
use crate::model::SyntaxModel;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// The six scored quality categories. Order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Naming,
    Modularity,
    Documentation,
    Formatting,
    Reusability,
    BestPractices,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Naming,
        Self::Modularity,
        Self::Documentation,
        Self::Formatting,
        Self::Reusability,
        Self::BestPractices,
    ];

    /// The breakdown key this category serializes under. Part of the
    /// response contract; do not rename.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::Modularity => "modularity",
            Self::Documentation => "comments",
            Self::Formatting => "formatting",
            Self::Reusability => "reusability",
            Self::BestPractices => "best_practices",
        }
    }

    /// Category cap. The six caps always sum to 100.
    #[must_use]
    pub fn max_points(self) -> u32 {
        match self {
            Self::Naming => 10,
            Self::Modularity | Self::Documentation | Self::BestPractices => 20,
            Self::Formatting | Self::Reusability => 15,
        }
    }
}

/// How sure we are that a finding needs fixing. Ordering matters:
/// recommendations surface higher severities first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Message template identity for a finding. Recommendations deduplicate
/// on this, so repeated instances collapse to one actionable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    InconsistentCasing,
    NonDescriptiveName,
    LongFunction,
    DeepNesting,
    LongParameterList,
    MissingDoc,
    LowCommentRatio,
    MixedIndentation,
    TrailingWhitespace,
    LongLine,
    IrregularIndentStep,
    DuplicateBlock,
    BareExcept,
    MutableDefaultArg,
    LooseEquality,
    VarKeyword,
    UnusedImport,
    UnusedVariable,
}

impl FindingKind {
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::BareExcept | Self::MutableDefaultArg => Severity::Error,
            Self::NonDescriptiveName
            | Self::LongFunction
            | Self::DeepNesting
            | Self::LongParameterList
            | Self::MissingDoc
            | Self::MixedIndentation
            | Self::DuplicateBlock
            | Self::LooseEquality
            | Self::UnusedImport => Severity::Warning,
            Self::InconsistentCasing
            | Self::LowCommentRatio
            | Self::TrailingWhitespace
            | Self::LongLine
            | Self::IrregularIndentStep
            | Self::VarKeyword
            | Self::UnusedVariable => Severity::Info,
        }
    }
}

/// One located finding.
#[derive(Debug, Clone)]
pub struct Finding {
    pub kind: FindingKind,
    pub line: usize,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    #[must_use]
    pub fn new(kind: FindingKind, line: usize, message: String) -> Self {
        Self {
            kind,
            line,
            message,
            severity: kind.severity(),
        }
    }
}

/// Raw output of one extractor. `raw_value` is a normalized ratio for
/// every category except Best Practices, which reports an issue count;
/// translating either into points is the aggregator's job.
#[derive(Debug)]
pub struct MetricResult {
    pub category: Category,
    pub raw_value: f64,
    pub issues: Vec<Finding>,
    /// Set when this result came from the worst-case substitution
    /// rather than a real extractor run.
    pub degraded: bool,
}

impl MetricResult {
    #[must_use]
    pub fn new(category: Category, raw_value: f64, issues: Vec<Finding>) -> Self {
        Self {
            category,
            raw_value,
            issues,
            degraded: false,
        }
    }

    /// Maximally penalized stand-in used when an extractor fails.
    #[must_use]
    pub fn worst_case(category: Category) -> Self {
        Self {
            category,
            raw_value: f64::MAX,
            issues: Vec::new(),
            degraded: true,
        }
    }
}

/// Runs all six extractors against the model, in parallel, in category
/// order. Panics are caught at each extractor's boundary and replaced
/// with the worst-case result for that category.
#[must_use]
pub fn run_all(model: &SyntaxModel, rules: &RuleConfig) -> Vec<MetricResult> {
    Category::ALL
        .par_iter()
        .map(|&category| {
            catch_unwind(AssertUnwindSafe(|| run_one(category, model, rules))).unwrap_or_else(
                |_| {
                    tracing::warn!(
                        category = category.key(),
                        "extractor panicked, substituting worst-case result"
                    );
                    MetricResult::worst_case(category)
                },
            )
        })
        .collect()
}

fn run_one(category: Category, model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    match category {
        Category::Naming => naming::extract(model, rules),
        Category::Modularity => modularity::extract(model, rules),
        Category::Documentation => docs::extract(model, rules),
        Category::Formatting => formatting::extract(model, rules),
        Category::Reusability => reuse::extract(model, rules),
        Category::BestPractices => practices::extract(model, rules),
    }
}
