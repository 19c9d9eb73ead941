// src/report.rs
//! The response contract.
//!
//! Field names and category caps are a compatibility contract with the
//! consuming UI and must not change without a version bump.

use crate::metrics::Category;
use crate::score::{self, SubScore};
use serde::Serialize;

/// Per-category points. All six keys are always present, even when an
/// extractor degraded.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Breakdown {
    pub naming: u32,
    pub modularity: u32,
    pub comments: u32,
    pub formatting: u32,
    pub reusability: u32,
    pub best_practices: u32,
}

impl Breakdown {
    fn from_subscores(subscores: &[SubScore]) -> Self {
        let mut breakdown = Self::default();
        for score in subscores {
            match score.category {
                Category::Naming => breakdown.naming = score.points,
                Category::Modularity => breakdown.modularity = score.points,
                Category::Documentation => breakdown.comments = score.points,
                Category::Formatting => breakdown.formatting = score.points,
                Category::Reusability => breakdown.reusability = score.points,
                Category::BestPractices => breakdown.best_practices = score.points,
            }
        }
        breakdown
    }

    /// Sum of the six values, used to recompute the overall score.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.naming
            + self.modularity
            + self.comments
            + self.formatting
            + self.reusability
            + self.best_practices
    }
}

/// The full analysis result returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub overall_score: u32,
    pub breakdown: Breakdown,
    pub recommendations: Vec<String>,
    /// Whether the grammar parse succeeded. Internal signal only; not
    /// part of the serialized contract.
    #[serde(skip)]
    pub parse_ok: bool,
}

/// Packages sub-scores and recommendations into the report shape.
#[must_use]
pub fn assemble(
    subscores: &[SubScore],
    recommendations: Vec<String>,
    parse_ok: bool,
) -> AnalysisReport {
    let breakdown = Breakdown::from_subscores(subscores);
    AnalysisReport {
        overall_score: score::overall(subscores),
        breakdown,
        recommendations,
        parse_ok,
    }
}

/// Sum of the six category caps. Checked once at engine construction.
#[must_use]
pub fn category_caps_total() -> u32 {
    Category::ALL.iter().map(|c| c.max_points()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_shape_matches_contract() {
        let subscores: Vec<SubScore> = Category::ALL
            .iter()
            .map(|&category| SubScore {
                category,
                points: category.max_points(),
                max_points: category.max_points(),
            })
            .collect();
        let report = assemble(&subscores, vec!["tidy up".to_string()], true);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["overall_score"], 100);
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
        assert_eq!(json["recommendations"][0], "tidy up");
    }

    #[test]
    fn overall_equals_breakdown_total() {
        let subscores: Vec<SubScore> = Category::ALL
            .iter()
            .map(|&category| SubScore {
                category,
                points: category.max_points() / 2,
                max_points: category.max_points(),
            })
            .collect();
        let report = assemble(&subscores, Vec::new(), true);
        assert_eq!(report.overall_score, report.breakdown.total());
    }
}
