// src/score.rs
//! Translates raw metric signals into bounded sub-scores.
//!
//! Scoring policy lives here and nowhere else: each category maps its
//! raw value through a monotonic, deterministic penalty curve and rounds
//! to an integer in `[0, max_points]`. A file with no logical lines
//! bottoms out every category.

use crate::metrics::{Category, MetricResult};

/// Bounded point value for one category.
#[derive(Debug, Clone, Copy)]
pub struct SubScore {
    pub category: Category,
    pub points: u32,
    pub max_points: u32,
}

/// Applies each category's curve. `logical_lines` is the model's
/// non-blank line count; zero forces the minimum everywhere.
#[must_use]
pub fn aggregate(results: &[MetricResult], logical_lines: usize) -> Vec<SubScore> {
    results
        .iter()
        .map(|result| {
            let max_points = result.category.max_points();
            let points = if logical_lines == 0 {
                0
            } else {
                curve(result.category, result.raw_value).min(max_points)
            };
            SubScore {
                category: result.category,
                points,
                max_points,
            }
        })
        .collect()
}

/// The overall score is always recomputed from the sub-scores, never
/// stored, so the two cannot drift apart.
#[must_use]
pub fn overall(subscores: &[SubScore]) -> u32 {
    subscores.iter().map(|s| s.points).sum()
}

/// Linear decay for the ratio categories, step decay per issue for best
/// practices. Slopes are documented in DESIGN.md; all curves answer a
/// worse raw value with equal or fewer points.
fn curve(category: Category, raw: f64) -> u32 {
    let max = f64::from(category.max_points());
    let points = match category {
        Category::Naming | Category::Modularity | Category::Documentation => {
            max * (1.0 - raw.clamp(0.0, 1.0))
        }
        Category::Formatting => max * (1.0 - (raw * 4.0).clamp(0.0, 1.0)),
        Category::Reusability => max * (1.0 - (raw * 2.0).clamp(0.0, 1.0)),
        // raw is an issue count here.
        Category::BestPractices => (max - 3.0 * raw.clamp(0.0, max)).max(0.0),
    };
    points.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricResult;

    fn result(category: Category, raw: f64) -> MetricResult {
        MetricResult::new(category, raw, Vec::new())
    }

    #[test]
    fn perfect_signals_hit_every_cap() {
        let results: Vec<_> = Category::ALL.iter().map(|&c| result(c, 0.0)).collect();
        let scores = aggregate(&results, 10);
        for score in &scores {
            assert_eq!(score.points, score.max_points);
        }
        assert_eq!(overall(&scores), 100);
    }

    #[test]
    fn worst_case_bottoms_out() {
        let results: Vec<_> = Category::ALL
            .iter()
            .map(|&c| MetricResult::worst_case(c))
            .collect();
        let scores = aggregate(&results, 10);
        assert_eq!(overall(&scores), 0);
    }

    #[test]
    fn empty_file_scores_zero_everywhere() {
        let results: Vec<_> = Category::ALL.iter().map(|&c| result(c, 0.0)).collect();
        let scores = aggregate(&results, 0);
        assert_eq!(overall(&scores), 0);
    }

    #[test]
    fn curves_are_monotonic() {
        for &category in &Category::ALL {
            let mut last = u32::MAX;
            for step in 0..=20 {
                let raw = f64::from(step) * 0.25;
                let points = curve(category, raw);
                assert!(points <= last, "{category:?} rose at raw={raw}");
                last = points;
            }
        }
    }

    #[test]
    fn practice_issues_step_down() {
        assert_eq!(curve(Category::BestPractices, 0.0), 20);
        assert_eq!(curve(Category::BestPractices, 1.0), 17);
        assert_eq!(curve(Category::BestPractices, 7.0), 0);
    }
}
