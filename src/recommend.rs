// src/recommend.rs
//! Turns extractor findings into a short, prioritized advice list.
//!
//! At most one line per category-finding-type: the first occurrence is
//! the representative, repeats only bump its count. Ordering is severity
//! first, then category weight, so the heaviest problems surface before
//! style nits. Scores are never consulted here.

use crate::metrics::{Category, FindingKind, MetricResult, Severity};
use std::collections::HashMap;

struct Group {
    category: Category,
    kind: FindingKind,
    severity: Severity,
    message: String,
    count: usize,
    seq: usize,
}

/// Builds the recommendation list, capped at `limit` entries.
#[must_use]
pub fn generate(results: &[MetricResult], limit: usize) -> Vec<String> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<(Category, FindingKind), usize> = HashMap::new();

    for result in results {
        for finding in &result.issues {
            let key = (result.category, finding.kind);
            match index.get(&key) {
                Some(&at) => groups[at].count += 1,
                None => {
                    index.insert(key, groups.len());
                    groups.push(Group {
                        category: result.category,
                        kind: finding.kind,
                        severity: finding.severity,
                        message: finding.message.clone(),
                        count: 1,
                        seq: groups.len(),
                    });
                }
            }
        }
    }

    groups.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.category.max_points().cmp(&a.category.max_points()))
            .then(a.seq.cmp(&b.seq))
    });

    groups
        .into_iter()
        .take(limit)
        .map(|g| {
            if g.count > 1 {
                format!("{} ({} occurrences)", g.message, g.count)
            } else {
                g.message
            }
        })
        .collect()
}
