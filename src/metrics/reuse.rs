// src/metrics/reuse.rs
//! Near-duplicate block detection over normalized code lines.
//!
//! A sliding window of consecutive normalized lines is hashed; a window
//! whose hash was already seen marks its span as duplicated. Hashing is
//! name-sensitive but whitespace-invariant, so reformatted copies still
//! collide while genuinely different logic does not.

use super::{Category, Finding, FindingKind, MetricResult};
use crate::config::RuleConfig;
use crate::model::SyntaxModel;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// Lines shorter than this after normalization carry no real signal
/// (closing braces, `pass`, `end`).
const MIN_SIGNIFICANT_CHARS: usize = 4;

pub fn extract(model: &SyntaxModel, rules: &RuleConfig) -> MetricResult {
    let window = rules.duplicate_window.max(2);

    // (original line number, normalized text) for substantial code lines.
    let seq: Vec<(usize, String)> = model
        .lines
        .iter()
        .filter(|l| !l.blank && !l.comment_only)
        .map(|l| (l.number, normalize(&l.text)))
        .filter(|(_, n)| n.len() >= MIN_SIGNIFICANT_CHARS)
        .collect();

    if seq.len() < window {
        return MetricResult::new(Category::Reusability, 0.0, Vec::new());
    }

    let mut first_seen: HashMap<u64, usize> = HashMap::new();
    let mut hits: Vec<(usize, usize)> = Vec::new(); // (dup window idx, origin idx)

    for idx in 0..=seq.len() - window {
        let mut hasher = DefaultHasher::new();
        for (_, normalized) in &seq[idx..idx + window] {
            normalized.hash(&mut hasher);
        }
        let key = hasher.finish();

        match first_seen.get(&key) {
            // Only count copies that do not overlap their origin.
            Some(&origin) if idx >= origin + window => hits.push((idx, origin)),
            Some(_) => {}
            None => {
                first_seen.insert(key, idx);
            }
        }
    }

    let mut issues = Vec::new();
    let mut duplicated: BTreeSet<usize> = BTreeSet::new();

    // Fold runs of adjacent windows into one block finding.
    let mut i = 0;
    while i < hits.len() {
        let (start, origin_start) = hits[i];
        let mut end = start;
        let mut origin_end = origin_start;
        let mut j = i + 1;
        while j < hits.len() && hits[j].0 == end + 1 && hits[j].1 == origin_end + 1 {
            end += 1;
            origin_end += 1;
            j += 1;
        }

        let block_last = end + window - 1;
        let origin_last = origin_end + window - 1;
        for covered in start..=block_last {
            duplicated.insert(covered);
        }

        issues.push(Finding::new(
            FindingKind::DuplicateBlock,
            seq[start].0,
            format!(
                "Lines {}-{} duplicate logic in lines {}-{}",
                seq[start].0, seq[block_last].0, seq[origin_start].0, seq[origin_last].0
            ),
        ));
        i = j;
    }

    let raw = duplicated.len() as f64 / seq.len() as f64;
    MetricResult::new(Category::Reusability, raw, issues)
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Language;
    use crate::model::SourceUnit;
    use crate::parse::build_model;

    fn analyze(content: &str) -> MetricResult {
        let language = Language::classify("sample.py", content);
        let unit = SourceUnit::new("sample.py", content, language);
        extract(&build_model(&unit), &RuleConfig::default())
    }

    #[test]
    fn detects_a_copied_block() {
        let body = "\
    total = fetch_amount()
    adjusted = total * rate
    rounded = round(adjusted, 2)
    ledger.append(rounded)
    publish(rounded)
";
        let src = format!("def first():\n{body}\ndef second():\n{body}");
        let result = analyze(&src);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].message.contains("duplicate logic"));
        assert!(result.raw_value > 0.0);
    }

    #[test]
    fn distinct_code_is_clean() {
        let src = "\
def alpha(a):
    first_step(a)
    second_step(a)
    third_step(a)
    return finish(a)

def beta(b):
    load(b)
    verify(b)
    transform(b)
    return store(b)
";
        let result = analyze(src);
        assert!(result.issues.is_empty());
        assert_eq!(result.raw_value, 0.0);
    }

    #[test]
    fn short_files_never_flag() {
        let result = analyze("x = 1\ny = 2\n");
        assert_eq!(result.raw_value, 0.0);
        assert!(result.issues.is_empty());
    }
}
