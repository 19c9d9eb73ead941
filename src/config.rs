// src/config.rs
//! Engine configuration, loadable from `critiq.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inputs larger than this are rejected before any parsing work.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Upper bound on the recommendation list.
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Language keys ("python", "javascript", "jsx") whose rulesets are
    /// removed from this deployment. Files classified as one of these are
    /// rejected rather than analyzed.
    #[serde(default)]
    pub disabled_languages: Vec<String>,
    #[serde(default)]
    pub rules: RuleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_recommendations: default_max_recommendations(),
            disabled_languages: Vec::new(),
            rules: RuleConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text. Missing fields fall back to
    /// their defaults.
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this shape.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid critiq.toml")
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_toml(&text)
    }

    #[must_use]
    pub fn is_disabled(&self, key: &str) -> bool {
        self.disabled_languages
            .iter()
            .any(|d| d.eq_ignore_ascii_case(key))
    }
}

/// Thresholds consumed by the metric extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_max_function_lines")]
    pub max_function_lines: usize,
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    #[serde(default = "default_max_function_args")]
    pub max_function_args: usize,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Functions at or under this many lines count as a "small scope",
    /// where single-letter names are tolerated.
    #[serde(default = "default_small_scope_lines")]
    pub small_scope_lines: usize,
    /// Comment-to-code ratio below this is penalized.
    #[serde(default = "default_min_comment_ratio")]
    pub min_comment_ratio: f64,
    /// Files with fewer code lines than this skip the ratio check.
    #[serde(default = "default_min_lines_for_ratio")]
    pub min_lines_for_ratio: usize,
    /// Sliding-window size (in normalized code lines) for duplicate
    /// block detection.
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_function_lines: default_max_function_lines(),
            max_nesting_depth: default_max_nesting_depth(),
            max_function_args: default_max_function_args(),
            max_line_length: default_max_line_length(),
            small_scope_lines: default_small_scope_lines(),
            min_comment_ratio: default_min_comment_ratio(),
            min_lines_for_ratio: default_min_lines_for_ratio(),
            duplicate_window: default_duplicate_window(),
        }
    }
}

const fn default_max_input_bytes() -> usize {
    512 * 1024
}
const fn default_max_recommendations() -> usize {
    10
}
const fn default_max_function_lines() -> usize {
    50
}
const fn default_max_nesting_depth() -> usize {
    4
}
const fn default_max_function_args() -> usize {
    5
}
const fn default_max_line_length() -> usize {
    100
}
const fn default_small_scope_lines() -> usize {
    10
}
const fn default_min_comment_ratio() -> f64 {
    0.10
}
const fn default_min_lines_for_ratio() -> usize {
    20
}
const fn default_duplicate_window() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.max_recommendations, 10);
        assert_eq!(config.rules.max_function_lines, 50);
        assert!(config.disabled_languages.is_empty());
    }

    #[test]
    fn partial_override() {
        let config = EngineConfig::from_toml(
            "max_recommendations = 3\n\n[rules]\nmax_line_length = 79\n",
        )
        .unwrap();
        assert_eq!(config.max_recommendations, 3);
        assert_eq!(config.rules.max_line_length, 79);
        assert_eq!(config.rules.max_function_args, 5);
    }

    #[test]
    fn disabled_language_lookup_is_case_insensitive() {
        let config = EngineConfig::from_toml("disabled_languages = [\"Python\"]").unwrap();
        assert!(config.is_disabled("python"));
        assert!(!config.is_disabled("javascript"));
    }
}
