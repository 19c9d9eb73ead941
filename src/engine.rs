// src/engine.rs
//! The analysis pipeline.
//!
//! One call runs classify -> parse -> extract -> score -> recommend ->
//! assemble, strictly in that order except for the extractor fan-out.
//! The engine holds no state between calls beyond its configuration.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::lang::Language;
use crate::model::SourceUnit;
use crate::report::{self, AnalysisReport};
use crate::{metrics, parse, recommend, score};

pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine. The category-cap invariant is checked here,
    /// once, instead of on every request.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        assert_eq!(
            report::category_caps_total(),
            100,
            "category caps must sum to 100"
        );
        Self { config }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyzes one in-memory source file.
    ///
    /// # Errors
    ///
    /// `InputTooLarge` when the content exceeds the configured byte
    /// limit, `UnsupportedLanguage` when the classified language's
    /// ruleset is disabled in this deployment. Everything else degrades
    /// into a lower-precision report.
    pub fn analyze(&self, filename: &str, content: &str) -> Result<AnalysisReport> {
        if content.len() > self.config.max_input_bytes {
            return Err(EngineError::InputTooLarge {
                size: content.len(),
                limit: self.config.max_input_bytes,
            });
        }

        let language = Language::classify(filename, content);
        if language != Language::Unknown && self.config.is_disabled(language.key()) {
            return Err(EngineError::UnsupportedLanguage(language.key()));
        }
        tracing::debug!(language = language.key(), file = filename, "classified");

        let unit = SourceUnit::new(filename, content, language);
        let model = parse::build_model(&unit);
        tracing::debug!(parse_ok = model.parse_ok, "model built");

        let results = metrics::run_all(&model, &self.config.rules);
        let subscores = score::aggregate(&results, model.logical_lines());
        let recommendations = recommend::generate(&results, self.config.max_recommendations);

        Ok(report::assemble(&subscores, recommendations, model.parse_ok))
    }
}
