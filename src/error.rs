// src/error.rs
use thiserror::Error;

/// The only two conditions that fail a request. Everything else
/// (ambiguous classification, parse failure, extractor panic) degrades
/// into a lower-precision report instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input is {size} bytes (limit: {limit})")]
    InputTooLarge { size: usize, limit: usize },

    #[error("no ruleset enabled for language '{0}'")]
    UnsupportedLanguage(&'static str),
}

pub type Result<T> = std::result::Result<T, EngineError>;
