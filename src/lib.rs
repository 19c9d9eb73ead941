//! critiq core - single-file code quality scoring.
//!
//! Feed one source file in, get a scored report out: a 0-100 overall score,
//! a six-category breakdown, and a short list of recommendations. Supported
//! languages are JavaScript, JSX and Python; anything else degrades to a
//! token-only analysis instead of failing.

pub mod config;
pub mod engine;
pub mod error;
pub mod lang;
pub mod metrics;
pub mod model;
pub mod parse;
pub mod recommend;
pub mod report;
pub mod score;

pub use config::{EngineConfig, RuleConfig};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use lang::Language;
pub use report::AnalysisReport;
