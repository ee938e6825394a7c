//! Error-analysis adapter for It Works Locally.
//!
//! This module provides:
//! * [`ErrorAnalyzer`]: async trait implemented by analysis backends.
//! * [`GeminiAnalyzer`]: Gemini `generateContent` backend.
//! * [`PromptBuilder`]: renders the analysis instruction for an
//!   [`ExpertiseLevel`].
//! * [`parse_analysis`] / [`strip_code_fences`]: turn the model's text reply
//!   into an [`AnalysisResult`], repairing missing fields.
//! * [`AnalysisError`] / [`ValidationError`]: failure variants.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use it_works_locally::analysis::{AnalysisRequest, ErrorAnalyzer, ExpertiseLevel, GeminiAnalyzer};
//! use it_works_locally::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default().with_env_overrides();
//!     let analyzer = GeminiAnalyzer::from_config(&config.llm);
//!
//!     let request = AnalysisRequest::new(
//!         "Error: connect ECONNREFUSED 127.0.0.1:6379",
//!         "redis running in docker",
//!         "heroku, no redis addon",
//!         ExpertiseLevel::Senior,
//!     );
//!     let result = analyzer.analyze(&request).await.unwrap();
//!     println!("{}", result.root_cause);
//! }
//! ```

pub mod analyzer;
pub mod parse;
pub mod prompt;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use analyzer::{AnalysisError, ErrorAnalyzer, GeminiAnalyzer};
pub use parse::{parse_analysis, strip_code_fences};
pub use prompt::PromptBuilder;
pub use types::{
    AnalysisRequest, AnalysisResult, Category, ExpertiseLevel, Severity, ValidationError,
};
