pub mod cache;
pub mod client;
pub mod engine;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod types;

pub use cache::InsightCache;
pub use client::{CompletionClient, OpenAiCompletionClient};
pub use engine::InsightEngine;
pub use fallback::rule_based_insights;
pub use types::{Analysis, Insight, InsightError, InsightType};
