use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::client::CompletionClient;
use super::fallback::rule_based_insights;
use super::parser::parse_insights;
use super::prompt::build_analysis_prompt;
use super::types::{Analysis, InsightError};
use crate::services::checker::CheckResult;
use crate::services::metrics::MetricsRegistry;

pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns a batch of check results into insights.
///
/// Asks the completion service when one is configured and falls back to
/// the rule-based analysis on any failure. `analyze` never errors.
#[derive(Clone)]
pub struct InsightEngine {
    client: Option<Arc<dyn CompletionClient>>,
    timeout: Duration,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine without a completion client; always rule-based
    pub fn new() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_AI_TIMEOUT,
            metrics: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn analyze(&self, results: &[CheckResult]) -> Analysis {
        self.analyze_within(results, self.timeout).await
    }

    /// Same as [`analyze`](Self::analyze) but the model call is bounded by
    /// `budget` as well as the configured timeout.
    pub async fn analyze_within(&self, results: &[CheckResult], budget: Duration) -> Analysis {
        let analysis = self.run(results, budget).await;
        self.record(&analysis);
        analysis
    }

    async fn run(&self, results: &[CheckResult], budget: Duration) -> Analysis {
        if results.is_empty() {
            return Analysis::Fallback {
                insights: Vec::new(),
                cause: None,
            };
        }

        let Some(client) = &self.client else {
            return Analysis::Fallback {
                insights: rule_based_insights(results, Utc::now()),
                cause: None,
            };
        };

        let limit = budget.min(self.timeout);
        let prompt = build_analysis_prompt(results);

        let outcome = match tokio::time::timeout(limit, client.complete(&prompt)).await {
            Ok(Ok(text)) => parse_insights(&text, Utc::now()).ok_or(InsightError::Unparsable),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(InsightError::Timeout(limit)),
        };

        match outcome {
            Ok(insights) => {
                tracing::debug!(count = insights.len(), "Model insights generated");
                Analysis::Model(insights)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Insight generation failed, using rule-based analysis");
                Analysis::Fallback {
                    insights: rule_based_insights(results, Utc::now()),
                    cause: Some(e),
                }
            }
        }
    }

    fn record(&self, analysis: &Analysis) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        metrics
            .insights_total
            .with_label_values(&[analysis.source()])
            .inc_by(analysis.insights().len() as u64);

        if let Some(cause) = analysis.cause() {
            metrics
                .insight_failures_total
                .with_label_values(&[cause.reason()])
                .inc();
        }
    }
}
