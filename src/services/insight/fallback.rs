use chrono::{DateTime, Utc};
use std::time::Duration;

use super::types::{Insight, InsightType};
use crate::services::checker::{average_response_time, CheckResult};

const SLOW_THRESHOLD: Duration = Duration::from_secs(2);
const FAST_AVERAGE: Duration = Duration::from_millis(500);

/// Deterministic insights derived from the batch alone.
///
/// Produces nothing for an empty batch; otherwise always ends with the
/// monitoring recommendation.
pub fn rule_based_insights(results: &[CheckResult], generated_at: DateTime<Utc>) -> Vec<Insight> {
    let Some(average) = average_response_time(results) else {
        return Vec::new();
    };

    let unhealthy: Vec<&str> = results
        .iter()
        .filter(|r| !r.is_healthy)
        .map(|r| r.url.as_str())
        .collect();
    let slow = results.iter().filter(|r| r.response_time > SLOW_THRESHOLD).count();

    let mut insights = Vec::with_capacity(4);

    if !unhealthy.is_empty() {
        insights.push(Insight::new(
            "🚨 Service Disruption Detected",
            format!(
                "{} endpoint(s) are currently down: {}",
                unhealthy.len(),
                unhealthy.join(", ")
            ),
            InsightType::Alert,
            1.0,
            generated_at,
        ));
    }

    if slow > 0 {
        insights.push(Insight::new(
            "⚠️ Performance Issues",
            format!(
                "{} endpoint(s) showing elevated response times (>2s). Consider investigating server load or network issues.",
                slow
            ),
            InsightType::Warning,
            0.9,
            generated_at,
        ));
    }

    if unhealthy.is_empty() && average < FAST_AVERAGE {
        insights.push(Insight::new(
            "✅ System Health Excellent",
            format!(
                "All endpoints healthy with optimal average response time of {}ms.",
                average.as_millis()
            ),
            InsightType::Success,
            0.95,
            generated_at,
        ));
    }

    insights.push(Insight::new(
        "💡 Monitoring Recommendation",
        "Consider setting up automated alerts for response times >3s and implementing health check redundancy across multiple regions.",
        InsightType::Info,
        0.8,
        generated_at,
    ));

    insights
}
