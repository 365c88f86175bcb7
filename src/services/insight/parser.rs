use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{Insight, InsightType};

#[derive(Debug, Deserialize)]
struct RawInsight {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    confidence: f64,
}

/// Pull the insight array out of free-form model output.
///
/// Takes everything from the first `[` to the last `]` and decodes it as a
/// JSON array. Returns `None` when there is no such span, it does not decode,
/// or it decodes to an empty array.
pub fn parse_insights(response: &str, generated_at: DateTime<Utc>) -> Option<Vec<Insight>> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    if start >= end {
        return None;
    }

    let raw: Vec<RawInsight> = serde_json::from_str(&response[start..=end]).ok()?;
    if raw.is_empty() {
        return None;
    }

    Some(
        raw.into_iter()
            .map(|r| {
                Insight::new(
                    r.title,
                    r.content,
                    InsightType::from_label(&r.kind),
                    r.confidence,
                    generated_at,
                )
            })
            .collect(),
    )
}
