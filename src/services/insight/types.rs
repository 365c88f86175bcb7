use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity-like tag of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Alert,
    Warning,
    Info,
    Success,
}

impl InsightType {
    /// Lenient parse for labels coming from the model; anything unknown is `Info`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "alert" => Self::Alert,
            "warning" => Self::Warning,
            "success" => Self::Success,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    /// Always within [0, 1]
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        kind: InsightType,
        confidence: f64,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            kind,
            confidence: clamp_confidence(confidence),
            generated_at,
        }
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode completion response: {0}")]
    Decode(String),
    #[error("no choices in completion response")]
    EmptyResponse,
    #[error("completion timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("no insight array found in completion output")]
    Unparsable,
}

impl InsightError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Api { .. } => "api",
            Self::Decode(_) => "decode",
            Self::EmptyResponse => "empty",
            Self::Timeout(_) => "timeout",
            Self::Unparsable => "unparsable",
        }
    }
}

/// What the engine produced and how
#[derive(Debug)]
pub enum Analysis {
    /// Insights written by the completion service
    Model(Vec<Insight>),
    /// Rule-based insights; `cause` is the failure that forced the fallback,
    /// `None` when the model was never asked.
    Fallback {
        insights: Vec<Insight>,
        cause: Option<InsightError>,
    },
}

impl Analysis {
    pub fn insights(&self) -> &[Insight] {
        match self {
            Self::Model(insights) => insights,
            Self::Fallback { insights, .. } => insights,
        }
    }

    pub fn into_insights(self) -> Vec<Insight> {
        match self {
            Self::Model(insights) => insights,
            Self::Fallback { insights, .. } => insights,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn cause(&self) -> Option<&InsightError> {
        match self {
            Self::Model(_) => None,
            Self::Fallback { cause, .. } => cause.as_ref(),
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Fallback { .. } => "fallback",
        }
    }
}
