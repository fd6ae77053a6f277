//! Feedback Learning
//!
//! Ratings and comments on past recommendations are appended to a durable
//! log and folded into heuristic preference weights. The weights re-score
//! later recommendations; nothing is trained.

mod processor;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::learning::{NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};
use crate::types::{CloudProvider, SessionId};

pub use processor::FeedbackProcessor;
pub use store::FeedbackLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn from_rating(rating: f64) -> Self {
        if rating >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if rating <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    CostOptimization,
    PerformanceOptimization,
    CloudProviderPreference,
}

impl InsightCategory {
    /// Preference dimension the insight reinforces
    pub fn dimension(self) -> Option<&'static str> {
        match self {
            Self::CostOptimization => Some("cost"),
            Self::PerformanceOptimization => Some("performance"),
            Self::CloudProviderPreference => None,
        }
    }
}

/// A conclusion drawn from positive feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningInsight {
    pub insight_id: String,
    pub category: InsightCategory,
    pub description: String,
    pub confidence: f64,
    /// Feedback ids the insight was drawn from
    pub evidence: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback as submitted by a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackInput {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub recommendation_id: String,
    pub rating: f64,
    #[serde(default)]
    pub text: Option<String>,
    /// Signed adjustments keyed by preference dimension
    #[serde(default)]
    pub preferences: BTreeMap<String, f64>,
    #[serde(default)]
    pub provider: Option<CloudProvider>,
    #[serde(default)]
    pub architecture_type: Option<String>,
}

impl FeedbackInput {
    pub fn new(recommendation_id: impl Into<String>, rating: f64) -> Self {
        Self {
            recommendation_id: recommendation_id.into(),
            rating,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_provider(mut self, provider: CloudProvider) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// One persisted feedback entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback_id: String,
    pub session_id: Option<SessionId>,
    pub recommendation_id: String,
    pub rating: f64,
    pub text: Option<String>,
    #[serde(default)]
    pub preferences: BTreeMap<String, f64>,
    pub sentiment: Sentiment,
    pub provider: Option<CloudProvider>,
    pub architecture_type: Option<String>,
    #[serde(default)]
    pub insights: Vec<LearningInsight>,
    pub recorded_at: DateTime<Utc>,
}

/// Acknowledgement returned by [`FeedbackProcessor::submit`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub feedback_id: String,
    pub sentiment: Sentiment,
    pub total_entries: usize,
    pub average_rating: f64,
    pub insights_generated: usize,
}

/// Aggregate view of the feedback log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningSummary {
    pub total: usize,
    pub average_rating: f64,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// `"n-(n+1)"` bucket → count
    pub rating_distribution: BTreeMap<String, usize>,
    /// Provider → mean rating
    pub provider_preferences: BTreeMap<String, f64>,
    /// Architecture type → mean rating
    pub architecture_preferences: BTreeMap<String, f64>,
    pub positive_aspects: Vec<String>,
    pub negative_aspects: Vec<String>,
    pub preference_weights: BTreeMap<String, f64>,
    /// 0 (price-insensitive) to 1, from ratings on cost-related feedback
    pub cost_sensitivity: f64,
    /// Highest-confidence insights first
    pub insights: Vec<LearningInsight>,
}
