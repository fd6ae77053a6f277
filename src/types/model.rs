//! Domain Model
//!
//! Queries, recommendations, and the enums shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::{ArchError, Result, ValidationError};
use crate::constants::recommendation as rec_constants;

// =============================================================================
// Cloud Provider
// =============================================================================

/// Supported cloud providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 2] = [CloudProvider::Aws, CloudProvider::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
        }
    }

    /// Human-facing name ("AWS", "Azure")
    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "azure" => Ok(CloudProvider::Azure),
            other => Err(ValidationError::field(
                "provider",
                format!("unknown provider '{}'. Valid values: aws, azure", other),
            )
            .into()),
        }
    }
}

// =============================================================================
// Architecture & Database
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchitectureType {
    #[default]
    Microservices,
    Monolith,
    Serverless,
}

impl ArchitectureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Microservices => "microservices",
            Self::Monolith => "monolith",
            Self::Serverless => "serverless",
        }
    }
}

impl fmt::Display for ArchitectureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchitectureType {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "microservices" => Ok(Self::Microservices),
            "monolith" => Ok(Self::Monolith),
            "serverless" => Ok(Self::Serverless),
            other => Err(ValidationError::field(
                "architecture_type",
                format!(
                    "unknown architecture '{}'. Valid values: microservices, monolith, serverless",
                    other
                ),
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Postgresql,
    Mysql,
    Mongodb,
    Cosmosdb,
    Dynamodb,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
            Self::Cosmosdb => "cosmosdb",
            Self::Dynamodb => "dynamodb",
        }
    }
}

impl FromStr for DatabaseType {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Self::Postgresql),
            "mysql" => Ok(Self::Mysql),
            "mongodb" => Ok(Self::Mongodb),
            "cosmosdb" => Ok(Self::Cosmosdb),
            "dynamodb" => Ok(Self::Dynamodb),
            other => Err(ValidationError::field(
                "database",
                format!("unknown database '{}'", other),
            )
            .into()),
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// Optional structured context attached to a query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryContext {
    /// Monthly budget in USD
    pub budget: Option<f64>,
    /// Providers to target; empty means all supported providers
    pub preferred_providers: Vec<CloudProvider>,
    pub architecture_type: Option<ArchitectureType>,
    /// Free-form extra context forwarded to the prompt
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl QueryContext {
    /// Providers the pipeline should target
    pub fn target_providers(&self) -> Vec<CloudProvider> {
        if self.preferred_providers.is_empty() {
            CloudProvider::ALL.to_vec()
        } else {
            let mut providers = self.preferred_providers.clone();
            providers.sort();
            providers.dedup();
            providers
        }
    }
}

/// A natural-language requirements query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub context: QueryContext,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: QueryContext::default(),
        }
    }

    pub fn with_context(mut self, context: QueryContext) -> Self {
        self.context = context;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::field("query", "query text must not be empty").into());
        }
        if let Some(budget) = self.context.budget
            && (!budget.is_finite() || budget < 0.0)
        {
            return Err(ValidationError::field(
                "budget",
                format!("budget must be a non-negative number, got {}", budget),
            )
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Recommendation
// =============================================================================

/// A single provisioned service in a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudResource {
    /// Functional slot ("frontend_cdn", "primary_database", ...)
    pub resource_type: String,
    /// Provider service name ("Amazon CloudFront", ...)
    pub service_name: String,
    pub provider: CloudProvider,
    /// Estimated monthly cost in USD
    pub monthly_cost: f64,
    pub configuration: serde_json::Value,
}

/// A suggested cloud architecture option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub provider: CloudProvider,
    pub resources: Vec<CloudResource>,
    pub estimated_monthly_cost: f64,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_score: Option<f64>,
}

impl Recommendation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        provider: CloudProvider,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            confidence: clamp_confidence(confidence),
            provider,
            resources: Vec::new(),
            estimated_monthly_cost: 0.0,
            implementation_steps: Vec::new(),
            feedback_score: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.implementation_steps = steps;
        self
    }

    /// Replace resources and recompute the monthly estimate from them
    pub fn with_resources(mut self, resources: Vec<CloudResource>) -> Self {
        self.estimated_monthly_cost = resources
            .iter()
            .filter(|r| r.provider == self.provider)
            .map(|r| r.monthly_cost)
            .sum();
        self.resources = resources;
        self
    }

    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = clamp_confidence(confidence);
    }

    /// Lowercased title + description, used for keyword weighting
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// Recommendations returned by one LLM round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub recommendations: Vec<Recommendation>,
    /// Set when the reply could not be interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationBatch {
    /// Build a batch, enforcing the size bound and assigning `rec-<n>` ids
    pub fn new(mut recommendations: Vec<Recommendation>) -> Self {
        recommendations.truncate(rec_constants::MAX_RECOMMENDATIONS);
        for (idx, rec) in recommendations.iter_mut().enumerate() {
            rec.id = format!("rec-{}", idx + 1);
            rec.set_confidence(rec.confidence);
        }
        Self {
            recommendations,
            error: None,
        }
    }

    /// Empty batch flagged with the reason the reply was rejected
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            recommendations: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Clamp a confidence score into [0, 1]; NaN maps to the neutral default.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        rec_constants::DEFAULT_CONFIDENCE
    } else {
        value.clamp(0.0, 1.0)
    }
}
