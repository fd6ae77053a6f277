//! Recommendation Pipeline
//!
//! Linear orchestration of one request:
//! `Analyze → Recommend → Select → Template → Done`.
//!
//! Each stage records problems instead of aborting when fallback is allowed,
//! so a run always ends with an outcome describing what was produced and
//! what went wrong along the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::ai::{ArchitectClient, ProviderConfig, create_provider};
use crate::cloud::CloudCatalog;
use crate::config::Config;
use crate::constants::recommendation::FALLBACK_CONFIDENCE;
use crate::learning::FeedbackProcessor;
use crate::templates::{self, TemplateConfig, TemplateKind, TemplateSet};
use crate::types::{
    ArchError, CloudProvider, Query, Recommendation, RecommendationBatch, Requirement,
    RequirementAnalysis, RequirementSet, Result, SessionId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Analyze,
    Recommend,
    Select,
    Template,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Recommend => "recommend",
            Self::Select => "select",
            Self::Template => "template",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Render React and Java templates for the selected recommendation
    pub generate_templates: bool,
    /// Degrade to keyword analysis and catalog-only recommendations when the
    /// model fails, instead of returning the error
    pub allow_fallback: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            generate_templates: false,
            allow_fallback: true,
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub session_id: SessionId,
    pub stage: PipelineStage,
    pub analysis: RequirementAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub selected: Option<Recommendation>,
    /// Template kind → rendered files
    pub templates: BTreeMap<String, TemplateSet>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl PipelineOutcome {
    pub fn status(&self) -> &'static str {
        if self.selected.is_none() {
            "failed"
        } else if self.errors.is_empty() {
            "completed"
        } else {
            "degraded"
        }
    }
}

/// Runs queries through analysis, recommendation, selection and templating
#[derive(Clone)]
pub struct Pipeline {
    client: ArchitectClient,
    catalog: CloudCatalog,
    learning: Option<Arc<FeedbackProcessor>>,
}

impl Pipeline {
    pub fn new(client: ArchitectClient, catalog: CloudCatalog) -> Self {
        Self {
            client,
            catalog,
            learning: None,
        }
    }

    /// Build the LLM provider and catalog from configuration.
    ///
    /// Fails with `ArchError::Config` when the provider is unknown or its API
    /// key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&ProviderConfig::from(&config.llm))?;
        let client = ArchitectClient::new(provider, Duration::from_secs(config.llm.timeout_secs));
        Ok(Self::new(client, CloudCatalog::new(&config.cloud)))
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Re-rank recommendations with learned feedback weights
    pub fn with_learning(mut self, learning: Arc<FeedbackProcessor>) -> Self {
        self.learning = Some(learning);
        self
    }

    pub async fn run(&self, query: Query, options: RunOptions) -> Result<PipelineOutcome> {
        self.run_session(SessionId::generate(), query, options).await
    }

    pub async fn run_session(
        &self,
        session_id: SessionId,
        query: Query,
        options: RunOptions,
    ) -> Result<PipelineOutcome> {
        query.validate()?;
        let start = Instant::now();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        info!(session = %session_id, provider = self.client.provider_name(), "Pipeline started");

        // Analyze
        let analysis = match self.client.analyze(&query).await {
            Ok(analysis) => analysis,
            Err(e) if options.allow_fallback && !matches!(e, ArchError::Validation(_)) => {
                warn!(session = %session_id, error = %e, "Analysis failed, using keyword extraction");
                errors.push(format!("analysis: {}", e));
                RequirementAnalysis::from_query_text(&query.text)
            }
            Err(e) => return Err(e),
        };
        let requirements = analysis.requirements();
        debug!(session = %session_id, requirements = requirements.len(), "Requirements resolved");

        // Recommend
        let targets = query.context.target_providers();
        let batch = match self.client.recommend(&query, &analysis).await {
            Ok(batch) => batch,
            Err(e) if options.allow_fallback => {
                warn!(session = %session_id, error = %e, "Recommendation request failed");
                RecommendationBatch::failed(e.to_string())
            }
            Err(e) => return Err(e),
        };

        let mut recommendations = match batch.error {
            Some(reason) if batch.recommendations.is_empty() => {
                if !options.allow_fallback {
                    return Err(ArchError::LlmApi(reason));
                }
                errors.push(format!("recommendation: {}", reason));
                warnings.push("Language model recommendations unavailable; showing catalog baseline".to_string());
                self.fallback_recommendations(&targets, &requirements)
            }
            Some(reason) => {
                errors.push(format!("recommendation: {}", reason));
                self.attach_resources(batch.recommendations, &requirements)
            }
            None => self.attach_resources(batch.recommendations, &requirements),
        };

        if let Some(learning) = &self.learning
            && let Err(e) = learning.rank(&mut recommendations)
        {
            warn!(session = %session_id, error = %e, "Learned ranking skipped");
            warnings.push(format!("ranking: {}", e));
        }

        // Select
        let selected = select(&recommendations, query.context.budget, &mut warnings);

        // Template
        let mut templates = BTreeMap::new();
        if options.generate_templates
            && let Some(chosen) = &selected
        {
            for kind in TemplateKind::ALL {
                let config = template_config(&analysis, &requirements, chosen.provider, kind);
                match templates::generate(&config) {
                    Ok(set) => {
                        templates.insert(kind.as_str().to_string(), set);
                    }
                    Err(e) => {
                        warn!(session = %session_id, kind = %kind, error = %e, "Template generation failed");
                        errors.push(format!("template {}: {}", kind, e));
                    }
                }
            }
        }

        let outcome = PipelineOutcome {
            session_id,
            stage: PipelineStage::Done,
            analysis,
            recommendations,
            selected,
            templates,
            errors,
            warnings,
            elapsed_ms: start.elapsed().as_millis() as u64,
            completed_at: Utc::now(),
        };

        info!(
            session = %outcome.session_id,
            status = outcome.status(),
            recommendations = outcome.recommendations.len(),
            errors = outcome.errors.len(),
            elapsed_ms = outcome.elapsed_ms,
            "Pipeline finished"
        );
        Ok(outcome)
    }

    fn attach_resources(
        &self,
        recommendations: Vec<Recommendation>,
        requirements: &RequirementSet,
    ) -> Vec<Recommendation> {
        recommendations
            .into_iter()
            .map(|rec| {
                let resources = self.catalog.resources_for(rec.provider, requirements);
                rec.with_resources(resources)
            })
            .collect()
    }

    /// One catalog-only recommendation per target provider
    fn fallback_recommendations(
        &self,
        targets: &[CloudProvider],
        requirements: &RequirementSet,
    ) -> Vec<Recommendation> {
        let covered: Vec<&str> = requirements.iter().map(|r| r.as_str()).collect();
        let recommendations = targets
            .iter()
            .map(|provider| {
                Recommendation::new(
                    "fallback",
                    format!("{} baseline architecture", provider.display_name()),
                    *provider,
                    FALLBACK_CONFIDENCE,
                )
                .with_description(format!(
                    "Managed {} services covering {}. Built from the service catalog without model input.",
                    provider.display_name(),
                    covered.join(", ")
                ))
                .with_resources(self.catalog.resources_for(*provider, requirements))
            })
            .collect();
        RecommendationBatch::new(recommendations).recommendations
    }
}

/// Highest confidence wins; with a budget, the best affordable option wins
/// and an over-budget pick is only made when nothing fits.
fn select(
    recommendations: &[Recommendation],
    budget: Option<f64>,
    warnings: &mut Vec<String>,
) -> Option<Recommendation> {
    let Some(overall) = most_confident(recommendations.iter()) else {
        warnings.push("No recommendations generated".to_string());
        return None;
    };

    let Some(budget) = budget else {
        return Some(overall.clone());
    };

    let affordable = recommendations
        .iter()
        .filter(|r| r.estimated_monthly_cost <= budget);
    match most_confident(affordable) {
        Some(affordable) => Some(affordable.clone()),
        None => {
            warnings.push(format!(
                "No recommendation fits the ${:.2}/month budget; '{}' is estimated at ${:.2}/month",
                budget, overall.title, overall.estimated_monthly_cost
            ));
            Some(overall.clone())
        }
    }
}

/// First recommendation with the highest confidence
fn most_confident<'a>(
    candidates: impl Iterator<Item = &'a Recommendation>,
) -> Option<&'a Recommendation> {
    candidates.fold(None, |best, rec| match best {
        Some(current) if current.confidence >= rec.confidence => Some(current),
        _ => Some(rec),
    })
}

fn template_config(
    analysis: &RequirementAnalysis,
    requirements: &RequirementSet,
    provider: CloudProvider,
    kind: TemplateKind,
) -> TemplateConfig {
    let mut config = TemplateConfig::new(
        analysis.application_type.replace('_', "-"),
        provider.as_str(),
        kind,
    );
    let auth = requirements.contains(Requirement::Authentication);
    config.authentication = auth;
    config.security = auth;
    config.cache = requirements.contains(Requirement::Cache);
    config.monitoring = requirements.contains(Requirement::Monitoring);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::tests::{ScriptedProvider, client_for};
    use crate::learning::FeedbackInput;
    use crate::types::{ErrorCategory, LlmError, QueryContext};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn analysis_reply(keywords: &[&str]) -> Result<serde_json::Value> {
        Ok(json!({
            "application_type": "e_commerce",
            "complexity": "medium",
            "keywords": keywords,
            "summary": "An online shop"
        }))
    }

    fn recommendations_reply() -> Result<serde_json::Value> {
        Ok(json!({
            "recommendations": [
                {"title": "Fargate stack", "description": "Containers", "provider": "aws", "confidence": 0.6},
                {"title": "Container Apps", "description": "Managed containers", "provider": "azure", "confidence": 0.9}
            ]
        }))
    }

    fn pipeline(provider: Arc<ScriptedProvider>) -> Pipeline {
        Pipeline::new(client_for(provider), CloudCatalog::default())
    }

    #[tokio::test]
    async fn test_happy_path() {
        let provider = ScriptedProvider::new(vec![
            analysis_reply(&["redis"]),
            recommendations_reply(),
        ]);
        let outcome = pipeline(provider.clone())
            .run(
                Query::new("An online shop with a redis cache"),
                RunOptions {
                    generate_templates: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.stage, PipelineStage::Done);
        assert_eq!(outcome.status(), "completed");
        assert_eq!(outcome.recommendations.len(), 2);
        assert_eq!(outcome.recommendations[0].id, "rec-1");

        let selected = outcome.selected.as_ref().unwrap();
        assert_eq!(selected.provider, CloudProvider::Azure);
        assert!(selected.resources.iter().any(|r| r.resource_type == "cache_database"));
        assert!(selected.estimated_monthly_cost > 0.0);

        assert_eq!(outcome.templates.len(), 2);
        assert!(outcome.templates["react"].contains_key("src/services/auth.ts"));
        assert!(
            outcome.templates["java"]
                .keys()
                .any(|k| k.ends_with("config/CacheConfig.java"))
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_replies_fall_back_to_catalog() {
        let provider = ScriptedProvider::new(vec![
            analysis_reply(&[]),
            Ok(json!("not recommendations")),
            Ok(json!({"recommendations": "still wrong"})),
        ]);
        let outcome = pipeline(provider)
            .run(Query::new("A blog"), RunOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.recommendations.len(), 2);
        for rec in &outcome.recommendations {
            assert_eq!(rec.confidence, FALLBACK_CONFIDENCE);
            assert!(!rec.resources.is_empty());
        }
        assert_eq!(outcome.status(), "degraded");
        assert!(outcome.errors[0].starts_with("recommendation:"));
    }

    #[tokio::test]
    async fn test_no_fallback_returns_error() {
        let provider = ScriptedProvider::new(vec![
            analysis_reply(&[]),
            Ok(json!([1, 2])),
            Ok(json!([3])),
        ]);
        let result = pipeline(provider)
            .run(
                Query::new("A blog"),
                RunOptions {
                    allow_fallback: false,
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ArchError::LlmApi(_))));
    }

    #[tokio::test]
    async fn test_analysis_network_failure_uses_keywords() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::new(ErrorCategory::Network, "connection reset").into()),
            recommendations_reply(),
        ]);
        let outcome = pipeline(provider)
            .run(Query::new("Shop with redis cache"), RunOptions::default())
            .await
            .unwrap();

        assert_eq!(
            outcome.analysis.source,
            crate::types::AnalysisSource::KeywordFallback
        );
        assert!(outcome.errors[0].starts_with("analysis:"));
        assert!(outcome.selected.is_some());
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_llm() {
        let provider = ScriptedProvider::new(vec![]);
        let result = pipeline(provider.clone())
            .run(Query::new("   "), RunOptions::default())
            .await;
        assert!(matches!(result, Err(ArchError::Validation(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_budget_prefers_affordable() {
        // Baseline estimates: AWS 165, Azure 180
        let provider = ScriptedProvider::new(vec![analysis_reply(&[]), recommendations_reply()]);
        let query = Query::new("A shop").with_context(QueryContext {
            budget: Some(170.0),
            ..Default::default()
        });
        let outcome = pipeline(provider).run(query, RunOptions::default()).await.unwrap();

        let selected = outcome.selected.unwrap();
        assert_eq!(selected.provider, CloudProvider::Aws);
        assert!((selected.estimated_monthly_cost - 165.0).abs() < 1e-9);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_budget_too_small_warns() {
        let provider = ScriptedProvider::new(vec![analysis_reply(&[]), recommendations_reply()]);
        let query = Query::new("A shop").with_context(QueryContext {
            budget: Some(50.0),
            ..Default::default()
        });
        let outcome = pipeline(provider).run(query, RunOptions::default()).await.unwrap();

        assert_eq!(outcome.selected.unwrap().provider, CloudProvider::Azure);
        assert!(outcome.warnings.iter().any(|w| w.contains("budget")));
    }

    #[tokio::test]
    async fn test_empty_batch_warns() {
        let provider = ScriptedProvider::new(vec![
            analysis_reply(&[]),
            Ok(json!({"recommendations": []})),
        ]);
        let outcome = pipeline(provider)
            .run(Query::new("A shop"), RunOptions::default())
            .await
            .unwrap();

        assert!(outcome.selected.is_none());
        assert_eq!(outcome.status(), "failed");
        assert!(outcome.warnings.contains(&"No recommendations generated".to_string()));
    }

    #[tokio::test]
    async fn test_learning_reorders() {
        let dir = TempDir::new().unwrap();
        let learning = Arc::new(FeedbackProcessor::open(dir.path().join("fb.json")).unwrap());
        learning
            .submit(FeedbackInput::new("rec-1", 1.0).with_provider(CloudProvider::Azure))
            .unwrap();
        learning
            .submit(FeedbackInput::new("rec-2", 5.0).with_provider(CloudProvider::Aws))
            .unwrap();

        let provider = ScriptedProvider::new(vec![
            analysis_reply(&[]),
            Ok(json!([
                {"title": "Fargate stack", "provider": "aws", "confidence": 0.7},
                {"title": "Container Apps", "provider": "azure", "confidence": 0.75}
            ])),
        ]);
        let outcome = pipeline(provider)
            .with_learning(learning)
            .run(Query::new("A shop"), RunOptions::default())
            .await
            .unwrap();

        // 0.7 * 1.2 = 0.84 beats 0.75 * 0.8 = 0.6
        assert_eq!(outcome.recommendations[0].provider, CloudProvider::Aws);
        assert_eq!(outcome.selected.unwrap().provider, CloudProvider::Aws);
    }

    #[test]
    fn test_select_keeps_first_on_tie() {
        let recs = vec![
            Recommendation::new("rec-1", "A", CloudProvider::Aws, 0.7),
            Recommendation::new("rec-2", "B", CloudProvider::Azure, 0.7),
        ];
        let mut warnings = Vec::new();
        assert_eq!(select(&recs, None, &mut warnings).unwrap().id, "rec-1");
        assert!(warnings.is_empty());
    }
}
