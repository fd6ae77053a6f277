//! Architecture Client
//!
//! High-level LLM operations: requirement analysis and recommendation
//! generation. Owns the malformed-reply policy: a reply that cannot be
//! interpreted is asked for once more, after which analysis falls back to
//! keyword extraction and recommendations degrade to an empty, flagged batch.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompt::{
    REASK_NOTICE, analysis_prompt, analysis_schema, recommendation_prompt, recommendation_schema,
};
use super::provider::SharedProvider;
use super::timeout::with_timeout;
use crate::constants::{llm as llm_constants, recommendation as rec_constants};
use crate::types::{
    AnalysisSource, ArchError, CloudProvider, Query, Recommendation, RecommendationBatch,
    RequirementAnalysis, Result,
};

/// LLM client for architecture analysis and recommendations
#[derive(Clone)]
pub struct ArchitectClient {
    provider: SharedProvider,
    timeout: Duration,
}

impl ArchitectClient {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.provider.health_check().await
    }

    /// Analyze a requirements query.
    ///
    /// Malformed replies fall back to keyword extraction; transport and auth
    /// failures are returned to the caller.
    pub async fn analyze(&self, query: &Query) -> Result<RequirementAnalysis> {
        query.validate()?;
        let prompt = analysis_prompt(query);

        match self
            .ask(&prompt, &analysis_schema(), "requirement analysis", parse_analysis)
            .await
        {
            Ok(analysis) => {
                info!(
                    application_type = %analysis.application_type,
                    keywords = analysis.keywords.len(),
                    "Requirements analyzed"
                );
                Ok(analysis)
            }
            Err(e) if e.is_malformed_reply() => {
                warn!(error = %e, "Analysis reply unusable, falling back to keyword extraction");
                Ok(RequirementAnalysis::from_query_text(&query.text))
            }
            Err(e) => Err(e),
        }
    }

    /// Generate recommendations for an analyzed query.
    ///
    /// Never fails on a malformed reply: the batch comes back empty with
    /// `error` set instead.
    pub async fn recommend(
        &self,
        query: &Query,
        analysis: &RequirementAnalysis,
    ) -> Result<RecommendationBatch> {
        let prompt = recommendation_prompt(query, analysis);
        let targets = query.context.target_providers();

        let result = self
            .ask(
                &prompt,
                &recommendation_schema(),
                "recommendation request",
                |content| parse_recommendations(content, &targets),
            )
            .await;

        match result {
            Ok(recommendations) => {
                let batch = RecommendationBatch::new(recommendations);
                info!(count = batch.recommendations.len(), "Recommendations generated");
                Ok(batch)
            }
            Err(e) if e.is_malformed_reply() => {
                warn!(error = %e, "Recommendation reply unusable after re-ask");
                Ok(RecommendationBatch::failed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Send a prompt and interpret the reply, re-asking once on a malformed reply
    async fn ask<T, F>(&self, prompt: &str, schema: &Value, operation: &str, parse: F) -> Result<T>
    where
        F: Fn(&Value) -> Result<T>,
    {
        let mut reasks = 0;
        let mut current = prompt.to_string();

        loop {
            let result = with_timeout(
                self.timeout,
                self.provider.generate(&current, schema),
                operation,
            )
            .await
            .and_then(|response| {
                debug!(
                    tokens = response.usage.total(),
                    elapsed_ms = response.timing.total_ms,
                    "{} reply received",
                    operation
                );
                parse(&response.content)
            });

            match result {
                Err(e)
                    if e.is_malformed_reply()
                        && reasks < llm_constants::MALFORMED_REPLY_RETRIES =>
                {
                    reasks += 1;
                    warn!(operation, error = %e, "Malformed reply, asking again");
                    current = format!("{}\n\n{}", prompt, REASK_NOTICE);
                }
                other => return other,
            }
        }
    }
}

// =============================================================================
// Reply Parsing
// =============================================================================

fn parse_analysis(content: &Value) -> Result<RequirementAnalysis> {
    if !content.is_object() {
        return Err(ArchError::LlmApi(
            "Analysis reply is not a JSON object".to_string(),
        ));
    }
    if content.get("keywords").is_some_and(|k| !k.is_array()) {
        return Err(ArchError::LlmApi(
            "Analysis reply field 'keywords' is not an array".to_string(),
        ));
    }
    let mut analysis: RequirementAnalysis = serde_json::from_value(content.clone())?;
    analysis.source = AnalysisSource::Llm;
    analysis.complexity = analysis.complexity.to_lowercase();
    Ok(analysis)
}

/// Interpret a recommendation reply.
///
/// Accepts `{"recommendations": [...]}` or a bare array. Items with an unknown
/// provider or outside `targets` are dropped; a non-empty reply with no usable
/// item is malformed.
fn parse_recommendations(content: &Value, targets: &[CloudProvider]) -> Result<Vec<Recommendation>> {
    let items = content
        .get("recommendations")
        .unwrap_or(content)
        .as_array()
        .ok_or_else(|| {
            ArchError::LlmApi("Reply has no 'recommendations' array".to_string())
        })?;

    let mut recommendations = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match parse_recommendation(item, targets) {
            Some(rec) => recommendations.push(rec),
            None => warn!(index = idx, "Dropping unusable recommendation item"),
        }
    }

    if recommendations.is_empty() && !items.is_empty() {
        return Err(ArchError::LlmApi(format!(
            "None of the {} recommendation items were usable",
            items.len()
        )));
    }

    recommendations.truncate(rec_constants::MAX_RECOMMENDATIONS);
    Ok(recommendations)
}

fn parse_recommendation(item: &Value, targets: &[CloudProvider]) -> Option<Recommendation> {
    let title = item.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }

    let provider = match item.get("provider").and_then(Value::as_str) {
        Some(raw) => raw.parse::<CloudProvider>().ok()?,
        None => *targets.first()?,
    };
    if !targets.contains(&provider) {
        return None;
    }

    let confidence = item
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(rec_constants::DEFAULT_CONFIDENCE);

    let description = item
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let steps = item
        .get("implementation_steps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    // Ids are reassigned when the batch is built
    Some(
        Recommendation::new("pending", title, provider, confidence)
            .with_description(description)
            .with_steps(steps),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse};
    use crate::types::{ErrorCategory, LlmError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that replays a fixed script of replies
    pub(crate) struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<Value>>>,
        pub(crate) calls: AtomicU32,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(replies: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ArchError::LlmApi("script exhausted".into())));
            next.map(LlmResponse::content_only)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    pub(crate) fn client_for(provider: Arc<ScriptedProvider>) -> ArchitectClient {
        ArchitectClient::new(provider, Duration::from_secs(5))
    }

    fn malformed() -> Result<Value> {
        Err(ArchError::LlmApi("not json".into()))
    }

    #[tokio::test]
    async fn test_analyze_parses_reply() {
        let provider = ScriptedProvider::new(vec![Ok(json!({
            "application_type": "e_commerce",
            "complexity": "High",
            "keywords": ["react", "redis"],
            "summary": "A shop"
        }))]);
        let client = client_for(provider.clone());

        let analysis = client.analyze(&Query::new("shop")).await.unwrap();
        assert_eq!(analysis.application_type, "e_commerce");
        assert_eq!(analysis.complexity, "high");
        assert_eq!(analysis.source, AnalysisSource::Llm);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_after_one_reask() {
        let provider = ScriptedProvider::new(vec![malformed(), Ok(json!("just a string"))]);
        let client = client_for(provider.clone());

        let analysis = client
            .analyze(&Query::new("Online store with login and redis"))
            .await
            .unwrap();
        assert_eq!(analysis.source, AnalysisSource::KeywordFallback);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[1].ends_with(REASK_NOTICE));
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_query() {
        let provider = ScriptedProvider::new(vec![]);
        let client = client_for(provider.clone());
        assert!(matches!(
            client.analyze(&Query::new("  ")).await,
            Err(ArchError::Validation(_))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recommend_clamps_and_bounds() {
        let items: Vec<Value> = (0..7)
            .map(|i| json!({"title": format!("Option {}", i), "provider": "aws", "confidence": 1.4}))
            .collect();
        let provider = ScriptedProvider::new(vec![Ok(json!({ "recommendations": items }))]);
        let client = client_for(provider);
        let analysis = RequirementAnalysis::from_query_text("api");

        let batch = client.recommend(&Query::new("api"), &analysis).await.unwrap();
        assert!(!batch.is_error());
        assert_eq!(batch.recommendations.len(), rec_constants::MAX_RECOMMENDATIONS);
        assert!(batch.recommendations.iter().all(|r| r.confidence <= 1.0));
        assert_eq!(batch.recommendations[0].id, "rec-1");
    }

    #[tokio::test]
    async fn test_recommend_malformed_twice_yields_flagged_batch() {
        let provider = ScriptedProvider::new(vec![
            Ok(json!({"recommendations": "nope"})),
            Ok(json!({"recommendations": [{"title": "X", "provider": "gcp"}]})),
        ]);
        let client = client_for(provider.clone());
        let analysis = RequirementAnalysis::from_query_text("api");

        let batch = client.recommend(&Query::new("api"), &analysis).await.unwrap();
        assert!(batch.is_empty());
        assert!(batch.is_error());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_recommend_recovers_on_reask() {
        let provider = ScriptedProvider::new(vec![
            malformed(),
            Ok(json!([{"title": "Serverless", "provider": "azure", "confidence": 0.9}])),
        ]);
        let client = client_for(provider);
        let analysis = RequirementAnalysis::from_query_text("api");

        let batch = client.recommend(&Query::new("api"), &analysis).await.unwrap();
        assert_eq!(batch.recommendations.len(), 1);
        assert_eq!(batch.recommendations[0].provider, CloudProvider::Azure);
    }

    #[tokio::test]
    async fn test_recommend_propagates_auth_error() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::new(
            ErrorCategory::Auth,
            "bad key",
        )
        .into())]);
        let client = client_for(provider.clone());
        let analysis = RequirementAnalysis::from_query_text("api");

        let result = client.recommend(&Query::new("api"), &analysis).await;
        assert!(matches!(result, Err(ArchError::Llm(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_items_outside_targets_dropped() {
        let content = json!({"recommendations": [
            {"title": "A", "provider": "aws"},
            {"title": "B", "provider": "azure"},
            {"title": "", "provider": "azure"}
        ]});
        let recs = parse_recommendations(&content, &[CloudProvider::Azure]).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "B");
        assert_eq!(recs[0].confidence, rec_constants::DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_empty_list_is_not_malformed() {
        let recs = parse_recommendations(&json!({"recommendations": []}), &[CloudProvider::Aws]);
        assert!(recs.unwrap().is_empty());
    }
}
