//! HTTP API
//!
//! JSON endpoints over the recommendation pipeline, feedback learning and
//! template rendering. Validation failures map to 400, model failures to 502.

use axum::{
    Json, Router,
    extract::{Path, Query as QueryParams, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{Config, FeatureFlags, ServerConfig};
use crate::constants::server::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};
use crate::learning::{FeedbackInput, FeedbackProcessor, FeedbackReceipt, LearningSummary};
use crate::pipeline::{Pipeline, PipelineOutcome, PipelineStage, RunOptions};
use crate::templates::{self, TemplateConfig, TemplateKind, TemplateSet};
use crate::types::{ArchError, Query, QueryContext, Result, SessionId};

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Degraded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub status: SessionStatus,
    pub current_step: PipelineStage,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shared handler state
pub struct AppState {
    pipeline: Pipeline,
    learning: Option<Arc<FeedbackProcessor>>,
    features: FeatureFlags,
    sessions: DashMap<SessionId, SessionRecord>,
    max_sessions: usize,
    session_ttl: Duration,
}

impl AppState {
    pub fn new(
        pipeline: Pipeline,
        learning: Option<Arc<FeedbackProcessor>>,
        features: FeatureFlags,
    ) -> Self {
        let pipeline = match &learning {
            Some(processor) => pipeline.with_learning(processor.clone()),
            None => pipeline,
        };
        Self {
            pipeline,
            learning,
            features,
            sessions: DashMap::new(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Bound the session table by size and age
    pub fn with_session_limits(mut self, max_sessions: usize, ttl: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.session_ttl = ttl;
        self
    }

    /// Wire the pipeline and, when enabled, the feedback log from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline = Pipeline::from_config(config)?;
        let learning = if config.features.learning {
            Some(Arc::new(FeedbackProcessor::open(&config.learning.storage_path)?))
        } else {
            None
        };
        Ok(
            Self::new(pipeline, learning, config.features.clone()).with_session_limits(
                config.server.max_sessions,
                Duration::from_secs(config.server.session_ttl_secs),
            ),
        )
    }

    fn learning(&self) -> std::result::Result<Arc<FeedbackProcessor>, ApiError> {
        self.learning
            .clone()
            .ok_or_else(|| ApiError::disabled("Feedback learning is disabled"))
    }

    /// Store a session update. Expired sessions are dropped first, then the
    /// least recently updated ones until a new id fits.
    fn track(&self, id: SessionId, record: SessionRecord) {
        let cutoff = chrono::Duration::from_std(self.session_ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));
        if let Some(cutoff) = cutoff {
            self.sessions.retain(|_, session| session.updated_at >= cutoff);
        }

        if !self.sessions.contains_key(&id) {
            while self.sessions.len() >= self.max_sessions {
                let oldest = self
                    .sessions
                    .iter()
                    .min_by_key(|entry| entry.value().updated_at)
                    .map(|entry| entry.key().clone());
                match oldest {
                    Some(key) => {
                        self.sessions.remove(&key);
                    }
                    None => break,
                }
            }
        }
        self.sessions.insert(id, record);
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Handler error rendered as `{ "error": ..., "code": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn disabled(message: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "FEATURE_DISABLED",
            message: message.to_string(),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message,
        }
    }
}

impl From<ArchError> for ApiError {
    fn from(err: ArchError) -> Self {
        let (status, code) = match &err {
            ArchError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ArchError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ArchError::Llm(_) | ArchError::LlmApi(_) | ArchError::Timeout { .. } => {
                (StatusCode::BAD_GATEWAY, "LLM_ERROR")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
        } else {
            warn!(code = self.code, error = %self.message, "Request rejected");
        }
        let body = Json(json!({ "error": self.message, "code": self.code }));
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run file-backed work off the async workers
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

// =============================================================================
// Router
// =============================================================================

pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/recommendations", post(recommend))
        .route("/feedback", post(submit_feedback))
        .route("/learning", get(learning_summary))
        .route(
            "/templates/{kind}",
            get(default_template).post(render_template),
        )
        .route("/status/{session_id}", get(session_status))
        .with_state(state);

    let app = if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };
    app.layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ArchError::Config(format!("Invalid server address: {}", e)))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, cors = config.enable_cors, "HTTP server listening");

    axum::serve(listener, router(state, config.enable_cors))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "POST /recommendations",
            "POST /feedback",
            "GET /learning",
            "GET /templates/{kind}",
            "POST /templates/{kind}",
            "GET /status/{session_id}"
        ]
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.pipeline.provider_name(),
        "model": state.pipeline.model(),
        "learning": state.learning.is_some(),
        "templates": state.features.templates,
        "sessions": state.sessions.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    #[serde(default)]
    pub context: QueryContext,
    #[serde(default)]
    pub generate_templates: bool,
    #[serde(default = "default_true")]
    pub allow_fallback: bool,
}

fn default_true() -> bool {
    true
}

async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendationRequest>,
) -> ApiResult<Json<PipelineOutcome>> {
    let query = Query::new(req.query).with_context(req.context);
    query.validate()?;

    let options = RunOptions {
        generate_templates: req.generate_templates && state.features.templates,
        allow_fallback: req.allow_fallback,
    };

    let session_id = SessionId::generate();
    state.track(
        session_id.clone(),
        SessionRecord {
            status: SessionStatus::Running,
            current_step: PipelineStage::Analyze,
            updated_at: Utc::now(),
            error: None,
        },
    );

    match state
        .pipeline
        .run_session(session_id.clone(), query, options)
        .await
    {
        Ok(outcome) => {
            let status = match outcome.status() {
                "completed" => SessionStatus::Completed,
                "degraded" => SessionStatus::Degraded,
                _ => SessionStatus::Failed,
            };
            state.track(
                session_id,
                SessionRecord {
                    status,
                    current_step: outcome.stage,
                    updated_at: outcome.completed_at,
                    error: outcome.errors.first().cloned(),
                },
            );
            Ok(Json(outcome))
        }
        Err(e) => {
            state.track(
                session_id,
                SessionRecord {
                    status: SessionStatus::Failed,
                    current_step: PipelineStage::Done,
                    updated_at: Utc::now(),
                    error: Some(e.to_string()),
                },
            );
            Err(e.into())
        }
    }
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FeedbackInput>,
) -> ApiResult<(StatusCode, Json<FeedbackReceipt>)> {
    let processor = state.learning()?;
    let receipt = blocking(move || processor.submit(input)).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn learning_summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<LearningSummary>> {
    let processor = state.learning()?;
    Ok(Json(blocking(move || processor.summary()).await?))
}

#[derive(Debug, Deserialize)]
pub struct TemplateParams {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
}

async fn default_template(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    QueryParams(params): QueryParams<TemplateParams>,
) -> ApiResult<Json<TemplateSet>> {
    let kind: TemplateKind = kind.parse()?;
    let config = TemplateConfig {
        kind,
        app_name: params.app_name.unwrap_or_else(|| "my-app".to_string()),
        provider: params.provider.unwrap_or_else(|| "aws".to_string()),
        ..Default::default()
    };
    render(&state, config)
}

async fn render_template(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(mut config): Json<TemplateConfig>,
) -> ApiResult<Json<TemplateSet>> {
    config.kind = kind.parse()?;
    render(&state, config)
}

fn render(state: &AppState, config: TemplateConfig) -> ApiResult<Json<TemplateSet>> {
    if !state.features.templates {
        return Err(ApiError::disabled("Template generation is disabled"));
    }
    Ok(Json(templates::generate(&config)?))
}

async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = SessionId::new(session_id);
    let record = state
        .sessions
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ArchError::SessionNotFound(id.to_string()))?;

    Ok(Json(json!({
        "session_id": id,
        "status": record.status,
        "current_step": record.current_step,
        "timestamp": record.updated_at,
        "error": record.error,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::tests::{ScriptedProvider, client_for};
    use crate::cloud::CloudCatalog;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn state_with(replies: Vec<Result<Value>>, learning: Option<Arc<FeedbackProcessor>>) -> Arc<AppState> {
        let pipeline = Pipeline::new(client_for(ScriptedProvider::new(replies)), CloudCatalog::default());
        Arc::new(AppState::new(pipeline, learning, FeatureFlags::default()))
    }

    fn learning(dir: &TempDir) -> Option<Arc<FeedbackProcessor>> {
        Some(Arc::new(
            FeedbackProcessor::open(dir.path().join("feedback.json")).unwrap(),
        ))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn replies() -> Vec<Result<Value>> {
        vec![
            Ok(json!({"application_type": "web_application", "complexity": "low", "keywords": [], "summary": "blog"})),
            Ok(json!({"recommendations": [
                {"title": "Static site", "provider": "aws", "confidence": 0.8}
            ]})),
        ]
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let state = state_with(vec![], None);
        let (status, body) = send(router(state.clone(), false), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "archwright");

        let (status, body) = send(router(state, false), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"], "scripted");
    }

    #[tokio::test]
    async fn test_recommendations_and_status() {
        let state = state_with(replies(), None);
        let (status, body) = send(
            router(state.clone(), true),
            "POST",
            "/recommendations",
            Some(json!({"query": "A personal blog", "context": {"preferred_providers": ["aws"]}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected"]["provider"], "aws");
        let session = body["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(router(state, true), "GET", &format!("/status/{}", session), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["current_step"], "done");
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let state = state_with(vec![], None);
        let (status, body) = send(
            router(state, false),
            "POST",
            "/recommendations",
            Some(json!({"query": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_llm_failure_without_fallback_is_bad_gateway() {
        let state = state_with(
            vec![
                Ok(json!({"keywords": []})),
                Ok(json!("garbage")),
                Ok(json!("garbage")),
            ],
            None,
        );
        let (status, body) = send(
            router(state, false),
            "POST",
            "/recommendations",
            Some(json!({"query": "A blog", "allow_fallback": false})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_feedback_and_learning() {
        let dir = TempDir::new().unwrap();
        let state = state_with(vec![], learning(&dir));

        let (status, body) = send(
            router(state.clone(), false),
            "POST",
            "/feedback",
            Some(json!({"recommendation_id": "rec-1", "rating": 5, "text": "cost effective", "provider": "azure"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sentiment"], "positive");
        assert_eq!(body["total_entries"], 1);
        assert_eq!(body["insights_generated"], 2);

        let (status, body) = send(
            router(state.clone(), false),
            "POST",
            "/feedback",
            Some(json!({"recommendation_id": "rec-1", "rating": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(router(state, false), "GET", "/learning", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["positive_aspects"][0], "cost-effective");
        assert_eq!(body["insights"][0]["category"], "cost_optimization");
    }

    #[tokio::test]
    async fn test_feedback_disabled() {
        let state = state_with(vec![], None);
        let (status, _) = send(router(state, false), "GET", "/learning", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_templates() {
        let state = state_with(vec![], None);
        let (status, body) = send(
            router(state.clone(), false),
            "GET",
            "/templates/react?provider=azure&app_name=shop",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("src/services/auth.ts").is_some());

        let (status, body) = send(
            router(state.clone(), false),
            "POST",
            "/templates/java",
            Some(json!({"app_name": "orders", "provider": "aws", "cache": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("pom.xml").is_some());
        assert!(
            body.as_object()
                .unwrap()
                .keys()
                .all(|k| !k.ends_with("CacheConfig.java"))
        );

        let (status, _) = send(
            router(state, false),
            "POST",
            "/templates/java",
            Some(json!({"app_name": "orders", "provider": "gcp"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_table_is_bounded() {
        let pipeline = Pipeline::new(client_for(ScriptedProvider::new(vec![])), CloudCatalog::default());
        let state = Arc::new(
            AppState::new(pipeline, None, FeatureFlags::default())
                .with_session_limits(2, Duration::from_secs(3600)),
        );

        let mut sessions = Vec::new();
        for _ in 0..3 {
            let (status, body) = send(
                router(state.clone(), false),
                "POST",
                "/recommendations",
                Some(json!({"query": "A personal blog"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            sessions.push(body["session_id"].as_str().unwrap().to_string());
        }

        assert_eq!(state.sessions.len(), 2);
        let (status, _) = send(router(state.clone(), false), "GET", &format!("/status/{}", sessions[0]), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(router(state, false), "GET", &format!("/status/{}", sessions[2]), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expired_sessions_dropped() {
        let state = state_with(vec![], None);
        state.sessions.insert(
            SessionId::new("stale"),
            SessionRecord {
                status: SessionStatus::Completed,
                current_step: PipelineStage::Done,
                updated_at: Utc::now() - chrono::Duration::hours(2),
                error: None,
            },
        );

        let (status, _) = send(
            router(state.clone(), false),
            "POST",
            "/recommendations",
            Some(json!({"query": "A personal blog"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(router(state.clone(), false), "GET", "/status/stale", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let state = state_with(vec![], None);
        let (status, body) = send(router(state, false), "GET", "/status/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
