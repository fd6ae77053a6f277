//! Archwright - LLM-Driven Cloud Architecture Recommendations
//!
//! Turns a natural-language requirements description into ranked AWS and
//! Azure architecture options with cost estimates, renders starter projects
//! for the chosen option, and re-ranks future results from user feedback.
//!
//! ## Core Features
//!
//! - **Recommendation Pipeline**: analyze → recommend → select → template
//! - **Providers**: Gemini and OpenAI over REST with retry and timeouts
//! - **Service Catalogs**: static AWS/Azure tables with monthly costs
//! - **Templates**: React frontends and Spring Boot services
//! - **Feedback Learning**: persisted ratings drive preference weights
//!
//! ## Quick Start
//!
//! ```ignore
//! use archwright::{ConfigLoader, Pipeline, Query, RunOptions};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let outcome = pipeline
//!     .run(Query::new("online shop with user login"), RunOptions::default())
//!     .await?;
//! println!("{:?}", outcome.selected);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, prompts, reply parsing
//! - [`cloud`]: provider service catalogs and cost estimation
//! - [`templates`]: starter-code rendering
//! - [`learning`]: feedback log and learned ranking
//! - [`pipeline`]: end-to-end orchestration
//! - [`server`]: HTTP API

pub mod ai;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod constants;
pub mod learning;
pub mod pipeline;
pub mod server;
pub mod templates;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ArchError, ErrorCategory, Result, ResultExt, ValidationError};

// Domain
pub use types::{
    CloudProvider, CloudResource, Query, QueryContext, Recommendation, RequirementAnalysis,
    RequirementSet, SessionId,
};

// =============================================================================
// Service Re-exports
// =============================================================================

pub use ai::{ArchitectClient, LlmProvider, LlmResponse, create_provider, with_timeout};
pub use cloud::{CloudCatalog, estimate_total_cost, monthly_cost};
pub use learning::{FeedbackInput, FeedbackProcessor, LearningSummary};
pub use pipeline::{Pipeline, PipelineOutcome, RunOptions};
pub use templates::{TemplateConfig, TemplateKind, TemplateSet};
