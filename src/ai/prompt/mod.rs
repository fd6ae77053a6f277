//! Prompt Builder System
//!
//! Standardized prompt construction for LLM interactions.
//! Every prompt follows the same layout: role, numbered objectives, context,
//! free-text sections, then focus restrictions.

use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::constants::recommendation::MAX_RECOMMENDATIONS;
use crate::types::{CloudProvider, Query, RequirementAnalysis};

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Context with key-value pairs (rendered in key order)
    Context(BTreeMap<String, String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, merging into the existing context section
    pub fn context_item(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        for section in &mut self.sections {
            if let PromptSection::Context(ctx) = section {
                ctx.insert(key.to_string(), value);
                return self;
            }
        }
        let mut ctx = BTreeMap::new();
        ctx.insert(key.to_string(), value);
        self.sections.push(PromptSection::Context(ctx));
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add text section without header
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus(mut self, target: &str, restrictions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(ctx) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in ctx {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Architecture Prompts
// =============================================================================

/// Appended when the previous reply could not be parsed
pub const REASK_NOTICE: &str = "Your previous reply could not be parsed. Reply with a single JSON object that matches the schema exactly. Do not add prose or code fences.";

fn add_query_context(mut builder: PromptBuilder, query: &Query) -> PromptBuilder {
    let ctx = &query.context;
    if let Some(budget) = ctx.budget {
        builder = builder.context_item("Monthly budget (USD)", format!("{:.2}", budget));
    }
    let providers: Vec<&str> = ctx.target_providers().iter().map(|p| p.display_name()).collect();
    builder = builder.context_item("Target providers", providers.join(", "));
    if let Some(arch) = ctx.architecture_type {
        builder = builder.context_item("Architecture type", arch.as_str());
    }
    for (key, value) in &ctx.extra {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        builder = builder.context_item(key, rendered);
    }
    builder
}

/// Prompt asking the model to analyze a requirements query
pub fn analysis_prompt(query: &Query) -> String {
    let builder = PromptBuilder::new()
        .role(
            "cloud architect",
            "AWS and Azure services for React frontends and Java microservice backends",
        )
        .objectives(vec![
            "Classify the application type and its complexity (low, medium, high)",
            "Extract infrastructure keywords such as frontend, backend, database, cache, storage, authentication, monitoring, logging, api gateway",
            "Summarize scalability, performance, security and budget needs in two sentences",
        ]);
    add_query_context(builder, query)
        .section("User Query", &query.text)
        .focus(
            "requirements analysis",
            vec![
                "Do not propose concrete services yet",
                "Only list keywords that the query supports",
            ],
        )
        .build()
}

/// Prompt asking the model for architecture recommendations
pub fn recommendation_prompt(query: &Query, analysis: &RequirementAnalysis) -> String {
    let providers = query.context.target_providers();
    let provider_names: Vec<&str> = providers.iter().map(CloudProvider::as_str).collect();
    let provider_rule = format!("Use only these provider values: {}", provider_names.join(", "));
    let limit_rule = format!("Return at most {} recommendations", MAX_RECOMMENDATIONS);

    let builder = PromptBuilder::new()
        .role(
            "cloud solutions architect",
            "cost-aware AWS and Azure architectures",
        )
        .objectives(vec![
            "Propose 2-3 alternative architectures that satisfy the requirements",
            "Give each a short title, a description that mentions its cost, performance, scalability and security trade-offs, and ordered implementation steps",
            "Assign each a confidence between 0 and 1",
        ]);

    add_query_context(builder, query)
        .context_item("Application type", analysis.application_type.clone())
        .context_item("Complexity", analysis.complexity.clone())
        .context_item("Keywords", analysis.keywords.join(", "))
        .section("User Query", &query.text)
        .section("Requirements Summary", &analysis.summary)
        .focus(
            "architecture options",
            vec![
                provider_rule.as_str(),
                limit_rule.as_str(),
                "Do not invent prices; costs are filled in from a service catalog",
            ],
        )
        .build()
}

/// JSON schema for requirement analysis replies
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "required": ["application_type", "complexity", "keywords", "summary"],
        "properties": {
            "application_type": {"type": "string"},
            "complexity": {"type": "string", "enum": ["low", "medium", "high"]},
            "keywords": {"type": "array", "items": {"type": "string"}},
            "summary": {"type": "string"}
        }
    })
}

/// JSON schema for recommendation replies
pub fn recommendation_schema() -> Value {
    json!({
        "type": "object",
        "required": ["recommendations"],
        "properties": {
            "recommendations": {
                "type": "array",
                "maxItems": MAX_RECOMMENDATIONS,
                "items": {
                    "type": "object",
                    "required": ["title", "description", "provider", "confidence"],
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "provider": {"type": "string", "enum": ["aws", "azure"]},
                        "confidence": {"type": "number", "minimum": 0, "maximum": 1},
                        "implementation_steps": {"type": "array", "items": {"type": "string"}}
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryContext;

    #[test]
    fn test_builder_layout() {
        let prompt = PromptBuilder::new()
            .role("architect", "clouds")
            .objectives(vec!["one", "two"])
            .context_item("b", "2")
            .context_item("a", "1")
            .section("Query", "shop")
            .build();

        assert!(prompt.starts_with("<ROLE>"));
        assert!(prompt.contains("1. one\n2. two"));
        // Context is rendered in key order regardless of insertion order
        assert!(prompt.find("**a**").unwrap() < prompt.find("**b**").unwrap());
        assert!(prompt.ends_with("shop"));
    }

    #[test]
    fn test_recommendation_prompt_mentions_constraints() {
        let query = Query::new("A photo sharing site").with_context(QueryContext {
            budget: Some(150.0),
            preferred_providers: vec![CloudProvider::Azure],
            ..Default::default()
        });
        let analysis = RequirementAnalysis::from_query_text(&query.text);
        let prompt = recommendation_prompt(&query, &analysis);

        assert!(prompt.contains("150.00"));
        assert!(prompt.contains("provider values: azure"));
        assert!(prompt.contains("A photo sharing site"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let query = Query::new("inventory api with redis");
        assert_eq!(analysis_prompt(&query), analysis_prompt(&query));
    }
}
