//! Requirement keywords and analysis results

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Normalized infrastructure requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Frontend,
    Backend,
    Database,
    Cache,
    Networking,
    ApiGateway,
    Storage,
    Monitoring,
    Logging,
    Authentication,
}

impl Requirement {
    pub const ALL: [Requirement; 10] = [
        Requirement::Frontend,
        Requirement::Backend,
        Requirement::Database,
        Requirement::Cache,
        Requirement::Networking,
        Requirement::ApiGateway,
        Requirement::Storage,
        Requirement::Monitoring,
        Requirement::Logging,
        Requirement::Authentication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Networking => "networking",
            Self::ApiGateway => "api_gateway",
            Self::Storage => "storage",
            Self::Monitoring => "monitoring",
            Self::Logging => "logging",
            Self::Authentication => "authentication",
        }
    }

    /// Map a free-text keyword onto a requirement. Unknown keywords yield `None`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = keyword.trim().to_lowercase().replace(['-', ' '], "_");
        let req = match normalized.as_str() {
            "frontend" | "ui" | "react" | "web" | "spa" | "website" => Self::Frontend,
            "backend" | "api" | "microservice" | "microservices" | "service" | "services"
            | "java" | "spring" | "compute" => Self::Backend,
            "database" | "db" | "sql" | "postgres" | "postgresql" | "mysql" | "mongodb" => {
                Self::Database
            }
            "cache" | "caching" | "redis" => Self::Cache,
            "networking" | "network" | "vpc" | "vnet" => Self::Networking,
            "api_gateway" | "gateway" | "apim" => Self::ApiGateway,
            "storage" | "files" | "file" | "upload" | "uploads" | "blob" | "s3" | "images" => {
                Self::Storage
            }
            "monitoring" | "metrics" | "observability" | "alerts" => Self::Monitoring,
            "logging" | "logs" | "log" | "audit" => Self::Logging,
            "authentication" | "auth" | "login" | "sso" | "users" | "identity" => {
                Self::Authentication
            }
            _ => return None,
        };
        Some(req)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated set of requirements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSet(BTreeSet<Requirement>);

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requirements every web application gets regardless of the query
    pub fn baseline() -> Self {
        [
            Requirement::Frontend,
            Requirement::Backend,
            Requirement::Database,
            Requirement::Networking,
            Requirement::Monitoring,
        ]
        .into_iter()
        .collect()
    }

    /// Build from free-text keywords, ignoring anything unrecognized
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keywords
            .into_iter()
            .filter_map(|k| Requirement::from_keyword(k.as_ref()))
            .collect()
    }

    pub fn insert(&mut self, req: Requirement) -> bool {
        self.0.insert(req)
    }

    pub fn contains(&self, req: Requirement) -> bool {
        self.0.contains(&req)
    }

    pub fn extend(&mut self, other: &RequirementSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn iter(&self) -> impl Iterator<Item = Requirement> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Requirement Analysis
// =============================================================================

/// Where an analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    #[default]
    Llm,
    KeywordFallback,
}

/// Structured result of analyzing a requirements query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    #[serde(default = "default_application_type")]
    pub application_type: String,
    #[serde(default = "default_complexity")]
    pub complexity: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: AnalysisSource,
}

fn default_application_type() -> String {
    "web_application".to_string()
}

fn default_complexity() -> String {
    "medium".to_string()
}

impl RequirementAnalysis {
    /// Derive an analysis from the query text alone
    pub fn from_query_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut keywords: Vec<String> = Vec::new();
        for word in lower.split(|c: char| !c.is_alphanumeric() && c != '-' && c != '_') {
            if word.is_empty() || Requirement::from_keyword(word).is_none() {
                continue;
            }
            if !keywords.iter().any(|k| k == word) {
                keywords.push(word.to_string());
            }
        }

        let application_type = if ["shop", "store", "commerce", "checkout", "cart"]
            .iter()
            .any(|w| lower.contains(w))
        {
            "e_commerce"
        } else if ["dashboard", "analytics", "report"].iter().any(|w| lower.contains(w)) {
            "analytics"
        } else {
            "web_application"
        };

        let distinct = RequirementSet::from_keywords(&keywords).len();
        let complexity = match distinct {
            n if n >= 6 => "high",
            n if n >= 3 => "medium",
            _ => "low",
        };

        Self {
            application_type: application_type.to_string(),
            complexity: complexity.to_string(),
            keywords,
            summary: text.trim().to_string(),
            source: AnalysisSource::KeywordFallback,
        }
    }

    /// Requirements implied by this analysis, on top of the baseline
    pub fn requirements(&self) -> RequirementSet {
        let mut set = RequirementSet::baseline();
        set.extend(&RequirementSet::from_keywords(&self.keywords));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keywords_ignores_unknown() {
        let set = RequirementSet::from_keywords(["Redis", "quantum", "API-Gateway", "auth"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(Requirement::Cache));
        assert!(set.contains(Requirement::ApiGateway));
        assert!(set.contains(Requirement::Authentication));
    }

    #[test]
    fn test_requirement_set_is_ordered() {
        let set = RequirementSet::from_keywords(["logs", "react", "database"]);
        let order: Vec<_> = set.iter().collect();
        assert_eq!(
            order,
            vec![Requirement::Frontend, Requirement::Database, Requirement::Logging]
        );
    }

    #[test]
    fn test_keyword_fallback_analysis() {
        let analysis =
            RequirementAnalysis::from_query_text("An online shop with login, Redis cache and uploads");
        assert_eq!(analysis.application_type, "e_commerce");
        assert_eq!(analysis.source, AnalysisSource::KeywordFallback);
        let reqs = analysis.requirements();
        assert!(reqs.contains(Requirement::Authentication));
        assert!(reqs.contains(Requirement::Cache));
        assert!(reqs.contains(Requirement::Storage));
        assert!(reqs.contains(Requirement::Frontend));
    }

    #[test]
    fn test_analysis_deserialize_defaults() {
        let analysis: RequirementAnalysis = serde_json::from_str(r#"{"keywords": ["db"]}"#).unwrap();
        assert_eq!(analysis.application_type, "web_application");
        assert_eq!(analysis.complexity, "medium");
        assert_eq!(analysis.source, AnalysisSource::Llm);
    }
}
