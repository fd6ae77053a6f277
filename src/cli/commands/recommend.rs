//! Recommend Command
//!
//! Run one query through the pipeline and print the ranked options.
//!
//! Usage:
//!   archwright recommend "<requirements>" [--budget 200] [--cloud aws]
//!       [--architecture serverless] [--templates -o ./out] [--no-fallback]

use std::path::PathBuf;

use crate::cli::Output;
use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineOutcome, RunOptions};
use crate::templates;
use crate::types::{ArchitectureType, CloudProvider, Query, QueryContext, Result};

use super::open_learning;

pub struct RecommendOptions {
    pub query: String,
    pub budget: Option<f64>,
    pub providers: Vec<CloudProvider>,
    pub architecture: Option<ArchitectureType>,
    pub templates: bool,
    pub output: Option<PathBuf>,
    pub allow_fallback: bool,
    pub json: bool,
}

pub async fn run(config: &Config, options: RecommendOptions, out: &Output) -> Result<()> {
    let mut pipeline = Pipeline::from_config(config)?;
    if let Some(learning) = open_learning(config)? {
        pipeline = pipeline.with_learning(learning);
    }

    let query = Query::new(options.query).with_context(QueryContext {
        budget: options.budget,
        preferred_providers: options.providers,
        architecture_type: options.architecture,
        ..Default::default()
    });
    let run_options = RunOptions {
        generate_templates: options.templates && config.features.templates,
        allow_fallback: options.allow_fallback,
    };
    if options.templates && !config.features.templates {
        out.warning("Template generation is disabled in configuration");
    }

    out.info(&format!(
        "Asking {} ({})...",
        pipeline.provider_name(),
        pipeline.model()
    ));
    let outcome = pipeline.run(query, run_options).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, out);
    }

    if let Some(dir) = &options.output {
        for (kind, set) in &outcome.templates {
            let written = templates::write_to_dir(set, &dir.join(kind))?;
            out.success(&format!(
                "Wrote {} {} files to {}",
                written.len(),
                kind,
                dir.join(kind).display()
            ));
        }
    } else if !outcome.templates.is_empty() && !options.json {
        out.info("Pass --output <dir> to write the generated templates");
    }

    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome, out: &Output) {
    out.header("Requirements");
    out.field("application", &outcome.analysis.application_type);
    out.field("complexity", &outcome.analysis.complexity);
    if !outcome.analysis.keywords.is_empty() {
        out.field("keywords", outcome.analysis.keywords.join(", "));
    }

    out.header("Recommendations");
    let selected = outcome.selected.as_ref().map(|r| r.id.as_str());
    for rec in &outcome.recommendations {
        out.recommendation(rec, selected == Some(rec.id.as_str()));
    }

    for warning in &outcome.warnings {
        out.warning(warning);
    }
    for error in &outcome.errors {
        out.error(error);
    }

    out.header("Session");
    out.field("id", &outcome.session_id);
    out.field("status", outcome.status());
    out.field("elapsed", format!("{} ms", outcome.elapsed_ms));
    for (kind, set) in &outcome.templates {
        out.field(kind, format!("{} files", set.len()));
    }
}
