//! Learning Command
//!
//! Summarize the feedback log.

use crate::cli::Output;
use crate::config::Config;
use crate::learning::FeedbackProcessor;
use crate::types::Result;

pub fn run(config: &Config, json: bool, out: &Output) -> Result<()> {
    let processor = FeedbackProcessor::open(&config.learning.storage_path)?;
    let summary = processor.summary()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    out.header("Feedback");
    out.field("log", processor.log().path().display());
    out.field("entries", summary.total);
    if summary.total == 0 {
        out.info("No feedback recorded yet");
        return Ok(());
    }
    out.field("average", format!("{:.2}", summary.average_rating));
    out.field(
        "sentiment",
        format!(
            "{} positive, {} neutral, {} negative",
            summary.positive, summary.neutral, summary.negative
        ),
    );

    if !summary.provider_preferences.is_empty() {
        out.header("Provider ratings");
        for (provider, rating) in &summary.provider_preferences {
            out.field(provider, format!("{:.2}", rating));
        }
    }
    if !summary.architecture_preferences.is_empty() {
        out.header("Architecture ratings");
        for (arch, rating) in &summary.architecture_preferences {
            out.field(arch, format!("{:.2}", rating));
        }
    }

    out.header("Preference weights");
    for (dimension, weight) in &summary.preference_weights {
        out.field(dimension, format!("{:.3}", weight));
    }
    if !summary.positive_aspects.is_empty() {
        out.field("liked", summary.positive_aspects.join(", "));
    }
    if !summary.negative_aspects.is_empty() {
        out.field("disliked", summary.negative_aspects.join(", "));
    }
    out.field("cost sensitivity", format!("{:.2}", summary.cost_sensitivity));

    if !summary.insights.is_empty() {
        out.header("Insights");
        for insight in &summary.insights {
            out.field(&format!("{:.2}", insight.confidence), &insight.description);
        }
    }
    Ok(())
}
