//! Feedback Command
//!
//! Record a rating for a recommendation in the feedback log.

use std::collections::BTreeMap;

use crate::cli::Output;
use crate::config::Config;
use crate::learning::{FeedbackInput, FeedbackProcessor};
use crate::types::{CloudProvider, Result, SessionId};

pub struct FeedbackOptions {
    pub recommendation_id: String,
    pub rating: f64,
    pub text: Option<String>,
    pub session_id: Option<String>,
    pub provider: Option<CloudProvider>,
    pub architecture: Option<String>,
    pub preferences: Vec<(String, f64)>,
}

pub fn run(config: &Config, options: FeedbackOptions, out: &Output) -> Result<()> {
    let processor = FeedbackProcessor::open(&config.learning.storage_path)?;

    let input = FeedbackInput {
        session_id: options.session_id.map(SessionId::from),
        recommendation_id: options.recommendation_id,
        rating: options.rating,
        text: options.text,
        preferences: options.preferences.into_iter().collect::<BTreeMap<_, _>>(),
        provider: options.provider,
        architecture_type: options.architecture,
    };
    let receipt = processor.submit(input)?;

    out.success(&format!("Feedback recorded ({})", receipt.feedback_id));
    out.field("sentiment", format!("{:?}", receipt.sentiment).to_lowercase());
    out.field("entries", receipt.total_entries);
    out.field("average", format!("{:.2}", receipt.average_rating));
    if receipt.insights_generated > 0 {
        out.field("insights", receipt.insights_generated);
    }
    Ok(())
}
