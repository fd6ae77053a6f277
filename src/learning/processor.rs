//! Feedback processing and recommendation re-ranking

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    FeedbackInput, FeedbackLog, FeedbackReceipt, FeedbackRecord, InsightCategory,
    LearningInsight, LearningSummary, Sentiment,
};
use crate::constants::learning::{
    BASE_WEIGHT, COST_INSIGHT_CONFIDENCE, DEFAULT_COST_SENSITIVITY, INSIGHT_WEIGHT_FACTOR,
    LEARNING_RATE, MAX_RATING, MAX_WEIGHT, MIN_RATING, MIN_WEIGHT, NEUTRAL_RATING,
    PERFORMANCE_INSIGHT_CONFIDENCE, PROVIDER_INSIGHT_CONFIDENCE, SUMMARY_INSIGHT_LIMIT,
};
use crate::types::{ArchError, CloudProvider, Recommendation, Result, ValidationError};

/// Preference dimensions and the text stems that signal them
const DIMENSIONS: &[(&str, &[&str])] = &[
    ("cost", &["cost", "cheap", "price", "budget"]),
    ("performance", &["performance", "fast", "latency"]),
    ("scalability", &["scalab", "scale"]),
    ("security", &["secur"]),
    ("complexity", &["complex"]),
];

const POSITIVE_ASPECTS: &[(&str, &str)] = &[
    ("cost", "cost-effective"),
    ("performance", "high-performance"),
    ("scalable", "scalable"),
    ("secure", "secure"),
];

const NEGATIVE_ASPECTS: &[(&str, &str)] = &[
    ("expensive", "too-expensive"),
    ("complex", "too-complex"),
    ("slow", "poor-performance"),
];

#[derive(Debug)]
struct LearningState {
    count: usize,
    average: f64,
    weights: BTreeMap<String, f64>,
    /// Provider → (rating sum, count)
    provider_ratings: BTreeMap<CloudProvider, (f64, usize)>,
    /// (rating sum, count) over feedback that mentions cost
    cost_ratings: (f64, usize),
}

impl Default for LearningState {
    fn default() -> Self {
        Self {
            count: 0,
            average: 0.0,
            weights: DIMENSIONS
                .iter()
                .map(|(name, _)| (name.to_string(), BASE_WEIGHT))
                .collect(),
            provider_ratings: BTreeMap::new(),
            cost_ratings: (0.0, 0),
        }
    }
}

impl LearningState {
    fn apply(&mut self, record: &FeedbackRecord) {
        self.count += 1;
        self.average += (record.rating - self.average) / self.count as f64;

        let direction = match record.sentiment {
            Sentiment::Positive => 1.0,
            Sentiment::Negative => -1.0,
            Sentiment::Neutral => 0.0,
        };
        let text = record.text.as_deref().unwrap_or_default().to_lowercase();

        for (name, stems) in DIMENSIONS {
            let mut delta = 0.0;
            if direction != 0.0 && stems.iter().any(|stem| text.contains(stem)) {
                delta += direction * LEARNING_RATE;
            }
            if let Some(pref) = record.preferences.get(*name)
                && pref.is_finite()
            {
                delta += pref * LEARNING_RATE;
            }
            self.adjust(name, delta);
        }

        for insight in &record.insights {
            if let Some(dimension) = insight.category.dimension() {
                self.adjust(dimension, insight.confidence * INSIGHT_WEIGHT_FACTOR);
            }
        }

        if text.contains("cost") {
            self.cost_ratings.0 += record.rating;
            self.cost_ratings.1 += 1;
        }

        if let Some(provider) = record.provider {
            let entry = self.provider_ratings.entry(provider).or_insert((0.0, 0));
            entry.0 += record.rating;
            entry.1 += 1;
        }
    }

    fn adjust(&mut self, dimension: &str, delta: f64) {
        if delta != 0.0
            && let Some(weight) = self.weights.get_mut(dimension)
        {
            *weight = (*weight + delta).clamp(MIN_WEIGHT, MAX_WEIGHT);
        }
    }

    fn cost_sensitivity(&self) -> f64 {
        let (sum, n) = self.cost_ratings;
        if n == 0 {
            return DEFAULT_COST_SENSITIVITY;
        }
        ((MAX_RATING - sum / n as f64) / MAX_RATING).clamp(0.0, 1.0)
    }

    fn provider_mean(&self, provider: CloudProvider) -> Option<f64> {
        self.provider_ratings
            .get(&provider)
            .filter(|(_, n)| *n > 0)
            .map(|(sum, n)| sum / *n as f64)
    }
}

/// Records feedback and applies learned weights to recommendations
#[derive(Debug)]
pub struct FeedbackProcessor {
    log: FeedbackLog,
    state: Mutex<LearningState>,
}

impl FeedbackProcessor {
    /// Open the log and rebuild learned state from its entries
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_log(FeedbackLog::open(path)?)
    }

    pub fn from_log(log: FeedbackLog) -> Result<Self> {
        let mut state = LearningState::default();
        for record in log.entries()? {
            state.apply(&record);
        }
        debug!(entries = state.count, average = state.average, "Learning state rebuilt");
        Ok(Self {
            log,
            state: Mutex::new(state),
        })
    }

    pub fn log(&self) -> &FeedbackLog {
        &self.log
    }

    fn lock(&self) -> Result<MutexGuard<'_, LearningState>> {
        self.state
            .lock()
            .map_err(|_| ArchError::Storage("Learning state lock poisoned".to_string()))
    }

    /// Validate, persist and learn from one feedback submission
    pub fn submit(&self, input: FeedbackInput) -> Result<FeedbackReceipt> {
        if !input.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(ValidationError::field(
                "rating",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_RATING, MAX_RATING, input.rating
                ),
            )
            .into());
        }
        if let Some((key, value)) = input.preferences.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::field(
                "preferences",
                format!("'{}' must be a finite number, got {}", key, value),
            )
            .into());
        }

        let mut record = FeedbackRecord {
            feedback_id: format!("fb-{}", Uuid::new_v4()),
            session_id: input.session_id,
            recommendation_id: input.recommendation_id,
            rating: input.rating,
            text: input.text.filter(|t| !t.trim().is_empty()),
            preferences: input.preferences,
            sentiment: Sentiment::from_rating(input.rating),
            provider: input.provider,
            architecture_type: input.architecture_type,
            insights: Vec::new(),
            recorded_at: Utc::now(),
        };
        record.insights = derive_insights(&record);

        // Hold the state lock across the append so state and log agree
        let mut state = self.lock()?;
        let total_entries = self.log.append(record.clone())?;
        state.apply(&record);

        info!(
            feedback_id = %record.feedback_id,
            rating = record.rating,
            sentiment = ?record.sentiment,
            average = state.average,
            insights = record.insights.len(),
            "Feedback recorded"
        );

        Ok(FeedbackReceipt {
            insights_generated: record.insights.len(),
            feedback_id: record.feedback_id,
            sentiment: record.sentiment,
            total_entries,
            average_rating: state.average,
        })
    }

    /// Running mean of all ratings, 0 when no feedback exists
    pub fn average_rating(&self) -> Result<f64> {
        Ok(self.lock()?.average)
    }

    pub fn preference_weights(&self) -> Result<BTreeMap<String, f64>> {
        Ok(self.lock()?.weights.clone())
    }

    /// How strongly low ratings follow cost mentions, in [0, 1]
    pub fn cost_sensitivity(&self) -> Result<f64> {
        Ok(self.lock()?.cost_sensitivity())
    }

    /// Re-score by learned weights and provider preference, then sort by
    /// confidence descending. Ties keep their original order.
    pub fn rank(&self, recommendations: &mut [Recommendation]) -> Result<()> {
        let state = self.lock()?;

        for rec in recommendations.iter_mut() {
            let text = rec.searchable_text();
            let mut confidence = rec.confidence;

            for (name, stems) in DIMENSIONS {
                if stems.iter().any(|stem| text.contains(stem))
                    && let Some(weight) = state.weights.get(*name)
                {
                    confidence *= weight;
                }
            }
            if let Some(mean) = state.provider_mean(rec.provider) {
                confidence *= 1.0 + (mean - NEUTRAL_RATING) / 10.0;
                rec.feedback_score = Some(mean);
            }
            rec.set_confidence(confidence);
        }

        recommendations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        debug!(count = recommendations.len(), "Recommendations ranked");
        Ok(())
    }

    /// Aggregate statistics over the whole log
    pub fn summary(&self) -> Result<LearningSummary> {
        let entries = self.log.entries()?;
        let weights = self.preference_weights()?;

        let mut summary = LearningSummary {
            total: entries.len(),
            preference_weights: weights,
            cost_sensitivity: self.cost_sensitivity()?,
            ..Default::default()
        };
        if entries.is_empty() {
            return Ok(summary);
        }

        let mut average = 0.0;
        let mut providers: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        let mut architectures: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        let mut positive_aspects = BTreeSet::new();
        let mut negative_aspects = BTreeSet::new();

        for (i, record) in entries.iter().enumerate() {
            average += (record.rating - average) / (i + 1) as f64;

            let bucket = record.rating.floor() as i64;
            *summary
                .rating_distribution
                .entry(format!("{}-{}", bucket, bucket + 1))
                .or_default() += 1;

            let text = record.text.as_deref().unwrap_or_default().to_lowercase();
            match record.sentiment {
                Sentiment::Positive => {
                    summary.positive += 1;
                    collect_aspects(&text, POSITIVE_ASPECTS, &mut positive_aspects);
                }
                Sentiment::Negative => {
                    summary.negative += 1;
                    collect_aspects(&text, NEGATIVE_ASPECTS, &mut negative_aspects);
                }
                Sentiment::Neutral => summary.neutral += 1,
            }

            if let Some(provider) = record.provider {
                accumulate(&mut providers, provider.as_str(), record.rating);
            }
            if let Some(arch) = record.architecture_type.as_deref() {
                accumulate(&mut architectures, arch, record.rating);
            }
        }

        summary.average_rating = average;
        summary.provider_preferences = means(providers);
        summary.architecture_preferences = means(architectures);
        summary.positive_aspects = positive_aspects.into_iter().collect();
        summary.negative_aspects = negative_aspects.into_iter().collect();

        let mut insights: Vec<LearningInsight> = entries
            .into_iter()
            .flat_map(|record| record.insights)
            .collect();
        insights.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        insights.truncate(SUMMARY_INSIGHT_LIMIT);
        summary.insights = insights;
        Ok(summary)
    }
}

/// Insights drawn from one positive submission
fn derive_insights(record: &FeedbackRecord) -> Vec<LearningInsight> {
    if record.sentiment != Sentiment::Positive {
        return Vec::new();
    }
    let text = record.text.as_deref().unwrap_or_default().to_lowercase();
    let mut insights = Vec::new();

    if text.contains("cost") || record.preferences.contains_key("cost") {
        insights.push(insight(
            record,
            InsightCategory::CostOptimization,
            "Users prefer cost-effective solutions".to_string(),
            COST_INSIGHT_CONFIDENCE,
        ));
    }
    if text.contains("performance") || record.preferences.contains_key("performance") {
        insights.push(insight(
            record,
            InsightCategory::PerformanceOptimization,
            "Users value high-performance architectures".to_string(),
            PERFORMANCE_INSIGHT_CONFIDENCE,
        ));
    }
    if let Some(provider) = record.provider {
        insights.push(insight(
            record,
            InsightCategory::CloudProviderPreference,
            format!("Users show preference for {} solutions", provider.as_str()),
            PROVIDER_INSIGHT_CONFIDENCE,
        ));
    }
    insights
}

fn insight(
    record: &FeedbackRecord,
    category: InsightCategory,
    description: String,
    confidence: f64,
) -> LearningInsight {
    LearningInsight {
        insight_id: format!("ins-{}", Uuid::new_v4()),
        category,
        description,
        confidence,
        evidence: vec![record.feedback_id.clone()],
        created_at: record.recorded_at,
    }
}

fn collect_aspects(text: &str, table: &[(&str, &str)], out: &mut BTreeSet<String>) {
    for (keyword, aspect) in table {
        if text.contains(keyword) {
            out.insert(aspect.to_string());
        }
    }
}

fn accumulate(map: &mut BTreeMap<String, (f64, usize)>, key: &str, rating: f64) {
    let entry = map.entry(key.to_string()).or_insert((0.0, 0));
    entry.0 += rating;
    entry.1 += 1;
}

fn means(map: BTreeMap<String, (f64, usize)>) -> BTreeMap<String, f64> {
    map.into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn processor(dir: &TempDir) -> FeedbackProcessor {
        FeedbackProcessor::open(dir.path().join("feedback.json")).unwrap()
    }

    #[test]
    fn test_average_of_three() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        for rating in [4.5, 3.0, 5.0] {
            processor.submit(FeedbackInput::new("rec-1", rating)).unwrap();
        }

        let average = processor.average_rating().unwrap();
        assert!((average - 4.166_666_666).abs() < 1e-6);
        assert!((processor.summary().unwrap().average_rating - average).abs() < 1e-9);
    }

    #[test]
    fn test_n_submissions_n_entries_in_order() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let ids: Vec<String> = (0..7)
            .map(|i| {
                processor
                    .submit(FeedbackInput::new(format!("rec-{}", i), 3.0))
                    .unwrap()
                    .feedback_id
            })
            .collect();

        let logged: Vec<String> = processor
            .log()
            .entries()
            .unwrap()
            .into_iter()
            .map(|r| r.feedback_id)
            .collect();
        assert_eq!(logged, ids);
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        for rating in [0.5, 5.5, f64::NAN] {
            let err = processor.submit(FeedbackInput::new("rec-1", rating)).unwrap_err();
            assert!(matches!(err, ArchError::Validation(_)));
        }
        assert_eq!(processor.log().len().unwrap(), 0);
    }

    #[test]
    fn test_weights_follow_sentiment() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        processor
            .submit(FeedbackInput::new("rec-1", 5.0).with_text("Great cost savings"))
            .unwrap();
        processor
            .submit(FeedbackInput::new("rec-2", 1.0).with_text("Far too complex"))
            .unwrap();
        // Neutral feedback leaves weights alone
        processor
            .submit(FeedbackInput::new("rec-3", 3.0).with_text("security is fine"))
            .unwrap();

        // Keyword step plus the cost insight (0.8 * 0.5)
        let weights = processor.preference_weights().unwrap();
        assert!((weights["cost"] - 1.5).abs() < 1e-9);
        assert!((weights["complexity"] - 0.9).abs() < 1e-9);
        assert!((weights["security"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_preferences_scaled() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let mut input = FeedbackInput::new("rec-1", 3.0);
        input.preferences.insert("performance".into(), 2.0);
        input.preferences.insert("unknown".into(), 5.0);
        processor.submit(input).unwrap();

        let weights = processor.preference_weights().unwrap();
        assert!((weights["performance"] - 1.2).abs() < 1e-9);
        assert!(!weights.contains_key("unknown"));
    }

    #[test]
    fn test_state_rebuilt_on_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let processor = processor(&dir);
            processor
                .submit(FeedbackInput::new("rec-1", 5.0).with_text("low cost"))
                .unwrap();
            processor.submit(FeedbackInput::new("rec-2", 2.0)).unwrap();
        }

        let reopened = processor(&dir);
        assert!((reopened.average_rating().unwrap() - 3.5).abs() < 1e-9);
        assert!((reopened.preference_weights().unwrap()["cost"] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_preference_rejected() {
        let dir = TempDir::new().unwrap();
        {
            let processor = processor(&dir);
            for value in [f64::NAN, f64::INFINITY] {
                let mut input = FeedbackInput::new("rec-1", 4.0);
                input.preferences.insert("cost".into(), value);
                let err = processor.submit(input).unwrap_err();
                assert!(matches!(err, ArchError::Validation(_)));
            }
            assert_eq!(processor.log().len().unwrap(), 0);
            processor.submit(FeedbackInput::new("rec-1", 4.0)).unwrap();
        }

        let reopened = processor(&dir);
        assert_eq!(reopened.log().len().unwrap(), 1);
        assert!((reopened.average_rating().unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_simple_praise_does_not_reward_complexity() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        processor
            .submit(FeedbackInput::new("rec-1", 5.0).with_text("Nice and simple"))
            .unwrap();
        assert!((processor.preference_weights().unwrap()["complexity"] - 1.0).abs() < 1e-9);

        let mut recs = vec![
            Recommendation::new("rec-1", "Plain option", CloudProvider::Aws, 0.5),
            Recommendation::new("rec-2", "Complex service mesh", CloudProvider::Aws, 0.55),
        ];
        processor.rank(&mut recs).unwrap();
        assert_eq!(recs[0].id, "rec-2");
        assert!((recs[0].confidence - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_positive_feedback_generates_insights() {
        let dir = TempDir::new().unwrap();
        {
            let processor = processor(&dir);
            let receipt = processor
                .submit(
                    FeedbackInput::new("rec-1", 4.5)
                        .with_text("Good performance at a fair cost")
                        .with_provider(CloudProvider::Azure),
                )
                .unwrap();
            assert_eq!(receipt.insights_generated, 3);

            let receipt = processor
                .submit(FeedbackInput::new("rec-2", 2.0).with_text("cost is too high"))
                .unwrap();
            assert_eq!(receipt.insights_generated, 0);
        }

        let reopened = processor(&dir);
        let entries = reopened.log().entries().unwrap();
        assert_eq!(entries[0].insights.len(), 3);
        assert_eq!(entries[0].insights[0].evidence, vec![entries[0].feedback_id.clone()]);

        let summary = reopened.summary().unwrap();
        let categories: Vec<_> = summary.insights.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![
                InsightCategory::CostOptimization,
                InsightCategory::PerformanceOptimization,
                InsightCategory::CloudProviderPreference,
            ]
        );
        assert_eq!(
            summary.insights[2].description,
            "Users show preference for azure solutions"
        );
        // Performance: keyword step 0.1 plus insight 0.35
        assert!((summary.preference_weights["performance"] - 1.45).abs() < 1e-9);
    }

    #[test]
    fn test_cost_sensitivity() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        assert!((processor.cost_sensitivity().unwrap() - 0.5).abs() < 1e-9);
        assert!((processor.summary().unwrap().cost_sensitivity - 0.5).abs() < 1e-9);

        processor
            .submit(FeedbackInput::new("rec-1", 2.0).with_text("Cost was a problem"))
            .unwrap();
        processor
            .submit(FeedbackInput::new("rec-2", 5.0).with_text("fast enough"))
            .unwrap();

        // Only the cost mention counts: (5 - 2) / 5
        assert!((processor.cost_sensitivity().unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_summary_keeps_top_insights() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        for i in 0..12 {
            processor
                .submit(
                    FeedbackInput::new(format!("rec-{}", i), 5.0)
                        .with_provider(CloudProvider::Aws),
                )
                .unwrap();
        }
        processor
            .submit(FeedbackInput::new("rec-cost", 4.0).with_text("cost"))
            .unwrap();

        let summary = processor.summary().unwrap();
        assert_eq!(summary.insights.len(), SUMMARY_INSIGHT_LIMIT);
        assert_eq!(summary.insights[0].category, InsightCategory::CostOptimization);
    }

    #[test]
    fn test_summary_buckets_and_aspects() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        processor
            .submit(
                FeedbackInput::new("rec-1", 4.5)
                    .with_text("Scalable and secure")
                    .with_provider(CloudProvider::Aws),
            )
            .unwrap();
        processor
            .submit(
                FeedbackInput::new("rec-2", 1.5)
                    .with_text("Too expensive and slow")
                    .with_provider(CloudProvider::Azure),
            )
            .unwrap();
        processor
            .submit(FeedbackInput::new("rec-3", 3.0).with_provider(CloudProvider::Aws))
            .unwrap();

        let summary = processor.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!((summary.positive, summary.negative, summary.neutral), (1, 1, 1));
        assert_eq!(summary.rating_distribution["4-5"], 1);
        assert_eq!(summary.rating_distribution["1-2"], 1);
        assert_eq!(summary.rating_distribution["3-4"], 1);
        assert_eq!(summary.positive_aspects, vec!["scalable", "secure"]);
        assert_eq!(summary.negative_aspects, vec!["poor-performance", "too-expensive"]);
        assert!((summary.provider_preferences["aws"] - 3.75).abs() < 1e-9);
        assert!((summary.provider_preferences["azure"] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rank_prefers_liked_provider() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        processor
            .submit(FeedbackInput::new("rec-1", 5.0).with_provider(CloudProvider::Azure))
            .unwrap();

        let mut recs = vec![
            Recommendation::new("rec-1", "Serverless", CloudProvider::Aws, 0.8),
            Recommendation::new("rec-2", "Containers", CloudProvider::Azure, 0.75),
        ];
        processor.rank(&mut recs).unwrap();

        assert_eq!(recs[0].id, "rec-2");
        assert!((recs[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(recs[0].feedback_score, Some(5.0));
        assert_eq!(recs[1].feedback_score, None);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let mut recs: Vec<_> = (1..=4)
            .map(|i| Recommendation::new(format!("rec-{}", i), "Option", CloudProvider::Aws, 0.6))
            .collect();
        processor.rank(&mut recs).unwrap();

        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rec-1", "rec-2", "rec-3", "rec-4"]);
    }

    proptest! {
        #[test]
        fn prop_rank_keeps_confidence_bounded(
            ratings in proptest::collection::vec(1.0f64..=5.0, 0..8),
            confidences in proptest::collection::vec(0.0f64..=1.0, 1..6),
        ) {
            let dir = TempDir::new().unwrap();
            let processor = processor(&dir);
            for rating in ratings {
                processor
                    .submit(
                        FeedbackInput::new("rec-1", rating)
                            .with_text("cost performance security")
                            .with_provider(CloudProvider::Aws),
                    )
                    .unwrap();
            }

            let mut recs: Vec<_> = confidences
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    Recommendation::new(format!("rec-{}", i), "Low cost", CloudProvider::Aws, *c)
                        .with_description("fast and secure")
                })
                .collect();
            processor.rank(&mut recs).unwrap();

            for pair in recs.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
            for rec in &recs {
                prop_assert!((0.0..=1.0).contains(&rec.confidence));
            }
        }
    }
}
