//! Proposal analysis pipeline: concurrent sub-analyses with per-operation
//! primary/fallback routing.
//!
//! Five independent sub-operations run per proposal: sentiment, summary,
//! risk, outcome prediction, impact. Four of them ask the text generator
//! first and drop to their heuristic fallback on any recoverable failure
//! (unavailable provider, per-call timeout, unparsable reply); prediction is
//! always local. Failures never cross sub-operation boundaries: one bad call
//! cannot cancel or degrade a sibling. After the join, aggregate confidence,
//! key points, and recommendations are derived from the joined results.

pub mod textgen;

use std::sync::Arc;

use metrics::counter;
use tracing::warn;

use crate::error::AnalystError;
use crate::fallback::HeuristicFallback;
use crate::features::DaoContext;
use crate::predict::{OutcomePrediction, OutcomePredictor, PredictionFeatures};
use crate::schemas::{ImpactAnalysis, RiskAssessment};
use crate::scoring::clamp01;

pub use textgen::{build_generator, DynTextGenerator};

/// Fixed confidence attributed to the sentiment and risk sub-results when
/// averaging into the aggregate confidence.
const SENTIMENT_CONFIDENCE: f32 = 0.8;
const RISK_CONFIDENCE: f32 = 0.7;

mod roles {
    pub const SENTIMENT: &str = "You are a sentiment analysis expert. Analyze the sentiment of the given DAO proposal text and return a score between -1 (very negative) and 1 (very positive). Return only the numeric score.";
    pub const SUMMARY: &str = "You are an expert at summarizing DAO governance proposals. Create a clear, concise summary in 2-3 sentences that captures the key points and intent.";
    pub const RISK: &str = "You are a risk assessment expert for DAO governance. Analyze the risk level (low/medium/high) and identify specific risk factors. Return JSON format: {\"risk_level\": \"low/medium/high\", \"risk_factors\": [\"factor1\", \"factor2\"], \"risk_score\": 0.0-1.0}";
    pub const IMPACT: &str = "You are an expert at analyzing DAO governance proposal impacts. Analyze the potential impact on treasury, governance, and community aspects. Return JSON format with impact scores (0-1) and descriptions.";
    pub const KEY_POINTS: &str = "Extract 3-5 key points from this DAO proposal. Return as a JSON array of strings.";
    pub const RECOMMENDATIONS: &str = "Based on the analysis results, provide 2-3 actionable recommendations for DAO members. Focus on voting guidance and risk mitigation.";
}

/// Char-safe prefix; generator inputs are capped per sub-operation.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Joined result of one full proposal analysis.
#[derive(Debug, Clone)]
pub struct ProposalAnalysis {
    pub sentiment_score: f32,
    pub summary: String,
    pub risk: RiskAssessment,
    pub prediction: OutcomePrediction,
    pub impact: ImpactAnalysis,
    pub confidence: f32,
    pub key_points: Vec<String>,
    pub recommendations: Vec<String>,
}

pub struct AnalysisOrchestrator {
    generator: DynTextGenerator,
    predictor: Arc<OutcomePredictor>,
    fallback: HeuristicFallback,
}

impl AnalysisOrchestrator {
    pub fn new(generator: DynTextGenerator, predictor: Arc<OutcomePredictor>) -> Self {
        Self {
            generator,
            predictor,
            fallback: HeuristicFallback::new(),
        }
    }

    /// Seeded-fallback constructor for tests that pin sampled values.
    pub fn with_fallback(
        generator: DynTextGenerator,
        predictor: Arc<OutcomePredictor>,
        fallback: HeuristicFallback,
    ) -> Self {
        Self {
            generator,
            predictor,
            fallback,
        }
    }

    /// Run the five sub-analyses concurrently, then derive confidence, key
    /// points, and recommendations from the joined results.
    pub async fn analyze_proposal(&self, text: &str, ctx: &DaoContext) -> ProposalAnalysis {
        let (sentiment_score, summary, risk, prediction, impact) = tokio::join!(
            self.sentiment(text),
            self.summary(text),
            self.assess_risk(text, ctx),
            self.predict_outcome(text, ctx),
            self.analyze_impact(text),
        );

        let confidence =
            clamp01((SENTIMENT_CONFIDENCE + RISK_CONFIDENCE + prediction.confidence) / 3.0);

        let key_points = self.key_points(text).await;
        let recommendations = self
            .recommendations(sentiment_score, &risk, &prediction)
            .await;

        ProposalAnalysis {
            sentiment_score,
            summary,
            risk,
            prediction,
            impact,
            confidence,
            key_points,
            recommendations,
        }
    }

    fn note_fallback(op: &'static str, err: &AnalystError) {
        warn!(op, error = %err, "primary analysis failed, using heuristic fallback");
        counter!("analyzer_fallback_total", "op" => op).increment(1);
    }

    fn note_primary(op: &'static str) {
        counter!("analyzer_primary_total", "op" => op).increment(1);
    }

    async fn sentiment(&self, text: &str) -> f32 {
        match self.primary_sentiment(text).await {
            Ok(v) => {
                Self::note_primary("sentiment");
                v
            }
            Err(err) => {
                Self::note_fallback("sentiment", &err);
                self.fallback.sentiment(text)
            }
        }
    }

    async fn primary_sentiment(&self, text: &str) -> Result<f32, AnalystError> {
        let reply = self
            .generator
            .generate(roles::SENTIMENT, &truncate(text, 1000), 10, 0.1)
            .await?;
        let score: f32 = reply
            .trim()
            .parse()
            .map_err(|_| AnalystError::Malformed(reply))?;
        Ok(score.clamp(-1.0, 1.0))
    }

    async fn summary(&self, text: &str) -> String {
        match self
            .generator
            .generate(roles::SUMMARY, &truncate(text, 1500), 150, 0.3)
            .await
        {
            Ok(reply) => {
                Self::note_primary("summary");
                reply
            }
            Err(err) => {
                Self::note_fallback("summary", &err);
                self.fallback.summary(text)
            }
        }
    }

    async fn assess_risk(&self, text: &str, ctx: &DaoContext) -> RiskAssessment {
        match self.primary_risk(text, ctx).await {
            Ok(r) => {
                Self::note_primary("risk");
                r
            }
            Err(err) => {
                Self::note_fallback("risk", &err);
                self.fallback.risk_assessment(text)
            }
        }
    }

    async fn primary_risk(
        &self,
        text: &str,
        ctx: &DaoContext,
    ) -> Result<RiskAssessment, AnalystError> {
        let content = format!(
            "Assess risk for this proposal in context: DAO Treasury: ${:.0}, Active Proposals: {}\n\nProposal: {}",
            ctx.treasury_value,
            ctx.active_proposals,
            truncate(text, 1000),
        );
        let reply = self
            .generator
            .generate(roles::RISK, &content, 200, 0.2)
            .await?;
        // Tagged parse: an unparseable payload is a normal branch, not an
        // exception. The AI-reported band and numeric score are kept as-is
        // even when they disagree; only the score range is enforced.
        let mut parsed: RiskAssessment =
            serde_json::from_str(reply.trim()).map_err(|_| AnalystError::Malformed(reply))?;
        parsed.risk_score = clamp01(parsed.risk_score);
        Ok(parsed)
    }

    /// Pure local computation; never suspends and never fails outward.
    async fn predict_outcome(&self, text: &str, ctx: &DaoContext) -> OutcomePrediction {
        let features = PredictionFeatures {
            proposer_reputation: ctx.proposer_reputation,
            complexity: PredictionFeatures::complexity_of(text),
            sentiment: ctx.avg_sentiment,
            financial_impact: ctx.financial_impact_score,
        };
        self.predictor.predict(text, &features)
    }

    async fn analyze_impact(&self, text: &str) -> ImpactAnalysis {
        match self.primary_impact(text).await {
            Ok(i) => {
                Self::note_primary("impact");
                i
            }
            Err(err) => {
                Self::note_fallback("impact", &err);
                self.fallback.impact_analysis(text)
            }
        }
    }

    async fn primary_impact(&self, text: &str) -> Result<ImpactAnalysis, AnalystError> {
        let reply = self
            .generator
            .generate(roles::IMPACT, &truncate(text, 1000), 300, 0.3)
            .await?;
        let mut parsed: ImpactAnalysis =
            serde_json::from_str(reply.trim()).map_err(|_| AnalystError::Malformed(reply))?;
        parsed.treasury_impact.score = clamp01(parsed.treasury_impact.score);
        parsed.governance_impact.score = clamp01(parsed.governance_impact.score);
        parsed.community_impact.score = clamp01(parsed.community_impact.score);
        Ok(parsed)
    }

    async fn key_points(&self, text: &str) -> Vec<String> {
        match self.primary_key_points(text).await {
            Ok(points) => {
                Self::note_primary("key_points");
                points
            }
            Err(err) => {
                Self::note_fallback("key_points", &err);
                self.fallback.key_points(text)
            }
        }
    }

    async fn primary_key_points(&self, text: &str) -> Result<Vec<String>, AnalystError> {
        let reply = self
            .generator
            .generate(roles::KEY_POINTS, &truncate(text, 1000), 200, 0.2)
            .await?;
        let parsed: Vec<String> =
            serde_json::from_str(reply.trim()).map_err(|_| AnalystError::Malformed(reply))?;
        let points: Vec<String> = parsed
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .take(5)
            .collect();
        if points.is_empty() {
            return Err(AnalystError::Malformed("no key points".to_string()));
        }
        Ok(points)
    }

    async fn recommendations(
        &self,
        sentiment: f32,
        risk: &RiskAssessment,
        prediction: &OutcomePrediction,
    ) -> Vec<String> {
        match self
            .primary_recommendations(sentiment, risk, prediction)
            .await
        {
            Ok(recs) => {
                Self::note_primary("recommendations");
                recs
            }
            Err(err) => {
                Self::note_fallback("recommendations", &err);
                self.fallback.recommendations(sentiment, risk)
            }
        }
    }

    async fn primary_recommendations(
        &self,
        sentiment: f32,
        risk: &RiskAssessment,
        prediction: &OutcomePrediction,
    ) -> Result<Vec<String>, AnalystError> {
        let content = format!(
            "Generate recommendations based on: Sentiment: {sentiment:.2}, Risk: {} ({:.2}), Prediction: {:.2}",
            serde_json::to_string(&risk.risk_level).unwrap_or_default(),
            risk.risk_score,
            prediction.probability,
        );
        let reply = self
            .generator
            .generate(roles::RECOMMENDATIONS, &content, 150, 0.3)
            .await?;
        let recs: Vec<String> = reply
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .take(5)
            .collect();
        if recs.is_empty() {
            return Err(AnalystError::Malformed("no recommendations".to_string()));
        }
        Ok(recs)
    }
}

#[cfg(test)]
mod tests {
    use super::textgen::{DisabledGenerator, MockGenerator, RecoverableKind};
    use super::*;
    use crate::features::{FeatureSource, MockFeatureSource};
    use crate::schemas::RiskLevel;

    async fn ctx() -> DaoContext {
        MockFeatureSource.dao_context("0xdao").await.unwrap()
    }

    fn orchestrator(generator: DynTextGenerator) -> AnalysisOrchestrator {
        AnalysisOrchestrator::with_fallback(
            generator,
            Arc::new(OutcomePredictor::train()),
            HeuristicFallback::with_seed(42),
        )
    }

    #[tokio::test]
    async fn disabled_generator_never_breaks_the_contract() {
        let orch = orchestrator(Arc::new(DisabledGenerator));
        let ctx = ctx().await;
        let out = orch
            .analyze_proposal("Increase treasury allocation to DeFi protocols", &ctx)
            .await;

        assert!((-1.0..=1.0).contains(&out.sentiment_score));
        assert!(!out.summary.is_empty());
        assert!((0.0..=1.0).contains(&out.risk.risk_score));
        assert!((0.0..=1.0).contains(&out.prediction.probability));
        assert!((0.0..=1.0).contains(&out.confidence));
        assert!((1..=5).contains(&out.key_points.len()));
        assert!((1..=5).contains(&out.recommendations.len()));
        // Fallback keeps band and score consistent.
        assert!((out.risk.risk_score - out.risk.risk_level.fallback_score()).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn canned_mock_drives_the_primary_path() {
        let orch = orchestrator(Arc::new(MockGenerator::canned()));
        let ctx = ctx().await;
        let out = orch
            .analyze_proposal("Rebalance the treasury into yield strategies", &ctx)
            .await;

        assert!((out.sentiment_score - 0.4).abs() < 1e-6);
        assert!(out.summary.contains("reallocates"));
        assert_eq!(out.risk.risk_level, RiskLevel::Medium);
        assert!((out.risk.risk_score - 0.45).abs() < 1e-6);
        assert_eq!(out.key_points.len(), 3);
        assert_eq!(out.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn malformed_risk_reply_drops_to_fallback_without_touching_siblings() {
        let generator = MockGenerator::new()
            .with_failure("risk assessment expert", RecoverableKind::Malformed)
            .with_reply("sentiment analysis expert", "0.4")
            .with_reply("summarizing DAO governance proposals", "A valid summary.")
            .with_reply("key points", r#"["one", "two"]"#)
            .with_reply("actionable recommendations", "Line one");

        let orch = orchestrator(Arc::new(generator));
        let ctx = ctx().await;
        let out = orch
            .analyze_proposal("Spend treasury money on a new fund", &ctx)
            .await;

        // Risk fell back (band/score consistent); siblings kept the primary.
        assert!((out.risk.risk_score - out.risk.risk_level.fallback_score()).abs() < f32::EPSILON);
        assert!((out.sentiment_score - 0.4).abs() < 1e-6);
        assert_eq!(out.summary, "A valid summary.");
    }

    #[tokio::test]
    async fn unparseable_sentiment_falls_back_into_band() {
        let generator =
            MockGenerator::new().with_reply("sentiment analysis expert", "not a number");
        let orch = orchestrator(Arc::new(generator));
        let ctx = ctx().await;
        let out = orch
            .analyze_proposal("benefit and improve things", &ctx)
            .await;
        // Positive-dominant text: fallback band is [0.3, 0.8].
        assert!((0.3..=0.8).contains(&out.sentiment_score));
    }

    #[tokio::test]
    async fn confidence_blends_the_fixed_and_predicted_parts() {
        let orch = orchestrator(Arc::new(DisabledGenerator));
        let ctx = ctx().await;
        let out = orch.analyze_proposal("anything", &ctx).await;
        let expected = (0.8 + 0.7 + out.prediction.confidence) / 3.0;
        assert!((out.confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
