//! Request/response shapes for the public API, plus the shared portfolio
//! types used by the scoring engine.
//!
//! Scores are `f32` in [0,1] (sentiment in [-1,1]); USD values are `f64`.
//! All response objects are built once per request and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk band reported by both the AI path and the heuristic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fixed band-to-score mapping used by the fallback path. The AI path
    /// returns its own numeric score, which may disagree with the band; that
    /// disagreement is preserved as-is.
    pub fn fallback_score(self) -> f32 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.5,
            Self::High => 0.8,
        }
    }
}

/// Action tags understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ProposalExecution,
    TreasuryRebalance,
    TokenTransfer,
    ContractInteraction,
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// One treasury position. `percentage` is the share of total value in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetHolding {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub balance: f64,
    pub value_usd: f64,
    pub percentage: f32,
}

impl AssetHolding {
    pub fn new(symbol: impl Into<String>, value_usd: f64) -> Self {
        Self {
            symbol: symbol.into(),
            address: None,
            balance: 0.0,
            value_usd,
            percentage: 0.0,
        }
    }
}

/// A set of holdings. The scoring engine always normalizes against the
/// summed `value_usd`, not the declared percentages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<AssetHolding>,
}

impl Portfolio {
    pub fn new(assets: Vec<AssetHolding>) -> Self {
        Self { assets }
    }

    /// Summed USD value over all holdings.
    pub fn total_value(&self) -> f64 {
        self.assets.iter().map(|a| a.value_usd).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() || self.total_value() <= 0.0
    }

    /// Top `n` holdings by USD value, largest first.
    pub fn top_holdings(&self, n: usize) -> Vec<AssetHolding> {
        let mut sorted = self.assets.clone();
        sorted.sort_by(|a, b| {
            b.value_usd
                .partial_cmp(&a.value_usd)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.truncate(n);
        sorted
    }
}

// ---------------------------------------------------------------------------
// Analysis payloads
// ---------------------------------------------------------------------------

/// Structured risk result: band + factor list + numeric score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub risk_score: f32,
}

/// Score + one-line description for a single impact dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionImpact {
    pub score: f32,
    pub description: String,
}

/// Per-dimension impact of a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub treasury_impact: DimensionImpact,
    pub governance_impact: DimensionImpact,
    pub community_impact: DimensionImpact,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalAnalysisRequest {
    pub dao_address: String,
    pub proposal_id: String,
    pub title: String,
    /// Full proposal description; this is the text every sub-analysis reads.
    pub description: String,
    pub proposer: String,
    #[serde(default)]
    pub voting_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub voting_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionExecutionRequest {
    pub action_type: ActionType,
    pub dao_address: String,
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DaoHealthResponse {
    pub dao_address: String,
    pub overall_health_score: f32,
    pub governance_score: f32,
    pub financial_score: f32,
    pub community_score: f32,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub analysis_confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalAnalysisResponse {
    pub proposal_id: String,
    pub dao_address: String,
    /// Predicted probability of the proposal passing, in [0,1].
    pub prediction: f32,
    pub confidence: f32,
    pub summary: String,
    pub risk_assessment: RiskLevel,
    pub key_points: Vec<String>,
    pub recommendations: Vec<String>,
    pub sentiment_score: f32,
    pub impact_analysis: ImpactAnalysis,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummaryResponse {
    pub proposal_id: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub risk_level: RiskLevel,
    pub estimated_impact: String,
    pub voting_recommendation: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionExecutionResponse {
    pub action_id: String,
    pub action_type: ActionType,
    pub dao_address: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Typed rebalancing hint attached to a treasury analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RebalancingSuggestion {
    pub kind: String,
    pub action: String,
    pub description: String,
    pub priority: String,
    pub estimated_impact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreasuryAnalysisResponse {
    pub dao_address: String,
    pub total_value_usd: f64,
    pub asset_diversification_score: f32,
    pub risk_score: f32,
    pub liquidity_score: f32,
    pub top_holdings: Vec<AssetHolding>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub rebalancing_suggestions: Vec<RebalancingSuggestion>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopVoter {
    pub address: String,
    pub votes: u32,
    pub percentage: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GovernanceMetricsResponse {
    pub dao_address: String,
    pub total_proposals: u32,
    pub active_proposals: u32,
    pub average_voter_participation: f32,
    pub proposal_success_rate: f32,
    pub average_voting_duration: f32,
    pub top_voters: Vec<TopVoter>,
    pub governance_trends: serde_json::Value,
    pub predictions: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

/// One entry of the upcoming-proposal prediction list.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalPrediction {
    pub proposal_id: String,
    pub title: String,
    pub predicted_success_rate: f32,
    pub confidence: f32,
    pub estimated_impact: String,
    pub trending_topic: String,
    pub key_factors: Vec<String>,
    pub recommendation: String,
}
