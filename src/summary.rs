//! Derived proposal summaries: impact descriptions and voting guidance
//! computed from a stored analysis.

use chrono::Utc;

use crate::schemas::{ImpactAnalysis, ProposalSummaryResponse, RiskLevel};
use crate::store::StoredAnalysis;

/// Collapse per-dimension scores into one readable line.
pub fn impact_description(impact: &ImpactAnalysis) -> String {
    let dims = [
        ("treasury", impact.treasury_impact.score),
        ("governance", impact.governance_impact.score),
        ("community", impact.community_impact.score),
    ];
    let parts: Vec<String> = dims
        .iter()
        .map(|(name, score)| {
            let level = if *score > 0.7 {
                "High"
            } else if *score > 0.4 {
                "Medium"
            } else {
                "Low"
            };
            format!("{level} {name} impact")
        })
        .collect();
    parts.join("; ")
}

/// Voting guidance from prediction, risk band, and sentiment, in priority
/// order: strong yes, yes, no, caution, neutral.
pub fn voting_recommendation(prediction: f32, risk_level: RiskLevel, sentiment: f32) -> String {
    if prediction > 0.7 && sentiment > 0.3 {
        "Strong recommendation to vote YES - high success probability with positive sentiment"
    } else if prediction > 0.6 && risk_level == RiskLevel::Low {
        "Recommend voting YES - good success probability with low risk"
    } else if prediction < 0.4 || sentiment < -0.3 {
        "Recommend voting NO - low success probability or negative sentiment"
    } else if risk_level == RiskLevel::High {
        "Exercise caution - high risk proposal, consider additional research"
    } else {
        "Neutral recommendation - consider all factors carefully"
    }
    .to_string()
}

/// Build the summary response for a stored analysis.
pub fn summary_for(proposal_id: &str, stored: &StoredAnalysis) -> ProposalSummaryResponse {
    let a = &stored.analysis;
    ProposalSummaryResponse {
        proposal_id: proposal_id.to_string(),
        title: stored.title.clone(),
        summary: a.summary.clone(),
        key_points: a.key_points.clone(),
        risk_level: a.risk_assessment,
        estimated_impact: impact_description(&a.impact_analysis),
        voting_recommendation: voting_recommendation(
            a.prediction,
            a.risk_assessment,
            a.sentiment_score,
        ),
        created_at: Utc::now(),
    }
}

/// Canned summary for proposals that were never analyzed here.
pub fn unknown_proposal_summary(proposal_id: &str) -> ProposalSummaryResponse {
    ProposalSummaryResponse {
        proposal_id: proposal_id.to_string(),
        title: "Sample Governance Proposal".to_string(),
        summary: "This proposal aims to improve the DAO's governance structure by implementing new voting mechanisms and treasury management strategies.".to_string(),
        key_points: vec![
            "Introduces new voting mechanism".to_string(),
            "Updates treasury allocation strategy".to_string(),
            "Improves governance transparency".to_string(),
        ],
        risk_level: RiskLevel::Medium,
        estimated_impact: "Medium impact on governance and treasury management".to_string(),
        voting_recommendation: "Consider voting YES after reviewing detailed analysis".to_string(),
        created_at: Utc::now(),
    }
}
