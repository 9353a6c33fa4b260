//! Treasury analysis: diversification/risk/liquidity scores plus risk
//! factors and typed rebalancing suggestions.
//!
//! Unlike the DAO health pillar, an empty portfolio here is a hard "no
//! data" answer; that is the documented contract for this endpoint.

use chrono::Utc;

use crate::error::AnalystError;
use crate::fallback;
use crate::features::DynFeatureSource;
use crate::schemas::{Portfolio, RebalancingSuggestion, TreasuryAnalysisResponse};
use crate::scoring;

pub struct TreasuryAnalyzer {
    features: DynFeatureSource,
}

impl TreasuryAnalyzer {
    pub fn new(features: DynFeatureSource) -> Self {
        Self { features }
    }

    pub async fn analyze(
        &self,
        dao_address: &str,
    ) -> Result<TreasuryAnalysisResponse, AnalystError> {
        let portfolio = self.features.treasury(dao_address).await?;

        let diversification = scoring::diversification(&portfolio)?;
        let risk = scoring::treasury_risk(&portfolio);
        let liquidity = scoring::liquidity(&portfolio);

        Ok(TreasuryAnalysisResponse {
            dao_address: dao_address.to_string(),
            total_value_usd: portfolio.total_value(),
            asset_diversification_score: diversification,
            risk_score: risk,
            liquidity_score: liquidity,
            top_holdings: portfolio.top_holdings(5),
            risk_factors: identify_risks(&portfolio, diversification, risk, liquidity),
            recommendations: fallback::treasury_recommendations(diversification, risk, liquidity),
            rebalancing_suggestions: rebalancing_suggestions(diversification, risk, liquidity),
            last_updated: Utc::now(),
        })
    }
}

fn identify_risks(
    portfolio: &Portfolio,
    diversification: f32,
    _risk: f32,
    liquidity: f32,
) -> Vec<String> {
    let mut factors = Vec::new();

    if diversification < 0.3 {
        factors.push("High asset concentration - consider diversifying holdings".to_string());
    }
    if liquidity < 0.6 {
        factors.push("Low liquidity - ensure sufficient liquid assets".to_string());
    }
    if portfolio.total_value() < 100_000.0 {
        factors.push("Small treasury size - consider growth strategies".to_string());
    }

    if factors.is_empty() {
        factors.push("No significant risks identified".to_string());
    }
    factors.truncate(5);
    factors
}

fn rebalancing_suggestions(
    diversification: f32,
    risk: f32,
    liquidity: f32,
) -> Vec<RebalancingSuggestion> {
    let mut suggestions = Vec::new();

    if diversification < 0.4 {
        suggestions.push(RebalancingSuggestion {
            kind: "diversification".to_string(),
            action: "Increase asset diversity".to_string(),
            description: "Consider adding more assets to reduce concentration risk".to_string(),
            priority: "high".to_string(),
            estimated_impact: "Reduce concentration risk by 30%".to_string(),
        });
    }
    if risk > 0.7 {
        suggestions.push(RebalancingSuggestion {
            kind: "risk_management".to_string(),
            action: "Increase stablecoin allocation".to_string(),
            description: "Allocate more funds to stablecoins to reduce volatility".to_string(),
            priority: "high".to_string(),
            estimated_impact: "Reduce risk score by 20%".to_string(),
        });
    }
    if liquidity < 0.6 {
        suggestions.push(RebalancingSuggestion {
            kind: "liquidity".to_string(),
            action: "Maintain liquid reserves".to_string(),
            description: "Ensure sufficient liquid assets for operations".to_string(),
            priority: "medium".to_string(),
            estimated_impact: "Improve liquidity score by 25%".to_string(),
        });
    }

    suggestions
}
