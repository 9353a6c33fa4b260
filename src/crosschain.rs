//! Cross-chain asset analysis: per-chain breakdown plus bridge,
//! concentration, and illiquidity risk scoring.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AnalystError;
use crate::features::{BridgeStatus, BridgedAsset, CrossChainAssets, DynFeatureSource};
use crate::schemas::RiskLevel;
use crate::scoring::clamp01;

const STABLECOINS: [&str; 3] = ["USDC", "USDT", "DAI"];

/// A single position is "large" past this USD value for illiquidity checks.
const LARGE_POSITION_USD: f64 = 100_000.0;

#[derive(Debug, Clone, Serialize)]
pub struct CrossChainRiskAssessment {
    pub risk_score: f32,
    pub risk_factors: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossChainAssetsResponse {
    pub dao_address: String,
    pub total_cross_chain_value: f64,
    pub assets_by_chain: CrossChainAssets,
    pub chain_breakdown: HashMap<String, f64>,
    pub risk_assessment: CrossChainRiskAssessment,
    pub recommendations: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

pub struct CrossChainAnalyzer {
    features: DynFeatureSource,
}

impl CrossChainAnalyzer {
    pub fn new(features: DynFeatureSource) -> Self {
        Self { features }
    }

    pub async fn analyze(
        &self,
        dao_address: &str,
    ) -> Result<CrossChainAssetsResponse, AnalystError> {
        let chains = self.features.cross_chain_assets(dao_address).await?;

        let total: f64 = chains
            .values()
            .flat_map(|assets| assets.iter().map(|a| a.value_usd))
            .sum();

        let chain_breakdown: HashMap<String, f64> = chains
            .iter()
            .map(|(chain, assets)| {
                let value: f64 = assets.iter().map(|a| a.value_usd).sum();
                let share = if total > 0.0 { value / total } else { 0.0 };
                (chain.clone(), share)
            })
            .collect();

        let risk_assessment = assess_risk(&chains, total);
        let recommendations = recommendations(&chains, &risk_assessment);

        Ok(CrossChainAssetsResponse {
            dao_address: dao_address.to_string(),
            total_cross_chain_value: total,
            assets_by_chain: chains,
            chain_breakdown,
            risk_assessment,
            recommendations,
            last_updated: Utc::now(),
        })
    }
}

/// Chains visited in name order so factor lists are stable across runs.
fn sorted_chains(chains: &CrossChainAssets) -> Vec<(&String, &Vec<BridgedAsset>)> {
    let mut entries: Vec<_> = chains.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn assess_risk(chains: &CrossChainAssets, total: f64) -> CrossChainRiskAssessment {
    let mut factors = Vec::new();
    let mut score = 0.0f32;

    for (chain, assets) in sorted_chains(chains) {
        for asset in assets {
            if asset.bridge_status == BridgeStatus::Pending {
                factors.push(format!(
                    "Pending bridge transaction for {} on {}",
                    asset.symbol, chain
                ));
                score += 0.2;
            }
        }
    }

    if total > 0.0 {
        for (chain, assets) in sorted_chains(chains) {
            let chain_value: f64 = assets.iter().map(|a| a.value_usd).sum();
            if chain_value / total > 0.7 {
                factors.push(format!("High concentration on {chain} chain"));
                score += 0.3;
            }
        }
    }

    for (chain, assets) in sorted_chains(chains) {
        for asset in assets {
            if asset.value_usd > LARGE_POSITION_USD
                && !STABLECOINS.contains(&asset.symbol.as_str())
            {
                factors.push(format!(
                    "Large illiquid position in {} on {}",
                    asset.symbol, chain
                ));
                score += 0.1;
            }
        }
    }

    let score = clamp01(score);
    let risk_level = if score > 0.7 {
        RiskLevel::High
    } else if score > 0.3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    CrossChainRiskAssessment {
        risk_score: score,
        risk_factors: factors,
        risk_level,
    }
}

fn recommendations(
    chains: &CrossChainAssets,
    risk: &CrossChainRiskAssessment,
) -> Vec<String> {
    let mut recs = Vec::new();

    if risk.risk_score > 0.7 {
        recs.push("Consider consolidating assets to reduce cross-chain complexity".to_string());
    }

    let pending_count: usize = chains
        .values()
        .flat_map(|assets| assets.iter())
        .filter(|a| a.bridge_status == BridgeStatus::Pending)
        .count();
    if pending_count > 0 {
        recs.push(format!("Monitor {pending_count} pending bridge transactions"));
    }

    let chain_count = chains.len();
    if chain_count > 3 {
        recs.push("Consider reducing the number of chains to simplify management".to_string());
    } else if chain_count < 2 {
        recs.push(
            "Consider diversifying across multiple chains for better risk distribution"
                .to_string(),
        );
    }

    if recs.is_empty() {
        recs.push("Cross-chain allocation appears optimal".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::MockFeatureSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn mock_cross_chain_analysis_adds_up() {
        let analyzer = CrossChainAnalyzer::new(Arc::new(MockFeatureSource));
        let out = analyzer.analyze("0xdao").await.unwrap();

        // 900k on ethereum + 8k polygon + 5k arbitrum.
        assert!((out.total_cross_chain_value - 913_000.0).abs() < 1e-6);
        let shares: f64 = out.chain_breakdown.values().sum();
        assert!((shares - 1.0).abs() < 1e-9);

        // Pending ARB (+0.2), ethereum concentration (+0.3), large ETH
        // position (+0.1): 0.6 total, medium band.
        assert!((out.risk_assessment.risk_score - 0.6).abs() < 1e-6);
        assert_eq!(out.risk_assessment.risk_level, RiskLevel::Medium);
        assert_eq!(out.risk_assessment.risk_factors.len(), 3);

        assert_eq!(
            out.recommendations,
            vec!["Monitor 1 pending bridge transactions"]
        );
    }

    #[tokio::test]
    async fn empty_cross_chain_set_is_low_risk() {
        let risk = assess_risk(&HashMap::new(), 0.0);
        assert_eq!(risk.risk_level, RiskLevel::Low);
        assert!(risk.risk_factors.is_empty());

        let recs = recommendations(&HashMap::new(), &risk);
        // Fewer than two chains: diversification hint fires.
        assert!(recs[0].contains("diversifying across multiple chains"));
    }
}
