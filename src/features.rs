//! Feature source: the data-side collaborator.
//!
//! The analyzer only ever sees this trait; the shipped implementation is a
//! static mock standing in for a real chain-indexing service. Everything it
//! returns is produced fresh per request and treated as immutable.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalystError;
use crate::schemas::{AssetHolding, Portfolio};

/// 30-day activity counters.
#[derive(Debug, Clone, Copy)]
pub struct RecentActivity {
    pub proposals_last_30_days: u32,
    pub votes_last_30_days: u32,
    pub treasury_changes_last_30_days: u32,
}

/// On-chain governance configuration.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GovernanceParameters {
    pub quorum: f32,
    pub voting_period_hours: u32,
    pub execution_delay_hours: u32,
}

/// Everything the orchestrator and scorers need to know about one DAO.
#[derive(Debug, Clone)]
pub struct DaoContext {
    pub address: String,
    pub name: String,
    pub treasury_value: f64,
    pub total_members: u32,
    pub active_members: u32,
    pub total_proposals: u32,
    pub active_proposals: u32,
    pub passed_proposals: u32,
    pub failed_proposals: u32,
    pub avg_voter_participation: f32,
    pub avg_voting_duration_hours: f32,
    pub treasury: Portfolio,
    pub recent: RecentActivity,
    pub governance: GovernanceParameters,
    /// Contextual prediction inputs. A real feature service would compute
    /// these from history; the mock carries neutral values.
    pub proposer_reputation: f32,
    pub avg_sentiment: f32,
    pub financial_impact_score: f32,
}

/// Bridge state of a cross-chain position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Active,
    Pending,
}

/// One asset held on a remote chain.
#[derive(Debug, Clone, Serialize)]
pub struct BridgedAsset {
    pub symbol: String,
    pub address: String,
    pub balance: f64,
    pub value_usd: f64,
    pub bridge_status: BridgeStatus,
}

/// Assets grouped by chain name.
pub type CrossChainAssets = HashMap<String, Vec<BridgedAsset>>;

#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn dao_context(&self, dao_address: &str) -> Result<DaoContext, AnalystError>;
    async fn treasury(&self, dao_address: &str) -> Result<Portfolio, AnalystError>;
    async fn cross_chain_assets(&self, dao_address: &str)
        -> Result<CrossChainAssets, AnalystError>;
}

pub type DynFeatureSource = std::sync::Arc<dyn FeatureSource>;

/// Static fixture data shaped like a mid-size DAO. Used in every deployment
/// until a real indexer is wired in.
pub struct MockFeatureSource;

fn holding(symbol: &str, address: &str, balance: f64, value_usd: f64, percentage: f32) -> AssetHolding {
    AssetHolding {
        symbol: symbol.to_string(),
        address: Some(address.to_string()),
        balance,
        value_usd,
        percentage,
    }
}

fn mock_portfolio() -> Portfolio {
    Portfolio::new(vec![
        holding(
            "USDC",
            "0xA0b86a33E6441b8c4C8C8C8C8C8C8C8C8C8C8C8C8",
            1_000_000.0,
            1_000_000.0,
            0.40,
        ),
        holding(
            "ETH",
            "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6",
            400.0,
            800_000.0,
            0.32,
        ),
        holding(
            "UNI",
            "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984",
            5_000.0,
            400_000.0,
            0.16,
        ),
        holding(
            "AAVE",
            "0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9",
            2_000.0,
            300_000.0,
            0.12,
        ),
    ])
}

fn bridged(symbol: &str, address: &str, balance: f64, value_usd: f64, status: BridgeStatus) -> BridgedAsset {
    BridgedAsset {
        symbol: symbol.to_string(),
        address: address.to_string(),
        balance,
        value_usd,
        bridge_status: status,
    }
}

#[async_trait]
impl FeatureSource for MockFeatureSource {
    async fn dao_context(&self, dao_address: &str) -> Result<DaoContext, AnalystError> {
        Ok(DaoContext {
            address: dao_address.to_string(),
            name: "Sample DAO".to_string(),
            treasury_value: 2_500_000.0,
            total_members: 1_250,
            active_members: 850,
            total_proposals: 45,
            active_proposals: 3,
            passed_proposals: 32,
            failed_proposals: 10,
            avg_voter_participation: 0.68,
            avg_voting_duration_hours: 72.0,
            treasury: mock_portfolio(),
            recent: RecentActivity {
                proposals_last_30_days: 8,
                votes_last_30_days: 1_250,
                treasury_changes_last_30_days: 3,
            },
            governance: GovernanceParameters {
                quorum: 0.1,
                voting_period_hours: 168,
                execution_delay_hours: 24,
            },
            proposer_reputation: 0.5,
            avg_sentiment: 0.0,
            financial_impact_score: 0.5,
        })
    }

    async fn treasury(&self, _dao_address: &str) -> Result<Portfolio, AnalystError> {
        Ok(mock_portfolio())
    }

    async fn cross_chain_assets(
        &self,
        _dao_address: &str,
    ) -> Result<CrossChainAssets, AnalystError> {
        let mut chains = HashMap::new();
        chains.insert(
            "ethereum".to_string(),
            vec![
                bridged(
                    "ETH",
                    "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6",
                    200.0,
                    400_000.0,
                    BridgeStatus::Active,
                ),
                bridged(
                    "USDC",
                    "0xA0b86a33E6441b8c4C8C8C8C8C8C8C8C8C8C8C8C8",
                    500_000.0,
                    500_000.0,
                    BridgeStatus::Active,
                ),
            ],
        );
        chains.insert(
            "polygon".to_string(),
            vec![bridged(
                "MATIC",
                "0x0000000000000000000000000000000000001010",
                10_000.0,
                8_000.0,
                BridgeStatus::Active,
            )],
        );
        chains.insert(
            "arbitrum".to_string(),
            vec![bridged(
                "ARB",
                "0x912CE59144191C1204E64559FE8253a0e49E6548",
                5_000.0,
                5_000.0,
                BridgeStatus::Pending,
            )],
        );
        Ok(chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_portfolio_percentages_sum_to_one() {
        let p = MockFeatureSource.treasury("0xdao").await.unwrap();
        let sum: f32 = p.assets.iter().map(|a| a.percentage).sum();
        assert!((sum - 1.0).abs() < 0.01);
        assert!((p.total_value() - 2_500_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn mock_context_is_internally_consistent() {
        let ctx = MockFeatureSource.dao_context("0xdao").await.unwrap();
        assert!(ctx.passed_proposals + ctx.failed_proposals <= ctx.total_proposals);
        assert!(ctx.active_members <= ctx.total_members);
        assert_eq!(ctx.address, "0xdao");
    }

    #[tokio::test]
    async fn cross_chain_mock_covers_three_chains() {
        let chains = MockFeatureSource.cross_chain_assets("0xdao").await.unwrap();
        assert_eq!(chains.len(), 3);
        assert!(chains["arbitrum"]
            .iter()
            .any(|a| a.bridge_status == BridgeStatus::Pending));
    }
}
