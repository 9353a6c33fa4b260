//! Action dispatcher: maps an action-type tag to a mocked execution result.
//!
//! No chain I/O happens here: transaction hashes and gas numbers are
//! placeholders a real chain client would supply. The only logic that
//! belongs to this layer is parameter validation and per-type dispatch;
//! validation failures surface as `InvalidParameters` and execution never
//! proceeds.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AnalystError;
use crate::schemas::{ActionExecutionRequest, ActionExecutionResponse, ActionType};

/// Mock contract addresses; deployed contracts would replace these.
const PROPOSAL_EXECUTOR: &str = "0x1234567890123456789012345678901234567890";
const TREASURY_MANAGER: &str = "0x2345678901234567890123456789012345678901";

/// Allowed drift when checking that rebalance percentages sum to 1.
const ALLOCATION_TOLERANCE: f64 = 0.01;

const GAS_PROPOSAL_EXECUTION: u64 = 150_000;
const GAS_TREASURY_REBALANCE: u64 = 200_000;
const GAS_TOKEN_TRANSFER: u64 = 65_000;
const GAS_CONTRACT_INTERACTION: u64 = 100_000;

pub struct ActionDispatcher;

impl ActionDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, AnalystError> {
        let action_id = Uuid::new_v4().to_string();

        validate(request)?;

        let (contract, gas_used) = match request.action_type {
            ActionType::ProposalExecution => (Some(PROPOSAL_EXECUTOR), GAS_PROPOSAL_EXECUTION),
            ActionType::TreasuryRebalance => (Some(TREASURY_MANAGER), GAS_TREASURY_REBALANCE),
            ActionType::TokenTransfer => (None, GAS_TOKEN_TRANSFER),
            ActionType::ContractInteraction => {
                let gas = request
                    .parameters
                    .get("estimated_gas")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(GAS_CONTRACT_INTERACTION);
                (None, gas)
            }
        };

        if let Some(contract) = contract {
            debug!(contract, action_type = ?request.action_type, "dispatching to contract");
        }

        let now = Utc::now();
        let response = ActionExecutionResponse {
            transaction_hash: Some(mock_tx_hash(&action_id)),
            action_id,
            action_type: request.action_type,
            dao_address: request.dao_address.clone(),
            status: "executed".to_string(),
            execution_time: Some(now),
            gas_used: Some(gas_used),
            error_message: None,
            created_at: now,
        };

        info!(
            action_id = %response.action_id,
            action_type = ?response.action_type,
            status = %response.status,
            "action executed"
        );

        Ok(response)
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(request: &ActionExecutionRequest) -> Result<(), AnalystError> {
    if request.dao_address.trim().is_empty() {
        return Err(AnalystError::InvalidParameters(
            "DAO address is required".to_string(),
        ));
    }

    match request.action_type {
        ActionType::ProposalExecution => {
            if request.proposal_id.as_deref().unwrap_or("").is_empty() {
                return Err(AnalystError::InvalidParameters(
                    "Proposal ID is required for proposal execution".to_string(),
                ));
            }
        }
        ActionType::TreasuryRebalance => validate_rebalance(request)?,
        ActionType::TokenTransfer => {
            for param in ["recipient", "amount", "token_address"] {
                if !request.parameters.contains_key(param) {
                    return Err(AnalystError::InvalidParameters(format!(
                        "Parameter '{param}' is required for token transfer"
                    )));
                }
            }
        }
        ActionType::ContractInteraction => {
            for param in ["contract_address", "method"] {
                if !request.parameters.contains_key(param) {
                    return Err(AnalystError::InvalidParameters(format!(
                        "Parameter '{param}' is required for contract interaction"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_rebalance(request: &ActionExecutionRequest) -> Result<(), AnalystError> {
    let allocation = request
        .parameters
        .get("target_allocation")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            AnalystError::InvalidParameters(
                "Target allocation is required for treasury rebalancing".to_string(),
            )
        })?;

    let mut total = 0.0f64;
    for (symbol, value) in allocation {
        let share = value.as_f64().ok_or_else(|| {
            AnalystError::InvalidParameters(format!(
                "Allocation for '{symbol}' must be a number"
            ))
        })?;
        total += share;
    }

    if (total - 1.0).abs() > ALLOCATION_TOLERANCE {
        return Err(AnalystError::InvalidParameters(
            "Target allocation percentages must sum to 100%".to_string(),
        ));
    }
    Ok(())
}

/// Deterministic placeholder hash derived from the action id.
fn mock_tx_hash(action_id: &str) -> String {
    let digest = Sha256::digest(action_id.as_bytes());
    let mut out = String::with_capacity(2 + digest.len() * 2);
    out.push_str("0x");
    for b in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Gas estimate for an action, scaled by an optional complexity multiplier.
pub fn estimate_gas(action_type: ActionType, complexity: Option<f64>) -> u64 {
    let base = match action_type {
        ActionType::ProposalExecution => GAS_PROPOSAL_EXECUTION,
        ActionType::TreasuryRebalance => GAS_TREASURY_REBALANCE,
        ActionType::TokenTransfer => GAS_TOKEN_TRANSFER,
        ActionType::ContractInteraction => GAS_CONTRACT_INTERACTION,
    };
    (base as f64 * complexity.unwrap_or(1.0).max(0.0)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(action_type: ActionType) -> ActionExecutionRequest {
        ActionExecutionRequest {
            action_type,
            dao_address: "0xdao".to_string(),
            proposal_id: Some("prop-1".to_string()),
            parameters: serde_json::Map::new(),
            gas_limit: None,
        }
    }

    #[tokio::test]
    async fn proposal_execution_returns_hash_and_gas() {
        let d = ActionDispatcher::new();
        let out = d.execute(&request(ActionType::ProposalExecution)).await.unwrap();
        assert_eq!(out.status, "executed");
        assert_eq!(out.gas_used, Some(150_000));
        let hash = out.transaction_hash.unwrap();
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
    }

    #[tokio::test]
    async fn rebalance_rejects_bad_allocation_sum() {
        let d = ActionDispatcher::new();
        let mut req = request(ActionType::TreasuryRebalance);
        req.parameters.insert(
            "target_allocation".to_string(),
            json!({"USDC": 0.5, "ETH": 0.45}),
        );
        let err = d.execute(&req).await.unwrap_err();
        assert!(matches!(err, AnalystError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn rebalance_accepts_allocation_within_tolerance() {
        let d = ActionDispatcher::new();
        let mut req = request(ActionType::TreasuryRebalance);
        req.parameters.insert(
            "target_allocation".to_string(),
            json!({"USDC": 0.5, "ETH": 0.3, "UNI": 0.205}),
        );
        let out = d.execute(&req).await.unwrap();
        assert_eq!(out.status, "executed");
        assert_eq!(out.gas_used, Some(200_000));
    }

    #[tokio::test]
    async fn rebalance_requires_target_allocation() {
        let d = ActionDispatcher::new();
        let err = d
            .execute(&request(ActionType::TreasuryRebalance))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalystError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn token_transfer_requires_all_parameters() {
        let d = ActionDispatcher::new();
        let mut req = request(ActionType::TokenTransfer);
        req.parameters
            .insert("recipient".to_string(), json!("0xrecipient"));
        req.parameters.insert("amount".to_string(), json!(100));
        // token_address missing.
        let err = d.execute(&req).await.unwrap_err();
        assert!(matches!(err, AnalystError::InvalidParameters(_)));

        req.parameters
            .insert("token_address".to_string(), json!("0xtoken"));
        let out = d.execute(&req).await.unwrap();
        assert_eq!(out.gas_used, Some(65_000));
    }

    #[tokio::test]
    async fn contract_interaction_honors_estimated_gas() {
        let d = ActionDispatcher::new();
        let mut req = request(ActionType::ContractInteraction);
        req.parameters
            .insert("contract_address".to_string(), json!("0xc0ffee"));
        req.parameters.insert("method".to_string(), json!("sweep"));
        req.parameters
            .insert("estimated_gas".to_string(), json!(42_000));
        let out = d.execute(&req).await.unwrap();
        assert_eq!(out.gas_used, Some(42_000));
    }

    #[tokio::test]
    async fn empty_dao_address_is_rejected() {
        let d = ActionDispatcher::new();
        let mut req = request(ActionType::ProposalExecution);
        req.dao_address = "  ".to_string();
        let err = d.execute(&req).await.unwrap_err();
        assert!(matches!(err, AnalystError::InvalidParameters(_)));
    }

    #[test]
    fn gas_estimates_scale_with_complexity() {
        assert_eq!(estimate_gas(ActionType::TokenTransfer, None), 65_000);
        assert_eq!(
            estimate_gas(ActionType::TreasuryRebalance, Some(1.5)),
            300_000
        );
    }
}
