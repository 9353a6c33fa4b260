// tests/api_actions.rs
//
// HTTP-level tests for the action execution endpoint: validation errors
// surface as client errors and never produce an execution record.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _;

use dao_governance_analyzer::api::{self, AppState};
use dao_governance_analyzer::config::AnalyzerConfig;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let state = AppState::from_config(&AnalyzerConfig::default());
    api::create_router(state)
}

async fn execute(payload: &Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/actions/execute")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /api/actions/execute");
    let resp = test_router().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn rebalance_with_bad_allocation_sum_is_rejected() {
    // 0.95 total: outside the 1.0 +/- 0.01 tolerance.
    let payload = json!({
        "action_type": "treasury_rebalance",
        "dao_address": "0xdao",
        "parameters": {
            "target_allocation": {"USDC": 0.5, "ETH": 0.3, "UNI": 0.15}
        }
    });
    let (status, v) = execute(&payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"]
        .as_str()
        .unwrap()
        .contains("must sum to 100%"));
}

#[tokio::test]
async fn rebalance_with_valid_allocation_executes() {
    let payload = json!({
        "action_type": "treasury_rebalance",
        "dao_address": "0xdao",
        "parameters": {
            "target_allocation": {"USDC": 0.5, "ETH": 0.3, "UNI": 0.2}
        }
    });
    let (status, v) = execute(&payload).await;
    assert_eq!(status, StatusCode::OK, "got {v}");
    assert_eq!(v["status"], json!("executed"));
    assert_eq!(v["gas_used"], json!(200_000));
    let hash = v["transaction_hash"].as_str().unwrap();
    assert!(hash.starts_with("0x") && hash.len() == 66);
    assert!(!v["action_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn proposal_execution_requires_proposal_id() {
    let payload = json!({
        "action_type": "proposal_execution",
        "dao_address": "0xdao",
    });
    let (status, v) = execute(&payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap().contains("Proposal ID"));
}

#[tokio::test]
async fn token_transfer_requires_parameters() {
    let payload = json!({
        "action_type": "token_transfer",
        "dao_address": "0xdao",
        "parameters": {"recipient": "0xabc"}
    });
    let (status, v) = execute(&payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn unknown_action_type_is_a_client_error() {
    let payload = json!({
        "action_type": "teleport_funds",
        "dao_address": "0xdao",
    });
    let (status, _) = execute(&payload).await;
    assert!(status.is_client_error(), "got {status}");
}
