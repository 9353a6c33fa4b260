use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::actions::ActionDispatcher;
use crate::analyze::{build_generator, AnalysisOrchestrator};
use crate::config::AnalyzerConfig;
use crate::crosschain::{CrossChainAnalyzer, CrossChainAssetsResponse};
use crate::error::AnalystError;
use crate::features::{DynFeatureSource, MockFeatureSource};
use crate::health::HealthAnalyzer;
use crate::predict::OutcomePredictor;
use crate::predictions;
use crate::schemas::{
    ActionExecutionRequest, ActionExecutionResponse, DaoHealthResponse,
    GovernanceMetricsResponse, ProposalAnalysisRequest, ProposalAnalysisResponse,
    ProposalPrediction, ProposalSummaryResponse, TreasuryAnalysisResponse,
};
use crate::store::{AnalysisStore, StoredAnalysis};
use crate::summary;
use crate::treasury::TreasuryAnalyzer;

/// Hard cap on the predictions list a single request may ask for.
const MAX_PREDICTIONS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    features: DynFeatureSource,
    orchestrator: Arc<AnalysisOrchestrator>,
    health: Arc<HealthAnalyzer>,
    treasury: Arc<TreasuryAnalyzer>,
    crosschain: Arc<CrossChainAnalyzer>,
    dispatcher: Arc<ActionDispatcher>,
    store: Arc<AnalysisStore>,
}

impl AppState {
    /// Wire the default service graph: mock feature source, generator per
    /// config, outcome model trained once here and shared read-only.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let generator = build_generator(&config.ai);
        let predictor = Arc::new(OutcomePredictor::train());
        let orchestrator = AnalysisOrchestrator::new(generator, predictor);
        Self::assemble(Arc::new(MockFeatureSource), orchestrator)
    }

    /// Assembly seam for tests that swap the feature source or generator.
    pub fn assemble(features: DynFeatureSource, orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            health: Arc::new(HealthAnalyzer::new(features.clone())),
            treasury: Arc::new(TreasuryAnalyzer::new(features.clone())),
            crosschain: Arc::new(CrossChainAnalyzer::new(features.clone())),
            dispatcher: Arc::new(ActionDispatcher::new()),
            store: Arc::new(AnalysisStore::with_capacity(2000)),
            features,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/dao/{address}/health", get(dao_health))
        .route("/api/proposals/analyze", post(analyze_proposal))
        .route("/api/proposals/{id}/summary", get(proposal_summary))
        .route("/api/actions/execute", post(execute_action))
        .route("/api/treasury/{address}/analysis", get(treasury_analysis))
        .route("/api/governance/{address}/metrics", get(governance_metrics))
        .route(
            "/api/predictions/{address}/proposals",
            get(proposal_predictions),
        )
        .route("/api/cross-chain/{address}/assets", get(cross_chain_assets))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "AI-driven DAO analyst",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn dao_health(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<DaoHealthResponse>, AnalystError> {
    Ok(Json(state.health.analyze(&address).await?))
}

async fn analyze_proposal(
    State(state): State<AppState>,
    Json(req): Json<ProposalAnalysisRequest>,
) -> Result<Json<ProposalAnalysisResponse>, AnalystError> {
    if req.description.trim().is_empty() {
        return Err(AnalystError::InvalidParameters(
            "Proposal description must not be empty".to_string(),
        ));
    }
    if req.proposal_id.trim().is_empty() {
        return Err(AnalystError::InvalidParameters(
            "Proposal ID is required".to_string(),
        ));
    }

    let ctx = state.features.dao_context(&req.dao_address).await?;
    let analysis = state
        .orchestrator
        .analyze_proposal(&req.description, &ctx)
        .await;

    let response = ProposalAnalysisResponse {
        proposal_id: req.proposal_id.clone(),
        dao_address: req.dao_address.clone(),
        prediction: analysis.prediction.probability,
        confidence: analysis.confidence,
        summary: analysis.summary,
        risk_assessment: analysis.risk.risk_level,
        key_points: analysis.key_points,
        recommendations: analysis.recommendations,
        sentiment_score: analysis.sentiment_score,
        impact_analysis: analysis.impact,
        created_at: chrono::Utc::now(),
    };

    state.store.insert(
        &req.proposal_id,
        StoredAnalysis {
            title: req.title.clone(),
            analysis: response.clone(),
        },
    );

    Ok(Json(response))
}

async fn proposal_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ProposalSummaryResponse> {
    match state.store.get(&id) {
        Some(stored) => Json(summary::summary_for(&id, &stored)),
        None => Json(summary::unknown_proposal_summary(&id)),
    }
}

async fn execute_action(
    State(state): State<AppState>,
    Json(req): Json<ActionExecutionRequest>,
) -> Result<Json<ActionExecutionResponse>, AnalystError> {
    Ok(Json(state.dispatcher.execute(&req).await?))
}

async fn treasury_analysis(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TreasuryAnalysisResponse>, AnalystError> {
    Ok(Json(state.treasury.analyze(&address).await?))
}

async fn governance_metrics(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<GovernanceMetricsResponse>, AnalystError> {
    Ok(Json(state.health.governance_metrics(&address).await?))
}

#[derive(Debug, Deserialize)]
struct PredictionsQuery {
    limit: Option<usize>,
}

async fn proposal_predictions(
    Path(_address): Path<String>,
    Query(query): Query<PredictionsQuery>,
) -> Json<Vec<ProposalPrediction>> {
    let limit = query.limit.unwrap_or(10).min(MAX_PREDICTIONS);
    Json(predictions::upcoming_proposals(limit))
}

async fn cross_chain_assets(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<CrossChainAssetsResponse>, AnalystError> {
    Ok(Json(state.crosschain.analyze(&address).await?))
}
