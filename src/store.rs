//! In-memory store of completed proposal analyses.
//!
//! Backs the proposal-summary endpoint; capacity-bounded so a long-running
//! instance cannot grow without limit. Nothing here survives a restart.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::schemas::ProposalAnalysisResponse;

#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub title: String,
    pub analysis: ProposalAnalysisResponse,
}

#[derive(Debug)]
pub struct AnalysisStore {
    inner: Mutex<State>,
    cap: usize,
}

#[derive(Debug, Default)]
struct State {
    order: VecDeque<String>,
    by_id: HashMap<String, StoredAnalysis>,
}

impl AnalysisStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(State::default()),
            cap: cap.max(1).min(10_000),
        }
    }

    pub fn insert(&self, proposal_id: &str, entry: StoredAnalysis) {
        let mut state = self.inner.lock().expect("analysis store poisoned");
        if state.by_id.insert(proposal_id.to_string(), entry).is_some() {
            // Re-analysis of a known proposal: refresh its eviction slot.
            state.order.retain(|id| id != proposal_id);
        }
        state.order.push_back(proposal_id.to_string());
        while state.order.len() > self.cap {
            if let Some(evicted) = state.order.pop_front() {
                state.by_id.remove(&evicted);
            }
        }
    }

    pub fn get(&self, proposal_id: &str) -> Option<StoredAnalysis> {
        self.inner
            .lock()
            .expect("analysis store poisoned")
            .by_id
            .get(proposal_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("analysis store poisoned").by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{
        DimensionImpact, ImpactAnalysis, ProposalAnalysisResponse, RiskLevel,
    };
    use chrono::Utc;

    fn entry(id: &str) -> StoredAnalysis {
        StoredAnalysis {
            title: format!("Proposal {id}"),
            analysis: ProposalAnalysisResponse {
                proposal_id: id.to_string(),
                dao_address: "0xdao".to_string(),
                prediction: 0.6,
                confidence: 0.7,
                summary: "A summary.".to_string(),
                risk_assessment: RiskLevel::Medium,
                key_points: vec!["point".to_string()],
                recommendations: vec!["rec".to_string()],
                sentiment_score: 0.1,
                impact_analysis: ImpactAnalysis {
                    treasury_impact: DimensionImpact {
                        score: 0.5,
                        description: "d".to_string(),
                    },
                    governance_impact: DimensionImpact {
                        score: 0.5,
                        description: "d".to_string(),
                    },
                    community_impact: DimensionImpact {
                        score: 0.5,
                        description: "d".to_string(),
                    },
                },
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let store = AnalysisStore::with_capacity(10);
        store.insert("p1", entry("p1"));
        let got = store.get("p1").unwrap();
        assert_eq!(got.analysis.proposal_id, "p1");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let store = AnalysisStore::with_capacity(2);
        store.insert("p1", entry("p1"));
        store.insert("p2", entry("p2"));
        store.insert("p3", entry("p3"));
        assert_eq!(store.len(), 2);
        assert!(store.get("p1").is_none());
        assert!(store.get("p3").is_some());
    }

    #[test]
    fn reinsert_refreshes_eviction_slot() {
        let store = AnalysisStore::with_capacity(2);
        store.insert("p1", entry("p1"));
        store.insert("p2", entry("p2"));
        store.insert("p1", entry("p1"));
        store.insert("p3", entry("p3"));
        // p2 was the stalest entry after p1's refresh.
        assert!(store.get("p2").is_none());
        assert!(store.get("p1").is_some());
    }
}
