//! Text-generation adapter: provider abstraction over the external LLM API.
//!
//! Providers are deliberately dumb pipes: they take a system role + user
//! content and return raw text, or one of the recoverable errors
//! (`Unavailable` / `Timeout` / `Malformed`). All parsing and fallback
//! policy lives in the orchestrator, not here.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AiConfig;
use crate::error::AnalystError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One generation call with a sub-operation-specific system role.
    async fn generate(
        &self,
        role: &str,
        content: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AnalystError>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynTextGenerator = Arc<dyn TextGenerator>;

/// Factory: build a generator according to config and environment.
///
/// * `AI_TEST_MODE=mock` returns the scripted mock regardless of config.
/// * Disabled config returns [`DisabledGenerator`].
/// * Otherwise the configured provider is built; unknown providers degrade
///   to disabled with a warning.
pub fn build_generator(config: &AiConfig) -> DynTextGenerator {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockGenerator::canned());
    }

    if !config.enabled {
        return Arc::new(DisabledGenerator);
    }

    match config.provider.as_str() {
        "openai" => Arc::new(OpenAiGenerator::new(
            config.resolved_api_key(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )),
        other => {
            warn!(provider = other, "unknown text generator provider, AI disabled");
            Arc::new(DisabledGenerator)
        }
    }
}

// ------------------------------------------------------------
// OpenAI-compatible provider
// ------------------------------------------------------------

pub struct OpenAiGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String, call_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("dao-governance-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(call_timeout)
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        role: &str,
        content: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AnalystError> {
        if self.api_key.is_empty() {
            return Err(AnalystError::Unavailable);
        }

        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: role,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature,
            max_tokens,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalystError::Timeout
                } else {
                    AnalystError::Unavailable
                }
            })?;

        if !resp.status().is_success() {
            return Err(AnalystError::Unavailable);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AnalystError::Malformed(e.to_string()))?;
        let text = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AnalystError::Malformed("empty completion".to_string()));
        }
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Disabled + mock providers
// ------------------------------------------------------------

/// Always unavailable; forces every sub-analysis onto its fallback.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _role: &str,
        _content: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, AnalystError> {
        Err(AnalystError::Unavailable)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Scripted generator for tests and local runs. Replies are routed by a
/// substring match against the system role, so concurrent sub-analyses
/// stay deterministic regardless of completion order.
#[derive(Default)]
pub struct MockGenerator {
    replies: Vec<(String, Result<String, RecoverableKind>)>,
    /// Optional FIFO script consumed before routed replies; useful for
    /// single-call tests.
    queue: Mutex<VecDeque<String>>,
}

/// Mock-scriptable failure kinds (a `Result` in `replies` can't carry the
/// non-Clone `AnalystError` directly).
#[derive(Debug, Clone, Copy)]
pub enum RecoverableKind {
    Unavailable,
    Timeout,
    Malformed,
}

impl RecoverableKind {
    fn to_error(self) -> AnalystError {
        match self {
            Self::Unavailable => AnalystError::Unavailable,
            Self::Timeout => AnalystError::Timeout,
            Self::Malformed => AnalystError::Malformed("scripted".to_string()),
        }
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `reply` to any call whose role contains `role_contains`.
    pub fn with_reply(mut self, role_contains: &str, reply: &str) -> Self {
        self.replies
            .push((role_contains.to_string(), Ok(reply.to_string())));
        self
    }

    /// Route a scripted failure the same way.
    pub fn with_failure(mut self, role_contains: &str, kind: RecoverableKind) -> Self {
        self.replies.push((role_contains.to_string(), Err(kind)));
        self
    }

    /// Push a one-shot reply consumed by the next call regardless of role.
    pub fn push_next(&self, reply: &str) {
        self.queue
            .lock()
            .expect("mock queue poisoned")
            .push_back(reply.to_string());
    }

    /// Valid canned replies for every sub-operation; good enough to run the
    /// full primary path end-to-end without a network.
    pub fn canned() -> Self {
        Self::new()
            .with_reply("sentiment analysis expert", "0.4")
            .with_reply("summarizing DAO governance proposals",
                "This proposal reallocates part of the treasury into diversified yield strategies. It aims to reduce concentration risk while keeping operational liquidity intact.")
            .with_reply(
                "risk assessment expert",
                r#"{"risk_level": "medium", "risk_factors": ["Treasury exposure", "Execution complexity"], "risk_score": 0.45}"#,
            )
            .with_reply(
                "proposal impacts",
                r#"{"treasury_impact": {"score": 0.6, "description": "Shifts a third of holdings"}, "governance_impact": {"score": 0.4, "description": "No rule changes"}, "community_impact": {"score": 0.5, "description": "Broadly supported"}}"#,
            )
            .with_reply(
                "key points",
                r#"["Reallocates treasury funds", "Targets diversified yield", "Keeps liquidity reserve"]"#,
            )
            .with_reply(
                "actionable recommendations",
                "Review the allocation targets before voting\nConfirm the liquidity reserve is sufficient",
            )
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        role: &str,
        _content: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, AnalystError> {
        if let Some(next) = self
            .queue
            .lock()
            .expect("mock queue poisoned")
            .pop_front()
        {
            return Ok(next);
        }
        for (needle, reply) in &self.replies {
            if role.contains(needle.as_str()) {
                return match reply {
                    Ok(text) => Ok(text.clone()),
                    Err(kind) => Err(kind.to_error()),
                };
            }
        }
        Err(AnalystError::Unavailable)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
