//! Service configuration: TOML file + environment overrides.
//!
//! `config/analyzer.toml` shape:
//!
//! ```toml
//! [ai]
//! enabled = true
//! provider = "openai"        # "openai" | "disabled"
//! model = "gpt-3.5-turbo"
//! api_key = "ENV"            # "ENV" reads OPENAI_API_KEY
//! timeout_secs = 10
//!
//! [server]
//! bind = "0.0.0.0:8000"
//! ```
//!
//! A missing file yields defaults (AI disabled, fallbacks only), so the
//! service always boots.

use std::{env, fs, path::Path};

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from OPENAI_API_KEY at build time.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Per-call deadline for generator requests.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    /// Resolve the "ENV" placeholder. An unset variable resolves to an empty
    /// key, which the provider treats as unavailable.
    pub fn resolved_api_key(&self) -> String {
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            self.api_key.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AnalyzerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AnalyzerConfig = toml::from_str(&data)?;
        cfg.ai.provider = cfg.ai.provider.to_lowercase();
        Ok(cfg)
    }

    /// Load from `ANALYZER_CONFIG_PATH` or the default path; fall back to
    /// defaults when the file is absent or unparsable.
    pub fn load() -> Self {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(%path, error = %err, "config not loaded, using defaults");
                Self::default()
            }
        }
    }
}
