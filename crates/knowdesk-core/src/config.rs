//! KnowDesk configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowDeskConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl KnowDeskConfig {
    /// Load config from the default path (~/.knowdesk/config.toml),
    /// or `KNOWDESK_CONFIG` when set. Missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("KNOWDESK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::KnowDeskError::Config(format!("Failed to read config: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::KnowDeskError::Config(format!("Failed to parse config: {e}"))
        })?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::error::KnowDeskError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the KnowDesk home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".knowdesk")
    }
}

/// Upstream LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_endpoint() -> String { "https://open.bigmodel.cn/api/paas/v4".into() }
fn default_model() -> String { "glm-4-flash".into() }
fn default_temperature() -> f32 { 0.5 }
fn default_max_tokens() -> u32 { 2000 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: config value first, then env vars.
    pub fn resolve_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        ["KNOWDESK_API_KEY", "ZHIPU_API_KEY"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .unwrap_or_default()
    }
}

/// Retrieval and context-assembly tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Total character budget for the assembled context.
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
    /// Documents longer than this (chars) go through paragraph selection.
    #[serde(default = "default_long_doc_threshold")]
    pub long_doc_threshold: usize,
    /// Paragraphs with trimmed length at or below this are dropped as noise.
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,
    /// Maximum paragraphs kept per long document.
    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,
}

fn default_context_budget() -> usize { 3000 }
fn default_long_doc_threshold() -> usize { 1500 }
fn default_min_paragraph_chars() -> usize { 20 }
fn default_max_paragraphs() -> usize { 5 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            context_budget: default_context_budget(),
            long_doc_threshold: default_long_doc_threshold(),
            min_paragraph_chars: default_min_paragraph_chars(),
            max_paragraphs: default_max_paragraphs(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding knowledge_bases.json, chats.json and contents/.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    KnowDeskConfig::home_dir().join("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = KnowDeskConfig::default();
        assert_eq!(cfg.retrieval.context_budget, 3000);
        assert_eq!(cfg.retrieval.long_doc_threshold, 1500);
        assert_eq!(cfg.llm.model, "glm-4-flash");
        assert_eq!(cfg.gateway.port, 3000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: KnowDeskConfig = toml::from_str(
            r#"
            [llm]
            model = "glm-4-plus"
            [retrieval]
            context_budget = 4000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.llm.model, "glm-4-plus");
        assert_eq!(cfg.llm.endpoint, "https://open.bigmodel.cn/api/paas/v4");
        assert_eq!(cfg.retrieval.context_budget, 4000);
        assert_eq!(cfg.retrieval.max_paragraphs, 5);
    }
}
