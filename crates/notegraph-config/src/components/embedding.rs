//! Embedding provider configuration

use serde::{Deserialize, Serialize};

/// Embedding provider type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Ollama HTTP API (local or remote)
    #[default]
    Ollama,
    /// Deterministic offline provider
    Mock,
}

impl EmbeddingProviderType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

/// Device hint forwarded to providers that can honour it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Let the provider decide
    #[default]
    Auto,
    /// Force CPU inference
    Cpu,
    /// Prefer an accelerator
    Gpu,
}

/// `[embedding]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider backend
    #[serde(default)]
    pub provider: EmbeddingProviderType,
    /// Model name passed to the provider
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for HTTP providers
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Vector dimension every embedding must have
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Device hint
    #[serde(default)]
    pub device: Device,
    /// SIMILAR edges are created for cosine scores strictly above this value
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Number of texts handled per chunk before results are collected
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Per-request timeout for HTTP providers
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first failed request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_dimension() -> usize {
    768
}

fn default_similarity_threshold() -> f32 {
    0.8
}

fn default_chunk_size() -> usize {
    256
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            model: default_model(),
            endpoint: default_endpoint(),
            dimension: default_dimension(),
            device: Device::default(),
            similarity_threshold: default_similarity_threshold(),
            chunk_size: default_chunk_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}
