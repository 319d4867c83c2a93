//! Configuration loading and validation for GearOracle.
//!
//! Loads configuration from `gearoracle.toml` with environment variable
//! overrides. Validates all settings at startup. The resulting `AppConfig`
//! is constructed once at process start and passed by reference to each
//! component — never held as ambient global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `gearoracle.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service identification
    #[serde(default)]
    pub service: ServiceConfig,

    /// Embedding/chat provider configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Vector store configuration
    #[serde(default)]
    pub pinecone: PineconeConfig,

    /// Knowledge attestation configuration
    #[serde(default)]
    pub attestation: AttestationConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Document ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("service", &self.service)
            .field("openai", &self.openai)
            .field("pinecone", &self.pinecone)
            .field("attestation", &self.attestation)
            .field("gateway", &self.gateway)
            .field("ingest", &self.ingest)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_service_name() -> String {
    "GearOracle Chat Service".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (usually supplied via OPENAI_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_chat_temperature() -> f32 {
    0.2
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            chat_temperature: default_chat_temperature(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("embedding_model", &self.embedding_model)
            .field("chat_model", &self.chat_model)
            .field("chat_temperature", &self.chat_temperature)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// API key (usually supplied via PINECONE_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Index endpoint host, e.g. "https://gear-manuals-abc123.svc.pinecone.io"
    #[serde(default)]
    pub index_host: String,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_index_name() -> String {
    "gear-manuals".into()
}
fn default_top_k() -> usize {
    5
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_host: String::new(),
            index_name: default_index_name(),
            top_k: default_top_k(),
        }
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &redact(&self.api_key))
            .field("index_host", &self.index_host)
            .field("index_name", &self.index_name)
            .field("top_k", &self.top_k)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AttestationConfig {
    /// Hex-encoded secp256k1 private key used to sign attestations.
    /// A missing or malformed key is a startup failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for AttestationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationConfig")
            .field("private_key", &redact(&self.private_key))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Target words per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Word overlap between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks per embedding/upsert batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_chunk_size() -> usize {
    400
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_batch_size() -> usize {
    100
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            batch_size: default_batch_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (`gearoracle.toml` in the
    /// working directory), applying environment variable overrides:
    ///
    /// - `OPENAI_API_KEY`
    /// - `PINECONE_API_KEY`, `PINECONE_INDEX_HOST`, `PINECONE_INDEX_NAME`
    /// - `ATTESTATION_PRIVATE_KEY`
    /// - `GEARORACLE_HOST`, `GEARORACLE_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("gearoracle.toml"))
    }

    /// Load configuration from a specific file path plus env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.pinecone.api_key = Some(key);
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            self.pinecone.index_host = host;
        }
        if let Ok(name) = std::env::var("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = name;
        }
        if let Ok(key) = std::env::var("ATTESTATION_PRIVATE_KEY") {
            self.attestation.private_key = Some(key);
        }
        if let Ok(host) = std::env::var("GEARORACLE_HOST") {
            self.gateway.host = host;
        }
        if let Ok(port) = std::env::var("GEARORACLE_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.chat_temperature < 0.0 || self.openai.chat_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "openai.chat_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.pinecone.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "pinecone.top_k must be at least 1".into(),
            ));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(ConfigError::ValidationError(
                "ingest.chunk_overlap must be smaller than ingest.chunk_size".into(),
            ));
        }
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "ingest.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for `gearoracle init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            openai: OpenAiConfig::default(),
            pinecone: PineconeConfig::default(),
            attestation: AttestationConfig::default(),
            gateway: GatewayConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.pinecone.top_k, 5);
        assert_eq!(config.ingest.chunk_size, 400);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.openai.chat_model, config.openai.chat_model);
        assert_eq!(parsed.pinecone.index_name, config.pinecone.index_name);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            openai: OpenAiConfig {
                chat_temperature: 5.0,
                ..OpenAiConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let config = AppConfig {
            ingest: IngestConfig {
                chunk_size: 50,
                chunk_overlap: 50,
                batch_size: 100,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/gearoracle.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn secrets_redacted_in_debug() {
        let config = AppConfig {
            openai: OpenAiConfig {
                api_key: Some("sk-very-secret".into()),
                ..OpenAiConfig::default()
            },
            attestation: AttestationConfig {
                private_key: Some("deadbeef".into()),
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[pinecone]
index_name = "accord-manuals"
top_k = 3

[gateway]
port = 9000
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pinecone.index_name, "accord-manuals");
        assert_eq!(config.pinecone.top_k, 3);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    }
}
