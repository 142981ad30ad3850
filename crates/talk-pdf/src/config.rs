//! Configuration for talk-pdf

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::{retriever::DEFAULT_TOP_K, DistanceMetric};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "talk-pdf.toml";

/// Dotenv file picked up from the working directory
pub const DOTENV_FILE: &str = ".env";

/// Environment variable holding the hosted API key
pub const API_KEY_ENV: &str = "EURI_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Hosted inference API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Text chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl RagConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist. Without one,
    /// `talk-pdf.toml` in the working directory is used if present.
    /// Environment overrides are applied last; variables missing from the
    /// process environment are looked up in `.env`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match file {
            Some(file) => {
                tracing::info!("Loading configuration from {}", file.display());
                let raw = std::fs::read_to_string(&file).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", file.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        let dotenv = read_dotenv(Path::new(DOTENV_FILE));
        config.apply_env_overrides(|key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        });
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = non_empty("EURI_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(model) = non_empty("TALK_PDF_CHAT_MODEL") {
            self.api.chat_model = model;
        }
        if let Some(model) = non_empty("TALK_PDF_EMBEDDING_MODEL") {
            self.api.embedding_model = model;
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if self.chunking.chunk_overlap > self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be greater than 0".to_string()));
        }
        if self.api.embed_batch_size == 0 {
            return Err(Error::Config("embed_batch_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Variables from a dotenv file; empty when the file is missing or unreadable
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return HashMap::new(),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let mut vars = HashMap::new();
    for entry in entries {
        match entry {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(e) => tracing::warn!("Skipping line in {}: {}", path.display(), e),
        }
    }
    tracing::debug!("Read {} variables from {}", vars.len(), path.display());
    vars
}

/// Hosted inference API configuration (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Bearer token; usually supplied through `EURI_API_KEY`
    pub api_key: Option<String>,
    /// Chat completion model
    pub chat_model: String,
    /// Embedding model
    pub embedding_model: String,
    /// Embedding dimensions reported by the embedding model
    pub embedding_dimensions: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in a generated answer
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Texts per embeddings request
    pub embed_batch_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.euron.one/api/v1/euri".to_string(),
            api_key: None,
            chat_model: "gpt-4.1-nano".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 60,
            max_retries: 2,
            embed_batch_size: 64,
        }
    }
}

impl ApiConfig {
    /// API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} not found. Please set it in the .env file or talk-pdf.toml.",
                    API_KEY_ENV
                ))
            })
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks forwarded to the model
    pub top_k: usize,
    /// Distance metric of the vector index
    pub metric: DistanceMetric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            metric: DistanceMetric::L2,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 200MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_size: 200 * 1024 * 1024, // 200MB
        }
    }
}
