//! Pipeline and service configuration
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! [pipeline]
//! chunk_size = 500
//! chunk_overlap = 50
//! top_k = 3
//! embed_concurrency = 4
//!
//! [ollama]
//! base_url = "http://localhost:11434"
//! embedding_model = "nomic-embed-text"
//! chat_model = "llama3"
//! timeout_secs = 120
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub ollama: OllamaConfig,
}

/// Chunking and retrieval parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Chunks passed to the generator per question
    pub top_k: usize,
    /// Embedding requests in flight while indexing
    pub embed_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            embed_concurrency: 4,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be greater than zero".to_string()));
        }
        if self.embed_concurrency == 0 {
            return Err(Error::Configuration(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for an Ollama server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            chat_model: "llama3".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.ollama.timeout_secs == 0 {
            return Err(Error::Configuration("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }
}
