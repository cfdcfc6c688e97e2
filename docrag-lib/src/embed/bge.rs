use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// BGE embedder using BAAI/bge-large-en-v1.5.
///
/// Runs locally through fastembed's ONNX runtime. Inference is blocking, so
/// each batch runs on tokio's blocking pool as a single model call.
pub struct BgeEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl BgeEmbedder {
    /// Create a new BGE embedder.
    ///
    /// Downloads the model on first use (~1.2GB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::BGELargeENV15)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self {
                model: Arc::new(Mutex::new(model)),
            })
            .map_err(|e| Error::EmbeddingUnavailable(e.to_string()))
    }
}

#[async_trait]
impl Embedder for BgeEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text], 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmbeddingInconsistent("model returned no embeddings".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str], _concurrency: usize) -> Result<Vec<Embedding>> {
        let model = Arc::clone(&self.model);
        let texts: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| Error::EmbeddingUnavailable("model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| Error::EmbeddingUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| Error::EmbeddingUnavailable(e.to_string()))?
    }

    fn model_name(&self) -> &str {
        "BAAI/bge-large-en-v1.5"
    }
}
