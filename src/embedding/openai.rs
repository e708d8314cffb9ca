//! Embedding generation backed by the OpenAI embeddings API.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, SpoleError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Upper bound on inputs per embeddings request. Ingestion batches are
/// allowed to be larger; they get split across requests here.
const MAX_INPUTS_PER_REQUEST: usize = 100;

/// Embedder that calls the OpenAI embeddings endpoint.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Build an embedder from the `[embedding]` section of the configuration.
    ///
    /// The API key is read from the environment by the client; the request
    /// timeout comes from `request_timeout_secs`.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http),
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
        }
    }

    /// One embeddings API call. `inputs` must already fit the request cap.
    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(inputs.to_vec()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| SpoleError::Embedding(format!("Invalid embedding request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| SpoleError::OpenAI(format!("Embedding request failed: {}", e)))?;

        if response.data.len() != inputs.len() {
            return Err(SpoleError::Embedding(format!(
                "Requested {} embeddings, received {}",
                inputs.len(),
                response.data.len()
            )));
        }

        // Response order is not guaranteed to match input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embeddings(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| SpoleError::Embedding("No embedding returned".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for slice in texts.chunks(MAX_INPUTS_PER_REQUEST) {
            embeddings.extend(self.request_embeddings(slice).await?);
        }

        debug!("Embedded {} texts", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
