//! Query presentation and LLM summarization.
//!
//! Turns raw similarity hits into ranked, timestamped results, and can
//! forward the retrieved context verbatim to an LLM for summarization.

use crate::config::RagSettings;
use crate::embedding::Embedder;
use crate::error::{Result, SpoleError};
use crate::vector_store::{ScoredChunk, VectorStore};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about video \
content. Base your answer only on the provided transcript excerpts. Cite the video title and \
timestamp when referencing a specific excerpt.";

/// A query result ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub text: String,
    pub video_title: String,
    pub video_url: String,
    /// `HH:MM:SS - HH:MM:SS` range within the video.
    pub timestamp: String,
    /// 1-based position in the similarity-ranked result set.
    pub relevance_rank: usize,
}

impl RankedResult {
    fn from_scored(hit: ScoredChunk, rank: usize) -> Self {
        Self {
            text: hit.text,
            video_title: hit.metadata.video_title,
            video_url: hit.metadata.video_url,
            timestamp: hit.metadata.timestamp,
            relevance_rank: rank,
        }
    }
}

/// An LLM summary along with the results it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<RankedResult>,
}

/// Query engine over an ingested collection.
pub struct QueryEngine {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    model: String,
    chat: Client<OpenAIConfig>,
}

impl QueryEngine {
    /// Build a query engine. The summarization client is configured from the
    /// `[rag]` section; chat completions can run long, so it gets its own
    /// timeout rather than sharing the embedder's.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
        rag: &RagSettings,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(rag.request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            store,
            embedder,
            collection: collection.into(),
            model: rag.model.clone(),
            chat: Client::with_config(OpenAIConfig::default()).with_http_client(http),
        }
    }

    /// Query the collection and return ranked results.
    #[instrument(skip(self), fields(query = %query_text))]
    pub async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<RankedResult>> {
        let query_embedding = self.embedder.embed(query_text).await?;

        let hits = self
            .store
            .query(&self.collection, &query_embedding, n_results)
            .await?;

        debug!("Query returned {} hits", hits.len());

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(idx, hit)| RankedResult::from_scored(hit, idx + 1))
            .collect())
    }

    /// Query and summarize the retrieved context with an LLM.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn summarize(&self, question: &str, n_results: usize) -> Result<RagAnswer> {
        let results = self.query(question, n_results).await?;

        if results.is_empty() {
            return Ok(RagAnswer {
                answer: "No relevant transcript excerpts were found for this question."
                    .to_string(),
                sources: Vec::new(),
            });
        }

        let context = format_context_for_prompt(&results);
        let user_prompt = format!(
            "Transcript excerpts:\n\n{}\n\nQuestion: {}",
            context, question
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| SpoleError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SpoleError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| SpoleError::Rag(e.to_string()))?;

        let response = self
            .chat
            .chat()
            .create(request)
            .await
            .map_err(|e| SpoleError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SpoleError::Rag("Empty response from LLM".to_string()))?
            .clone();

        info!("Generated summary from {} sources", results.len());

        Ok(RagAnswer {
            answer,
            sources: results,
        })
    }
}

/// Format ranked results for inclusion in a prompt, context verbatim.
pub fn format_context_for_prompt(results: &[RankedResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "---\n[{}] {} @ {}\n{}\n---",
                r.relevance_rank, r.video_title, r.timestamp, r.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::vector_store::{test_chunk, MemoryVectorStore};

    async fn engine_with_data(texts: &[&str]) -> QueryEngine {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = Arc::new(HashEmbedder);

        store.create_collection("videos").await.unwrap();
        let mut stored = Vec::new();
        for text in texts {
            stored.push(test_chunk(text, embedder.embed(text).await.unwrap()));
        }
        store.add("videos", &stored).await.unwrap();

        QueryEngine::new(store, embedder, "videos", &RagSettings::default())
    }

    #[tokio::test]
    async fn test_query_assigns_one_based_ranks() {
        let engine = engine_with_data(&["alpha text", "beta text", "gamma text"]).await;

        let results = engine.query("alpha text", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].relevance_rank, 1);
        assert_eq!(results[1].relevance_rank, 2);
        assert_eq!(results[2].relevance_rank, 3);
        // Exact text match ranks first with the deterministic embedder
        assert_eq!(results[0].text, "alpha text");
    }

    #[tokio::test]
    async fn test_query_respects_result_limit() {
        let engine = engine_with_data(&["one", "two", "three"]).await;
        let results = engine.query("one", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_context_prompt_embeds_text_verbatim() {
        let results = vec![RankedResult {
            text: "the exact chunk text".to_string(),
            video_title: "Video".to_string(),
            video_url: "https://youtu.be/abc123def45".to_string(),
            timestamp: "00:01:00 - 00:02:00".to_string(),
            relevance_rank: 1,
        }];

        let prompt = format_context_for_prompt(&results);
        assert!(prompt.contains("the exact chunk text"));
        assert!(prompt.contains("[1] Video @ 00:01:00 - 00:02:00"));
    }
}
