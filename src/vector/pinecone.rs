// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Pinecone-backed vector store
//!
//! Talks to a Pinecone index over its REST API, embedding queries through the
//! injected [`Embedder`]. Match payloads are expected to carry the chunk text
//! under `metadata.text`; matches without one are dropped.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::VectorStore;
use crate::embeddings::Embedder;
use crate::rag::errors::RagError;

const PROVIDER: &str = "pinecone";

pub struct PineconeStore {
    client: Client,
    index_host: String,
    api_key: String,
    namespace: String,
    embedder: Arc<dyn Embedder>,
}

impl PineconeStore {
    pub fn new(
        index_host: &str,
        api_key: &str,
        namespace: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RagError> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "PINECONE_API_KEY is not configured".to_string(),
            ));
        }
        if index_host.trim().is_empty() {
            return Err(RagError::Configuration(
                "PINECONE_INDEX_HOST is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        let mut index_host = index_host.trim_end_matches('/').to_string();
        if !index_host.starts_with("http") {
            index_host = format!("https://{}", index_host);
        }

        Ok(Self {
            client,
            index_host,
            api_key: api_key.to_string(),
            namespace: namespace.to_string(),
            embedder,
        })
    }

    async fn query_index(&self, vector: Vec<f32>, top_k: usize) -> Result<Value, RagError> {
        let response = self
            .client
            .post(format!("{}/query", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "namespace": self.namespace,
                "includeMetadata": true,
            }))
            .send()
            .await
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::provider(
                PROVIDER,
                format!("index query failed ({}): {}", status, body),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RagError::provider(PROVIDER, e))
    }

    /// Pull text payloads out of the match list, preserving similarity order
    fn extract_chunks(result: &Value) -> Vec<String> {
        let matches = result
            .get("matches")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        matches
            .iter()
            .filter_map(|m| m.pointer("/metadata/text"))
            .filter_map(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn get_relevant_chunks(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>, RagError> {
        if query.trim().is_empty() {
            warn!("[PineconeStore] Empty query provided");
            return Ok(Vec::new());
        }

        // An un-embeddable query means "nothing relevant found", not a
        // retrieval failure
        let vector = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("[PineconeStore] Embedding failed; skipping query: {}", e);
                return Ok(Vec::new());
            }
        };
        if vector.is_empty() {
            warn!("[PineconeStore] Empty embedding; skipping query");
            return Ok(Vec::new());
        }

        let result = self.query_index(vector, top_k).await?;
        let chunks = Self::extract_chunks(&result);
        info!("[PineconeStore] Retrieved {} chunk(s) for query", chunks.len());
        Ok(chunks)
    }

    async fn health_check(&self) -> bool {
        let response = self
            .client
            .post(format!("{}/describe_index_stats", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&json!({}))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!("[PineconeStore] Health check returned {}", resp.status());
                false
            }
            Err(e) => {
                debug!("[PineconeStore] Health check failed: {}", e);
                false
            }
        }
    }
}
