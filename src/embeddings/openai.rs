// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! OpenAI embeddings provider

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use super::Embedder;
use crate::rag::errors::RagError;

const PROVIDER: &str = "openai-embed";

#[derive(serde::Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(serde::Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(serde::Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        dimension: usize,
    ) -> Result<Self, RagError> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(RagError::Configuration(
                "EMBED_MODEL is not configured".to_string(),
            ));
        }
        if dimension == 0 {
            return Err(RagError::Configuration(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RagError::InvalidInput("no text to embed".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
                dimensions: self.dimension,
            })
            .send()
            .await
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::provider(
                PROVIDER,
                format!("embedding request failed ({}): {}", status, body),
            ));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::provider(PROVIDER, e))?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::provider(PROVIDER, "response contained no embedding"))?;

        if embedding.len() != self.dimension {
            warn!(
                "[OpenAiEmbedder] Upstream returned {}D vector, expected {}D",
                embedding.len(),
                self.dimension
            );
        }
        Ok(embedding)
    }
}
