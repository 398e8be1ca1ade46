// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! OpenAI chat-completions streaming generator
//!
//! Opens a server-sent-events stream against an OpenAI-compatible
//! `/chat/completions` endpoint and forwards content deltas as they arrive.
//! Malformed individual frames are skipped with a warning; transport failures
//! are propagated as `Err` items per the [`ChatGenerator`] contract.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use super::{ChatGenerator, TokenStream};
use crate::prompt::PromptBuilder;
use crate::rag::errors::RagError;
use crate::storage::MessageRecord;

const PROVIDER: &str = "openai-chat";

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [crate::prompt::PromptMessage],
    temperature: f32,
    stream: bool,
}

#[derive(serde::Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(serde::Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(serde::Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatGenerator {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    prompt: PromptBuilder,
}

impl OpenAiChatGenerator {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
        prompt: PromptBuilder,
    ) -> Result<Self, RagError> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(RagError::Configuration(
                "CHAT_MODEL is not configured".to_string(),
            ));
        }

        // Connect timeout only: a total-request timeout would cut off long
        // generations mid-stream
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
            prompt,
        })
    }

    /// Extract the content delta from one SSE payload, if it carries any
    fn parse_frame(payload: &str) -> Option<String> {
        match serde_json::from_str::<StreamFrame>(payload) {
            Ok(frame) => frame
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta)
                .and_then(|d| d.content)
                .filter(|content| !content.is_empty()),
            Err(e) => {
                warn!("[OpenAiChatGenerator] Stream frame parse error: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ChatGenerator for OpenAiChatGenerator {
    async fn stream_response(
        &self,
        chunks: &[String],
        query: &str,
        history: &[MessageRecord],
    ) -> Result<TokenStream, RagError> {
        let messages = self.prompt.build(chunks, history, query);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: &messages,
                temperature: self.temperature,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| RagError::provider(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::provider(
                PROVIDER,
                format!("chat request failed ({}): {}", status, body),
            ));
        }

        let (tx, rx) = mpsc::channel(100);
        let mut byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut pending = String::new();
            while let Some(frame) = byte_stream.next().await {
                let bytes = match frame {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        // Mid-stream transport failure: surface it and stop
                        let _ = tx.send(Err(RagError::provider(PROVIDER, e))).await;
                        return;
                    }
                };

                pending.push_str(&String::from_utf8_lossy(&bytes));
                while let Some(pos) = pending.find('\n') {
                    let line = pending[..pos].trim().to_string();
                    pending.drain(..=pos);

                    let Some(payload) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let payload = payload.trim();
                    if payload == "[DONE]" {
                        return;
                    }
                    if let Some(content) = Self::parse_frame(payload) {
                        if tx.send(Ok(content)).await.is_err() {
                            // Receiver dropped; nobody is listening
                            return;
                        }
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}
