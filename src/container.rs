// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Composition point
//!
//! All concrete providers are constructed here, once, and handed to the
//! pipeline and service by constructor injection. Tests bypass this module
//! entirely and inject fakes through the same constructors; nothing in the
//! crate holds provider state globally.

use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::{Embedder, OpenAiEmbedder};
use crate::inference::{ChatGenerator, OpenAiChatGenerator};
use crate::prompt::PromptBuilder;
use crate::rag::{RagError, RagPipeline, RagService};
use crate::storage::{MemoryMessageStore, MessageStore, SqliteMessageStore};
use crate::vector::{PineconeStore, VectorStore};

pub struct Container {
    pub vector_store: Arc<dyn VectorStore>,
    pub store: Arc<dyn MessageStore>,
    pub service: Arc<RagService>,
}

impl Container {
    /// Build the full provider graph from configuration.
    ///
    /// Fails fast with `Configuration` errors; nothing is constructed lazily
    /// per request.
    pub fn build(config: &Config) -> Result<Self, RagError> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
            &config.openai_api_base,
            &config.openai_api_key,
            &config.embed_model,
            config.embed_dim,
        )?);

        let vector_store: Arc<dyn VectorStore> = Arc::new(PineconeStore::new(
            &config.pinecone_index_host,
            &config.pinecone_api_key,
            &config.pinecone_namespace,
            embedder,
        )?);

        let prompt = PromptBuilder::new(
            &config.company_name,
            config.context_budget,
            config.history_pairs,
        );
        let generator: Arc<dyn ChatGenerator> = Arc::new(OpenAiChatGenerator::new(
            &config.openai_api_base,
            &config.openai_api_key,
            &config.chat_model,
            config.temperature,
            prompt,
        )?);

        let store: Arc<dyn MessageStore> = match &config.db_path {
            Some(path) => Arc::new(SqliteMessageStore::open(path)?),
            None => Arc::new(MemoryMessageStore::new()),
        };

        let pipeline = Arc::new(RagPipeline::new(
            Arc::clone(&vector_store),
            generator,
            config.top_k,
            config.min_query_len,
        ));
        let service = Arc::new(RagService::new(pipeline, Arc::clone(&store)));

        Ok(Self {
            vector_store,
            store,
            service,
        })
    }
}
