// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Knowledge-base retrieval interface

use async_trait::async_trait;

use crate::rag::errors::RagError;

pub mod pinecone;

pub use pinecone::PineconeStore;

/// Similarity-search collaborator producing ordered context chunks
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Up to `top_k` relevant text chunks for the query, most relevant first.
    ///
    /// An empty or un-embeddable query yields `Ok(vec![])`; only a failure of
    /// the index query itself is an error, so callers can tell "retrieval
    /// broke" apart from "nothing relevant found".
    async fn get_relevant_chunks(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>, RagError>;

    /// True iff a lightweight index introspection call succeeds; never errors
    async fn health_check(&self) -> bool;
}
