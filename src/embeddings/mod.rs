// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Text embedding provider interface

use async_trait::async_trait;

use crate::rag::errors::RagError;

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Converts text to a fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed output dimensionality; must match the vector index
    fn dimension(&self) -> usize;

    /// Embed one text. Fails with `InvalidInput` on empty-after-trim text and
    /// `Provider` on upstream failure; neither is swallowed here.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;
}
