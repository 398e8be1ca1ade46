// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Answer generation interface

use async_trait::async_trait;
use tokio_stream::wrappers::ReceiverStream;

use crate::rag::errors::RagError;
use crate::storage::MessageRecord;

pub mod openai;

pub use openai::OpenAiChatGenerator;

/// Ordered token deltas from one generation call
pub type TokenStream = ReceiverStream<Result<String, RagError>>;

/// Streaming language-model collaborator
///
/// Error policy: failures PROPAGATE. A request-level failure is returned as
/// `Err`, a mid-stream failure arrives as an `Err` item after logging; the
/// generator never substitutes apology text of its own. Degradation is
/// decided in exactly one place, the pipeline's fallback path.
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    /// Open one generation stream for (context, query, history).
    ///
    /// Not restartable; retrying requires a new call.
    async fn stream_response(
        &self,
        chunks: &[String],
        query: &str,
        history: &[MessageRecord],
    ) -> Result<TokenStream, RagError>;
}
