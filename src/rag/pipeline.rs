// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! RAG pipeline: query -> token stream
//!
//! Per-invocation state machine with no state across calls: weak-query gate,
//! retrieval, generation, fallback. Every failure past the gate degrades into
//! the fixed fallback message; deltas already forwarded are never retracted
//! (streaming cannot un-send bytes). There is no retry anywhere.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::inference::ChatGenerator;
use crate::monitoring::ErrorDeduper;
use crate::storage::MessageRecord;
use crate::vector::VectorStore;

/// Fixed apology/redirect text used for weak queries and failures
pub const FALLBACK_MESSAGE: &str =
    "I'm not sure based on the available information. Please contact our support team.";

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MIN_QUERY_LEN: usize = 1;

pub struct RagPipeline {
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn ChatGenerator>,
    errors: Arc<ErrorDeduper>,
    top_k: usize,
    min_query_len: usize,
}

impl RagPipeline {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn ChatGenerator>,
        top_k: usize,
        min_query_len: usize,
    ) -> Self {
        Self {
            vector_store,
            generator,
            errors: Arc::new(ErrorDeduper::default()),
            top_k,
            min_query_len,
        }
    }

    /// Too short to answer, unless it is a short-but-valid reply ("yes",
    /// "no") or purely numeric (an amount, a code)
    fn is_query_weak(query: &str, min_len: usize) -> bool {
        let q = query.trim().to_lowercase();
        q.chars().count() < min_len
            && q != "yes"
            && q != "no"
            && !(!q.is_empty() && q.chars().all(char::is_numeric))
    }

    /// Stream the answer for one query.
    ///
    /// The returned stream always yields at least one chunk; failures are
    /// absorbed into the fallback message, never surfaced as errors. Terminal
    /// states: completed normally, completed via weak-query fallback,
    /// completed via error fallback.
    pub fn stream(&self, query: String, history: Vec<MessageRecord>) -> ReceiverStream<String> {
        let (tx, rx) = mpsc::channel(100);
        let vector_store = Arc::clone(&self.vector_store);
        let generator = Arc::clone(&self.generator);
        let errors = Arc::clone(&self.errors);
        let top_k = self.top_k;
        let min_query_len = self.min_query_len;

        tokio::spawn(async move {
            if Self::is_query_weak(&query, min_query_len) {
                warn!("[RagPipeline] Weak query detected; sending fallback message");
                let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
                return;
            }

            let chunks: Vec<String> = match vector_store.get_relevant_chunks(&query, top_k).await {
                Ok(chunks) => chunks.into_iter().filter(|c| !c.trim().is_empty()).collect(),
                Err(e) => {
                    errors.log("retrieval", &e);
                    let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
                    return;
                }
            };
            if chunks.is_empty() {
                // Not an error; the prompt builder renders an explicit
                // placeholder so the model knows nothing was retrieved
                warn!("[RagPipeline] No context found");
            }

            let mut deltas = match generator.stream_response(&chunks, &query, &history).await {
                Ok(stream) => stream,
                Err(e) => {
                    errors.log("generation", &e);
                    let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
                    return;
                }
            };

            let mut sent_any = false;
            while let Some(item) = deltas.next().await {
                match item {
                    Ok(delta) => {
                        sent_any = true;
                        if tx.send(delta).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        errors.log("generation", &e);
                        let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
                        return;
                    }
                }
            }

            if !sent_any {
                warn!("[RagPipeline] Generator produced no output; sending fallback");
                let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
            }
        });

        ReceiverStream::new(rx)
    }
}
