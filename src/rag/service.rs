// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Persistence-aware RAG orchestration
//!
//! Wraps the pipeline with conversation side effects: persist the user turn,
//! thread trimmed history into the prompt, forward deltas while cooperating
//! with client disconnects, and persist the accumulated assistant reply on
//! every exit path. Availability beats durability here: no persistence
//! failure ever interrupts the token stream.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, warn};
use uuid::Uuid;

use super::pipeline::{RagPipeline, FALLBACK_MESSAGE};
use crate::storage::{MessageStore, Role};

/// Caller-supplied check for whether the remote client stopped receiving.
///
/// Polled once per delta; probes that can fail internally must report failure
/// as `false` (not disconnected) so a flaky probe never aborts a stream.
pub type DisconnectProbe = Box<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;

pub struct RagService {
    pipeline: Arc<RagPipeline>,
    store: Arc<dyn MessageStore>,
}

impl RagService {
    pub fn new(pipeline: Arc<RagPipeline>, store: Arc<dyn MessageStore>) -> Self {
        Self { pipeline, store }
    }

    /// Stream an assistant response for the given user input.
    ///
    /// The stream yields assistant chunks as they are generated. On
    /// completion or early termination the concatenated assistant content is
    /// persisted once, unless nothing was forwarded.
    pub fn stream(
        &self,
        session_id: Uuid,
        user_text: String,
        is_disconnected: Option<DisconnectProbe>,
    ) -> ReceiverStream<String> {
        let (tx, rx) = mpsc::channel(100);
        let pipeline = Arc::clone(&self.pipeline);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            // Persist the user turn, best effort: the conversation continues
            // even if this write fails
            if let Err(e) = store.append(session_id, Role::User, &user_text).await {
                error!("[RagService] Failed to persist user message: {}", e);
            }

            let mut buffer = String::new();
            let mut stopped_early = false;

            match store.list(session_id).await {
                Ok(mut history) => {
                    // The current turn travels separately as the query; drop
                    // the entry just persisted above so the prompt never sees
                    // it duplicated as history
                    history.pop();

                    let mut deltas = pipeline.stream(user_text, history);
                    while let Some(delta) = deltas.next().await {
                        if let Some(probe) = &is_disconnected {
                            if probe().await {
                                warn!("[RagService] Client disconnected; stopping stream");
                                stopped_early = true;
                                break;
                            }
                        }
                        buffer.push_str(&delta);
                        if tx.send(delta).await.is_err() {
                            warn!("[RagService] Caller dropped the stream; stopping");
                            stopped_early = true;
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!("[RagService] Failed to load history: {}", e);
                    buffer.push_str(FALLBACK_MESSAGE);
                    let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
                }
            }

            // The pipeline guarantees at least one chunk; if its task died
            // without producing any, the caller still gets text
            if buffer.is_empty() && !stopped_early {
                buffer.push_str(FALLBACK_MESSAGE);
                let _ = tx.send(FALLBACK_MESSAGE.to_string()).await;
            }

            // Guaranteed flush, all exit paths: one assistant record iff
            // anything accumulated
            if !buffer.is_empty() {
                if let Err(e) = store.append(session_id, Role::Assistant, &buffer).await {
                    error!("[RagService] Failed to persist assistant message: {}", e);
                }
            }
        });

        ReceiverStream::new(rx)
    }
}
