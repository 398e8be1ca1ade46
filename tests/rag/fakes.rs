// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
// Fake providers and stores for exercising the pipeline and service without
// any network or database

use async_trait::async_trait;
use finbot_node::inference::{ChatGenerator, TokenStream};
use finbot_node::rag::RagError;
use finbot_node::storage::{MemoryMessageStore, MessageRecord, MessageStore, Role};
use finbot_node::vector::VectorStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

pub struct FakeVectorStore {
    chunks: Option<Vec<String>>, // None -> retrieval fails
    pub calls: AtomicUsize,
}

impl FakeVectorStore {
    pub fn with_chunks(chunks: Vec<&str>) -> Self {
        Self {
            chunks: Some(chunks.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            chunks: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn get_relevant_chunks(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> Result<Vec<String>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.chunks {
            Some(chunks) => Ok(chunks.clone()),
            None => Err(RagError::provider("fake-store", "index query failed")),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub enum GeneratorScript {
    /// Yield these deltas, then end normally
    Deltas(Vec<&'static str>),
    /// Yield these deltas, then surface a mid-stream failure
    DeltasThenFail(Vec<&'static str>),
    /// Fail before the stream opens
    FailImmediately,
    /// Open a stream that ends without producing anything
    Empty,
}

pub struct FakeGenerator {
    script: GeneratorScript,
    pub calls: AtomicUsize,
    pub seen_chunks: Mutex<Option<Vec<String>>>,
    pub seen_history: Mutex<Option<Vec<MessageRecord>>>,
}

impl FakeGenerator {
    pub fn new(script: GeneratorScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen_chunks: Mutex::new(None),
            seen_history: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatGenerator for FakeGenerator {
    async fn stream_response(
        &self,
        chunks: &[String],
        _query: &str,
        history: &[MessageRecord],
    ) -> Result<TokenStream, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_chunks.lock().unwrap() = Some(chunks.to_vec());
        *self.seen_history.lock().unwrap() = Some(history.to_vec());

        let (tx, rx) = mpsc::channel(16);
        match &self.script {
            GeneratorScript::FailImmediately => {
                return Err(RagError::provider("fake-generator", "model unavailable"));
            }
            GeneratorScript::Empty => {}
            GeneratorScript::Deltas(deltas) => {
                let deltas: Vec<String> = deltas.iter().map(|d| d.to_string()).collect();
                tokio::spawn(async move {
                    for delta in deltas {
                        if tx.send(Ok(delta)).await.is_err() {
                            return;
                        }
                    }
                });
            }
            GeneratorScript::DeltasThenFail(deltas) => {
                let deltas: Vec<String> = deltas.iter().map(|d| d.to_string()).collect();
                tokio::spawn(async move {
                    for delta in deltas {
                        if tx.send(Ok(delta)).await.is_err() {
                            return;
                        }
                    }
                    let _ = tx
                        .send(Err(RagError::provider("fake-generator", "connection reset")))
                        .await;
                });
            }
        }
        Ok(ReceiverStream::new(rx))
    }
}

/// Message store whose writes or reads can be made to fail
pub struct FlakyStore {
    inner: MemoryMessageStore,
    pub fail_append: bool,
    pub fail_list: bool,
}

impl FlakyStore {
    pub fn new(fail_append: bool, fail_list: bool) -> Self {
        Self {
            inner: MemoryMessageStore::new(),
            fail_append,
            fail_list,
        }
    }

    /// Direct access to what actually got persisted
    pub fn inner(&self) -> &MemoryMessageStore {
        &self.inner
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn create_session(&self) -> Result<Uuid, RagError> {
        self.inner.create_session().await
    }

    async fn append(
        &self,
        session_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, RagError> {
        if self.fail_append {
            return Err(RagError::Persistence("insert failed".to_string()));
        }
        self.inner.append(session_id, role, content).await
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<MessageRecord>, RagError> {
        if self.fail_list {
            return Err(RagError::Persistence("select failed".to_string()));
        }
        self.inner.list(session_id).await
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), RagError> {
        self.inner.clear(session_id).await
    }
}
