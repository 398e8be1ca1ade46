// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Conversation transcript storage
//!
//! The RAG core only needs two operations per invocation: append a message
//! and list a session's transcript in creation order. Both implementations
//! here (in-memory and SQLite) are safe to share across request tasks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::rag::errors::RagError;

pub mod sqlite;

pub use sqlite::SqliteMessageStore;

/// Who authored a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted conversation turn; immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence collaborator consumed by the RAG service
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Create a new empty session and return its id
    async fn create_session(&self) -> Result<Uuid, RagError>;

    /// Append one message to a session
    async fn append(
        &self,
        session_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, RagError>;

    /// All messages in a session, ordered oldest to newest
    async fn list(&self, session_id: Uuid) -> Result<Vec<MessageRecord>, RagError>;

    /// Remove all messages in a session
    async fn clear(&self, session_id: Uuid) -> Result<(), RagError>;
}

/// In-memory transcript store
///
/// Transcripts live for the process lifetime only. Used in tests and in
/// deployments that treat conversations as ephemeral.
#[derive(Default)]
pub struct MemoryMessageStore {
    sessions: RwLock<HashMap<Uuid, Vec<MessageRecord>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create_session(&self) -> Result<Uuid, RagError> {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Vec::new());
        Ok(id)
    }

    async fn append(
        &self,
        session_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, RagError> {
        let record = MessageRecord {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .entry(session_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<MessageRecord>, RagError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), RagError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
