// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! SQLite-backed transcript store
//!
//! One connection guarded by an async mutex; every store operation is a
//! single short statement, so the lock is held only briefly per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::{MessageRecord, MessageStore, Role};
use crate::rag::errors::RagError;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    created_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, created_at);
"#;

pub struct SqliteMessageStore {
    conn: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Open (or create) the transcript database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RagError> {
        let path = path.as_ref();
        info!("Initializing transcript database: {}", path.display());

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self, RagError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn create_session(&self) -> Result<Uuid, RagError> {
        let id = Uuid::new_v4();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sessions (id, created_at) VALUES (?1, ?2)",
            params![id.to_string(), Utc::now()],
        )?;
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

        let conn = self.conn.lock().await;
        // Sessions created lazily so anonymous callers can start chatting
        // before any explicit session handshake
        conn.execute(
            "INSERT OR IGNORE INTO sessions (id, created_at) VALUES (?1, ?2)",
            params![session_id.to_string(), record.created_at],
        )?;
        conn.execute(
            "INSERT INTO messages (id, session_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                session_id.to_string(),
                role.as_str(),
                record.content,
                record.created_at
            ],
        )?;
        Ok(record)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<MessageRecord>, RagError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, role, content, created_at FROM messages
             WHERE session_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![session_id.to_string()], |row| {
            let id: String = row.get(0)?;
            let role: String = row.get(1)?;
            let content: String = row.get(2)?;
            let created_at: DateTime<Utc> = row.get(3)?;
            Ok((id, role, content, created_at))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, role, content, created_at) = row?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| RagError::Persistence(format!("corrupt message id: {}", e)))?;
            let role = Role::parse(&role)
                .ok_or_else(|| RagError::Persistence(format!("unknown role: {}", role)))?;
            messages.push(MessageRecord {
                id,
                session_id,
                role,
                content,
                created_at,
            });
        }
        Ok(messages)
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), RagError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM messages WHERE session_id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }
}
