// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
pub mod api;
pub mod config;
pub mod container;
pub mod embeddings;
pub mod inference;
pub mod monitoring;
pub mod prompt;
pub mod rag;
pub mod storage;
pub mod vector;

// Re-export the main types
pub use config::Config;
pub use container::Container;
pub use rag::{RagError, RagPipeline, RagService, FALLBACK_MESSAGE};
pub use storage::{MemoryMessageStore, MessageRecord, MessageStore, Role, SqliteMessageStore};
