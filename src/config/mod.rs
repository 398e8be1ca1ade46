// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Environment-driven configuration
//!
//! All settings come from environment variables with sensible defaults;
//! provider credentials are required and validated once at startup so a
//! misconfigured node fails fast instead of per-request.

use std::env;

use crate::rag::errors::RagError;

#[derive(Debug, Clone)]
pub struct Config {
    pub company_name: String,
    pub api_port: u16,

    // OpenAI
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub chat_model: String,
    pub embed_model: String,
    pub embed_dim: usize,
    pub temperature: f32,

    // Pinecone
    pub pinecone_api_key: String,
    pub pinecone_index_host: String,
    pub pinecone_namespace: String,

    // RAG tuning
    pub top_k: usize,
    pub min_query_len: usize,
    pub history_pairs: usize,
    pub context_budget: usize,

    /// SQLite path for the transcript store; in-memory store when unset
    pub db_path: Option<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn required(name: &str) -> Result<String, RagError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RagError::Configuration(format!(
            "{} is not configured",
            name
        ))),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, RagError> {
        Ok(Self {
            company_name: var_or("COMPANY_NAME", "Eloquent"),
            api_port: parse_or("API_PORT", 8080),

            openai_api_key: required("OPENAI_API_KEY")?,
            openai_api_base: var_or("OPENAI_API_BASE", "https://api.openai.com/v1"),
            chat_model: required("CHAT_MODEL")?,
            embed_model: required("EMBED_MODEL")?,
            embed_dim: parse_or("EMBED_DIM", 1024),
            temperature: parse_or("TEMPERATURE", 0.3),

            pinecone_api_key: required("PINECONE_API_KEY")?,
            pinecone_index_host: required("PINECONE_INDEX_HOST")?,
            pinecone_namespace: var_or("PINECONE_NAMESPACE", ""),

            top_k: parse_or("TOP_K", 5),
            min_query_len: parse_or("MIN_QUERY_LEN", 1),
            history_pairs: parse_or("HISTORY_LIMIT", 6),
            context_budget: parse_or("CONTEXT_BUDGET", 4000),

            db_path: env::var("DB_PATH").ok().filter(|p| !p.trim().is_empty()),
        })
    }
}
