// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Error taxonomy for the RAG core
//!
//! Four classes of failure, each with its own propagation rule:
//! - Configuration errors are fatal at construction, never per-request
//! - Invalid input is absorbed locally (empty retrieval)
//! - Provider errors are recovered into fallback text at the pipeline boundary
//! - Persistence errors are swallowed at each call site and never interrupt
//!   the token stream

use thiserror::Error;

/// Errors produced by the RAG core and its provider collaborators
#[derive(Error, Debug)]
pub enum RagError {
    /// Missing model name, API key, or index host
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input rejected before reaching any upstream provider
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network, index, or model failure from an upstream provider
    #[error("Provider error ({provider}): {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Message store failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl RagError {
    /// Wrap an upstream failure, tagging the provider it came from
    pub fn provider(provider: &'static str, err: impl std::fmt::Display) -> Self {
        RagError::Provider {
            provider,
            message: err.to_string(),
        }
    }

    /// Stable code for logging and error fingerprinting
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::Configuration(_) => "CONFIGURATION",
            RagError::InvalidInput(_) => "INVALID_INPUT",
            RagError::Provider { .. } => "PROVIDER",
            RagError::Persistence(_) => "PERSISTENCE",
        }
    }
}

impl From<rusqlite::Error> for RagError {
    fn from(err: rusqlite::Error) -> Self {
        RagError::Persistence(err.to_string())
    }
}
