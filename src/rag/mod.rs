// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
// Retrieval-augmented generation core
// Weak-query gating, retrieval, streaming generation, transcript persistence

pub mod errors;
pub mod pipeline;
pub mod service;

pub use errors::RagError;
pub use pipeline::{RagPipeline, DEFAULT_MIN_QUERY_LEN, DEFAULT_TOP_K, FALLBACK_MESSAGE};
pub use service::{DisconnectProbe, RagService};
