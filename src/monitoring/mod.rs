// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Deduplicated error logging
//!
//! Provider failures tend to repeat with identical detail (an index that is
//! down stays down). The dedup cache logs the full diagnostic exactly once
//! per distinct fingerprint and downgrades repeats to debug level. The cache
//! is bounded; old fingerprints are evicted and will log at full detail again
//! if the failure recurs after eviction.

use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::{debug, error};

use crate::rag::errors::RagError;

const DEFAULT_CAPACITY: usize = 64;

/// Bounded cache of error fingerprints already logged at full detail
pub struct ErrorDeduper {
    seen: Mutex<LruCache<u64, u64>>,
}

impl ErrorDeduper {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).unwrap());
        Self {
            seen: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn fingerprint(scope: &str, err: &RagError) -> u64 {
        let mut hasher = DefaultHasher::new();
        scope.hash(&mut hasher);
        err.error_code().hash(&mut hasher);
        err.to_string().hash(&mut hasher);
        hasher.finish()
    }

    /// Log `err` under `scope`; full detail on first sight, debug on repeats
    pub fn log(&self, scope: &str, err: &RagError) {
        let fp = Self::fingerprint(scope, err);
        let mut seen = self.seen.lock().unwrap();
        match seen.get_mut(&fp) {
            Some(repeats) => {
                *repeats += 1;
                debug!(
                    "[{}] repeated failure suppressed (code={}, repeats={})",
                    scope,
                    err.error_code(),
                    repeats
                );
            }
            None => {
                seen.put(fp, 1);
                error!("[{}] {} (code={})", scope, err, err.error_code());
            }
        }
    }

    /// Number of distinct fingerprints currently tracked
    pub fn tracked(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Default for ErrorDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
