use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ApiKey;

const DEFAULT_CAPACITY: usize = 256;

type CacheKey = (String, String);

/// Memoizes replies by (credential fingerprint, exact prompt text).
///
/// Only successful replies are stored. When full, the oldest entry is evicted.
pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheState::default()),
        }
    }

    pub async fn get(&self, api_key: &ApiKey, prompt: &str) -> Option<String> {
        let key = (api_key.fingerprint(), prompt.to_string());
        let state = self.inner.lock().await;
        let hit = state.entries.get(&key).cloned();
        if hit.is_some() {
            debug!("Response cache hit");
        }
        hit
    }

    pub async fn insert(&self, api_key: &ApiKey, prompt: &str, reply: &str) {
        let key = (api_key.fingerprint(), prompt.to_string());
        let mut state = self.inner.lock().await;

        if state.entries.insert(key.clone(), reply.to_string()).is_none() {
            state.order.push_back(key);
        }

        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
