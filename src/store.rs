//! In-memory message storage keyed by issued IDs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use metrics::counter;
use tracing::info;

use crate::logging::anon_hash;

/// Issues decimal string IDs "1", "2", ... Owned by the store that uses it.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after `last` (the next id is `last + 1`).
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    pub fn next_id(&self) -> String {
        let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        n.to_string()
    }
}

#[derive(Debug)]
pub struct MessageStore {
    ids: IdSequence,
    inner: RwLock<HashMap<String, String>>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(IdSequence::new())
    }
}

impl MessageStore {
    pub fn new(ids: IdSequence) -> Self {
        Self {
            ids,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store `content` under a fresh id and return the id.
    pub fn add(&self, content: impl Into<String>) -> String {
        let content = content.into();
        let id = self.ids.next_id();
        info!(target: "store", %id, msg = %anon_hash(&content), "message stored");
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), content);
        counter!("messages_stored_total").increment(1);
        id
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// All ids, in issue order.
    pub fn ids(&self) -> Vec<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = guard.keys().cloned().collect();
        ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
        ids
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
