// src/controller/detail.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::api::{Backend, as_json, get_as};

/// Content of a detail overlay.
/// A failed fetch lands in the same slot the data would occupy.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailSlot<T> {
    Closed,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> DetailSlot<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, DetailSlot::Closed)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            DetailSlot::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// On-demand loader for one entity. Nothing is cached between opens.
pub struct DetailLoader<T> {
    backend: Arc<dyn Backend>,
    slot: RwLock<DetailSlot<T>>,
    generation: AtomicU64,
}

impl<T> DetailLoader<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            slot: RwLock::new(DetailSlot::Closed),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetches `path?as=json` and returns what ends up in the slot.
    ///
    /// A response that arrives after `close()` or a newer `open()` is
    /// discarded.
    pub async fn open(&self, path: &str) -> DetailSlot<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.slot.write().await = DetailSlot::Loading;

        let outcome = match get_as::<T>(self.backend.as_ref(), path, &as_json()).await {
            Ok(value) => DetailSlot::Loaded(value),
            Err(e) => {
                tracing::warn!("Failed to load detail {}: {}", path, e);
                DetailSlot::Failed(e.user_message())
            }
        };

        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return slot.clone();
        }
        *slot = outcome;
        slot.clone()
    }

    pub async fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.slot.write().await = DetailSlot::Closed;
    }

    pub async fn slot(&self) -> DetailSlot<T> {
        self.slot.read().await.clone()
    }
}
