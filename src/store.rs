use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Default validity of cached reference data.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Items stored in a [`ReferenceStore`] expose their numeric id.
pub trait Keyed {
    fn key(&self) -> u32;
}

/// Bulk loader backing a [`ReferenceStore`].
#[async_trait]
pub trait Refresher<T>: Send + Sync {
    async fn refresh(&self) -> Result<HashMap<u32, T>, ServiceError>;
}

#[derive(Debug)]
struct StoreState<T> {
    content: HashMap<u32, T>,
    refreshed_at: Option<Instant>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            content: HashMap::new(),
            refreshed_at: None,
        }
    }
}

/// Generic id-keyed cache for provider reference data (page formats,
/// gallery images, product catalogs).
///
/// Retrieval transparently refreshes through the configured [`Refresher`]
/// when the cache is empty or older than the TTL. A TTL of zero disables
/// caching and forces a refresh on every access. Refresh failures propagate
/// to the caller; stale content is never served in their place.
pub struct ReferenceStore<T> {
    name: String,
    ttl: Duration,
    refresher: std::sync::Arc<dyn Refresher<T>>,
    state: RwLock<StoreState<T>>,
}

impl<T: Clone + Send + Sync> ReferenceStore<T> {
    pub fn new<R>(
        name: impl Into<String>,
        refresher: std::sync::Arc<R>,
        ttl: Option<Duration>,
    ) -> Self
    where
        R: Refresher<T> + 'static,
    {
        Self {
            name: name.into(),
            ttl: ttl.unwrap_or(DEFAULT_TTL),
            refresher,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_stale(&self) -> bool {
        let state = self.state.read().unwrap();
        match state.refreshed_at {
            None => true,
            Some(_) if self.ttl.is_zero() => true,
            Some(at) => at.elapsed() > self.ttl,
        }
    }

    async fn ensure_fresh(&self) -> Result<(), ServiceError> {
        if !self.is_stale() {
            return Ok(());
        }
        debug!(store = %self.name, "refreshing reference data");
        let content = self.refresher.refresh().await?;
        info!(store = %self.name, entries = content.len(), "reference data refreshed");
        let mut state = self.state.write().unwrap();
        state.content = content;
        state.refreshed_at = Some(Instant::now());
        Ok(())
    }

    /// All cached items, ordered by id.
    pub async fn get_list(&self) -> Result<Vec<T>, ServiceError> {
        self.ensure_fresh().await?;
        let state = self.state.read().unwrap();
        let mut entries: Vec<(u32, T)> = state
            .content
            .iter()
            .map(|(id, item)| (*id, item.clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        Ok(entries.into_iter().map(|(_, item)| item).collect())
    }

    pub async fn get_item(&self, id: u32) -> Result<Option<T>, ServiceError> {
        self.ensure_fresh().await?;
        Ok(self.state.read().unwrap().content.get(&id).cloned())
    }

    /// Replaces the cached content directly, resetting the TTL clock.
    pub fn update(&self, content: HashMap<u32, T>) {
        let mut state = self.state.write().unwrap();
        state.content = content;
        state.refreshed_at = Some(Instant::now());
    }

    /// Drops all cached content; the next retrieval refreshes.
    pub fn remove(&self) {
        let mut state = self.state.write().unwrap();
        state.content.clear();
        state.refreshed_at = None;
    }
}
