//! In-memory caching using moka
//!
//! Provides application-level caching for catalog reference data and the
//! staff roster. Catalog rows change rarely (a few edits per season), so a
//! TTL of minutes is plenty; editors can force a refresh through the
//! invalidation endpoint.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Catalog, StaffMember};
use crate::store::Store;

const CATALOG_KEY: &str = "catalog";

/// Application cache holding the catalog snapshot and roster entries
#[derive(Clone)]
pub struct AppCache {
    /// Catalog snapshot (singleton)
    pub catalog: Cache<&'static str, Arc<Catalog>>,
    /// Staff roster (staff id -> member)
    pub staff: Cache<Uuid, Arc<StaffMember>>,
}

impl AppCache {
    /// Create a new cache instance with the configured catalog TTL
    pub fn new(catalog_ttl: Duration) -> Self {
        Self {
            catalog: Cache::builder()
                .max_capacity(1)
                .time_to_live(catalog_ttl)
                .build(),

            // Staff roster: 500 entries, 30 min TTL
            staff: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    /// Catalog snapshot, loaded from the store on a miss
    pub async fn catalog(&self, store: &dyn Store) -> Result<Arc<Catalog>> {
        if let Some(cached) = self.catalog.get(CATALOG_KEY).await {
            tracing::debug!("Cache HIT for catalog");
            return Ok(cached);
        }

        tracing::debug!("Cache MISS for catalog");
        let catalog = Arc::new(store.load_catalog().await?);
        self.catalog.insert(CATALOG_KEY, catalog.clone()).await;
        Ok(catalog)
    }

    /// Roster entry, loaded from the store on a miss
    pub async fn staff_member(&self, store: &dyn Store, id: Uuid) -> Result<Option<Arc<StaffMember>>> {
        if let Some(cached) = self.staff.get(&id).await {
            return Ok(Some(cached));
        }

        match store.staff_member(id).await? {
            Some(member) => {
                let member = Arc::new(member);
                self.staff.insert(id, member.clone()).await;
                Ok(Some(member))
            }
            None => Ok(None),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalog_cached: self.catalog.entry_count() > 0,
            staff_size: self.staff.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.catalog.invalidate_all();
        self.staff.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub catalog_cached: bool,
    pub staff_size: u64,
}

/// Start background cache warmer
///
/// Loads the catalog on startup and refreshes it every `every`.
pub async fn start_cache_warmer(cache: AppCache, store: Arc<dyn Store>, every: Duration) {
    let mut interval = interval(every);
    loop {
        interval.tick().await;
        warm_cache(&cache, store.as_ref()).await;
    }
}

/// Replace the cached catalog with a fresh snapshot
async fn warm_cache(cache: &AppCache, store: &dyn Store) {
    info!("Starting cache warm-up...");

    match store.load_catalog().await {
        Ok(catalog) => {
            cache.catalog.insert(CATALOG_KEY, Arc::new(catalog)).await;
        }
        Err(e) => warn!("Failed to warm catalog cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
