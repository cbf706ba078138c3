//! Memoized source tables.
//!
//! The cache holds the last successful load and hands out shared references to
//! it. Population happens under the lock, so two callers racing on an empty
//! cache trigger one load. Failed loads are not stored.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::{DealRecord, PurchaseRecord};
use crate::error::AppError;

/// The raw (unfiltered) tables of one load.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub deals: Vec<DealRecord>,
    pub purchases: Vec<PurchaseRecord>,
    pub loaded_at: chrono::DateTime<chrono::Local>,
}

impl SourceTables {
    pub fn new(deals: Vec<DealRecord>, purchases: Vec<PurchaseRecord>) -> Self {
        Self {
            deals,
            purchases,
            loaded_at: chrono::Local::now(),
        }
    }
}

struct Entry {
    stored_at: Instant,
    tables: Arc<SourceTables>,
}

pub struct LoadCache {
    /// `None` keeps entries until `invalidate`.
    ttl: Option<Duration>,
    slot: Mutex<Option<Entry>>,
}

impl LoadCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached tables, running `load` first if empty or expired.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<SourceTables>, AppError>
    where
        F: FnOnce() -> Result<SourceTables, AppError>,
    {
        let mut slot = self.lock();

        if let Some(entry) = slot.as_ref() {
            if !self.is_expired(entry) {
                tracing::debug!("source cache hit");
                return Ok(Arc::clone(&entry.tables));
            }
            tracing::debug!("source cache entry expired");
        }

        tracing::debug!("source cache miss; loading");
        let tables = Arc::new(load()?);
        *slot = Some(Entry {
            stored_at: Instant::now(),
            tables: Arc::clone(&tables),
        });
        Ok(tables)
    }

    /// Drop the cached tables; the next `get_or_load` refetches.
    pub fn invalidate(&self) {
        *self.lock() = None;
        tracing::info!("source cache invalidated");
    }

    #[cfg(test)]
    fn is_populated(&self) -> bool {
        self.lock().as_ref().is_some_and(|e| !self.is_expired(e))
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entry>> {
        // A panic mid-load leaves the slot untouched, so the data is still sound.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LoadCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn empty() -> Result<SourceTables, AppError> {
        Ok(SourceTables::new(Vec::new(), Vec::new()))
    }

    #[test]
    fn second_call_reuses_the_first_load() {
        let cache = LoadCache::default();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            empty()
        };

        let a = cache.get_or_load(load).unwrap();
        let b = cache.get_or_load(load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = LoadCache::default();
        let err = cache
            .get_or_load(|| Err(AppError::source_unavailable("deals", "timeout")))
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable { .. }));
        assert!(!cache.is_populated());

        assert!(cache.get_or_load(empty).is_ok());
        assert!(cache.is_populated());
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = LoadCache::default();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            empty()
        };

        cache.get_or_load(load).unwrap();
        cache.invalidate();
        cache.get_or_load(load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_ttl_always_reloads() {
        let cache = LoadCache::new(Some(Duration::ZERO));
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            empty()
        };

        cache.get_or_load(load).unwrap();
        cache.get_or_load(load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_requests_load_once() {
        let cache = LoadCache::default();
        let calls = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cache
                        .get_or_load(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(10));
                            empty()
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
