use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// In-process TTL cache shared across the scheduler, handlers, and worker
/// tasks. All writes are whole-value replacements of the serialized JSON,
/// so concurrent readers never observe partial state; last writer wins.
///
/// Values are stored as their JSON text: what a reader gets back before
/// expiry is byte-for-byte what was stored.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    json: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Failed to deserialize cached value for {key}: {err}");
                None
            }
        }
    }

    /// The stored JSON text, untouched. `None` after expiry or deletion.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            debug!("Cache EXPIRED: {key}");
            return None;
        }
        debug!("Cache HIT: {key}");
        Some(entry.json.clone())
    }

    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(value)?;
        debug!("Cache SET: {key} (TTL: {ttl:?})");
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                json,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    pub fn delete(&self, key: &str) {
        debug!("Cache DELETE: {key}");
        self.entries.remove(key);
    }

    /// Whether a live (non-expired) entry exists without touching it.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Claim the single-flight marker under `key`. Returns `None` when a
    /// live marker is already held; otherwise the returned guard keeps the
    /// marker alive and removes it on drop, including on panic unwinds.
    /// The TTL is the dead-man's-switch for the case where the process
    /// dies without unwinding.
    pub fn try_begin_flight(self: &Arc<Self>, key: &str, ttl: Duration) -> Option<FlightGuard> {
        let marker = CacheEntry {
            json: "true".to_string(),
            expires_at: Instant::now() + ttl,
        };

        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if !occupied.get().is_expired() {
                    return None;
                }
                occupied.insert(marker);
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(marker);
            }
        }

        Some(FlightGuard {
            cache: Arc::clone(self),
            key: key.to_string(),
        })
    }
}

/// RAII handle for an in-flight marker; dropping it clears the flag.
#[derive(Debug)]
pub struct FlightGuard {
    cache: Arc<TtlCache>,
    key: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.cache.delete(&self.key);
        debug!("Flight guard released: {}", self.key);
    }
}

/// Well-known cache keys, kept in one place so invalidation and reads
/// cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    pub fn dashboard() -> &'static str {
        "dashboard:v1"
    }

    pub fn snapshot() -> &'static str {
        "library:snapshot"
    }

    pub fn classified() -> &'static str {
        "library:classified"
    }

    pub fn sonarr_summary() -> &'static str {
        "sonarr:summary"
    }

    pub fn radarr_summary() -> &'static str {
        "radarr:summary"
    }

    pub fn sonarr_folders() -> &'static str {
        "sonarr:root-folders"
    }

    pub fn radarr_folders() -> &'static str {
        "radarr:root-folders"
    }

    pub fn storage() -> &'static str {
        "storage:combined"
    }

    pub fn archive_storage() -> &'static str {
        "storage:archive"
    }

    pub fn sync_flight() -> &'static str {
        "sync:in-flight"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_stored_json_byte_for_byte() {
        let cache = TtlCache::new();
        let value = serde_json::json!({"b": 1, "a": [1, 2, 3]});
        cache.set("k", &value, Duration::from_secs(60)).unwrap();

        let expected = serde_json::to_string(&value).unwrap();
        assert_eq!(cache.get_raw("k").unwrap(), expected);
        assert_eq!(cache.get::<serde_json::Value>("k").unwrap(), value);
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let cache = TtlCache::new();
        cache.set("k", &42u32, Duration::from_millis(0)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get::<u32>("k"), None);
        assert!(!cache.contains("k"));
    }

    #[test]
    fn delete_removes_live_entries() {
        let cache = TtlCache::new();
        cache.set("k", &1u32, Duration::from_secs(60)).unwrap();
        cache.delete("k");
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn second_flight_is_rejected_while_first_is_held() {
        let cache = Arc::new(TtlCache::new());
        let guard = cache.try_begin_flight("sync", Duration::from_secs(60));
        assert!(guard.is_some());
        assert!(cache.try_begin_flight("sync", Duration::from_secs(60)).is_none());
    }

    #[test]
    fn dropping_the_guard_releases_the_flight() {
        let cache = Arc::new(TtlCache::new());
        drop(cache.try_begin_flight("sync", Duration::from_secs(60)));
        assert!(cache.try_begin_flight("sync", Duration::from_secs(60)).is_some());
    }

    #[test]
    fn expired_guard_marker_can_be_reclaimed() {
        let cache = Arc::new(TtlCache::new());
        let stale = cache.try_begin_flight("sync", Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        // Dead-man's-switch: the marker expired even though the guard leaked.
        let fresh = cache.try_begin_flight("sync", Duration::from_secs(60));
        assert!(fresh.is_some());
        drop(stale);
    }
}
