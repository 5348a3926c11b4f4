use dashmap::DashMap;

use crate::models::Geocode;

/// Store of previously resolved addresses, keyed by the exact address text.
///
/// Freshness is up to the implementation; the geocoder only calls `get`
/// before resolving and `put` after a confident resolution.
pub trait GeocodeCache: Send + Sync {
    fn get(&self, address: &str) -> Option<Geocode>;

    fn put(&self, address: &str, geocode: Geocode);

    /// Drops one entry, returning whether it was present
    fn invalidate(&self, address: &str) -> bool;

    fn clear(&self);
}

/// Process-local cache, one instance shared by reference between runs
#[derive(Debug, Default)]
pub struct InMemoryGeocodeCache {
    entries: DashMap<String, Geocode>,
}

impl InMemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeocodeCache for InMemoryGeocodeCache {
    fn get(&self, address: &str) -> Option<Geocode> {
        self.entries.get(address).map(|entry| entry.value().clone())
    }

    fn put(&self, address: &str, geocode: Geocode) {
        self.entries.insert(address.to_string(), geocode);
    }

    fn invalidate(&self, address: &str) -> bool {
        self.entries.remove(address).is_some()
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
