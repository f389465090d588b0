//! Bounded most-recently-used list of searched city names.
//!
//! The list is loaded once from a [`PersistenceStore`] and every `record` writes
//! the entire list back under [`RECENT_CITIES_KEY`]. Persistence failures are
//! logged and never propagated: the in-memory list stays authoritative for the
//! session.

use std::sync::Arc;

use crate::{error::PersistenceError, store::PersistenceStore};

pub const RECENT_CITIES_KEY: &str = "recentCities";
pub const RECENT_CAPACITY: usize = 5;

#[derive(Debug)]
pub struct RecentCities {
    store: Arc<dyn PersistenceStore>,
    cities: Vec<String>,
}

impl RecentCities {
    /// Loads the persisted list. Absent, unreadable or undecodable data yields an
    /// empty list.
    pub fn initialize(store: Arc<dyn PersistenceStore>) -> Self {
        let cities = match load_list(store.as_ref()) {
            Ok(Some(stored)) => normalize(stored),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load recent cities, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(count = cities.len(), "recent cities loaded");
        Self { store, cities }
    }

    /// Moves `city` to the front, evicts past capacity, then overwrites the
    /// persisted list.
    pub fn record(&mut self, city: &str) {
        push_front(&mut self.cities, city);

        if let Err(e) = save_list(self.store.as_ref(), &self.cities) {
            tracing::warn!(
                error = %e,
                cities = ?self.cities,
                "failed to persist recent cities, durable copy is now behind"
            );
        }
    }

    /// Most recent first.
    pub fn current(&self) -> &[String] {
        &self.cities
    }
}

fn push_front(cities: &mut Vec<String>, city: &str) {
    cities.retain(|c| c != city);
    cities.insert(0, city.to_string());
    cities.truncate(RECENT_CAPACITY);
}

/// Drops repeated entries (first one wins) and anything past capacity.
fn normalize(stored: Vec<String>) -> Vec<String> {
    let total = stored.len();
    let mut cities: Vec<String> = Vec::with_capacity(RECENT_CAPACITY);

    for city in stored {
        if cities.len() == RECENT_CAPACITY {
            break;
        }
        if !cities.contains(&city) {
            cities.push(city);
        }
    }

    if cities.len() != total {
        tracing::warn!(stored = total, kept = cities.len(), "normalized persisted recent cities");
    }
    cities
}

fn load_list(store: &dyn PersistenceStore) -> Result<Option<Vec<String>>, PersistenceError> {
    let Some(bytes) = store.load(RECENT_CITIES_KEY)? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| PersistenceError::Decode { key: RECENT_CITIES_KEY.to_string(), source })
}

fn save_list(store: &dyn PersistenceStore, cities: &[String]) -> Result<(), PersistenceError> {
    let bytes = serde_json::to_vec(cities)
        .map_err(|source| PersistenceError::Encode { key: RECENT_CITIES_KEY.to_string(), source })?;

    store.save(RECENT_CITIES_KEY, &bytes)
}
