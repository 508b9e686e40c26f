use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::store::SettingsStore;

/// Settings key the favorite ids are stored under.
pub const FAVORITES_KEY: &str = "favorites";

/// A favorites write that did not reach the settings store.
///
/// The in-memory set already reflects the mutation; this only reports that
/// the next session may not see it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("could not encode {key}: {reason}")]
    Encode { key: &'static str, reason: String },
    #[error("could not save {key}: {reason}")]
    Write { key: &'static str, reason: String },
}

/// The user's favorite recipe ids, in the order they were added.
///
/// Every mutation rewrites the full set as a JSON array under [`FAVORITES_KEY`].
pub struct FavoritesStore<S> {
    store: S,
    ids: Vec<i64>,
    index: HashSet<i64>,
    write_error: Option<PersistError>,
}

impl<S: SettingsStore> FavoritesStore<S> {
    /// Restore favorites from `store`. Missing, unreadable or malformed state
    /// starts an empty set.
    pub fn load(store: S) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match parse_ids(&raw) {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(error = %err, "ignoring malformed favorites state");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "favorites state unavailable, starting empty");
                Vec::new()
            }
        };

        let mut favorites = Self {
            store,
            ids: Vec::with_capacity(ids.len()),
            index: HashSet::with_capacity(ids.len()),
            write_error: None,
        };
        for id in ids {
            favorites.insert(id);
        }
        debug!(count = favorites.ids.len(), "loaded favorites");
        favorites
    }

    #[must_use]
    pub fn is_favorite(&self, id: i64) -> bool {
        self.index.contains(&id)
    }

    /// Flip membership of `id`. Returns whether it is a favorite afterwards.
    pub fn toggle(&mut self, id: i64) -> bool {
        let now_favorite = if self.is_favorite(id) {
            self.delete(id);
            false
        } else {
            self.insert(id);
            true
        };
        self.persist();
        now_favorite
    }

    /// Mark `id` as a favorite. Returns `true` if it was not one before.
    pub fn add(&mut self, id: i64) -> bool {
        let added = self.insert(id);
        self.persist();
        added
    }

    /// Unmark `id`. Removing an id that is not a favorite is a no-op and
    /// leaves the stored value untouched. Returns whether it was present.
    pub fn remove(&mut self, id: i64) -> bool {
        let removed = self.delete(id);
        if removed {
            self.persist();
        }
        removed
    }

    #[must_use]
    pub fn list(&self) -> &[i64] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The failure of the most recent write, if it failed. Cleared on read
    /// and by any later successful write.
    pub fn take_write_error(&mut self) -> Option<PersistError> {
        self.write_error.take()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn insert(&mut self, id: i64) -> bool {
        if self.index.insert(id) {
            self.ids.push(id);
            true
        } else {
            false
        }
    }

    fn delete(&mut self, id: i64) -> bool {
        if self.index.remove(&id) {
            self.ids.retain(|&fav| fav != id);
            true
        } else {
            false
        }
    }

    fn persist(&mut self) {
        self.write_error = match self.write() {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "favorites kept in memory only");
                Some(err)
            }
        };
    }

    fn write(&self) -> Result<(), PersistError> {
        let encoded = serde_json::to_string(&self.ids).map_err(|e| PersistError::Encode {
            key: FAVORITES_KEY,
            reason: e.to_string(),
        })?;
        self.store
            .set(FAVORITES_KEY, &encoded)
            .map_err(|e| PersistError::Write {
                key: FAVORITES_KEY,
                reason: format!("{e:#}"),
            })
    }
}

fn parse_ids(raw: &str) -> Result<Vec<i64>, serde_json::Error> {
    serde_json::from_str(raw)
}
