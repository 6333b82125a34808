use crate::tmdb::{MediaKind, strip_poster_prefix};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const STORE_FILE: &str = "watchlist.json";

/// Overviews are truncated before persisting; the popup and list row only
/// ever show a short blurb.
pub const OVERVIEW_LIMIT: usize = 240;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write watchlist: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize watchlist: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One saved title. `poster_path` is provider-relative (prefix stripped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: String,
    pub poster_path: String,
    #[serde(default)]
    pub overview: String,
}

impl WatchlistItem {
    /// Build an entry from listing data, normalizing the poster path and
    /// truncating the overview.
    pub fn from_listing(
        kind: MediaKind,
        id: u64,
        title: &str,
        poster_path: &str,
        overview: &str,
    ) -> Self {
        let overview: String = overview.chars().take(OVERVIEW_LIMIT).collect();
        Self {
            id,
            kind,
            title: title.to_string(),
            poster_path: strip_poster_prefix(poster_path),
            overview,
        }
    }
}

/// Persistent watchlist, one JSON file read and rewritten whole on every
/// mutation. Reads fail open: a missing or corrupt file is an empty list.
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Vec<WatchlistItem> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.list().iter().any(|item| item.id == id)
    }

    /// Add the item, or remove the existing entry with the same id. Returns
    /// the new membership state. Persists before returning.
    pub fn toggle(&self, item: WatchlistItem) -> Result<bool, StoreError> {
        let mut list = self.list();
        let added = match list.iter().position(|existing| existing.id == item.id) {
            Some(index) => {
                list.remove(index);
                false
            }
            None => {
                list.push(item);
                true
            }
        };
        self.save(&list)?;
        Ok(added)
    }

    /// Remove by id; a miss is a no-op but still persists.
    pub fn remove(&self, id: u64) -> Result<(), StoreError> {
        let mut list = self.list();
        list.retain(|item| item.id != id);
        self.save(&list)
    }

    fn save(&self, list: &[WatchlistItem]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(list)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store() -> (tempfile::TempDir, WatchlistStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::new(dir.path().join(STORE_FILE));
        (dir, store)
    }

    fn item(id: u64) -> WatchlistItem {
        WatchlistItem::from_listing(
            MediaKind::Movie,
            id,
            &format!("Title {id}"),
            "https://image.tmdb.org/t/p/w500/poster.jpg",
            "overview",
        )
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, store) = store();
        assert!(store.list().is_empty());
        assert!(!store.contains(1));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn double_toggle_restores_original_state() {
        let (_dir, store) = store();
        assert!(store.toggle(item(550)).unwrap());
        assert!(store.contains(550));
        assert!(!store.toggle(item(550)).unwrap());
        assert!(!store.contains(550));
        assert!(store.list().is_empty());
    }

    #[test]
    fn remove_is_a_no_op_for_unknown_ids() {
        let (_dir, store) = store();
        store.toggle(item(1)).unwrap();
        store.remove(99).unwrap();
        assert_eq!(store.list().len(), 1);
        store.remove(1).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let (_dir, store) = store();
        for id in [3, 1, 2] {
            store.toggle(item(id)).unwrap();
        }
        let ids: Vec<u64> = store.list().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn listing_normalizes_poster_and_truncates_overview() {
        let long = "x".repeat(OVERVIEW_LIMIT + 50);
        let entry = WatchlistItem::from_listing(
            MediaKind::Tv,
            42,
            "Show",
            "https://image.tmdb.org/t/p/w500/rel.jpg",
            &long,
        );
        assert_eq!(entry.poster_path, "/rel.jpg");
        assert_eq!(entry.overview.len(), OVERVIEW_LIMIT);
    }

    #[test]
    fn persisted_format_round_trips() {
        let entry = item(7);
        let json = serde_json::to_string(&vec![entry.clone()]).unwrap();
        assert!(json.contains("\"type\":\"movie\""));
        let back: Vec<WatchlistItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![entry]);
    }

    proptest! {
        /// Any toggle sequence leaves at most one entry per id, and an even
        /// number of toggles of one id restores its absence.
        #[test]
        fn toggles_never_duplicate_ids(ids in proptest::collection::vec(0u64..8, 1..32)) {
            let (_dir, store) = store();
            for &id in &ids {
                store.toggle(item(id)).unwrap();
            }
            let list = store.list();
            let mut seen = std::collections::HashSet::new();
            for entry in &list {
                prop_assert!(seen.insert(entry.id), "duplicate id {}", entry.id);
            }
            for &id in &ids {
                let toggles = ids.iter().filter(|&&i| i == id).count();
                prop_assert_eq!(store.contains(id), toggles % 2 == 1);
            }
        }
    }
}
