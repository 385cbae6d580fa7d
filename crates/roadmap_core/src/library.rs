//! crates/roadmap_core/src/library.rs
//!
//! The saved-roadmap collection of one profile, kept as a single JSON array
//! under a versioned key in a `KeyValueStore`.
//!
//! Every write replaces the whole array. Concurrent writers to the same
//! profile can overwrite each other. Array elements that do not read as a
//! `SavedRoadmap` are hidden from callers but written back untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Roadmap, SavedRoadmap};
use crate::ports::{KeyValueStore, PortError, PortResult};

pub const STORAGE_KEY: &str = "edai_saved_roadmaps_v3";

/// One element of the stored array.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredEntry {
    Readable(SavedRoadmap),
    Unreadable(Value),
}

impl StoredEntry {
    fn record(&self) -> Option<&SavedRoadmap> {
        match self {
            StoredEntry::Readable(record) => Some(record),
            StoredEntry::Unreadable(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct RoadmapLibrary {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl RoadmapLibrary {
    /// The library of the default profile.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// The library of a named profile; each profile has its own collection.
    pub fn for_profile(store: Arc<dyn KeyValueStore>, profile: &str) -> Self {
        Self {
            store,
            key: format!("{profile}/{STORAGE_KEY}"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All readable saved roadmaps, most recent first. Missing data, invalid
    /// JSON or a non-array payload load as an empty collection.
    pub async fn load_all(&self) -> PortResult<Vec<SavedRoadmap>> {
        Ok(self
            .load_entries()
            .await?
            .into_iter()
            .filter_map(|entry| match entry {
                StoredEntry::Readable(record) => Some(record),
                StoredEntry::Unreadable(_) => None,
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> PortResult<Option<SavedRoadmap>> {
        Ok(self.load_all().await?.into_iter().find(|r| r.id == id))
    }

    /// Stores `record` in front of the existing ones.
    pub async fn save_new(&self, record: SavedRoadmap) -> PortResult<()> {
        let mut entries = self.load_entries().await?;
        debug!(id = %record.id, existing = entries.len(), "Saving new roadmap");
        entries.insert(0, StoredEntry::Readable(record));
        self.write_all(&entries).await
    }

    /// Replaces the tree of the record with `id`, refreshing its cached
    /// XP, progress and document. Returns the updated record, or `None` when
    /// no record has that id (nothing is written in that case).
    pub async fn update_in_place(
        &self,
        id: &str,
        roadmap: Roadmap,
    ) -> PortResult<Option<SavedRoadmap>> {
        let mut entries = self.load_entries().await?;
        let Some(record) = entries.iter_mut().find_map(|entry| match entry {
            StoredEntry::Readable(record) if record.id == id => Some(record),
            _ => None,
        }) else {
            debug!(id, "update_in_place: no saved roadmap with this id");
            return Ok(None);
        };
        record.replace_roadmap(roadmap);
        let updated = record.clone();

        self.write_all(&entries).await?;
        Ok(Some(updated))
    }

    async fn load_entries(&self) -> PortResult<Vec<StoredEntry>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let values = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable saved roadmaps");
                return Ok(Vec::new());
            }
        };

        let entries: Vec<StoredEntry> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match SavedRoadmap::deserialize(&value) {
                Ok(record) => StoredEntry::Readable(record),
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "Skipping unreadable saved roadmap");
                    StoredEntry::Unreadable(value)
                }
            })
            .collect();
        debug!(
            key = %self.key,
            readable = entries.iter().filter(|e| e.record().is_some()).count(),
            total = entries.len(),
            "Loaded saved roadmaps"
        );
        Ok(entries)
    }

    async fn write_all(&self, entries: &[StoredEntry]) -> PortResult<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| PortError::Unexpected(format!("failed to serialize roadmaps: {e}")))?;
        self.store.set(&self.key, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Day, GenerateRoadmapRequest, Item, ItemCategory, Phase, Week};
    use crate::ports::MemoryStore;
    use crate::toggle::{toggle_day, toggle_item, DayPath};
    use chrono::Utc;

    fn saved(id: &str) -> SavedRoadmap {
        let day = |n| Day {
            day_number: n,
            xp_reward: 50,
            learn_items: vec![
                Item { xp: 10, ..Item::default() },
                Item { xp: 10, ..Item::default() },
            ],
            ..Day::default()
        };
        let roadmap = Roadmap {
            id: id.to_string(),
            title: format!("Roadmap {id}"),
            total_xp: 100,
            phases: vec![Phase {
                id: "p1".into(),
                weeks: vec![Week {
                    week_number: 1,
                    days: vec![day(1), day(2)],
                    ..Week::default()
                }],
                ..Phase::default()
            }],
            ..Roadmap::default()
        };
        SavedRoadmap::new(roadmap, &GenerateRoadmapRequest::new("Testing"), Utc::now())
    }

    fn library() -> (Arc<MemoryStore>, RoadmapLibrary) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), RoadmapLibrary::new(store))
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let (_, library) = library();
        assert!(library.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payloads_load_as_empty() {
        let (store, library) = library();
        for raw in ["not json", "{\"id\": 1}", "42", "[{\"broken\": true}]", ""] {
            store.set(STORAGE_KEY, raw).await.unwrap();
            assert!(library.load_all().await.unwrap().is_empty(), "payload {raw:?}");
        }
    }

    #[tokio::test]
    async fn unreadable_elements_are_skipped_but_kept_on_write() {
        let (store, library) = library();
        let good = serde_json::to_value(saved("good")).unwrap();
        let mut legacy = good.clone();
        legacy["id"] = "legacy".into();
        legacy.as_object_mut().unwrap().remove("createdAt");
        store
            .set(STORAGE_KEY, &serde_json::to_string(&vec![good, legacy.clone()]).unwrap())
            .await
            .unwrap();

        let ids: Vec<String> = library.load_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["good"]);

        library.save_new(saved("new")).await.unwrap();
        library
            .update_in_place("good", Roadmap::default())
            .await
            .unwrap()
            .unwrap();

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&store.get(STORAGE_KEY).await.unwrap().unwrap()).unwrap();
        let stored_ids: Vec<&str> = raw.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(stored_ids, vec!["new", "good", "legacy"]);
        assert_eq!(raw[2], legacy);
    }

    #[tokio::test]
    async fn save_new_puts_most_recent_first() {
        let (_, library) = library();
        library.save_new(saved("first")).await.unwrap();
        library.save_new(saved("second")).await.unwrap();

        let ids: Vec<String> = library
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn update_in_place_recomputes_cached_fields() {
        let (_, library) = library();
        library.save_new(saved("a")).await.unwrap();
        library.save_new(saved("b")).await.unwrap();

        let record = library.get("a").await.unwrap().unwrap();
        let toggled = toggle_day(&record.roadmap_json, &DayPath::new("p1", 1, 1));
        let updated = library.update_in_place("a", toggled).await.unwrap().unwrap();

        assert_eq!(updated.earned_xp, 50);
        assert_eq!(updated.progress, 50);
        assert!(updated.markdown.contains("> **Progress:** 50% | **XP Earned:** 50 / 100"));

        let reloaded = library.load_all().await.unwrap();
        assert_eq!(reloaded[1], updated);
        assert_eq!(reloaded[0].progress, 0, "other records are untouched");
        assert_eq!(reloaded[0].id, "b");
    }

    #[tokio::test]
    async fn item_toggles_flow_through_to_the_stored_record() {
        let (_, library) = library();
        library.save_new(saved("a")).await.unwrap();
        let path = DayPath::new("p1", 1, 2);

        let record = library.get("a").await.unwrap().unwrap();
        let once = toggle_item(&record.roadmap_json, &path, ItemCategory::Learn, 0);
        let twice = toggle_item(&once, &path, ItemCategory::Learn, 1);
        let updated = library.update_in_place("a", twice).await.unwrap().unwrap();

        assert!(updated.roadmap_json.phases[0].weeks[0].days[1].completed);
        assert_eq!(updated.earned_xp, 50);
        assert_eq!(updated.progress, 50);
    }

    #[tokio::test]
    async fn update_of_unknown_id_writes_nothing() {
        let (store, library) = library();
        assert!(library
            .update_in_place("missing", Roadmap::default())
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.get(STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn profiles_have_separate_collections() {
        let store = Arc::new(MemoryStore::new());
        let alice = RoadmapLibrary::for_profile(store.clone(), "alice");
        let bob = RoadmapLibrary::for_profile(store.clone(), "bob");

        alice.save_new(saved("a")).await.unwrap();

        assert_eq!(alice.load_all().await.unwrap().len(), 1);
        assert!(bob.load_all().await.unwrap().is_empty());
        assert_eq!(alice.key(), "alice/edai_saved_roadmaps_v3");
    }
}
