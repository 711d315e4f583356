// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory record store for local development and tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::db::live::{ChangeCallback, LiveHub, Subscription};
use crate::db::{is_owned_by, prepare_write, Collection, RecordStore, StoreError};
use crate::models::{Fields, StoredRecord};

type Docs = HashMap<Collection, Vec<StoredRecord>>;

/// Documents kept in insertion order per collection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<Docs>>,
    next_id: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
    failing: Arc<Mutex<HashSet<Collection>>>,
    hub: LiveHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `Unavailable` (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail operations on one collection only.
    pub fn set_collection_unavailable(&self, collection: Collection, unavailable: bool) {
        let mut failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if unavailable {
            failing.insert(collection);
        } else {
            failing.remove(&collection);
        }
    }

    /// Insert a document as-is, bypassing write preparation.
    ///
    /// Used to seed legacy or malformed documents.
    pub fn insert_raw(&self, collection: Collection, id: &str, fields: Fields) {
        self.lock()
            .entry(collection)
            .or_default()
            .push(StoredRecord::new(id, fields));
    }

    fn lock(&self) -> MutexGuard<'_, Docs> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self, collection: Collection) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Memory store offline".to_string()));
        }
        self.fail_collection(collection)
    }

    fn fail_collection(&self, collection: Collection) -> Result<(), StoreError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&collection);
        if failing {
            Err(StoreError::Unavailable(format!("{} is offline", collection)))
        } else {
            Ok(())
        }
    }

    /// Publish while the caller still holds the document lock, so snapshots
    /// reach the hub in the order the writes happened.
    fn refresh(&self, docs: &Docs, collection: Collection, owner: &str) {
        if self.hub.is_watched(collection, owner) {
            let revision = self.hub.next_revision();
            self.hub
                .publish(collection, owner, revision, owned(docs, collection, owner));
        }
    }

    fn not_found(collection: Collection, id: &str) -> StoreError {
        StoreError::NotFound(format!("{}/{}", collection, id))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        owner: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        self.check_available(collection)?;
        let docs = self.lock();
        Ok(owned(&docs, collection, owner))
    }

    async fn get(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<StoredRecord, StoreError> {
        self.check_available(collection)?;
        let docs = self.lock();
        docs.get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .filter(|doc| is_owned_by(&doc.fields, owner))
            .cloned()
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn create(
        &self,
        collection: Collection,
        owner: &str,
        fields: Fields,
    ) -> Result<StoredRecord, StoreError> {
        self.check_available(collection)?;

        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = StoredRecord::new(id, prepare_write(fields, owner));
        let mut docs = self.lock();
        docs.entry(collection).or_default().push(record.clone());

        self.refresh(&docs, collection, owner);
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
        patch: Fields,
    ) -> Result<(), StoreError> {
        self.check_available(collection)?;
        let mut docs = self.lock();
        let doc = docs
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .filter(|doc| is_owned_by(&doc.fields, owner))
            .ok_or_else(|| Self::not_found(collection, id))?;

        for (key, value) in prepare_write(patch, owner) {
            doc.fields.insert(key, value);
        }

        self.refresh(&docs, collection, owner);
        Ok(())
    }

    async fn remove(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<(), StoreError> {
        self.check_available(collection)?;
        let mut docs = self.lock();
        let list = docs
            .get_mut(&collection)
            .ok_or_else(|| Self::not_found(collection, id))?;
        let index = list
            .iter()
            .position(|doc| doc.id == id && is_owned_by(&doc.fields, owner))
            .ok_or_else(|| Self::not_found(collection, id))?;
        list.remove(index);

        self.refresh(&docs, collection, owner);
        Ok(())
    }

    async fn subscribe(
        &self,
        collection: Collection,
        owner: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, StoreError> {
        self.check_available(collection)?;
        let rx = {
            let docs = self.lock();
            let revision = self.hub.next_revision();
            self.hub
                .watch(collection, owner, revision, owned(&docs, collection, owner))
        };
        Ok(Subscription::spawn(rx, on_change))
    }
}

fn owned(docs: &Docs, collection: Collection, owner: &str) -> Vec<StoredRecord> {
    docs.get(&collection)
        .map(|docs| {
            docs.iter()
                .filter(|doc| is_owned_by(&doc.fields, owner))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_stamps_owner_and_drops_id() {
        let store = MemoryStore::new();
        let record = store
            .create(
                Collection::Workouts,
                "owner-1",
                fields(json!({ "id": "client", "name": "Legs" })),
            )
            .await
            .unwrap();

        assert_eq!(record.id, "mem-1");
        assert_eq!(record.get("uid"), &json!("owner-1"));
        assert!(!record.fields.contains_key("id"));
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_in_insertion_order() {
        let store = MemoryStore::new();
        for (owner, name) in [("a", "first"), ("b", "other"), ("a", "second")] {
            store
                .create(Collection::Workouts, owner, fields(json!({ "name": name })))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list(Collection::Workouts, "a")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.get("name").clone())
            .collect();
        assert_eq!(names, vec![json!("first"), json!("second")]);
        assert!(store
            .list(Collection::BloodSugarReadings, "a")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = MemoryStore::new();
        let record = store
            .create(
                Collection::Workouts,
                "a",
                fields(json!({ "name": "Legs", "completed": false })),
            )
            .await
            .unwrap();

        store
            .update(
                Collection::Workouts,
                "a",
                &record.id,
                fields(json!({ "completed": true })),
            )
            .await
            .unwrap();

        let stored = &store.list(Collection::Workouts, "a").await.unwrap()[0];
        assert_eq!(stored.get("name"), &json!("Legs"));
        assert_eq!(stored.get("completed"), &json!(true));
    }

    #[tokio::test]
    async fn test_foreign_documents_are_not_found() {
        let store = MemoryStore::new();
        let record = store
            .create(Collection::Workouts, "a", fields(json!({ "name": "Legs" })))
            .await
            .unwrap();

        let update = store
            .update(Collection::Workouts, "b", &record.id, Fields::new())
            .await;
        assert!(matches!(update, Err(StoreError::NotFound(_))));

        let remove = store.remove(Collection::Workouts, "b", &record.id).await;
        assert!(matches!(remove, Err(StoreError::NotFound(_))));
        assert_eq!(store.list(Collection::Workouts, "a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.list(Collection::Workouts, "a").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.create(Collection::Workouts, "a", Fields::new()).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert!(store.list(Collection::Workouts, "a").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_pushes_after_writes() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let _sub = store
            .subscribe(
                Collection::Workouts,
                "a",
                Box::new(move |records| sink.lock().unwrap().push(records.len())),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        store
            .create(Collection::Workouts, "a", fields(json!({ "name": "Legs" })))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }
}
