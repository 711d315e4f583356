// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence adapter: the record store interface and its implementations.
//!
//! The domain layer never talks to a storage vendor directly; it goes through
//! [`RecordStore`], keyed by collection and owner ID.

pub mod firestore;
pub mod live;
pub mod memory;

use async_trait::async_trait;

use crate::models::{Fields, StoredRecord};

pub use firestore::FirestoreStore;
pub use live::{ChangeCallback, LiveHub, Subscription};
pub use memory::MemoryStore;

/// Collection names as constants.
pub mod collections {
    pub const WORKOUTS: &str = "workouts";
    pub const BLOOD_SUGAR_READINGS: &str = "bloodSugarReadings";
    pub const WORKOUT_TEMPLATES: &str = "workoutTemplates";
}

/// Field holding the owner ID on every document.
pub const OWNER_FIELD: &str = "uid";

/// A document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Workouts,
    BloodSugarReadings,
    WorkoutTemplates,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Workouts => collections::WORKOUTS,
            Collection::BloodSugarReadings => collections::BLOOD_SUGAR_READINGS,
            Collection::WorkoutTemplates => collections::WORKOUT_TEMPLATES,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Missing document, or a document owned by someone else.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Store not reachable (offline mode, network, auth).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Owner-scoped document storage with live updates.
///
/// Every operation can fail asynchronously; callers must not assume a write
/// took effect until it returns `Ok`.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// All of the owner's documents in the collection.
    async fn list(&self, collection: Collection, owner: &str)
        -> Result<Vec<StoredRecord>, StoreError>;

    /// One owned document. A document owned by someone else is `NotFound`.
    async fn get(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<StoredRecord, StoreError>;

    /// Create a document. Any `id` key in `fields` is dropped and the owner
    /// field is stamped; the returned record carries the assigned ID.
    async fn create(
        &self,
        collection: Collection,
        owner: &str,
        fields: Fields,
    ) -> Result<StoredRecord, StoreError>;

    /// Merge `patch` into the top-level fields of an owned document.
    async fn update(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
        patch: Fields,
    ) -> Result<(), StoreError>;

    /// Delete an owned document.
    async fn remove(&self, collection: Collection, owner: &str, id: &str)
        -> Result<(), StoreError>;

    /// Push the owner's full record set now and after every change until the
    /// returned [`Subscription`] is dropped or unsubscribed.
    async fn subscribe(
        &self,
        collection: Collection,
        owner: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, StoreError>;
}

/// Strip the fields a caller may never write directly, then stamp the owner.
pub(crate) fn prepare_write(mut fields: Fields, owner: &str) -> Fields {
    fields.remove("id");
    fields.insert(
        OWNER_FIELD.to_string(),
        serde_json::Value::String(owner.to_string()),
    );
    fields
}

/// Whether a stored document belongs to `owner`.
pub(crate) fn is_owned_by(fields: &Fields, owner: &str) -> bool {
    fields.get(OWNER_FIELD).and_then(|v| v.as_str()) == Some(owner)
}
