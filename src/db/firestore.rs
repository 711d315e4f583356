// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed record store.
//!
//! Documents are handled as untyped JSON maps; the domain normalizer turns
//! them into typed records. Every document carries the owner's ID in `uid`.

use async_trait::async_trait;
use firestore::{FirestoreListenEvent, FirestoreListenerTarget, FirestoreMemListenStateStorage};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::db::live::{ChangeCallback, LiveHub, Subscription};
use crate::db::{is_owned_by, prepare_write, Collection, RecordStore, StoreError, OWNER_FIELD};
use crate::models::{Fields, StoredRecord};

const ID_FIELD: &str = "_firestore_id";
const CREATED_FIELD: &str = "_firestore_created";

/// Each listener carries a single query target.
const LISTEN_TARGET: u32 = 1;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
    hub: LiveHub,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            hub: LiveHub::new(),
        })
    }

    /// Emulator connection with a dummy bearer token.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            hub: LiveHub::new(),
        })
    }

    /// Offline client for tests. Every operation fails with `Unavailable`.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            hub: LiveHub::new(),
        }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or_else(|| {
            StoreError::Unavailable("Database not connected (offline mode)".to_string())
        })
    }

    async fn fetch_owned(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<StoredRecord, StoreError> {
        let doc: Option<Value> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection.as_str())
            .obj()
            .one(id)
            .await
            .map_err(backend)?;

        match doc.and_then(|v| into_record(v, Some(id))) {
            Some(record) if is_owned_by(&record.fields, owner) => Ok(record),
            _ => Err(StoreError::NotFound(format!("{}/{}", collection, id))),
        }
    }

    /// Re-list and push to subscribers, if there are any.
    async fn refresh(&self, collection: Collection, owner: &str) {
        if !self.hub.is_watched(collection, owner) {
            return;
        }
        let revision = self.hub.next_revision();
        match self.list(collection, owner).await {
            Ok(records) => {
                self.hub.publish(collection, owner, revision, records);
            }
            Err(e) => tracing::warn!(
                collection = %collection,
                owner,
                error = %e,
                "Failed to refresh live feed"
            ),
        }
    }

    /// Refresh the owner's feed on every server-side change to the collection,
    /// including writes made by other clients, until `stop` resolves.
    async fn listen(
        &self,
        collection: Collection,
        owner: &str,
        stop: oneshot::Receiver<()>,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let mut listener = client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(backend)?;

        let filter_owner = owner.to_string();
        client
            .fluent()
            .select()
            .from(collection.as_str())
            .filter(move |q| q.for_all([q.field(OWNER_FIELD).eq(filter_owner.clone())]))
            .listen()
            .add_target(FirestoreListenerTarget::new(LISTEN_TARGET), &mut listener)
            .map_err(backend)?;

        let store = self.clone();
        let owner = owner.to_string();
        let feed_owner = owner.clone();
        listener
            .start(move |event| {
                let store = store.clone();
                let owner = feed_owner.clone();
                async move {
                    if changes_documents(&event) {
                        store.refresh(collection, &owner).await;
                    }
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            })
            .await
            .map_err(backend)?;

        tokio::spawn(async move {
            let _ = stop.await;
            if let Err(e) = listener.shutdown().await {
                tracing::warn!(
                    collection = %collection,
                    owner = %owner,
                    error = %e,
                    "Failed to stop Firestore listener"
                );
            }
        });
        Ok(())
    }
}

fn changes_documents(event: &FirestoreListenEvent) -> bool {
    matches!(
        event,
        FirestoreListenEvent::DocumentChange(_)
            | FirestoreListenEvent::DocumentDelete(_)
            | FirestoreListenEvent::DocumentRemove(_)
            | FirestoreListenEvent::Filter(_)
    )
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn list(
        &self,
        collection: Collection,
        owner: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let owner = owner.to_string();
        let docs: Vec<Value> = self
            .get_client()?
            .fluent()
            .select()
            .from(collection.as_str())
            .filter(move |q| q.for_all([q.field(OWNER_FIELD).eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(backend)?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| into_record(doc, None))
            .collect())
    }

    async fn get(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<StoredRecord, StoreError> {
        self.fetch_owned(collection, owner, id).await
    }

    async fn create(
        &self,
        collection: Collection,
        owner: &str,
        fields: Fields,
    ) -> Result<StoredRecord, StoreError> {
        let doc = Value::Object(prepare_write(fields, owner));

        let created: Value = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection.as_str())
            .generate_document_id()
            .object(&doc)
            .execute()
            .await
            .map_err(backend)?;

        let record = into_record(created, None)
            .ok_or_else(|| StoreError::Backend("Created document has no ID".to_string()))?;

        tracing::debug!(collection = %collection, id = %record.id, "Created document");
        self.refresh(collection, owner).await;
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
        patch: Fields,
    ) -> Result<(), StoreError> {
        self.fetch_owned(collection, owner, id).await?;

        let patch = prepare_write(patch, owner);
        let keys: Vec<String> = patch.keys().cloned().collect();
        let doc = Value::Object(patch);

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(keys)
            .in_col(collection.as_str())
            .document_id(id)
            .object(&doc)
            .execute()
            .await
            .map_err(backend)?;

        self.refresh(collection, owner).await;
        Ok(())
    }

    async fn remove(
        &self,
        collection: Collection,
        owner: &str,
        id: &str,
    ) -> Result<(), StoreError> {
        self.fetch_owned(collection, owner, id).await?;

        self.get_client()?
            .fluent()
            .delete()
            .from(collection.as_str())
            .document_id(id)
            .execute()
            .await
            .map_err(backend)?;

        tracing::debug!(collection = %collection, id, "Deleted document");
        self.refresh(collection, owner).await;
        Ok(())
    }

    async fn subscribe(
        &self,
        collection: Collection,
        owner: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, StoreError> {
        let revision = self.hub.next_revision();
        let seed = self.list(collection, owner).await?;
        let rx = self.hub.watch(collection, owner, revision, seed);

        let mut subscription = Subscription::spawn(rx, on_change);
        let stop = subscription.on_cancel();
        self.listen(collection, owner, stop).await?;
        Ok(subscription)
    }
}

fn backend(e: firestore::errors::FirestoreError) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Split a fetched document into its ID and plain fields.
///
/// The server creation time fills in `createdAt` when the document has none.
fn into_record(doc: Value, known_id: Option<&str>) -> Option<StoredRecord> {
    let Value::Object(mut fields) = doc else {
        return None;
    };

    let id = match fields.remove(ID_FIELD) {
        Some(Value::String(id)) => id,
        _ => known_id?.to_string(),
    };
    if let Some(created) = fields.remove(CREATED_FIELD) {
        fields.entry("createdAt").or_insert(created);
    }
    fields.retain(|key, _| !key.starts_with("_firestore_"));

    Some(StoredRecord::new(id, fields))
}
