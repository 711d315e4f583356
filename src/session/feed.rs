// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live feed wiring between a record store and a session.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::db::{Collection, RecordStore, StoreError, Subscription};
use crate::models::StoredRecord;
use crate::session::TrackerSession;

#[derive(Debug, Clone)]
pub enum FeedPayload {
    Workouts(Vec<StoredRecord>),
    Readings(Vec<StoredRecord>),
}

/// A push tagged with the session generation it was subscribed under.
#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub generation: u64,
    pub payload: FeedPayload,
}

impl FeedEvent {
    /// Apply to the session. Returns `false` if the event was stale.
    pub fn apply(&self, session: &mut TrackerSession) -> bool {
        match &self.payload {
            FeedPayload::Workouts(records) => session.apply_workouts_push(self.generation, records),
            FeedPayload::Readings(records) => session.apply_readings_push(self.generation, records),
        }
    }
}

/// Workout and reading subscriptions for one owner.
///
/// Dropping the feed unsubscribes both; no event is sent afterwards.
pub struct LiveFeed {
    _workouts: Subscription,
    _readings: Subscription,
}

impl LiveFeed {
    pub async fn connect(
        store: &Arc<dyn RecordStore>,
        owner: &str,
        generation: u64,
        events: mpsc::UnboundedSender<FeedEvent>,
    ) -> Result<Self, StoreError> {
        let tx = events.clone();
        let workouts = store
            .subscribe(
                Collection::Workouts,
                owner,
                Box::new(move |records| {
                    let _ = tx.send(FeedEvent {
                        generation,
                        payload: FeedPayload::Workouts(records),
                    });
                }),
            )
            .await?;

        let readings = store
            .subscribe(
                Collection::BloodSugarReadings,
                owner,
                Box::new(move |records| {
                    let _ = events.send(FeedEvent {
                        generation,
                        payload: FeedPayload::Readings(records),
                    });
                }),
            )
            .await?;

        tracing::debug!(owner, generation, "Live feed connected");
        Ok(Self {
            _workouts: workouts,
            _readings: readings,
        })
    }
}

/// Switch the session to `owner` and connect a fresh feed.
///
/// Drops `current` first, so the old owner's feed is torn down before any
/// record of the new owner arrives.
pub async fn switch_owner(
    session: &mut TrackerSession,
    current: &mut Option<LiveFeed>,
    store: &Arc<dyn RecordStore>,
    owner: Option<String>,
    events: mpsc::UnboundedSender<FeedEvent>,
) -> Result<(), StoreError> {
    current.take();
    let generation = session.set_owner(owner.clone());
    if let Some(owner) = owner {
        *current = Some(LiveFeed::connect(store, &owner, generation, events).await?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;
    use std::time::Duration;

    fn fields(value: serde_json::Value) -> crate::models::Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn drain(
        rx: &mut mpsc::UnboundedReceiver<FeedEvent>,
        session: &mut TrackerSession,
    ) -> usize {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            if event.apply(session) {
                applied += 1;
            }
        }
        applied
    }

    #[tokio::test]
    async fn test_feed_pushes_writes_into_session() {
        let memory = MemoryStore::new();
        let store: Arc<dyn RecordStore> = Arc::new(memory.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = TrackerSession::new();
        let mut feed = None;

        switch_owner(&mut session, &mut feed, &store, Some("a".to_string()), tx)
            .await
            .unwrap();
        assert_eq!(drain(&mut rx, &mut session).await, 2);

        store
            .create(
                Collection::Workouts,
                "a",
                fields(json!({ "name": "Legs", "date": "2024-03-01" })),
            )
            .await
            .unwrap();
        drain(&mut rx, &mut session).await;
        assert_eq!(session.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_switching_owner_stops_old_feed() {
        let memory = MemoryStore::new();
        let store: Arc<dyn RecordStore> = Arc::new(memory.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = TrackerSession::new();
        let mut feed = None;

        switch_owner(&mut session, &mut feed, &store, Some("a".to_string()), tx.clone())
            .await
            .unwrap();
        drain(&mut rx, &mut session).await;

        switch_owner(&mut session, &mut feed, &store, None, tx)
            .await
            .unwrap();
        assert!(feed.is_none());

        store
            .create(Collection::Workouts, "a", fields(json!({ "name": "Legs" })))
            .await
            .unwrap();
        assert_eq!(drain(&mut rx, &mut session).await, 0);
        assert!(session.workouts().is_empty());
    }
}
