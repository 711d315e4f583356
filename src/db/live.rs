// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live record feeds.
//!
//! Stores publish the owner's full record set after every successful write.
//! Each `(collection, owner)` pair has one `watch` channel, so slow subscribers
//! only ever see the newest snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::db::Collection;
use crate::models::StoredRecord;

/// Callback invoked with every pushed snapshot.
///
/// Must not drop its own [`Subscription`].
pub type ChangeCallback = Box<dyn Fn(Vec<StoredRecord>) + Send + Sync + 'static>;

/// An owner's full record set as read at `revision`.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub revision: u64,
    pub records: Vec<StoredRecord>,
}

type FeedKey = (Collection, String);

/// Registry of live feeds, shared by a store and its subscriptions.
///
/// Snapshots are stamped with a revision taken from [`LiveHub::next_revision`]
/// before the read they hold. A feed only ever moves to a newer revision, so a
/// slow read that finishes late cannot overwrite a fresher one.
#[derive(Clone, Default)]
pub struct LiveHub {
    feeds: Arc<DashMap<FeedKey, watch::Sender<Arc<Snapshot>>>>,
    revision: Arc<AtomicU64>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision for a read that is about to start.
    pub fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether anyone is still listening to this feed.
    pub fn is_watched(&self, collection: Collection, owner: &str) -> bool {
        self.feeds
            .get(&(collection, owner.to_string()))
            .is_some_and(|tx| tx.receiver_count() > 0)
    }

    /// Push a fresh snapshot to subscribers. Feeds without subscribers are dropped.
    ///
    /// Returns `false` if the feed already holds a newer revision.
    pub fn publish(
        &self,
        collection: Collection,
        owner: &str,
        revision: u64,
        records: Vec<StoredRecord>,
    ) -> bool {
        let key = (collection, owner.to_string());
        self.feeds.remove_if(&key, |_, tx| tx.receiver_count() == 0);

        let Some(tx) = self.feeds.get(&key) else {
            return false;
        };
        let published = advance(&tx, revision, records);
        tracing::debug!(
            collection = %collection,
            owner,
            revision,
            published,
            subscribers = tx.receiver_count(),
            "Published live snapshot"
        );
        published
    }

    /// Subscribe to a feed. `seed` replaces whatever the feed holds unless the
    /// feed already has a newer revision.
    pub fn watch(
        &self,
        collection: Collection,
        owner: &str,
        revision: u64,
        seed: Vec<StoredRecord>,
    ) -> watch::Receiver<Arc<Snapshot>> {
        let entry = self
            .feeds
            .entry((collection, owner.to_string()))
            .or_insert_with(|| watch::channel(Arc::new(Snapshot::default())).0);
        advance(&entry, revision, seed);
        entry.subscribe()
    }

    /// Number of live feeds (for diagnostics and tests).
    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }
}

fn advance(tx: &watch::Sender<Arc<Snapshot>>, revision: u64, records: Vec<StoredRecord>) -> bool {
    tx.send_if_modified(|current| {
        if revision <= current.revision {
            return false;
        }
        *current = Arc::new(Snapshot { revision, records });
        true
    })
}

/// Handle to a live feed. Dropping it stops all further callbacks.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
    /// `false` once cancelled; the lock is held for the duration of a callback.
    active: Arc<Mutex<bool>>,
    /// Dropped on cancel, which stops whatever feeds the hub for this subscriber
    teardown: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Forward every snapshot on `rx` to `on_change`, starting with the current one.
    pub fn spawn(mut rx: watch::Receiver<Arc<Snapshot>>, on_change: ChangeCallback) -> Self {
        let active = Arc::new(Mutex::new(true));
        let gate = active.clone();

        let task = tokio::spawn(async move {
            loop {
                let snapshot = rx.borrow_and_update().clone();
                {
                    let guard = gate.lock().unwrap_or_else(|e| e.into_inner());
                    if !*guard {
                        break;
                    }
                    on_change(snapshot.records.clone());
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            task: Some(task),
            active,
            teardown: None,
        }
    }

    /// Tie a background producer to this subscription: the returned receiver
    /// resolves once the subscription is cancelled or dropped.
    pub fn on_cancel(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.teardown = Some(tx);
        rx
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Stop the feed. No callback runs after this returns.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            *self.active.lock().unwrap_or_else(|e| e.into_inner()) = false;
            task.abort();
        }
        self.teardown.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
