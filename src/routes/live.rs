// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-sent dashboard updates.
//!
//! Each connection owns a [`TrackerSession`] fed by a [`LiveFeed`]. Every
//! accepted push yields one `dashboard` event; closing the connection drops
//! the feed and ends both subscriptions.

use crate::domain::ViewFilter;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::{parse_date_param, request_clock};
use crate::session::{switch_owner, FeedEvent, LiveFeed, TrackerSession, View};
use crate::time_utils::LocalClock;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Extension, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/live", get(live_dashboard))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveQuery {
    view: Option<View>,
    filter: Option<ViewFilter>,
    date: Option<String>,
    tz_offset: Option<String>,
}

struct LiveConnection {
    session: TrackerSession,
    events: mpsc::UnboundedReceiver<FeedEvent>,
    clock: LocalClock,
    _feed: Option<LiveFeed>,
}

async fn live_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<LiveQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let clock = request_clock(&state, params.tz_offset.as_deref())?;
    let date = parse_date_param(params.date.as_deref())?;

    let (tx, events) = mpsc::unbounded_channel();
    let mut session = TrackerSession::new();
    let mut feed = None;
    switch_owner(
        &mut session,
        &mut feed,
        &state.store,
        Some(user.owner_id.clone()),
        tx,
    )
    .await
    .map_err(AppError::from)?;

    session.set_filter(params.filter.unwrap_or_default());
    session.set_date_filter(date);
    session.navigate(params.view.unwrap_or_default());

    tracing::info!(owner = %user.owner_id, "Live dashboard connected");

    let connection = LiveConnection {
        session,
        events,
        clock,
        _feed: feed,
    };

    let stream = stream::unfold(connection, |mut conn| async move {
        loop {
            let event = conn.events.recv().await?;
            if event.apply(&mut conn.session) {
                let dashboard = conn.session.dashboard(&conn.clock);
                let sse = Event::default().event("dashboard").json_data(&dashboard);
                return Some((sse, conn));
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
