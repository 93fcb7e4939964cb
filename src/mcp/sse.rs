// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! SSE fallback transport: `GET /sse` opens a session and streams server
//! output as `message` events, `POST /messages?sessionId=` feeds follow-ups
//! into it.
//!
//! Each session bridges the event stream onto the line-delimited io transport
//! over an in-process duplex pipe: posted messages are appended as lines, and
//! every line the server writes becomes one SSE event. The first event is
//! `endpoint`, carrying the follow-up URL with the generated session id.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use rmcp::ServiceExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf};
use tokio::sync::Mutex;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use super::server::PaperdockMcp;

/// Per-session pipe capacity. A follow-up blocks once this fills, which only
/// happens when the session stops consuming its event stream.
const SESSION_PIPE_CAPACITY: usize = 1 << 16;

struct SseState {
    mcp: PaperdockMcp,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, WriteHalf<DuplexStream>>>,
}

impl SseState {
    fn new_session_id(&self) -> String {
        let nanos =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{nanos:x}-{counter:x}")
    }
}

/// Removes the session entry when the event stream is dropped. This is the
/// only removal path, so a closed connection cannot leave a writable entry
/// behind.
struct SessionGuard {
    session_id: String,
    state: Arc<SseState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = Arc::clone(&self.state);
        let session_id = std::mem::take(&mut self.session_id);
        tokio::spawn(async move {
            state.sessions.lock().await.remove(&session_id);
            debug!(%session_id, "sse session closed");
        });
    }
}

pub(super) fn router(mcp: PaperdockMcp) -> Router {
    let state = Arc::new(SseState {
        mcp,
        counter: AtomicU64::new(0),
        sessions: Mutex::new(HashMap::new()),
    });
    Router::new()
        .route("/sse", get(open_session))
        .route("/messages", post(post_message))
        .with_state(state)
}

async fn open_session(
    State(state): State<Arc<SseState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (gateway_end, session_end) = tokio::io::duplex(SESSION_PIPE_CAPACITY);
    let (server_read, server_write) = tokio::io::split(gateway_end);
    let (client_read, client_write) = tokio::io::split(session_end);

    let session_id = state.new_session_id();
    state.sessions.lock().await.insert(session_id.clone(), client_write);
    debug!(%session_id, "sse session opened");

    let mcp = state.mcp.clone();
    tokio::spawn(async move {
        match mcp.serve((server_read, server_write)).await {
            Ok(service) => {
                let _ = service.waiting().await;
            }
            Err(err) => debug!("sse session ended during handshake: {err}"),
        }
    });

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?sessionId={session_id}"));
    let guard = SessionGuard { session_id, state: Arc::clone(&state) };

    let messages = LinesStream::new(BufReader::new(client_read).lines())
        .filter_map(|line| line.ok().map(|line| Ok(Event::default().event("message").data(line))));
    let stream =
        tokio_stream::once(Ok::<_, Infallible>(endpoint)).chain(messages).map(move |event| {
            let _open = &guard;
            event
        });
    Sse::new(stream)
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn post_message(
    State(state): State<Arc<SseState>>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    // Re-serialized so the pipe always carries exactly one line per message.
    let message: Value = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid JSON body").into_response(),
    };

    let mut sessions = state.sessions.lock().await;
    let Some(writer) = sessions.get_mut(&query.session_id) else {
        return (StatusCode::NOT_FOUND, "unknown session").into_response();
    };

    let mut line = message.to_string();
    line.push('\n');
    if writer.write_all(line.as_bytes()).await.is_err() {
        return (StatusCode::NOT_FOUND, "session closed").into_response();
    }
    StatusCode::ACCEPTED.into_response()
}
