// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;

use axum::routing::get;
use serde_json::json;

async fn empty_documents() -> axum::Json<Value> {
    axum::Json(json!({ "count": 0, "next": null, "previous": null, "results": [] }))
}

/// Bind a one-route Paperless stand-in and return its base URL.
async fn spawn_backend() -> String {
    let router = Router::new().route("/api/documents/", get(empty_documents));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind backend");
    let addr = listener.local_addr().expect("backend addr");
    tokio::spawn(axum::serve(listener, router).into_future());
    format!("http://{addr}")
}

/// Serve the full HTTP router on a real socket and return its address.
async fn spawn_gateway() -> std::net::SocketAddr {
    let backend = spawn_backend().await;
    let client = PaperlessClient::new(backend, "e2e-token").expect("client");
    let mcp = PaperdockMcp::new(client);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind gateway");
    let addr = listener.local_addr().expect("gateway addr");
    tokio::spawn(axum::serve(listener, mcp.http_router()).into_future());
    addr
}

/// Append chunks of an open SSE response to `buffer` until `pattern` shows up.
async fn collect_until(response: &mut reqwest::Response, buffer: &mut String, pattern: &str) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !buffer.contains(pattern) {
            let chunk = response.chunk().await.expect("sse chunk").expect("sse stream ended");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {pattern:?} in {buffer:?}"));
}

#[tokio::test]
async fn e2e_streamable_http_round_trip_over_a_real_socket() {
    let addr = spawn_gateway().await;

    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{addr}/mcp"))
        .header("accept", "application/json, text/event-stream")
        .header("content-type", "application/json")
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "list_documents", "arguments": {} }
            })
            .to_string(),
        )
        .send()
        .await
        .expect("tools/call");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.expect("response body");
    assert!(body.contains(NO_DOCUMENTS_FOUND), "unexpected response: {body}");
}

#[tokio::test]
async fn e2e_sse_handshake_routes_follow_ups_through_the_session() {
    let addr = spawn_gateway().await;
    let http = reqwest::Client::new();

    let mut events = http.get(format!("http://{addr}/sse")).send().await.expect("open sse");
    assert_eq!(events.status(), reqwest::StatusCode::OK);
    assert!(events
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/event-stream")));

    let mut buffer = String::new();
    collect_until(&mut events, &mut buffer, "sessionId=").await;
    let endpoint = buffer
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("endpoint event")
        .to_owned();
    let messages_url = format!("http://{addr}{endpoint}");

    let follow_ups = [
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "paperdock-e2e", "version": "0" }
            }
        }),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
    ];
    for message in follow_ups {
        let accepted = http
            .post(&messages_url)
            .header("content-type", "application/json")
            .body(message.to_string())
            .send()
            .await
            .expect("post follow-up");
        assert!(accepted.status().is_success(), "follow-up rejected: {}", accepted.status());
    }

    // The tool registry answer arrives on the event stream, not the POST.
    collect_until(&mut events, &mut buffer, "list_documents").await;
    assert!(buffer.contains("bulk_edit_document_types"), "tool registry missing: {buffer}");
}

#[tokio::test]
async fn e2e_unknown_session_is_a_client_error_and_the_listener_survives() {
    let addr = spawn_gateway().await;

    let http = reqwest::Client::new();

    // A follow-up for a session id the gateway never issued.
    let orphan = http
        .post(format!("http://{addr}/messages?sessionId=does-not-exist"))
        .header("content-type", "application/json")
        .body(
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        )
        .send()
        .await
        .expect("orphan follow-up");
    assert_eq!(orphan.status(), reqwest::StatusCode::NOT_FOUND);

    // The listener keeps serving other transports afterwards.
    let response = http
        .post(format!("http://{addr}/mcp"))
        .header("accept", "application/json, text/event-stream")
        .header("content-type", "application/json")
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/list",
            })
            .to_string(),
        )
        .send()
        .await
        .expect("tools/list");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.expect("response body");
    assert!(body.contains("list_documents"), "tool registry missing: {body}");
    assert!(body.contains("bulk_edit_document_types"), "tool registry missing: {body}");
}
