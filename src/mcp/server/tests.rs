// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::extract::{Path, State};
use axum::http::StatusCode as HttpStatus;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use rstest::rstest;
use serde_json::json;

/// Fake Paperless backend: canned listing bodies plus recorders for the
/// bulk and create endpoints.
#[derive(Default)]
struct BackendState {
    documents: Mutex<Value>,
    tags: Mutex<Value>,
    tag_fetches: AtomicUsize,
    fail_documents: AtomicBool,
    last_document_bulk: Mutex<Option<Value>>,
    last_object_bulk: Mutex<Option<Value>>,
    last_created_tag: Mutex<Option<Value>>,
}

fn paged(results: Value) -> Value {
    let count = results.as_array().map_or(0, Vec::len);
    json!({ "count": count, "next": null, "previous": null, "results": results })
}

async fn backend_documents(State(state): State<Arc<BackendState>>) -> Response {
    if state.fail_documents.load(Ordering::SeqCst) {
        return (HttpStatus::INTERNAL_SERVER_ERROR, "index unavailable").into_response();
    }
    axum::Json(state.documents.lock().expect("backend state").clone()).into_response()
}

async fn backend_document(Path(id): Path<u64>) -> Response {
    axum::Json(json!({ "id": id, "title": "Full record", "content": "body text" }))
        .into_response()
}

async fn backend_document_bulk(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    *state.last_document_bulk.lock().expect("backend state") = Some(body);
    axum::Json(json!("OK")).into_response()
}

async fn backend_tags(State(state): State<Arc<BackendState>>) -> Response {
    state.tag_fetches.fetch_add(1, Ordering::SeqCst);
    axum::Json(state.tags.lock().expect("backend state").clone()).into_response()
}

async fn backend_create_tag(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    *state.last_created_tag.lock().expect("backend state") = Some(body.clone());
    let mut created = body;
    created["id"] = json!(10);
    axum::Json(created).into_response()
}

async fn backend_delete_tag(Path(_id): Path<u64>) -> Response {
    HttpStatus::NO_CONTENT.into_response()
}

async fn backend_object_bulk(
    State(state): State<Arc<BackendState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    *state.last_object_bulk.lock().expect("backend state") = Some(body);
    axum::Json(json!("OK")).into_response()
}

fn backend_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/documents/", get(backend_documents))
        .route("/api/documents/{id}/", get(backend_document))
        .route("/api/documents/bulk_edit/", post(backend_document_bulk))
        .route("/api/tags/", get(backend_tags).post(backend_create_tag))
        .route("/api/tags/{id}/", delete(backend_delete_tag))
        .route("/api/bulk_edit_objects/", post(backend_object_bulk))
        .with_state(state)
}

struct Harness {
    state: Arc<BackendState>,
    server: PaperdockMcp,
}

impl Harness {
    async fn new() -> Self {
        let state = Arc::new(BackendState::default());
        *state.documents.lock().expect("backend state") = paged(json!([]));
        *state.tags.lock().expect("backend state") = paged(json!([]));

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind backend");
        let addr = listener.local_addr().expect("backend addr");
        tokio::spawn(axum::serve(listener, backend_router(state.clone())).into_future());

        let client =
            PaperlessClient::new(format!("http://{addr}"), "test-token").expect("client");
        Self { state, server: PaperdockMcp::new(client) }
    }
}

/// First text block of a tool result, via the wire representation.
fn result_text(result: &CallToolResult) -> String {
    let value = serde_json::to_value(result).expect("serialize result");
    value["content"][0]["text"].as_str().expect("text content").to_owned()
}

#[tokio::test]
async fn empty_listing_reports_no_documents_and_skips_tag_fetch() {
    let harness = Harness::new().await;

    let result = harness
        .server
        .list_documents(Parameters(ListDocumentsParams::default()))
        .await
        .expect("list_documents");

    assert_ne!(result.is_error, Some(true));
    assert_eq!(result_text(&result), NO_DOCUMENTS_FOUND);
    assert_eq!(harness.state.tag_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn listing_resolves_tag_names_with_numeric_fallback() {
    let harness = Harness::new().await;
    *harness.state.documents.lock().expect("backend state") = paged(json!([
        { "id": 1, "title": "Tax 2025", "tags": [5, 9], "content": "dropped", "page_count": 3 }
    ]));
    *harness.state.tags.lock().expect("backend state") =
        paged(json!([{ "id": 5, "name": "Invoices" }]));

    let result = harness
        .server
        .list_documents(Parameters(ListDocumentsParams::default()))
        .await
        .expect("list_documents");

    let value: Value = serde_json::from_str(&result_text(&result)).expect("listing json");
    assert_eq!(
        value,
        json!([{
            "id": 1,
            "title": "Tax 2025",
            "correspondent": null,
            "document_type": null,
            "created": null,
            "created_date": null,
            "tags": [
                { "id": 5, "name": "Invoices" },
                { "id": 9, "name": "9" },
            ],
        }])
    );
    // One tag listing per document listing, regardless of document count.
    assert_eq!(harness.state.tag_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_documents_enriches_like_a_listing() {
    let harness = Harness::new().await;
    *harness.state.documents.lock().expect("backend state") =
        paged(json!([{ "id": 2, "title": "Contract", "tags": [] }]));

    let result = harness
        .server
        .search_documents(Parameters(SearchDocumentsParams { query: "contract".into() }))
        .await
        .expect("search_documents");

    let value: Value = serde_json::from_str(&result_text(&result)).expect("listing json");
    assert_eq!(value[0]["title"], json!("Contract"));
    assert_eq!(value[0]["tags"], json!([]));
    assert_eq!(harness.state.tag_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_failure_becomes_failed_tool_result_with_status() {
    let harness = Harness::new().await;
    harness.state.fail_documents.store(true, Ordering::SeqCst);

    let result = harness
        .server
        .list_documents(Parameters(ListDocumentsParams::default()))
        .await
        .expect("handler must not raise a protocol error");

    assert_eq!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(text.contains("500"), "expected HTTP status in {text:?}");
    assert!(text.contains("error"), "expected error envelope in {text:?}");
}

#[tokio::test]
async fn get_document_returns_full_record() {
    let harness = Harness::new().await;

    let result = harness
        .server
        .get_document(Parameters(GetDocumentParams { id: 42 }))
        .await
        .expect("get_document");

    let value: Value = serde_json::from_str(&result_text(&result)).expect("document json");
    assert_eq!(value, json!({ "id": 42, "title": "Full record", "content": "body text" }));
}

#[tokio::test]
async fn bulk_object_delete_drops_ownership_parameters() {
    let harness = Harness::new().await;

    harness
        .server
        .bulk_edit_tags(Parameters(BulkEditTagsParams {
            tag_ids: vec![1, 2],
            operation: ObjectBulkOperation::Delete,
            owner: Some(7),
            permissions: Some(ObjectPermissions {
                view: ObjectPermissionEntry { users: Some(vec![1]), groups: None },
                change: ObjectPermissionEntry { users: None, groups: None },
            }),
            merge: Some(true),
        }))
        .await
        .expect("bulk_edit_tags");

    let body = harness
        .state
        .last_object_bulk
        .lock()
        .expect("backend state")
        .clone()
        .expect("bulk body recorded");
    assert_eq!(
        body,
        json!({ "objects": [1, 2], "object_type": "tags", "operation": "delete" })
    );
}

#[tokio::test]
async fn bulk_object_set_permissions_forwards_only_supplied_fields() {
    let harness = Harness::new().await;

    harness
        .server
        .bulk_edit_correspondents(Parameters(BulkEditCorrespondentsParams {
            correspondent_ids: vec![3],
            operation: ObjectBulkOperation::SetPermissions,
            owner: Some(7),
            permissions: None,
            merge: None,
        }))
        .await
        .expect("bulk_edit_correspondents");

    let body = harness
        .state
        .last_object_bulk
        .lock()
        .expect("backend state")
        .clone()
        .expect("bulk body recorded");
    assert_eq!(
        body,
        json!({
            "objects": [3],
            "object_type": "correspondents",
            "operation": "set_permissions",
            "owner": 7,
        })
    );
}

#[tokio::test]
async fn bulk_edit_documents_forwards_supplied_parameters() {
    let harness = Harness::new().await;

    harness
        .server
        .bulk_edit_documents(Parameters(BulkEditDocumentsParams {
            documents: vec![1, 2, 3],
            method: DocumentBulkMethod::AddTag,
            correspondent: None,
            document_type: None,
            storage_path: None,
            tag: Some(5),
            add_tags: None,
            remove_tags: None,
            permissions: None,
            metadata_document_id: None,
            delete_originals: None,
            pages: None,
            degrees: None,
        }))
        .await
        .expect("bulk_edit_documents");

    let body = harness
        .state
        .last_document_bulk
        .lock()
        .expect("backend state")
        .clone()
        .expect("bulk body recorded");
    assert_eq!(
        body,
        json!({
            "documents": [1, 2, 3],
            "method": "add_tag",
            "parameters": { "tag": 5 },
        })
    );
}

#[tokio::test]
async fn create_tag_omits_absent_optionals_and_renames_match() {
    let harness = Harness::new().await;

    let result = harness
        .server
        .create_tag(Parameters(CreateTagParams {
            name: "Receipts".into(),
            color: None,
            match_pattern: Some("receipt".into()),
            matching_algorithm: None,
        }))
        .await
        .expect("create_tag");
    assert_ne!(result.is_error, Some(true));

    let body = harness
        .state
        .last_created_tag
        .lock()
        .expect("backend state")
        .clone()
        .expect("create body recorded");
    assert_eq!(body, json!({ "name": "Receipts", "match": "receipt" }));
}

#[tokio::test]
async fn create_tag_rejects_invalid_color_before_any_backend_call() {
    let harness = Harness::new().await;

    let err = harness
        .server
        .create_tag(Parameters(CreateTagParams {
            name: "Bad".into(),
            color: Some("red".into()),
            match_pattern: None,
            matching_algorithm: None,
        }))
        .await
        .expect_err("invalid color must be rejected");

    assert!(err.message.contains("hex color"), "unexpected message: {}", err.message);
    assert!(harness.state.last_created_tag.lock().expect("backend state").is_none());
}

#[tokio::test]
async fn update_tag_rejects_out_of_range_matching_algorithm() {
    let harness = Harness::new().await;

    let err = harness
        .server
        .update_tag(Parameters(UpdateTagParams {
            id: 1,
            name: "Tag".into(),
            color: None,
            match_pattern: None,
            matching_algorithm: Some(9),
        }))
        .await
        .expect_err("out-of-range algorithm must be rejected");

    assert!(err.message.contains("matching_algorithm"), "unexpected message: {}", err.message);
}

#[tokio::test]
async fn delete_tag_reports_deleted_status() {
    let harness = Harness::new().await;

    let result = harness
        .server
        .delete_tag(Parameters(DeleteObjectParams { id: 4 }))
        .await
        .expect("delete_tag");

    assert_eq!(result_text(&result), json!({ "status": "deleted" }).to_string());
}

#[tokio::test]
async fn streamable_http_tools_call_reaches_the_backend() {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;

    let harness = Harness::new().await;

    let config = StreamableHttpServerConfig {
        stateful_mode: false,
        sse_keep_alive: None,
        ..StreamableHttpServerConfig::default()
    };
    let session_manager = Arc::new(LocalSessionManager::default());
    let service = {
        let server = harness.server.clone();
        StreamableHttpService::new(move || Ok(server.clone()), session_manager, config)
    };

    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "list_documents", "arguments": {} }
    })
    .to_string();

    let response = service
        .handle(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header(axum::http::header::ACCEPT, "application/json, text/event-stream")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let response_body = Body::new(response.into_body());
    let bytes = tokio::time::timeout(
        std::time::Duration::from_secs(3),
        to_bytes(response_body, usize::MAX),
    )
    .await
    .expect("timeout collecting response body")
    .expect("collect response body");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(NO_DOCUMENTS_FOUND), "unexpected response: {text}");
}

// ── Pure helper behavior ───────────────────────────────────────

#[rstest]
#[case("#a6cee3", true)]
#[case("#A6CEE3", true)]
#[case("a6cee3", false)]
#[case("#a6ce", false)]
#[case("#a6cee3ff", false)]
#[case("red", false)]
fn hex_color_validation(#[case] value: &str, #[case] valid: bool) {
    assert_eq!(is_hex_color(value), valid);
}

#[test]
fn document_bulk_parameters_flatten_the_permissions_object() {
    let params = BulkEditDocumentsParams {
        documents: vec![1],
        method: DocumentBulkMethod::SetPermissions,
        correspondent: None,
        document_type: None,
        storage_path: None,
        tag: None,
        add_tags: None,
        remove_tags: None,
        permissions: Some(DocumentPermissionsSpec {
            owner: Some(2),
            set_permissions: None,
            merge: Some(true),
        }),
        metadata_document_id: None,
        delete_originals: None,
        pages: None,
        degrees: None,
    };
    let parameters = document_bulk_parameters(&params);
    assert_eq!(Value::Object(parameters), json!({ "owner": 2, "merge": true }));
}

#[test]
fn join_document_tags_keeps_unknown_ids_as_names() {
    let documents = vec![Document {
        id: 1,
        title: "Doc".into(),
        correspondent: None,
        document_type: None,
        created: None,
        created_date: None,
        tags: vec![5, 9],
    }];
    let tags = vec![Tag { id: 5, name: "Invoices".into() }];

    let joined = join_document_tags(documents, &tags);
    assert_eq!(
        joined[0].tags,
        vec![
            TagRef { id: 5, name: "Invoices".into() },
            TagRef { id: 9, name: "9".into() },
        ]
    );
}
