// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::{multipart, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::query::QueryMap;
use super::types::{Document, DocumentDownload, DocumentMetadata, ObjectKind, Paged, Tag};

const ACCEPT_JSON_V5: &str = "application/json; version=5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How much of an error body the Display impl keeps; the full body stays on
/// the variant.
const DISPLAY_BODY_LIMIT: usize = 200;

#[derive(Debug)]
pub enum ApiError {
    /// The HTTP client itself could not be constructed.
    Client { source: reqwest::Error },
    /// The request never produced a response (connect, timeout, body read).
    Transport { url: String, source: reqwest::Error },
    /// The backend answered with a non-2xx status.
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    /// The response body was not the JSON shape we expected.
    Json {
        url: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { source } => write!(f, "cannot construct HTTP client: {source}"),
            Self::Transport { url, source } => write!(f, "request to {url} failed: {source}"),
            Self::Status { url, status, body } => {
                let snippet: String = body.chars().take(DISPLAY_BODY_LIMIT).collect();
                write!(f, "backend returned HTTP {status} for {url}: {snippet}")
            }
            Self::Json { url, source } => {
                write!(f, "cannot decode response from {url}: {source}")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } | Self::Transport { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

/// HTTP client for the Paperless-ngx REST API.
///
/// Owns token attachment and base-URL resolution. Every method returns the
/// backend's JSON body; non-2xx responses surface as [`ApiError::Status`]
/// carrying the HTTP status. No retries; transient backend failures are the
/// caller's to see.
#[derive(Debug, Clone)]
pub struct PaperlessClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PaperlessClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Client { source })?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url, token: token.into() })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Generic escape hatch mirroring the dedicated methods: JSON in/out
    /// against `/api<path>`. Empty bodies (204 on delete) map to `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.api_url(path);
        let mut builder = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, self.authorization())
            .header(ACCEPT, ACCEPT_JSON_V5);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { url, status, body });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Json { url, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path);
        let value = self.request(Method::GET, path, None).await?;
        serde_json::from_value(value).map_err(|source| ApiError::Json { url, source })
    }

    // ── Documents ──────────────────────────────────────────────

    pub async fn get_documents(&self, query: &QueryMap) -> Result<Paged<Document>, ApiError> {
        self.get_json(&list_path("/documents/", query)).await
    }

    pub async fn get_document(&self, id: u64) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("/documents/{id}/"), None).await
    }

    pub async fn search_documents(&self, query: &str) -> Result<Paged<Document>, ApiError> {
        let mut params = QueryMap::new();
        params.set_str("query", Some(query));
        self.get_json(&format!("/documents/?{}", params.encode())).await
    }

    pub async fn bulk_edit_documents(
        &self,
        documents: &[u64],
        method: &str,
        parameters: serde_json::Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let body = serde_json::json!({
            "documents": documents,
            "method": method,
            "parameters": parameters,
        });
        self.request(Method::POST, "/documents/bulk_edit/", Some(&body)).await
    }

    /// Multipart upload. The backend answers with a consumption task id.
    pub async fn post_document(
        &self,
        file: Vec<u8>,
        filename: &str,
        metadata: DocumentMetadata,
    ) -> Result<Value, ApiError> {
        let url = self.api_url("/documents/post_document/");

        let mut form = multipart::Form::new()
            .part("document", multipart::Part::bytes(file).file_name(filename.to_owned()));
        if let Some(title) = metadata.title {
            form = form.text("title", title);
        }
        if let Some(created) = metadata.created {
            form = form.text("created", created);
        }
        if let Some(correspondent) = metadata.correspondent {
            form = form.text("correspondent", correspondent.to_string());
        }
        if let Some(document_type) = metadata.document_type {
            form = form.text("document_type", document_type.to_string());
        }
        if let Some(storage_path) = metadata.storage_path {
            form = form.text("storage_path", storage_path.to_string());
        }
        if let Some(tags) = metadata.tags {
            for tag in tags {
                form = form.text("tags", tag.to_string());
            }
        }
        if let Some(serial) = metadata.archive_serial_number {
            form = form.text("archive_serial_number", serial);
        }
        if let Some(custom_fields) = metadata.custom_fields {
            for field in custom_fields {
                form = form.text("custom_fields", field.to_string());
            }
        }

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.authorization())
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { url, status, body });
        }
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Json { url, source })
    }

    pub async fn download_document(
        &self,
        id: u64,
        original: bool,
    ) -> Result<DocumentDownload, ApiError> {
        let suffix = if original { "?original=true" } else { "" };
        let url = format!("{}/api/documents/{id}/download/{suffix}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { url, status, body });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { url, source })?
            .to_vec();
        Ok(DocumentDownload { filename, bytes })
    }

    // ── Tags / correspondents / document types ─────────────────

    /// Typed tag listing used for document enrichment.
    pub async fn get_tags(&self) -> Result<Paged<Tag>, ApiError> {
        self.get_json("/tags/").await
    }

    pub async fn list_objects(
        &self,
        kind: ObjectKind,
        query: &QueryMap,
    ) -> Result<Value, ApiError> {
        let base = format!("/{}/", kind.as_str());
        self.request(Method::GET, &list_path(&base, query), None).await
    }

    pub async fn create_object(&self, kind: ObjectKind, data: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, &format!("/{}/", kind.as_str()), Some(data)).await
    }

    pub async fn update_object(
        &self,
        kind: ObjectKind,
        id: u64,
        data: &Value,
    ) -> Result<Value, ApiError> {
        self.request(Method::PUT, &format!("/{}/{id}/", kind.as_str()), Some(data)).await
    }

    pub async fn delete_object(&self, kind: ObjectKind, id: u64) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &format!("/{}/{id}/", kind.as_str()), None).await
    }

    pub async fn bulk_edit_objects(
        &self,
        ids: &[u64],
        kind: ObjectKind,
        operation: &str,
        parameters: serde_json::Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let mut body = serde_json::Map::new();
        body.insert("objects".to_owned(), serde_json::json!(ids));
        body.insert("object_type".to_owned(), Value::from(kind.as_str()));
        body.insert("operation".to_owned(), Value::from(operation));
        // Operation parameters sit at the top level of this endpoint's body.
        body.extend(parameters);
        self.request(Method::POST, "/bulk_edit_objects/", Some(&Value::Object(body))).await
    }
}

fn list_path(base: &str, query: &QueryMap) -> String {
    if query.is_empty() {
        base.to_owned()
    } else {
        format!("{base}?{}", query.encode())
    }
}

fn content_disposition_filename(header: &str) -> Option<String> {
    let (_, raw) = header.split_once("filename=")?;
    let name = raw.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{content_disposition_filename, list_path, PaperlessClient};
    use crate::api::QueryMap;

    #[rstest]
    #[case("attachment; filename=\"invoice.pdf\"", Some("invoice.pdf"))]
    #[case("attachment; filename=scan.pdf", Some("scan.pdf"))]
    #[case("inline; filename=\"\"", None)]
    #[case("attachment", None)]
    fn content_disposition_filename_extraction(
        #[case] header: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(content_disposition_filename(header).as_deref(), expected);
    }

    #[test]
    fn list_path_omits_question_mark_for_empty_query() {
        assert_eq!(list_path("/tags/", &QueryMap::new()), "/tags/");
    }

    #[test]
    fn list_path_appends_encoded_query() {
        let mut query = QueryMap::new();
        query.set_u64("page", Some(3));
        assert_eq!(list_path("/tags/", &query), "/tags/?page=3");
    }

    #[test]
    fn base_url_trailing_slashes_are_stripped() {
        let client = PaperlessClient::new("http://paperless.local///", "t").expect("client");
        assert_eq!(client.api_url("/documents/"), "http://paperless.local/api/documents/");
    }
}
