// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::error::Error;
use std::future::IntoFuture;
use std::sync::{Arc, OnceLock};

use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{
    ApiError, Document, DocumentMetadata, ObjectKind, Paged, PaperlessClient, Tag,
};

use super::types::*;

/// MCP tool surface over a Paperless-ngx backend.
///
/// One instance is constructed at startup and cloned per connection; the tool
/// router is built once in the constructor and immutable afterwards, so every
/// session shares the same registry. Handlers hold no per-invocation state
/// beyond the lookup table and the immutable client configuration.
#[derive(Clone)]
pub struct PaperdockMcp {
    client: PaperlessClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PaperdockMcp {
    pub fn new(client: PaperlessClient) -> Self {
        Self { client, tool_router: Self::tool_router() }
    }

    /// Single-session mode: one session on stdin/stdout for the process
    /// lifetime.
    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Router serving stateless streamable HTTP at `/mcp` plus long-lived SSE
    /// sessions at `/sse` with `/messages` as the follow-up route.
    ///
    /// The SSE transport keys sessions by generated ids and removes the entry
    /// on disconnect; a follow-up referencing an unknown session id is a
    /// client error, not a listener failure.
    pub fn http_router(&self) -> Router {
        let streamable_config = StreamableHttpServerConfig {
            stateful_mode: false,
            ..StreamableHttpServerConfig::default()
        };
        let session_manager = Arc::new(LocalSessionManager::default());
        let streamable_service = {
            let service = self.clone();
            StreamableHttpService::new(move || Ok(service.clone()), session_manager, streamable_config)
        };

        super::sse::router(self.clone()).nest_service("/mcp", streamable_service)
    }

    /// Multi-session mode: serve [`Self::http_router`] until ctrl-c.
    pub async fn serve_http(self, port: u16) -> Result<(), Box<dyn Error>> {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
        let addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let router = self.http_router();

        info!(%addr, "serving MCP over streamable HTTP (/mcp) and SSE (/sse, /messages)");
        let server_shutdown = shutdown.clone();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                server_shutdown.cancelled().await;
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                shutdown.cancel();
                server.as_mut().await?;
            }
        }
        Ok(())
    }

    // ── Documents ──────────────────────────────────────────────

    /// List and filter documents by fields such as title, correspondent,
    /// document type, tag, storage path, creation date, and more. IMPORTANT:
    /// when filtering by tag, correspondent, or document type, FIRST use the
    /// relevant listing tool (e.g. `list_tags`, `list_correspondents`,
    /// `list_document_types`) to find the correct ID, then use that ID as a
    /// filter here. Only use the `search` argument for free-text search when
    /// no specific field applies.
    #[tool(name = "list_documents")]
    async fn list_documents(
        &self,
        params: Parameters<ListDocumentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.list_documents_impl(params.0).await)
    }

    async fn list_documents_impl(
        &self,
        params: ListDocumentsParams,
    ) -> Result<CallToolResult, ApiError> {
        let page = self.client.get_documents(&params.to_query()).await?;
        self.tagged_listing(page).await
    }

    /// Retrieve one document record in full, including content and metadata.
    #[tool(name = "get_document")]
    async fn get_document(
        &self,
        params: Parameters<GetDocumentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.get_document_impl(params.0).await)
    }

    async fn get_document_impl(
        &self,
        params: GetDocumentParams,
    ) -> Result<CallToolResult, ApiError> {
        let document = self.client.get_document(params.id).await?;
        Ok(CallToolResult::success(vec![Content::text(document.to_string())]))
    }

    /// Full text search across document content, title, and metadata. For
    /// general listing or filtering by fields, use `list_documents` instead.
    #[tool(name = "search_documents")]
    async fn search_documents(
        &self,
        params: Parameters<SearchDocumentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.search_documents_impl(params.0).await)
    }

    async fn search_documents_impl(
        &self,
        params: SearchDocumentsParams,
    ) -> Result<CallToolResult, ApiError> {
        let page = self.client.search_documents(&params.query).await?;
        self.tagged_listing(page).await
    }

    /// Upload a new document (base64-encoded file content) with optional
    /// metadata.
    #[tool(name = "post_document")]
    async fn post_document(
        &self,
        params: Parameters<PostDocumentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let PostDocumentParams {
            file,
            filename,
            title,
            created,
            correspondent,
            document_type,
            storage_path,
            tags,
            archive_serial_number,
            custom_fields,
        } = params.0;
        let bytes = BASE64.decode(file.as_bytes()).map_err(|err| {
            ErrorData::invalid_params(
                format!("file is not valid base64: {err}"),
                Some(serde_json::json!({ "filename": filename })),
            )
        })?;
        let metadata = DocumentMetadata {
            title,
            created,
            correspondent,
            document_type,
            storage_path,
            tags,
            archive_serial_number,
            custom_fields,
        };
        catch_backend(self.post_document_impl(bytes, &filename, metadata).await)
    }

    async fn post_document_impl(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: DocumentMetadata,
    ) -> Result<CallToolResult, ApiError> {
        let result = self.client.post_document(bytes, filename, metadata).await?;
        Ok(CallToolResult::success(vec![Content::text(result.to_string())]))
    }

    /// Download a document file as a binary resource.
    #[tool(name = "download_document")]
    async fn download_document(
        &self,
        params: Parameters<DownloadDocumentParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.download_document_impl(params.0).await)
    }

    async fn download_document_impl(
        &self,
        params: DownloadDocumentParams,
    ) -> Result<CallToolResult, ApiError> {
        let download =
            self.client.download_document(params.id, params.original.unwrap_or(false)).await?;
        let filename =
            download.filename.unwrap_or_else(|| format!("document-{}", params.id));
        let resource = ResourceContents::BlobResourceContents {
            uri: filename,
            mime_type: Some("application/pdf".to_owned()),
            blob: BASE64.encode(&download.bytes),
            meta: None,
        };
        Ok(CallToolResult::success(vec![Content::resource(resource)]))
    }

    /// Apply a bulk operation (tagging, reassignment, permissions, delete,
    /// merge, split, rotate, ...) to a set of documents.
    #[tool(name = "bulk_edit_documents")]
    async fn bulk_edit_documents(
        &self,
        params: Parameters<BulkEditDocumentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.bulk_edit_documents_impl(params.0).await)
    }

    async fn bulk_edit_documents_impl(
        &self,
        params: BulkEditDocumentsParams,
    ) -> Result<CallToolResult, ApiError> {
        let parameters = document_bulk_parameters(&params);
        let result = self
            .client
            .bulk_edit_documents(&params.documents, params.method.as_str(), parameters)
            .await?;
        Ok(CallToolResult::success(vec![Content::text(result.to_string())]))
    }

    // ── Tags ───────────────────────────────────────────────────

    /// List all tags, with optional name filters.
    #[tool(name = "list_tags")]
    async fn list_tags(
        &self,
        params: Parameters<ListObjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.list_objects_impl(ObjectKind::Tags, params.0).await)
    }

    /// Create a new tag.
    #[tool(name = "create_tag")]
    async fn create_tag(
        &self,
        params: Parameters<CreateTagParams>,
    ) -> Result<CallToolResult, ErrorData> {
        validate_tag_fields(params.0.color.as_deref(), params.0.matching_algorithm)?;
        catch_backend(self.create_tag_impl(params.0).await)
    }

    async fn create_tag_impl(&self, params: CreateTagParams) -> Result<CallToolResult, ApiError> {
        let body = json_body(&params);
        let tag = self.client.create_object(ObjectKind::Tags, &body).await?;
        Ok(CallToolResult::success(vec![Content::text(tag.to_string())]))
    }

    /// Update an existing tag.
    #[tool(name = "update_tag")]
    async fn update_tag(
        &self,
        params: Parameters<UpdateTagParams>,
    ) -> Result<CallToolResult, ErrorData> {
        validate_tag_fields(params.0.color.as_deref(), params.0.matching_algorithm)?;
        catch_backend(self.update_tag_impl(params.0).await)
    }

    async fn update_tag_impl(&self, params: UpdateTagParams) -> Result<CallToolResult, ApiError> {
        let body = json_body(&params);
        let tag = self.client.update_object(ObjectKind::Tags, params.id, &body).await?;
        Ok(CallToolResult::success(vec![Content::text(tag.to_string())]))
    }

    /// Delete a tag.
    #[tool(name = "delete_tag")]
    async fn delete_tag(
        &self,
        params: Parameters<DeleteObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.delete_object_impl(ObjectKind::Tags, params.0.id).await)
    }

    /// Set permissions on, or delete, a set of tags.
    #[tool(name = "bulk_edit_tags")]
    async fn bulk_edit_tags(
        &self,
        params: Parameters<BulkEditTagsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let BulkEditTagsParams { tag_ids, operation, owner, permissions, merge } = params.0;
        catch_backend(
            self.bulk_edit_objects_impl(
                ObjectKind::Tags,
                tag_ids,
                operation,
                owner,
                permissions,
                merge,
            )
            .await,
        )
    }

    // ── Correspondents ─────────────────────────────────────────

    /// List all correspondents, with optional name filters.
    #[tool(name = "list_correspondents")]
    async fn list_correspondents(
        &self,
        params: Parameters<ListObjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.list_objects_impl(ObjectKind::Correspondents, params.0).await)
    }

    /// Create a new correspondent.
    #[tool(name = "create_correspondent")]
    async fn create_correspondent(
        &self,
        params: Parameters<CreateNamedObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.create_named_object_impl(ObjectKind::Correspondents, params.0).await)
    }

    /// Update an existing correspondent.
    #[tool(name = "update_correspondent")]
    async fn update_correspondent(
        &self,
        params: Parameters<UpdateNamedObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.update_named_object_impl(ObjectKind::Correspondents, params.0).await)
    }

    /// Delete a correspondent.
    #[tool(name = "delete_correspondent")]
    async fn delete_correspondent(
        &self,
        params: Parameters<DeleteObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.delete_object_impl(ObjectKind::Correspondents, params.0.id).await)
    }

    /// Set permissions on, or delete, a set of correspondents.
    #[tool(name = "bulk_edit_correspondents")]
    async fn bulk_edit_correspondents(
        &self,
        params: Parameters<BulkEditCorrespondentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let BulkEditCorrespondentsParams { correspondent_ids, operation, owner, permissions, merge } =
            params.0;
        catch_backend(
            self.bulk_edit_objects_impl(
                ObjectKind::Correspondents,
                correspondent_ids,
                operation,
                owner,
                permissions,
                merge,
            )
            .await,
        )
    }

    // ── Document types ─────────────────────────────────────────

    /// List all document types, with optional name filters.
    #[tool(name = "list_document_types")]
    async fn list_document_types(
        &self,
        params: Parameters<ListObjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.list_objects_impl(ObjectKind::DocumentTypes, params.0).await)
    }

    /// Create a new document type.
    #[tool(name = "create_document_type")]
    async fn create_document_type(
        &self,
        params: Parameters<CreateNamedObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.create_named_object_impl(ObjectKind::DocumentTypes, params.0).await)
    }

    /// Update an existing document type.
    #[tool(name = "update_document_type")]
    async fn update_document_type(
        &self,
        params: Parameters<UpdateNamedObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.update_named_object_impl(ObjectKind::DocumentTypes, params.0).await)
    }

    /// Delete a document type.
    #[tool(name = "delete_document_type")]
    async fn delete_document_type(
        &self,
        params: Parameters<DeleteObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        catch_backend(self.delete_object_impl(ObjectKind::DocumentTypes, params.0.id).await)
    }

    /// Set permissions on, or delete, a set of document types.
    #[tool(name = "bulk_edit_document_types")]
    async fn bulk_edit_document_types(
        &self,
        params: Parameters<BulkEditDocumentTypesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let BulkEditDocumentTypesParams { document_type_ids, operation, owner, permissions, merge } =
            params.0;
        catch_backend(
            self.bulk_edit_objects_impl(
                ObjectKind::DocumentTypes,
                document_type_ids,
                operation,
                owner,
                permissions,
                merge,
            )
            .await,
        )
    }

    // ── Shared handler bodies ──────────────────────────────────

    /// Listing responses share one shape: project to summaries, then resolve
    /// tag ids in a single extra round-trip. An empty page skips the tag call
    /// entirely and reports the literal fallback text.
    async fn tagged_listing(&self, page: Paged<Document>) -> Result<CallToolResult, ApiError> {
        if page.results.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(NO_DOCUMENTS_FOUND)]));
        }
        let tags = self.client.get_tags().await?;
        let documents = join_document_tags(page.results, &tags.results);
        Ok(CallToolResult::success(vec![json_content(&documents)]))
    }

    async fn list_objects_impl(
        &self,
        kind: ObjectKind,
        params: ListObjectsParams,
    ) -> Result<CallToolResult, ApiError> {
        let listing = self.client.list_objects(kind, &params.to_query()).await?;
        Ok(CallToolResult::success(vec![Content::text(listing.to_string())]))
    }

    async fn create_named_object_impl(
        &self,
        kind: ObjectKind,
        params: CreateNamedObjectParams,
    ) -> Result<CallToolResult, ApiError> {
        let body = json_body(&params);
        let created = self.client.create_object(kind, &body).await?;
        Ok(CallToolResult::success(vec![Content::text(created.to_string())]))
    }

    async fn update_named_object_impl(
        &self,
        kind: ObjectKind,
        params: UpdateNamedObjectParams,
    ) -> Result<CallToolResult, ApiError> {
        let body = json_body(&params);
        let updated = self.client.update_object(kind, params.id, &body).await?;
        Ok(CallToolResult::success(vec![Content::text(updated.to_string())]))
    }

    async fn delete_object_impl(
        &self,
        kind: ObjectKind,
        id: u64,
    ) -> Result<CallToolResult, ApiError> {
        self.client.delete_object(kind, id).await?;
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::json!({ "status": "deleted" }).to_string(),
        )]))
    }

    async fn bulk_edit_objects_impl(
        &self,
        kind: ObjectKind,
        ids: Vec<u64>,
        operation: ObjectBulkOperation,
        owner: Option<u64>,
        permissions: Option<ObjectPermissions>,
        merge: Option<bool>,
    ) -> Result<CallToolResult, ApiError> {
        let parameters = bulk_object_parameters(operation, owner, permissions.as_ref(), merge);
        let result = self
            .client
            .bulk_edit_objects(&ids, kind, operation.as_str(), parameters)
            .await?;
        Ok(CallToolResult::success(vec![Content::text(result.to_string())]))
    }
}

#[tool_handler]
impl ServerHandler for PaperdockMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Paperless-ngx document management gateway (tools: list_documents, get_document, search_documents, post_document, download_document, bulk_edit_documents, list_tags, create_tag, update_tag, delete_tag, bulk_edit_tags, list_correspondents, create_correspondent, update_correspondent, delete_correspondent, bulk_edit_correspondents, list_document_types, create_document_type, update_document_type, delete_document_type, bulk_edit_document_types)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Extracted shaping/validation helpers for MCP tool handlers.
include!("server/helpers.rs");

#[cfg(test)]
mod e2e;

#[cfg(test)]
mod tests;
