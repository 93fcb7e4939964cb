// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::QueryMap;

/// Operations accepted by the document bulk-edit endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentBulkMethod {
    SetCorrespondent,
    SetDocumentType,
    SetStoragePath,
    AddTag,
    RemoveTag,
    ModifyTags,
    Delete,
    Reprocess,
    SetPermissions,
    Merge,
    Split,
    Rotate,
    DeletePages,
}

impl DocumentBulkMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetCorrespondent => "set_correspondent",
            Self::SetDocumentType => "set_document_type",
            Self::SetStoragePath => "set_storage_path",
            Self::AddTag => "add_tag",
            Self::RemoveTag => "remove_tag",
            Self::ModifyTags => "modify_tags",
            Self::Delete => "delete",
            Self::Reprocess => "reprocess",
            Self::SetPermissions => "set_permissions",
            Self::Merge => "merge",
            Self::Split => "split",
            Self::Rotate => "rotate",
            Self::DeletePages => "delete_pages",
        }
    }
}

/// Operations accepted by the bulk object endpoint (tags, correspondents,
/// document types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectBulkOperation {
    SetPermissions,
    Delete,
}

impl ObjectBulkOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetPermissions => "set_permissions",
            Self::Delete => "delete",
        }
    }
}

/// Matching algorithm as the named-object endpoints spell it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchingAlgorithm {
    Any,
    All,
    Exact,
    #[serde(rename = "regular expression")]
    RegularExpression,
    Fuzzy,
}

// ── Documents ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListDocumentsParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Free-text search; prefer the id filters when a specific field applies.
    pub search: Option<String>,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub tag: Option<u64>,
    pub storage_path: Option<u64>,
    pub created__gte: Option<String>,
    pub created__lte: Option<String>,
    pub ordering: Option<String>,
}

impl ListDocumentsParams {
    /// Map tool argument names onto the backend's filter names.
    pub fn to_query(&self) -> QueryMap {
        let mut query = QueryMap::new();
        query.set_u64("page", self.page);
        query.set_u64("page_size", self.page_size);
        query.set_str("search", self.search.as_deref());
        query.set_u64("correspondent__id", self.correspondent);
        query.set_u64("document_type__id", self.document_type);
        query.set_u64("tags__id", self.tag);
        query.set_u64("storage_path__id", self.storage_path);
        query.set_str("created__gte", self.created__gte.as_deref());
        query.set_str("created__lte", self.created__lte.as_deref());
        query.set_str("ordering", self.ordering.as_deref());
        query
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDocumentParams {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDocumentsParams {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PostDocumentParams {
    /// Base64-encoded file content.
    pub file: String,
    pub filename: String,
    pub title: Option<String>,
    pub created: Option<String>,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub storage_path: Option<u64>,
    pub tags: Option<Vec<u64>>,
    pub archive_serial_number: Option<String>,
    pub custom_fields: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DownloadDocumentParams {
    pub id: u64,
    /// Download the original file rather than the archived version.
    pub original: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEditDocumentsParams {
    pub documents: Vec<u64>,
    pub method: DocumentBulkMethod,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub storage_path: Option<u64>,
    pub tag: Option<u64>,
    pub add_tags: Option<Vec<u64>>,
    pub remove_tags: Option<Vec<u64>>,
    pub permissions: Option<DocumentPermissionsSpec>,
    pub metadata_document_id: Option<u64>,
    pub delete_originals: Option<bool>,
    pub pages: Option<String>,
    pub degrees: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentPermissionsSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_permissions: Option<DocumentPermissionSets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentPermissionSets {
    pub view: DocumentPermissionEntry,
    pub change: DocumentPermissionEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentPermissionEntry {
    pub users: Vec<u64>,
    pub groups: Vec<u64>,
}

// ── Tags / correspondents / document types ─────────────────────

/// Shared listing filters for the named-object kinds.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListObjectsParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub name__icontains: Option<String>,
    pub name__iendswith: Option<String>,
    pub name__iexact: Option<String>,
    pub name__istartswith: Option<String>,
    pub ordering: Option<String>,
}

impl ListObjectsParams {
    pub fn to_query(&self) -> QueryMap {
        let mut query = QueryMap::new();
        query.set_u64("page", self.page);
        query.set_u64("page_size", self.page_size);
        query.set_str("name__icontains", self.name__icontains.as_deref());
        query.set_str("name__iendswith", self.name__iendswith.as_deref());
        query.set_str("name__iexact", self.name__iexact.as_deref());
        query.set_str("name__istartswith", self.name__istartswith.as_deref());
        query.set_str("ordering", self.ordering.as_deref());
        query
    }
}

/// Serialized as-is to form the create body; absent optionals are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateTagParams {
    pub name: String,
    /// Hex color like `#a6cee3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    /// 0 = any, 1 = all, 2 = exact, 3 = regular expression, 4 = fuzzy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_algorithm: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTagParams {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_algorithm: Option<u8>,
}

/// Create body for correspondents and document types (identical schemas).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateNamedObjectParams {
    pub name: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_algorithm: Option<MatchingAlgorithm>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateNamedObjectParams {
    pub id: u64,
    pub name: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_algorithm: Option<MatchingAlgorithm>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteObjectParams {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ObjectPermissions {
    pub view: ObjectPermissionEntry,
    pub change: ObjectPermissionEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ObjectPermissionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEditTagsParams {
    pub tag_ids: Vec<u64>,
    pub operation: ObjectBulkOperation,
    pub owner: Option<u64>,
    pub permissions: Option<ObjectPermissions>,
    pub merge: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEditCorrespondentsParams {
    pub correspondent_ids: Vec<u64>,
    pub operation: ObjectBulkOperation,
    pub owner: Option<u64>,
    pub permissions: Option<ObjectPermissions>,
    pub merge: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEditDocumentTypesParams {
    pub document_type_ids: Vec<u64>,
    pub operation: ObjectBulkOperation,
    pub owner: Option<u64>,
    pub permissions: Option<ObjectPermissions>,
    pub merge: Option<bool>,
}

// ── Listing responses ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TagRef {
    pub id: u64,
    pub name: String,
}

/// Document summary with tag ids resolved to `{id, name}` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaggedDocument {
    pub id: u64,
    pub title: String,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub created: Option<String>,
    pub created_date: Option<String>,
    pub tags: Vec<TagRef>,
}
