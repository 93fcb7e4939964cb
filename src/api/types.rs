// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Paginated listing envelope returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Listing projection of a document record.
///
/// Deliberately excludes the content body, custom fields, and sharing flags:
/// listings carry only what a caller needs to identify and filter documents.
/// Unknown backend fields are dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub correspondent: Option<u64>,
    #[serde(default)]
    pub document_type: Option<u64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// Optional metadata accepted by the document upload endpoint.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub created: Option<String>,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub storage_path: Option<u64>,
    pub tags: Option<Vec<u64>>,
    pub archive_serial_number: Option<String>,
    pub custom_fields: Option<Vec<u64>>,
}

/// A downloaded document body plus the filename the backend advertised.
#[derive(Debug, Clone)]
pub struct DocumentDownload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Entity kinds accepted by the bulk object endpoint and the generic CRUD
/// routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Tags,
    Correspondents,
    DocumentTypes,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Correspondents => "correspondents",
            Self::DocumentTypes => "document_types",
        }
    }
}
