// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Paperless-ngx REST client, query composition, and wire types.

mod client;
mod query;
mod types;

pub use client::{ApiError, PaperlessClient};
pub use query::QueryMap;
pub use types::{Document, DocumentDownload, DocumentMetadata, ObjectKind, Paged, Tag};
