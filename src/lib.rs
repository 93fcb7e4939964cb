// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Paperdock: MCP gateway for Paperless-ngx.
//!
//! Exposes the Paperless-ngx REST API (documents, tags, correspondents,
//! document types) as MCP tools over stdio or streamable HTTP/SSE.

pub mod api;
pub mod mcp;
