// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! One tool per backend operation; arguments are validated against the
//! schemas in [`types`] before any handler runs.

mod server;
mod sse;
mod types;

pub use server::PaperdockMcp;
