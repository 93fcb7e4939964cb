// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Builder for backend query strings.
///
/// A field is only emitted when a value is present; keys iterate in
/// lexicographic order, so the encoded output is deterministic for a given
/// input. Whether a filter name is recognized is the backend's concern;
/// this type only handles serialization shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: BTreeMap<&'static str, String>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_str(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.entries.insert(key, value.to_owned());
        }
        self
    }

    pub fn set_u64(&mut self, key: &'static str, value: Option<u64>) -> &mut Self {
        if let Some(value) = value {
            self.entries.insert(key, value.to_string());
        }
        self
    }

    pub fn set_bool(&mut self, key: &'static str, value: Option<bool>) -> &mut Self {
        if let Some(value) = value {
            self.entries.insert(key, if value { "true" } else { "false" }.to_owned());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// URL-encoded query string without a leading `?`. Empty when no field
    /// carries a value; the caller must omit the `?` then.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
