// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Shaping and validation helpers for the tool handlers. Pulled into
// `server.rs` via include! to keep the router impl readable.

/// Literal reported for empty document listings.
const NO_DOCUMENTS_FOUND: &str = "No documents found";

/// Backend failures become failed tool results, never protocol errors: the
/// session stays usable and the caller sees the HTTP status in the text.
fn catch_backend(result: Result<CallToolResult, ApiError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(result) => Ok(result),
        Err(err) => Ok(CallToolResult::error(vec![Content::text(
            serde_json::json!({ "error": err.to_string() }).to_string(),
        )])),
    }
}

fn json_content<T: Serialize>(value: &T) -> Content {
    Content::text(json_body(value).to_string())
}

fn json_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("serialize tool response")
}

/// Resolve tag ids against one tag listing. Ids the listing does not know
/// keep their numeric value as the name rather than being dropped.
fn join_document_tags(documents: Vec<Document>, tags: &[Tag]) -> Vec<TaggedDocument> {
    let names: BTreeMap<u64, &str> =
        tags.iter().map(|tag| (tag.id, tag.name.as_str())).collect();
    documents
        .into_iter()
        .map(|doc| TaggedDocument {
            id: doc.id,
            title: doc.title,
            correspondent: doc.correspondent,
            document_type: doc.document_type,
            created: doc.created,
            created_date: doc.created_date,
            tags: doc
                .tags
                .into_iter()
                .map(|id| TagRef {
                    id,
                    name: names.get(&id).map_or_else(|| id.to_string(), |name| (*name).to_owned()),
                })
                .collect(),
        })
        .collect()
}

/// Top-level parameters for the bulk object endpoint. Ownership fields only
/// apply to `set_permissions`; for `delete` they are dropped even if supplied.
fn bulk_object_parameters(
    operation: ObjectBulkOperation,
    owner: Option<u64>,
    permissions: Option<&ObjectPermissions>,
    merge: Option<bool>,
) -> serde_json::Map<String, Value> {
    let mut parameters = serde_json::Map::new();
    if operation != ObjectBulkOperation::SetPermissions {
        return parameters;
    }
    if let Some(owner) = owner {
        parameters.insert("owner".to_owned(), Value::from(owner));
    }
    if let Some(permissions) = permissions {
        parameters.insert("permissions".to_owned(), json_body(permissions));
    }
    if let Some(merge) = merge {
        parameters.insert("merge".to_owned(), Value::from(merge));
    }
    parameters
}

/// Parameters object for the document bulk-edit endpoint. Only fields the
/// caller supplied are forwarded; which ones a method needs is the backend's
/// contract to enforce.
fn document_bulk_parameters(params: &BulkEditDocumentsParams) -> serde_json::Map<String, Value> {
    let mut parameters = serde_json::Map::new();
    if let Some(correspondent) = params.correspondent {
        parameters.insert("correspondent".to_owned(), Value::from(correspondent));
    }
    if let Some(document_type) = params.document_type {
        parameters.insert("document_type".to_owned(), Value::from(document_type));
    }
    if let Some(storage_path) = params.storage_path {
        parameters.insert("storage_path".to_owned(), Value::from(storage_path));
    }
    if let Some(tag) = params.tag {
        parameters.insert("tag".to_owned(), Value::from(tag));
    }
    if let Some(add_tags) = &params.add_tags {
        parameters.insert("add_tags".to_owned(), json_body(add_tags));
    }
    if let Some(remove_tags) = &params.remove_tags {
        parameters.insert("remove_tags".to_owned(), json_body(remove_tags));
    }
    if let Some(permissions) = &params.permissions {
        // set_permissions expects owner/set_permissions/merge at the top
        // level of the parameters object.
        if let Value::Object(fields) = json_body(permissions) {
            parameters.extend(fields);
        }
    }
    if let Some(metadata_document_id) = params.metadata_document_id {
        parameters.insert("metadata_document_id".to_owned(), Value::from(metadata_document_id));
    }
    if let Some(delete_originals) = params.delete_originals {
        parameters.insert("delete_originals".to_owned(), Value::from(delete_originals));
    }
    if let Some(pages) = &params.pages {
        parameters.insert("pages".to_owned(), Value::from(pages.clone()));
    }
    if let Some(degrees) = params.degrees {
        parameters.insert("degrees".to_owned(), Value::from(degrees));
    }
    parameters
}

/// Field checks the backend reports poorly (HTTP 500 on a bad color), so
/// they are rejected up front as invalid-params.
fn validate_tag_fields(
    color: Option<&str>,
    matching_algorithm: Option<u8>,
) -> Result<(), ErrorData> {
    if let Some(color) = color {
        if !is_hex_color(color) {
            return Err(ErrorData::invalid_params(
                format!("color must be a hex color like #a6cee3, got {color:?}"),
                None,
            ));
        }
    }
    if let Some(algorithm) = matching_algorithm {
        if algorithm > 4 {
            return Err(ErrorData::invalid_params(
                format!("matching_algorithm must be 0..=4, got {algorithm}"),
                None,
            ));
        }
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
    HEX_COLOR
        .get_or_init(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("hex color pattern"))
        .is_match(value)
}
