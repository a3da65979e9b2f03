use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{CouchDaoError, CouchResult};

pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Only the revision of an existing document, fetched before overwriting or deleting it.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Tombstone entry for `_bulk_docs`.
#[derive(Debug, Serialize)]
pub struct DeletedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_deleted")]
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkDocsRequest {
    pub docs: Vec<DeletedDocument>,
}

/// Turn an entity into a CouchDB document body carrying `_id` and, for updates, `_rev`.
pub fn to_document<T: Serialize>(
    doc_id: &str,
    rev: Option<String>,
    entity: &T,
) -> CouchResult<Value> {
    let encode_err = |source| CouchDaoError::EncodeDocument {
        doc_id: doc_id.to_string(),
        source,
    };
    let mut body = match serde_json::to_value(entity).map_err(encode_err)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            map
        }
    };
    body.insert("_id".into(), Value::String(doc_id.to_string()));
    if let Some(rev) = rev {
        body.insert("_rev".into(), Value::String(rev));
    }
    Ok(Value::Object(body))
}

/// Extract the revision of a listed document, if present.
pub fn revision_of(doc: &Value) -> Option<String> {
    doc.get("_rev").and_then(Value::as_str).map(str::to_string)
}
