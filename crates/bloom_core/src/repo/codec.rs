//! `.bloom` file codec.
//!
//! # Responsibility
//! - Encode a `Document` as canonical JSON, including preserved extra fields.
//! - Decode persisted JSON with per-field defaulting.
//!
//! # Invariants
//! - Syntactically invalid JSON is an error, never a silently defaulted doc.
//! - Absent or wrongly typed known fields fall back to their defaults.
//! - Unknown top-level fields round-trip unchanged.
//! - A non-blank timestamp string is written back exactly as it was read.

use crate::model::document::{normalize_tags, Document, DocumentStatus, Timestamp, DEFAULT_TITLE};
use crate::model::node::{Block, Node};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FIELD_CONTENT: &str = "content";
const FIELD_TITLE: &str = "title";
const FIELD_SUBTITLE: &str = "subtitle";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_MODIFIED_AT: &str = "modifiedAt";
const FIELD_TAGS: &str = "tags";
const FIELD_STATUS: &str = "status";

pub type CodecResult<T> = Result<T, DocumentCodecError>;

/// Decode failure for persisted document text.
#[derive(Debug)]
pub enum DocumentCodecError {
    /// Input is not valid JSON.
    Parse(serde_json::Error),
    /// Input is valid JSON but the top-level value is not an object.
    NotAnObject,
}

impl Display for DocumentCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse bloom file: {err}"),
            Self::NotAnObject => write!(
                f,
                "failed to parse bloom file: top-level value is not a JSON object"
            ),
        }
    }
}

impl Error for DocumentCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NotAnObject => None,
        }
    }
}

/// Encodes a document as compact JSON.
pub fn serialize_document(doc: &Document) -> String {
    document_to_value(doc).to_string()
}

/// Builds the JSON object persisted for `doc`.
pub fn document_to_value(doc: &Document) -> Value {
    let mut object = doc.extra.clone();
    object.insert(FIELD_CONTENT.to_string(), doc.content.to_value());
    object.insert(FIELD_TITLE.to_string(), Value::String(doc.title.clone()));
    object.insert(
        FIELD_SUBTITLE.to_string(),
        Value::String(doc.subtitle.clone()),
    );
    object.insert(
        FIELD_CREATED_AT.to_string(),
        Value::String(doc.created_at.as_str().to_string()),
    );
    object.insert(
        FIELD_MODIFIED_AT.to_string(),
        Value::String(doc.modified_at.as_str().to_string()),
    );
    object.insert(
        FIELD_TAGS.to_string(),
        Value::Array(doc.tags.iter().cloned().map(Value::String).collect()),
    );
    object.insert(
        FIELD_STATUS.to_string(),
        Value::String(doc.status.as_str().to_string()),
    );
    Value::Object(object)
}

/// Decodes persisted text, defaulting missing timestamps to the current time.
pub fn deserialize_document(text: &str) -> CodecResult<Document> {
    deserialize_document_at(text, Utc::now())
}

/// Decodes persisted text, defaulting missing timestamps to `now`.
pub fn deserialize_document_at(text: &str, now: DateTime<Utc>) -> CodecResult<Document> {
    let parsed: Value = serde_json::from_str(text).map_err(DocumentCodecError::Parse)?;
    let Value::Object(mut fields) = parsed else {
        return Err(DocumentCodecError::NotAnObject);
    };

    let content = fields
        .remove(FIELD_CONTENT)
        .and_then(|value| Node::from_value(&value))
        .map(ensure_doc_root)
        .unwrap_or_else(Node::empty_doc);
    let title = take_string(&mut fields, FIELD_TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let subtitle = take_string(&mut fields, FIELD_SUBTITLE).unwrap_or_default();
    let created_at = take_timestamp(&mut fields, FIELD_CREATED_AT, now);
    let modified_at = take_timestamp(&mut fields, FIELD_MODIFIED_AT, now);
    let tags = match fields.remove(FIELD_TAGS) {
        Some(Value::Array(items)) => normalize_tags(items.into_iter().filter_map(|item| match item {
            Value::String(tag) => Some(tag),
            _ => None,
        })),
        _ => Vec::new(),
    };
    let status = DocumentStatus::from_value(fields.remove(FIELD_STATUS).as_ref());

    Ok(Document {
        content,
        title,
        subtitle,
        created_at,
        modified_at,
        tags,
        status,
        extra: fields,
    })
}

/// Wraps a non-`doc` root so the stored tree is kept instead of discarded.
fn ensure_doc_root(node: Node) -> Node {
    if node.is_doc() {
        node
    } else {
        Node::Doc(Block::new(vec![node]))
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

/// Absent, non-string and blank values are stamped with `now`.
fn take_timestamp(fields: &mut Map<String, Value>, key: &str, now: DateTime<Utc>) -> Timestamp {
    match take_string(fields, key) {
        Some(text) if !text.trim().is_empty() => Timestamp::from_text(text, now),
        _ => Timestamp::from_datetime(now),
    }
}
