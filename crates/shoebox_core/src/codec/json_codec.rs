//! Document encoding and the item-granular recovery ladder.
//!
//! # Responsibility
//! - Render ids as decimal string keys and records through their own types.
//! - Skip unresolvable categories and malformed items without failing the
//!   surrounding load.
//!
//! # Invariants
//! - Every skipped unit produces exactly one `LoadWarning`, logged and
//!   returned in-band.
//! - A category with zero surviving items is dropped, never stored empty.

use crate::codec::{CodecError, CodecResult};
use crate::model::record::{RecordId, RecordMap};
use crate::registry::type_registry::TypeRegistry;
use crate::store::data_store::DataStore;
use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Category maps recovered from one document, ready to install into a store.
pub type DecodedStore = BTreeMap<String, RecordMap>;

/// Non-fatal problem recovered during decoding.
///
/// The offending unit was skipped (or, for duplicates, overwritten); all
/// sibling units still loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// No registered type matched the category name; category skipped.
    UnknownCategoryType { category: String },
    /// The category's value is not a JSON object; category skipped.
    CategoryNotObject { category: String },
    /// The item key is not a non-negative integer; item skipped.
    InvalidRecordId { category: String, key: String },
    /// The item value failed to decode against the resolved type; item
    /// skipped.
    UndecodableRecord {
        category: String,
        key: String,
        message: String,
    },
    /// Two keys mapped to the same id; the later occurrence won.
    DuplicateRecordId { category: String, id: RecordId },
    /// No item in the category survived; category dropped.
    EmptyCategory { category: String },
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCategoryType { category } => {
                write!(f, "no type found for category `{category}`; skipped")
            }
            Self::CategoryNotObject { category } => {
                write!(f, "category `{category}` is not a JSON object; skipped")
            }
            Self::InvalidRecordId { category, key } => {
                write!(f, "key `{key}` in category `{category}` is not a valid id; item skipped")
            }
            Self::UndecodableRecord {
                category,
                key,
                message,
            } => {
                write!(f, "item `{key}` in category `{category}` failed to decode: {message}")
            }
            Self::DuplicateRecordId { category, id } => {
                write!(f, "duplicate id {id} in category `{category}`; last occurrence wins")
            }
            Self::EmptyCategory { category } => {
                write!(f, "category `{category}` has no valid items; dropped")
            }
        }
    }
}

/// Serializes the whole store into one indented JSON document.
///
/// Category names key the top level; within each category, ids are rendered
/// as decimal strings and each record serializes through its own runtime
/// type. Mixed concrete types within one category are not rejected.
pub fn encode_store(store: &DataStore) -> CodecResult<String> {
    let mut document = Map::new();
    for (category, records) in store.iter() {
        let mut items = Map::new();
        for (id, record) in records {
            let value = record.to_json().map_err(|source| CodecError::Serialize {
                context: format!("record {id} in category `{category}`"),
                source,
            })?;
            items.insert(id.to_string(), value);
        }
        document.insert(category.clone(), Value::Object(items));
    }

    serde_json::to_string_pretty(&Value::Object(document)).map_err(|source| {
        CodecError::Serialize {
            context: "assembled document".to_string(),
            source,
        }
    })
}

/// File-level parse of one document.
///
/// Failures here abort the whole load; the caller must leave its store
/// untouched.
pub fn decode_document(text: &str) -> CodecResult<Map<String, Value>> {
    let root: Value = serde_json::from_str(text).map_err(CodecError::Parse)?;
    match root {
        Value::Object(map) => Ok(map),
        _ => Err(CodecError::TopLevelNotObject),
    }
}

/// Best-effort decode of a parsed document into category maps.
///
/// Never fails: every malformed unit is skipped and reported as a
/// [`LoadWarning`]. Duplicate ids arising from decimal re-keying (for
/// example `"1"` and `"01"`) resolve last-occurrence-wins with a warning.
pub fn decode_store(
    document: Map<String, Value>,
    registry: &mut TypeRegistry,
) -> (DecodedStore, Vec<LoadWarning>) {
    let mut decoded = DecodedStore::new();
    let mut warnings = Vec::new();

    for (category, value) in document {
        let Some(record_type) = registry.resolve(&category) else {
            push_warning(
                &mut warnings,
                LoadWarning::UnknownCategoryType { category },
            );
            continue;
        };

        let Value::Object(items) = value else {
            push_warning(&mut warnings, LoadWarning::CategoryNotObject { category });
            continue;
        };

        let mut records = RecordMap::new();
        for (key, item) in items {
            let Ok(id) = key.parse::<RecordId>() else {
                push_warning(
                    &mut warnings,
                    LoadWarning::InvalidRecordId {
                        category: category.clone(),
                        key,
                    },
                );
                continue;
            };

            match record_type.decode(item) {
                Ok(record) => {
                    if records.insert(id, record).is_some() {
                        push_warning(
                            &mut warnings,
                            LoadWarning::DuplicateRecordId {
                                category: category.clone(),
                                id,
                            },
                        );
                    }
                }
                Err(err) => {
                    push_warning(
                        &mut warnings,
                        LoadWarning::UndecodableRecord {
                            category: category.clone(),
                            key,
                            message: err.to_string(),
                        },
                    );
                }
            }
        }

        if records.is_empty() {
            push_warning(&mut warnings, LoadWarning::EmptyCategory { category });
        } else {
            decoded.insert(category, records);
        }
    }

    (decoded, warnings)
}

fn push_warning(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    warn!("codec: {warning}");
    warnings.push(warning);
}
