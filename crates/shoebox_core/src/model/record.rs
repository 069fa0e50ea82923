//! Type-erased record instances and the host-facing data trait.
//!
//! # Responsibility
//! - Give core a uniform handle (`BoxedRecord`) over heterogeneous domain
//!   types without reflection.
//! - Let host applications opt domain types in through one trait impl.
//!
//! # Invariants
//! - Every `Record` serializes through its own concrete type, never through
//!   a category-wide schema.
//! - `RecordData::NAME` doubles as the conventional category name for the
//!   type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Non-negative identifier, unique within one category.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = u64;

/// Heap-owned, type-erased record instance.
pub type BoxedRecord = Box<dyn Record>;

/// One category's contents, keyed by record id.
pub type RecordMap = BTreeMap<RecordId, BoxedRecord>;

/// Object-safe view of a stored domain record.
///
/// Implemented for every [`RecordData`] type via a blanket impl; host code
/// never implements this directly.
pub trait Record: Debug + 'static {
    /// Simple type name, which is also the conventional category name.
    fn type_name(&self) -> &'static str;

    /// Serializes this record using its own runtime type.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Marker trait a host application implements for each storable domain type.
///
/// Registration replaces runtime type discovery: the host calls
/// `DataManager::register_type::<T>()` once per type at startup, and the
/// registry resolves category names against that explicit set.
///
/// # Contract
/// - `NAMESPACE` and `NAME` together form the qualified name
///   (`"{NAMESPACE}.{NAME}"`) used by qualified resolution.
/// - Decoding honors the type's own serde attributes; derive
///   `#[serde(default)]` to have missing fields fall back to their zero
///   values instead of failing the record.
/// - `Default` backs fresh-instance construction for "create new record"
///   editor flows.
pub trait RecordData:
    Serialize + DeserializeOwned + Default + Debug + 'static
{
    /// Dotted namespace the type belongs to, e.g. `"Game.Data"`.
    const NAMESPACE: &'static str;

    /// Simple type name, unique within its namespace.
    const NAME: &'static str;

    /// Returns `"{NAMESPACE}.{NAME}"`.
    fn qualified_name() -> String {
        format!("{}.{}", Self::NAMESPACE, Self::NAME)
    }
}

impl<T: RecordData> Record for T {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
