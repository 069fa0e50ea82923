//! Core persistence layer for Shoebox editing tools.
//!
//! Stores heterogeneous, typed records grouped into named categories and
//! identified by integer ids, backed by a single JSON document and an
//! explicit, allow-listed type registry. This crate is the single source of
//! truth for category/id and load-recovery invariants; editor UI layers are
//! thin collaborators on top of it.

pub mod codec;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;

pub use codec::{CodecError, CodecResult, DecodedStore, LoadWarning};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{BoxedRecord, Record, RecordData, RecordId, RecordMap};
pub use registry::type_registry::{
    RecordType, RegistryError, RegistryResult, TypeRegistry,
};
pub use service::manager::{DataManager, LoadReport, PersistError, PersistResult};
pub use store::data_store::DataStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
