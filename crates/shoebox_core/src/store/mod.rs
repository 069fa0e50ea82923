//! In-memory record storage.
//!
//! # Responsibility
//! - Keep category/id-keyed records with no knowledge of type resolution.
//! - Hand out live category references for in-place editing.
//!
//! # Invariants
//! - Ids are unique within one category (guaranteed by the map container).
//! - Reads never copy: the returned category map aliases internal storage.

pub mod data_store;
