//! Domain-record model shared by store, codec and facade.
//!
//! # Responsibility
//! - Define the type-erased record shape the rest of core operates on.
//! - Keep id semantics explicit in signatures via dedicated aliases.
//!
//! # Invariants
//! - A record id is unique within its category; categories do not share id
//!   spaces.
//! - Core never inspects record fields; only the record's own runtime type
//!   drives (de)serialization.

pub mod record;
