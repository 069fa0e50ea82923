//! Runtime type registration and name resolution.
//!
//! # Responsibility
//! - Map category/type-name strings to concrete type descriptors.
//! - Constrain eligible types through a host-supplied namespace allow-list.
//!
//! # Invariants
//! - Resolution consults only explicitly registered types; there is no
//!   ambient type discovery.
//! - Any allow-list change invalidates all memoized resolutions.

pub mod type_registry;
