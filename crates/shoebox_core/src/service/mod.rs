//! Facade entry points for host/editor collaborators.
//!
//! # Responsibility
//! - Orchestrate registry, store and codec behind one manager type.
//! - Keep UI/editor layers decoupled from codec and resolution details.
//!
//! # Invariants
//! - The facade never bypasses the codec's file-level vs item-level failure
//!   split.
//! - Single-threaded by design; callers serialize concurrent use.

pub mod manager;
