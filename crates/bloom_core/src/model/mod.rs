//! Document domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by converters, storage and the
//!   lifecycle manager.
//!
//! # Invariants
//! - Every document is identified by a stable `DocumentId`.
//! - Content trees are closed sum types; unknown kinds are carried opaquely.

pub mod document;
pub mod node;
