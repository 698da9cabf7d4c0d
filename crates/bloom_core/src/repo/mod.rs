//! Persistence layer for documents.
//!
//! # Responsibility
//! - Own the `.bloom` file format (`codec`).
//! - Define the store port and its filesystem/in-memory adapters.
//!
//! # Invariants
//! - Store adapters never hand out partially decoded documents.
//! - Every store operation is independently failable; callers decide how to
//!   degrade.

pub mod codec;
pub mod document_store;
