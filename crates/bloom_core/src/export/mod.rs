//! Export surface: format registry, file export and copy-as-Markdown.
//!
//! # Responsibility
//! - Hold the set of export formats, Markdown and HTML by default.
//! - Pick a format from the destination extension and write the result.
//!
//! # Invariants
//! - Registered extensions are unique, non-empty and lowercase.
//! - Unknown destination extensions export as Markdown.

pub mod format;
pub mod registry;
pub mod service;
