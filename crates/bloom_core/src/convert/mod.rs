//! Text-format converters over the content tree.
//!
//! # Responsibility
//! - Turn content trees into Markdown, plain titles and text statistics.
//! - Clean editor-exported HTML for publishing.
//!
//! # Invariants
//! - Every converter is pure and total; none returns an error.

pub mod html;
pub mod markdown;
pub mod text_stats;
pub mod title;
