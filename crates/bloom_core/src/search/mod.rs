//! Sidebar listing helpers.
//!
//! # Responsibility
//! - Filter, search and order document summaries for the sidebar.
//! - Render human-friendly relative timestamps for listing rows.
//!
//! # See also
//! - `service::document_manager` for the composed pipeline.

pub mod document_filter;
pub mod relative_time;
