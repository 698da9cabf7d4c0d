//! Core use-case services.
//!
//! # Responsibility
//! - Drive the active document through edit, autosave and switch.
//! - Keep hosts decoupled from storage and preference details.

pub mod debounce;
pub mod document_manager;
