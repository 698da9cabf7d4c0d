//! Export format contract and built-in formats.

use crate::convert::html::clean_html;
use crate::convert::markdown::to_markdown;
use crate::model::node::Node;

/// One export target.
///
/// `convert` receives both the content tree and the editor's raw HTML so a
/// format can work from whichever representation it needs.
pub trait ExportFormat: Send + Sync {
    /// Human-readable name shown in save dialogs.
    fn name(&self) -> &str;
    /// File extension without the leading dot.
    fn extension(&self) -> &str;
    fn convert(&self, content: &Node, raw_html: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExport;

impl ExportFormat for MarkdownExport {
    fn name(&self) -> &str {
        "Markdown"
    }

    fn extension(&self) -> &str {
        "md"
    }

    fn convert(&self, content: &Node, _raw_html: &str) -> String {
        to_markdown(content)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExport;

impl ExportFormat for HtmlExport {
    fn name(&self) -> &str {
        "HTML"
    }

    fn extension(&self) -> &str {
        "html"
    }

    fn convert(&self, _content: &Node, raw_html: &str) -> String {
        clean_html(raw_html)
    }
}
