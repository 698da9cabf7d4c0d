//! Best-guess display title for a content tree.

use crate::model::document::DEFAULT_TITLE;
use crate::model::node::Node;

/// Derives a title from document content.
///
/// Search order:
/// 1. the first level-1 heading anywhere in the tree (depth-first), as plain text;
/// 2. the first top-level block whose text is non-empty after trimming;
/// 3. `"Untitled"`.
pub fn extract_title(doc: &Node) -> String {
    let first_h1 = doc
        .depth_first()
        .skip(1)
        .find(|node| matches!(node, Node::Heading(heading) if heading.level() == 1));
    if let Some(heading) = first_h1 {
        return heading.flatten_text();
    }

    doc.children()
        .iter()
        .map(|node| node.flatten_text().trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
