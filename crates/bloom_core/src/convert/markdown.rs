//! Content tree to Markdown conversion.
//!
//! # Invariants
//! - Conversion is pure and total: missing fields degrade to empty output.
//! - Top-level blocks are joined by one blank line.
//! - Marks wrap in declared order; each wrap encloses the previous result.

use crate::model::node::{Mark, Node};

const LIST_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "> ";
const CODE_FENCE: &str = "```";

/// Converts a document tree into Markdown.
pub fn to_markdown(doc: &Node) -> String {
    doc.children()
        .iter()
        .map(|node| convert_block(node, 0))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn convert_block(node: &Node, depth: usize) -> String {
    match node {
        Node::Paragraph(block) => render_inline(&block.children),
        Node::Heading(heading) => format!(
            "{} {}",
            "#".repeat(usize::from(heading.level())),
            render_inline(&heading.children)
        ),
        Node::BulletList(block) => render_list(&block.children, depth, ListStyle::Bullet),
        Node::OrderedList(block) => render_list(&block.children, depth, ListStyle::Ordered),
        Node::CodeBlock(block) => {
            let code: String = block
                .children
                .iter()
                .map(|child| match child {
                    Node::Text(leaf) => leaf.text.as_str(),
                    _ => "",
                })
                .collect();
            format!("{CODE_FENCE}\n{code}\n{CODE_FENCE}")
        }
        Node::Blockquote(block) => block
            .children
            .iter()
            .map(|child| quote_lines(&convert_block(child, depth)))
            .collect::<Vec<_>>()
            .join("\n"),
        Node::Doc(_) | Node::ListItem(_) | Node::Text(_) | Node::Opaque(_) => String::new(),
    }
}

#[derive(Clone, Copy)]
enum ListStyle {
    Bullet,
    Ordered,
}

fn render_list(items: &[Node], depth: usize, style: ListStyle) -> String {
    let padding = LIST_INDENT.repeat(depth);
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let marker = match style {
                ListStyle::Bullet => "- ".to_string(),
                ListStyle::Ordered => format!("{}. ", index + 1),
            };
            render_list_item(item, depth, &format!("{padding}{marker}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First paragraph shares the marker line; later blocks (nested lists) go on
/// following lines one level deeper.
fn render_list_item(item: &Node, depth: usize, prefix: &str) -> String {
    let children = item.children();
    if children.is_empty() {
        return prefix.to_string();
    }
    children
        .iter()
        .enumerate()
        .map(|(index, child)| match child {
            Node::Paragraph(block) if index == 0 => {
                format!("{prefix}{}", render_inline(&block.children))
            }
            other => convert_block(other, depth + 1),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("{QUOTE_PREFIX}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inline(children: &[Node]) -> String {
    children
        .iter()
        .map(|child| match child {
            Node::Text(leaf) => apply_marks(&leaf.text, &leaf.marks),
            _ => String::new(),
        })
        .collect()
}

fn apply_marks(text: &str, marks: &[Mark]) -> String {
    marks
        .iter()
        .fold(text.to_string(), |wrapped, mark| wrap_with_mark(wrapped, mark))
}

fn wrap_with_mark(text: String, mark: &Mark) -> String {
    match mark {
        Mark::Bold { .. } => format!("**{text}**"),
        Mark::Italic { .. } => format!("*{text}*"),
        Mark::Code { .. } => format!("`{text}`"),
        Mark::Link { .. } => format!("[{text}]({})", mark.href().unwrap_or_default()),
        Mark::Opaque { .. } => text,
    }
}
