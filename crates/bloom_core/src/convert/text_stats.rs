//! Word count and read-time helpers for the post header and toolbar.

use crate::model::node::Node;

const WORDS_PER_MINUTE: usize = 250;

/// Counts whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Formats a read-time estimate, never less than one minute.
pub fn estimate_read_time(word_count: usize) -> String {
    let minutes = word_count.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Plain text of a tree with blocks separated by a blank line.
///
/// Unlike [`Node::flatten_text`], words in adjacent paragraphs do not run
/// together.
pub fn plain_text(node: &Node) -> String {
    match node {
        Node::Text(leaf) => leaf.text.clone(),
        other => {
            let mut out = String::new();
            for child in other.children() {
                let piece = plain_text(child);
                if !child.is_inline() && !out.is_empty() {
                    out.push_str("\n\n");
                }
                out.push_str(&piece);
            }
            out
        }
    }
}

/// Word count of the body plus title, as shown in the toolbar.
pub fn document_word_count(title: &str, content: &Node) -> usize {
    count_words(title) + count_words(&plain_text(content))
}

#[cfg(test)]
mod tests {
    use super::{count_words, document_word_count, estimate_read_time, plain_text};
    use crate::model::node::Node;

    #[test]
    fn counts_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t  "), 0);
        assert_eq!(count_words("The quick brown fox"), 4);
        assert_eq!(count_words("hello   world"), 2);
    }

    #[test]
    fn read_time_rounds_up_with_one_minute_floor() {
        assert_eq!(estimate_read_time(0), "1 min read");
        assert_eq!(estimate_read_time(250), "1 min read");
        assert_eq!(estimate_read_time(251), "2 min read");
    }

    #[test]
    fn plain_text_separates_blocks() {
        let doc = Node::doc(vec![
            Node::paragraph(vec![Node::text("Hello"), Node::text(" there")]),
            Node::paragraph(vec![Node::text("World")]),
        ]);
        assert_eq!(plain_text(&doc), "Hello there\n\nWorld");
        assert_eq!(document_word_count("My Title", &doc), 5);
    }
}
