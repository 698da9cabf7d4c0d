//! Exported HTML cleanup.
//!
//! # Responsibility
//! - Strip editor bookkeeping attributes (`data-*`, `class`) from start tags.
//!
//! # Invariants
//! - Tag names, nesting, text content and all other attributes are untouched.
//! - Only attribute tokens inside start tags are considered; text such as
//!   `class="x"` between tags, or inside another attribute's value, survives.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static START_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<([A-Za-z][A-Za-z0-9:-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)(\s*/?)>"#,
    )
    .expect("valid start tag regex")
});
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+([^\s"'<>/=]+)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#)
        .expect("valid attribute regex")
});

/// Removes `data-*` and `class` attributes from every start tag.
pub fn clean_html(raw_html: &str) -> String {
    START_TAG_RE
        .replace_all(raw_html, |caps: &Captures<'_>| {
            let kept: String = ATTRIBUTE_RE
                .captures_iter(&caps[2])
                .filter(|attr| !is_stripped_attribute(&attr[1]))
                .map(|attr| attr[0].to_string())
                .collect();
            format!("<{}{}{}>", &caps[1], kept, &caps[3])
        })
        .into_owned()
}

fn is_stripped_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "class" || name.starts_with("data-")
}

#[cfg(test)]
mod tests {
    use super::clean_html;

    #[test]
    fn removes_data_attributes() {
        assert_eq!(
            clean_html(r#"<p data-pm-slice="1 1 []">Hello</p>"#),
            "<p>Hello</p>"
        );
    }

    #[test]
    fn removes_class_but_keeps_structure() {
        let raw = r#"<div class="editor-content"><ul class="list"><li><p>One</p></li></ul></div>"#;
        assert_eq!(
            clean_html(raw),
            "<div><ul><li><p>One</p></li></ul></div>"
        );
    }

    #[test]
    fn anchor_keeps_href_only() {
        let raw = r#"<a href="https://example.com" class="link" data-id="3" target="_blank">x</a>"#;
        assert_eq!(
            clean_html(raw),
            r#"<a href="https://example.com" target="_blank">x</a>"#
        );
    }

    #[test]
    fn leaves_text_and_foreign_values_alone() {
        let raw = r#"<p title="see class=&quot;x&quot; data-y">class="keep" data-z="keep"</p>"#;
        assert_eq!(clean_html(raw), raw);
    }

    #[test]
    fn handles_single_quoted_unquoted_and_bare_attributes() {
        let raw = "<img src='a.png' class='wide' data-w=300 data-lazy alt=\"cover\"/>";
        assert_eq!(clean_html(raw), "<img src='a.png' alt=\"cover\"/>");
    }

    #[test]
    fn attribute_names_match_case_insensitively() {
        assert_eq!(
            clean_html(r#"<P CLASS="x" Data-Foo="y">Hi</P>"#),
            "<P>Hi</P>"
        );
    }
}
