//! Rich-text content tree.
//!
//! # Responsibility
//! - Define the closed node/mark sum types shared by converters and storage.
//! - Decode the ProseMirror-style JSON shape (`type`/`attrs`/`content`/
//!   `text`/`marks`) without ever failing on malformed content.
//! - Provide traversal helpers (depth-first walk, leaf text flattening).
//!
//! # Invariants
//! - Decoding then encoding reproduces every node object, including its
//!   attributes, unknown keys and explicitly empty arrays.
//! - Heading `level` and link `href` stay inside their raw `attrs`; typed
//!   accessors read them from there.
//! - Missing or wrongly typed `content`/`marks` arrays decode as empty.
//! - Mark order is declaration order and is never re-sorted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Raw JSON attribute bag carried by nodes and marks.
pub type Attrs = Map<String, Value>;

pub const KIND_DOC: &str = "doc";
pub const KIND_PARAGRAPH: &str = "paragraph";
pub const KIND_HEADING: &str = "heading";
pub const KIND_BULLET_LIST: &str = "bulletList";
pub const KIND_ORDERED_LIST: &str = "orderedList";
pub const KIND_LIST_ITEM: &str = "listItem";
pub const KIND_CODE_BLOCK: &str = "codeBlock";
pub const KIND_BLOCKQUOTE: &str = "blockquote";
pub const KIND_TEXT: &str = "text";

pub const MARK_BOLD: &str = "bold";
pub const MARK_ITALIC: &str = "italic";
pub const MARK_CODE: &str = "code";
pub const MARK_LINK: &str = "link";

const KEY_TYPE: &str = "type";
const KEY_ATTRS: &str = "attrs";
const KEY_CONTENT: &str = "content";
const KEY_TEXT: &str = "text";
const KEY_MARKS: &str = "marks";
const ATTR_LEVEL: &str = "level";
const ATTR_HREF: &str = "href";

const DEFAULT_HEADING_LEVEL: u8 = 1;

/// Container node payload: attributes plus ordered children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub attrs: Attrs,
    pub children: Vec<Node>,
    /// Object keys the typed fields do not carry, written back as read.
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }
}

/// Heading payload. `level` lives in `attrs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heading {
    pub attrs: Attrs,
    pub children: Vec<Node>,
    pub extra: Map<String, Value>,
}

impl Heading {
    /// `attrs.level` when it is an integer in `1..=255`, else 1.
    pub fn level(&self) -> u8 {
        self.attrs
            .get(ATTR_LEVEL)
            .and_then(Value::as_u64)
            .and_then(|value| u8::try_from(value).ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_HEADING_LEVEL)
    }
}

/// Text leaf with its inline marks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLeaf {
    pub text: String,
    pub attrs: Attrs,
    pub marks: Vec<Mark>,
    pub extra: Map<String, Value>,
}

/// Node of a kind this crate does not interpret.
///
/// Kept verbatim so newer editor content survives a save from an older
/// build. Converters render it as empty output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpaqueNode {
    pub kind: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
    pub text: Option<String>,
    pub marks: Vec<Mark>,
    pub extra: Map<String, Value>,
}

/// One element of the document content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Doc(Block),
    Paragraph(Block),
    Heading(Heading),
    BulletList(Block),
    OrderedList(Block),
    ListItem(Block),
    CodeBlock(Block),
    Blockquote(Block),
    Text(TextLeaf),
    Opaque(OpaqueNode),
}

/// Inline annotation attached to a text leaf.
///
/// Every variant keeps its raw `attrs`; a link's `href` is one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Bold { attrs: Attrs },
    Italic { attrs: Attrs },
    Code { attrs: Attrs },
    Link { attrs: Attrs },
    Opaque { kind: String, attrs: Attrs },
}

impl Mark {
    pub fn bold() -> Self {
        Self::Bold {
            attrs: Attrs::new(),
        }
    }

    pub fn italic() -> Self {
        Self::Italic {
            attrs: Attrs::new(),
        }
    }

    pub fn code() -> Self {
        Self::Code {
            attrs: Attrs::new(),
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert(ATTR_HREF.to_string(), Value::String(href.into()));
        Self::Link { attrs }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Bold { .. } => MARK_BOLD,
            Self::Italic { .. } => MARK_ITALIC,
            Self::Code { .. } => MARK_CODE,
            Self::Link { .. } => MARK_LINK,
            Self::Opaque { kind, .. } => kind.as_str(),
        }
    }

    pub fn attrs(&self) -> &Attrs {
        match self {
            Self::Bold { attrs }
            | Self::Italic { attrs }
            | Self::Code { attrs }
            | Self::Link { attrs }
            | Self::Opaque { attrs, .. } => attrs,
        }
    }

    /// Link target; `None` for other marks or a non-string `href`.
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { attrs } => attrs.get(ATTR_HREF).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Decodes one mark object. Returns `None` for non-object values.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = object
            .get(KEY_TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let attrs = object
            .get(KEY_ATTRS)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mark = match kind {
            MARK_BOLD => Self::Bold { attrs },
            MARK_ITALIC => Self::Italic { attrs },
            MARK_CODE => Self::Code { attrs },
            MARK_LINK => Self::Link { attrs },
            other => Self::Opaque {
                kind: other.to_string(),
                attrs,
            },
        };
        Some(mark)
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(KEY_TYPE.to_string(), Value::String(self.kind().to_string()));
        insert_attrs(&mut object, self.attrs());
        Value::Object(object)
    }
}

impl Node {
    /// Empty root: `{"type": "doc", "content": []}`.
    pub fn empty_doc() -> Self {
        Self::Doc(Block::default())
    }

    pub fn doc(children: Vec<Node>) -> Self {
        Self::Doc(Block::new(children))
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::Paragraph(Block::new(children))
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert(ATTR_LEVEL.to_string(), Value::from(level));
        Self::Heading(Heading {
            attrs,
            children,
            extra: Map::new(),
        })
    }

    pub fn bullet_list(items: Vec<Node>) -> Self {
        Self::BulletList(Block::new(items))
    }

    pub fn ordered_list(items: Vec<Node>) -> Self {
        Self::OrderedList(Block::new(items))
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Self::ListItem(Block::new(children))
    }

    pub fn code_block(children: Vec<Node>) -> Self {
        Self::CodeBlock(Block::new(children))
    }

    pub fn blockquote(children: Vec<Node>) -> Self {
        Self::Blockquote(Block::new(children))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::marked_text(text, Vec::new())
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self::Text(TextLeaf {
            text: text.into(),
            marks,
            ..TextLeaf::default()
        })
    }

    /// Wire kind string (`type` in JSON).
    pub fn kind(&self) -> &str {
        match self {
            Self::Doc(_) => KIND_DOC,
            Self::Paragraph(_) => KIND_PARAGRAPH,
            Self::Heading(_) => KIND_HEADING,
            Self::BulletList(_) => KIND_BULLET_LIST,
            Self::OrderedList(_) => KIND_ORDERED_LIST,
            Self::ListItem(_) => KIND_LIST_ITEM,
            Self::CodeBlock(_) => KIND_CODE_BLOCK,
            Self::Blockquote(_) => KIND_BLOCKQUOTE,
            Self::Text(_) => KIND_TEXT,
            Self::Opaque(node) => node.kind.as_str(),
        }
    }

    pub fn is_doc(&self) -> bool {
        matches!(self, Self::Doc(_))
    }

    /// Whether this node lives inside a text run rather than forming a block.
    pub fn is_inline(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Opaque(node) => node.text.is_some(),
            _ => false,
        }
    }

    /// Ordered children; leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Doc(block)
            | Self::Paragraph(block)
            | Self::BulletList(block)
            | Self::OrderedList(block)
            | Self::ListItem(block)
            | Self::CodeBlock(block)
            | Self::Blockquote(block) => &block.children,
            Self::Heading(heading) => &heading.children,
            Self::Opaque(node) => &node.children,
            Self::Text(_) => &[],
        }
    }

    /// Depth-first, pre-order walk starting at (and including) `self`.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst { stack: vec![self] }
    }

    /// Concatenates all leaf text under this node in document order.
    pub fn flatten_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Decodes one node object. Returns `None` when `value` is not an object.
    ///
    /// Non-object entries inside `content` arrays are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = object
            .get(KEY_TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mut fields = ObjectFields::new(object);
        let attrs = fields.take_attrs();
        let children = fields.take_children();

        let node = match kind {
            KIND_DOC => {
                fields.discard(KEY_CONTENT);
                Self::Doc(fields.into_block(attrs, children))
            }
            KIND_PARAGRAPH => Self::Paragraph(fields.into_block(attrs, children)),
            KIND_HEADING => Self::Heading(Heading {
                attrs,
                children,
                extra: fields.into_rest(),
            }),
            KIND_BULLET_LIST => Self::BulletList(fields.into_block(attrs, children)),
            KIND_ORDERED_LIST => Self::OrderedList(fields.into_block(attrs, children)),
            KIND_LIST_ITEM => Self::ListItem(fields.into_block(attrs, children)),
            KIND_CODE_BLOCK => Self::CodeBlock(fields.into_block(attrs, children)),
            KIND_BLOCKQUOTE => Self::Blockquote(fields.into_block(attrs, children)),
            KIND_TEXT => Self::Text(TextLeaf {
                text: fields.take_text().unwrap_or_default(),
                attrs,
                marks: fields.take_marks(),
                extra: fields.into_rest(),
            }),
            other => Self::Opaque(OpaqueNode {
                kind: other.to_string(),
                attrs,
                children,
                text: fields.take_text(),
                marks: fields.take_marks(),
                extra: fields.into_rest(),
            }),
        };
        Some(node)
    }

    pub fn to_value(&self) -> Value {
        let mut object = match self {
            Self::Doc(block)
            | Self::Paragraph(block)
            | Self::BulletList(block)
            | Self::OrderedList(block)
            | Self::ListItem(block)
            | Self::CodeBlock(block)
            | Self::Blockquote(block) => {
                encode_fields(&block.extra, &block.attrs, &block.children)
            }
            Self::Heading(heading) => {
                encode_fields(&heading.extra, &heading.attrs, &heading.children)
            }
            Self::Text(leaf) => {
                let mut object = encode_fields(&leaf.extra, &leaf.attrs, &[]);
                object.insert(KEY_TEXT.to_string(), Value::String(leaf.text.clone()));
                insert_marks(&mut object, &leaf.marks);
                object
            }
            Self::Opaque(node) => {
                let mut object = encode_fields(&node.extra, &node.attrs, &node.children);
                if let Some(text) = &node.text {
                    object.insert(KEY_TEXT.to_string(), Value::String(text.clone()));
                }
                insert_marks(&mut object, &node.marks);
                object
            }
        };
        object.insert(KEY_TYPE.to_string(), Value::String(self.kind().to_string()));
        if self.is_doc() {
            object.insert(KEY_CONTENT.to_string(), encode_children(self.children()));
        }
        Value::Object(object)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("content node must be a JSON object"))
    }
}

/// Iterator returned by [`Node::depth_first`].
pub struct DepthFirst<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Splits a node object into typed fields and leftover keys.
///
/// A known key stays in the leftovers unless the encoder would write it back
/// from the typed field, so `"content": []` or a string `"marks"` survives.
struct ObjectFields {
    rest: Map<String, Value>,
}

impl ObjectFields {
    fn new(object: &Map<String, Value>) -> Self {
        let mut rest = object.clone();
        rest.remove(KEY_TYPE);
        Self { rest }
    }

    /// Drops a key the encoder always rewrites.
    fn discard(&mut self, key: &str) {
        self.rest.remove(key);
    }

    fn take_attrs(&mut self) -> Attrs {
        match self.rest.remove(KEY_ATTRS) {
            Some(Value::Object(attrs)) if !attrs.is_empty() => attrs,
            Some(other) => {
                self.rest.insert(KEY_ATTRS.to_string(), other);
                Attrs::new()
            }
            None => Attrs::new(),
        }
    }

    fn take_children(&mut self) -> Vec<Node> {
        let children = decode_children(self.rest.get(KEY_CONTENT));
        if !children.is_empty() {
            self.rest.remove(KEY_CONTENT);
        }
        children
    }

    fn take_text(&mut self) -> Option<String> {
        match self.rest.remove(KEY_TEXT) {
            Some(Value::String(text)) => Some(text),
            Some(other) => {
                self.rest.insert(KEY_TEXT.to_string(), other);
                None
            }
            None => None,
        }
    }

    fn take_marks(&mut self) -> Vec<Mark> {
        let marks = decode_marks(self.rest.get(KEY_MARKS));
        if !marks.is_empty() {
            self.rest.remove(KEY_MARKS);
        }
        marks
    }

    fn into_block(self, attrs: Attrs, children: Vec<Node>) -> Block {
        Block {
            attrs,
            children,
            extra: self.into_rest(),
        }
    }

    fn into_rest(self) -> Map<String, Value> {
        self.rest
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(leaf) => out.push_str(&leaf.text),
        Node::Opaque(OpaqueNode {
            text: Some(text), ..
        }) if !text.is_empty() => out.push_str(text),
        other => {
            for child in other.children() {
                collect_text(child, out);
            }
        }
    }
}

fn decode_children(value: Option<&Value>) -> Vec<Node> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Node::from_value).collect(),
        _ => Vec::new(),
    }
}

fn decode_marks(value: Option<&Value>) -> Vec<Mark> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Mark::from_value).collect(),
        _ => Vec::new(),
    }
}

fn encode_children(children: &[Node]) -> Value {
    Value::Array(children.iter().map(Node::to_value).collect())
}

/// Leftover keys, then non-empty `attrs` and `content` over them.
fn encode_fields(
    extra: &Map<String, Value>,
    attrs: &Attrs,
    children: &[Node],
) -> Map<String, Value> {
    let mut object = extra.clone();
    insert_attrs(&mut object, attrs);
    if !children.is_empty() {
        object.insert(KEY_CONTENT.to_string(), encode_children(children));
    }
    object
}

fn insert_attrs(object: &mut Map<String, Value>, attrs: &Attrs) {
    if !attrs.is_empty() {
        object.insert(KEY_ATTRS.to_string(), Value::Object(attrs.clone()));
    }
}

fn insert_marks(object: &mut Map<String, Value>, marks: &[Mark]) {
    if !marks.is_empty() {
        object.insert(
            KEY_MARKS.to_string(),
            Value::Array(marks.iter().map(Mark::to_value).collect()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Mark, Node};
    use serde_json::json;

    #[test]
    fn decodes_known_kinds_and_heading_level() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [
                    {"type": "text", "text": "Hi"}
                ]},
                {"type": "paragraph"}
            ]
        });
        let node = Node::from_value(&value).expect("object decodes");
        let children = node.children();
        assert_eq!(children.len(), 2);
        match &children[0] {
            Node::Heading(heading) => {
                assert_eq!(heading.level(), 2);
                assert_eq!(heading.attrs.get("level"), Some(&json!(2)));
            }
            other => panic!("expected heading, got {other:?}"),
        }
        assert!(children[1].children().is_empty());
    }

    #[test]
    fn malformed_content_decodes_as_empty() {
        let value = json!({"type": "paragraph", "content": "not an array"});
        let node = Node::from_value(&value).expect("object decodes");
        assert!(node.children().is_empty());
        assert_eq!(node.to_value(), value);

        let value = json!({"type": "heading", "attrs": {"level": "big"}});
        match Node::from_value(&value).expect("object decodes") {
            Node::Heading(heading) => assert_eq!(heading.level(), 1),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_survive_encode() {
        let value = json!({
            "type": "image",
            "attrs": {"src": "cover.png", "alt": null},
            "marks": [{"type": "highlight", "attrs": {"color": "yellow"}}]
        });
        let node = Node::from_value(&value).expect("object decodes");
        assert_eq!(node.kind(), "image");
        assert_eq!(node.to_value(), value);
    }

    #[test]
    fn link_keeps_extra_attributes() {
        let value = json!({
            "type": "text",
            "text": "site",
            "marks": [{"type": "link", "attrs": {"href": "https://a.example", "target": "_blank"}}]
        });
        let node = Node::from_value(&value).expect("object decodes");
        match &node {
            Node::Text(leaf) => {
                let link = &leaf.marks[0];
                assert_eq!(link.href(), Some("https://a.example"));
                assert_eq!(link.attrs().get("target"), Some(&json!("_blank")));
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(node.to_value(), value);
    }

    #[test]
    fn known_kinds_keep_every_field() {
        let value = json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [], "attrs": {"textAlign": "center"}},
                {"type": "heading", "attrs": {"level": 3, "id": "h-3"}, "data-pos": 7},
                {"type": "bulletList", "attrs": {}, "content": [
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [
                            {
                                "type": "text",
                                "text": "rich",
                                "attrs": {"lang": "en"},
                                "marks": [
                                    {"type": "bold", "attrs": {"weight": 700}},
                                    {"type": "italic"},
                                    {"type": "code", "attrs": {"tone": "muted"}},
                                    {"type": "link", "attrs": {"target": "_blank"}}
                                ]
                            },
                            {"type": "text", "text": "plain", "marks": []}
                        ]}
                    ]}
                ]}
            ]
        });
        let node = Node::from_value(&value).expect("object decodes");
        assert_eq!(node.to_value(), value);

        let leaf = node
            .depth_first()
            .find_map(|child| match child {
                Node::Text(leaf) if leaf.text == "rich" => Some(leaf),
                _ => None,
            })
            .expect("rich text leaf");
        assert_eq!(leaf.attrs.get("lang"), Some(&json!("en")));
        assert_eq!(leaf.marks[0].attrs().get("weight"), Some(&json!(700)));
        assert_eq!(leaf.marks[3].href(), None);
    }

    #[test]
    fn built_nodes_decode_back_equal() {
        let node = Node::doc(vec![
            Node::heading(2, vec![Node::text("Title")]),
            Node::paragraph(vec![Node::marked_text(
                "see",
                vec![Mark::bold(), Mark::link("https://a.example")],
            )]),
            Node::paragraph(vec![]),
        ]);
        assert_eq!(Node::from_value(&node.to_value()), Some(node.clone()));
        assert_eq!(
            Node::from_value(&Node::empty_doc().to_value()),
            Some(Node::empty_doc())
        );
    }

    #[test]
    fn depth_first_visits_in_document_order() {
        let doc = Node::doc(vec![
            Node::blockquote(vec![Node::paragraph(vec![Node::text("a")])]),
            Node::paragraph(vec![Node::text("b")]),
        ]);
        let kinds: Vec<&str> = doc.depth_first().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec!["doc", "blockquote", "paragraph", "text", "paragraph", "text"]
        );
    }

    #[test]
    fn flatten_text_ignores_marks() {
        let node = Node::paragraph(vec![
            Node::text("Hello "),
            Node::marked_text("bold", vec![Mark::bold(), Mark::italic()]),
            Node::text(" world"),
        ]);
        assert_eq!(node.flatten_text(), "Hello bold world");
    }

    #[test]
    fn non_object_root_is_rejected_by_serde() {
        let err = serde_json::from_str::<Node>("[1, 2]").expect_err("array is not a node");
        assert!(err.to_string().contains("JSON object"));
    }
}
