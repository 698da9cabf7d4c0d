use bloom_core::model::node::Mark;
use bloom_core::model::document::parse_timestamp;
use bloom_core::{deserialize_document, serialize_document, DocumentStatus, Node};
use serde_json::{json, Value};

#[test]
fn stored_file_round_trips_with_unknown_fields() {
    let text = json!({
        "content": {
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2, "id": "h-1"}, "content": [
                    {"type": "text", "text": "Plan", "marks": [{"type": "bold"}]}
                ]},
                {"type": "callout", "attrs": {"tone": "warn"}, "content": [
                    {"type": "text", "text": "Careful"}
                ]}
            ]
        },
        "title": "Plan",
        "subtitle": "for spring",
        "createdAt": "2026-03-01T08:00:00.000Z",
        "modifiedAt": "2026-03-02T09:30:15.250Z",
        "tags": ["garden", "todo"],
        "status": "published",
        "pinned": true,
        "coverImage": {"src": "cover.png", "alt": ""}
    });

    let doc = deserialize_document(&text.to_string()).unwrap();
    assert_eq!(doc.status, DocumentStatus::Published);
    assert_eq!(doc.tags, vec!["garden", "todo"]);
    assert_eq!(doc.extra.get("pinned"), Some(&json!(true)));

    let reencoded: Value = serde_json::from_str(&serialize_document(&doc)).unwrap();
    assert_eq!(reencoded, text);
}

#[test]
fn invalid_json_fails_with_parse_reason() {
    let err = deserialize_document("not valid json{").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("failed to parse bloom file"));
    assert!(message.len() > "failed to parse bloom file: ".len());
}

#[test]
fn empty_object_gets_defaults() {
    let doc = deserialize_document("{}").unwrap();
    assert_eq!(doc.content, Node::empty_doc());
    assert_eq!(doc.title, "Untitled");
    assert_eq!(doc.subtitle, "");
    assert!(doc.tags.is_empty());
    assert_eq!(doc.status, DocumentStatus::Draft);
    assert_eq!(doc.created_at, doc.modified_at);
}

#[test]
fn content_only_file_gets_metadata_defaults() {
    let content = json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "Just the body"}]}
    ]});
    let doc = deserialize_document(&json!({ "content": content }).to_string()).unwrap();
    assert_eq!(doc.content.flatten_text(), "Just the body");
    assert_eq!(doc.title, "Untitled");
    assert_eq!(doc.subtitle, "");
    assert!(doc.tags.is_empty());
    assert_eq!(doc.status, DocumentStatus::Draft);
    assert!(doc.extra.is_empty());

    let encoded: Value = serde_json::from_str(&serialize_document(&doc)).unwrap();
    assert_eq!(encoded["content"], content);
    assert_eq!(encoded["tags"], json!([]));
    assert_eq!(encoded["status"], "draft");
    for key in ["createdAt", "modifiedAt"] {
        let stamp = encoded[key].as_str().unwrap();
        assert!(!stamp.is_empty());
        assert!(parse_timestamp(stamp).is_some());
    }
}

#[test]
fn timestamp_text_survives_round_trip() {
    let text = json!({
        "createdAt": "2024-01-01",
        "modifiedAt": "2024-01-01T00:00:00.123456Z"
    });
    let doc = deserialize_document(&text.to_string()).unwrap();
    let encoded: Value = serde_json::from_str(&serialize_document(&doc)).unwrap();
    assert_eq!(encoded["createdAt"], "2024-01-01");
    assert_eq!(encoded["modifiedAt"], "2024-01-01T00:00:00.123456Z");
}

#[test]
fn marks_survive_decoding_in_declared_order() {
    let text = json!({
        "content": {"type": "doc", "content": [{"type": "paragraph", "content": [
            {"type": "text", "text": "x", "marks": [
                {"type": "italic"},
                {"type": "link", "attrs": {"href": "https://a.example", "target": "_blank"}},
                {"type": "highlight"}
            ]}
        ]}]}
    });
    let doc = deserialize_document(&text.to_string()).unwrap();
    let Node::Paragraph(paragraph) = &doc.content.children()[0] else {
        panic!("expected paragraph");
    };
    let Node::Text(leaf) = &paragraph.children[0] else {
        panic!("expected text leaf");
    };
    assert_eq!(leaf.marks[0], Mark::italic());
    assert_eq!(leaf.marks[1].href(), Some("https://a.example"));
    assert_eq!(leaf.marks[2].kind(), "highlight");
}

#[test]
fn content_attributes_survive_a_save() {
    let content = json!({"type": "doc", "content": [
        {"type": "paragraph", "attrs": {"indent": 1}, "content": [
            {"type": "text", "text": "heavy", "attrs": {"id": "t-1"}, "marks": [
                {"type": "bold", "attrs": {"weight": 700}}
            ]}
        ]},
        {"type": "blockquote", "content": []}
    ]});
    let text = json!({"content": content, "title": "Marks"}).to_string();
    let doc = deserialize_document(&text).unwrap();
    let reencoded: Value = serde_json::from_str(&serialize_document(&doc)).unwrap();
    assert_eq!(reencoded["content"], content);
}
