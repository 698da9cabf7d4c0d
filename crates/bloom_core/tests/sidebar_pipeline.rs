use bloom_core::{format_relative_time, SidebarQuery, SidebarSummary};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 10, hour, 0, 0).unwrap()
}

fn summary(id: &str, title: &str, hour: u32, tags: &[&str]) -> SidebarSummary {
    SidebarSummary {
        id: id.to_string(),
        title: title.to_string(),
        modified_at: at(hour),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

fn listing() -> Vec<SidebarSummary> {
    vec![
        summary("essay", "Essay draft", 9, &["writing"]),
        summary("recipes", "Recipes (family)", 11, &["home"]),
        summary("journal", "Journal", 13, &["writing", "daily"]),
        summary("draft", "Untitled", 10, &[]),
    ]
}

fn ids(docs: &[SidebarSummary]) -> Vec<&str> {
    docs.iter().map(|doc| doc.id.as_str()).collect()
}

#[test]
fn tag_then_search_then_sort() {
    let query = SidebarQuery::new(Some("writing".to_string()), "");
    assert_eq!(ids(&query.apply(&listing())), vec!["journal", "essay"]);

    let query = SidebarQuery::new(Some("writing".to_string()), "ESSAY");
    assert_eq!(ids(&query.apply(&listing())), vec!["essay"]);

    let query = SidebarQuery::new(None, "");
    assert_eq!(
        ids(&query.apply(&listing())),
        vec!["journal", "recipes", "draft", "essay"]
    );
}

#[test]
fn search_text_is_literal() {
    let query = SidebarQuery::new(None, "(family");
    assert_eq!(ids(&query.apply(&listing())), vec!["recipes"]);

    let query = SidebarQuery::new(None, ".*");
    assert!(query.apply(&listing()).is_empty());
}

#[test]
fn tag_filter_with_no_matches_is_empty() {
    let query = SidebarQuery::new(Some("travel".to_string()), "");
    assert!(query.apply(&listing()).is_empty());
}

#[test]
fn relative_labels_for_rows() {
    let now = at(13);
    assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5 min ago");
    assert_eq!(format_relative_time(now - Duration::days(1), now), "Yesterday");
    assert_eq!(format_relative_time(now - Duration::days(3), now), "3 days ago");
    assert_eq!(
        format_relative_time(Utc.with_ymd_and_hms(2025, 12, 25, 0, 0, 0).unwrap(), now),
        "12/25/2025"
    );
}
