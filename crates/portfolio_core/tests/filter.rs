use chrono::{TimeZone, Utc};
use portfolio_core::{categories, derive, ContentRecord, FilterState, Project, ProjectDetails, ALL_CATEGORIES};
use pretty_assertions::assert_eq;

fn project(id: &str, title: &str, description: &str, category: &str, tags: &[&str]) -> Project {
    ContentRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: category.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        updated_at: None,
        details: ProjectDetails::default(),
    }
}

fn sample() -> Vec<Project> {
    vec![
        project("1", "Network Optimization", "MPLS redesign", "network", &["Cisco", "BGP"]),
        project("2", "Analytics Dashboard", "Predictive insights", "ai", &["Python", "TensorFlow"]),
        project("3", "E-Commerce Platform", "Full-stack shop", "web", &["React", "Node.js"]),
        project("4", "NLP API", "Sentiment analysis in python", "ai", &["FastAPI"]),
    ]
}

#[test]
fn all_and_empty_query_is_identity() {
    let records = sample();
    assert_eq!(derive(&records, ALL_CATEGORIES, ""), records);
    assert_eq!(FilterState::default().apply(&records), records);
}

#[test]
fn category_filter_keeps_exact_matches_only() {
    let records = sample();
    let ids: Vec<_> = derive(&records, "ai", "").into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["2", "4"]);

    assert!(derive(&records, "AI", "").is_empty());
    assert!(derive(&records, "mobile", "").is_empty());
}

#[test]
fn text_filter_is_case_insensitive_across_fields() {
    let records = sample();

    let by_title: Vec<_> = derive(&records, ALL_CATEGORIES, "NETWORK").into_iter().map(|p| p.id).collect();
    assert_eq!(by_title, vec!["1"]);

    let by_description: Vec<_> = derive(&records, ALL_CATEGORIES, "full-STACK").into_iter().map(|p| p.id).collect();
    assert_eq!(by_description, vec!["3"]);

    let by_tag: Vec<_> = derive(&records, ALL_CATEGORIES, "node").into_iter().map(|p| p.id).collect();
    assert_eq!(by_tag, vec!["3"]);
}

#[test]
fn category_and_query_are_conjunctive() {
    let records = sample();
    // "python" appears as a tag on #2 and in the description of #4, both "ai".
    let ids: Vec<_> = derive(&records, "ai", "python").into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["2", "4"]);

    assert!(derive(&records, "web", "python").is_empty());
}

#[test]
fn ai_python_scenario_selects_single_record() {
    let records = vec![
        project("a", "Dashboard", "Insights", "ai", &["Python"]),
        project("b", "Shop", "Storefront", "web", &["Python"]),
        project("c", "Router", "Lab", "network", &["Go"]),
    ];

    let filtered = derive(&records, "ai", "python");
    assert_eq!(filtered, vec![records[0].clone()]);
}

#[test]
fn derive_preserves_source_order_and_is_idempotent() {
    let mut records = sample();
    records.reverse();

    let first = derive(&records, ALL_CATEGORIES, "a");
    let second = derive(&first, ALL_CATEGORIES, "a");
    assert_eq!(first, second);

    let ids: Vec<_> = first.iter().map(|p| p.id.as_str()).collect();
    let mut expected: Vec<_> = records.iter().map(|p| p.id.as_str()).collect();
    expected.retain(|id| ids.contains(id));
    assert_eq!(ids, expected);
}

#[test]
fn categories_are_distinct_in_first_seen_order() {
    let mut records = sample();
    records.push(project("5", "Blank", "", "", &[]));
    assert_eq!(categories(&records), vec!["network", "ai", "web"]);
}
