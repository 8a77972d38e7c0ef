use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use portfolio_core::{
    update, CollectionState, ContentRecord, DeferredQuery, Effect, LoadSource, Msg, Project,
    ProjectDetails, ALL_CATEGORIES,
};
use pretty_assertions::assert_eq;

fn project(id: &str, category: &str, tags: &[&str]) -> Project {
    ContentRecord {
        id: id.to_string(),
        title: format!("Project {id}"),
        description: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: category.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        updated_at: None,
        details: ProjectDetails::default(),
    }
}

fn loaded(delay: Duration) -> CollectionState<Project> {
    let state = CollectionState::with_query(DeferredQuery::new(delay));
    let (state, effects) = update(state, Msg::Mounted);
    let generation = match effects.as_slice() {
        [Effect::LoadCollection { generation, .. }] => *generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let (mut state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Live,
            records: vec![
                project("1", "network", &["Cisco"]),
                project("2", "ai", &["Python", "TensorFlow"]),
                project("3", "web", &["Python", "Django"]),
            ],
        },
    );
    state.consume_dirty();
    state
}

#[test]
fn category_selection_filters_view() {
    let state = loaded(Duration::from_millis(200));
    let (mut state, effects) = update(state, Msg::CategorySelected("ai".to_string()));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let view = state.view();
    assert_eq!(view.active_category, "ai");
    assert_eq!(view.total, 3);
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.categories, vec!["network", "ai", "web"]);

    let (mut state, _) = update(state, Msg::CategorySelected("ai".to_string()));
    assert!(!state.consume_dirty());

    let (state, _) = update(state, Msg::CategorySelected(ALL_CATEGORIES.to_string()));
    assert_eq!(state.view().records.len(), 3);
}

#[test]
fn query_is_applied_after_tick_settles_it() {
    let start = Instant::now();
    let state = loaded(Duration::from_millis(200));

    let (mut state, _) = update(
        state,
        Msg::QueryChanged {
            text: "python".to_string(),
            at: start,
        },
    );
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.query_input, "python");
    assert_eq!(view.committed_query, "");
    assert_eq!(view.records.len(), 3);

    let (mut state, _) = update(
        state,
        Msg::Tick {
            now: start + Duration::from_millis(50),
        },
    );
    assert!(!state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::Tick {
            now: start + Duration::from_millis(250),
        },
    );
    assert!(state.consume_dirty());
    let ids: Vec<_> = state.view().records.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["2", "3"]);
}

#[test]
fn submit_applies_query_without_waiting() {
    let state = loaded(Duration::from_secs(60));
    let (state, _) = update(
        state,
        Msg::QueryChanged {
            text: "django".to_string(),
            at: Instant::now(),
        },
    );
    let (state, _) = update(state, Msg::CategorySelected("web".to_string()));
    let (state, _) = update(state, Msg::QuerySubmitted);

    let view = state.view();
    assert_eq!(view.committed_query, "django");
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].id, "3");
}
