use std::sync::Once;

use chrono::{TimeZone, Utc};
use portfolio_core::{
    update, CollectionState, ContentRecord, Effect, LoadPhase, LoadSource, Msg, Project,
    ProjectDetails, PROJECTS,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portfolio_logging::initialize_for_tests);
}

fn project(id: &str, category: &str) -> Project {
    ContentRecord {
        id: id.to_string(),
        title: format!("Project {id}"),
        description: String::new(),
        tags: Vec::new(),
        category: category.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
        updated_at: None,
        details: ProjectDetails::default(),
    }
}

fn mount(state: CollectionState<Project>) -> (CollectionState<Project>, u64) {
    let (state, effects) = update(state, Msg::Mounted);
    let generation = match effects.as_slice() {
        [Effect::LoadCollection { collection, generation }] => {
            assert_eq!(*collection, PROJECTS);
            *generation
        }
        other => panic!("unexpected effects {other:?}"),
    };
    (state, generation)
}

#[test]
fn mount_starts_a_load() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());
    assert_eq!(generation, 1);
    assert_eq!(state.phase(), LoadPhase::Loading { generation: 1 });
    assert!(state.view().loading);
    assert_eq!(state.view().source, None);
}

#[test]
fn mount_while_loading_is_ignored() {
    init_logging();
    let (state, _) = mount(CollectionState::new());
    let (state, effects) = update(state, Msg::Mounted);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), LoadPhase::Loading { generation: 1 });
}

#[test]
fn cached_then_live_replaces_wholesale() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());

    let (mut state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Cached,
            records: vec![project("a", "web"), project("b", "ai")],
        },
    );
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.source, Some(LoadSource::Cached));
    assert_eq!(view.total, 2);
    assert!(view.loading);

    let (state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Live,
            records: vec![project("c", "network")],
        },
    );
    let view = state.view();
    assert_eq!(view.source, Some(LoadSource::Live));
    assert_eq!(view.records, vec![project("c", "network")]);
    assert!(!view.loading);
    assert_eq!(state.phase(), LoadPhase::Settled { generation });
}

#[test]
fn failure_keeps_fallback_on_screen() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());
    let fallback = vec![project("1", "network"), project("2", "ai")];

    let (state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Fallback,
            records: fallback.clone(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::LoadFailed {
            generation,
            reason: "timeout".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.source, Some(LoadSource::Fallback));
    assert_eq!(view.records, fallback);
    assert!(!view.loading);
}

#[test]
fn late_live_result_after_failure_is_discarded() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());
    let (state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Fallback,
            records: vec![project("1", "network")],
        },
    );
    let (state, _) = update(
        state,
        Msg::LoadFailed {
            generation,
            reason: "timeout".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Live,
            records: vec![project("late", "web")],
        },
    );

    let view = state.view();
    assert_eq!(view.source, Some(LoadSource::Fallback));
    assert_eq!(view.records[0].id, "1");
}

#[test]
fn unmount_cancels_and_ignores_stragglers() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());
    let (mut state, effects) = update(state, Msg::Unmounted);
    assert_eq!(effects, vec![Effect::CancelLoad { generation }]);
    assert_eq!(state.phase(), LoadPhase::Idle);
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::Rendered {
            generation,
            source: LoadSource::Live,
            records: vec![project("x", "web")],
        },
    );
    assert!(state.records().is_empty());
    assert!(!state.consume_dirty());

    let (_state, effects) = update(state, Msg::Unmounted);
    assert!(effects.is_empty());
}

#[test]
fn remount_uses_a_fresh_generation() {
    init_logging();
    let (state, first) = mount(CollectionState::new());
    let (state, _) = update(
        state,
        Msg::Rendered {
            generation: first,
            source: LoadSource::Live,
            records: vec![project("a", "web")],
        },
    );
    let (state, second) = mount(state);
    assert!(second > first);

    // The previous generation can no longer touch state.
    let (state, _) = update(
        state,
        Msg::Rendered {
            generation: first,
            source: LoadSource::Live,
            records: Vec::new(),
        },
    );
    assert_eq!(state.records().len(), 1);

    let (state, _) = update(
        state,
        Msg::Rendered {
            generation: second,
            source: LoadSource::Cached,
            records: vec![project("a", "web"), project("b", "ai")],
        },
    );
    assert_eq!(state.source(), Some(LoadSource::Cached));
    assert_eq!(state.records().len(), 2);
}

#[test]
fn refresh_cancels_in_flight_load() {
    init_logging();
    let (state, generation) = mount(CollectionState::new());
    let (state, effects) = update(state, Msg::RefreshRequested);
    assert_eq!(
        effects,
        vec![
            Effect::CancelLoad { generation },
            Effect::LoadCollection {
                collection: PROJECTS,
                generation: generation + 1,
            },
        ]
    );
    assert_eq!(
        state.phase(),
        LoadPhase::Loading {
            generation: generation + 1
        }
    );
}

#[test]
fn noop_changes_nothing() {
    let state: CollectionState<Project> = CollectionState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
