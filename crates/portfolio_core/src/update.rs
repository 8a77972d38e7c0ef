use crate::{CollectionState, Effect, Msg, Record};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<R: Record>(mut state: CollectionState<R>, msg: Msg<R>) -> (CollectionState<R>, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.loading_generation().is_some() {
                Vec::new()
            } else {
                vec![start_load(&mut state)]
            }
        }
        Msg::RefreshRequested => {
            let mut effects = Vec::with_capacity(2);
            if let Some(generation) = state.loading_generation() {
                effects.push(Effect::CancelLoad { generation });
            }
            effects.push(start_load(&mut state));
            effects
        }
        Msg::Unmounted => match state.loading_generation() {
            Some(generation) => {
                state.abandon_load();
                vec![Effect::CancelLoad { generation }]
            }
            None => Vec::new(),
        },
        Msg::Rendered {
            generation,
            source,
            records,
        } => {
            state.apply_rendered(generation, source, records);
            Vec::new()
        }
        Msg::LoadFailed { generation, .. } => {
            // Whatever is on screen (cache or fallback) stays; the engine has logged the cause.
            state.apply_failed(generation);
            Vec::new()
        }
        Msg::CategorySelected(category) => {
            state.select_category(category);
            Vec::new()
        }
        Msg::QueryChanged { text, at } => {
            state.input_query(text, at);
            Vec::new()
        }
        Msg::QuerySubmitted => {
            state.flush_query();
            Vec::new()
        }
        Msg::Tick { now } => {
            state.settle_query(now);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_load<R: Record>(state: &mut CollectionState<R>) -> Effect {
    let generation = state.begin_load();
    Effect::LoadCollection {
        collection: state.collection(),
        generation,
    }
}
