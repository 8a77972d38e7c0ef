use std::time::Instant;

use crate::{LoadGeneration, LoadSource};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg<R> {
    /// The collection view became visible.
    Mounted,
    /// The collection view went away; any in-flight load is abandoned.
    Unmounted,
    /// User asked for fresh data while the view is visible.
    RefreshRequested,
    /// Loader produced a full replacement for the visible collection.
    Rendered {
        generation: LoadGeneration,
        source: LoadSource,
        records: Vec<R>,
    },
    /// Loader gave up on the live fetch; whatever is rendered stays.
    LoadFailed {
        generation: LoadGeneration,
        reason: String,
    },
    /// User picked a category chip.
    CategorySelected(String),
    /// User edited the search box (raw keystrokes, committed after a quiet period).
    QueryChanged { text: String, at: Instant },
    /// User pressed enter in the search box.
    QuerySubmitted,
    /// Timer tick; settles deferred search input.
    Tick { now: Instant },
    /// Fallback for placeholder wiring.
    NoOp,
}
