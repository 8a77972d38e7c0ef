use std::time::Instant;

use crate::deferred::DeferredQuery;
use crate::filter::{self, ALL_CATEGORIES};
use crate::view_model::CollectionView;
use crate::Record;

pub type LoadGeneration = u64;

/// Where the currently rendered records came from.
///
/// Exactly one source is shown at a time; a load moves from `Cached` or
/// `Fallback` to `Live`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSource {
    Cached,
    Fallback,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading { generation: LoadGeneration },
    Settled { generation: LoadGeneration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<R> {
    collection: &'static str,
    records: Vec<R>,
    source: Option<LoadSource>,
    phase: LoadPhase,
    next_generation: LoadGeneration,
    active_category: String,
    query: DeferredQuery,
    dirty: bool,
}

impl<R: Record> Default for CollectionState<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> CollectionState<R> {
    pub fn new() -> Self {
        Self::with_query(DeferredQuery::default())
    }

    pub fn with_query(query: DeferredQuery) -> Self {
        Self {
            collection: R::COLLECTION,
            records: Vec::new(),
            source: None,
            phase: LoadPhase::Idle,
            next_generation: 1,
            active_category: ALL_CATEGORIES.to_string(),
            query,
            dirty: false,
        }
    }

    pub fn view(&self) -> CollectionView<R> {
        CollectionView {
            collection: self.collection,
            source: self.source,
            loading: matches!(self.phase, LoadPhase::Loading { .. }),
            active_category: self.active_category.clone(),
            categories: filter::categories(&self.records),
            query_input: self.query.current().to_string(),
            committed_query: self.query.committed().to_string(),
            total: self.records.len(),
            records: filter::derive(&self.records, &self.active_category, self.query.committed()),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn source(&self) -> Option<LoadSource> {
        self.source
    }

    /// Unfiltered records as last rendered.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn collection(&self) -> &'static str {
        self.collection
    }

    pub(crate) fn loading_generation(&self) -> Option<LoadGeneration> {
        match self.phase {
            LoadPhase::Loading { generation } => Some(generation),
            _ => None,
        }
    }

    pub(crate) fn begin_load(&mut self) -> LoadGeneration {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.phase = LoadPhase::Loading { generation };
        self.dirty = true;
        generation
    }

    pub(crate) fn abandon_load(&mut self) {
        self.phase = LoadPhase::Idle;
        self.dirty = true;
    }

    /// Replaces the visible records wholesale. Returns false when the event
    /// belongs to a load other than the one in flight; a live render settles
    /// the load, so nothing can replace it afterwards.
    pub(crate) fn apply_rendered(
        &mut self,
        generation: LoadGeneration,
        source: LoadSource,
        records: Vec<R>,
    ) -> bool {
        if self.loading_generation() != Some(generation) {
            return false;
        }
        self.records = records;
        self.source = Some(source);
        if source == LoadSource::Live {
            self.phase = LoadPhase::Settled { generation };
        }
        self.dirty = true;
        true
    }

    pub(crate) fn apply_failed(&mut self, generation: LoadGeneration) -> bool {
        if self.loading_generation() != Some(generation) {
            return false;
        }
        self.phase = LoadPhase::Settled { generation };
        self.dirty = true;
        true
    }

    pub(crate) fn select_category(&mut self, category: String) -> bool {
        if self.active_category == category {
            return false;
        }
        self.active_category = category;
        self.dirty = true;
        true
    }

    pub(crate) fn input_query(&mut self, text: String, at: Instant) {
        let before = self.query.current().to_string();
        self.query.input(text, at);
        if self.query.current() != before {
            self.dirty = true;
        }
    }

    pub(crate) fn settle_query(&mut self, now: Instant) {
        if self.query.poll(now) {
            self.dirty = true;
        }
    }

    pub(crate) fn flush_query(&mut self) {
        if self.query.flush() {
            self.dirty = true;
        }
    }
}
