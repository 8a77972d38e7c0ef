use crate::LoadGeneration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the cache → fallback → race(fetch, deadline) sequence for a collection.
    LoadCollection {
        collection: &'static str,
        generation: LoadGeneration,
    },
    /// Abort an in-flight load; nothing it produces will be applied.
    CancelLoad { generation: LoadGeneration },
}
