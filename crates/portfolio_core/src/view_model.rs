use crate::LoadSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionView<R> {
    pub collection: &'static str,
    pub source: Option<LoadSource>,
    pub loading: bool,
    pub active_category: String,
    pub categories: Vec<String>,
    /// Search box contents, possibly ahead of the committed query.
    pub query_input: String,
    pub committed_query: String,
    pub total: usize,
    pub records: Vec<R>,
    pub dirty: bool,
}

impl<R> CollectionView<R> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
