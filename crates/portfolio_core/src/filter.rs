use crate::Record;

/// Category sentinel that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Active category and committed search text for a collection view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub active_category: String,
    pub query_text: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_category: ALL_CATEGORIES.to_string(),
            query_text: String::new(),
        }
    }
}

impl FilterState {
    pub fn apply<R: Record>(&self, records: &[R]) -> Vec<R> {
        derive(records, &self.active_category, &self.query_text)
    }
}

/// Derives the visible subset of `records`.
///
/// Category and text filters are conjunctive; the text filter is a
/// case-insensitive substring match over title, description and tags.
/// Source order is preserved.
pub fn derive<R: Record>(records: &[R], active_category: &str, query_text: &str) -> Vec<R> {
    let needle = query_text.to_lowercase();
    records
        .iter()
        .filter(|record| matches_category(*record, active_category))
        .filter(|record| matches_query(*record, &needle))
        .cloned()
        .collect()
}

fn matches_category<R: Record>(record: &R, active_category: &str) -> bool {
    active_category == ALL_CATEGORIES || record.category() == active_category
}

/// `needle` must already be lowercased.
fn matches_query<R: Record>(record: &R, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.title().to_lowercase().contains(needle)
        || record.description().to_lowercase().contains(needle)
        || record
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Distinct categories in first-seen order, skipping blanks.
pub fn categories<R: Record>(records: &[R]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let category = record.category();
        if !category.is_empty() && !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}
