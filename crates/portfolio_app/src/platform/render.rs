use portfolio_core::{Certificate, CollectionView, LoadSource, Record};

fn source_label(source: Option<LoadSource>, loading: bool) -> &'static str {
    match (source, loading) {
        (Some(LoadSource::Live), _) => "live",
        (Some(LoadSource::Cached), true) => "cached, refreshing",
        (Some(LoadSource::Cached), false) => "cached, offline",
        (Some(LoadSource::Fallback), true) => "sample data, refreshing",
        (Some(LoadSource::Fallback), false) => "sample data, offline",
        (None, true) => "loading",
        (None, false) => "not loaded",
    }
}

/// One-line summary of what the view is showing.
pub fn header<R>(view: &CollectionView<R>) -> String {
    let mut line = format!(
        "{} [{}] {} of {}",
        view.collection,
        source_label(view.source, view.loading),
        view.records.len(),
        view.total
    );
    line.push_str(&format!(" | category: {}", view.active_category));
    if !view.committed_query.is_empty() {
        line.push_str(&format!(" | search: {:?}", view.committed_query));
    }
    if view.query_input != view.committed_query {
        line.push_str(&format!(" (typing {:?})", view.query_input));
    }
    line
}

pub fn render<R: Record>(view: &CollectionView<R>) -> Vec<String> {
    let mut lines = vec![header(view)];
    if !view.categories.is_empty() {
        lines.push(format!("categories: all, {}", view.categories.join(", ")));
    }
    if view.is_empty() {
        lines.push(if view.total == 0 {
            "  (nothing here yet)".to_string()
        } else {
            "  (no matches)".to_string()
        });
        return lines;
    }
    for record in &view.records {
        let category = if record.category().is_empty() {
            "-"
        } else {
            record.category()
        };
        lines.push(format!("- [{}] {}", category, record.title()));
        if !record.description().is_empty() {
            lines.push(format!("    {}", record.description()));
        }
        if !record.tags().is_empty() {
            lines.push(format!("    tags: {}", record.tags().join(", ")));
        }
    }
    lines
}

/// Uploaded certificates; nothing at all when there are none.
pub fn render_certificates(view: &CollectionView<Certificate>) -> Vec<String> {
    if view.records.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Certificates ({})", source_label(view.source, view.loading))];
    for certificate in &view.records {
        lines.push(format!("- {} <{}>", certificate.title, certificate.file_url));
    }
    lines
}
