// Local search - incremental substring filter over rows or log lines

use super::tab::Row;

/// What the search was started on, decided by focus at activation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// The focused tab's row set.
    Resource,
    /// The inspector's raw-lines content (Logs sub-tab).
    Logs,
}

/// Incremental filter state. The pristine snapshot is always the filter
/// input so repeated typing stays idempotent; the live set is only ever
/// a filtered copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub is_enabled: bool,
    /// Typing (input focused) vs committed (filtered view focused).
    pub is_pending: bool,
    pub query: String,
    pub started_on: Option<SearchTarget>,
    pub previous_rows: Vec<Row>,
    pub previous_lines: Vec<String>,
}

impl SearchState {
    pub fn activate_on_rows(&mut self, snapshot: Vec<Row>) {
        *self = SearchState {
            is_enabled: true,
            is_pending: true,
            started_on: Some(SearchTarget::Resource),
            previous_rows: snapshot,
            ..SearchState::default()
        };
    }

    pub fn activate_on_lines(&mut self, snapshot: Vec<String>) {
        *self = SearchState {
            is_enabled: true,
            is_pending: true,
            started_on: Some(SearchTarget::Logs),
            previous_lines: snapshot,
            ..SearchState::default()
        };
    }

    /// Fresh server data arrived for the searched target: replace the
    /// snapshot so the filter re-applies non-destructively.
    pub fn resnapshot_rows(&mut self, snapshot: Vec<Row>) {
        self.previous_rows = snapshot;
    }

    pub fn resnapshot_lines(&mut self, snapshot: Vec<String>) {
        self.previous_lines = snapshot;
    }

    /// Current filtered row set. An empty query restores the snapshot
    /// verbatim.
    pub fn filtered_rows(&self) -> Vec<Row> {
        filter_rows(&self.previous_rows, &self.query)
    }

    pub fn filtered_lines(&self) -> Vec<String> {
        filter_lines(&self.previous_lines, &self.query)
    }

    pub fn clear(&mut self) {
        *self = SearchState::default();
    }
}

/// Case-insensitive substring match over each row's joined cell values.
pub fn filter_rows(snapshot: &[Row], query: &str) -> Vec<Row> {
    if query.is_empty() {
        return snapshot.to_vec();
    }
    let needle = query.to_lowercase();
    snapshot
        .iter()
        .filter(|row| row.joined_values().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn filter_lines(snapshot: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return snapshot.to_vec();
    }
    let needle = query.to_lowercase();
    snapshot
        .iter()
        .filter(|line| line.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
