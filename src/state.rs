//! Change-tracked application state.
//!
//! Every externally visible mutation goes through a setter that compares
//! old and new values, records the field name in the session's change
//! set, and fires any watchers registered for that field. Watchers run
//! synchronously in registration order; they are plain `Fn()` closures
//! (typically flipping a redraw flag) and must not reach back into the
//! state that is notifying them.

use crate::columns::{self, Column, ColumnSet};
use crate::entry::LogEntry;
use crate::modes::Mode;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Tracked field names. Watcher registration and change queries use
/// these constants so typos fail at the callsite, not silently.
pub mod field {
    pub const TERMINAL_SIZE: &str = "terminal_size";
    pub const CURRENT_MODE: &str = "current_mode";
    pub const PREVIOUS_MODE: &str = "previous_mode";
    pub const FOLLOW_MODE: &str = "follow_mode";
    pub const CURRENT_ROW: &str = "current_row";
    pub const CURRENT_COLUMN: &str = "current_column";
    pub const SORT_COLUMN: &str = "sort_column";
    pub const SORT_REVERSE: &str = "sort_reverse";
    pub const INPUT_MODE: &str = "input_mode";
    pub const INPUT_COLUMN: &str = "input_column";
    pub const INPUT_BUFFER: &str = "input_buffer";
    pub const INPUT_CURSOR: &str = "input_cursor";
    pub const SEARCH_TERM: &str = "search_term";
    pub const FILTERS_COUNT: &str = "filters_count";
    pub const ENTRIES: &str = "entries";
    pub const NUM_ENTRIES: &str = "num_entries";
    pub const FILTERED_ENTRIES: &str = "filtered_entries";
    pub const COLUMNS: &str = "columns";
    pub const ALL_DISCOVERED_COLUMNS: &str = "all_discovered_columns";
}

type Watcher = Box<dyn Fn()>;

/// Per-instance change set plus watcher table.
#[derive(Default)]
pub struct ChangeTracker {
    changes: HashSet<&'static str>,
    watchers: HashMap<&'static str, Vec<Watcher>>,
}

impl ChangeTracker {
    /// Record a change and notify that field's watchers, in
    /// registration order.
    pub fn mark(&mut self, name: &'static str) {
        self.changes.insert(name);
        if let Some(list) = self.watchers.get(name) {
            for watcher in list {
                watcher();
            }
        }
    }

    pub fn register(&mut self, name: &'static str, watcher: impl Fn() + 'static) {
        self.watchers.entry(name).or_default().push(Box::new(watcher));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changes.contains(name)
    }

    /// Field names changed since the last clear.
    pub fn changes(&self) -> &HashSet<&'static str> {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

/// Active text-input prompt, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Search,
    Filter,
    Goto,
}

/// The single mutable hub read by every view-model.
pub struct AppState {
    tracker: ChangeTracker,

    terminal_size: (u16, u16),
    current_mode: Mode,
    previous_mode: Mode,
    follow_mode: bool,
    current_row: usize,
    current_column: String,
    sort_column: String,
    sort_reverse: bool,

    input_mode: Option<InputKind>,
    input_column: Option<String>,
    input_buffer: String,
    input_cursor: usize,

    search_term: String,
    filters: HashMap<String, String>,
    filters_count: usize,

    entries: Vec<LogEntry>,
    /// Indices into `entries`, in filtered + sorted display order.
    filtered: Vec<usize>,

    columns: ColumnSet,
    all_discovered: BTreeSet<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tracker: ChangeTracker::default(),
            terminal_size: (0, 0),
            current_mode: Mode::Browse,
            previous_mode: Mode::Browse,
            follow_mode: true,
            current_row: 0,
            current_column: "#".to_string(),
            sort_column: "#".to_string(),
            sort_reverse: true,
            input_mode: None,
            input_column: None,
            input_buffer: String::new(),
            input_cursor: 0,
            search_term: String::new(),
            filters: HashMap::new(),
            filters_count: 0,
            entries: Vec::new(),
            filtered: Vec::new(),
            columns: ColumnSet::new(),
            all_discovered: BTreeSet::new(),
        }
    }

    // --- Change tracking ---

    pub fn register_watcher(&mut self, name: &'static str, watcher: impl Fn() + 'static) {
        self.tracker.register(name, watcher);
    }

    pub fn changed(&self, name: &str) -> bool {
        self.tracker.contains(name)
    }

    pub fn changes(&self) -> &HashSet<&'static str> {
        self.tracker.changes()
    }

    pub fn clear_changes(&mut self) {
        self.tracker.clear();
    }

    // --- Simple tracked fields ---

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// (width, height) in cells.
    pub fn set_terminal_size(&mut self, size: (u16, u16)) {
        if self.terminal_size != size {
            self.terminal_size = size;
            self.tracker.mark(field::TERMINAL_SIZE);
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    pub fn set_current_mode(&mut self, mode: Mode) {
        if self.current_mode != mode {
            self.current_mode = mode;
            self.tracker.mark(field::CURRENT_MODE);
        }
    }

    pub fn previous_mode(&self) -> Mode {
        self.previous_mode
    }

    pub fn set_previous_mode(&mut self, mode: Mode) {
        if self.previous_mode != mode {
            self.previous_mode = mode;
            self.tracker.mark(field::PREVIOUS_MODE);
        }
    }

    pub fn follow_mode(&self) -> bool {
        self.follow_mode
    }

    pub fn set_follow_mode(&mut self, on: bool) {
        if self.follow_mode != on {
            self.follow_mode = on;
            self.tracker.mark(field::FOLLOW_MODE);
        }
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    pub fn set_current_row(&mut self, row: usize) {
        if self.current_row != row {
            self.current_row = row;
            self.tracker.mark(field::CURRENT_ROW);
        }
    }

    pub fn current_column(&self) -> &str {
        &self.current_column
    }

    pub fn set_current_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.current_column != name {
            self.current_column = name;
            self.tracker.mark(field::CURRENT_COLUMN);
        }
    }

    pub fn sort_column(&self) -> &str {
        &self.sort_column
    }

    pub fn set_sort_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.sort_column != name {
            self.sort_column = name;
            self.tracker.mark(field::SORT_COLUMN);
        }
    }

    pub fn sort_reverse(&self) -> bool {
        self.sort_reverse
    }

    pub fn set_sort_reverse(&mut self, reverse: bool) {
        if self.sort_reverse != reverse {
            self.sort_reverse = reverse;
            self.tracker.mark(field::SORT_REVERSE);
        }
    }

    // --- Input sub-mode ---

    pub fn input_mode(&self) -> Option<InputKind> {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: Option<InputKind>) {
        if self.input_mode != mode {
            self.input_mode = mode;
            self.tracker.mark(field::INPUT_MODE);
        }
    }

    pub fn input_column(&self) -> Option<&str> {
        self.input_column.as_deref()
    }

    pub fn set_input_column(&mut self, column: Option<String>) {
        if self.input_column != column {
            self.input_column = column;
            self.tracker.mark(field::INPUT_COLUMN);
        }
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn set_input_buffer(&mut self, buffer: impl Into<String>) {
        let buffer = buffer.into();
        if self.input_buffer != buffer {
            self.input_buffer = buffer;
            self.tracker.mark(field::INPUT_BUFFER);
        }
    }

    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    pub fn set_input_cursor(&mut self, cursor: usize) {
        if self.input_cursor != cursor {
            self.input_cursor = cursor;
            self.tracker.mark(field::INPUT_CURSOR);
        }
    }

    // --- Filters and search ---

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.search_term != term {
            self.search_term = term;
            self.tracker.mark(field::SEARCH_TERM);
            self.refresh_filters_count();
        }
    }

    pub fn filters(&self) -> &HashMap<String, String> {
        &self.filters
    }

    pub fn filters_count(&self) -> usize {
        self.filters_count
    }

    /// Merge (upsert) the given filters into the active set.
    pub fn update_filters(&mut self, updates: HashMap<String, String>) {
        self.filters.extend(updates);
        self.refresh_filters_count();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refresh_filters_count();
    }

    fn refresh_filters_count(&mut self) {
        let count = self.filters.len() + usize::from(!self.search_term.is_empty());
        if self.filters_count != count {
            self.filters_count = count;
            self.tracker.mark(field::FILTERS_COUNT);
        }
    }

    // --- Entries ---

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn extend_entries(&mut self, new_entries: Vec<LogEntry>) {
        if new_entries.is_empty() {
            return;
        }
        self.entries.extend(new_entries);
        self.tracker.mark(field::ENTRIES);
        self.tracker.mark(field::NUM_ENTRIES);
    }

    /// Replace the entry list wholesale. Only `reset` does this.
    pub fn set_entries(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
        self.tracker.mark(field::ENTRIES);
        self.tracker.mark(field::NUM_ENTRIES);
    }

    /// Indices into `entries()` in display order.
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub fn filtered_entry(&self, row: usize) -> Option<&LogEntry> {
        self.filtered.get(row).map(|&i| &self.entries[i])
    }

    /// Install a freshly computed projection. Re-detects columns and
    /// recomputes widths as a side effect.
    pub fn set_filtered(&mut self, filtered: Vec<usize>) {
        self.filtered = filtered;
        self.detect_columns();
        self.tracker.mark(field::FILTERED_ENTRIES);
    }

    // --- Columns ---

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn all_discovered_columns(&self) -> &BTreeSet<String> {
        &self.all_discovered
    }

    pub fn move_column(&mut self, from: usize, to: usize) {
        self.columns.move_col(from, to);
        self.tracker.mark(field::COLUMNS);
    }

    pub fn set_column_width(&mut self, name: &str, width: usize) {
        if let Some(column) = self.columns.get_mut(name) {
            column.width = width;
            self.tracker.mark(field::COLUMNS);
        }
    }

    /// Rebuild the visible set from `names`, keeping existing `Column`
    /// objects (and their manually adjusted widths) where the name
    /// survives, then recompute widths.
    pub fn set_columns_from_names(&mut self, names: &[String]) {
        let mut rebuilt = ColumnSet::new();
        for name in names {
            match self.columns.get(name) {
                Some(existing) => rebuilt.push(existing.clone()),
                None => rebuilt.push(Column::new(name.clone())),
            }
        }
        self.columns = rebuilt;
        self.recalculate_widths();
        self.tracker.mark(field::COLUMNS);
    }

    /// Every discovered column in default priority order (used by the
    /// column-management Reset button).
    pub fn default_sorted_columns(&self) -> Vec<String> {
        let counts: HashMap<String, usize> =
            self.all_discovered.iter().map(|name| (name.clone(), 1)).collect();
        columns::priority_order(&counts)
    }

    /// Re-size columns against the current terminal width and a sample
    /// of the filtered entries.
    pub fn recalculate_widths(&mut self) {
        let sample: Vec<&LogEntry> = self
            .filtered
            .iter()
            .take(100)
            .map(|&i| &self.entries[i])
            .collect();
        columns::recalculate_widths(&mut self.columns, self.terminal_size.0 as usize, &sample);
    }

    fn detect_columns(&mut self) {
        let counts = columns::count_fields(self.filtered.iter().map(|&i| &self.entries[i]));

        let before = self.all_discovered.len();
        self.all_discovered.extend(counts.keys().cloned());
        if self.all_discovered.len() != before {
            self.tracker.mark(field::ALL_DISCOVERED_COLUMNS);
        }

        self.columns = ColumnSet::from_names(columns::priority_order(&counts));
        self.recalculate_widths();
        self.tracker.mark(field::COLUMNS);
    }
}
