//! Column registry: the ordered set of visible columns, discovery
//! priority, and content-based width sizing.

use crate::entry::LogEntry;
use serde_json::Value;
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

/// Terminal columns reserved for the line-number column's overhead.
const LINE_NUMBER_RESERVE: usize = 20;

/// One display column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub width: usize,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 0,
        }
    }
}

/// Insertion-ordered set of columns, addressable by name and by position.
/// Iteration order is display order.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    cols: Vec<Column>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cols: names.into_iter().map(Column::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.cols.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Column> {
        self.cols.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(|c| c.name.as_str())
    }

    pub fn at(&self, index: usize) -> Option<&Column> {
        self.cols.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.cols.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.cols.iter_mut().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.cols.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Move the column at `from` to position `to`, shifting the rest.
    pub fn move_col(&mut self, from: usize, to: usize) {
        if from < self.cols.len() && to < self.cols.len() {
            let col = self.cols.remove(from);
            self.cols.insert(to, col);
        }
    }

    pub fn push(&mut self, column: Column) {
        self.cols.push(column);
    }
}

/// Priority key for display ordering: well-known columns first, then by
/// how often the field actually occurs.
pub fn priority(name: &str, count: usize) -> (u8, usize) {
    let rank = match name {
        "#" => 4,
        "timestamp" | "time" | "@timestamp" => 3,
        "level" => 2,
        "message" => 1,
        _ => 0,
    };
    (rank, count)
}

/// Order field names by descending priority. Equal (rank, count) pairs
/// order by name so detection is deterministic.
pub fn priority_order(counts: &HashMap<String, usize>) -> Vec<String> {
    let mut names: Vec<&String> = counts.keys().collect();
    names.sort_by(|a, b| {
        priority(b, counts[*b])
            .cmp(&priority(a, counts[*a]))
            .then_with(|| a.cmp(b))
    });
    names.into_iter().cloned().collect()
}

/// Truthiness over JSON values: null, false, zero and empty
/// strings/collections do not count as an occurrence.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Count truthy field occurrences across the given entries. `"#"` is
/// always present; non-JSON entries count as having `message`.
pub fn count_fields<'a, I>(entries: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    counts.insert("#".to_string(), 1);

    for entry in entries {
        if entry.is_valid_json() {
            for (name, value) in entry.fields() {
                if truthy(value) {
                    *counts.entry(name.clone()).or_insert(0) += 1;
                }
            }
        } else {
            *counts.entry("message".to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Size every column to its content, sampling at most 100 entries.
///
/// The width cap grows with the terminal but never eats the space
/// reserved for the line-number column.
pub fn recalculate_widths(columns: &mut ColumnSet, terminal_width: usize, sample: &[&LogEntry]) {
    let non_line_number = columns.len().saturating_sub(1);
    if non_line_number == 0 {
        return;
    }

    let cap = std::cmp::min(
        std::cmp::max(50, terminal_width / non_line_number),
        terminal_width.saturating_sub(LINE_NUMBER_RESERVE),
    );

    for column in columns.iter_mut() {
        let mut max_width = column.name.width();
        for entry in sample.iter().take(100) {
            max_width = max_width.max(entry.value_text(&column.name).width());
        }
        column.width = std::cmp::min(max_width + 1, cap);
    }
}
