//! LogEntry — one parsed input line.
//!
//! Lines are decoded as JSON objects; anything else degrades to a
//! single `message` field so malformed input never stops the viewer.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field names probed for a timestamp, in priority order.
const TIMESTAMP_FIELDS: [&str; 5] = ["timestamp", "time", "@timestamp", "datetime", "date"];

/// Formats tried against a timestamp candidate (trailing `Z` stripped first).
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Native type of a JSON field value, used to merge column types across entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Object,
    Array,
}

impl FieldKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => FieldKind::Null,
            Value::Bool(_) => FieldKind::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    FieldKind::Int
                } else {
                    FieldKind::Float
                }
            }
            Value::String(_) => FieldKind::Str,
            Value::Object(_) => FieldKind::Object,
            Value::Array(_) => FieldKind::Array,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Int | FieldKind::Float)
    }
}

/// Comparison key extracted from an entry for a sorted column.
///
/// Ordered by rank (numbers, then timestamps, then text) so mixed
/// columns still have a total order; entries without a parsed
/// timestamp sort as blank text after all parsed instants.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Time(NaiveDateTime),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Time(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

impl Eq for SortKey {}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A single parsed log line. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct LogEntry {
    raw: String,
    line_number: usize,
    fields: Map<String, Value>,
    valid_json: bool,
    timestamp: Option<NaiveDateTime>,
    level: Option<String>,
}

impl LogEntry {
    /// Parse one raw line. `line_number` is 1-based and monotonic per source.
    pub fn parse(raw_line: &str, line_number: usize) -> Self {
        let raw = raw_line.trim().to_string();

        let (fields, valid_json) = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => (map, true),
            _ => {
                let mut map = Map::new();
                map.insert("message".to_string(), Value::String(raw.clone()));
                (map, false)
            }
        };

        let timestamp = extract_timestamp(&fields);
        let level = fields.get("level").map(value_to_text);

        Self {
            raw,
            line_number,
            fields,
            valid_json,
            timestamp,
            level,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_valid_json(&self) -> bool {
        self.valid_json
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }

    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    /// Native type of every field on this entry.
    pub fn field_kinds(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), FieldKind::of(v)))
    }

    /// String form of a field for display. `"#"` resolves to the line
    /// number; a missing field renders as the empty string.
    pub fn value_text(&self, key: &str) -> String {
        if key == "#" {
            return self.line_number.to_string();
        }
        match self.fields.get(key) {
            Some(value) => value_to_text(value),
            None => String::new(),
        }
    }

    /// True when every non-empty filter value is a case-insensitive
    /// substring of the corresponding field's string form.
    pub fn matches_filters(&self, filters: &HashMap<String, String>) -> bool {
        for (column, wanted) in filters {
            if wanted.is_empty() {
                continue;
            }
            let value = self.value_text(column).to_lowercase();
            if !value.contains(&wanted.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// True when the search term appears in any field value or in the raw line.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        for value in self.fields.values() {
            if value_to_text(value).to_lowercase().contains(&needle) {
                return true;
            }
        }
        self.raw.to_lowercase().contains(&needle)
    }

    /// Comparison key for sorting by `column`, given the merged type of
    /// that column across all entries seen so far.
    pub fn sort_key(&self, column: &str, kind: FieldKind) -> SortKey {
        if column == "#" {
            return SortKey::Number(self.line_number as f64);
        }
        if column == "timestamp" {
            return match self.timestamp {
                Some(ts) => SortKey::Time(ts),
                None => SortKey::Text(String::new()),
            };
        }
        if kind == FieldKind::Null {
            return SortKey::Text("null".to_string());
        }
        match self.fields.get(column) {
            None => {
                if kind.is_numeric() {
                    SortKey::Number(f64::NEG_INFINITY)
                } else {
                    SortKey::Text(String::new())
                }
            }
            Some(value) => {
                if kind.is_numeric() {
                    match value.as_f64() {
                        Some(n) => SortKey::Number(n),
                        None => SortKey::Text(value_to_text(value)),
                    }
                } else {
                    SortKey::Text(value_to_text(value))
                }
            }
        }
    }
}

/// JSON-native string form of a value: strings render bare, nested
/// structures as compact JSON.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn extract_timestamp(fields: &Map<String, Value>) -> Option<NaiveDateTime> {
    for name in TIMESTAMP_FIELDS {
        if let Some(value) = fields.get(name) {
            let text = value_to_text(value);
            let text = text.strip_suffix('Z').unwrap_or(&text);
            for format in TIMESTAMP_FORMATS {
                if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
                    return Some(ts);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let entry = LogEntry::parse(r#"{"level":"info","message":"started"}"#, 1);
        assert!(entry.is_valid_json());
        assert_eq!(entry.level(), Some("info"));
        assert_eq!(entry.value_text("message"), "started");
    }

    #[test]
    fn test_parse_non_json_falls_back_to_message() {
        let entry = LogEntry::parse("plain text line", 3);
        assert!(!entry.is_valid_json());
        assert_eq!(entry.value_text("message"), "plain text line");
        assert_eq!(entry.line_number(), 3);
    }

    #[test]
    fn test_parse_json_array_falls_back() {
        let entry = LogEntry::parse(r#"[1, 2, 3]"#, 1);
        assert!(!entry.is_valid_json());
        assert_eq!(entry.value_text("message"), "[1, 2, 3]");
    }

    #[test]
    fn test_parse_trims_input() {
        let entry = LogEntry::parse("  hello  \n", 1);
        assert_eq!(entry.raw(), "hello");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let a = LogEntry::parse(r#"{"a":1,"b":"x"}"#, 7);
        let b = LogEntry::parse(r#"{"a":1,"b":"x"}"#, 7);
        assert_eq!(a.fields(), b.fields());
        assert_eq!(a.is_valid_json(), b.is_valid_json());
    }

    #[test]
    fn test_timestamp_iso_with_fraction() {
        let entry = LogEntry::parse(r#"{"timestamp":"2023-01-15T10:30:45.123456Z"}"#, 1);
        let ts = entry.timestamp().unwrap();
        assert_eq!(ts.format("%Y-%m-%dT%H:%M:%S").to_string(), "2023-01-15T10:30:45");
    }

    #[test]
    fn test_timestamp_space_separated() {
        let entry = LogEntry::parse(r#"{"time":"2023-01-15 10:30:45"}"#, 1);
        assert!(entry.timestamp().is_some());
    }

    #[test]
    fn test_timestamp_field_priority() {
        // "timestamp" wins over "date" even when both parse.
        let entry = LogEntry::parse(
            r#"{"date":"2020-01-01T00:00:00","timestamp":"2023-06-01T12:00:00"}"#,
            1,
        );
        let ts = entry.timestamp().unwrap();
        assert_eq!(ts.format("%Y").to_string(), "2023");
    }

    #[test]
    fn test_timestamp_search_continues_past_unparseable_field() {
        let entry = LogEntry::parse(r#"{"timestamp":"not a time","time":"2023-06-01T12:00:00"}"#, 1);
        assert!(entry.timestamp().is_some());
    }

    #[test]
    fn test_timestamp_unparseable_left_unset() {
        let entry = LogEntry::parse(r#"{"timestamp":"yesterday"}"#, 1);
        assert!(entry.timestamp().is_none());
    }

    #[test]
    fn test_level_stringifies_non_strings() {
        let entry = LogEntry::parse(r#"{"level":30}"#, 1);
        assert_eq!(entry.level(), Some("30"));
        let entry = LogEntry::parse(r#"{"level":null}"#, 1);
        assert_eq!(entry.level(), Some("null"));
    }

    #[test]
    fn test_value_text_formatting() {
        let entry = LogEntry::parse(
            r#"{"n":null,"b":true,"i":5,"f":1.5,"o":{"k":1},"a":[1,2]}"#,
            12,
        );
        assert_eq!(entry.value_text("#"), "12");
        assert_eq!(entry.value_text("n"), "null");
        assert_eq!(entry.value_text("b"), "true");
        assert_eq!(entry.value_text("i"), "5");
        assert_eq!(entry.value_text("f"), "1.5");
        assert_eq!(entry.value_text("o"), r#"{"k":1}"#);
        assert_eq!(entry.value_text("a"), "[1,2]");
        assert_eq!(entry.value_text("missing"), "");
    }

    #[test]
    fn test_matches_filters_conjunction() {
        let entry = LogEntry::parse(r#"{"level":"ERROR","service":"api"}"#, 1);
        let mut filters = HashMap::new();
        filters.insert("level".to_string(), "error".to_string());
        assert!(entry.matches_filters(&filters));

        filters.insert("service".to_string(), "db".to_string());
        assert!(!entry.matches_filters(&filters));
    }

    #[test]
    fn test_matches_filters_missing_field_fails() {
        let entry = LogEntry::parse(r#"{"level":"info"}"#, 1);
        let mut filters = HashMap::new();
        filters.insert("service".to_string(), "api".to_string());
        assert!(!entry.matches_filters(&filters));
    }

    #[test]
    fn test_matches_filters_empty_value_ignored() {
        let entry = LogEntry::parse(r#"{"level":"info"}"#, 1);
        let mut filters = HashMap::new();
        filters.insert("service".to_string(), String::new());
        assert!(entry.matches_filters(&filters));
    }

    #[test]
    fn test_matches_search_fields_and_raw_line() {
        let entry = LogEntry::parse(r#"{"message":"Connection Lost"}"#, 1);
        assert!(entry.matches_search("connection"));
        assert!(entry.matches_search("message")); // appears in the raw line
        assert!(!entry.matches_search("database"));
        assert!(entry.matches_search(""));
    }

    #[test]
    fn test_sort_key_line_number() {
        let entry = LogEntry::parse("x", 42);
        assert_eq!(entry.sort_key("#", FieldKind::Int), SortKey::Number(42.0));
    }

    #[test]
    fn test_sort_key_missing_numeric_is_neg_infinity() {
        let entry = LogEntry::parse(r#"{"a":1}"#, 1);
        match entry.sort_key("count", FieldKind::Int) {
            SortKey::Number(n) => assert_eq!(n, f64::NEG_INFINITY),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_key_missing_text_is_empty() {
        let entry = LogEntry::parse(r#"{"a":1}"#, 1);
        assert_eq!(entry.sort_key("name", FieldKind::Str), SortKey::Text(String::new()));
    }

    #[test]
    fn test_sort_key_null_kind_is_literal_null() {
        let entry = LogEntry::parse(r#"{"v":null}"#, 1);
        assert_eq!(
            entry.sort_key("v", FieldKind::Null),
            SortKey::Text("null".to_string())
        );
    }

    #[test]
    fn test_sort_key_timestamp_blank_when_absent() {
        let with = LogEntry::parse(r#"{"timestamp":"2023-06-01T12:00:00"}"#, 1);
        let without = LogEntry::parse(r#"{"message":"x"}"#, 2);
        let a = with.sort_key("timestamp", FieldKind::Str);
        let b = without.sort_key("timestamp", FieldKind::Str);
        assert!(matches!(a, SortKey::Time(_)));
        assert_eq!(b, SortKey::Text(String::new()));
        // Parsed instants order before blanks.
        assert!(a < b);
    }

    #[test]
    fn test_sort_key_total_order_across_kinds() {
        let num = SortKey::Number(1e9);
        let text = SortKey::Text("a".to_string());
        assert!(num < text);
    }

    #[test]
    fn test_field_kinds_classification() {
        let entry = LogEntry::parse(
            r#"{"n":null,"b":false,"i":1,"f":2.5,"s":"x","o":{},"a":[]}"#,
            1,
        );
        let kinds: HashMap<&str, FieldKind> = entry.field_kinds().collect();
        assert_eq!(kinds["n"], FieldKind::Null);
        assert_eq!(kinds["b"], FieldKind::Bool);
        assert_eq!(kinds["i"], FieldKind::Int);
        assert_eq!(kinds["f"], FieldKind::Float);
        assert_eq!(kinds["s"], FieldKind::Str);
        assert_eq!(kinds["o"], FieldKind::Object);
        assert_eq!(kinds["a"], FieldKind::Array);
    }
}
