//! Filter/sort pipeline: combined filter+search predicate, type-aware
//! stable sorting, and the running column-type merge.

use crate::entry::{FieldKind, LogEntry};
use std::collections::HashMap;

/// Running merge of each column's native type across every entry seen.
///
/// The first observation sets the type; any later disagreement
/// collapses the column to `Str` permanently.
pub struct ColumnTypes {
    kinds: HashMap<String, FieldKind>,
}

impl Default for ColumnTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnTypes {
    pub fn new() -> Self {
        let mut kinds = HashMap::new();
        kinds.insert("#".to_string(), FieldKind::Int);
        Self { kinds }
    }

    pub fn observe(&mut self, entry: &LogEntry) {
        for (name, kind) in entry.field_kinds() {
            match self.kinds.get(name).copied() {
                None => {
                    self.kinds.insert(name.to_string(), kind);
                }
                Some(known) if known != kind => {
                    self.kinds.insert(name.to_string(), FieldKind::Str);
                }
                Some(_) => {}
            }
        }
    }

    /// Merged type for a column; unseen columns compare as text.
    pub fn kind(&self, column: &str) -> FieldKind {
        self.kinds.get(column).copied().unwrap_or(FieldKind::Str)
    }

    pub fn reset(&mut self) {
        self.kinds.clear();
        self.kinds.insert("#".to_string(), FieldKind::Int);
    }
}

/// Compute the filtered projection: indices into `entries` of every
/// entry passing filters AND search, in original order, then stably
/// sorted by `sort_column` (empty = no sort). `sort_reverse` flips the
/// comparator, keeping ties in original order either way.
pub fn apply_filters(
    entries: &[LogEntry],
    filters: &HashMap<String, String>,
    search_term: &str,
    sort_column: &str,
    sort_reverse: bool,
    types: &ColumnTypes,
) -> Vec<usize> {
    let mut filtered: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.matches_filters(filters) && e.matches_search(search_term))
        .map(|(i, _)| i)
        .collect();

    if !sort_column.is_empty() {
        let kind = types.kind(sort_column);
        let mut keyed: Vec<(crate::entry::SortKey, usize)> = filtered
            .into_iter()
            .map(|i| (entries[i].sort_key(sort_column, kind), i))
            .collect();
        keyed.sort_by(|(ka, _), (kb, _)| if sort_reverse { kb.cmp(ka) } else { ka.cmp(kb) });
        filtered = keyed.into_iter().map(|(_, i)| i).collect();
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(lines: &[&str]) -> Vec<LogEntry> {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| LogEntry::parse(l, i + 1))
            .collect()
    }

    fn types_for(entries: &[LogEntry]) -> ColumnTypes {
        let mut types = ColumnTypes::new();
        for entry in entries {
            types.observe(entry);
        }
        types
    }

    #[test]
    fn test_no_filters_no_sort_keeps_original_order() {
        let entries = parse_all(&[r#"{"a":1}"#, r#"{"a":2}"#]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "", "", false, &types);
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_filter_and_search_are_conjunctive() {
        let entries = parse_all(&[
            r#"{"level":"error","message":"disk full"}"#,
            r#"{"level":"error","message":"net down"}"#,
            r#"{"level":"info","message":"disk ok"}"#,
        ]);
        let types = types_for(&entries);
        let filters = HashMap::from([("level".to_string(), "error".to_string())]);

        let out = apply_filters(&entries, &filters, "disk", "", false, &types);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_default_line_number_sort_reverse() {
        let entries = parse_all(&[r#"{"a":1}"#, r#"{"a":2}"#, r#"{"a":3}"#]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "", "#", true, &types);
        assert_eq!(out, vec![2, 1, 0]);
    }

    #[test]
    fn test_numeric_sort_uses_numbers_not_text() {
        let entries = parse_all(&[r#"{"n":10}"#, r#"{"n":9}"#, r#"{"n":100}"#]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "", "n", false, &types);
        // 9 < 10 < 100 numerically; "10" < "100" < "9" would be the string order.
        assert_eq!(out, vec![1, 0, 2]);
    }

    #[test]
    fn test_missing_numeric_field_sorts_first() {
        let entries = parse_all(&[r#"{"n":5}"#, r#"{"other":1}"#, r#"{"n":1}"#]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "", "n", false, &types);
        assert_eq!(out, vec![1, 2, 0]);
    }

    #[test]
    fn test_type_conflict_collapses_to_string() {
        let entries = parse_all(&[r#"{"v":2}"#, r#"{"v":"10"}"#, r#"{"v":1}"#]);
        let types = types_for(&entries);
        assert_eq!(types.kind("v"), FieldKind::Str);

        let out = apply_filters(&entries, &HashMap::new(), "", "v", false, &types);
        // String order: "1" < "10" < "2".
        assert_eq!(out, vec![2, 1, 0]);
    }

    #[test]
    fn test_type_merge_missing_renders_blank_not_neg_inf() {
        let entries = parse_all(&[r#"{"v":2}"#, r#"{"v":"x"}"#, r#"{"w":1}"#]);
        let types = types_for(&entries);
        assert_eq!(types.kind("v"), FieldKind::Str);
        let key = entries[2].sort_key("v", types.kind("v"));
        assert_eq!(key, crate::entry::SortKey::Text(String::new()));
    }

    #[test]
    fn test_stable_sort_keeps_ties_in_original_order_both_directions() {
        let entries = parse_all(&[
            r#"{"level":"info","id":1}"#,
            r#"{"level":"error","id":2}"#,
            r#"{"level":"info","id":3}"#,
        ]);
        let types = types_for(&entries);

        let asc = apply_filters(&entries, &HashMap::new(), "", "level", false, &types);
        assert_eq!(asc, vec![1, 0, 2]);

        let desc = apply_filters(&entries, &HashMap::new(), "", "level", true, &types);
        assert_eq!(desc, vec![0, 2, 1]);
    }

    #[test]
    fn test_search_matches_raw_line_of_plain_entries() {
        let entries = parse_all(&["a plain warning line", r#"{"message":"quiet"}"#]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "WARNING", "", false, &types);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_types_reset_reseeds_line_number() {
        let mut types = ColumnTypes::new();
        types.observe(&LogEntry::parse(r#"{"v":1}"#, 1));
        types.reset();
        assert_eq!(types.kind("#"), FieldKind::Int);
        assert_eq!(types.kind("v"), FieldKind::Str);
    }

    #[test]
    fn test_sort_timestamp_blanks_after_instants() {
        let entries = parse_all(&[
            r#"{"message":"no ts"}"#,
            r#"{"timestamp":"2023-06-01T12:00:00"}"#,
            r#"{"timestamp":"2023-01-01T00:00:00"}"#,
        ]);
        let types = types_for(&entries);
        let out = apply_filters(&entries, &HashMap::new(), "", "timestamp", false, &types);
        assert_eq!(out, vec![2, 1, 0]);
    }
}
