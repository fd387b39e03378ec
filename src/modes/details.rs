//! Details mode: field-by-field inspector for the selected entry.

use crate::entry::LogEntry;
use crate::nav::{NavCommand, NavModel};
use crate::state::AppState;
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Default)]
pub struct DetailsMode {
    current_field: usize,
    field_count: usize,
    scroll_offset: usize,
}

impl DetailsMode {
    /// Called when the mode is entered: snapshot the selected entry's
    /// field count and reset the cursor.
    pub fn enter(&mut self, state: &AppState) {
        self.reset_view();
        self.field_count = state
            .filtered_entry(state.current_row())
            .map(|e| Self::fields(e).len())
            .unwrap_or(0);
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &mut AppState, nav: &mut NavModel) {
        match key.code {
            KeyCode::Up => {
                self.current_field = self.current_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.current_field + 1 < self.field_count {
                    self.current_field += 1;
                }
            }
            KeyCode::Left => {
                nav.handle(NavCommand::Up, state);
                self.enter(state);
            }
            KeyCode::Right => {
                nav.handle(NavCommand::Down, state);
                self.enter(state);
            }
            _ => {}
        }
    }

    pub fn current_field(&self) -> usize {
        self.current_field
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Keep the field cursor valid and visible within `available`
    /// display rows. Called by the renderer, which knows the height.
    pub fn clamp_view(&mut self, field_count: usize, available: usize) {
        self.field_count = field_count;
        if self.current_field >= field_count {
            self.current_field = field_count.saturating_sub(1);
        }
        let available = available.max(1);
        if self.current_field < self.scroll_offset {
            self.scroll_offset = self.current_field;
        } else if self.current_field >= self.scroll_offset + available {
            self.scroll_offset = self.current_field - available + 1;
        }
        let max_scroll = field_count.saturating_sub(available);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    /// The (name, value) pairs shown for an entry: sorted field names
    /// for JSON entries, the raw line as `message` otherwise.
    pub fn fields(entry: &LogEntry) -> Vec<(String, String)> {
        if entry.is_valid_json() {
            let mut names: Vec<&String> = entry.fields().keys().collect();
            names.sort();
            names
                .into_iter()
                .map(|name| (name.clone(), entry.value_text(name)))
                .collect()
        } else {
            vec![("message".to_string(), entry.raw().to_string())]
        }
    }

    fn reset_view(&mut self) {
        self.current_field = 0;
        self.scroll_offset = 0;
    }
}
