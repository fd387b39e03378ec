//! Column management: two panes (available/selected) plus the
//! OK/Cancel/Reset buttons. A column is "armed" with Enter, after
//! which it can be moved between panes or reordered in place.

use crate::state::AppState;
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Available,
    Selected,
    Buttons,
}

/// What the controller should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageOutcome {
    /// Stay on the screen.
    Stay,
    /// Leave without applying.
    Close,
    /// Apply the selected set as the new visible columns, then leave.
    Commit,
}

const BUTTONS: [&str; 3] = ["OK", "Cancel", "Reset"];

pub struct ManageMode {
    pub focus: PaneFocus,
    pub available_cursor: usize,
    pub selected_cursor: usize,
    pub button_cursor: usize,
    /// Column pending movement, if any.
    pub armed: Option<String>,
    pub available: Vec<String>,
    pub selected: Vec<String>,
}

impl Default for ManageMode {
    fn default() -> Self {
        Self {
            focus: PaneFocus::Available,
            available_cursor: 0,
            selected_cursor: 0,
            button_cursor: 0,
            armed: None,
            available: Vec::new(),
            selected: Vec::new(),
        }
    }
}

impl ManageMode {
    /// Called when the screen opens: visible columns become the
    /// selected pane, every other discovered column the available pane.
    pub fn enter(&mut self, state: &AppState) {
        self.selected = state.columns().names().map(str::to_string).collect();
        self.available = state
            .all_discovered_columns()
            .iter()
            .filter(|name| !self.selected.contains(name))
            .cloned()
            .collect();
        self.available.sort();

        self.focus = PaneFocus::Available;
        self.available_cursor = 0;
        self.selected_cursor = 0;
        self.button_cursor = 0;
        self.armed = None;
    }

    /// Merge columns discovered while the screen is open into the
    /// available pane.
    pub fn sync_discovered(&mut self, state: &AppState) {
        self.available = state
            .all_discovered_columns()
            .iter()
            .filter(|name| !self.selected.contains(name))
            .cloned()
            .collect();
        self.available.sort();
        if !self.available.is_empty() {
            self.available_cursor = self.available_cursor.min(self.available.len() - 1);
        }
    }

    pub fn button_labels(&self) -> &'static [&'static str] {
        &BUTTONS
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> ManageOutcome {
        match key.code {
            KeyCode::Esc => return ManageOutcome::Close,
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Enter => return self.handle_enter(state),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left => self.move_focus_left(),
            KeyCode::Right => self.move_focus_right(),
            _ => {}
        }
        ManageOutcome::Stay
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            PaneFocus::Available => PaneFocus::Selected,
            PaneFocus::Selected => PaneFocus::Buttons,
            PaneFocus::Buttons => PaneFocus::Available,
        };
    }

    fn handle_enter(&mut self, state: &mut AppState) -> ManageOutcome {
        match self.focus {
            PaneFocus::Available => {
                self.arm_or_move(true);
                ManageOutcome::Stay
            }
            PaneFocus::Selected => {
                self.arm_or_move(false);
                ManageOutcome::Stay
            }
            PaneFocus::Buttons => match self.button_cursor {
                0 => {
                    let names = self.selected.clone();
                    state.set_columns_from_names(&names);
                    ManageOutcome::Commit
                }
                1 => ManageOutcome::Close,
                _ => {
                    self.selected = state.default_sorted_columns();
                    self.available.clear();
                    self.selected_cursor = 0;
                    self.available_cursor = 0;
                    self.armed = None;
                    ManageOutcome::Stay
                }
            },
        }
    }

    /// First Enter arms the column under the cursor; a second Enter on
    /// the same column moves it to the end of the other pane.
    fn arm_or_move(&mut self, from_available: bool) {
        let items = if from_available {
            &self.available
        } else {
            &self.selected
        };
        let cursor = if from_available {
            self.available_cursor
        } else {
            self.selected_cursor
        };
        let Some(column) = items.get(cursor).cloned() else {
            return;
        };

        if self.armed.as_deref() == Some(column.as_str()) {
            if from_available {
                self.move_to_selected();
            } else {
                self.move_to_available();
            }
            self.armed = None;
        } else {
            self.armed = Some(column);
        }
    }

    fn move_focus_left(&mut self) {
        if self.armed.is_some() {
            self.move_to_available();
            return;
        }
        self.focus = match self.focus {
            PaneFocus::Selected => PaneFocus::Available,
            PaneFocus::Buttons => PaneFocus::Selected,
            other => other,
        };
    }

    fn move_focus_right(&mut self) {
        if self.armed.is_some() {
            self.move_to_selected();
            return;
        }
        self.focus = match self.focus {
            PaneFocus::Available => PaneFocus::Selected,
            PaneFocus::Selected => PaneFocus::Buttons,
            other => other,
        };
    }

    /// Move the armed column into the available pane (kept sorted).
    fn move_to_available(&mut self) {
        let Some(column) = self.armed.clone() else {
            return;
        };
        if let Some(index) = self.selected.iter().position(|c| *c == column) {
            self.selected.remove(index);
            self.available.push(column.clone());
            self.available.sort();

            self.focus = PaneFocus::Available;
            self.available_cursor = self
                .available
                .iter()
                .position(|c| *c == column)
                .unwrap_or(0);
            if self.selected_cursor >= self.selected.len() && !self.selected.is_empty() {
                self.selected_cursor = self.selected.len() - 1;
            }
        }
    }

    /// Move the armed column to the end of the selected pane.
    fn move_to_selected(&mut self) {
        let Some(column) = self.armed.clone() else {
            return;
        };
        if let Some(index) = self.available.iter().position(|c| *c == column) {
            self.available.remove(index);
            self.selected.push(column);

            self.focus = PaneFocus::Selected;
            self.selected_cursor = self.selected.len() - 1;
            if self.available_cursor >= self.available.len() && !self.available.is_empty() {
                self.available_cursor = self.available.len() - 1;
            }
        }
    }

    /// Move the pane cursor, or reorder the armed column within its
    /// pane.
    fn move_selection(&mut self, delta: isize) {
        if self.armed.is_some() {
            self.reorder_armed(delta);
            return;
        }
        match self.focus {
            PaneFocus::Available => {
                self.available_cursor = step(self.available_cursor, delta, self.available.len());
            }
            PaneFocus::Selected => {
                self.selected_cursor = step(self.selected_cursor, delta, self.selected.len());
            }
            PaneFocus::Buttons => {
                self.button_cursor = step(self.button_cursor, delta, BUTTONS.len());
            }
        }
    }

    fn reorder_armed(&mut self, delta: isize) {
        let Some(column) = self.armed.clone() else {
            return;
        };
        if let Some(index) = self.available.iter().position(|c| *c == column) {
            let target = step(index, delta, self.available.len());
            if target != index {
                let item = self.available.remove(index);
                self.available.insert(target, item);
                self.available_cursor = target;
            }
        } else if let Some(index) = self.selected.iter().position(|c| *c == column) {
            let target = step(index, delta, self.selected.len());
            if target != index {
                let item = self.selected.remove(index);
                self.selected.insert(target, item);
                self.selected_cursor = target;
            }
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogEntry;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (AppState, ManageMode) {
        let mut state = AppState::new();
        state.set_terminal_size((120, 40));
        let entries = vec![LogEntry::parse(
            r#"{"level":"info","message":"m","extra":"x"}"#,
            1,
        )];
        state.extend_entries(entries);
        state.set_filtered(vec![0]);
        // Show only two columns so "extra" and "message" land in the
        // available pane.
        state.set_columns_from_names(&["#".to_string(), "level".to_string()]);

        let mut manage = ManageMode::default();
        manage.enter(&state);
        (state, manage)
    }

    #[test]
    fn test_enter_splits_panes() {
        let (_, manage) = setup();
        assert_eq!(manage.selected, vec!["#", "level"]);
        assert_eq!(manage.available, vec!["extra", "message"]);
        assert_eq!(manage.focus, PaneFocus::Available);
        assert!(manage.armed.is_none());
    }

    #[test]
    fn test_tab_cycles_focus() {
        let (mut state, mut manage) = setup();
        manage.handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(manage.focus, PaneFocus::Selected);
        manage.handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(manage.focus, PaneFocus::Buttons);
        manage.handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(manage.focus, PaneFocus::Available);
    }

    #[test]
    fn test_double_enter_moves_column_to_other_pane() {
        let (mut state, mut manage) = setup();

        manage.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(manage.armed.as_deref(), Some("extra"));

        manage.handle_key(key(KeyCode::Enter), &mut state);
        assert!(manage.armed.is_none());
        assert_eq!(manage.selected, vec!["#", "level", "extra"]);
        assert_eq!(manage.available, vec!["message"]);
        assert_eq!(manage.focus, PaneFocus::Selected);
    }

    #[test]
    fn test_armed_arrow_moves_across_panes() {
        let (mut state, mut manage) = setup();
        manage.handle_key(key(KeyCode::Enter), &mut state); // arm "extra"

        manage.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(manage.selected.last().map(String::as_str), Some("extra"));
        assert_eq!(manage.focus, PaneFocus::Selected);

        // Still armed: bounce it back, available pane stays sorted.
        manage.handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(manage.available, vec!["extra", "message"]);
        assert_eq!(manage.focus, PaneFocus::Available);
        assert_eq!(manage.available_cursor, 0);
    }

    #[test]
    fn test_armed_up_down_reorders_within_pane() {
        let (mut state, mut manage) = setup();
        manage.focus = PaneFocus::Selected;
        manage.selected_cursor = 1; // "level"
        manage.handle_key(key(KeyCode::Enter), &mut state); // arm

        manage.handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(manage.selected, vec!["level", "#"]);
        assert_eq!(manage.selected_cursor, 0);

        manage.handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(manage.selected, vec!["level", "#"]);
    }

    #[test]
    fn test_cursor_movement_clamped() {
        let (mut state, mut manage) = setup();
        manage.handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(manage.available_cursor, 0);
        manage.handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(manage.available_cursor, 1);
        manage.handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(manage.available_cursor, 1);
    }

    #[test]
    fn test_ok_commits_selected_columns() {
        let (mut state, mut manage) = setup();
        manage.focus = PaneFocus::Buttons;
        manage.button_cursor = 0;

        let outcome = manage.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(outcome, ManageOutcome::Commit);
        let names: Vec<&str> = state.columns().names().collect();
        assert_eq!(names, vec!["#", "level"]);
    }

    #[test]
    fn test_cancel_discards() {
        let (mut state, mut manage) = setup();
        manage.focus = PaneFocus::Selected;
        manage.selected_cursor = 1;
        manage.handle_key(key(KeyCode::Enter), &mut state);
        manage.handle_key(key(KeyCode::Enter), &mut state); // move "level" out

        manage.focus = PaneFocus::Buttons;
        manage.button_cursor = 1;
        let outcome = manage.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(outcome, ManageOutcome::Close);
        // State untouched.
        let names: Vec<&str> = state.columns().names().collect();
        assert_eq!(names, vec!["#", "level"]);
    }

    #[test]
    fn test_reset_repopulates_default_order() {
        let (mut state, mut manage) = setup();
        manage.focus = PaneFocus::Buttons;
        manage.button_cursor = 2;

        let outcome = manage.handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(outcome, ManageOutcome::Stay);
        assert!(manage.available.is_empty());
        assert_eq!(manage.selected[0], "#");
        assert!(manage.selected.contains(&"extra".to_string()));
        assert!(manage.selected.contains(&"message".to_string()));
    }

    #[test]
    fn test_esc_closes() {
        let (mut state, mut manage) = setup();
        let outcome = manage.handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(outcome, ManageOutcome::Close);
    }

    #[test]
    fn test_sync_discovered_adds_new_columns() {
        let (mut state, mut manage) = setup();
        // A new field shows up while the screen is open.
        let entry = LogEntry::parse(r#"{"brand_new":"y"}"#, 2);
        state.extend_entries(vec![entry]);
        state.set_filtered(vec![0, 1]);

        manage.sync_discovered(&state);
        assert!(manage.available.contains(&"brand_new".to_string()));
    }
}
