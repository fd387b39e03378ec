//! Browse mode: single-key table commands plus the shared text-input
//! sub-mode used by the search, filter and goto prompts.

use crate::nav::{NavCommand, NavModel};
use crate::state::{AppState, InputKind};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;

const MIN_COLUMN_WIDTH: usize = 5;
const MAX_COLUMN_WIDTH: usize = 100;
const WIDTH_STEP: usize = 5;

/// Follow-up work a key press asks the controller to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    None,
    /// Recompute the projection (line-preserving reposition).
    ApplyFilters,
    /// Re-read the source, then recompute.
    LoadEntries,
    /// Full reset: filters, sort, source position.
    Reset,
    /// Recompute, then jump to this 1-based line number.
    Goto(usize),
}

#[derive(Default)]
pub struct BrowseMode;

impl BrowseMode {
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        state: &mut AppState,
        nav: &mut NavModel,
    ) -> BrowseAction {
        if state.input_mode().is_some() {
            return self.handle_input_submode(key, state);
        }

        match key.code {
            KeyCode::Char('/') => {
                let snapshot = state.search_term().to_string();
                state.set_input_mode(Some(InputKind::Search));
                state.set_input_cursor(snapshot.len());
                state.set_input_buffer(snapshot);
            }
            KeyCode::Char('f') => {
                let column = current_column(state);
                if let Some(column) = column {
                    let snapshot = state.filters().get(&column).cloned().unwrap_or_default();
                    state.set_input_mode(Some(InputKind::Filter));
                    state.set_input_column(Some(column));
                    state.set_input_cursor(snapshot.len());
                    state.set_input_buffer(snapshot);
                }
            }
            KeyCode::Char('g') => {
                state.set_input_mode(Some(InputKind::Goto));
                state.set_input_buffer("");
                state.set_input_cursor(0);
            }
            KeyCode::Char('c') => {
                state.clear_filters();
                state.set_search_term("");
                return BrowseAction::ApplyFilters;
            }
            KeyCode::Char('s') => {
                if let Some(column) = current_column(state) {
                    if state.sort_column() == column {
                        let flipped = !state.sort_reverse();
                        state.set_sort_reverse(flipped);
                    } else {
                        state.set_sort_column(column);
                        state.set_sort_reverse(false);
                    }
                    return BrowseAction::ApplyFilters;
                }
            }
            KeyCode::Char('S') => {
                if let Some(column) = current_column(state) {
                    state.set_sort_column(column);
                    state.set_sort_reverse(true);
                    return BrowseAction::ApplyFilters;
                }
            }
            KeyCode::Char('<') => move_current_column(state, false),
            KeyCode::Char('>') => move_current_column(state, true),
            KeyCode::Char('w') => adjust_column_width(state, -(WIDTH_STEP as isize)),
            KeyCode::Char('W') => adjust_column_width(state, WIDTH_STEP as isize),
            KeyCode::Char('F') => {
                let follow = !state.follow_mode();
                state.set_follow_mode(follow);
            }
            KeyCode::Char('r') => return BrowseAction::LoadEntries,
            KeyCode::Char('R') => return BrowseAction::Reset,
            _ => {
                if let Some(command) = nav_command(key.code) {
                    nav.handle(command, state);
                }
            }
        }

        BrowseAction::None
    }

    fn handle_input_submode(&mut self, key: KeyEvent, state: &mut AppState) -> BrowseAction {
        match key.code {
            KeyCode::Enter => {
                let action = self.commit_input(state);
                close_input(state);
                action
            }
            KeyCode::Esc => {
                close_input(state);
                BrowseAction::None
            }
            KeyCode::Backspace => {
                let cursor = state.input_cursor();
                if cursor > 0 {
                    let mut buffer = state.input_buffer().to_string();
                    buffer.remove(cursor - 1);
                    state.set_input_buffer(buffer);
                    state.set_input_cursor(cursor - 1);
                }
                BrowseAction::None
            }
            KeyCode::Delete => {
                let cursor = state.input_cursor();
                let mut buffer = state.input_buffer().to_string();
                if cursor < buffer.len() {
                    buffer.remove(cursor);
                    state.set_input_buffer(buffer);
                }
                BrowseAction::None
            }
            KeyCode::Left => {
                let cursor = state.input_cursor();
                state.set_input_cursor(cursor.saturating_sub(1));
                BrowseAction::None
            }
            KeyCode::Right => {
                let cursor = state.input_cursor();
                state.set_input_cursor((cursor + 1).min(state.input_buffer().len()));
                BrowseAction::None
            }
            KeyCode::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
                let cursor = state.input_cursor();
                let mut buffer = state.input_buffer().to_string();
                buffer.insert(cursor, c);
                state.set_input_buffer(buffer);
                state.set_input_cursor(cursor + 1);
                BrowseAction::None
            }
            _ => BrowseAction::None,
        }
    }

    fn commit_input(&mut self, state: &mut AppState) -> BrowseAction {
        match state.input_mode() {
            Some(InputKind::Search) => {
                let term = state.input_buffer().to_string();
                state.set_search_term(term);
                BrowseAction::ApplyFilters
            }
            Some(InputKind::Filter) => {
                if let Some(column) = state.input_column().map(str::to_string) {
                    let value = state.input_buffer().to_string();
                    state.update_filters(HashMap::from([(column, value)]));
                }
                BrowseAction::ApplyFilters
            }
            Some(InputKind::Goto) => match state.input_buffer().parse::<usize>() {
                Ok(line) => BrowseAction::Goto(line),
                // Non-numeric input is ignored; the prompt still closes.
                Err(_) => BrowseAction::ApplyFilters,
            },
            None => BrowseAction::None,
        }
    }
}

fn close_input(state: &mut AppState) {
    state.set_input_mode(None);
    state.set_input_buffer("");
    state.set_input_column(None);
    state.set_input_cursor(0);
}

/// The column commands act on: the selected column when it is still
/// visible, else the first one.
fn current_column(state: &AppState) -> Option<String> {
    let columns = state.columns();
    if columns.contains(state.current_column()) {
        return Some(state.current_column().to_string());
    }
    columns.at(0).map(|c| c.name.clone())
}

fn move_current_column(state: &mut AppState, right: bool) {
    let Some(column) = current_column(state) else {
        return;
    };
    let Some(index) = state.columns().index_of(&column) else {
        return;
    };
    let target = if right {
        index + 1
    } else {
        match index.checked_sub(1) {
            Some(t) => t,
            None => return,
        }
    };
    if target < state.columns().len() {
        state.move_column(index, target);
        state.set_current_column(column);
    }
}

fn adjust_column_width(state: &mut AppState, delta: isize) {
    let Some(column) = current_column(state) else {
        return;
    };
    let Some(current) = state.columns().get(&column).map(|c| c.width) else {
        return;
    };
    let new_width = (current as isize + delta).clamp(MIN_COLUMN_WIDTH as isize, MAX_COLUMN_WIDTH as isize);
    state.set_column_width(&column, new_width as usize);
}

fn nav_command(code: KeyCode) -> Option<NavCommand> {
    match code {
        KeyCode::Up => Some(NavCommand::Up),
        KeyCode::Down => Some(NavCommand::Down),
        KeyCode::PageUp => Some(NavCommand::PageUp),
        KeyCode::PageDown => Some(NavCommand::PageDown),
        KeyCode::Home => Some(NavCommand::Home),
        KeyCode::End => Some(NavCommand::End),
        KeyCode::Left => Some(NavCommand::Left),
        KeyCode::Right => Some(NavCommand::Right),
        _ => None,
    }
}
