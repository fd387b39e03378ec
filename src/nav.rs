//! Selection and scroll management for the entries table.
//!
//! `current_row` and `current_column` live in `AppState`; this model
//! owns the scroll offset and the reconciliation that keeps the
//! selection meaningful when the filtered projection changes under it.
//!
//! Two repositioning strategies exist. The steady-state follow tick
//! uses cheap arithmetic (pin the top row in newest-first views, follow
//! the bottom in oldest-first views, shift by the growth delta
//! otherwise). Filter, sort and clear transitions use line-preserving
//! repositioning: remember the selected entry's line number, find it
//! again in the new projection, and fall back to the nearest line when
//! it was filtered out.

use crate::state::AppState;

/// Row/column movement commands, decoded from keys by the mode handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Left,
    Right,
}

pub struct NavModel {
    scroll_row: usize,
    visible_rows: usize,
    old_filtered_len: usize,
    remembered_line: Option<usize>,
}

impl Default for NavModel {
    fn default() -> Self {
        Self::new()
    }
}

impl NavModel {
    pub fn new() -> Self {
        Self {
            scroll_row: 0,
            visible_rows: 1,
            old_filtered_len: 0,
            remembered_line: None,
        }
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
    }

    /// Apply a movement command. Returns false when there is nothing to
    /// navigate.
    pub fn handle(&mut self, command: NavCommand, state: &mut AppState) -> bool {
        let len = state.filtered().len();
        if len == 0 {
            return false;
        }
        let visible = self.visible_rows;
        let row = state.current_row();

        match command {
            NavCommand::Up => state.set_current_row(row.saturating_sub(1)),
            NavCommand::Down => state.set_current_row((row + 1).min(len - 1)),
            NavCommand::PageUp => {
                state.set_current_row(row.saturating_sub(visible));
                self.scroll_row = self.scroll_row.saturating_sub(visible);
            }
            NavCommand::PageDown => {
                state.set_current_row((row + visible).min(len - 1));
                self.scroll_row = (self.scroll_row + visible).min(len.saturating_sub(visible));
            }
            NavCommand::Home => state.set_current_row(0),
            NavCommand::End => state.set_current_row(len - 1),
            NavCommand::Left => self.step_column(state, false),
            NavCommand::Right => self.step_column(state, true),
        }

        self.ensure_visible(state.current_row(), len);
        true
    }

    fn step_column(&self, state: &mut AppState, right: bool) {
        let columns = state.columns();
        if columns.is_empty() {
            return;
        }
        let index = columns.index_of(state.current_column()).unwrap_or(0);
        let index = if right {
            (index + 1).min(columns.len() - 1)
        } else {
            index.saturating_sub(1)
        };
        let name = match columns.at(index) {
            Some(column) => column.name.clone(),
            None => return,
        };
        state.set_current_column(name);
    }

    /// Select the filtered entry with exactly this 1-based line number,
    /// or the one with the maximum line number when no exact match
    /// exists. The selection is centered in the viewport. `line < 1`
    /// is a no-op.
    pub fn goto_line(&mut self, state: &mut AppState, line: usize) {
        if line < 1 || state.filtered().is_empty() {
            return;
        }

        let exact = state
            .filtered()
            .iter()
            .position(|&i| state.entries()[i].line_number() == line);
        let target = match exact {
            Some(idx) => idx,
            None => {
                match state
                    .filtered()
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, &i)| state.entries()[i].line_number())
                {
                    Some((idx, _)) => idx,
                    None => return,
                }
            }
        };

        state.set_current_row(target);
        self.scroll_row = target.saturating_sub(self.visible_rows / 2);
    }

    /// Snapshot the selected entry's line number before the projection
    /// is recomputed.
    pub fn prepare_update(&mut self, state: &AppState) {
        self.remembered_line = state
            .filtered_entry(state.current_row())
            .map(|e| e.line_number());
    }

    /// Reposition the selection after `filtered` was recomputed.
    pub fn reconcile(&mut self, state: &mut AppState, preserve_line: bool) {
        let new_len = state.filtered().len();

        if preserve_line && self.reconcile_by_line(state, new_len) {
            self.finish(state, new_len);
            return;
        }

        let old_len = self.old_filtered_len;
        let row = state.current_row();

        if state.sort_reverse() && row == 0 {
            // Newest-first view pinned to the newest entry.
        } else if !state.sort_reverse() && old_len > 0 && row == old_len - 1 {
            // Oldest-first view follows growth to the new bottom.
            state.set_current_row(new_len.saturating_sub(1));
        } else if state.sort_reverse() {
            // New rows were prepended above; keep the same logical entry.
            state.set_current_row(row + new_len.saturating_sub(old_len));
        }

        self.finish(state, new_len);
    }

    /// Find the remembered line number in the new projection, or the
    /// nearest line by distance. Returns false when no position could
    /// be derived (empty projection or nothing remembered).
    fn reconcile_by_line(&mut self, state: &mut AppState, new_len: usize) -> bool {
        let Some(line) = self.remembered_line else {
            return false;
        };
        if new_len == 0 {
            return false;
        }

        let mut best: Option<(usize, usize)> = None; // (distance, index)
        for (idx, &i) in state.filtered().iter().enumerate() {
            let candidate = state.entries()[i].line_number();
            let distance = candidate.abs_diff(line);
            if distance == 0 {
                state.set_current_row(idx);
                return true;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, idx));
            }
        }
        if let Some((_, idx)) = best {
            state.set_current_row(idx);
            return true;
        }
        false
    }

    fn finish(&mut self, state: &mut AppState, new_len: usize) {
        if state.current_row() >= new_len {
            state.set_current_row(new_len.saturating_sub(1));
        }
        self.scroll_row = self.scroll_row.min(new_len);
        self.ensure_visible(state.current_row(), new_len);
        self.old_filtered_len = new_len;
        self.remembered_line = None;
    }

    fn ensure_visible(&mut self, row: usize, len: usize) {
        if len == 0 {
            self.scroll_row = 0;
            return;
        }
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + self.visible_rows {
            self.scroll_row = row + 1 - self.visible_rows;
        }
    }

    pub fn reset(&mut self, state: &mut AppState) {
        state.set_current_row(0);
        state.set_current_column("#");
        self.scroll_row = 0;
        self.old_filtered_len = state.filtered().len();
        self.remembered_line = None;
    }
}
