//! App controller: composes the state container, the filter pipeline,
//! the navigation model and the mode view-models, and exposes the four
//! operations the host loop drives (`load_entries`, `apply_filters`,
//! `reset`, `update_entries`).

use crate::entry::LogEntry;
use crate::filter::{self, ColumnTypes};
use crate::input::InputSource;
use crate::modes::{BrowseAction, BrowseMode, DetailsMode, ManageMode, ManageOutcome, Mode};
use crate::nav::NavModel;
use crate::state::{field, AppState};
use crate::tui::{FOOTER_HEIGHT, HEADER_HEIGHT, TABLE_HEADER_HEIGHT};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, info};
use std::cell::Cell;
use std::rc::Rc;

/// Fields whose changes arm the header surface.
const HEADER_FIELDS: [&str; 2] = [field::CURRENT_MODE, field::TERMINAL_SIZE];

/// Fields whose changes arm the footer surface.
const FOOTER_FIELDS: [&str; 12] = [
    field::TERMINAL_SIZE,
    field::CURRENT_MODE,
    field::FOLLOW_MODE,
    field::CURRENT_ROW,
    field::SORT_COLUMN,
    field::SORT_REVERSE,
    field::FILTERS_COUNT,
    field::SEARCH_TERM,
    field::INPUT_MODE,
    field::INPUT_BUFFER,
    field::INPUT_COLUMN,
    field::INPUT_CURSOR,
];

/// Fields whose changes arm the body surface.
const BODY_FIELDS: [&str; 11] = [
    field::CURRENT_MODE,
    field::TERMINAL_SIZE,
    field::NUM_ENTRIES,
    field::CURRENT_ROW,
    field::CURRENT_COLUMN,
    field::SORT_COLUMN,
    field::SORT_REVERSE,
    field::FILTERS_COUNT,
    field::SEARCH_TERM,
    field::COLUMNS,
    field::FILTERED_ENTRIES,
];

/// Per-surface "needs redraw" flags, armed by state watchers and
/// cleared after a frame is drawn.
#[derive(Clone)]
pub struct RedrawFlags {
    pub header: Rc<Cell<bool>>,
    pub footer: Rc<Cell<bool>>,
    pub body: Rc<Cell<bool>>,
}

impl Default for RedrawFlags {
    fn default() -> Self {
        Self {
            header: Rc::new(Cell::new(true)),
            footer: Rc::new(Cell::new(true)),
            body: Rc::new(Cell::new(true)),
        }
    }
}

impl RedrawFlags {
    pub fn any(&self) -> bool {
        self.header.get() || self.footer.get() || self.body.get()
    }

    pub fn clear(&self) {
        self.header.set(false);
        self.footer.set(false);
        self.body.set(false);
    }
}

pub struct App {
    pub state: AppState,
    pub nav: NavModel,
    pub browse: BrowseMode,
    pub details: DetailsMode,
    pub manage: ManageMode,
    pub redraw: RedrawFlags,
    pub should_quit: bool,
    types: ColumnTypes,
    input: Box<dyn InputSource>,
}

impl App {
    pub fn new(input: Box<dyn InputSource>, follow: bool) -> Self {
        let mut state = AppState::new();
        state.set_follow_mode(follow);

        let redraw = RedrawFlags::default();
        for name in HEADER_FIELDS {
            let flag = redraw.header.clone();
            state.register_watcher(name, move || flag.set(true));
        }
        for name in FOOTER_FIELDS {
            let flag = redraw.footer.clone();
            state.register_watcher(name, move || flag.set(true));
        }
        for name in BODY_FIELDS {
            let flag = redraw.body.clone();
            state.register_watcher(name, move || flag.set(true));
        }

        Self {
            state,
            nav: NavModel::new(),
            browse: BrowseMode,
            details: DetailsMode::default(),
            manage: ManageMode::default(),
            redraw,
            should_quit: false,
            types: ColumnTypes::new(),
            input,
        }
    }

    pub fn source_name(&self) -> &str {
        self.input.display_name()
    }

    /// Parse every line the source has made available and append the
    /// resulting entries.
    pub fn load_entries(&mut self) -> Result<()> {
        let lines = self.input.read_new_lines()?;
        let mut line_number = self.state.num_entries() + 1;
        let mut new_entries = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let entry = LogEntry::parse(&line, line_number);
            self.types.observe(&entry);
            new_entries.push(entry);
            line_number += 1;
        }
        if !new_entries.is_empty() {
            debug!("loaded {} new entries", new_entries.len());
        }
        self.state.extend_entries(new_entries);
        Ok(())
    }

    /// Recompute the projection after a user-driven change (filter,
    /// search, sort, reload). Uses line-preserving repositioning so the
    /// selection survives the transition whenever its entry is still
    /// visible.
    pub fn apply_filters(&mut self) {
        self.nav.prepare_update(&self.state);
        self.compute_filtered();
        self.nav.reconcile(&mut self.state, true);
    }

    /// The follow-mode tick: pull new lines and, when the set grew,
    /// recompute and reconcile. The steady-state tick uses the cheap
    /// arithmetic reposition; while paused in Details the selection is
    /// pinned to its line number instead.
    pub fn update_entries(&mut self) -> Result<bool> {
        let old_count = self.state.num_entries();
        self.load_entries()?;
        if self.state.num_entries() == old_count {
            return Ok(false);
        }
        let preserve = self.state.current_mode() == Mode::Details;
        if preserve {
            self.nav.prepare_update(&self.state);
        }
        self.compute_filtered();
        self.nav.reconcile(&mut self.state, preserve);
        Ok(true)
    }

    /// Full reset: clear filters/search, restore the default sort,
    /// rewind the source and re-read it from the start.
    pub fn reset(&mut self) -> Result<()> {
        info!("resetting viewer state");
        self.state.clear_filters();
        self.state.set_search_term("");
        self.state.set_sort_column("#");
        self.state.set_sort_reverse(true);
        self.types.reset();
        self.input
            .rewind()
            .with_context(|| format!("failed to rewind {}", self.input.display_name()))?;
        self.state.set_entries(Vec::new());
        self.load_entries()?;
        self.compute_filtered();
        self.nav.reset(&mut self.state);
        Ok(())
    }

    fn compute_filtered(&mut self) {
        let filtered = filter::apply_filters(
            self.state.entries(),
            self.state.filters(),
            self.state.search_term(),
            self.state.sort_column(),
            self.state.sort_reverse(),
            &self.types,
        );
        self.state.set_filtered(filtered);
        if self.state.current_mode() == Mode::ColumnManagement {
            self.manage.sync_discovered(&self.state);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // An active prompt owns the keyboard, so command letters can be
        // typed into it.
        if self.state.current_mode() == Mode::Browse && self.state.input_mode().is_some() {
            let action = self.browse.handle_key(key, &mut self.state, &mut self.nav);
            return self.run_action(action);
        }

        let mode = self.state.current_mode();
        match (mode, key.code) {
            (_, KeyCode::Char('q')) => self.should_quit = true,
            (Mode::Browse | Mode::Details, KeyCode::Esc) => self.should_quit = true,
            (_, KeyCode::Char('d')) => self.toggle_mode(Mode::Details),
            (_, KeyCode::Char('m')) => self.toggle_mode(Mode::ColumnManagement),
            (_, KeyCode::Char('h') | KeyCode::Char('?')) => self.toggle_help(),
            (Mode::Help, _) => self.leave_help(),
            (Mode::Browse, _) => {
                let action = self.browse.handle_key(key, &mut self.state, &mut self.nav);
                self.run_action(action)?;
            }
            (Mode::Details, _) => {
                self.details.handle_key(key, &mut self.state, &mut self.nav);
                self.redraw.body.set(true);
            }
            (Mode::ColumnManagement, _) => {
                match self.manage.handle_key(key, &mut self.state) {
                    ManageOutcome::Stay => {}
                    ManageOutcome::Close | ManageOutcome::Commit => {
                        let previous = self.state.previous_mode();
                        self.state.set_current_mode(previous);
                    }
                }
                self.redraw.body.set(true);
            }
        }
        Ok(())
    }

    fn run_action(&mut self, action: BrowseAction) -> Result<()> {
        match action {
            BrowseAction::None => {}
            BrowseAction::ApplyFilters => self.apply_filters(),
            BrowseAction::LoadEntries => {
                self.load_entries()?;
                self.apply_filters();
            }
            BrowseAction::Reset => self.reset()?,
            BrowseAction::Goto(line) => {
                self.apply_filters();
                self.nav.goto_line(&mut self.state, line);
            }
        }
        Ok(())
    }

    fn toggle_mode(&mut self, target: Mode) {
        let previous = self.state.current_mode();
        let next = if previous == Mode::Browse {
            target
        } else {
            Mode::Browse
        };
        self.state.set_current_mode(next);
        self.state.set_previous_mode(previous);
        match next {
            Mode::Details => self.details.enter(&self.state),
            Mode::ColumnManagement => self.manage.enter(&self.state),
            _ => {}
        }
    }

    fn toggle_help(&mut self) {
        let previous = self.state.current_mode();
        let next = if previous == Mode::Help {
            self.state.previous_mode()
        } else {
            Mode::Help
        };
        self.state.set_current_mode(next);
        self.state.set_previous_mode(previous);
    }

    fn leave_help(&mut self) {
        let previous = self.state.previous_mode();
        self.state.set_current_mode(previous);
        self.state.set_previous_mode(Mode::Help);
    }

    /// Track the terminal geometry: column widths and the viewport
    /// height both depend on it.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.state.set_terminal_size((width, height));
        let chrome = HEADER_HEIGHT + FOOTER_HEIGHT + TABLE_HEADER_HEIGHT;
        self.nav
            .set_visible_rows(height.saturating_sub(chrome) as usize);
        self.state.recalculate_widths();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{scripted_input, LinesHandle};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn push(handle: &LinesHandle, lines: &[&str]) {
        handle
            .borrow_mut()
            .extend(lines.iter().map(|l| l.to_string()));
    }

    fn sample_lines() -> Vec<&'static str> {
        vec![
            r#"{"level":"info","message":"boot"}"#,
            r#"{"level":"error","message":"disk failure"}"#,
            r#"{"level":"info","message":"listening"}"#,
            r#"{"level":"error","message":"net failure"}"#,
            r#"{"level":"debug","message":"tick"}"#,
        ]
    }

    fn app_with_sample() -> (App, LinesHandle) {
        let (input, handle) = scripted_input();
        let mut app = App::new(Box::new(input), true);
        app.on_resize(120, 30);
        push(&handle, &sample_lines());
        app.update_entries().unwrap();
        (app, handle)
    }

    #[test]
    fn test_initial_load_newest_first() {
        let (app, _handle) = app_with_sample();
        assert_eq!(app.state.num_entries(), 5);
        assert_eq!(app.state.filtered().len(), 5);
        // Default sort "#" descending: row 0 is line 5.
        assert_eq!(app.state.current_row(), 0);
        assert_eq!(app.state.filtered_entry(0).unwrap().line_number(), 5);
    }

    #[test]
    fn test_filter_by_level_counts() {
        let (mut app, _handle) = app_with_sample();
        app.state.set_current_column("level");
        app.handle_key(key(KeyCode::Char('f'))).unwrap();
        for c in "error".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.state.filters_count(), 1);
        assert_eq!(app.state.filtered().len(), 2);
    }

    #[test]
    fn test_growth_keeps_top_pinned_in_reverse_sort() {
        let (mut app, handle) = app_with_sample();
        assert_eq!(app.state.current_row(), 0);

        push(
            &handle,
            &[
                r#"{"level":"info","message":"new one"}"#,
                r#"{"level":"info","message":"new two"}"#,
            ],
        );
        let grew = app.update_entries().unwrap();
        assert!(grew);

        assert_eq!(app.state.current_row(), 0);
        // Row 0 now points at the newest of the appended lines.
        assert_eq!(app.state.filtered_entry(0).unwrap().line_number(), 7);
    }

    #[test]
    fn test_growth_follows_bottom_in_forward_sort() {
        let (mut app, handle) = app_with_sample();
        app.state.set_sort_reverse(false);
        app.apply_filters();
        app.handle_key(key(KeyCode::End)).unwrap();
        assert_eq!(app.state.current_row(), 4);

        push(&handle, &[r#"{"level":"info","message":"six"}"#]);
        app.update_entries().unwrap();
        assert_eq!(app.state.current_row(), 5);
        assert_eq!(app.state.filtered_entry(5).unwrap().line_number(), 6);
    }

    #[test]
    fn test_clear_filters_restores_selected_line() {
        let (mut app, _handle) = app_with_sample();
        // Select line 3 ("listening", level info).
        app.nav.goto_line(&mut app.state, 3);
        assert_eq!(
            app.state
                .filtered_entry(app.state.current_row())
                .unwrap()
                .line_number(),
            3
        );

        // Filter to errors only: line 3 disappears and the nearest
        // surviving line (2 or 4) takes the selection.
        app.state.set_current_column("level");
        app.handle_key(key(KeyCode::Char('f'))).unwrap();
        for c in "error".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.state.filtered().len(), 2);
        let interim = app
            .state
            .filtered_entry(app.state.current_row())
            .unwrap()
            .line_number();
        assert!(interim == 2 || interim == 4);

        // Clearing filters keeps that line selected across the
        // round-trip (line-preserving path, not a jump to row 0).
        app.handle_key(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(app.state.filtered().len(), 5);
        let line = app
            .state
            .filtered_entry(app.state.current_row())
            .unwrap()
            .line_number();
        assert_eq!(line, interim);
    }

    #[test]
    fn test_filter_round_trip_preserves_surviving_selection() {
        let (mut app, _handle) = app_with_sample();
        // Select line 4 (an error line).
        app.nav.goto_line(&mut app.state, 4);

        app.state.set_current_column("level");
        app.handle_key(key(KeyCode::Char('f'))).unwrap();
        for c in "error".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();

        // Line 4 survives the filter and stays selected.
        assert_eq!(
            app.state
                .filtered_entry(app.state.current_row())
                .unwrap()
                .line_number(),
            4
        );

        app.handle_key(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(
            app.state
                .filtered_entry(app.state.current_row())
                .unwrap()
                .line_number(),
            4
        );
    }

    #[test]
    fn test_mode_toggles() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::Details);
        app.handle_key(key(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::Browse);

        app.handle_key(key(KeyCode::Char('m'))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::ColumnManagement);
        app.handle_key(key(KeyCode::Char('m'))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::Browse);
    }

    #[test]
    fn test_help_returns_to_previous_mode() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('d'))).unwrap();
        app.handle_key(key(KeyCode::Char('?'))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::Help);

        app.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.state.current_mode(), Mode::Details);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);

        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_prompt_swallows_command_letters() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('/'))).unwrap();
        for c in "dmq".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        assert!(!app.should_quit);
        assert_eq!(app.state.current_mode(), Mode::Browse);
        assert_eq!(app.state.input_buffer(), "dmq");
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state.input_mode(), None);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_reset_rewinds_and_restores_defaults() {
        let (mut app, _handle) = app_with_sample();
        app.state.set_sort_column("level");
        app.state.set_sort_reverse(false);
        app.state.set_search_term("disk");
        app.apply_filters();
        assert_eq!(app.state.filtered().len(), 1);

        app.handle_key(key(KeyCode::Char('R'))).unwrap();
        assert_eq!(app.state.sort_column(), "#");
        assert!(app.state.sort_reverse());
        assert_eq!(app.state.search_term(), "");
        assert_eq!(app.state.num_entries(), 5);
        assert_eq!(app.state.filtered().len(), 5);
        assert_eq!(app.state.current_row(), 0);
    }

    #[test]
    fn test_goto_prompt_jumps_to_line() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('g'))).unwrap();
        app.handle_key(key(KeyCode::Char('2'))).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(
            app.state
                .filtered_entry(app.state.current_row())
                .unwrap()
                .line_number(),
            2
        );
    }

    #[test]
    fn test_update_entries_without_growth_reports_false() {
        let (mut app, _handle) = app_with_sample();
        assert!(!app.update_entries().unwrap());
    }

    #[test]
    fn test_column_management_commit_applies_columns() {
        let (mut app, _handle) = app_with_sample();
        app.handle_key(key(KeyCode::Char('m'))).unwrap();

        // Move focus to the buttons and press OK.
        app.handle_key(key(KeyCode::Tab)).unwrap();
        app.handle_key(key(KeyCode::Tab)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.state.current_mode(), Mode::Browse);
        let names: Vec<&str> = app.state.columns().names().collect();
        assert_eq!(names, vec!["#", "level", "message"]);
    }

    #[test]
    fn test_redraw_flags_armed_by_changes() {
        let (mut app, _handle) = app_with_sample();
        app.redraw.clear();
        assert!(!app.redraw.any());

        app.state.set_current_row(1);
        assert!(app.redraw.body.get());
        assert!(app.redraw.footer.get());
        assert!(!app.redraw.header.get());
    }
}
