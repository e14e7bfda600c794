//! Selection and edit controller.
//!
//! `NotesManager` owns the note store and tracks which note, if any, is
//! current. Operations return the presentation state a front end needs to
//! show (editor contents, list entries, word counts, preview HTML) instead
//! of touching any UI themselves.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::commands::{palette, Command};
use crate::config::Config;
use crate::entity::{Note, NoteId};
use crate::error::Result;
use crate::export::ExportFile;
use crate::render::render_markdown;
use crate::search::{filter_notes, SearchResults};
use crate::stats::{word_count, NoteStats, TypingMeter};
use crate::storage::{NoteStore, Storage};
use crate::title::placeholder_title;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Unselected,
    Selected(NoteId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// What the editing surface should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorState {
    pub content: String,
    pub enabled: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub stats: NoteStats,
}

impl EditorState {
    /// Empty, read-only editor shown when nothing is selected.
    pub fn cleared() -> Self {
        Self {
            content: String::new(),
            enabled: false,
            last_modified: None,
            stats: NoteStats::of(""),
        }
    }

    fn for_note(note: &Note) -> Self {
        Self {
            content: note.content.clone(),
            enabled: true,
            last_modified: Some(note.last_modified),
            stats: NoteStats::of(&note.content),
        }
    }
}

/// Display state derived from an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditOutcome {
    pub note: Note,
    pub stats: NoteStats,
    pub words_per_minute: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// There was no current note; nothing happened.
    NothingSelected,
    /// Deletion is gated and was not confirmed; nothing happened.
    NeedsConfirmation(Note),
    Deleted(Note),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub id: NoteId,
    pub title: String,
    pub selected: bool,
}

/// Result of running a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Editor(EditorState),
    Delete(DeleteOutcome),
    Preview(Option<String>),
    Export(Option<ExportFile>),
    Palette(Vec<Command>),
    /// The command had nothing to act on.
    Nothing,
}

pub struct NotesManager<S, C> {
    store: NoteStore<S, C>,
    config: Config,
    selection: Selection,
    preview_visible: bool,
    typing: TypingMeter,
}

impl<S: Storage, C: Clock> NotesManager<S, C> {
    /// Load notes from `storage` and start with nothing selected.
    pub fn open(storage: S, clock: C, config: Config) -> Self {
        let store = NoteStore::open(storage, clock, config.titles);
        Self::new(store, config)
    }

    pub fn new(store: NoteStore<S, C>, config: Config) -> Self {
        Self {
            store,
            config,
            selection: Selection::Unselected,
            preview_visible: false,
            typing: TypingMeter::new(),
        }
    }

    pub fn store(&self) -> &NoteStore<S, C> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_id(&self) -> Option<&NoteId> {
        match &self.selection {
            Selection::Selected(id) => Some(id),
            Selection::Unselected => None,
        }
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.current_id().and_then(|id| self.store.get(id))
    }

    /// Make `id` current if it exists, otherwise clear the selection.
    pub fn select_note(&mut self, id: &NoteId) -> EditorState {
        let now = self.store.clock().now();
        match self.store.get(id) {
            Some(note) => {
                let state = EditorState::for_note(note);
                self.typing.start(now, state.stats.words);
                self.selection = Selection::Selected(id.clone());
                debug!(id = %id, "selected note");
                state
            }
            None => {
                self.typing.reset();
                self.selection = Selection::Unselected;
                debug!(id = %id, "selection cleared, no such note");
                EditorState::cleared()
            }
        }
    }

    /// Add an empty note and make it current.
    pub fn create_new_note(&mut self) -> Result<EditorState> {
        let title = placeholder_title(self.store.len() + 1);
        let note = self.store.add(title, String::new())?;

        self.typing.start(note.last_modified, 0);
        self.selection = Selection::Selected(note.id.clone());
        info!(id = %note.id, "created note");

        Ok(EditorState::for_note(&note))
    }

    /// Whether deleting needs an explicit confirmation right now.
    pub fn requires_delete_confirmation(&self) -> bool {
        self.config.delete.confirm && !self.store.skip_delete_confirmation()
    }

    /// Delete the current note.
    ///
    /// With the confirmation gate active and `confirmed` false, nothing is
    /// removed and [`DeleteOutcome::NeedsConfirmation`] is returned.
    pub fn delete_current_note(&mut self, confirmed: bool) -> Result<DeleteOutcome> {
        let Some(note) = self.current_note().cloned() else {
            return Ok(DeleteOutcome::NothingSelected);
        };

        if !confirmed && self.requires_delete_confirmation() {
            return Ok(DeleteOutcome::NeedsConfirmation(note));
        }

        self.store.remove(&note.id)?;
        self.selection = Selection::Unselected;
        self.typing.reset();
        info!(id = %note.id, "deleted note");

        Ok(DeleteOutcome::Deleted(note))
    }

    /// Replace the current note's content. Does nothing when unselected.
    pub fn edit_content(&mut self, text: &str) -> Result<Option<EditOutcome>> {
        let Some(id) = self.current_id().cloned() else {
            return Ok(None);
        };

        let Some(note) = self.store.update(&id, text)? else {
            self.selection = Selection::Unselected;
            return Ok(None);
        };

        let stats = NoteStats::of(&note.content);
        let words_per_minute = self.typing.record(note.last_modified, word_count(&note.content));

        Ok(Some(EditOutcome {
            note,
            stats,
            words_per_minute,
        }))
    }

    /// Move the selection one note forward or back, wrapping around.
    ///
    /// With nothing selected the first note is chosen. Returns `None` when
    /// there are no notes.
    pub fn switch_note(&mut self, direction: Direction) -> Option<EditorState> {
        let len = self.store.len();
        if len == 0 {
            return None;
        }

        let next = match self.current_id().and_then(|id| self.store.position(id)) {
            None => 0,
            Some(index) => match direction {
                Direction::Next => (index + 1) % len,
                Direction::Previous => (index + len - 1) % len,
            },
        };

        let id = self.store.notes()[next].id.clone();
        Some(self.select_note(&id))
    }

    pub fn filter(&self, query: &str) -> SearchResults<'_> {
        filter_notes(self.store.notes(), query)
    }

    pub fn notes_list(&self) -> Vec<ListEntry> {
        let current = self.current_id();
        self.store
            .notes()
            .iter()
            .map(|note| ListEntry {
                id: note.id.clone(),
                title: note.title.clone(),
                selected: current == Some(&note.id),
            })
            .collect()
    }

    pub fn editor_state(&self) -> EditorState {
        self.current_note()
            .map(EditorState::for_note)
            .unwrap_or_else(EditorState::cleared)
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    /// Show or hide the preview pane; returns the new visibility.
    pub fn toggle_preview(&mut self) -> bool {
        self.preview_visible = !self.preview_visible;
        self.preview_visible
    }

    /// Rendered HTML of the current note.
    pub fn preview_html(&self) -> Option<String> {
        self.current_note()
            .map(|note| render_markdown(&note.content, self.config.preview))
    }

    pub fn export_current_note(&self) -> Option<ExportFile> {
        self.current_note().map(ExportFile::from_note)
    }

    pub fn set_skip_delete_confirmation(&mut self, skip: bool) -> Result<()> {
        self.store.set_skip_delete_confirmation(skip)
    }

    /// Run a command from the command surface.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        let outcome = match command {
            Command::NewNote => CommandOutcome::Editor(self.create_new_note()?),
            Command::DeleteNote => CommandOutcome::Delete(self.delete_current_note(false)?),
            Command::NextNote => self
                .switch_note(Direction::Next)
                .map_or(CommandOutcome::Nothing, CommandOutcome::Editor),
            Command::PreviousNote => self
                .switch_note(Direction::Previous)
                .map_or(CommandOutcome::Nothing, CommandOutcome::Editor),
            Command::TogglePreview => {
                if self.toggle_preview() {
                    CommandOutcome::Preview(self.preview_html())
                } else {
                    CommandOutcome::Preview(None)
                }
            }
            Command::Export => CommandOutcome::Export(self.export_current_note()),
            Command::CommandPalette => CommandOutcome::Palette(palette("")),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use crate::title::TitlePolicy;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    type Manager = NotesManager<MemoryStorage, ManualClock>;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap())
    }

    fn manager() -> Manager {
        NotesManager::open(MemoryStorage::new(), clock(), Config::default())
    }

    fn manager_with_notes(contents: &[&str]) -> (Manager, Vec<NoteId>) {
        let mut m = manager();
        let mut ids = Vec::new();
        for content in contents {
            m.create_new_note().unwrap();
            m.edit_content(content).unwrap();
            ids.push(m.current_id().unwrap().clone());
        }
        (m, ids)
    }

    #[test]
    fn test_starts_unselected() {
        let m = manager();
        assert_eq!(m.selection(), &Selection::Unselected);
        assert_eq!(m.editor_state(), EditorState::cleared());
    }

    #[test]
    fn test_create_selects_new_note() {
        let mut m = manager();
        let editor = m.create_new_note().unwrap();

        assert!(editor.enabled);
        assert_eq!(editor.content, "");
        let current = m.current_note().unwrap();
        assert_eq!(current.title, "Note 1");
        assert_eq!(m.selection(), &Selection::Selected(current.id.clone()));

        m.create_new_note().unwrap();
        assert_eq!(m.current_note().unwrap().title, "Note 2");
    }

    #[test]
    fn test_created_ids_are_distinct() {
        let mut m = manager();
        for _ in 0..20 {
            m.create_new_note().unwrap();
        }
        let ids: HashSet<_> = m.notes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_select_existing_and_missing() {
        let (mut m, ids) = manager_with_notes(&["first", "second"]);

        let editor = m.select_note(&ids[0]);
        assert_eq!(editor.content, "first");
        assert!(editor.enabled);
        assert_eq!(m.current_id(), Some(&ids[0]));

        let editor = m.select_note(&NoteId::new("does-not-exist"));
        assert_eq!(editor, EditorState::cleared());
        assert_eq!(m.selection(), &Selection::Unselected);
    }

    #[test]
    fn test_edit_updates_title_and_stats() {
        let mut m = manager();
        m.create_new_note().unwrap();

        let outcome = m
            .edit_content("# Hello *world*\nbody text")
            .unwrap()
            .unwrap();
        assert_eq!(outcome.note.title, "Hello world");
        assert_eq!(outcome.stats.words, 5);
        assert_eq!(m.notes_list()[0].title, "Hello world");
        assert_eq!(m.store().load()[0].content, "# Hello *world*\nbody text");
    }

    #[test]
    fn test_edit_while_unselected_is_ignored() {
        let (mut m, _) = manager_with_notes(&["keep"]);
        m.select_note(&NoteId::new("gone"));

        assert!(m.edit_content("changed").unwrap().is_none());
        assert_eq!(m.notes()[0].content, "keep");
    }

    #[test]
    fn test_edit_reports_typing_speed() {
        let mut m = manager();
        m.create_new_note().unwrap();
        m.store().clock().advance(Duration::seconds(30));

        let outcome = m.edit_content("one two three four five").unwrap().unwrap();
        let wpm = outcome.words_per_minute.unwrap();
        assert!((wpm - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_delete_requires_confirmation_by_default() {
        let (mut m, ids) = manager_with_notes(&["a"]);

        let outcome = m.delete_current_note(false).unwrap();
        assert!(matches!(outcome, DeleteOutcome::NeedsConfirmation(_)));
        assert_eq!(m.current_id(), Some(&ids[0]));
        assert_eq!(m.notes().len(), 1);

        let outcome = m.delete_current_note(true).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(ref n) if n.id == ids[0]));
        assert_eq!(m.selection(), &Selection::Unselected);
        assert!(m.notes().is_empty());
        assert!(m.store().load().is_empty());
        assert!(!m.editor_state().enabled);
    }

    #[test]
    fn test_skip_preference_disables_gate() {
        let (mut m, _) = manager_with_notes(&["a"]);
        m.set_skip_delete_confirmation(true).unwrap();

        let outcome = m.delete_current_note(false).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted(_)));
        assert_eq!(m.selection(), &Selection::Unselected);
    }

    #[test]
    fn test_config_disables_gate() {
        let mut config = Config::default();
        config.delete.confirm = false;
        let mut m = NotesManager::open(MemoryStorage::new(), clock(), config);
        m.create_new_note().unwrap();

        assert!(!m.requires_delete_confirmation());
        assert!(matches!(
            m.delete_current_note(false).unwrap(),
            DeleteOutcome::Deleted(_)
        ));
    }

    #[test]
    fn test_delete_when_unselected_is_noop() {
        let (mut m, _) = manager_with_notes(&["a", "b"]);
        m.select_note(&NoteId::new("nope"));

        let outcome = m.delete_current_note(true).unwrap();
        assert_eq!(outcome, DeleteOutcome::NothingSelected);
        assert_eq!(m.notes().len(), 2);
    }

    #[test]
    fn test_switch_wraps_around() {
        let (mut m, ids) = manager_with_notes(&["zero", "one", "two"]);
        m.select_note(&ids[1]);

        m.switch_note(Direction::Next);
        assert_eq!(m.current_id(), Some(&ids[2]));

        m.switch_note(Direction::Next);
        assert_eq!(m.current_id(), Some(&ids[0]));

        m.switch_note(Direction::Previous);
        assert_eq!(m.current_id(), Some(&ids[2]));
    }

    #[test]
    fn test_switch_from_unselected_picks_first() {
        let (mut m, ids) = manager_with_notes(&["zero", "one"]);
        m.select_note(&NoteId::new("none"));

        let editor = m.switch_note(Direction::Previous).unwrap();
        assert_eq!(editor.content, "zero");
        assert_eq!(m.current_id(), Some(&ids[0]));
    }

    #[test]
    fn test_switch_on_empty_collection() {
        let mut m = manager();
        assert!(m.switch_note(Direction::Next).is_none());
        assert_eq!(m.selection(), &Selection::Unselected);
    }

    #[test]
    fn test_filter_through_manager() {
        let (m, _) = manager_with_notes(&["Shopping", "Recipe\neggs"]);
        let results = m.filter("egg");
        let matches = results.matches().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Recipe");
        assert_eq!(m.filter(""), SearchResults::NoFilter);
    }

    #[test]
    fn test_notes_list_marks_current() {
        let (mut m, ids) = manager_with_notes(&["a", "b"]);
        m.select_note(&ids[0]);
        let list = m.notes_list();
        assert!(list[0].selected);
        assert!(!list[1].selected);
    }

    #[test]
    fn test_preview_and_export() {
        let (mut m, _) = manager_with_notes(&["# Plan\n\n- item"]);

        assert!(!m.preview_visible());
        match m.execute(Command::TogglePreview).unwrap() {
            CommandOutcome::Preview(Some(html)) => assert!(html.contains("<h1>Plan</h1>")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            m.execute(Command::TogglePreview).unwrap(),
            CommandOutcome::Preview(None)
        );

        let export = m.export_current_note().unwrap();
        assert_eq!(export.file_name, "Plan.txt");
        assert_eq!(export.contents, "# Plan\n\n- item");
    }

    #[test]
    fn test_execute_commands() {
        let mut m = manager();
        assert_eq!(m.execute(Command::NextNote).unwrap(), CommandOutcome::Nothing);
        assert_eq!(
            m.execute(Command::Export).unwrap(),
            CommandOutcome::Export(None)
        );

        assert!(matches!(
            m.execute(Command::NewNote).unwrap(),
            CommandOutcome::Editor(_)
        ));
        assert!(matches!(
            m.execute(Command::DeleteNote).unwrap(),
            CommandOutcome::Delete(DeleteOutcome::NeedsConfirmation(_))
        ));
        assert!(matches!(
            m.execute(Command::CommandPalette).unwrap(),
            CommandOutcome::Palette(ref commands) if commands.len() == Command::ALL.len()
        ));
    }

    #[test]
    fn test_plain_title_policy() {
        let mut config = Config::default();
        config.titles = TitlePolicy::plain();
        let mut m = NotesManager::open(MemoryStorage::new(), clock(), config);
        m.create_new_note().unwrap();

        let outcome = m.edit_content("# Raw *title*").unwrap().unwrap();
        assert_eq!(outcome.note.title, "# Raw *title*");
    }

    #[test]
    fn test_failed_save_keeps_state_consistent() {
        let mut m = NotesManager::open(MemoryStorage::with_quota(300), clock(), Config::default());
        m.create_new_note().unwrap();
        m.edit_content("small").unwrap();

        assert!(m.edit_content(&"z".repeat(1000)).is_err());
        assert_eq!(m.current_note().unwrap().content, "small");
        assert_eq!(m.store().load(), m.notes().to_vec());
    }
}
