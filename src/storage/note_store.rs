use std::collections::HashSet;

use tracing::{debug, warn};

use super::slots::Storage;
use crate::clock::Clock;
use crate::entity::{Note, NoteId};
use crate::error::Result;
use crate::title::{derive_title, TitlePolicy};

/// Slot holding the JSON array of notes.
pub const NOTES_KEY: &str = "notes";
/// Slot holding the "don't ask before deleting" preference.
pub const SKIP_DELETE_CONFIRM_KEY: &str = "skipDeleteConfirm";

/// Ordered note collection mirrored to a single storage slot.
///
/// Every mutation writes the whole collection before returning. When the
/// write fails the in-memory collection is put back the way it was, so the
/// two copies never disagree.
pub struct NoteStore<S, C> {
    storage: S,
    clock: C,
    title_policy: TitlePolicy,
    notes: Vec<Note>,
    last_id: i64,
}

impl<S: Storage, C: Clock> NoteStore<S, C> {
    /// Open a store over `storage`, loading whatever it holds.
    pub fn open(storage: S, clock: C, title_policy: TitlePolicy) -> Self {
        let mut store = Self {
            storage,
            clock,
            title_policy,
            notes: Vec::new(),
            last_id: 0,
        };
        store.notes = store.load();
        store.last_id = max_numeric_id(&store.notes);
        debug!(count = store.notes.len(), "opened note store");
        store
    }

    /// Read the persisted collection.
    ///
    /// Missing, unreadable or malformed data yields an empty collection.
    pub fn load(&self) -> Vec<Note> {
        let raw = match self.storage.get(NOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "notes storage unreadable, starting empty");
                return Vec::new();
            }
        };

        let parsed: Vec<Note> = match serde_json::from_str(&raw) {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "notes storage corrupt, starting empty");
                return Vec::new();
            }
        };

        dedupe_ids(parsed)
    }

    /// Replace the whole collection, overwriting the persisted copy.
    ///
    /// Ids must be unique: later notes repeating an earlier id are dropped,
    /// the same way `load` treats them.
    pub fn persist(&mut self, notes: Vec<Note>) -> Result<()> {
        let notes = dedupe_ids(notes);
        write_notes(&mut self.storage, &notes)?;
        self.last_id = self.last_id.max(max_numeric_id(&notes));
        self.notes = notes;
        Ok(())
    }

    /// Append a new note and persist.
    pub fn add(&mut self, title: String, content: String) -> Result<Note> {
        let note = Note::new(self.next_id(), title, content, self.clock.now());
        self.notes.push(note.clone());

        if let Err(e) = write_notes(&mut self.storage, &self.notes) {
            self.notes.pop();
            return Err(e);
        }

        debug!(id = %note.id, "added note");
        Ok(note)
    }

    /// Remove the note with `id`, if present, and persist.
    pub fn remove(&mut self, id: &NoteId) -> Result<()> {
        let index = self.position(id);
        let removed = index.map(|index| (index, self.notes.remove(index)));

        if let Err(e) = write_notes(&mut self.storage, &self.notes) {
            if let Some((index, note)) = removed {
                self.notes.insert(index, note);
            }
            return Err(e);
        }

        debug!(id = %id, found = removed.is_some(), "removed note");
        Ok(())
    }

    /// Overwrite a note's content, re-derive its title, refresh its
    /// timestamp and persist. Returns `None` when no note has `id`.
    pub fn update(&mut self, id: &NoteId, content: &str) -> Result<Option<Note>> {
        let position = self.notes.len();
        let now = self.clock.now();
        let policy = self.title_policy;

        let Some(index) = self.notes.iter().position(|n| &n.id == id) else {
            return Ok(None);
        };

        let previous = self.notes[index].clone();
        {
            let note = &mut self.notes[index];
            note.content = content.to_string();
            note.title = derive_title(content, policy, position);
            note.last_modified = now;
        }

        if let Err(e) = write_notes(&mut self.storage, &self.notes) {
            self.notes[index] = previous;
            return Err(e);
        }

        Ok(Some(self.notes[index].clone()))
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| &n.id == id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn title_policy(&self) -> TitlePolicy {
        self.title_policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn skip_delete_confirmation(&self) -> bool {
        match self.storage.get(SKIP_DELETE_CONFIRM_KEY) {
            Ok(Some(value)) => value.trim() == "true",
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "preference unreadable, assuming default");
                false
            }
        }
    }

    pub fn set_skip_delete_confirmation(&mut self, skip: bool) -> Result<()> {
        let value = if skip { "true" } else { "false" };
        self.storage.set(SKIP_DELETE_CONFIRM_KEY, value)
    }

    /// Ids come from the clock in milliseconds, bumped past the last one
    /// handed out so they stay unique even within the same millisecond.
    fn next_id(&mut self) -> NoteId {
        let now = self.clock.now().timestamp_millis();
        let id = match self.last_id.checked_add(1) {
            Some(next) => now.max(next),
            // A stored id sits at i64::MAX; look for a free one from the clock up.
            None => (now..)
                .find(|candidate| self.position(&NoteId::new(candidate.to_string())).is_none())
                .unwrap_or(now),
        };
        self.last_id = self.last_id.max(id);
        NoteId::new(id.to_string())
    }
}

fn write_notes<S: Storage>(storage: &mut S, notes: &[Note]) -> Result<()> {
    let json = serde_json::to_string(notes)?;
    storage.set(NOTES_KEY, &json)
}

/// Keep the first note for each id.
fn dedupe_ids(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::new();
    notes
        .into_iter()
        .filter(|note| {
            let fresh = seen.insert(note.id.clone());
            if !fresh {
                warn!(id = %note.id, "dropping note with duplicate id");
            }
            fresh
        })
        .collect()
}

fn max_numeric_id(notes: &[Note]) -> i64 {
    notes
        .iter()
        .filter_map(|n| n.id.as_millis())
        .max()
        .unwrap_or(0)
}
