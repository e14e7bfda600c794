//! Persistence: string-keyed slots and the note collection stored in them.

mod note_store;
mod slots;

pub use note_store::{NoteStore, NOTES_KEY, SKIP_DELETE_CONFIRM_KEY};
pub use slots::{FileStorage, MemoryStorage, Storage};
