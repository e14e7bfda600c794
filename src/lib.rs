pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod export;
pub mod render;
pub mod search;
pub mod stats;
pub mod storage;
pub mod title;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use controller::{DeleteOutcome, Direction, EditorState, NotesManager, Selection};
pub use entity::{Note, NoteId};
pub use error::{NotesError, Result};
pub use storage::{FileStorage, MemoryStorage, NoteStore, Storage};
