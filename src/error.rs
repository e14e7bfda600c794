use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("No notekeeper data directory found. Run 'notekeeper init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .notekeeper/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Failed to save notes: {0}")]
    StorageWrite(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, NotesError>;
