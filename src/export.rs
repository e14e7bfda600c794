//! Plain-text export of a note.

use std::fs;
use std::path::{Path, PathBuf};

use crate::entity::Note;
use crate::Result;

/// A file ready to be written: `<title>.txt` holding the note's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    pub fn from_note(note: &Note) -> Self {
        Self {
            file_name: format!("{}.txt", safe_file_stem(&note.title)),
            contents: note.content.clone(),
        }
    }

    /// Write into `dir`, replacing any file of the same name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Make a title usable as a file name without changing ordinary text.
fn safe_file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => "untitled".to_string(),
        _ => stem,
    }
}
