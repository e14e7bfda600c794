use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::clock::SystemClock;
use crate::commands::palette;
use crate::config::Config;
use crate::controller::{DeleteOutcome, NotesManager};
use crate::entity::{Note, NoteId};
use crate::error::{NotesError, Result};
use crate::search::{snippet, SearchResults};
use crate::stats::NoteStats;
use crate::storage::FileStorage;

const DATA_DIR: &str = ".notekeeper";

pub(super) type FileManager = NotesManager<FileStorage, SystemClock>;

/// Find the data directory by looking for .notekeeper/ in the current
/// directory and its parents.
fn find_data_dir() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(DATA_DIR);
        if candidate.is_dir() {
            return candidate;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd.join(DATA_DIR),
        }
    }
}

fn data_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(find_data_dir)
}

pub(super) fn open_manager(dir: Option<PathBuf>) -> Result<FileManager> {
    let dir = data_dir(dir);
    if !dir.is_dir() {
        return Err(NotesError::NotInitialized);
    }

    let config = Config::load(&dir)?;
    Ok(NotesManager::open(FileStorage::new(dir), SystemClock, config))
}

/// Resolve a 1-based position, an exact id, or a unique id prefix.
pub(super) fn resolve_note_id(notes: &[Note], id: &str) -> Result<NoteId> {
    let id = id.trim();

    if let Ok(position) = id.parse::<usize>() {
        if (1..=notes.len()).contains(&position) {
            return Ok(notes[position - 1].id.clone());
        }
    }

    if let Some(note) = notes.iter().find(|n| n.id.as_str() == id) {
        return Ok(note.id.clone());
    }

    let mut matches = notes.iter().filter(|n| n.id.as_str().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(note), None) if !id.is_empty() => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(NotesError::InvalidCommand(format!(
            "id prefix '{}' matches more than one note",
            id
        ))),
        _ => Err(NotesError::NoteNotFound(id.to_string())),
    }
}

/// Open the store and make the note named by `id` current.
fn open_and_select(dir: Option<PathBuf>, id: &str) -> Result<(FileManager, usize)> {
    let mut manager = open_manager(dir)?;
    let note_id = resolve_note_id(manager.notes(), id)?;
    manager.select_note(&note_id);
    let position = manager.store().position(&note_id).map_or(0, |p| p + 1);
    Ok((manager, position))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

pub(super) fn note_line(position: usize, note: &Note) -> String {
    format!("{:03} ({}) - {}", position, note.id, note.title)
}

#[derive(Serialize)]
struct NoteJson<'a> {
    position: usize,
    #[serde(flatten)]
    note: &'a Note,
    stats: NoteStats,
}

fn print_note_json(position: usize, note: &Note) -> Result<()> {
    let json = NoteJson {
        position,
        note,
        stats: NoteStats::of(&note.content),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn current_with_position(manager: &FileManager) -> Result<(usize, Note)> {
    let note = manager
        .current_note()
        .cloned()
        .ok_or_else(|| NotesError::NoteNotFound("current note".to_string()))?;
    let position = manager.store().position(&note.id).map_or(0, |p| p + 1);
    Ok((position, note))
}

pub fn handle_init(dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => env::current_dir()?.join(DATA_DIR),
    };

    if dir.join(crate::config::CONFIG_FILE).exists() {
        return Err(NotesError::AlreadyInitialized);
    }

    fs::create_dir_all(&dir)?;
    Config::default().save(&dir)?;

    println!("Initialized notekeeper in {}", dir.display());
    Ok(())
}

pub fn handle_new(dir: Option<PathBuf>, stdin: bool, json: bool) -> Result<()> {
    let mut manager = open_manager(dir)?;
    manager.create_new_note()?;

    if stdin {
        let content = read_stdin()?;
        if !content.is_empty() {
            manager.edit_content(&content)?;
        }
    }

    let (position, note) = current_with_position(&manager)?;
    if json {
        print_note_json(position, &note)?;
    } else {
        println!("Created note {}", note_line(position, &note));
    }

    Ok(())
}

pub fn handle_list(dir: Option<PathBuf>, json: bool) -> Result<()> {
    let manager = open_manager(dir)?;
    let notes = manager.notes();

    if json {
        let items: Vec<NoteJson> = notes
            .iter()
            .enumerate()
            .map(|(i, note)| NoteJson {
                position: i + 1,
                note,
                stats: NoteStats::of(&note.content),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if notes.is_empty() {
        println!("No notes yet. Create one with 'notekeeper new'.");
    } else {
        for (i, note) in notes.iter().enumerate() {
            println!(
                "{}  [{}]",
                note_line(i + 1, note),
                note.last_modified.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

pub fn handle_show(dir: Option<PathBuf>, id: String, json: bool) -> Result<()> {
    let (manager, _) = open_and_select(dir, &id)?;
    let (position, note) = current_with_position(&manager)?;

    if json {
        print_note_json(position, &note)?;
    } else {
        let editor = manager.editor_state();
        println!("{}", note_line(position, &note));
        println!(
            "Last modified: {}",
            note.last_modified.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("{}", editor.stats);
        if !note.content.is_empty() {
            println!("\n{}", note.content);
        }
    }

    Ok(())
}

pub fn handle_edit(
    dir: Option<PathBuf>,
    id: String,
    stdin: bool,
    content: Option<String>,
    json: bool,
) -> Result<()> {
    let content = match (stdin, content) {
        (true, _) => read_stdin()?,
        (false, Some(content)) => content,
        (false, None) => {
            return Err(NotesError::InvalidCommand(
                "edit needs --stdin or --content".to_string(),
            ))
        }
    };

    let (mut manager, position) = open_and_select(dir, &id)?;
    let outcome = manager
        .edit_content(&content)?
        .ok_or_else(|| NotesError::NoteNotFound(id.clone()))?;

    if json {
        print_note_json(position, &outcome.note)?;
    } else {
        println!("Updated note {}", note_line(position, &outcome.note));
        println!("{}", outcome.stats);
    }

    Ok(())
}

pub fn handle_delete(dir: Option<PathBuf>, id: String, force: bool) -> Result<()> {
    let (mut manager, position) = open_and_select(dir, &id)?;

    let outcome = match manager.delete_current_note(force)? {
        DeleteOutcome::NeedsConfirmation(note) => {
            eprintln!("Delete note {}? [y/N] ", note_line(position, &note));

            // Only prompt when a person can answer.
            if atty::is(atty::Stream::Stdin) {
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            } else {
                return Err(NotesError::InvalidCommand(
                    "Use --force to delete in non-interactive mode".to_string(),
                ));
            }

            manager.delete_current_note(true)?
        }
        other => other,
    };

    match outcome {
        DeleteOutcome::Deleted(note) => {
            println!("Deleted note {}", note_line(position, &note));
            Ok(())
        }
        _ => Err(NotesError::NoteNotFound(id)),
    }
}

pub fn handle_search(dir: Option<PathBuf>, query: String, json: bool) -> Result<()> {
    let manager = open_manager(dir)?;
    let results = manager.filter(&query);

    let hits: Vec<&Note> = match &results {
        SearchResults::NoFilter => manager.notes().iter().collect(),
        SearchResults::Matches(notes) => notes.clone(),
    };

    if json {
        #[derive(Serialize)]
        struct SearchResultJson {
            id: String,
            position: usize,
            title: String,
            snippet: String,
        }

        let json_results: Vec<SearchResultJson> = hits
            .iter()
            .map(|note| SearchResultJson {
                id: note.id.to_string(),
                position: manager.store().position(&note.id).map_or(0, |p| p + 1),
                title: note.title.clone(),
                snippet: snippet(&note.content),
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if !results.is_filtering() {
        println!("Empty query, showing all notes:\n");
    } else if hits.is_empty() {
        println!("No matches found for '{}'.", query);
        return Ok(());
    } else {
        println!("Search results for '{}':\n", query);
    }

    for note in hits {
        let position = manager.store().position(&note.id).map_or(0, |p| p + 1);
        println!("  {}", note_line(position, note));
        if !note.content.is_empty() {
            println!("      {}", snippet(&note.content).replace('\n', " "));
        }
    }

    Ok(())
}

pub fn handle_preview(dir: Option<PathBuf>, id: String) -> Result<()> {
    let (manager, _) = open_and_select(dir, &id)?;
    let html = manager
        .preview_html()
        .ok_or_else(|| NotesError::NoteNotFound(id))?;
    println!("{}", html);
    Ok(())
}

pub fn handle_export(dir: Option<PathBuf>, id: String, out: PathBuf) -> Result<()> {
    let (manager, _) = open_and_select(dir, &id)?;
    let export = manager
        .export_current_note()
        .ok_or_else(|| NotesError::NoteNotFound(id))?;

    let path = export.write_to(&out)?;
    println!("Exported to {}", display_path(&path));
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

pub fn handle_stats(dir: Option<PathBuf>, id: String, json: bool) -> Result<()> {
    let (manager, _) = open_and_select(dir, &id)?;
    let stats = manager.editor_state().stats;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

pub fn handle_prefs(dir: Option<PathBuf>, skip_delete_confirmation: Option<bool>) -> Result<()> {
    let mut manager = open_manager(dir)?;

    if let Some(skip) = skip_delete_confirmation {
        manager.set_skip_delete_confirmation(skip)?;
    }

    let config = manager.config();
    println!(
        "skip delete confirmation: {}",
        manager.store().skip_delete_confirmation()
    );
    println!("confirm deletes (config): {}", config.delete.confirm);
    println!("strip markdown from titles: {}", config.titles.strip_markdown);
    println!("preview line breaks: {}", config.preview.line_breaks);
    println!("preview raw html: {}", config.preview.allow_html);
    Ok(())
}

pub fn handle_commands(query: Option<String>) -> Result<()> {
    let commands = palette(query.as_deref().unwrap_or(""));
    if commands.is_empty() {
        println!("No matching commands.");
    }
    for command in commands {
        println!("  {:<16} {}", command.label(), command.shortcut());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notes(ids: &[&str]) -> Vec<Note> {
        ids.iter()
            .map(|id| Note::new(NoteId::new(*id), id.to_string(), String::new(), Utc::now()))
            .collect()
    }

    #[test]
    fn test_resolve_by_position() {
        let notes = notes(&["1700000000001", "1700000000002"]);
        assert_eq!(resolve_note_id(&notes, "2").unwrap().as_str(), "1700000000002");
    }

    #[test]
    fn test_resolve_by_exact_id_and_prefix() {
        let notes = notes(&["1700000000001", "1700000005000"]);
        assert_eq!(
            resolve_note_id(&notes, "1700000000001").unwrap().as_str(),
            "1700000000001"
        );
        assert_eq!(
            resolve_note_id(&notes, "17000000050").unwrap().as_str(),
            "1700000005000"
        );
    }

    #[test]
    fn test_resolve_ambiguous_and_missing() {
        let notes = notes(&["1700000000001", "1700000005000"]);
        assert!(matches!(
            resolve_note_id(&notes, "1700000"),
            Err(NotesError::InvalidCommand(_))
        ));
        assert!(matches!(
            resolve_note_id(&notes, "99"),
            Err(NotesError::NoteNotFound(_))
        ));
        assert!(matches!(
            resolve_note_id(&notes, ""),
            Err(NotesError::InvalidCommand(_)) | Err(NotesError::NoteNotFound(_))
        ));
    }
}
