//! Interactive session: one controller, many commands, read line by line.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::commands::{palette, Command};
use crate::controller::{CommandOutcome, DeleteOutcome, EditorState, NotesManager};
use crate::error::Result;
use crate::export::ExportFile;
use crate::search::{snippet, SearchResults};
use crate::storage::Storage;

use super::handlers::{note_line, open_manager, resolve_note_id};

const HELP: &str = "\
Commands:
  list                 list notes (* marks the current one)
  new                  create a note and select it
  select <id>          select by position or id prefix
  next | prev          move to the next/previous note
  show                 print the current note
  write <text>         replace the current note with one line of text
  edit                 replace the current note with the following lines, ended by '.'
  delete               delete the current note
  yes                  confirm a pending delete
  skip-confirm on|off  stop/start asking before deletes
  preview              toggle the markdown preview
  export [dir]         write the current note to <title>.txt
  search <query>       find notes by title or content
  stats                word, character and line counts
  palette [query]      list commands and shortcuts
  help                 show this help
  quit                 leave the shell
Shortcuts such as ctrl+e or ctrl+down run the matching command.";

pub fn handle_shell(dir: Option<PathBuf>) -> Result<()> {
    let mut manager = open_manager(dir)?;
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(&mut manager, stdin.lock(), stdout.lock(), interactive)
}

struct Session {
    pending_delete: bool,
}

/// Drive `manager` from `input` until it ends or `quit` is read.
pub fn run_shell<S, C, R, W>(
    manager: &mut NotesManager<S, C>,
    mut input: R,
    mut out: W,
    interactive: bool,
) -> Result<()>
where
    S: Storage,
    C: Clock,
    R: BufRead,
    W: Write,
{
    let mut session = Session {
        pending_delete: false,
    };

    if interactive {
        writeln!(out, "notekeeper shell, {} notes. Type 'help' for commands.", manager.notes().len())?;
    }

    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        // `rest` keeps its spacing; only `write` uses it untrimmed.
        let (word, rest) = match line.trim_start().split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (line.trim(), ""),
        };

        if word.is_empty() {
            continue;
        }
        if matches!(word, "quit" | "exit") {
            break;
        }

        // Any command other than a delete or its confirmation drops a pending delete.
        let keeps_pending = matches!(word, "yes" | "delete")
            || Command::from_shortcut(word) == Some(Command::DeleteNote);
        if !keeps_pending {
            session.pending_delete = false;
        }

        if let Err(e) = dispatch(manager, &mut session, word, rest, &mut input, &mut out) {
            writeln!(out, "Error: {}", e)?;
        }
    }

    Ok(())
}

fn dispatch<S, C, R, W>(
    manager: &mut NotesManager<S, C>,
    session: &mut Session,
    word: &str,
    rest: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: Storage,
    C: Clock,
    R: BufRead,
    W: Write,
{
    let raw = rest;
    let rest = rest.trim();
    match word {
        "help" => writeln!(out, "{}", HELP)?,
        "list" => print_list(manager, out)?,
        "new" => run_command(manager, session, Command::NewNote, out)?,
        "next" => run_command(manager, session, Command::NextNote, out)?,
        "prev" => run_command(manager, session, Command::PreviousNote, out)?,
        "delete" => run_command(manager, session, Command::DeleteNote, out)?,
        "preview" => run_command(manager, session, Command::TogglePreview, out)?,
        "select" => {
            let id = resolve_note_id(manager.notes(), rest)?;
            let editor = manager.select_note(&id);
            print_editor(manager, &editor, out)?;
        }
        "show" => {
            let editor = manager.editor_state();
            print_editor(manager, &editor, out)?;
        }
        "write" => apply_edit(manager, raw, out)?,
        "edit" => {
            let mut content = Vec::new();
            loop {
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim_end_matches(['\n', '\r']);
                if line == "." {
                    break;
                }
                content.push(line.to_string());
            }
            apply_edit(manager, &content.join("\n"), out)?;
        }
        "yes" => {
            if !session.pending_delete {
                writeln!(out, "Nothing to confirm.")?;
            } else {
                session.pending_delete = false;
                let outcome = manager.delete_current_note(true)?;
                print_delete(&outcome, session, out)?;
            }
        }
        "skip-confirm" => {
            let skip = match rest {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => {
                    writeln!(out, "Usage: skip-confirm on|off")?;
                    return Ok(());
                }
            };
            manager.set_skip_delete_confirmation(skip)?;
            writeln!(out, "Delete confirmation {}.", if skip { "off" } else { "on" })?;
        }
        "export" => match manager.export_current_note() {
            Some(export) => write_export(&export, rest, out)?,
            None => writeln!(out, "No note selected.")?,
        },
        "search" => print_search(manager, rest, out)?,
        "stats" => match manager.current_note() {
            Some(_) => writeln!(out, "{}", manager.editor_state().stats)?,
            None => writeln!(out, "No note selected.")?,
        },
        "palette" => {
            for command in palette(rest) {
                writeln!(out, "  {:<16} {}", command.label(), command.shortcut())?;
            }
        }
        other => match Command::from_shortcut(other) {
            Some(command) => run_command(manager, session, command, out)?,
            None => writeln!(out, "Unknown command: {} (try 'help')", other)?,
        },
    }
    Ok(())
}

fn run_command<S: Storage, C: Clock, W: Write>(
    manager: &mut NotesManager<S, C>,
    session: &mut Session,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match manager.execute(command)? {
        CommandOutcome::Editor(editor) => print_editor(manager, &editor, out)?,
        CommandOutcome::Delete(outcome) => print_delete(&outcome, session, out)?,
        CommandOutcome::Preview(Some(html)) => writeln!(out, "{}", html.trim_end())?,
        CommandOutcome::Preview(None) => {
            if manager.preview_visible() {
                writeln!(out, "Preview on (no note selected).")?;
            } else {
                writeln!(out, "Preview off.")?;
            }
        }
        CommandOutcome::Export(Some(export)) => write_export(&export, "", out)?,
        CommandOutcome::Export(None) => writeln!(out, "No note selected.")?,
        CommandOutcome::Palette(commands) => {
            for command in commands {
                writeln!(out, "  {:<16} {}", command.label(), command.shortcut())?;
            }
        }
        CommandOutcome::Nothing => writeln!(out, "No notes.")?,
    }
    Ok(())
}

fn apply_edit<S: Storage, C: Clock, W: Write>(
    manager: &mut NotesManager<S, C>,
    text: &str,
    out: &mut W,
) -> Result<()> {
    match manager.edit_content(text)? {
        Some(outcome) => {
            let mut status = format!("Saved '{}'. {}", outcome.note.title, outcome.stats);
            if let Some(wpm) = outcome.words_per_minute {
                status.push_str(&format!(" | {:.0} wpm", wpm));
            }
            writeln!(out, "{}", status)?;
        }
        None => writeln!(out, "No note selected.")?,
    }
    Ok(())
}

fn print_list<S: Storage, C: Clock, W: Write>(
    manager: &NotesManager<S, C>,
    out: &mut W,
) -> Result<()> {
    let entries = manager.notes_list();
    if entries.is_empty() {
        writeln!(out, "No notes.")?;
    }
    for (i, entry) in entries.iter().enumerate() {
        let marker = if entry.selected { '*' } else { ' ' };
        writeln!(out, "{} {:03} ({}) - {}", marker, i + 1, entry.id, entry.title)?;
    }
    Ok(())
}

fn print_editor<S: Storage, C: Clock, W: Write>(
    manager: &NotesManager<S, C>,
    editor: &EditorState,
    out: &mut W,
) -> Result<()> {
    let Some(note) = manager.current_note() else {
        writeln!(out, "No note selected.")?;
        return Ok(());
    };

    let position = manager.store().position(&note.id).map_or(0, |p| p + 1);
    writeln!(out, "{}", note_line(position, note))?;
    if let Some(at) = editor.last_modified {
        writeln!(out, "Last modified: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    writeln!(out, "{}", editor.stats)?;
    if !editor.content.is_empty() {
        writeln!(out, "{}", editor.content)?;
    }
    if manager.preview_visible() {
        if let Some(html) = manager.preview_html() {
            writeln!(out, "{}", html.trim_end())?;
        }
    }
    Ok(())
}

fn print_delete<W: Write>(outcome: &DeleteOutcome, session: &mut Session, out: &mut W) -> Result<()> {
    match outcome {
        DeleteOutcome::NothingSelected => writeln!(out, "No note selected.")?,
        DeleteOutcome::NeedsConfirmation(note) => {
            session.pending_delete = true;
            writeln!(out, "Delete '{}'? Type 'yes' to confirm.", note.title)?;
        }
        DeleteOutcome::Deleted(note) => writeln!(out, "Deleted '{}'.", note.title)?,
    }
    Ok(())
}

fn print_search<S: Storage, C: Clock, W: Write>(
    manager: &NotesManager<S, C>,
    query: &str,
    out: &mut W,
) -> Result<()> {
    match manager.filter(query) {
        SearchResults::NoFilter => writeln!(out, "Usage: search <query>")?,
        SearchResults::Matches(notes) if notes.is_empty() => writeln!(out, "No matches found")?,
        SearchResults::Matches(notes) => {
            for note in notes {
                let position = manager.store().position(&note.id).map_or(0, |p| p + 1);
                writeln!(out, "  {:03} {} - {}", position, note.title, snippet(&note.content))?;
            }
        }
    }
    Ok(())
}

fn write_export<W: Write>(export: &ExportFile, dir: &str, out: &mut W) -> Result<()> {
    let dir = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };
    let path = export.write_to(dir)?;
    writeln!(out, "Exported to {}", path.display())?;
    Ok(())
}
