//! The command surface: every action a front end can trigger, its label in
//! the command palette and its keyboard shortcut.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    NewNote,
    DeleteNote,
    NextNote,
    PreviousNote,
    TogglePreview,
    Export,
    CommandPalette,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::NewNote,
        Command::DeleteNote,
        Command::NextNote,
        Command::PreviousNote,
        Command::TogglePreview,
        Command::Export,
        Command::CommandPalette,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::NewNote => "New Note",
            Command::DeleteNote => "Delete Note",
            Command::NextNote => "Next Note",
            Command::PreviousNote => "Previous Note",
            Command::TogglePreview => "Toggle Preview",
            Command::Export => "Export Note",
            Command::CommandPalette => "Command Palette",
        }
    }

    /// Shortcut in `ctrl+<key>` form. `cmd` is accepted as a synonym.
    pub fn shortcut(self) -> &'static str {
        match self {
            Command::NewNote => "ctrl+e",
            Command::DeleteNote => "ctrl+x",
            Command::NextNote => "ctrl+down",
            Command::PreviousNote => "ctrl+up",
            Command::TogglePreview => "ctrl+p",
            Command::Export => "ctrl+s",
            Command::CommandPalette => "ctrl+k",
        }
    }

    /// Resolve a shortcut string such as `Ctrl+E`, `cmd+ArrowUp` or `ctrl+down`.
    pub fn from_shortcut(input: &str) -> Option<Command> {
        let lowered = input.trim().to_lowercase();
        let (modifier, key) = lowered.split_once('+')?;
        if !matches!(modifier.trim(), "ctrl" | "control" | "cmd" | "meta") {
            return None;
        }

        let key = match key.trim() {
            "arrowup" => "up",
            "arrowdown" => "down",
            other => other,
        };

        Command::ALL
            .into_iter()
            .find(|command| command.shortcut().strip_prefix("ctrl+") == Some(key))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Commands whose label contains `query`, ignoring case. A blank query lists
/// everything.
pub fn palette(query: &str) -> Vec<Command> {
    let needle = query.trim().to_lowercase();
    Command::ALL
        .into_iter()
        .filter(|command| needle.is_empty() || command.label().to_lowercase().contains(&needle))
        .collect()
}
