use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "notekeeper")]
#[command(version, about = "Keep short markdown notes from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the nearest .notekeeper/ above the current directory)
    #[arg(long, global = true, env = "NOTEKEEPER_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a notekeeper data directory here
    Init,

    /// Create a new note
    New {
        /// Read the note's content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes in order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a note
    Show {
        /// Note position (like "2") or id prefix
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a note's content
    Edit {
        /// Note position (like "2") or id prefix
        id: String,

        /// Read the new content from stdin
        #[arg(long, conflicts_with = "content")]
        stdin: bool,

        /// New content
        #[arg(long, short = 'c')]
        content: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note position (like "2") or id prefix
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Search titles and content
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a note's markdown as HTML
    Preview {
        /// Note position (like "2") or id prefix
        id: String,
    },

    /// Export a note to <title>.txt
    Export {
        /// Note position (like "2") or id prefix
        id: String,

        /// Directory to write into
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,
    },

    /// Word, character and line counts for a note
    Stats {
        /// Note position (like "2") or id prefix
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change preferences
    Prefs {
        /// Delete without asking for confirmation
        #[arg(long, value_name = "BOOL")]
        skip_delete_confirmation: Option<bool>,
    },

    /// List commands and their keyboard shortcuts
    Commands {
        /// Only show commands whose label contains this text
        query: Option<String>,
    },

    /// Interactive session reading commands from stdin
    Shell,
}
