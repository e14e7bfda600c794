mod commands;
mod handlers;
mod shell;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_commands, handle_delete, handle_edit, handle_export, handle_init, handle_list,
    handle_new, handle_prefs, handle_preview, handle_search, handle_show, handle_stats,
};
pub use shell::{handle_shell, run_shell};
