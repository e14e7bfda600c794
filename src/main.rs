use clap::Parser;
use notekeeper::cli::{
    handle_commands, handle_delete, handle_edit, handle_export, handle_init, handle_list,
    handle_new, handle_prefs, handle_preview, handle_search, handle_shell, handle_show,
    handle_stats, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notekeeper=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let dir = cli.dir;

    let result = match cli.command {
        Commands::Init => handle_init(dir),
        Commands::New { stdin, json } => handle_new(dir, stdin, json),
        Commands::List { json } => handle_list(dir, json),
        Commands::Show { id, json } => handle_show(dir, id, json),
        Commands::Edit {
            id,
            stdin,
            content,
            json,
        } => handle_edit(dir, id, stdin, content, json),
        Commands::Delete { id, force } => handle_delete(dir, id, force),
        Commands::Search { query, json } => handle_search(dir, query, json),
        Commands::Preview { id } => handle_preview(dir, id),
        Commands::Export { id, out } => handle_export(dir, id, out),
        Commands::Stats { id, json } => handle_stats(dir, id, json),
        Commands::Prefs {
            skip_delete_confirmation,
        } => handle_prefs(dir, skip_delete_confirmation),
        Commands::Commands { query } => handle_commands(query),
        Commands::Shell => handle_shell(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
