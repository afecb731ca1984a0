mod api;
mod app;
mod cli;
mod composer;
mod endpoints;
mod error;
mod fmt;
mod models;
mod nav;
mod page;
mod router;
mod session;
mod settings;
mod storage;
mod table;
mod tui;
mod view;
mod views;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Log to a file in the config directory; the terminal belongs to the UI.
/// RUST_LOG wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let path = settings::log_path();
    if let Some(dir) = path.parent() {
        if std::fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&settings::load_settings().log_level);

    let command = cli.command.unwrap_or(Commands::Open { fragment: None });
    let result = match command {
        Commands::Open { fragment } => cli::open::run(fragment),
        Commands::Login { email } => cli::login::run(&email),
        Commands::Logout => cli::logout::run(),
        Commands::ResetPassword { email } => cli::login::reset(&email),
        Commands::Status => cli::status::run(),
        Commands::Entity { id } => cli::entity::run(id.as_deref()),
        Commands::Tree { key } => cli::tree::run(&key),
        Commands::Journal {
            max_rows,
            from_date,
            to_date,
            account,
        } => cli::journal::run(max_rows, from_date, to_date, account),
        Commands::Config {
            base_uri,
            log_level,
        } => cli::config::run(base_uri, log_level),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ledgerdesk", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
