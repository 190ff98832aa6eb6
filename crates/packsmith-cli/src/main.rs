//! Packsmith CLI - Import free-form card text as structured card packages.

use clap::Parser;
use packsmith_cli::commands;
use packsmith_cli::{Cli, Command, FileConfigStore, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        let formatter = Formatter::new(packsmith_cli::config::OutputFormat::Table, false);
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> packsmith_cli::Result<()> {
    let store = match cli.config {
        Some(path) => FileConfigStore::new(path),
        None => FileConfigStore::default_location()?,
    };
    let config = store.load_config()?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Import(args) => commands::execute_import(args, &store, &formatter).await,
        Command::Config(args) => commands::execute_config(args, &store, &formatter).await,
    }
}
