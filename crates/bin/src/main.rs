use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("accord=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli),
        Commands::Put(args) => commands::put::run(args, &cli),
        Commands::Show(args) => commands::show::run(args, &cli),
        Commands::Info(args) => commands::info::run(args, &cli),
        Commands::History(args) => commands::history::run(args, &cli),
        Commands::Merge(args) => commands::merge::run(args, &cli),
        Commands::Sync(args) => commands::sync::run(args, &cli),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
