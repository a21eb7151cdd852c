mod add;
mod candidates;
mod cli;
mod config;
mod delete;
mod init;
mod manifest;
mod prompt;
mod show;
mod version;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Add(args) => add::run(args),
        Commands::Delete(args) => delete::run(args),
        Commands::Show(args) => show::run_show(args),
        Commands::List(args) => show::run_list(args),
    }
}
