use crate::candidates::Exclusion;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "version-cli",
    version,
    about = "Suggest the next version for a project and write it to its manifest"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Pick the next version from generated candidates.
    Init(InitArgs),
    /// Enter the next version manually.
    Add(AddArgs),
    /// Remove the version field from the manifest.
    Delete(DeleteArgs),
    /// Print the current version.
    Show(ShowArgs),
    /// Print candidate versions without prompting.
    List(ListArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Path to a config file. Defaults to version-cli.toml, then .version-cli.toml in current directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Manifest holding the version. Defaults to package.json.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerationArgs {
    /// Number of candidates to generate. Beta uses all of it, patch and minor half each.
    #[arg(long, allow_negative_numbers = true)]
    pub count: Option<i64>,
    /// Candidate kind to leave out: `beta` or `none`.
    #[arg(long)]
    pub exclude: Option<Exclusion>,
    /// Number of major bumps to offer.
    #[arg(long)]
    pub majors: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(flatten)]
    pub generation: GenerationArgs,
    /// Show what would change without writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Version to write. Prompts when omitted.
    pub version: Option<String>,
    /// Show what would change without writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Delete without asking for confirmation.
    #[arg(long)]
    pub yes: bool,
    /// Show what would change without writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(flatten)]
    pub generation: GenerationArgs,
}
