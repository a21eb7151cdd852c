use crate::cli::DeleteArgs;
use crate::config;
use crate::manifest::{self, Manifest};
use crate::prompt::{CliInteractor, Interactor};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub config_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub yes: bool,
    pub dry_run: bool,
}

pub fn run(args: DeleteArgs) -> Result<()> {
    let options = DeleteOptions {
        config_path: args.common.config,
        manifest_path: args.common.manifest,
        yes: args.yes,
        dry_run: args.dry_run,
    };

    let cwd = std::env::current_dir().context("Failed to determine current directory.")?;
    let mut interactor = CliInteractor;
    run_with_interactor(&cwd, &options, &mut interactor)
}

pub(crate) fn run_with_interactor(
    repo_root: &Path,
    options: &DeleteOptions,
    interactor: &mut dyn Interactor,
) -> Result<()> {
    let config = config::load(options.config_path.as_deref(), repo_root)?;
    for warning in &config.warnings {
        eprintln!("warning: {warning}");
    }

    let manifest_config = config.manifest_config(options.manifest_path.as_deref())?;
    let mut manifest = Manifest::open(repo_root, &manifest_config)?;
    let current = manifest.current_version()?;
    let path = manifest.display_path().to_path_buf();

    if options.dry_run {
        let rendered = manifest.render_without_version()?;
        println!("Dry run: would remove version from `{}`", path.display());
        manifest::print_diff(manifest.content(), &rendered);
        return Ok(());
    }

    if !options.yes && !interactor.confirm_delete(&path, &current)? {
        println!("Kept version {current} in `{}`.", path.display());
        return Ok(());
    }

    manifest.remove_version()?;
    info!(version = %current, manifest = %path.display(), "version removed");
    println!("Removed version {current} from `{}`", path.display());
    Ok(())
}
