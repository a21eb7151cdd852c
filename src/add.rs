use crate::cli::AddArgs;
use crate::config;
use crate::manifest::{self, Manifest};
use crate::prompt::{CliInteractor, Interactor};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub config_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub version: Option<String>,
    pub dry_run: bool,
}

pub fn run(args: AddArgs) -> Result<()> {
    let options = AddOptions {
        config_path: args.common.config,
        manifest_path: args.common.manifest,
        version: args.version,
        dry_run: args.dry_run,
    };

    let cwd = std::env::current_dir().context("Failed to determine current directory.")?;
    let mut interactor = CliInteractor;
    run_with_interactor(&cwd, &options, &mut interactor)
}

pub(crate) fn run_with_interactor(
    repo_root: &Path,
    options: &AddOptions,
    interactor: &mut dyn Interactor,
) -> Result<()> {
    let config = config::load(options.config_path.as_deref(), repo_root)?;
    for warning in &config.warnings {
        eprintln!("warning: {warning}");
    }

    let manifest_config = config.manifest_config(options.manifest_path.as_deref())?;
    let mut manifest = Manifest::open(repo_root, &manifest_config)?;
    let current = manifest.find_version()?.unwrap_or_default();

    let next_version = match options.version.as_deref() {
        Some(raw) => validate_manual_version(raw)?,
        None => prompt_manual_version(&current, interactor)?,
    };

    apply_version(&mut manifest, &current, &next_version, options.dry_run)
}

/// Manual entries accept any semantic version, not just the generated forms.
pub(crate) fn validate_manual_version(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Version cannot be empty.");
    }
    semver::Version::parse(trimmed)
        .with_context(|| format!("`{trimmed}` is not a valid semantic version."))?;
    Ok(trimmed.to_string())
}

pub(crate) fn prompt_manual_version(
    current: &str,
    interactor: &mut dyn Interactor,
) -> Result<String> {
    let entered = interactor.input_version(current)?;
    validate_manual_version(&entered)
}

pub(crate) fn apply_version(
    manifest: &mut Manifest,
    current: &str,
    next_version: &str,
    dry_run: bool,
) -> Result<()> {
    let path = manifest.display_path().to_path_buf();

    if dry_run {
        let rendered = manifest.render_with_version(next_version)?;
        println!(
            "Dry run: would set `{}` to {next_version}",
            path.display()
        );
        manifest::print_diff(manifest.content(), &rendered);
        return Ok(());
    }

    if manifest.write(next_version)? {
        info!(from = current, to = next_version, manifest = %path.display(), "version written");
        println!("Updated `{}` to {next_version}", path.display());
    } else {
        println!("`{}` is already at {next_version}.", path.display());
    }
    Ok(())
}
