use crate::add;
use crate::candidates::{self, Exclusion};
use crate::cli::{GenerationArgs, InitArgs};
use crate::config;
use crate::manifest::Manifest;
use crate::prompt::{CliInteractor, Interactor, Selection};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub config_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub count: Option<i64>,
    pub exclude: Option<Exclusion>,
    pub majors: Option<usize>,
    pub dry_run: bool,
}

impl InitOptions {
    fn from_args(args: InitArgs) -> Self {
        let GenerationArgs {
            count,
            exclude,
            majors,
        } = args.generation;
        Self {
            config_path: args.common.config,
            manifest_path: args.common.manifest,
            count,
            exclude,
            majors,
            dry_run: args.dry_run,
        }
    }
}

pub fn run(args: InitArgs) -> Result<()> {
    let options = InitOptions::from_args(args);
    let cwd = std::env::current_dir().context("Failed to determine current directory.")?;
    let mut interactor = CliInteractor;
    run_with_interactor(&cwd, &options, &mut interactor)
}

pub(crate) fn run_with_interactor(
    repo_root: &Path,
    options: &InitOptions,
    interactor: &mut dyn Interactor,
) -> Result<()> {
    let config = config::load(options.config_path.as_deref(), repo_root)?;
    for warning in &config.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(path) = config.source.path() {
        info!(config = %path.display(), "loaded config");
    }

    let params = config.generation_params(options.count, options.exclude, options.majors)?;
    let manifest_config = config.manifest_config(options.manifest_path.as_deref())?;
    let mut manifest = Manifest::open(repo_root, &manifest_config)?;

    let current = manifest.current_version()?;
    let candidates = candidates::build_candidates(&current, &params).with_context(|| {
        format!(
            "Version `{current}` in `{}` does not follow `MAJOR.MINOR.PATCH[-beta.N]`.",
            manifest.display_path().display()
        )
    })?;
    if candidates.is_empty() {
        bail!("No candidate versions could be generated from `{current}`.");
    }

    let next_version = match interactor.select_version(&current, &candidates)? {
        Selection::Candidate(version) => version,
        Selection::Manual => add::prompt_manual_version(&current, interactor)?,
    };

    add::apply_version(&mut manifest, &current, &next_version, options.dry_run)
}
