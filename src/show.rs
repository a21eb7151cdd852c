use crate::candidates;
use crate::cli::{ListArgs, ShowArgs};
use crate::config;
use crate::manifest::Manifest;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_show(args: ShowArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory.")?;
    let version = current_version(
        &cwd,
        args.common.config.as_deref(),
        args.common.manifest.as_deref(),
    )?;
    println!("{version}");
    Ok(())
}

pub fn run_list(args: ListArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory.")?;
    let generation = args.generation;
    let candidates = list_candidates(
        &cwd,
        args.common.config.as_deref(),
        args.common.manifest.as_deref(),
        generation.count,
        generation.exclude,
        generation.majors,
    )?;
    for candidate in candidates {
        println!("{candidate}");
    }
    Ok(())
}

pub(crate) fn current_version(
    repo_root: &Path,
    config_path: Option<&Path>,
    manifest_path: Option<&Path>,
) -> Result<String> {
    let config = config::load(config_path, repo_root)?;
    for warning in &config.warnings {
        eprintln!("warning: {warning}");
    }

    let manifest = Manifest::open(repo_root, &config.manifest_config(manifest_path)?)?;
    manifest.current_version()
}

pub(crate) fn list_candidates(
    repo_root: &Path,
    config_path: Option<&Path>,
    manifest_path: Option<&Path>,
    count: Option<i64>,
    exclude: Option<candidates::Exclusion>,
    majors: Option<usize>,
) -> Result<Vec<String>> {
    let config = config::load(config_path, repo_root)?;
    for warning in &config.warnings {
        eprintln!("warning: {warning}");
    }

    let params = config.generation_params(count, exclude, majors)?;
    let manifest = Manifest::open(repo_root, &config.manifest_config(manifest_path)?)?;
    let current = manifest.current_version()?;
    Ok(candidates::build_candidates(&current, &params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::Exclusion;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn shows_version_from_nested_toml_key() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[workspace.package]\nversion = \"4.1.0\"\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("version-cli.toml"),
            "manifest = \"Cargo.toml\"\nversion_key = \"workspace.package.version\"\n",
        )
        .unwrap();

        let version = current_version(temp_dir.path(), None, None).unwrap();
        assert_eq!(version, "4.1.0");
    }

    #[test]
    fn lists_candidates_with_overrides() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("package.json"),
            "{ \"version\": \"1.0.6-beta.2\" }",
        )
        .unwrap();

        let candidates = list_candidates(
            temp_dir.path(),
            None,
            None,
            Some(4),
            Some(Exclusion::Nothing),
            Some(1),
        )
        .unwrap();
        assert_eq!(
            candidates,
            vec![
                "2.0.6",
                "1.0.6-beta.1",
                "1.0.6-beta.0",
                "1.0.7",
                "1.0.8",
                "1.1.0",
                "1.2.0",
            ]
        );
    }

    #[test]
    fn invalid_version_is_reported() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("package.json"),
            "{ \"version\": \"latest\" }",
        )
        .unwrap();

        let err = list_candidates(temp_dir.path(), None, None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("Invalid version format"));
    }
}
