use crate::candidates::{DEFAULT_COUNT, Exclusion, GenerationParams};
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_MANIFEST: &str = "package.json";
pub const DEFAULT_JSON_VERSION_KEY: &str = "version";
pub const DEFAULT_TOML_VERSION_KEY: &str = "package.version";
pub const CONFIG_FILE_NAMES: [&str; 2] = ["version-cli.toml", ".version-cli.toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    pub fn default_version_key(self) -> &'static str {
        match self {
            Self::Json => DEFAULT_JSON_VERSION_KEY,
            Self::Toml => DEFAULT_TOML_VERSION_KEY,
        }
    }

    fn detect(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => bail!(
                "Cannot infer file format for `{}`. Set `format` to `json` or `toml` in the \
                 config file.",
                path.display()
            ),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for ManifestFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => bail!("Unsupported manifest format `{other}`. Expected `json` or `toml`."),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Discovered(PathBuf),
    Defaulted,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Discovered(path) => Some(path.as_path()),
            Self::Defaulted => None,
        }
    }
}

/// Where the version lives and how to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
    pub path: PathBuf,
    pub format: ManifestFormat,
    pub version_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSettings {
    pub path: Option<PathBuf>,
    pub format: Option<ManifestFormat>,
    pub version_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub manifest: ManifestSettings,
    pub generation: GenerationParams,
    pub source: ConfigSource,
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    /// Manifest location, with a command-line path taking precedence.
    pub fn manifest_config(&self, path_override: Option<&Path>) -> Result<ManifestConfig> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => self
                .manifest
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
        };

        let format = match self.manifest.format {
            Some(format) => format,
            None => ManifestFormat::detect(&path)?,
        };

        let version_key = self
            .manifest
            .version_key
            .clone()
            .unwrap_or_else(|| format.default_version_key().to_string());

        Ok(ManifestConfig {
            path,
            format,
            version_key,
        })
    }

    /// Generation parameters with command-line values layered over the config.
    pub fn generation_params(
        &self,
        count: Option<i64>,
        exclude: Option<Exclusion>,
        major_count: Option<usize>,
    ) -> Result<GenerationParams> {
        let base = &self.generation;
        let params = match count {
            Some(count) => GenerationParams::from_signed(count, base.exclude())?,
            None => *base,
        };
        let params = GenerationParams::new(params.count(), exclude.unwrap_or(base.exclude()))?;
        let params = params.with_major_count(major_count.unwrap_or(base.major_count()))?;
        Ok(params)
    }
}

#[derive(Debug, facet::Facet)]
struct RawConfig {
    manifest: Option<String>,
    version_key: Option<String>,
    format: Option<String>,
    count: Option<i64>,
    exclude: Option<String>,
    major_count: Option<i64>,
}

pub fn load(explicit_path: Option<&Path>, cwd: &Path) -> Result<ResolvedConfig> {
    let config_location = resolve_config_location(explicit_path, cwd)?;

    let (source, raw_contents) = match config_location {
        Some((path, true)) => (
            ConfigSource::Explicit(path.clone()),
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file `{}`.", path.display()))?,
        ),
        Some((path, false)) => (
            ConfigSource::Discovered(path.clone()),
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file `{}`.", path.display()))?,
        ),
        None => {
            return Ok(ResolvedConfig {
                manifest: ManifestSettings::default(),
                generation: GenerationParams::default(),
                source: ConfigSource::Defaulted,
                warnings: Vec::new(),
            });
        }
    };

    let config_path = source.path().map(Path::to_path_buf).unwrap_or_default();
    let parsed_toml = raw_contents.parse::<toml::Value>().with_context(|| {
        format!(
            "Config file `{}` is not valid TOML.",
            config_path.display()
        )
    })?;
    let warnings = collect_warnings(&parsed_toml);

    let raw: RawConfig = facet_toml::from_str(&raw_contents).with_context(|| {
        format!(
            "Config file `{}` has unsupported value types.",
            config_path.display()
        )
    })?;

    let manifest = resolve_manifest_settings(&raw)?;
    let generation = resolve_generation(&raw)?;

    Ok(ResolvedConfig {
        manifest,
        generation,
        source,
        warnings,
    })
}

fn resolve_manifest_settings(raw: &RawConfig) -> Result<ManifestSettings> {
    let path = match raw.manifest.as_deref() {
        Some(value) => Some(PathBuf::from(normalize_relative_path(value, "`manifest`")?)),
        None => None,
    };

    let format = match raw.format.as_deref() {
        Some(value) => Some(ManifestFormat::from_str(value)?),
        None => None,
    };

    let version_key = match raw.version_key.as_deref() {
        Some(value) => Some(normalize_dot_path(value)?),
        None => None,
    };

    Ok(ManifestSettings {
        path,
        format,
        version_key,
    })
}

fn resolve_generation(raw: &RawConfig) -> Result<GenerationParams> {
    let exclude = match raw.exclude.as_deref() {
        Some(value) => Exclusion::from_str(value).context("Invalid `exclude` in config.")?,
        None => Exclusion::default(),
    };

    let count = raw.count.unwrap_or(DEFAULT_COUNT as i64);
    let params =
        GenerationParams::from_signed(count, exclude).context("Invalid `count` in config.")?;

    let major_count = match raw.major_count {
        Some(value) => match usize::try_from(value) {
            Ok(value) => value,
            Err(_) => bail!("`major_count` cannot be negative."),
        },
        None => 0,
    };

    params
        .with_major_count(major_count)
        .context("Invalid `major_count` in config.")
}

fn normalize_relative_path(value: &str, label: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{label} cannot be empty.");
    }

    let path = Path::new(trimmed);
    if path.is_absolute() {
        bail!("{label} `{trimmed}` must be relative to the project directory.");
    }

    for component in path.components() {
        match component {
            Component::CurDir | Component::Normal(_) => {}
            Component::ParentDir => {
                bail!("{label} `{trimmed}` cannot contain `..`.");
            }
            Component::RootDir | Component::Prefix(_) => {
                bail!("{label} `{trimmed}` must be relative to the project directory.");
            }
        }
    }

    Ok(trimmed.to_string())
}

fn normalize_dot_path(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("`version_key` cannot be empty.");
    }

    if trimmed.split('.').any(|segment| segment.trim().is_empty()) {
        bail!("`version_key` `{trimmed}` is invalid. Use dot-separated non-empty segments.");
    }

    Ok(trimmed.to_string())
}

fn collect_warnings(parsed: &toml::Value) -> Vec<String> {
    let Some(root) = parsed.as_table() else {
        return Vec::new();
    };

    let allowed: BTreeSet<&str> = BTreeSet::from([
        "manifest",
        "version_key",
        "format",
        "count",
        "exclude",
        "major_count",
    ]);
    root.keys()
        .filter(|key| !allowed.contains(key.as_str()))
        .map(|key| format!("Unknown config key `{key}` was ignored."))
        .collect()
}

fn resolve_config_location(
    explicit_path: Option<&Path>,
    cwd: &Path,
) -> Result<Option<(PathBuf, bool)>> {
    if let Some(explicit) = explicit_path {
        if !explicit.exists() {
            bail!(
                "Config file `{}` was not found. Pass a valid path with `--config`.",
                explicit.display()
            );
        }
        return Ok(Some((explicit.to_path_buf(), true)));
    }

    for candidate in CONFIG_FILE_NAMES {
        let path = cwd.join(candidate);
        if path.exists() {
            return Ok(Some((path, false)));
        }
    }

    Ok(None)
}
