use crate::config::{ManifestConfig, ManifestFormat};
use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value as JsonValue;
use similar::TextDiff;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, Value as TomlEditValue};

/// Project file holding the version field.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    display_path: PathBuf,
    format: ManifestFormat,
    key_path: Vec<String>,
    content: String,
}

impl Manifest {
    pub fn open(repo_root: &Path, config: &ManifestConfig) -> Result<Self> {
        let path = repo_root.join(&config.path);
        if !path.exists() {
            bail!("Manifest `{}` was not found.", config.path.display());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read `{}`.", config.path.display()))?;

        Ok(Self {
            path,
            display_path: config.path.clone(),
            format: config.format,
            key_path: config
                .version_key
                .split('.')
                .map(|segment| segment.trim().to_string())
                .collect(),
            content,
        })
    }

    pub fn display_path(&self) -> &Path {
        &self.display_path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn key_label(&self) -> String {
        self.key_path.join(".")
    }

    pub fn current_version(&self) -> Result<String> {
        self.find_version()?.ok_or_else(|| {
            anyhow!(
                "Key `{}` was not found in `{}`.",
                self.key_label(),
                self.display_path.display()
            )
        })
    }

    /// The version string, or `None` when the key is absent. A present
    /// value that is not a string is an error.
    pub fn find_version(&self) -> Result<Option<String>> {
        let found = match self.format {
            ManifestFormat::Json => {
                let value = self.parse_json()?;
                self.key_path
                    .iter()
                    .try_fold(&value, |node, key| node.as_object()?.get(key))
                    .map(|found| found.as_str().map(str::to_string))
            }
            ManifestFormat::Toml => {
                let document = self.parse_toml()?;
                toml_item_at_path(document.as_item(), &self.key_path)
                    .map(|item| item.as_str().map(str::to_string))
            }
        };

        found
            .map(|version| {
                version.ok_or_else(|| {
                    anyhow!(
                        "Key `{}` in `{}` is not a string.",
                        self.key_label(),
                        self.display_path.display()
                    )
                })
            })
            .transpose()
    }

    /// Manifest text with the version field set to `next_version`.
    pub fn render_with_version(&self, next_version: &str) -> Result<String> {
        match self.format {
            ManifestFormat::Json => {
                let mut value = self.parse_json()?;
                let (parent_keys, leaf) = self.split_key_path()?;
                let parent = json_object_at_path_mut(&mut value, parent_keys).ok_or_else(|| {
                    anyhow!(
                        "Key `{}` was not found in `{}`.",
                        self.key_label(),
                        self.display_path.display()
                    )
                })?;
                match parent.get_mut(leaf) {
                    Some(existing) if existing.is_string() || existing.is_null() => {
                        *existing = JsonValue::String(next_version.to_string());
                    }
                    Some(_) => bail!(
                        "Key `{}` matched a non-string JSON value in `{}`.",
                        self.key_label(),
                        self.display_path.display()
                    ),
                    None => {
                        parent.insert(
                            leaf.to_string(),
                            JsonValue::String(next_version.to_string()),
                        );
                    }
                }
                self.serialize_json(&value)
            }
            ManifestFormat::Toml => {
                let mut document = self.parse_toml()?;
                let (parent_keys, leaf) = self.split_key_path()?;
                let parent = toml_table_at_path_mut(document.as_item_mut(), parent_keys)
                    .ok_or_else(|| {
                        anyhow!(
                            "Key `{}` was not found in `{}`.",
                            self.key_label(),
                            self.display_path.display()
                        )
                    })?;
                match parent.get_mut(leaf) {
                    Some(existing) => {
                        let Some(value) = existing.as_value_mut().filter(|value| value.is_str())
                        else {
                            bail!(
                                "Key `{}` matched a non-string TOML value in `{}`.",
                                self.key_label(),
                                self.display_path.display()
                            );
                        };
                        let decor = value.decor().clone();
                        *value = TomlEditValue::from(next_version);
                        *value.decor_mut() = decor;
                    }
                    None => {
                        parent.insert(leaf, TomlEditValue::from(next_version).into());
                    }
                }
                Ok(finish_toml(document.to_string()))
            }
        }
    }

    /// Manifest text with the version field removed.
    pub fn render_without_version(&self) -> Result<String> {
        let (parent_keys, leaf) = self.split_key_path()?;
        let removed = match self.format {
            ManifestFormat::Json => {
                let mut value = self.parse_json()?;
                let removed = json_object_at_path_mut(&mut value, parent_keys)
                    .and_then(|parent| parent.shift_remove(leaf))
                    .is_some();
                removed.then(|| self.serialize_json(&value)).transpose()?
            }
            ManifestFormat::Toml => {
                let mut document = self.parse_toml()?;
                let removed = toml_table_at_path_mut(document.as_item_mut(), parent_keys)
                    .and_then(|parent| parent.remove(leaf))
                    .is_some();
                removed.then(|| finish_toml(document.to_string()))
            }
        };

        removed.ok_or_else(|| {
            anyhow!(
                "Key `{}` was not found in `{}`.",
                self.key_label(),
                self.display_path.display()
            )
        })
    }

    /// Writes `next_version` into the manifest. Returns `false` when the
    /// file already holds that value.
    pub fn write(&mut self, next_version: &str) -> Result<bool> {
        let rendered = self.render_with_version(next_version)?;
        self.persist(rendered)
    }

    pub fn remove_version(&mut self) -> Result<bool> {
        let rendered = self.render_without_version()?;
        self.persist(rendered)
    }

    fn persist(&mut self, rendered: String) -> Result<bool> {
        if rendered == self.content {
            return Ok(false);
        }
        fs::write(&self.path, &rendered)
            .with_context(|| format!("Failed to write `{}`.", self.display_path.display()))?;
        self.content = rendered;
        Ok(true)
    }

    fn split_key_path(&self) -> Result<(&[String], &str)> {
        match self.key_path.split_last() {
            Some((leaf, parents)) if !leaf.is_empty() => Ok((parents, leaf.as_str())),
            _ => bail!("Version key path cannot be empty."),
        }
    }

    fn parse_json(&self) -> Result<JsonValue> {
        serde_json::from_str(&self.content).with_context(|| {
            format!(
                "Failed to parse JSON file `{}`.",
                self.display_path.display()
            )
        })
    }

    fn serialize_json(&self, value: &JsonValue) -> Result<String> {
        let mut output = serde_json::to_string_pretty(value).with_context(|| {
            format!(
                "Failed to serialize JSON file `{}`.",
                self.display_path.display()
            )
        })?;
        output.push('\n');
        Ok(output)
    }

    fn parse_toml(&self) -> Result<DocumentMut> {
        self.content.parse::<DocumentMut>().with_context(|| {
            format!(
                "Failed to parse TOML file `{}`.",
                self.display_path.display()
            )
        })
    }
}

fn finish_toml(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

fn json_object_at_path_mut<'a>(
    root: &'a mut JsonValue,
    path: &[String],
) -> Option<&'a mut serde_json::Map<String, JsonValue>> {
    let mut current = root;
    for key in path {
        current = current.as_object_mut()?.get_mut(key)?;
    }
    current.as_object_mut()
}

fn toml_item_at_path<'a>(root: &'a Item, path: &[String]) -> Option<&'a Item> {
    let mut current = root;
    for key in path {
        current = current.as_table_like()?.get(key)?;
    }
    Some(current)
}

fn toml_table_at_path_mut<'a>(
    root: &'a mut Item,
    path: &[String],
) -> Option<&'a mut dyn toml_edit::TableLike> {
    let mut current = root;
    for key in path {
        current = current.as_table_like_mut()?.get_mut(key)?;
    }
    current.as_table_like_mut()
}

pub fn print_diff(before: &str, after: &str) {
    let diff = TextDiff::from_lines(before, after);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("current", "proposed")
        .to_string();

    if unified.trim().is_empty() {
        println!("No textual diff.");
    } else {
        println!("{unified}");
    }
}
