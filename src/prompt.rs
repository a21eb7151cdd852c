use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

pub const MANUAL_ENTRY_LABEL: &str = "Enter a version manually";

/// What the user picked from the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Candidate(String),
    Manual,
}

pub trait Interactor {
    fn select_version(&mut self, current: &str, candidates: &[String]) -> Result<Selection>;
    fn input_version(&mut self, current: &str) -> Result<String>;
    fn confirm_delete(&mut self, manifest_path: &Path, current: &str) -> Result<bool>;
}

pub struct CliInteractor;

impl Interactor for CliInteractor {
    fn select_version(&mut self, current: &str, candidates: &[String]) -> Result<Selection> {
        let mut items: Vec<&str> = candidates.iter().map(String::as_str).collect();
        items.push(MANUAL_ENTRY_LABEL);

        let selection = Select::new()
            .with_prompt(format!(
                "Current version is {current}. Choose the version to switch to"
            ))
            .items(&items)
            .default(0)
            .interact()
            .context("Failed to read version selection.")?;

        match candidates.get(selection) {
            Some(candidate) => Ok(Selection::Candidate(candidate.clone())),
            None if selection == candidates.len() => Ok(Selection::Manual),
            None => bail!("Invalid version selection."),
        }
    }

    fn input_version(&mut self, current: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(format!("New version (current {current})"))
            .validate_with(|value: &String| -> Result<(), String> {
                semver::Version::parse(value.trim())
                    .map(|_| ())
                    .map_err(|err| format!("`{}` is not a valid version: {err}", value.trim()))
            })
            .interact_text()
            .context("Failed to read version input.")
    }

    fn confirm_delete(&mut self, manifest_path: &Path, current: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(format!(
                "Remove version `{current}` from `{}`?",
                manifest_path.display()
            ))
            .default(false)
            .interact()
            .context("Failed to read delete confirmation.")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct MockInteractor {
        pub selection: Option<Selection>,
        pub inputs: VecDeque<String>,
        pub confirm_answer: bool,
        pub offered: Vec<String>,
        pub select_calls: usize,
        pub input_calls: usize,
        pub confirm_calls: usize,
    }

    impl Interactor for MockInteractor {
        fn select_version(&mut self, _current: &str, candidates: &[String]) -> Result<Selection> {
            self.select_calls += 1;
            self.offered = candidates.to_vec();
            Ok(self
                .selection
                .clone()
                .unwrap_or_else(|| Selection::Candidate(candidates[0].clone())))
        }

        fn input_version(&mut self, _current: &str) -> Result<String> {
            self.input_calls += 1;
            match self.inputs.pop_front() {
                Some(value) => Ok(value),
                None => bail!("No scripted input left."),
            }
        }

        fn confirm_delete(&mut self, _manifest_path: &Path, _current: &str) -> Result<bool> {
            self.confirm_calls += 1;
            Ok(self.confirm_answer)
        }
    }
}
