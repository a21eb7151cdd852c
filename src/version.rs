use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BETA_TAG: &str = "beta";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("Invalid version format `{input}`: {reason}")]
    InvalidVersionFormat { input: String, reason: String },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl CandidateError {
    fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidVersionFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Pre-release component. Only `beta` is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prerelease {
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<Prerelease>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    pub fn with_beta(mut self, number: u64) -> Self {
        self.pre = Some(Prerelease { number });
        self
    }

    /// Parses `MAJOR.MINOR.PATCH` or `MAJOR.MINOR.PATCH-beta[.N]`.
    ///
    /// The beta suffix rides on the patch segment (`"3-beta"`) and the
    /// trailing dot segment holds its number, defaulting to 0 when absent.
    pub fn parse(input: &str) -> Result<Self, CandidateError> {
        let trimmed = input.trim();
        let segments: Vec<&str> = trimmed.split('.').collect();
        if segments.len() < 3 {
            return Err(CandidateError::format(
                input,
                "expected at least `MAJOR.MINOR.PATCH`",
            ));
        }

        let major = parse_component(input, segments[0], "major")?;
        let minor = parse_component(input, segments[1], "minor")?;

        let patch_segment = segments[2];
        if !patch_segment.contains(BETA_TAG) {
            if segments.len() > 3 {
                return Err(CandidateError::format(
                    input,
                    "extra segments are only allowed after a `-beta` suffix",
                ));
            }
            let patch = parse_component(input, patch_segment, "patch")?;
            return Ok(Self::new(major, minor, patch));
        }

        if segments.len() > 4 {
            return Err(CandidateError::format(
                input,
                "expected at most `MAJOR.MINOR.PATCH-beta.N`",
            ));
        }

        let Some((raw_patch, tag)) = patch_segment.split_once('-') else {
            return Err(CandidateError::format(
                input,
                format!("patch segment `{patch_segment}` must look like `PATCH-beta`"),
            ));
        };
        if tag != BETA_TAG {
            return Err(CandidateError::format(
                input,
                format!("unsupported pre-release identifier `{tag}`"),
            ));
        }
        let patch = parse_component(input, raw_patch, "patch")?;

        let number = match segments.get(3).map(|value| value.trim()) {
            None | Some("") => 0,
            Some(raw) => parse_component(input, raw, "beta number")?,
        };

        Ok(Self::new(major, minor, patch).with_beta(number))
    }

    pub fn beta_number(&self) -> Option<u64> {
        self.pre.map(|pre| pre.number)
    }

    /// `MAJOR.MINOR.PATCH` without any pre-release suffix.
    pub fn core(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn parse_component(input: &str, raw: &str, label: &str) -> Result<u64, CandidateError> {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CandidateError::format(
            input,
            format!("{label} component `{raw}` is not a non-negative integer"),
        ));
    }
    raw.parse::<u64>()
        .map_err(|err| CandidateError::format(input, format!("{label} component `{raw}`: {err}")))
}

impl FromStr for Version {
    type Err = CandidateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = self.pre {
            write!(f, "-{BETA_TAG}.{}", pre.number)?;
        }
        Ok(())
    }
}
