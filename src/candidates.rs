use crate::version::{CandidateError, Version};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_COUNT: usize = 10;
/// Upper bound for `count` and `major_count`.
pub const MAX_COUNT: usize = 1000;
pub const ROLLOVER_CEILING: u64 = 100;
const BETA_FORWARD_STEPS: usize = 4;

/// Candidate kind that can be left out of generation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exclusion {
    #[default]
    Beta,
    Nothing,
}

impl Exclusion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Nothing => "none",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Exclusion {
    type Err = CandidateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beta" => Ok(Self::Beta),
            "none" => Ok(Self::Nothing),
            other => Err(CandidateError::parameter(
                "exclude",
                format!("unsupported value `{other}`, expected `beta` or `none`"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    count: usize,
    exclude: Exclusion,
    major_count: usize,
}

impl GenerationParams {
    pub fn new(count: usize, exclude: Exclusion) -> Result<Self, CandidateError> {
        if count == 0 {
            return Err(CandidateError::parameter(
                "count",
                "must be a positive integer",
            ));
        }
        check_upper_bound("count", count)?;
        Ok(Self {
            count,
            exclude,
            major_count: 0,
        })
    }

    /// Builds parameters from a signed count as it arrives from config files.
    pub fn from_signed(count: i64, exclude: Exclusion) -> Result<Self, CandidateError> {
        let count = usize::try_from(count).map_err(|_| {
            CandidateError::parameter("count", format!("must be a positive integer, got {count}"))
        })?;
        Self::new(count, exclude)
    }

    /// Number of major bumps to offer. Zero keeps the major group empty.
    pub fn with_major_count(mut self, major_count: usize) -> Result<Self, CandidateError> {
        check_upper_bound("major_count", major_count)?;
        self.major_count = major_count;
        Ok(self)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn exclude(&self) -> Exclusion {
        self.exclude
    }

    pub fn major_count(&self) -> usize {
        self.major_count
    }
}

fn check_upper_bound(name: &'static str, value: usize) -> Result<(), CandidateError> {
    if value > MAX_COUNT {
        return Err(CandidateError::parameter(
            name,
            format!("must be at most {MAX_COUNT}, got {value}"),
        ));
    }
    Ok(())
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            exclude: Exclusion::default(),
            major_count: 0,
        }
    }
}

/// Running `{major, minor, patch}` state for one rollover sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl From<&Version> for Triple {
    fn from(version: &Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
        }
    }
}

/// Steps `minor` up to the ceiling, then carries into `major`.
#[derive(Debug, Clone)]
pub struct MinorSequence {
    state: Triple,
}

impl MinorSequence {
    pub fn new(seed: Triple) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> Triple {
        self.state
    }
}

impl Iterator for MinorSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.state.minor < ROLLOVER_CEILING {
            self.state.minor += 1;
        } else if self.state.minor == ROLLOVER_CEILING {
            self.state.major = self.state.major.saturating_add(1);
            self.state.minor = 0;
        }
        Some(self.state.minor)
    }
}

/// Steps `patch` up to the ceiling, then carries into `minor`.
#[derive(Debug, Clone)]
pub struct PatchSequence {
    state: Triple,
}

impl PatchSequence {
    pub fn new(seed: Triple) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> Triple {
        self.state
    }
}

impl Iterator for PatchSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.state.patch < ROLLOVER_CEILING {
            self.state.patch += 1;
        } else if self.state.patch == ROLLOVER_CEILING {
            self.state.minor = self.state.minor.saturating_add(1);
            self.state.patch = 0;
        }
        Some(self.state.patch)
    }
}

/// Beta numbers around `current`.
///
/// The first four iterations belong to the downward counter whether or not
/// it still has room, so a number close to zero yields fewer than `count`
/// values. The upward counter stops at `u64::MAX`.
pub fn beta_sequence(current: u64, count: usize) -> Vec<u64> {
    let mut forward = current;
    let mut backward = current;
    let mut values = Vec::new();

    for step in 0..count {
        if step < BETA_FORWARD_STEPS {
            if forward > 0 {
                forward -= 1;
                values.push(forward);
            }
        } else {
            let Some(next) = backward.checked_add(1) else {
                break;
            };
            backward = next;
            values.push(backward);
        }
    }

    values
}

pub fn minor_sequence(seed: Triple, count: usize) -> Vec<u64> {
    let mut sequence = MinorSequence::new(seed);
    let values = sequence.by_ref().take(count).collect();
    debug!(?seed, end = ?sequence.state(), "minor sequence");
    values
}

pub fn patch_sequence(seed: Triple, count: usize) -> Vec<u64> {
    let mut sequence = PatchSequence::new(seed);
    let values = sequence.by_ref().take(count).collect();
    debug!(?seed, end = ?sequence.state(), "patch sequence");
    values
}

pub fn major_sequence(current: u64, major_count: usize) -> Vec<u64> {
    (1..=major_count as u64)
        .map_while(|offset| current.checked_add(offset))
        .collect()
}

pub fn assemble_beta(version: &Version, values: &[u64]) -> Vec<String> {
    values
        .iter()
        .map(|&number| match version.pre {
            Some(_) => format!("{}-beta.{number}", version.core()),
            None => format!("{version}-beta.{number}"),
        })
        .collect()
}

pub fn assemble_major(version: &Version, values: &[u64]) -> Vec<String> {
    values
        .iter()
        .filter(|&&major| major != version.major)
        .map(|major| format!("{major}.{}.{}", version.minor, version.patch))
        .collect()
}

/// Minor candidates always reset the patch segment to `0`.
pub fn assemble_minor(version: &Version, values: &[u64]) -> Vec<String> {
    values
        .iter()
        .filter(|&&minor| minor != version.minor)
        .map(|minor| format!("{}.{minor}.0", version.major))
        .collect()
}

pub fn assemble_patch(version: &Version, values: &[u64]) -> Vec<String> {
    values
        .iter()
        .filter(|&&patch| patch != version.patch)
        .map(|patch| format!("{}.{}.{patch}", version.major, version.minor))
        .collect()
}

/// Candidate next versions for `version`, ordered major, beta, patch, minor.
pub fn build_candidates(
    version: &str,
    params: &GenerationParams,
) -> Result<Vec<String>, CandidateError> {
    let parsed = Version::parse(version)?;
    let seed = Triple::from(&parsed);
    let half = params.count() / 2;

    let beta = match params.exclude() {
        Exclusion::Beta => Vec::new(),
        Exclusion::Nothing => {
            let values = beta_sequence(parsed.beta_number().unwrap_or(0), params.count());
            assemble_beta(&parsed, &values)
        }
    };
    let major = assemble_major(
        &parsed,
        &major_sequence(parsed.major, params.major_count()),
    );
    let minor = assemble_minor(&parsed, &minor_sequence(seed, half));
    let patch = assemble_patch(&parsed, &patch_sequence(seed, half));

    debug!(?major, ?beta, ?patch, ?minor, %parsed, "generated candidate groups");

    let mut candidates = Vec::with_capacity(major.len() + beta.len() + patch.len() + minor.len());
    candidates.extend(major);
    candidates.extend(beta);
    candidates.extend(patch);
    candidates.extend(minor);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(count: usize, exclude: Exclusion) -> GenerationParams {
        GenerationParams::new(count, exclude).unwrap()
    }

    #[test]
    fn beta_sequence_keeps_forward_slots_near_zero() {
        assert_eq!(beta_sequence(2, 10), vec![1, 0, 3, 4, 5, 6, 7, 8]);
        assert_eq!(beta_sequence(2, 8), vec![1, 0, 3, 4, 5, 6]);
    }

    #[test]
    fn beta_sequence_from_zero_only_counts_up() {
        assert_eq!(beta_sequence(0, 6), vec![1, 2]);
    }

    #[test]
    fn beta_sequence_with_room_emits_full_count() {
        assert_eq!(beta_sequence(10, 8), vec![9, 8, 7, 6, 11, 12, 13, 14]);
    }

    #[test]
    fn beta_sequence_shorter_than_forward_window() {
        assert_eq!(beta_sequence(5, 2), vec![4, 3]);
    }

    #[test]
    fn minor_rolls_over_into_major() {
        let mut sequence = MinorSequence::new(Triple {
            major: 1,
            minor: 100,
            patch: 0,
        });
        assert_eq!(sequence.next(), Some(0));
        assert_eq!(sequence.state().major, 2);
        assert_eq!(sequence.next(), Some(1));
        assert_eq!(sequence.state().major, 2);
    }

    #[test]
    fn patch_rolls_over_into_minor() {
        let seed = Triple {
            major: 1,
            minor: 4,
            patch: 99,
        };
        let mut sequence = PatchSequence::new(seed);
        assert_eq!(sequence.next(), Some(100));
        assert_eq!(sequence.next(), Some(0));
        assert_eq!(
            sequence.state(),
            Triple {
                major: 1,
                minor: 5,
                patch: 0
            }
        );
    }

    #[test]
    fn minor_and_patch_sequences_do_not_share_state() {
        let seed = Triple {
            major: 0,
            minor: 100,
            patch: 100,
        };
        assert_eq!(minor_sequence(seed, 3), vec![0, 1, 2]);
        assert_eq!(patch_sequence(seed, 3), vec![0, 1, 2]);
    }

    #[test]
    fn components_above_ceiling_are_held() {
        let seed = Triple {
            major: 1,
            minor: 0,
            patch: 150,
        };
        assert_eq!(patch_sequence(seed, 3), vec![150, 150, 150]);
        let version = Version::new(1, 0, 150);
        assert!(assemble_patch(&version, &[150, 150, 150]).is_empty());
    }

    #[test]
    fn major_sequence_is_empty_by_default() {
        assert!(major_sequence(3, 0).is_empty());
        assert_eq!(major_sequence(3, 2), vec![4, 5]);
    }

    #[test]
    fn assemblers_skip_current_component() {
        let version = Version::new(2, 5, 10);
        assert_eq!(assemble_major(&version, &[2, 3]), vec!["3.5.10"]);
        assert_eq!(assemble_minor(&version, &[5, 6]), vec!["2.6.0"]);
        assert_eq!(assemble_patch(&version, &[10, 11]), vec!["2.5.11"]);
    }

    #[test]
    fn beta_assembler_replaces_or_appends() {
        let beta = Version::parse("1.0.6-beta.2").unwrap();
        assert_eq!(assemble_beta(&beta, &[2]), vec!["1.0.6-beta.2"]);
        assert_eq!(assemble_beta(&beta, &[5]), vec!["1.0.6-beta.5"]);

        let release = Version::parse("2.5.10").unwrap();
        assert_eq!(assemble_beta(&release, &[1]), vec!["2.5.10-beta.1"]);
    }

    #[test]
    fn minor_assembler_normalizes_beta_patch() {
        let beta = Version::parse("1.0.6-beta.2").unwrap();
        assert_eq!(assemble_minor(&beta, &[1]), vec!["1.1.0"]);
        assert_eq!(assemble_major(&beta, &[2]), vec!["2.0.6"]);
    }

    #[test]
    fn builds_candidates_for_beta_version_with_beta_excluded() {
        let candidates = build_candidates("1.0.6-beta.2", &params(10, Exclusion::Beta)).unwrap();
        assert_eq!(
            candidates,
            vec![
                "1.0.7", "1.0.8", "1.0.9", "1.0.10", "1.0.11", "1.1.0", "1.2.0", "1.3.0",
                "1.4.0", "1.5.0",
            ]
        );
    }

    #[test]
    fn builds_beta_group_for_release_version() {
        let candidates = build_candidates("2.5.10", &params(10, Exclusion::Nothing)).unwrap();
        assert_eq!(
            candidates,
            vec![
                "2.5.10-beta.1",
                "2.5.10-beta.2",
                "2.5.10-beta.3",
                "2.5.10-beta.4",
                "2.5.10-beta.5",
                "2.5.10-beta.6",
                "2.5.11",
                "2.5.12",
                "2.5.13",
                "2.5.14",
                "2.5.15",
                "2.6.0",
                "2.7.0",
                "2.8.0",
                "2.9.0",
                "2.10.0",
            ]
        );
        assert!(!candidates.iter().any(|candidate| candidate == "2.5.10"));
    }

    #[test]
    fn beta_group_precedes_patch_group() {
        let candidates =
            build_candidates("1.0.6-beta.2", &params(10, Exclusion::Nothing)).unwrap();
        assert_eq!(&candidates[..3], ["1.0.6-beta.1", "1.0.6-beta.0", "1.0.6-beta.3"]);
        assert_eq!(candidates.len(), 8 + 5 + 5);
        assert_eq!(candidates[8], "1.0.7");
    }

    #[test]
    fn major_group_comes_first_when_requested() {
        let candidates = build_candidates(
            "1.2.3",
            &params(2, Exclusion::Beta).with_major_count(2).unwrap(),
        )
        .unwrap();
        assert_eq!(candidates, vec!["2.2.3", "3.2.3", "1.2.4", "1.3.0"]);
    }

    #[test]
    fn minor_rollover_keeps_original_major_in_output() {
        let candidates = build_candidates("1.99.0", &params(4, Exclusion::Beta)).unwrap();
        assert_eq!(candidates, vec!["1.99.1", "1.99.2", "1.100.0", "1.0.0"]);
    }

    #[test]
    fn odd_count_rounds_down_for_minor_and_patch() {
        let candidates = build_candidates("0.1.0", &params(3, Exclusion::Beta)).unwrap();
        assert_eq!(candidates, vec!["0.1.1", "0.2.0"]);
    }

    #[test]
    fn invalid_version_produces_no_candidates() {
        let err = build_candidates("1", &GenerationParams::default()).unwrap_err();
        assert!(matches!(err, CandidateError::InvalidVersionFormat { .. }));
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            GenerationParams::new(0, Exclusion::Beta).unwrap_err(),
            CandidateError::InvalidParameter { name: "count", .. }
        ));
        assert!(GenerationParams::from_signed(-3, Exclusion::Beta).is_err());
        assert!(matches!(
            "alpha".parse::<Exclusion>().unwrap_err(),
            CandidateError::InvalidParameter {
                name: "exclude",
                ..
            }
        ));
    }

    #[test]
    fn rejects_counts_above_maximum() {
        assert!(GenerationParams::new(MAX_COUNT, Exclusion::Nothing).is_ok());
        assert!(matches!(
            GenerationParams::new(MAX_COUNT + 1, Exclusion::Nothing).unwrap_err(),
            CandidateError::InvalidParameter { name: "count", .. }
        ));
        assert!(matches!(
            GenerationParams::from_signed(i64::MAX, Exclusion::Nothing).unwrap_err(),
            CandidateError::InvalidParameter { name: "count", .. }
        ));
        assert!(matches!(
            GenerationParams::default()
                .with_major_count(usize::MAX)
                .unwrap_err(),
            CandidateError::InvalidParameter {
                name: "major_count",
                ..
            }
        ));
    }

    #[test]
    fn beta_sequence_stops_at_top_of_range() {
        let top = u64::MAX;
        assert_eq!(
            beta_sequence(top, 6),
            vec![top - 1, top - 2, top - 3, top - 4]
        );
        assert_eq!(
            beta_sequence(top - 1, 7),
            vec![top - 2, top - 3, top - 4, top - 5, top]
        );
    }

    #[test]
    fn major_sequence_stops_at_top_of_range() {
        assert_eq!(major_sequence(u64::MAX - 1, 3), vec![u64::MAX]);
    }

    #[test]
    fn parses_exclusion_names() {
        assert_eq!("beta".parse::<Exclusion>().unwrap(), Exclusion::Beta);
        assert_eq!(" NONE ".parse::<Exclusion>().unwrap(), Exclusion::Nothing);
        assert_eq!(Exclusion::Nothing.to_string(), "none");
    }
}
