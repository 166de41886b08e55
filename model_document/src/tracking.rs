use crate::Department;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::borrow::Cow;
use std::str::FromStr;
use thiserror::Error;

/// The fixed department → prefix lookup table.
/// Lookups are case-insensitive; unknown departments fall back to "DOC".
const DEPARTMENT_PREFIXES: &[(&str, &str)] = &[
    ("finance", "FIN"),
    ("human resources", "HR"),
    ("information technology", "IT"),
    ("legal", "LEG"),
    ("operations", "OPS"),
    ("procurement", "PRC"),
    ("records", "REC"),
];

/// The leading segment of a [TrackingCode]: 2 to 5 uppercase ASCII
/// alphanumerics identifying the issuing department.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct TrackingPrefix(Cow<'static, str>);

/// The input string cannot serve as a tracking prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a valid tracking prefix")]
pub struct InvalidPrefix(pub String);

impl TrackingPrefix {
    /// the prefix used when a department has no dedicated entry in the table
    pub const FALLBACK: TrackingPrefix = TrackingPrefix(Cow::Borrowed("DOC"));

    /// Validate and normalize a prefix. Input casing is folded to uppercase.
    pub fn new(code: &str) -> Result<TrackingPrefix, InvalidPrefix> {
        let normalized = code.to_ascii_uppercase();
        let len_ok = (2..=5).contains(&normalized.len());
        if !len_ok || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidPrefix(code.to_string()));
        }
        Ok(TrackingPrefix(Cow::Owned(normalized)))
    }

    /// Resolve the prefix for a department via the fixed lookup table,
    /// falling back to [TrackingPrefix::FALLBACK] for unknown names.
    pub fn for_department(department: &Department) -> TrackingPrefix {
        let name = department.as_str().trim().to_ascii_lowercase();
        DEPARTMENT_PREFIXES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, prefix)| TrackingPrefix(Cow::Borrowed(prefix)))
            .unwrap_or(TrackingPrefix::FALLBACK)
    }

    /// view the prefix as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackingPrefix {
    type Err = InvalidPrefix;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackingPrefix::new(s)
    }
}

/// The permanent, human-readable identity of a document:
/// `{PREFIX}-{year}-{sequence}` with the sequence zero-padded to five digits.
///
/// Assigned exactly once at creation and never reused. The year records when
/// the code was allocated; the sequence itself is global and never resets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct TrackingCode {
    prefix: TrackingPrefix,
    year: i32,
    sequence: u64,
}

/// The ways a tracking code string can fail to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingCodeError {
    /// the string does not split into prefix, year and sequence
    #[error("{0:?} is not a PREFIX-YEAR-SEQUENCE tracking code")]
    Malformed(String),
    /// the prefix segment failed validation
    #[error(transparent)]
    Prefix(#[from] InvalidPrefix),
    /// the year segment is not a four-digit number
    #[error("{0:?} is not a four-digit year")]
    Year(String),
    /// the sequence segment is not a zero-padded number
    #[error("{0:?} is not a five-or-more-digit sequence")]
    Sequence(String),
}

impl TrackingCode {
    /// assemble a code from its parts
    pub fn new(prefix: TrackingPrefix, year: i32, sequence: u64) -> TrackingCode {
        TrackingCode {
            prefix,
            year,
            sequence,
        }
    }

    /// the department prefix segment
    pub fn prefix(&self) -> &TrackingPrefix {
        &self.prefix
    }

    /// the allocation year segment
    pub fn year(&self) -> i32 {
        self.year
    }

    /// the global sequence segment
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:04}-{:05}", self.prefix, self.year, self.sequence)
    }
}

impl FromStr for TrackingCode {
    type Err = TrackingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.splitn(3, '-');
        let (Some(prefix), Some(year), Some(sequence)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(TrackingCodeError::Malformed(s.to_string()));
        };

        let prefix = TrackingPrefix::new(prefix)?;

        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(TrackingCodeError::Year(year.to_string()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| TrackingCodeError::Year(year.to_string()))?;

        if sequence.len() < 5 || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(TrackingCodeError::Sequence(sequence.to_string()));
        }
        let sequence: u64 = sequence
            .parse()
            .map_err(|_| TrackingCodeError::Sequence(sequence.to_string()))?;

        Ok(TrackingCode {
            prefix,
            year,
            sequence,
        })
    }
}

/// The singleton counter record behind tracking-code allocation.
///
/// Mutated only through the record store's transactional read-modify-write
/// primitive; `last_id` is globally unique and strictly increasing across
/// all concurrent creators. Created lazily (from [Default]) on the
/// first-ever allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingCounter {
    /// the most recently issued sequence value, 0 before any allocation
    pub last_id: u64,
}

impl TrackingCounter {
    /// The pure step of the read-modify-write: the advanced counter and the
    /// sequence value it hands out.
    pub fn next(self) -> (TrackingCounter, u64) {
        let issued = self.last_id + 1;
        (TrackingCounter { last_id: issued }, issued)
    }
}
