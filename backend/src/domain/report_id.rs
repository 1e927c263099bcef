//! Human-facing report identifiers of the form `RPT-NNNNN`.
//!
//! The textual format is the one externally observable bit-exact contract
//! of the numbering subsystem: `"RPT-" + zero_pad(n, 5)`. Issued numbers
//! start at [`REPORT_NUMBER_FLOOR`] and the five-digit field is never
//! widened; allocation fails once the space is exhausted rather than
//! silently changing the format.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// First number ever issued.
pub const REPORT_NUMBER_FLOOR: u32 = 10_000;

/// Largest number representable in the fixed five-digit field.
pub const REPORT_NUMBER_CEILING: u32 = 99_999;

/// Errors raised when constructing or advancing a [`ReportId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReportIdError {
    /// The numeric suffix falls outside the issued range.
    #[error("report number {number} is outside the issued range {REPORT_NUMBER_FLOOR}..={REPORT_NUMBER_CEILING}")]
    OutOfRange { number: u32 },
    /// The five-digit numbering space has been used up.
    #[error("report numbering space is exhausted at {REPORT_NUMBER_CEILING}")]
    Exhausted,
}

fn report_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^RPT-\d{5}$")
            .unwrap_or_else(|err| panic!("report id pattern must compile: {err}"))
    })
}

/// A conforming report identifier.
///
/// # Examples
/// ```
/// use backend::domain::ReportId;
///
/// let id = ReportId::from_number(10_000).expect("in range");
/// assert_eq!(id.to_string(), "RPT-10000");
/// assert_eq!(ReportId::parse("RPT-10001").map(|id| id.number()), Some(10_001));
/// assert_eq!(ReportId::parse("RPT-1"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ReportId(u32);

impl ReportId {
    /// Construct from a numeric suffix, rejecting values outside the
    /// issued range.
    pub fn from_number(number: u32) -> Result<Self, ReportIdError> {
        if !(REPORT_NUMBER_FLOOR..=REPORT_NUMBER_CEILING).contains(&number) {
            return Err(ReportIdError::OutOfRange { number });
        }
        Ok(Self(number))
    }

    /// Parse a conforming identifier.
    ///
    /// Returns `None` for anything that is not lexically `RPT-NNNNN` with
    /// a suffix inside the issued range. Legacy or hand-edited values are
    /// simply non-conforming, never an error: the allocator excludes them
    /// from its max computation and the backfill renumbers them.
    pub fn parse(raw: &str) -> Option<Self> {
        if !report_id_pattern().is_match(raw) {
            return None;
        }
        let number: u32 = raw.get(4..)?.parse().ok()?;
        Self::from_number(number).ok()
    }

    /// The numeric suffix.
    pub fn number(self) -> u32 {
        self.0
    }

    /// The identifier following `prior_max`, or the floor when no
    /// conforming identifier exists yet.
    ///
    /// Fails with [`ReportIdError::Exhausted`] once the next suffix would
    /// not fit the five-digit field.
    pub fn next_after(prior_max: Option<u32>) -> Result<Self, ReportIdError> {
        match prior_max {
            None => Self::from_number(REPORT_NUMBER_FLOOR),
            Some(max) if max >= REPORT_NUMBER_CEILING => Err(ReportIdError::Exhausted),
            // A stored max below the floor can only come from a
            // non-conforming record that slipped past `parse`; clamp up.
            Some(max) => Self::from_number((max + 1).max(REPORT_NUMBER_FLOOR)),
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPT-{:05}", self.0)
    }
}

impl TryFrom<String> for ReportId {
    type Error = ReportIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(ReportIdError::OutOfRange { number: 0 })
    }
}

impl From<ReportId> for String {
    fn from(value: ReportId) -> Self {
        value.to_string()
    }
}
