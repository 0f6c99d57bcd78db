//! Report column headers
//!
//! A [`TimeIntervalColumnHeader`] is an inclusive range of working-day ages,
//! optionally unbounded at either end. A report's header list may overlap and
//! need not be contiguous.

use crate::error::{ReportError, ReportResult};
use std::fmt;
use std::str::FromStr;

/// Column header covering an inclusive range of working-day ages
///
/// `None` on either side means the range is unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeIntervalColumnHeader {
    lower: Option<i32>,
    upper: Option<i32>,
}

impl TimeIntervalColumnHeader {
    /// Create a header from optional bounds.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidArgument` if both bounds are set and
    /// `lower > upper`.
    pub fn new(lower: Option<i32>, upper: Option<i32>) -> ReportResult<Self> {
        if let (Some(lower), Some(upper)) = (lower, upper)
            && lower > upper
        {
            return Err(ReportError::invalid_argument(format!(
                "column header lower bound {} is greater than upper bound {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Header matching exactly one age
    pub fn single(age: i32) -> Self {
        Self {
            lower: Some(age),
            upper: Some(age),
        }
    }

    /// Header matching `lower..=upper`
    pub fn range(lower: i32, upper: i32) -> ReportResult<Self> {
        Self::new(Some(lower), Some(upper))
    }

    /// Header matching every age up to and including `upper`
    pub fn ending_at(upper: i32) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// Header matching every age from `lower` on
    pub fn starting_at(lower: i32) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    /// Header matching every age
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Lower bound, `None` when unbounded
    pub fn lower(&self) -> Option<i32> {
        self.lower
    }

    /// Upper bound, `None` when unbounded
    pub fn upper(&self) -> Option<i32> {
        self.upper
    }

    /// Check if a working-day age falls inside this header
    pub fn is_in_header(&self, age: i32) -> bool {
        self.lower.is_none_or(|lower| lower <= age) && self.upper.is_none_or(|upper| age <= upper)
    }

    /// Label used when rendering the column
    pub fn display_name(&self) -> String {
        match (self.lower, self.upper) {
            (None, None) => "all".to_string(),
            (None, Some(upper)) => format!("<= {}", upper),
            (Some(lower), None) => format!(">= {}", lower),
            (Some(lower), Some(upper)) if lower == upper => lower.to_string(),
            (Some(lower), Some(upper)) => format!("{} - {}", lower, upper),
        }
    }
}

impl fmt::Display for TimeIntervalColumnHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Parses `3`, `1..5`, `..-6`, `6..` and `..`
impl FromStr for TimeIntervalColumnHeader {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let parse_bound = |bound: &str| -> ReportResult<Option<i32>> {
            let bound = bound.trim();
            if bound.is_empty() {
                return Ok(None);
            }
            bound.parse().map(Some).map_err(|_| {
                ReportError::invalid_argument(format!("invalid column header '{}'", value))
            })
        };

        match value.split_once("..") {
            Some((lower, upper)) => Self::new(parse_bound(lower)?, parse_bound(upper)?),
            None => parse_bound(value)?.map(Self::single).ok_or_else(|| {
                ReportError::invalid_argument(format!("invalid column header '{}'", value))
            }),
        }
    }
}

/// Inclusive range of raw calendar-day ages, unbounded where `None`
///
/// Produced by drill-down from a column header and handed to persistence as
/// an age filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AgeRange {
    pub lower: Option<i32>,
    pub upper: Option<i32>,
}

impl AgeRange {
    /// Create a range from optional bounds
    pub fn new(lower: Option<i32>, upper: Option<i32>) -> Self {
        Self { lower, upper }
    }

    /// Check if a raw age lies inside the range
    pub fn contains(&self, age: i32) -> bool {
        self.lower.is_none_or(|lower| lower <= age) && self.upper.is_none_or(|upper| age <= upper)
    }
}

impl From<TimeIntervalColumnHeader> for AgeRange {
    fn from(header: TimeIntervalColumnHeader) -> Self {
        Self::new(header.lower(), header.upper())
    }
}
