//! Holiday calendar for working-day arithmetic
//!
//! Classifies calendar dates as working or non-working days. Weekends are
//! always non-working; German public holidays (fixed-date and Easter-relative)
//! and custom holidays are layered on top according to a [`HolidayConfig`].

use crate::error::{ReportError, ReportResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Offsets of the moving holidays relative to Easter Sunday
mod easter_offset {
    pub const GOOD_FRIDAY: i64 = -2;
    pub const EASTER_MONDAY: i64 = 1;
    pub const ASCENSION_DAY: i64 = 39;
    pub const WHIT_MONDAY: i64 = 50;
    pub const CORPUS_CHRISTI: i64 = 60;
}

/// Fixed-date German public holidays as (month, day)
const GERMAN_FIXED_HOLIDAYS: [(u32, u32); 6] = [
    (1, 1),   // New Year's Day
    (5, 1),   // Labour Day
    (10, 3),  // German Unity Day
    (12, 24), // Christmas Eve
    (12, 25), // Christmas Day
    (12, 26), // Boxing Day
];

/// A user-defined non-working day
///
/// Either a one-off calendar date or a day that recurs every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CustomHoliday {
    /// A single date, written `YYYY-MM-DD`
    Date(NaiveDate),
    /// The same day every year, written `MM-DD`
    Annual { month: u32, day: u32 },
}

impl CustomHoliday {
    /// Create an annual holiday, validating the month/day combination.
    ///
    /// February 29th is accepted and only matches in leap years.
    pub fn annual(month: u32, day: u32) -> ReportResult<Self> {
        // 2000 is a leap year, so every real month/day pair is valid in it
        NaiveDate::from_ymd_opt(2000, month, day)
            .map(|_| CustomHoliday::Annual { month, day })
            .ok_or_else(|| ReportError::InvalidHoliday {
                value: format!("{:02}-{:02}", month, day),
            })
    }
}

impl fmt::Display for CustomHoliday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomHoliday::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            CustomHoliday::Annual { month, day } => write!(f, "{:02}-{:02}", month, day),
        }
    }
}

impl FromStr for CustomHoliday {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let invalid = || ReportError::InvalidHoliday {
            value: value.to_string(),
        };

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(CustomHoliday::Date(date));
        }

        let (month, day) = value.split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        CustomHoliday::annual(month, day).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CustomHoliday {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CustomHoliday> for String {
    fn from(holiday: CustomHoliday) -> Self {
        holiday.to_string()
    }
}

/// Holiday configuration
///
/// Built once at startup and never mutated afterwards. Changing the
/// configuration means building a new [`HolidayCalendar`] from a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    /// Observe German public holidays (fixed dates plus Easter-relative days)
    pub german_public_holidays: bool,
    /// Additionally observe Corpus Christi (only with German public holidays)
    pub corpus_christi: bool,
    /// Additional non-working days
    pub custom_holidays: BTreeSet<CustomHoliday>,
}

impl HolidayConfig {
    /// Create a configuration with weekends as the only non-working days
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable German public holidays
    pub fn with_german_public_holidays(mut self, enabled: bool) -> Self {
        self.german_public_holidays = enabled;
        self
    }

    /// Enable or disable Corpus Christi
    pub fn with_corpus_christi(mut self, enabled: bool) -> Self {
        self.corpus_christi = enabled;
        self
    }

    /// Add a custom holiday
    pub fn with_custom_holiday(mut self, holiday: CustomHoliday) -> Self {
        self.custom_holidays.insert(holiday);
        self
    }

    /// Add multiple custom holidays
    pub fn with_custom_holidays(mut self, holidays: impl IntoIterator<Item = CustomHoliday>) -> Self {
        self.custom_holidays.extend(holidays);
        self
    }
}

/// Compute Easter Sunday for a Gregorian year.
///
/// Uses the anonymous Gregorian algorithm (Meeus/Jones/Butcher). Returns
/// `None` only for years outside the range chrono can represent.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let n = h + l - 7 * m + 114;

    NaiveDate::from_ymd_opt(year, (n / 31) as u32, (n % 31 + 1) as u32)
}

/// Easter-relative holidays of one year
#[derive(Debug, Clone, Default)]
struct MovingHolidays {
    easter_sunday: Option<NaiveDate>,
    dates: Vec<NaiveDate>,
}

impl MovingHolidays {
    fn for_year(year: i32, corpus_christi: bool) -> Self {
        let Some(easter) = easter_sunday(year) else {
            return Self::default();
        };

        let mut offsets = vec![
            easter_offset::GOOD_FRIDAY,
            easter_offset::EASTER_MONDAY,
            easter_offset::ASCENSION_DAY,
            easter_offset::WHIT_MONDAY,
        ];
        if corpus_christi {
            offsets.push(easter_offset::CORPUS_CHRISTI);
        }

        let dates = offsets
            .into_iter()
            .filter_map(|offset| {
                if offset < 0 {
                    easter.checked_sub_days(Days::new(offset.unsigned_abs()))
                } else {
                    easter.checked_add_days(Days::new(offset as u64))
                }
            })
            .collect();

        Self {
            easter_sunday: Some(easter),
            dates,
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Calendar classifying dates as working or non-working days
///
/// Holds an immutable [`HolidayConfig`] and a per-year cache of the
/// Easter-relative holidays. The cache is filled with an atomic
/// compute-if-absent insert, so one calendar can be shared across threads
/// behind an `Arc`.
#[derive(Debug)]
pub struct HolidayCalendar {
    config: HolidayConfig,
    one_off_holidays: HashSet<NaiveDate>,
    annual_holidays: HashSet<(u32, u32)>,
    has_working_days: bool,
    moving_holidays: DashMap<i32, MovingHolidays>,
}

impl HolidayCalendar {
    /// Create a calendar for the given configuration
    pub fn new(config: HolidayConfig) -> Self {
        let mut one_off_holidays = HashSet::new();
        let mut annual_holidays = HashSet::new();
        for holiday in &config.custom_holidays {
            match *holiday {
                CustomHoliday::Date(date) => {
                    one_off_holidays.insert(date);
                }
                CustomHoliday::Annual { month, day } => {
                    annual_holidays.insert((month, day));
                }
            }
        }

        let has_working_days =
            Self::some_day_of_year_uncovered(&annual_holidays, config.german_public_holidays);
        if !has_working_days {
            debug!("Holiday configuration leaves no working days");
        }

        Self {
            config,
            one_off_holidays,
            annual_holidays,
            has_working_days,
            moving_holidays: DashMap::new(),
        }
    }

    /// Whether any date at all is a working day.
    ///
    /// One-off and Easter-relative holidays only cover some years, so the
    /// calendar runs out of working days only when annual and fixed holidays
    /// together cover every day of a leap year.
    pub fn has_working_days(&self) -> bool {
        self.has_working_days
    }

    fn some_day_of_year_uncovered(annual: &HashSet<(u32, u32)>, german: bool) -> bool {
        let Some(start) = NaiveDate::from_ymd_opt(2000, 1, 1) else {
            return true;
        };
        start.iter_days().take(366).any(|date| {
            let month_day = (date.month(), date.day());
            !annual.contains(&month_day) && !(german && GERMAN_FIXED_HOLIDAYS.contains(&month_day))
        })
    }

    /// Get the configuration this calendar was built from
    pub fn config(&self) -> &HolidayConfig {
        &self.config
    }

    /// Check if a date falls on Saturday or Sunday
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Check if a date is a configured holiday (weekends not included)
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.config.german_public_holidays && self.is_german_holiday(date) {
            return true;
        }

        self.one_off_holidays.contains(&date)
            || self.annual_holidays.contains(&(date.month(), date.day()))
    }

    /// Check if a date is a working day
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Get Easter Sunday for a year, computing and caching it on first use
    pub fn easter_sunday(&self, year: i32) -> Option<NaiveDate> {
        self.with_moving_holidays(year, |holidays| holidays.easter_sunday)
    }

    /// Number of years whose moving holidays are currently cached
    pub fn cached_years(&self) -> usize {
        self.moving_holidays.len()
    }

    fn is_german_holiday(&self, date: NaiveDate) -> bool {
        let fixed = GERMAN_FIXED_HOLIDAYS
            .iter()
            .any(|&(month, day)| date.month() == month && date.day() == day);

        fixed || self.with_moving_holidays(date.year(), |holidays| holidays.contains(date))
    }

    fn with_moving_holidays<T>(&self, year: i32, f: impl FnOnce(&MovingHolidays) -> T) -> T {
        if let Some(holidays) = self.moving_holidays.get(&year) {
            return f(&holidays);
        }

        let holidays = self.moving_holidays.entry(year).or_insert_with(|| {
            debug!(year, "Computing moving holidays");
            MovingHolidays::for_year(year, self.config.corpus_christi)
        });
        f(&holidays)
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::new(HolidayConfig::default())
    }
}

/// Calendars compare by configuration; the cache is not part of identity.
impl PartialEq for HolidayCalendar {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl Eq for HolidayCalendar {}

static_assertions::assert_impl_all!(HolidayCalendar: Send, Sync);
