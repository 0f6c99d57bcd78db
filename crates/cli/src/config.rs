//! Holiday configuration flags
//!
//! Collects the holiday options from the command line and environment into
//! an immutable [`HolidayConfig`], and builds the shared calendar from it.

use clap::Args;
use std::sync::Arc;
use tally_core::{CustomHoliday, HolidayCalendar, HolidayConfig};
use tracing::debug;

/// Holiday calendar options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct HolidayArgs {
    /// Treat German public holidays as non-working days
    #[arg(long, global = true, env = "TALLY_GERMAN_HOLIDAYS")]
    pub german_holidays: bool,

    /// Treat Corpus Christi as a holiday (requires --german-holidays)
    #[arg(long, global = true, env = "TALLY_CORPUS_CHRISTI")]
    pub corpus_christi: bool,

    /// Extra holiday as YYYY-MM-DD or MM-DD (can be specified multiple times)
    #[arg(
        long = "custom-holiday",
        global = true,
        env = "TALLY_CUSTOM_HOLIDAYS",
        value_delimiter = ',',
        value_parser = parse_custom_holiday
    )]
    pub custom_holidays: Vec<CustomHoliday>,
}

/// Parse a custom holiday argument
fn parse_custom_holiday(s: &str) -> Result<CustomHoliday, String> {
    s.trim().parse::<CustomHoliday>().map_err(|e| e.to_string())
}

impl HolidayArgs {
    /// Build the holiday configuration these options describe
    pub fn config(&self) -> HolidayConfig {
        HolidayConfig::new()
            .with_german_public_holidays(self.german_holidays)
            .with_corpus_christi(self.corpus_christi)
            .with_custom_holidays(self.custom_holidays.iter().copied())
    }

    /// Build the calendar shared by converters and reports
    pub fn calendar(&self) -> Arc<HolidayCalendar> {
        let config = self.config();
        debug!(
            german = config.german_public_holidays,
            corpus_christi = config.corpus_christi,
            custom = config.custom_holidays.len(),
            "Holiday calendar configured"
        );
        Arc::new(HolidayCalendar::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        holidays: HolidayArgs,
    }

    #[test]
    fn test_defaults_have_no_holidays() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        let config = cli.holidays.config();
        assert!(!config.german_public_holidays);
        assert!(!config.corpus_christi);
        assert!(config.custom_holidays.is_empty());
    }

    #[test]
    fn test_flags_build_config() {
        let cli = TestCli::try_parse_from([
            "test",
            "--german-holidays",
            "--corpus-christi",
            "--custom-holiday",
            "2018-03-01",
            "--custom-holiday",
            "08-15,11-01",
        ])
        .unwrap();
        let config = cli.holidays.config();
        assert!(config.german_public_holidays);
        assert!(config.corpus_christi);
        assert_eq!(config.custom_holidays.len(), 3);

        let calendar = cli.holidays.calendar();
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2018, 3, 1).unwrap()));
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2019, 8, 15).unwrap()));
    }

    #[test]
    fn test_invalid_custom_holiday_is_rejected() {
        let result = TestCli::try_parse_from(["test", "--custom-holiday", "someday"]);
        assert!(result.is_err());
    }
}
