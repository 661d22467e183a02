//! Calendar months written as `YYYY-MM` tokens.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::Error;

/// The earliest year that can be written as a `YYYY-MM` token.
const MIN_YEAR: i32 = 0;
/// The latest year that can be written as a `YYYY-MM` token.
const MAX_YEAR: i32 = 9999;

/// A calendar month, e.g. `2024-03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a month from its parts.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The current month in the timezone with `local_offset`.
    pub fn current(local_offset: UtcOffset) -> Self {
        Self::of(OffsetDateTime::now_utc().to_offset(local_offset).date())
    }

    /// The year of the month.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // Day 1 exists in every month of every year `time` can represent.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        let day = self.month.length(self.year);

        Date::from_calendar_date(self.year, self.month, day).unwrap_or(Date::MAX)
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month before this one, or `None` before `0000-01`.
    pub fn previous(&self) -> Option<Self> {
        let previous = match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        };

        previous.has_token().then_some(previous)
    }

    /// The month after this one, or `None` after `9999-12`.
    pub fn next(&self) -> Option<Self> {
        let next = match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        };

        next.has_token().then_some(next)
    }

    /// Whether the month can be written as a `YYYY-MM` token.
    fn has_token(&self) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&self.year)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse a month from a `YYYY-MM` token.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidMonth] unless `s` is a four digit year and a
    /// two digit month between 01 and 12 separated by a hyphen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;

        let is_digits = |text: &str, len: usize| {
            text.len() == len && text.chars().all(|c| c.is_ascii_digit())
        };

        if !is_digits(year, 4) || !is_digits(month, 2) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self::new(year, month))
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::{Error, YearMonth};

    #[test]
    fn parses_month_token() {
        let month: YearMonth = "2024-03".parse().unwrap();

        assert_eq!(month, YearMonth::new(2024, Month::March));
        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["2024-3", "24-03", "2024-13", "2024-00", "2024/03", "2024-03-01", "", "abcd-ef"] {
            assert_eq!(
                token.parse::<YearMonth>(),
                Err(Error::InvalidMonth(token.to_owned())),
                "expected {token:?} to be rejected"
            );
        }
    }

    #[test]
    fn first_and_last_day() {
        let february = YearMonth::new(2024, Month::February);

        assert_eq!(february.first_day(), date!(2024 - 02 - 01));
        assert_eq!(february.last_day(), date!(2024 - 02 - 29));
    }

    #[test]
    fn contains_only_dates_in_month() {
        let march = YearMonth::new(2024, Month::March);

        assert!(march.contains(date!(2024 - 03 - 01)));
        assert!(march.contains(date!(2024 - 03 - 31)));
        assert!(!march.contains(date!(2024 - 04 - 01)));
        assert!(!march.contains(date!(2023 - 03 - 15)));
    }

    #[test]
    fn previous_and_next_roll_over_years() {
        let january = YearMonth::new(2024, Month::January);
        let december = YearMonth::new(2023, Month::December);

        assert_eq!(january.previous(), Some(december));
        assert_eq!(december.next(), Some(january));
        assert_eq!(
            YearMonth::new(2024, Month::June).next(),
            Some(YearMonth::new(2024, Month::July))
        );
    }

    #[test]
    fn previous_and_next_stop_at_token_range() {
        let first = YearMonth::new(0, Month::January);
        let last = YearMonth::new(9999, Month::December);

        assert_eq!(first.previous(), None);
        assert_eq!(last.next(), None);
        assert_eq!(last.previous(), Some(YearMonth::new(9999, Month::November)));
        assert_eq!(
            "9999-11".parse::<YearMonth>().unwrap().next().map(|month| month.to_string()),
            Some("9999-12".to_owned())
        );
    }

    #[test]
    fn last_day_at_token_range_edges() {
        assert_eq!(
            YearMonth::new(9999, Month::December).last_day(),
            date!(9999 - 12 - 31)
        );
        assert_eq!(YearMonth::new(0, Month::January).first_day(), date!(0000 - 01 - 01));
        assert_eq!(YearMonth::new(2023, Month::February).last_day(), date!(2023 - 02 - 28));
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&YearMonth::new(2025, Month::October)).unwrap();

        assert_eq!(json, "\"2025-10\"");
    }
}
