//! Calendar date parsing for `M/D/YYYY` source text.
//!
//! Source systems write dates with unpadded month and day and a four digit
//! year. Parsing distinguishes three outcomes: blank input (no value), a
//! valid calendar date, and text that is present but malformed. Dates are
//! naive; no timezone is ever attached.

use crate::constants::WEEKDAY_NAMES;
use crate::error::DateFormatInvalid;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    date: NaiveDate,
}

impl CalendarDate {
    /// Parse `M/D/YYYY` text.
    ///
    /// Returns `Ok(None)` for blank or whitespace-only input. Any other text
    /// that does not split into exactly three all-digit segments, has a year
    /// segment that is not four digits, or names an impossible calendar day
    /// is a [`DateFormatInvalid`].
    pub fn parse(text: &str) -> Result<Option<Self>, DateFormatInvalid> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() != 3 {
            return Err(DateFormatInvalid::new(
                text,
                format!("expected 3 '/'-separated segments, found {}", segments.len()),
            ));
        }

        let month = parse_segment(text, segments[0], "month")?;
        let day = parse_segment(text, segments[1], "day")?;

        let year_segment = segments[2].trim();
        if year_segment.len() != 4 {
            return Err(DateFormatInvalid::new(text, "year must have four digits"));
        }
        let year = parse_segment(text, year_segment, "year")?;

        Self::from_ymd(year as i32, month, day)
            .map(Some)
            .ok_or_else(|| DateFormatInvalid::new(text, "not a calendar date"))
    }

    /// Build from components, `None` when the day does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|date| Self { date })
    }

    /// Rebuild a date from its `YYYYMMDD` key
    pub fn from_key(key: i32) -> Option<Self> {
        if key <= 0 {
            return None;
        }
        let year = key / 10_000;
        let month = (key / 100 % 100) as u32;
        let day = (key % 100) as u32;
        Self::from_ymd(year, month, day)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Integer key `year*10000 + month*100 + day`
    pub fn key(&self) -> i32 {
        self.year() * 10_000 + self.month() as i32 * 100 + self.day() as i32
    }

    /// Zero padded `YYYY-MM-DD`
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }

    /// Calendar quarter, 1 through 4
    pub fn quarter(&self) -> u32 {
        (self.month() - 1) / 3 + 1
    }

    /// ISO-8601 week number
    pub fn iso_week(&self) -> u32 {
        self.date.iso_week().week()
    }

    /// Day of week with Sunday = 0
    pub fn weekday_index(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday_index() as usize]
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

fn parse_segment(input: &str, segment: &str, part: &str) -> Result<u32, DateFormatInvalid> {
    let segment = segment.trim();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateFormatInvalid::new(
            input,
            format!("{} segment '{}' is not numeric", part, segment),
        ));
    }
    segment
        .parse::<u32>()
        .map_err(|e| DateFormatInvalid::new(input, format!("{} segment: {}", part, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> CalendarDate {
        CalendarDate::parse(text).unwrap().unwrap()
    }

    #[test]
    fn test_parse_unpadded_date() {
        let date = parsed("3/15/2024");
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
        assert_eq!(date.key(), 20240315);
        assert_eq!(date.iso(), "2024-03-15");
    }

    #[test]
    fn test_parse_accepts_padded_segments_and_whitespace() {
        assert_eq!(parsed(" 01/05/2023 ").key(), 20230105);
        assert_eq!(parsed("12/31/1999").iso(), "1999-12-31");
    }

    #[test]
    fn test_blank_input_is_absent() {
        assert_eq!(CalendarDate::parse("").unwrap(), None);
        assert_eq!(CalendarDate::parse("   ").unwrap(), None);
        assert_eq!(CalendarDate::parse("\t").unwrap(), None);
    }

    #[test]
    fn test_wrong_segment_count_is_invalid() {
        assert!(CalendarDate::parse("3/15").is_err());
        assert!(CalendarDate::parse("3/15/2024/1").is_err());
        assert!(CalendarDate::parse("2024-03-15").is_err());
    }

    #[test]
    fn test_non_numeric_segment_is_invalid() {
        assert!(CalendarDate::parse("March/15/2024").is_err());
        assert!(CalendarDate::parse("3/+5/2024").is_err());
        assert!(CalendarDate::parse("3//2024").is_err());
        assert!(CalendarDate::parse("3/15/24").is_err());
    }

    #[test]
    fn test_impossible_calendar_date_is_invalid() {
        let err = CalendarDate::parse("13/1/2024").unwrap_err();
        assert_eq!(err.input, "13/1/2024");
        assert!(CalendarDate::parse("2/30/2024").is_err());
        assert!(CalendarDate::parse("0/10/2024").is_err());
        assert!(CalendarDate::parse("2/29/2023").is_err());
        assert!(CalendarDate::parse("2/29/2024").is_ok());
    }

    #[test]
    fn test_key_round_trip() {
        for text in ["1/1/2000", "2/29/2024", "10/9/1987", "12/31/2099"] {
            let date = parsed(text);
            let back = CalendarDate::from_key(date.key()).unwrap();
            assert_eq!(back, date);
            assert_eq!(
                date.key(),
                date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
            );
        }
        assert_eq!(CalendarDate::from_key(20241301), None);
        assert_eq!(CalendarDate::from_key(0), None);
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(parsed("1/1/2024").quarter(), 1);
        assert_eq!(parsed("3/31/2024").quarter(), 1);
        assert_eq!(parsed("4/1/2024").quarter(), 2);
        assert_eq!(parsed("9/30/2024").quarter(), 3);
        assert_eq!(parsed("10/1/2024").quarter(), 4);
        assert_eq!(parsed("12/31/2024").quarter(), 4);
    }

    #[test]
    fn test_weekday_names() {
        // 2024-03-15 was a Friday, 2024-03-17 a Sunday
        assert_eq!(parsed("3/15/2024").weekday_name(), "Friday");
        assert_eq!(parsed("3/17/2024").weekday_index(), 0);
        assert_eq!(parsed("3/17/2024").weekday_name(), "Sunday");
        assert_eq!(parsed("3/16/2024").weekday_name(), "Saturday");
    }

    #[test]
    fn test_iso_week() {
        assert_eq!(parsed("1/1/2024").iso_week(), 1);
        assert_eq!(parsed("12/30/2024").iso_week(), 1);
        assert_eq!(parsed("1/1/2021").iso_week(), 53);
    }
}
