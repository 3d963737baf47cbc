use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::DecodeError;

/// First year representable as a year offset
pub const EPOCH_YEAR: u16 = 1970;

/// Seconds since 1970-01-01T00:00:00 UTC, without leap seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The epoch itself
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Seconds since the epoch
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Builds a timestamp from a UTC datetime, dropping sub-second precision
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        Timestamp(datetime.timestamp())
    }

    /// Converts to a UTC datetime, if chrono can represent it
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// Decoded calendar fields, as carried on the wire
///
/// Fields are stored exactly as received. Nothing here guarantees that they
/// form a real date; see [`CalendarFields::validate`] for the strict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    /// Absolute calendar year
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarFields {
    /// Creates calendar fields without any range checks
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        CalendarFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Extracts the fields of a UTC datetime
    ///
    /// Years outside `0..=65535` are clamped to the nearest representable year.
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        CalendarFields {
            year: datetime.year().clamp(0, u16::MAX as i32) as u16,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
        }
    }

    /// Years since 1970; negative for years before the epoch
    pub fn year_offset(&self) -> i32 {
        self.year as i32 - EPOCH_YEAR as i32
    }

    /// Checks every field against its natural calendar range
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.year < EPOCH_YEAR {
            return Err(DecodeError::out_of_range("year", self.year));
        }
        if !(1..=12).contains(&self.month) {
            return Err(DecodeError::out_of_range("month", self.month));
        }
        if NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32).is_none() {
            return Err(DecodeError::out_of_range("day", self.day));
        }
        if self.hour > 23 {
            return Err(DecodeError::out_of_range("hour", self.hour));
        }
        if self.minute > 59 {
            return Err(DecodeError::out_of_range("minute", self.minute));
        }
        if self.second > 59 {
            return Err(DecodeError::out_of_range("second", self.second));
        }
        Ok(())
    }

    /// Converts the fields into seconds since the epoch
    ///
    /// Proleptic Gregorian, no leap seconds. Overflowing fields carry into the
    /// next larger unit instead of being rejected: month 13 is January of the
    /// following year, day 0 is the last day of the previous month, hour 24 is
    /// midnight of the next day.
    pub fn to_timestamp(&self) -> Result<Timestamp, DecodeError> {
        let months = self.month as i32 - 1;
        let year = self.year as i32 + months.div_euclid(12);
        let month = months.rem_euclid(12) as u32 + 1;

        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| DecodeError::out_of_range("year", self.year))?;

        let datetime = first_of_month
            + Duration::days(self.day as i64 - 1)
            + Duration::hours(self.hour as i64)
            + Duration::minutes(self.minute as i64)
            + Duration::seconds(self.second as i64);

        Ok(Timestamp(datetime.and_utc().timestamp()))
    }
}

impl fmt::Display for CalendarFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
