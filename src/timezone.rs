//! Conversion between instants, wall-clock readings and the business timezone.
//!
//! Every report is computed in a single, fixed timezone (the timezone of the
//! shop), never the timezone of the machine running the server. Timestamps
//! must go through [BusinessTimezone] before they are compared, bucketed or
//! split into calendar parts.

use std::fmt::Debug;

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::{format_description, time},
};
use time_tz::{Offset, TimeZone, Tz, timezones};

use crate::Error;

/// The last representable instant of a day.
pub const END_OF_DAY: Time = time!(23:59:59.999999999);

const NAIVE_DATE_TIME_FORMATS: [&[BorrowedFormatItem<'static>]; 5] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// The timezone the business operates in, e.g. "America/Sao_Paulo".
#[derive(Clone, Copy)]
pub struct BusinessTimezone {
    tz: &'static Tz,
}

impl Debug for BusinessTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BusinessTimezone").field(&self.name()).finish()
    }
}

impl PartialEq for BusinessTimezone {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl BusinessTimezone {
    /// Look up a timezone by its canonical name.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a
    /// known IANA timezone name.
    pub fn from_name(canonical_timezone: &str) -> Result<Self, Error> {
        timezones::get_by_name(canonical_timezone)
            .map(|tz| Self { tz })
            .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
    }

    /// The canonical name of the timezone.
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        self.tz.get_offset_utc(&instant).to_utc()
    }

    /// Express `instant` with the business offset, so that `date()`,
    /// `hour()` etc. return the shop's wall-clock reading.
    pub fn to_business_time(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }

    /// The current instant in business time.
    pub fn now(&self) -> OffsetDateTime {
        self.to_business_time(OffsetDateTime::now_utc())
    }

    /// Interpret a wall-clock reading as local business time.
    pub fn assume_local(&self, wall_clock: PrimitiveDateTime) -> OffsetDateTime {
        // The offset is looked up at the reading taken as UTC first, then
        // corrected with the offset found at the resulting instant. Two passes
        // are enough for every real-world offset change.
        let guess = wall_clock.assume_offset(self.offset_at(wall_clock.assume_utc()));
        wall_clock.assume_offset(self.offset_at(guess))
    }

    /// Midnight at the start of `date` in business time.
    pub fn start_of_day(&self, date: Date) -> OffsetDateTime {
        self.assume_local(date.midnight())
    }

    /// The last instant of `date` in business time.
    pub fn end_of_day(&self, date: Date) -> OffsetDateTime {
        self.assume_local(date.with_time(END_OF_DAY))
    }

    /// Parse a stored timestamp and normalize it to business time.
    ///
    /// Accepts RFC 3339 timestamps (converted from their own offset), naive
    /// date-times and date-only strings (both read as business wall-clock
    /// time). Returns `None` for anything else.
    pub fn parse_timestamp(&self, raw: &str) -> Option<OffsetDateTime> {
        let raw = raw.trim();

        if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Some(self.to_business_time(instant));
        }

        if let Some(wall_clock) = NAIVE_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
        {
            return Some(self.assume_local(wall_clock));
        }

        Date::parse(raw, DATE_FORMAT)
            .ok()
            .map(|date| self.start_of_day(date))
    }

    /// Parse a date-only string such as "2024-03-15".
    pub fn parse_date(&self, raw: &str) -> Option<Date> {
        Date::parse(raw.trim(), DATE_FORMAT).ok()
    }
}
