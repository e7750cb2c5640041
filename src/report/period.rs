//! Turning a period keyword and an anchor instant into the current and
//! previous windows.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime};

use crate::timezone::BusinessTimezone;

/// The largest number of daily buckets a rolling window is split into.
pub const MAX_DAY_BUCKETS: usize = 60;

/// The reporting periods offered by the period selector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    /// From the start of the anchor's day up to the anchor, against all of yesterday.
    #[serde(rename = "today")]
    Today,
    /// The 7 days ending on the anchor's day.
    #[serde(rename = "last7days")]
    Last7Days,
    /// The 30 days ending on the anchor's day.
    #[serde(rename = "last30days")]
    Last30Days,
    /// The anchor's calendar month, against the one before.
    #[default]
    #[serde(rename = "thisMonth")]
    ThisMonth,
    /// The anchor's calendar year, against the one before.
    #[serde(rename = "thisYear")]
    ThisYear,
}

impl PeriodKind {
    /// Every period, in the order shown in the selector.
    pub const ALL: [PeriodKind; 5] = [
        PeriodKind::Today,
        PeriodKind::Last7Days,
        PeriodKind::Last30Days,
        PeriodKind::ThisMonth,
        PeriodKind::ThisYear,
    ];

    /// The spelling used in the `period` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            PeriodKind::Today => "today",
            PeriodKind::Last7Days => "last7days",
            PeriodKind::Last30Days => "last30days",
            PeriodKind::ThisMonth => "thisMonth",
            PeriodKind::ThisYear => "thisYear",
        }
    }

    /// The period spelled `value` in a query string, e.g. "last7days".
    pub fn from_query_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_query_value() == value.trim())
    }

    /// The name shown on the period selector.
    pub fn label(self) -> &'static str {
        match self {
            PeriodKind::Today => "Today",
            PeriodKind::Last7Days => "Last 7 days",
            PeriodKind::Last30Days => "Last 30 days",
            PeriodKind::ThisMonth => "This month",
            PeriodKind::ThisYear => "This year",
        }
    }

    /// How the previous period is described next to a growth figure.
    pub fn comparison_label(self) -> &'static str {
        match self {
            PeriodKind::Today => "vs yesterday",
            PeriodKind::Last7Days => "vs previous 7 days",
            PeriodKind::Last30Days => "vs previous 30 days",
            PeriodKind::ThisMonth => "vs last month",
            PeriodKind::ThisYear => "vs last year",
        }
    }
}

/// A closed time interval: both `start` and `end` are inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    /// The first instant in the window.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// The last instant in the window.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl Window {
    /// The window from `start` to `end`, both included.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// Whether `instant` lies in the window, bounds included.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// The unit a window is split into for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    /// 24 buckets, one per hour of the day.
    HourOfDay,
    /// One bucket per calendar day since the window start.
    Day,
    /// One bucket per day of the window's month.
    DayOfMonth,
    /// 12 buckets, one per month.
    MonthOfYear,
}

impl Granularity {
    /// The number of buckets `window` is split into.
    pub fn bucket_count(self, window: &Window, tz: &BusinessTimezone) -> usize {
        match self {
            Granularity::HourOfDay => 24,
            Granularity::Day => {
                let start = tz.to_business_time(window.start).date();
                let end = tz.to_business_time(window.end).date();
                let days = (end - start).whole_days() + 1;

                usize::try_from(days).unwrap_or(0).min(MAX_DAY_BUCKETS)
            }
            Granularity::DayOfMonth => {
                let start = tz.to_business_time(window.start);
                usize::from(last_day_of_month(start.year(), start.month()))
            }
            Granularity::MonthOfYear => 12,
        }
    }

    /// The bucket `instant` falls into, relative to the start of the window.
    ///
    /// Both arguments must already be in business time. The index may be out
    /// of range for the window; callers drop such indices.
    pub fn bucket_index(self, instant: OffsetDateTime, window_start: OffsetDateTime) -> Option<usize> {
        match self {
            Granularity::HourOfDay => Some(usize::from(instant.hour())),
            Granularity::Day => {
                usize::try_from((instant.date() - window_start.date()).whole_days()).ok()
            }
            Granularity::DayOfMonth => Some(usize::from(instant.day()) - 1),
            Granularity::MonthOfYear => Some(usize::from(u8::from(instant.month())) - 1),
        }
    }
}

/// The windows and bucketing scheme for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PeriodRange {
    /// The period the windows were resolved for.
    pub period: PeriodKind,
    /// The window being reported on.
    pub current: Window,
    /// The window it is compared against.
    pub previous: Window,
    /// How both windows are split into chart buckets.
    pub granularity: Granularity,
}

/// Compute the current and previous windows of `period` around `anchor`.
///
/// This never fails. If the windows cannot be built around `anchor` (e.g. the
/// date arithmetic leaves the supported calendar) the current instant is used
/// as the anchor instead, and if that fails too both windows collapse to the
/// current instant.
pub fn resolve(period: PeriodKind, anchor: OffsetDateTime, tz: &BusinessTimezone) -> PeriodRange {
    if let Some(range) = try_resolve(period, anchor, tz) {
        return range;
    }

    tracing::warn!(
        "could not build {} windows around {anchor}, falling back to now",
        period.as_query_value()
    );

    let now = tz.now();

    try_resolve(period, now, tz).unwrap_or_else(|| {
        let window = Window::new(now, now);

        PeriodRange {
            period,
            current: window,
            previous: window,
            granularity: granularity_of(period),
        }
    })
}

fn try_resolve(period: PeriodKind, anchor: OffsetDateTime, tz: &BusinessTimezone) -> Option<PeriodRange> {
    let anchor = tz.to_business_time(anchor);
    let anchor_date = anchor.date();

    let (current, previous) = match period {
        PeriodKind::Today => {
            let yesterday = anchor_date.previous_day()?;

            (
                Window::new(tz.start_of_day(anchor_date), anchor),
                whole_days(yesterday, yesterday, tz),
            )
        }
        PeriodKind::Last7Days => rolling_days(7, anchor, tz)?,
        PeriodKind::Last30Days => rolling_days(30, anchor, tz)?,
        PeriodKind::ThisMonth => {
            let (start, end) = month_bounds(anchor_date.year(), anchor_date.month())?;
            let before = start.previous_day()?;
            let (previous_start, previous_end) = month_bounds(before.year(), before.month())?;

            (
                whole_days(start, end, tz),
                whole_days(previous_start, previous_end, tz),
            )
        }
        PeriodKind::ThisYear => {
            let (start, end) = year_bounds(anchor_date.year())?;
            let (previous_start, previous_end) = year_bounds(anchor_date.year() - 1)?;

            (
                whole_days(start, end, tz),
                whole_days(previous_start, previous_end, tz),
            )
        }
    };

    Some(PeriodRange {
        period,
        current,
        previous,
        granularity: granularity_of(period),
    })
}

fn granularity_of(period: PeriodKind) -> Granularity {
    match period {
        PeriodKind::Today => Granularity::HourOfDay,
        PeriodKind::Last7Days | PeriodKind::Last30Days => Granularity::Day,
        PeriodKind::ThisMonth => Granularity::DayOfMonth,
        PeriodKind::ThisYear => Granularity::MonthOfYear,
    }
}

/// The `days` calendar days ending with the anchor's day, and the `days` full
/// days before them.
fn rolling_days(days: i64, anchor: OffsetDateTime, tz: &BusinessTimezone) -> Option<(Window, Window)> {
    let anchor_date = anchor.date();
    let start = anchor_date.checked_sub(Duration::days(days - 1))?;
    let previous_end = start.previous_day()?;
    let previous_start = previous_end.checked_sub(Duration::days(days - 1))?;

    Some((
        Window::new(tz.start_of_day(start), anchor),
        whole_days(previous_start, previous_end, tz),
    ))
}

fn whole_days(first: Date, last: Date, tz: &BusinessTimezone) -> Window {
    Window::new(tz.start_of_day(first), tz.end_of_day(last))
}

fn month_bounds(year: i32, month: Month) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, month, 1).ok()?;
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month)).ok()?;

    Some((start, end))
}

fn year_bounds(year: i32) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, Month::January, 1).ok()?;
    let end = Date::from_calendar_date(year, Month::December, 31).ok()?;

    Some((start, end))
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Interpret the `anchor` query parameter.
///
/// A date such as "2024-03-15" anchors the report at the end of that day, or
/// at the current instant if the date is today. Full timestamps are used as
/// given. A missing anchor means now; an unparseable one is logged and also
/// means now.
pub fn anchor_from_query(raw: Option<&str>, tz: &BusinessTimezone) -> OffsetDateTime {
    let now = tz.now();

    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return now;
    };

    if let Some(date) = tz.parse_date(raw) {
        return if date == now.date() {
            now
        } else {
            tz.end_of_day(date)
        };
    }

    match tz.parse_timestamp(raw) {
        Some(anchor) => anchor,
        None => {
            tracing::warn!("ignoring invalid anchor {raw:?}, using the current time instead");
            now
        }
    }
}


#[cfg(test)]
mod period_kind_tests {
    use super::PeriodKind;

    #[test]
    fn query_values_round_trip() {
        for period in PeriodKind::ALL {
            assert_eq!(
                PeriodKind::from_query_value(period.as_query_value()),
                Some(period)
            );
        }
    }

    #[test]
    fn unknown_query_value() {
        assert_eq!(PeriodKind::from_query_value("decade"), None);
        assert_eq!(PeriodKind::default(), PeriodKind::ThisMonth);
    }
}

#[cfg(test)]
mod bucket_tests {
    use time::macros::datetime;

    use super::Granularity;

    #[test]
    fn bucket_index_by_granularity() {
        let start = datetime!(2024-03-01 00:00:00 UTC);
        let instant = datetime!(2024-03-15 13:45:00 UTC);

        assert_eq!(Granularity::HourOfDay.bucket_index(instant, start), Some(13));
        assert_eq!(Granularity::Day.bucket_index(instant, start), Some(14));
        assert_eq!(Granularity::DayOfMonth.bucket_index(instant, start), Some(14));
        assert_eq!(Granularity::MonthOfYear.bucket_index(instant, start), Some(2));
    }

    #[test]
    fn day_before_window_has_no_bucket() {
        let start = datetime!(2024-03-01 00:00:00 UTC);
        let instant = datetime!(2024-02-28 13:45:00 UTC);

        assert_eq!(Granularity::Day.bucket_index(instant, start), None);
    }
}
