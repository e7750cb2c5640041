//! The `period` and `anchor` query parameters shared by the report screens
//! and the JSON API, and the selector that sets them.

use maud::{Markup, html};
use serde::Deserialize;
use time::{OffsetDateTime, macros::format_description};

use crate::{
    report::{PeriodKind, PeriodRange, Window, anchor_from_query},
    timezone::BusinessTimezone,
};

/// The query string of a report request, e.g. `?period=last7days&anchor=2024-03-15`.
///
/// Both fields are kept as raw strings so that a bad value degrades to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// A period keyword such as "last7days".
    pub period: Option<String>,
    /// A date ("2024-03-15") or an RFC 3339 timestamp.
    pub anchor: Option<String>,
}

impl PeriodQuery {
    /// The requested period, or the default period if none or an unknown
    /// one was given.
    pub fn period(&self) -> PeriodKind {
        match self.period.as_deref() {
            None => PeriodKind::default(),
            Some(raw) => PeriodKind::from_query_value(raw).unwrap_or_else(|| {
                tracing::warn!("ignoring unknown period {raw:?}");
                PeriodKind::default()
            }),
        }
    }

    /// The instant the report is anchored at.
    pub fn anchor(&self, tz: &BusinessTimezone) -> OffsetDateTime {
        anchor_from_query(self.anchor.as_deref(), tz)
    }

    /// The anchor as given, if it was not blank.
    pub fn raw_anchor(&self) -> Option<&str> {
        self.anchor
            .as_deref()
            .map(str::trim)
            .filter(|anchor| !anchor.is_empty())
    }
}

/// The URL for `endpoint` showing `period`, keeping `anchor` if there is one.
///
/// The anchor is percent-encoded, so offsets such as "+03:00" survive the
/// round trip.
pub fn period_url(endpoint: &str, period: PeriodKind, anchor: Option<&str>) -> String {
    let mut params = vec![("period", period.as_query_value())];

    if let Some(anchor) = anchor {
        params.push(("anchor", anchor));
    }

    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("{endpoint}?{query}"),
        Err(error) => {
            tracing::error!("Could not encode the anchor {anchor:?}: {error}");
            format!("{endpoint}?period={}", period.as_query_value())
        }
    }
}

/// A row of buttons for switching the period of the report at `endpoint`.
///
/// The buttons swap the element `#report-content` with the response of an
/// htmx request, so the page is not reloaded.
pub fn period_selector(endpoint: &str, selected: PeriodKind, anchor: Option<&str>) -> Markup {
    let button_style = |is_selected: bool| -> &'static str {
        if is_selected {
            "px-4 py-2 text-sm font-medium text-white bg-blue-600 border \
            border-blue-600 first:rounded-s-lg last:rounded-e-lg"
        } else {
            "px-4 py-2 text-sm font-medium text-gray-900 bg-white border \
            border-gray-200 hover:bg-gray-100 hover:text-blue-700 \
            first:rounded-s-lg last:rounded-e-lg dark:bg-gray-800 \
            dark:border-gray-700 dark:text-white dark:hover:bg-gray-700"
        }
    };

    html!(
        div
            id="period-selector"
            class="inline-flex rounded-md shadow-xs mb-4"
            role="group"
        {
            @for period in PeriodKind::ALL {
                @let url = period_url(endpoint, period, anchor);

                button
                    type="button"
                    class=(button_style(period == selected))
                    hx-get=(url)
                    hx-target="#report-content"
                    hx-swap="outerHTML"
                    hx-push-url="true"
                    aria-pressed=(if period == selected { "true" } else { "false" })
                {
                    (period.label())
                }
            }
        }
    )
}

/// The first and last day of `window` in business time, e.g. "01/03/2024 to 31/03/2024".
pub fn format_window(window: &Window, tz: &BusinessTimezone) -> String {
    let format = format_description!("[day]/[month]/[year]");
    let start = tz.to_business_time(window.start).date();
    let end = tz.to_business_time(window.end).date();

    let format_date = |date: time::Date| date.format(format).unwrap_or_else(|_| date.to_string());

    if start == end {
        format_date(start)
    } else {
        format!("{} to {}", format_date(start), format_date(end))
    }
}

/// The period name with the dates it covers and the dates it is compared against.
pub fn period_heading(range: &PeriodRange, tz: &BusinessTimezone) -> Markup {
    html!(
        div class="w-full mb-4"
        {
            h2 class="text-2xl font-bold" { (range.period.label()) }

            p class="text-sm text-gray-600 dark:text-gray-400" data-window="current"
            {
                (format_window(&range.current, tz))
            }

            p class="text-xs text-gray-500 dark:text-gray-500" data-window="previous"
            {
                "Compared with " (format_window(&range.previous, tz))
            }
        }
    )
}
