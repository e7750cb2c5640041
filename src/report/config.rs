//! Settings that shape a report but are not part of the records themselves.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, report::metrics::DEFAULT_TOP_PRODUCTS, timezone::BusinessTimezone};

/// The language used for month labels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Month labels such as "Jan".
    #[default]
    #[serde(rename = "en")]
    English,
    /// Month labels such as "jan" and "fev".
    #[serde(rename = "pt-BR")]
    BrazilianPortuguese,
}

impl Locale {
    /// The BCP 47 tag, e.g. "pt-BR".
    pub fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::BrazilianPortuguese => "pt-BR",
        }
    }

    /// The three letter abbreviation of `month`.
    pub fn month_abbrev(self, month: Month) -> &'static str {
        match self {
            Locale::English => match month {
                Month::January => "Jan",
                Month::February => "Feb",
                Month::March => "Mar",
                Month::April => "Apr",
                Month::May => "May",
                Month::June => "Jun",
                Month::July => "Jul",
                Month::August => "Aug",
                Month::September => "Sep",
                Month::October => "Oct",
                Month::November => "Nov",
                Month::December => "Dec",
            },
            Locale::BrazilianPortuguese => match month {
                Month::January => "jan",
                Month::February => "fev",
                Month::March => "mar",
                Month::April => "abr",
                Month::May => "mai",
                Month::June => "jun",
                Month::July => "jul",
                Month::August => "ago",
                Month::September => "set",
                Month::October => "out",
                Month::November => "nov",
                Month::December => "dez",
            },
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" | "en-US" | "en-GB" => Ok(Locale::English),
            "pt-BR" | "pt_BR" | "pt" => Ok(Locale::BrazilianPortuguese),
            _ => Err(Error::UnsupportedLocale(s.to_owned())),
        }
    }
}

/// Which amount a record adds to its chart bucket.
///
/// The KPI cards always use [TransactionRecord::revenue](crate::TransactionRecord::revenue).
/// Charts have historically accumulated the record's own total, which differs
/// from the KPI figure when a split payment does not add up to the total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesRevenue {
    /// Accumulate `total`.
    #[default]
    RecordTotal,
    /// Accumulate the revenue, i.e. the payment parts when there are any.
    PaymentBreakdown,
}

impl SeriesRevenue {
    /// The command line spelling of the rule.
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesRevenue::RecordTotal => "record-total",
            SeriesRevenue::PaymentBreakdown => "payment-breakdown",
        }
    }
}

impl FromStr for SeriesRevenue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "record-total" => Ok(SeriesRevenue::RecordTotal),
            "payment-breakdown" => Ok(SeriesRevenue::PaymentBreakdown),
            _ => Err(Error::InvalidSeriesRevenueRule(s.to_owned())),
        }
    }
}

/// View settings passed to every report computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    /// The timezone all dates are computed in.
    pub timezone: BusinessTimezone,
    /// The language for month labels.
    pub locale: Locale,
    /// How many products the ranking keeps.
    pub top_products: usize,
    /// The amount accumulated into chart buckets.
    pub series_revenue: SeriesRevenue,
}

impl ReportConfig {
    /// A config with the default locale, ranking size and series rule.
    pub fn new(timezone: BusinessTimezone) -> Self {
        Self {
            timezone,
            locale: Locale::default(),
            top_products: DEFAULT_TOP_PRODUCTS,
            series_revenue: SeriesRevenue::default(),
        }
    }
}
