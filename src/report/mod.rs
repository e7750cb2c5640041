//! The financial aggregation and period comparison engine.
//!
//! A report is computed in five steps, each a pure function over an
//! in-memory slice of records:
//!
//! 1. [period::resolve] turns a period keyword and an anchor instant into the
//!    current and previous windows and a bucketing granularity.
//! 2. [filter::filter_by_window] keeps the non-cancelled records inside a
//!    window.
//! 3. [metrics] folds the kept records into KPIs and grouped breakdowns.
//! 4. [series::bucketize] spreads them over fixed time buckets, and
//!    [series::align] pads the current and previous series to equal length.
//! 5. [growth] compares the current figures against the previous ones.
//!
//! [summary] wires the steps together and [cache] keeps the last result
//! around while its inputs are unchanged. Nothing in this module fails:
//! malformed timestamps are skipped, divisions by zero give zero and missing
//! references land in sentinel groups.

pub mod cache;
pub mod config;
pub mod filter;
pub mod growth;
pub mod metrics;
pub mod period;
pub mod series;
pub mod summary;

pub use cache::{Fingerprint, ReportCache};
pub use config::{Locale, ReportConfig, SeriesRevenue};
pub use filter::filter_by_window;
pub use growth::{Direction, Growth, growth_percent};
pub use metrics::{
    DEFAULT_TOP_PRODUCTS, GroupEntry, GroupTotal, Metrics, OTHER_LABEL, ProductRanking,
    UNCATEGORIZED_LABEL, reduce,
};
pub use period::{Granularity, PeriodKind, PeriodRange, Window, anchor_from_query, resolve};
pub use series::{ComparisonSeries, Series, align, bucketize};
pub use summary::{
    CashFlow, CashFlowSeries, FinanceReport, PeriodReport, build_finance_report,
    build_period_report,
};
