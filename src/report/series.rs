//! Spreading records over fixed time buckets for the comparison charts.

use serde::Serialize;
use time::Month;

use crate::{
    record::TransactionRecord,
    report::{
        config::{ReportConfig, SeriesRevenue},
        metrics::finite_or_zero,
        period::{Granularity, Window},
    },
};

/// One value per bucket, with a label per bucket.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Series {
    /// One label per bucket, e.g. "13:00" or "Mar".
    pub labels: Vec<String>,
    /// The amount summed into each bucket.
    pub values: Vec<f64>,
}

impl Series {
    /// The number of buckets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sum `records` into the buckets of `window`.
///
/// Records outside the window, or with a timestamp that cannot be parsed,
/// are left out. The amount added per record follows
/// [ReportConfig::series_revenue].
pub fn bucketize(
    records: &[&TransactionRecord],
    window: &Window,
    granularity: Granularity,
    config: &ReportConfig,
) -> Series {
    let tz = &config.timezone;
    let bucket_count = granularity.bucket_count(window, tz);
    let window_start = tz.to_business_time(window.start);
    let mut values = vec![0.0; bucket_count];

    for record in records {
        let Some(instant) = tz
            .parse_timestamp(&record.timestamp)
            .filter(|&instant| window.contains(instant))
        else {
            continue;
        };

        let Some(index) = granularity
            .bucket_index(instant, window_start)
            .filter(|&index| index < bucket_count)
        else {
            continue;
        };

        values[index] += match config.series_revenue {
            SeriesRevenue::RecordTotal => record.total,
            SeriesRevenue::PaymentBreakdown => record.revenue(),
        };
    }

    for value in &mut values {
        *value = finite_or_zero(*value);
    }

    Series {
        labels: bucket_labels(window_start, granularity, bucket_count, config),
        values,
    }
}

fn bucket_labels(
    window_start: time::OffsetDateTime,
    granularity: Granularity,
    bucket_count: usize,
    config: &ReportConfig,
) -> Vec<String> {
    match granularity {
        Granularity::HourOfDay => (0..bucket_count).map(|hour| format!("{hour:02}:00")).collect(),
        Granularity::Day => {
            let mut labels = Vec::with_capacity(bucket_count);
            let mut date = Some(window_start.date());

            while let Some(day) = date.filter(|_| labels.len() < bucket_count) {
                labels.push(format!("{:02}/{:02}", day.day(), u8::from(day.month())));
                date = day.next_day();
            }

            labels
        }
        Granularity::DayOfMonth => (1..=bucket_count).map(|day| day.to_string()).collect(),
        Granularity::MonthOfYear => (0..bucket_count)
            .map(|offset| {
                let month = Month::January.nth_next(offset as u8);
                config.locale.month_abbrev(month).to_owned()
            })
            .collect(),
    }
}

/// The current and previous series stretched to the same length.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    /// One label per bucket.
    pub labels: Vec<String>,
    /// Values of the current window.
    pub current: Vec<f64>,
    /// Values of the previous window, padded with zeros.
    pub previous: Vec<f64>,
}

/// Pad the shorter series with zeros at the end so both have as many values
/// as the longer one. The labels of the longer series are kept.
pub fn align(current: Series, previous: Series) -> ComparisonSeries {
    let length = current.len().max(previous.len());

    let labels = if previous.len() > current.len() {
        previous.labels
    } else {
        current.labels
    };

    let pad = |mut values: Vec<f64>| {
        values.resize(length, 0.0);
        values
    };

    ComparisonSeries {
        labels,
        current: pad(current.values),
        previous: pad(previous.values),
    }
}

#[cfg(test)]
mod bucketize_tests {
    use time::macros::datetime;

    use crate::{
        record::{Payment, TransactionRecord},
        report::{
            config::{Locale, ReportConfig, SeriesRevenue},
            period::{Granularity, MAX_DAY_BUCKETS, Window},
        },
        timezone::BusinessTimezone,
    };

    use super::bucketize;

    fn config() -> ReportConfig {
        ReportConfig::new(BusinessTimezone::from_name("Etc/UTC").unwrap())
    }

    fn march() -> Window {
        Window::new(
            datetime!(2024-03-01 00:00:00 UTC),
            datetime!(2024-03-31 23:59:59.999999999 UTC),
        )
    }

    #[test]
    fn sums_by_day_of_month() {
        let records = vec![
            TransactionRecord::sale(1, 10.0, "2024-03-01T08:00:00Z"),
            TransactionRecord::sale(2, 15.0, "2024-03-01T18:00:00Z"),
            TransactionRecord::sale(3, 7.0, "2024-03-31"),
        ];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &march(), Granularity::DayOfMonth, &config());

        assert_eq!(series.len(), 31);
        assert_eq!(series.values[0], 25.0);
        assert_eq!(series.values[30], 7.0);
        assert_eq!(series.values.iter().sum::<f64>(), 32.0);
        assert_eq!(series.labels[0], "1");
        assert_eq!(series.labels[30], "31");
    }

    #[test]
    fn record_total_rule_ignores_payments() {
        let records = vec![
            TransactionRecord::sale(1, 90.0, "2024-03-05")
                .payments(vec![Payment::new("money", 60.0), Payment::new("pix", 40.0)]),
        ];
        let refs: Vec<_> = records.iter().collect();
        let mut config = config();

        let by_total = bucketize(&refs, &march(), Granularity::DayOfMonth, &config);
        config.series_revenue = SeriesRevenue::PaymentBreakdown;
        let by_payments = bucketize(&refs, &march(), Granularity::DayOfMonth, &config);

        assert_eq!(by_total.values[4], 90.0);
        assert_eq!(by_payments.values[4], 100.0);
    }

    #[test]
    fn hourly_labels() {
        let window = Window::new(
            datetime!(2024-03-15 00:00:00 UTC),
            datetime!(2024-03-15 23:59:59.999999999 UTC),
        );
        let records = vec![TransactionRecord::sale(1, 5.0, "2024-03-15T13:59:00Z")];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &window, Granularity::HourOfDay, &config());

        assert_eq!(series.len(), 24);
        assert_eq!(series.values[13], 5.0);
        assert_eq!(series.labels[13], "13:00");
    }

    #[test]
    fn rolling_day_labels_cross_month_end() {
        let window = Window::new(
            datetime!(2024-02-27 00:00:00 UTC),
            datetime!(2024-03-04 12:00:00 UTC),
        );

        let series = bucketize(&[], &window, Granularity::Day, &config());

        assert_eq!(
            series.labels,
            vec!["27/02", "28/02", "29/02", "01/03", "02/03", "03/03", "04/03"]
        );
        assert_eq!(series.values, vec![0.0; 7]);
    }

    #[test]
    fn month_labels_follow_locale() {
        let window = Window::new(
            datetime!(2024-01-01 00:00:00 UTC),
            datetime!(2024-12-31 23:59:59.999999999 UTC),
        );
        let mut config = config();
        config.locale = Locale::BrazilianPortuguese;
        let records = vec![TransactionRecord::sale(1, 5.0, "2024-02-10")];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &window, Granularity::MonthOfYear, &config);

        assert_eq!(series.labels[1], "fev");
        assert_eq!(series.values[1], 5.0);
    }

    #[test]
    fn records_outside_window_are_dropped() {
        let records = vec![
            TransactionRecord::sale(1, 99.0, "2024-04-05T10:00:00Z"),
            TransactionRecord::sale(2, 12.0, "2024-02-29T23:59:59Z"),
            TransactionRecord::sale(3, 3.0, "2024-03-05T10:00:00Z"),
        ];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &march(), Granularity::DayOfMonth, &config());

        assert_eq!(series.values.iter().sum::<f64>(), 3.0);
        assert_eq!(series.values[4], 3.0);
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let records = vec![
            TransactionRecord::sale(1, 50.0, "not a date"),
            TransactionRecord::sale(2, 8.0, "2024-03-10T09:00:00Z"),
        ];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &march(), Granularity::DayOfMonth, &config());

        assert_eq!(series.values.iter().sum::<f64>(), 8.0);
        assert_eq!(series.values[9], 8.0);
    }

    #[test]
    fn rolling_days_are_capped() {
        let window = Window::new(
            datetime!(2024-01-01 00:00:00 UTC),
            datetime!(2024-06-30 23:59:59 UTC),
        );
        let records = vec![
            TransactionRecord::sale(1, 4.0, "2024-01-01T12:00:00Z"),
            TransactionRecord::sale(2, 6.0, "2024-06-30T12:00:00Z"),
        ];
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &window, Granularity::Day, &config());

        assert_eq!(series.len(), MAX_DAY_BUCKETS);
        assert_eq!(series.labels.len(), MAX_DAY_BUCKETS);
        assert_eq!(series.values[0], 4.0);
        assert_eq!(series.values.iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn every_record_lands_in_exactly_one_bucket() {
        let records: Vec<_> = (1..=31)
            .map(|day| TransactionRecord::sale(day, 1.0, &format!("2024-03-{day:02}T12:00:00Z")))
            .collect();
        let refs: Vec<_> = records.iter().collect();

        let series = bucketize(&refs, &march(), Granularity::DayOfMonth, &config());

        assert!(series.values.iter().all(|&value| value == 1.0));
    }
}

#[cfg(test)]
mod align_tests {
    use super::{Series, align};

    fn series(values: Vec<f64>) -> Series {
        Series {
            labels: (1..=values.len()).map(|day| day.to_string()).collect(),
            values,
        }
    }

    #[test]
    fn pads_shorter_previous_series() {
        let current = series((1..=31).map(f64::from).collect());
        let previous = series((1..=28).map(f64::from).collect());

        let aligned = align(current.clone(), previous.clone());

        assert_eq!(aligned.current.len(), 31);
        assert_eq!(aligned.previous.len(), 31);
        assert_eq!(aligned.current, current.values);
        assert_eq!(&aligned.previous[..28], previous.values.as_slice());
        assert_eq!(&aligned.previous[28..], &[0.0, 0.0, 0.0]);
        assert_eq!(aligned.labels, current.labels);
    }

    #[test]
    fn pads_shorter_current_series_and_keeps_longer_labels() {
        let current = series(vec![1.0; 29]);
        let previous = series(vec![2.0; 31]);

        let aligned = align(current, previous.clone());

        assert_eq!(aligned.current.len(), 31);
        assert_eq!(aligned.current[29], 0.0);
        assert_eq!(aligned.labels, previous.labels);
    }
}
