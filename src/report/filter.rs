//! Selecting the records that belong to a window.

use crate::{record::TransactionRecord, report::period::Window, timezone::BusinessTimezone};

/// The records whose timestamp lies inside `window`, bounds included, in
/// their original order.
///
/// Cancelled records are never selected. Records whose timestamp cannot be
/// parsed are skipped.
pub fn filter_by_window<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
    window: &Window,
    tz: &BusinessTimezone,
) -> Vec<&'a TransactionRecord> {
    records
        .into_iter()
        .filter(|record| !record.is_cancelled())
        .filter(|record| match tz.parse_timestamp(&record.timestamp) {
            Some(instant) => window.contains(instant),
            None => {
                tracing::debug!(
                    "skipping record {} with invalid timestamp {:?}",
                    record.id,
                    record.timestamp
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        record::{RecordStatus, TransactionRecord},
        report::period::Window,
        timezone::BusinessTimezone,
    };

    use super::filter_by_window;

    fn utc() -> BusinessTimezone {
        BusinessTimezone::from_name("Etc/UTC").unwrap()
    }

    fn march() -> Window {
        Window::new(
            datetime!(2024-03-01 00:00:00 UTC),
            datetime!(2024-03-31 23:59:59.999999999 UTC),
        )
    }

    #[test]
    fn bounds_are_inclusive() {
        let records = vec![
            TransactionRecord::sale(1, 10.0, "2024-03-01T00:00:00Z"),
            TransactionRecord::sale(2, 10.0, "2024-03-31T23:59:59.999999999Z"),
        ];

        let selected = filter_by_window(&records, &march(), &utc());

        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn one_microsecond_outside_is_excluded() {
        let records = vec![
            TransactionRecord::sale(1, 10.0, "2024-02-29T23:59:59.999999Z"),
            TransactionRecord::sale(2, 10.0, "2024-04-01T00:00:00.000001Z"),
        ];

        let selected = filter_by_window(&records, &march(), &utc());

        assert!(selected.is_empty());
    }

    #[test]
    fn cancelled_records_are_never_selected() {
        let records = vec![
            TransactionRecord::sale(1, 10.0, "2024-03-10T12:00:00Z").status(RecordStatus::Cancelled),
            TransactionRecord::sale(2, 20.0, "2024-03-10T12:00:00Z").status(RecordStatus::Pending),
        ];

        let selected = filter_by_window(&records, &march(), &utc());

        assert_eq!(selected, vec![&records[1]]);
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let records = vec![
            TransactionRecord::sale(1, 10.0, "10/03/2024"),
            TransactionRecord::sale(2, 20.0, "2024-03-10"),
        ];

        let selected = filter_by_window(&records, &march(), &utc());

        assert_eq!(selected, vec![&records[1]]);
    }

    #[test]
    fn preserves_input_order() {
        let records = vec![
            TransactionRecord::sale(3, 10.0, "2024-03-20"),
            TransactionRecord::sale(1, 10.0, "2024-03-02"),
            TransactionRecord::sale(2, 10.0, "2024-03-11"),
        ];

        let selected = filter_by_window(&records, &march(), &utc());

        let ids: Vec<_> = selected.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![records[0].id, records[1].id, records[2].id]);
    }

    #[test]
    fn timestamps_are_compared_in_business_time() {
        let tz = BusinessTimezone::from_name("America/Sao_Paulo").unwrap();
        let window = Window::new(
            datetime!(2024-03-15 00:00:00 -3),
            datetime!(2024-03-15 23:59:59.999999999 -3),
        );
        let records = vec![
            // 22:30 on the 15th in Sao Paulo.
            TransactionRecord::sale(1, 10.0, "2024-03-16T01:30:00Z"),
            // 21:00 on the 14th in Sao Paulo.
            TransactionRecord::sale(2, 10.0, "2024-03-15T00:00:00Z"),
        ];

        let selected = filter_by_window(&records, &window, &tz);

        assert_eq!(selected, vec![&records[0]]);
    }
}
