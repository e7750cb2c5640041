//! Reusing the last report while its inputs have not changed.

use std::{
    hash::{DefaultHasher, Hash, Hasher},
    sync::{Mutex, PoisonError},
};

use time::OffsetDateTime;

use crate::{
    category::Category,
    record::TransactionRecord,
    report::{config::ReportConfig, period::PeriodKind},
    wallet::Wallet,
};

/// Holds the most recently computed report together with the fingerprint of
/// the inputs it was computed from.
#[derive(Debug)]
pub struct ReportCache<T> {
    entry: Mutex<Option<(u64, T)>>,
}

impl<T> Default for ReportCache<T> {
    fn default() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }
}

impl<T: Clone> ReportCache<T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached report if it was computed for `key`, otherwise
    /// compute it with `compute` and replace the cached entry.
    pub fn get_or_compute(&self, key: u64, compute: impl FnOnce() -> T) -> T {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_key, report)) = entry.as_ref()
            && *cached_key == key
        {
            tracing::debug!("report cache hit for {key:x}");
            return report.clone();
        }

        let report = compute();
        *entry = Some((key, report.clone()));

        report
    }

    /// Drop the cached report.
    pub fn clear(&self) {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Builds the cache key for a report from everything the report depends on.
///
/// The anchor only counts to the minute so that repeated requests for "now"
/// share an entry.
#[derive(Debug, Default)]
pub struct Fingerprint {
    hasher: DefaultHasher,
}

impl Fingerprint {
    /// Start an empty fingerprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash every field of `records` the reports read.
    pub fn records(mut self, records: &[TransactionRecord]) -> Self {
        records.len().hash(&mut self.hasher);

        for record in records {
            record.id.hash(&mut self.hasher);
            record.timestamp.hash(&mut self.hasher);
            record.total.to_bits().hash(&mut self.hasher);
            record.kind.hash(&mut self.hasher);
            record.status.hash(&mut self.hasher);
            record.category_id.hash(&mut self.hasher);
            record.wallet_id.hash(&mut self.hasher);

            record.payments.len().hash(&mut self.hasher);
            for payment in &record.payments {
                payment.method.hash(&mut self.hasher);
                payment.amount.to_bits().hash(&mut self.hasher);
            }

            record.line_items.len().hash(&mut self.hasher);
            for item in &record.line_items {
                item.product_id.hash(&mut self.hasher);
                item.product_name.hash(&mut self.hasher);
                item.quantity.hash(&mut self.hasher);
                item.unit_price.to_bits().hash(&mut self.hasher);
            }
        }

        self
    }

    /// Hash the category names used as breakdown labels.
    pub fn categories(mut self, categories: &[Category]) -> Self {
        categories.len().hash(&mut self.hasher);

        for category in categories {
            category.id.hash(&mut self.hasher);
            category.name.hash(&mut self.hasher);
        }

        self
    }

    /// Hash every wallet field shown in the wallets table.
    pub fn wallets(mut self, wallets: &[Wallet]) -> Self {
        wallets.len().hash(&mut self.hasher);

        for wallet in wallets {
            wallet.id.hash(&mut self.hasher);
            wallet.name.hash(&mut self.hasher);
            wallet.balance.to_bits().hash(&mut self.hasher);
            wallet.color.hash(&mut self.hasher);
            wallet.kind.hash(&mut self.hasher);
        }

        self
    }

    /// Hash the period and the anchor truncated to the minute.
    pub fn period(mut self, period: PeriodKind, anchor: OffsetDateTime) -> Self {
        period.hash(&mut self.hasher);
        anchor.unix_timestamp().div_euclid(60).hash(&mut self.hasher);
        self
    }

    /// Hash the report settings.
    pub fn config(mut self, config: &ReportConfig) -> Self {
        config.timezone.name().hash(&mut self.hasher);
        config.locale.hash(&mut self.hasher);
        config.top_products.hash(&mut self.hasher);
        config.series_revenue.hash(&mut self.hasher);
        self
    }

    /// The cache key.
    pub fn finish(self) -> u64 {
        self.hasher.finish()
    }
}


#[cfg(test)]
mod fingerprint_tests {
    use time::macros::datetime;

    use crate::{
        record::{Payment, RecordStatus, TransactionRecord},
        report::{
            config::{ReportConfig, SeriesRevenue},
            period::PeriodKind,
        },
        timezone::BusinessTimezone,
        wallet::{Wallet, WalletKind},
    };

    use super::Fingerprint;

    fn config() -> ReportConfig {
        ReportConfig::new(BusinessTimezone::from_name("Etc/UTC").unwrap())
    }

    fn key(records: &[TransactionRecord], config: &ReportConfig, anchor: time::OffsetDateTime) -> u64 {
        Fingerprint::new()
            .records(records)
            .period(PeriodKind::ThisMonth, anchor)
            .config(config)
            .finish()
    }

    #[test]
    fn anchor_counts_to_the_minute() {
        let records = vec![TransactionRecord::sale(1, 10.0, "2024-03-15")];

        assert_eq!(
            key(&records, &config(), datetime!(2024-03-15 12:00:05 UTC)),
            key(&records, &config(), datetime!(2024-03-15 12:00:55 UTC))
        );
        assert_ne!(
            key(&records, &config(), datetime!(2024-03-15 12:00:05 UTC)),
            key(&records, &config(), datetime!(2024-03-15 12:01:05 UTC))
        );
    }

    #[test]
    fn record_changes_change_the_key() {
        let anchor = datetime!(2024-03-15 12:00:00 UTC);
        let original = vec![TransactionRecord::sale(1, 10.0, "2024-03-15")];
        let cancelled = vec![original[0].clone().status(RecordStatus::Cancelled)];
        let paid_by_pix = vec![original[0].clone().payments(vec![Payment::new("pix", 10.0)])];

        let base = key(&original, &config(), anchor);

        assert_ne!(base, key(&cancelled, &config(), anchor));
        assert_ne!(base, key(&paid_by_pix, &config(), anchor));
        assert_ne!(base, key(&[], &config(), anchor));
    }

    #[test]
    fn config_changes_change_the_key() {
        let anchor = datetime!(2024-03-15 12:00:00 UTC);
        let mut other = config();
        other.series_revenue = SeriesRevenue::PaymentBreakdown;

        assert_ne!(key(&[], &config(), anchor), key(&[], &other, anchor));
    }

    #[test]
    fn wallet_display_changes_change_the_key() {
        let wallet = Wallet {
            id: 1,
            name: "Till".to_owned(),
            balance: 100.0,
            color: "#16a34a".to_owned(),
            kind: WalletKind::Cash,
        };
        let recolored = Wallet {
            color: "#dc2626".to_owned(),
            ..wallet.clone()
        };
        let rekinded = Wallet {
            kind: WalletKind::Savings,
            ..wallet.clone()
        };
        let wallet_key = |wallet: Wallet| Fingerprint::new().wallets(&[wallet]).finish();

        let base = wallet_key(wallet);

        assert_ne!(base, wallet_key(recolored));
        assert_ne!(base, wallet_key(rekinded));
    }
}
