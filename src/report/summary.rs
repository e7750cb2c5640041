//! Composing the resolver, filter, reducer, bucketizer and comparator into the
//! reports behind the dashboard and finance screens.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    category::Category,
    record::{RecordKind, TransactionRecord},
    report::{
        config::ReportConfig,
        filter::filter_by_window,
        growth::Growth,
        metrics::{
            GroupEntry, Metrics, OTHER_LABEL, ProductRanking, UNCATEGORIZED_LABEL,
            by_category, by_payment_method, reduce, sorted_by_amount, top_products,
        },
        period::{PeriodKind, PeriodRange, resolve},
        series::{ComparisonSeries, Series, align, bucketize},
    },
    wallet::{Wallet, WalletForecast, forecast_wallets},
};

/// Everything the sales dashboard shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    /// The windows the report covers.
    pub range: PeriodRange,
    /// KPIs of the current window.
    pub current: Metrics,
    /// KPIs of the previous window.
    pub previous: Metrics,
    /// Change in revenue against the previous window.
    pub revenue_growth: Growth,
    /// Change in the number of sales.
    pub count_growth: Growth,
    /// Change in the number of items sold.
    pub item_count_growth: Growth,
    /// Change in the average ticket.
    pub average_value_growth: Growth,
    /// Revenue per payment method in the current window.
    pub payment_methods: Vec<GroupEntry>,
    /// Revenue per category in the current window.
    pub categories: Vec<GroupEntry>,
    /// The best sellers of the current window.
    pub top_products: Vec<ProductRanking>,
    /// Revenue per bucket, current against previous window.
    pub series: ComparisonSeries,
}

impl PeriodReport {
    /// Whether neither window has any sales.
    pub fn is_empty(&self) -> bool {
        self.current.count == 0 && self.previous.count == 0
    }
}

/// Build the sales report for `period` around `anchor`.
///
/// Only records of kind [RecordKind::Sale] are considered.
pub fn build_period_report(
    records: &[TransactionRecord],
    categories: &[Category],
    period: PeriodKind,
    anchor: OffsetDateTime,
    config: &ReportConfig,
) -> PeriodReport {
    let tz = &config.timezone;
    let range = resolve(period, anchor, tz);
    let sales = || records.iter().filter(|record| record.kind == RecordKind::Sale);

    let current_records = filter_by_window(sales(), &range.current, tz);
    let previous_records = filter_by_window(sales(), &range.previous, tz);

    let current = reduce(&current_records);
    let previous = reduce(&previous_records);

    let series = align(
        bucketize(&current_records, &range.current, range.granularity, config),
        bucketize(&previous_records, &range.previous, range.granularity, config),
    );

    tracing::debug!(
        "built {} sales report: {} current and {} previous records",
        period.as_query_value(),
        current.count,
        previous.count
    );

    PeriodReport {
        range,
        current,
        previous,
        revenue_growth: Growth::between(current.revenue, previous.revenue),
        count_growth: Growth::between(current.count as f64, previous.count as f64),
        item_count_growth: Growth::between(current.item_count as f64, previous.item_count as f64),
        average_value_growth: Growth::between(current.average_value, previous.average_value),
        payment_methods: sorted_by_amount(&by_payment_method(&current_records), OTHER_LABEL),
        categories: sorted_by_amount(
            &by_category(&current_records, categories),
            UNCATEGORIZED_LABEL,
        ),
        top_products: top_products(&current_records, config.top_products),
        series,
    }
}

/// Income, expense and their difference for one window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlow {
    /// Total income.
    pub income: f64,
    /// Total expense.
    pub expense: f64,
    /// Income minus expense.
    pub net: f64,
    /// The number of income and expense records.
    pub count: usize,
}

impl CashFlow {
    fn from_records(income: &[&TransactionRecord], expense: &[&TransactionRecord]) -> Self {
        let income_metrics = reduce(income);
        let expense_metrics = reduce(expense);

        Self {
            income: income_metrics.revenue,
            expense: expense_metrics.revenue,
            net: income_metrics.revenue - expense_metrics.revenue,
            count: income_metrics.count + expense_metrics.count,
        }
    }
}

/// Income and expense per bucket of the current window.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CashFlowSeries {
    /// One label per bucket.
    pub labels: Vec<String>,
    /// Income per bucket.
    pub income: Vec<f64>,
    /// Expense per bucket.
    pub expense: Vec<f64>,
}

/// Everything the finance screen shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceReport {
    /// The windows the report covers.
    pub range: PeriodRange,
    /// Cash flow of the current window.
    pub current: CashFlow,
    /// Cash flow of the previous window.
    pub previous: CashFlow,
    /// Change in income against the previous window.
    pub income_growth: Growth,
    /// Change in expense against the previous window.
    pub expense_growth: Growth,
    /// Change in net against the previous window.
    pub net_growth: Growth,
    /// Income per category in the current window.
    pub income_categories: Vec<GroupEntry>,
    /// Expense per category in the current window.
    pub expense_categories: Vec<GroupEntry>,
    /// Income and expense per bucket of the current window.
    pub cash_flow: CashFlowSeries,
    /// Net per bucket, current against previous window.
    pub net_series: ComparisonSeries,
    /// Every wallet with its predicted balance. Does not depend on the period.
    pub wallets: Vec<WalletForecast>,
    /// The sum of the stored wallet balances.
    pub total_balance: f64,
    /// The sum of the predicted wallet balances.
    pub total_predicted_balance: f64,
}

impl FinanceReport {
    /// Whether neither window has any income or expense.
    pub fn is_empty(&self) -> bool {
        self.current.count == 0 && self.previous.count == 0
    }
}

/// Build the finance report for `period` around `anchor`.
///
/// Income and expense records are reduced separately; transfers and sales
/// are not counted as either. Pending records count towards the period like
/// paid ones, and additionally feed the predicted wallet balances.
pub fn build_finance_report(
    records: &[TransactionRecord],
    categories: &[Category],
    wallets: &[Wallet],
    period: PeriodKind,
    anchor: OffsetDateTime,
    config: &ReportConfig,
) -> FinanceReport {
    let tz = &config.timezone;
    let range = resolve(period, anchor, tz);
    let of_kind = |kind: RecordKind| records.iter().filter(move |record| record.kind == kind);

    let current_income = filter_by_window(of_kind(RecordKind::Income), &range.current, tz);
    let current_expense = filter_by_window(of_kind(RecordKind::Expense), &range.current, tz);
    let previous_income = filter_by_window(of_kind(RecordKind::Income), &range.previous, tz);
    let previous_expense = filter_by_window(of_kind(RecordKind::Expense), &range.previous, tz);

    let current = CashFlow::from_records(&current_income, &current_expense);
    let previous = CashFlow::from_records(&previous_income, &previous_expense);

    let income_series = bucketize(&current_income, &range.current, range.granularity, config);
    let expense_series = bucketize(&current_expense, &range.current, range.granularity, config);
    let previous_net = net_series(
        bucketize(&previous_income, &range.previous, range.granularity, config),
        &bucketize(&previous_expense, &range.previous, range.granularity, config),
    );
    let net_series = align(net_series(income_series.clone(), &expense_series), previous_net);

    let wallets = forecast_wallets(wallets, records);
    let total_balance = wallets.iter().map(|forecast| forecast.wallet.balance).sum();
    let total_predicted_balance = wallets
        .iter()
        .map(|forecast| forecast.predicted_balance)
        .sum();

    FinanceReport {
        range,
        current,
        previous,
        income_growth: Growth::between(current.income, previous.income),
        expense_growth: Growth::between(current.expense, previous.expense),
        net_growth: Growth::between(current.net, previous.net),
        income_categories: sorted_by_amount(
            &by_category(&current_income, categories),
            UNCATEGORIZED_LABEL,
        ),
        expense_categories: sorted_by_amount(
            &by_category(&current_expense, categories),
            UNCATEGORIZED_LABEL,
        ),
        cash_flow: CashFlowSeries {
            labels: income_series.labels,
            income: income_series.values,
            expense: expense_series.values,
        },
        net_series,
        wallets,
        total_balance,
        total_predicted_balance,
    }
}

fn net_series(income: Series, expense: &Series) -> Series {
    let values = income
        .values
        .iter()
        .zip(&expense.values)
        .map(|(income, expense)| income - expense)
        .collect();

    Series {
        labels: income.labels,
        values,
    }
}
