//! The finance screen: income against expense for a period, net cash flow
//! compared with the previous period, and wallet balances with their
//! predicted values once pending records settle.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cards::{KpiCard, kpi_grid},
    category::get_all_categories,
    charts::{ReportChart, breakdown_chart, cash_flow_chart, charts_view, comparison_chart},
    endpoints,
    finance::tables::{cash_flow_summary_table, wallets_table},
    html::{ECHARTS_SCRIPT, HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    period_picker::{PeriodQuery, period_heading, period_selector},
    record::get_finance_records,
    report::{
        FinanceReport, Fingerprint, Growth, ReportCache, ReportConfig, build_finance_report,
    },
    tables::breakdown_table,
    wallet::get_all_wallets,
};

/// The state needed for displaying the finance page.
#[derive(Debug, Clone)]
pub struct FinanceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub report_config: ReportConfig,
    pub cache: Arc<ReportCache<FinanceReport>>,
}

impl FromRef<AppState> for FinanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            report_config: state.report_config,
            cache: state.finance_cache.clone(),
        }
    }
}

/// Load finance records, categories and wallets and build the report for
/// the requested period.
///
/// # Errors
/// Returns an error if the database lock cannot be acquired or any of the
/// tables cannot be read.
pub(crate) fn load_finance_report(
    db_connection: &Mutex<Connection>,
    cache: &ReportCache<FinanceReport>,
    config: &ReportConfig,
    query: &PeriodQuery,
) -> Result<FinanceReport, Error> {
    let (records, categories, wallets) = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let records = get_finance_records(&connection)
            .inspect_err(|error| tracing::error!("could not get finance records: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
        let wallets = get_all_wallets(&connection)
            .inspect_err(|error| tracing::error!("could not get wallets: {error}"))?;

        (records, categories, wallets)
    };

    let period = query.period();
    let anchor = query.anchor(&config.timezone);
    let key = Fingerprint::new()
        .records(&records)
        .categories(&categories)
        .wallets(&wallets)
        .period(period, anchor)
        .config(config)
        .finish();

    Ok(cache.get_or_compute(key, || {
        build_finance_report(&records, &categories, &wallets, period, anchor, config)
    }))
}

/// Display the finance report for the period in the query string.
pub async fn get_finance_page(
    State(state): State<FinanceState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let report =
        load_finance_report(&state.db_connection, &state.cache, &state.report_config, &query)?;
    let content = finance_content(&report, &state.report_config, query.raw_anchor());

    if is_htmx_request {
        return Ok(content.into_response());
    }

    let nav_bar = NavBar::new(endpoints::FINANCE_VIEW).into_html();
    let page = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (content)
        }
    );

    Ok(base("Finance", &[HeadElement::ScriptLink(ECHARTS_SCRIPT)], &page).into_response())
}

fn finance_content(report: &FinanceReport, config: &ReportConfig, anchor: Option<&str>) -> Markup {
    let period = report.range.period;
    let comparison = period.comparison_label();

    let cards = vec![
        KpiCard::new(
            "Income",
            format_currency(report.current.income),
            report.income_growth,
            comparison,
        ),
        KpiCard::new(
            "Expense",
            format_currency(report.current.expense),
            report.expense_growth,
            comparison,
        )
        .lower_is_better(),
        KpiCard::new(
            "Net",
            format_currency(report.current.net),
            report.net_growth,
            comparison,
        ),
        KpiCard::new(
            "Predicted Balance",
            format_currency(report.total_predicted_balance),
            Growth::between(report.total_predicted_balance, report.total_balance),
            "vs current balance",
        ),
    ];

    html!(
        div id="report-content" class="w-full"
        {
            (period_selector(endpoints::FINANCE_VIEW, period, anchor))
            (period_heading(&report.range, &config.timezone))
            (kpi_grid(cards))

            @if report.is_empty() {
                div id="no-data" class="flex flex-col items-center py-8"
                {
                    h2 class="text-xl font-bold" { "No income or expenses" }

                    p { "Nothing was recorded in this period or the one before it." }
                }
            } @else {
                (charts_view(&[
                    ReportChart::new("cash-flow-chart", cash_flow_chart(&report.cash_flow, period)),
                    ReportChart::new("net-chart", comparison_chart("Net", &report.net_series, period)),
                    ReportChart::new(
                        "income-categories-chart",
                        breakdown_chart("Income by Category", &report.income_categories),
                    ),
                    ReportChart::new(
                        "expense-categories-chart",
                        breakdown_chart("Expenses by Category", &report.expense_categories),
                    ),
                ]))
            }

            div class="grid grid-cols-1 xl:grid-cols-2 gap-4 mb-8"
            {
                (wallets_table(&report.wallets, report.total_balance, report.total_predicted_balance))

                @if !report.is_empty() {
                    (cash_flow_summary_table(report))
                    (breakdown_table("income-categories", "Income by Category", &report.income_categories))
                    (breakdown_table("expense-categories", "Expenses by Category", &report.expense_categories))
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use axum_htmx::HxRequest;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        period_picker::PeriodQuery,
        record::{NewFinanceTransaction, RecordKind, RecordStatus, create_finance_transaction},
        report::{ReportCache, ReportConfig},
        test_utils::{assert_valid_html, parse_html_document, parse_html_fragment},
        timezone::BusinessTimezone,
        wallet::{NewWallet, WalletKind, create_wallet},
    };

    use super::{FinanceState, get_finance_page, load_finance_report};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn get_test_state(conn: Connection) -> FinanceState {
        FinanceState {
            db_connection: Arc::new(Mutex::new(conn)),
            report_config: ReportConfig::new(BusinessTimezone::from_name("Etc/UTC").unwrap()),
            cache: Arc::new(ReportCache::new()),
        }
    }

    fn march_2024() -> PeriodQuery {
        PeriodQuery {
            period: Some("thisMonth".to_owned()),
            anchor: Some("2024-03-15".to_owned()),
        }
    }

    fn seed(conn: &Connection) {
        let wallet = create_wallet(
            NewWallet::new("Bank", WalletKind::Bank, 1000.0, "#2563eb"),
            conn,
        )
        .unwrap();

        for transaction in [
            NewFinanceTransaction::build(RecordKind::Income, 500.0, "2024-03-05"),
            NewFinanceTransaction::build(RecordKind::Expense, 200.0, "2024-03-06"),
            NewFinanceTransaction::build(RecordKind::Income, 150.0, "2024-02-05"),
            NewFinanceTransaction::build(RecordKind::Expense, 300.0, "2024-04-20")
                .status(RecordStatus::Pending)
                .wallet_id(Some(wallet.id)),
        ] {
            create_finance_transaction(&transaction, conn).unwrap();
        }
    }

    #[tokio::test]
    async fn finance_page_loads_successfully() {
        let conn = get_test_connection();
        seed(&conn);
        let state = get_test_state(conn);

        let response = get_finance_page(State(state), HxRequest(false), Query(march_2024()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        for selector in ["#cash-flow-chart", "#net-chart", "#wallets", "#kpis"] {
            assert!(
                html.select(&Selector::parse(selector).unwrap()).next().is_some(),
                "'{selector}' not found"
            );
        }
    }

    #[tokio::test]
    async fn report_reads_all_tables() {
        let conn = get_test_connection();
        seed(&conn);
        let state = get_test_state(conn);

        let report = load_finance_report(
            &state.db_connection,
            &state.cache,
            &state.report_config,
            &march_2024(),
        )
        .unwrap();

        assert_eq!(report.current.income, 500.0);
        assert_eq!(report.current.expense, 200.0);
        assert_eq!(report.current.net, 300.0);
        assert_eq!(report.previous.net, 150.0);
        assert_eq!(report.total_balance, 1000.0);
        assert_eq!(report.total_predicted_balance, 700.0);
    }

    #[tokio::test]
    async fn shows_wallets_without_records() {
        let conn = get_test_connection();
        create_wallet(NewWallet::new("Cash", WalletKind::Cash, 20.0, "#16a34a"), &conn).unwrap();
        let state = get_test_state(conn);

        let response = get_finance_page(State(state), HxRequest(true), Query(march_2024()))
            .await
            .unwrap();

        let html = parse_html_fragment(response).await;
        assert!(html.select(&Selector::parse("#no-data").unwrap()).next().is_some());
        assert_eq!(
            html.select(&Selector::parse("#wallets tbody tr").unwrap()).count(),
            1
        );
    }
}
