//! Dashboard HTTP handlers and view rendering.
//!
//! The dashboard shows the sales report for one period: KPI cards, the
//! revenue comparison chart, payment method and category breakdowns and the
//! best selling products. Switching the period swaps `#report-content` via
//! htmx, so the handler returns either the whole page or just that fragment.

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
    charts::{ReportChart, breakdown_chart, charts_view, comparison_chart},
    dashboard::tables::{sales_summary_table, top_products_table},
    endpoints,
    html::{ECHARTS_SCRIPT, HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    period_picker::{PeriodQuery, period_heading, period_selector},
    record::get_sale_records,
    report::{Fingerprint, PeriodReport, ReportCache, ReportConfig, build_period_report},
    tables::breakdown_table,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading sales and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    pub report_config: ReportConfig,
    /// The last report served, reused while the sales and query are unchanged.
    pub cache: Arc<ReportCache<PeriodReport>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            report_config: state.report_config,
            cache: state.sales_cache.clone(),
        }
    }
}

/// Load the sales and build the report for the requested period.
///
/// # Errors
/// Returns an error if the database lock cannot be acquired or the records
/// cannot be read.
pub(crate) fn load_sales_report(
    db_connection: &Mutex<Connection>,
    cache: &ReportCache<PeriodReport>,
    config: &ReportConfig,
    query: &PeriodQuery,
) -> Result<PeriodReport, Error> {
    let (records, categories) = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let records = get_sale_records(&connection)
            .inspect_err(|error| tracing::error!("could not get sales: {error}"))?;
        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (records, categories)
    };

    let period = query.period();
    let anchor = query.anchor(&config.timezone);
    let key = Fingerprint::new()
        .records(&records)
        .categories(&categories)
        .period(period, anchor)
        .config(config)
        .finish();

    Ok(cache.get_or_compute(key, || {
        build_period_report(&records, &categories, period, anchor, config)
    }))
}

/// Display the sales report for the period in the query string.
///
/// htmx requests only get the `#report-content` fragment.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let report = load_sales_report(&state.db_connection, &state.cache, &state.report_config, &query)?;
    let content = dashboard_content(&report, &state.report_config, query.raw_anchor());

    if is_htmx_request {
        return Ok(content.into_response());
    }

    Ok(dashboard_view(NavBar::new(endpoints::DASHBOARD_VIEW), &content).into_response())
}

fn build_dashboard_charts(report: &PeriodReport) -> [ReportChart; 3] {
    [
        ReportChart::new(
            "revenue-chart",
            comparison_chart("Revenue", &report.series, report.range.period),
        ),
        ReportChart::new(
            "payment-methods-chart",
            breakdown_chart("Payment Methods", &report.payment_methods),
        ),
        ReportChart::new(
            "categories-chart",
            breakdown_chart("Categories", &report.categories),
        ),
    ]
}

fn kpi_cards(report: &PeriodReport) -> Vec<KpiCard<'static>> {
    let comparison = report.range.period.comparison_label();

    vec![
        KpiCard::new(
            "Revenue",
            format_currency(report.current.revenue),
            report.revenue_growth,
            comparison,
        ),
        KpiCard::new(
            "Sales",
            report.current.count.to_string(),
            report.count_growth,
            comparison,
        ),
        KpiCard::new(
            "Items Sold",
            report.current.item_count.to_string(),
            report.item_count_growth,
            comparison,
        ),
        KpiCard::new(
            "Average Ticket",
            format_currency(report.current.average_value),
            report.average_value_growth,
            comparison,
        ),
    ]
}

/// The part of the page that is replaced when the period changes.
fn dashboard_content(report: &PeriodReport, config: &ReportConfig, anchor: Option<&str>) -> Markup {
    let selector = period_selector(endpoints::DASHBOARD_VIEW, report.range.period, anchor);
    let heading = period_heading(&report.range, &config.timezone);

    html!(
        div id="report-content" class="w-full"
        {
            (selector)
            (heading)

            @if report.is_empty() {
                (no_sales_view())
            } @else {
                (kpi_grid(kpi_cards(report)))
                (charts_view(&build_dashboard_charts(report)))

                div class="grid grid-cols-1 xl:grid-cols-2 gap-4 mb-8"
                {
                    (sales_summary_table(report))
                    (top_products_table(&report.top_products))
                    (breakdown_table("payment-methods", "Payment Methods", &report.payment_methods))
                    (breakdown_table("categories", "Categories", &report.categories))
                }
            }
        }
    )
}

fn no_sales_view() -> Markup {
    html!(
        div id="no-data" class="flex flex-col items-center py-8"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "There are no sales in this period or the one before it.
                Try a longer period."
            }
        }
    )
}

fn dashboard_view(nav_bar: NavBar, content: &Markup) -> Markup {
    let nav_bar = nav_bar.into_html();

    let page = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (content)
        }
    );

    base("Sales", &[HeadElement::ScriptLink(ECHARTS_SCRIPT)], &page)
}
