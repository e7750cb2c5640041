//! Application router configuration.

use axum::{Router, response::Redirect, routing::get};

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    finance::get_finance_page,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report_api::{get_finance_report, get_sales_report},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::FINANCE_VIEW, get(get_finance_page))
        .route(endpoints::SALES_REPORT_API, get(get_sales_report))
        .route(endpoints::FINANCE_REPORT_API, get(get_finance_report))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
