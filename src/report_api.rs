//! JSON endpoints serving the same reports as the dashboard and finance screens.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error,
    dashboard::{DashboardState, load_sales_report},
    finance::{FinanceState, load_finance_report},
    period_picker::PeriodQuery,
};

fn json_response<T: Serialize>(value: &T) -> Result<Response, Error> {
    let body = serde_json::to_string(value).map_err(|error| {
        tracing::error!("could not serialize report: {error}");
        Error::JSONSerializationError(error.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// The sales report for the period in the query string.
pub async fn get_sales_report(
    State(state): State<DashboardState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let report = load_sales_report(&state.db_connection, &state.cache, &state.report_config, &query)?;

    json_response(&report)
}

/// The finance report for the period in the query string.
pub async fn get_finance_report(
    State(state): State<FinanceState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let report =
        load_finance_report(&state.db_connection, &state.cache, &state.report_config, &query)?;

    json_response(&report)
}
