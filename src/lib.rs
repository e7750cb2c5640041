//! Tillbook serves the reporting screens of a point-of-sale system: the
//! sales dashboard and the finance overview.
//!
//! The interesting part lives in [report], a set of pure functions that turn
//! an in-memory collection of [TransactionRecord]s into KPIs, grouped
//! breakdowns and time-bucketed series compared against the previous period.
//! The rest of the crate fetches those records from SQLite and renders the
//! results as HTML pages and JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod cards;
mod category;
mod charts;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod finance;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod period_picker;
mod record;
pub mod report;
mod report_api;
mod routing;
mod tables;
mod timezone;
mod wallet;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{Category, CategoryId, CategoryKind, NewCategory, create_category};
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use record::{
    LineItem, NewFinanceTransaction, NewSale, Payment, RecordId, RecordKind, RecordStatus,
    TransactionRecord, create_finance_transaction, create_sale,
};
pub use routing::build_router;
pub use timezone::BusinessTimezone;
pub use wallet::{NewWallet, Wallet, WalletForecast, WalletId, WalletKind, create_wallet};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// The report engine itself never fails; these errors come from loading
/// records, parsing configuration and rendering responses.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The canonical timezone name does not match a known timezone.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A stored or requested record kind is not one of sale, income, expense
    /// or transfer, or the kind is not allowed for the table it is written to.
    #[error("invalid record kind \"{0}\"")]
    InvalidRecordKind(String),

    /// A stored record status is not one of pending, paid or cancelled.
    #[error("invalid record status \"{0}\"")]
    InvalidRecordStatus(String),

    /// A stored category kind is not one of income or expense.
    #[error("invalid category kind \"{0}\"")]
    InvalidCategoryKind(String),

    /// A stored wallet kind is not recognised.
    #[error("invalid wallet kind \"{0}\"")]
    InvalidWalletKind(String),

    /// A label locale other than "en" or "pt-BR" was requested.
    #[error("unsupported locale \"{0}\", expected \"en\" or \"pt-BR\"")]
    UnsupportedLocale(String),

    /// An unknown rule for accumulating chart series was requested.
    #[error("unknown series revenue rule \"{0}\", expected \"record-total\" or \"payment-breakdown\"")]
    InvalidSeriesRevenueRule(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn not_found_renders_404() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lock_error_renders_500() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
