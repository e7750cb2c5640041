//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    report::{FinanceReport, PeriodReport, ReportCache, ReportConfig},
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The timezone, locale and other settings every report is computed with.
    pub report_config: ReportConfig,

    /// The last sales report served.
    pub sales_cache: Arc<ReportCache<PeriodReport>>,

    /// The last finance report served.
    pub finance_cache: Arc<ReportCache<FinanceReport>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// categories, wallets, sales and finance transactions.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, report_config: ReportConfig) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            report_config,
            sales_cache: Arc::new(ReportCache::new()),
            finance_cache: Arc::new(ReportCache::new()),
        })
    }
}
