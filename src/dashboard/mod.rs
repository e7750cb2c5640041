//! Dashboard module
//!
//! Provides the sales overview: KPIs, revenue against the previous period and
//! breakdowns by payment method, category and product.

mod handlers;
mod tables;

pub use handlers::{DashboardState, get_dashboard_page};
pub(crate) use handlers::load_sales_report;
