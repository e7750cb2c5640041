//! The endpoint URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The sales dashboard.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The finance overview: income, expenses and wallets.
pub const FINANCE_VIEW: &str = "/finance";
/// The sales report as JSON.
pub const SALES_REPORT_API: &str = "/api/reports/sales";
/// The finance report as JSON.
pub const FINANCE_REPORT_API: &str = "/api/reports/finance";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
