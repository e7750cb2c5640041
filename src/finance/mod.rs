//! Income, expenses and wallet balances.

mod handlers;
mod tables;

pub use handlers::{FinanceState, get_finance_page};
pub(crate) use handlers::load_finance_report;
