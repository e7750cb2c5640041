//! Sales and finance transactions, and how they are stored.

mod model;
mod store;

pub use model::{LineItem, Payment, RecordId, RecordKind, RecordStatus, TransactionRecord};
pub use store::{
    NewFinanceTransaction, NewSale, create_finance_transaction, create_finance_transaction_table,
    create_sale, create_sale_tables, get_finance_records, get_sale_records,
};
