//! Database schema set-up.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    category::create_category_table,
    record::{create_finance_transaction_table, create_sale_tables},
    wallet::create_wallet_table,
};

/// Create the tables for categories, wallets, sales and finance transactions
/// if they do not exist yet.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_wallet_table(&transaction)?;
    create_sale_tables(&transaction)?;
    create_finance_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
