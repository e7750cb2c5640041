//! SQLite persistence for sales and finance transactions.
//!
//! Reports always fetch every record in one go; there is no pagination. The
//! insert functions exist so the seed binary and the tests can populate the
//! database.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::CategoryId,
    database_id::DatabaseId,
    record::model::{LineItem, Payment, RecordId, RecordKind, RecordStatus, TransactionRecord},
    wallet::WalletId,
};

/// Create the tables for sales, their payments and their line items.
pub fn create_sale_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale (
            id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL,
            total REAL NOT NULL,
            status TEXT NOT NULL,
            category_id INTEGER,
            wallet_id INTEGER,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale_payment (
            id INTEGER PRIMARY KEY,
            sale_id INTEGER NOT NULL,
            method TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(sale_id) REFERENCES sale(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale_item (
            id INTEGER PRIMARY KEY,
            sale_id INTEGER NOT NULL,
            product_id INTEGER,
            product_name TEXT,
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL,
            FOREIGN KEY(sale_id) REFERENCES sale(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create the table for income, expense and transfer transactions.
pub fn create_finance_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS finance_transaction (
            id INTEGER PRIMARY KEY,
            occurred_at TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            status TEXT NOT NULL,
            category_id INTEGER,
            wallet_id INTEGER,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

/// A sale to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    created_at: String,
    total: f64,
    status: RecordStatus,
    category_id: Option<CategoryId>,
    wallet_id: Option<WalletId>,
    payments: Vec<Payment>,
    line_items: Vec<LineItem>,
}

impl NewSale {
    /// Start building a paid sale of `total` made at `created_at`.
    pub fn build(total: f64, created_at: &str) -> Self {
        Self {
            created_at: created_at.to_owned(),
            total,
            status: RecordStatus::Paid,
            category_id: None,
            wallet_id: None,
            payments: Vec::new(),
            line_items: Vec::new(),
        }
    }

    /// Set the status.
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the category.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the wallet.
    pub fn wallet_id(mut self, wallet_id: Option<WalletId>) -> Self {
        self.wallet_id = wallet_id;
        self
    }

    /// Add a payment part.
    pub fn payment(mut self, method: &str, amount: f64) -> Self {
        self.payments.push(Payment::new(method, amount));
        self
    }

    /// Add a line item.
    pub fn line_item(mut self, line_item: LineItem) -> Self {
        self.line_items.push(line_item);
        self
    }
}

/// Insert a sale with its payments and line items.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails, e.g. for a category or
/// wallet ID that does not exist.
pub fn create_sale(sale: &NewSale, connection: &Connection) -> Result<RecordId, Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO sale (created_at, total, status, category_id, wallet_id)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &sale.created_at,
            sale.total,
            sale.status,
            sale.category_id,
            sale.wallet_id,
        ),
    )?;
    let sale_id = transaction.last_insert_rowid();

    for payment in &sale.payments {
        transaction.execute(
            "INSERT INTO sale_payment (sale_id, method, amount) VALUES (?1, ?2, ?3)",
            (sale_id, &payment.method, payment.amount),
        )?;
    }

    for item in &sale.line_items {
        transaction.execute(
            "INSERT INTO sale_item (sale_id, product_id, product_name, quantity, unit_price)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                sale_id,
                item.product_id,
                &item.product_name,
                item.quantity,
                item.unit_price,
            ),
        )?;
    }

    transaction.commit()?;

    Ok(RecordId::Sale(sale_id))
}

/// An income, expense or transfer to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinanceTransaction {
    occurred_at: String,
    amount: f64,
    kind: RecordKind,
    status: RecordStatus,
    category_id: Option<CategoryId>,
    wallet_id: Option<WalletId>,
}

impl NewFinanceTransaction {
    /// Start building a paid transaction of `kind`.
    pub fn build(kind: RecordKind, amount: f64, occurred_at: &str) -> Self {
        Self {
            occurred_at: occurred_at.to_owned(),
            amount,
            kind,
            status: RecordStatus::Paid,
            category_id: None,
            wallet_id: None,
        }
    }

    /// Set the status.
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the category.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the wallet.
    pub fn wallet_id(mut self, wallet_id: Option<WalletId>) -> Self {
        self.wallet_id = wallet_id;
        self
    }
}

/// Insert a finance transaction.
///
/// # Errors
/// Returns [Error::InvalidRecordKind] if the transaction is a sale, sales
/// belong in the sale table. Returns [Error::SqlError] if the insert fails.
pub fn create_finance_transaction(
    transaction: &NewFinanceTransaction,
    connection: &Connection,
) -> Result<RecordId, Error> {
    if transaction.kind == RecordKind::Sale {
        return Err(Error::InvalidRecordKind(
            transaction.kind.as_str().to_owned(),
        ));
    }

    connection.execute(
        "INSERT INTO finance_transaction
            (occurred_at, amount, kind, status, category_id, wallet_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &transaction.occurred_at,
            transaction.amount,
            transaction.kind,
            transaction.status,
            transaction.category_id,
            transaction.wallet_id,
        ),
    )?;

    Ok(RecordId::Finance(connection.last_insert_rowid()))
}

fn map_row_to_sale(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    let id: DatabaseId = row.get(0)?;
    let timestamp: String = row.get(1)?;
    let total = row.get(2)?;

    Ok(
        TransactionRecord::new(RecordId::Sale(id), RecordKind::Sale, total, &timestamp)
            .status(row.get(3)?)
            .category_id(row.get(4)?)
            .wallet_id(row.get(5)?),
    )
}

/// Get every sale with its payments and line items, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if a query fails or a stored status is invalid.
pub fn get_sale_records(connection: &Connection) -> Result<Vec<TransactionRecord>, Error> {
    let mut records = connection
        .prepare(
            "SELECT id, created_at, total, status, category_id, wallet_id
            FROM sale ORDER BY created_at, id",
        )?
        .query_map([], map_row_to_sale)?
        .collect::<Result<Vec<_>, _>>()?;

    let positions: HashMap<DatabaseId, usize> = records
        .iter()
        .enumerate()
        .filter_map(|(position, record)| match record.id {
            RecordId::Sale(id) => Some((id, position)),
            RecordId::Finance(_) => None,
        })
        .collect();

    let mut stmt =
        connection.prepare("SELECT sale_id, method, amount FROM sale_payment ORDER BY id")?;
    let payments = stmt.query_map([], |row| {
        Ok((
            row.get::<_, DatabaseId>(0)?,
            Payment {
                method: row.get(1)?,
                amount: row.get(2)?,
            },
        ))
    })?;

    for payment in payments {
        let (sale_id, payment) = payment?;
        if let Some(&position) = positions.get(&sale_id) {
            records[position].payments.push(payment);
        }
    }

    let mut stmt = connection.prepare(
        "SELECT sale_id, product_id, product_name, quantity, unit_price
        FROM sale_item ORDER BY id",
    )?;
    let items = stmt.query_map([], |row| {
        Ok((
            row.get::<_, DatabaseId>(0)?,
            LineItem {
                product_id: row.get(1)?,
                product_name: row.get(2)?,
                quantity: row.get(3)?,
                unit_price: row.get(4)?,
            },
        ))
    })?;

    for item in items {
        let (sale_id, item) = item?;
        if let Some(&position) = positions.get(&sale_id) {
            records[position].line_items.push(item);
        }
    }

    tracing::debug!("loaded {} sale records", records.len());

    Ok(records)
}

/// Get every income, expense and transfer, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a stored kind or status is
/// invalid.
pub fn get_finance_records(connection: &Connection) -> Result<Vec<TransactionRecord>, Error> {
    let records = connection
        .prepare(
            "SELECT id, occurred_at, amount, kind, status, category_id, wallet_id
            FROM finance_transaction ORDER BY occurred_at, id",
        )?
        .query_map([], |row| {
            let id: DatabaseId = row.get(0)?;
            let timestamp: String = row.get(1)?;

            Ok(
                TransactionRecord::new(RecordId::Finance(id), row.get(3)?, row.get(2)?, &timestamp)
                    .status(row.get(4)?)
                    .category_id(row.get(5)?)
                    .wallet_id(row.get(6)?),
            )
        })?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("loaded {} finance records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{CategoryKind, NewCategory, create_category},
        db::initialize,
        record::model::{LineItem, Payment, RecordId, RecordKind, RecordStatus},
    };

    use super::{
        NewFinanceTransaction, NewSale, create_finance_transaction, create_sale,
        get_finance_records, get_sale_records,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn sale_round_trips_with_payments_and_items() {
        let conn = get_test_connection();
        let category = create_category(
            NewCategory::new("Drinks", CategoryKind::Income, "#ff0000", "cup"),
            &conn,
        )
        .unwrap();

        let id = create_sale(
            &NewSale::build(100.0, "2024-03-15T10:00:00-03:00")
                .category_id(Some(category.id))
                .payment("money", 60.0)
                .payment("pix", 40.0)
                .line_item(LineItem::new("Coffee", 4, 25.0).product_id(7)),
            &conn,
        )
        .unwrap();

        let records = get_sale_records(&conn).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.kind, RecordKind::Sale);
        assert_eq!(record.status, RecordStatus::Paid);
        assert_eq!(record.category_id, Some(category.id));
        assert_eq!(
            record.payments,
            vec![Payment::new("money", 60.0), Payment::new("pix", 40.0)]
        );
        assert_eq!(
            record.line_items,
            vec![LineItem::new("Coffee", 4, 25.0).product_id(7)]
        );
    }

    #[test]
    fn payments_are_attached_to_their_own_sale() {
        let conn = get_test_connection();
        create_sale(&NewSale::build(10.0, "2024-03-15").payment("pix", 10.0), &conn).unwrap();
        create_sale(&NewSale::build(20.0, "2024-03-16"), &conn).unwrap();

        let records = get_sale_records(&conn).unwrap();

        assert_eq!(records[0].payments.len(), 1);
        assert!(records[1].payments.is_empty());
    }

    #[test]
    fn malformed_timestamps_are_loaded_verbatim() {
        let conn = get_test_connection();
        create_sale(&NewSale::build(10.0, "not a date"), &conn).unwrap();

        let records = get_sale_records(&conn).unwrap();

        assert_eq!(records[0].timestamp, "not a date");
    }

    #[test]
    fn finance_transaction_round_trips() {
        let conn = get_test_connection();

        let id = create_finance_transaction(
            &NewFinanceTransaction::build(RecordKind::Expense, 80.0, "2024-03-10")
                .status(RecordStatus::Pending),
            &conn,
        )
        .unwrap();

        let records = get_finance_records(&conn).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].kind, RecordKind::Expense);
        assert_eq!(records[0].status, RecordStatus::Pending);
        assert_eq!(records[0].total, 80.0);
        assert!(matches!(id, RecordId::Finance(_)));
    }

    #[test]
    fn finance_table_rejects_sales() {
        let conn = get_test_connection();

        let result = create_finance_transaction(
            &NewFinanceTransaction::build(RecordKind::Sale, 80.0, "2024-03-10"),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidRecordKind("sale".to_owned())));
    }

    #[test]
    fn invalid_stored_status_is_an_error() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO sale (created_at, total, status) VALUES ('2024-03-10', 1.0, 'lost')",
            (),
        )
        .unwrap();

        let result = get_sale_records(&conn);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }
}
