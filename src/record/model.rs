//! The transaction record shared by sales and finance transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, database_id::DatabaseId, wallet::WalletId};

/// Uniquely identifies a record across the sale and finance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "source", content = "id", rename_all = "lowercase")]
pub enum RecordId {
    /// A row in the `sale` table.
    Sale(DatabaseId),
    /// A row in the `finance_transaction` table.
    Finance(DatabaseId),
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Sale(id) => write!(f, "sale-{id}"),
            RecordId::Finance(id) => write!(f, "finance-{id}"),
        }
    }
}

/// What a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A point-of-sale sale.
    Sale,
    /// Money coming in, recorded on the finance screen.
    Income,
    /// Money going out, recorded on the finance screen.
    Expense,
    /// Money moved between wallets; neither income nor expense.
    Transfer,
}

impl RecordKind {
    /// The name used in the database and in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Sale => "sale",
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::Transfer => "transfer",
        }
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(RecordKind::Sale),
            "income" => Ok(RecordKind::Income),
            "expense" => Ok(RecordKind::Expense),
            "transfer" => Ok(RecordKind::Transfer),
            _ => Err(Error::InvalidRecordKind(s.to_owned())),
        }
    }
}

/// The settlement state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Not settled yet. Pending finance transactions feed predicted balances.
    Pending,
    /// Paid or completed.
    Paid,
    /// Cancelled or voided. Never counted in any report.
    Cancelled,
}

impl RecordStatus {
    /// The name used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Paid => "paid",
            RecordStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "paid" | "completed" => Ok(RecordStatus::Paid),
            "cancelled" | "canceled" | "voided" => Ok(RecordStatus::Cancelled),
            _ => Err(Error::InvalidRecordStatus(s.to_owned())),
        }
    }
}

macro_rules! text_column {
    ($type:ty) => {
        impl ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
            }
        }
    };
}

text_column!(RecordKind);
text_column!(RecordStatus);

/// One part of a (possibly split) payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    /// The payment method, e.g. "money", "pix", "credit".
    pub method: String,
    /// The amount paid with this method.
    pub amount: f64,
}

impl Payment {
    /// Create a payment part.
    pub fn new(method: &str, amount: f64) -> Self {
        Self {
            method: method.to_owned(),
            amount,
        }
    }
}

/// A product line on a sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    /// The product sold, if it still exists in the catalog.
    pub product_id: Option<DatabaseId>,
    /// The product name at the time of sale.
    pub product_name: Option<String>,
    /// How many units were sold.
    pub quantity: u32,
    /// The price of one unit.
    pub unit_price: f64,
}

impl LineItem {
    /// Create a line item for a named product.
    pub fn new(product_name: &str, quantity: u32, unit_price: f64) -> Self {
        Self {
            product_id: None,
            product_name: Some(product_name.to_owned()),
            quantity,
            unit_price,
        }
    }

    /// Set the catalog product ID.
    pub fn product_id(mut self, product_id: DatabaseId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// The quantity times the unit price.
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// A sale or finance transaction, as consumed by the report engine.
///
/// `payments` is always present and may be empty. When it is non-empty it is
/// the source of truth for revenue and `total` is ignored; see
/// [TransactionRecord::revenue].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// The unique ID of the record.
    pub id: RecordId,
    /// The timestamp exactly as stored: RFC 3339, naive date-time or date-only.
    pub timestamp: String,
    /// The record's own amount field.
    pub total: f64,
    /// What the record represents.
    pub kind: RecordKind,
    /// The settlement state.
    pub status: RecordStatus,
    /// The category the record was filed under.
    pub category_id: Option<CategoryId>,
    /// The wallet the money moves through.
    pub wallet_id: Option<WalletId>,
    /// The payment parts of a split payment, in the order they were taken.
    pub payments: Vec<Payment>,
    /// The products sold.
    pub line_items: Vec<LineItem>,
}

impl TransactionRecord {
    /// Create a paid record with no category, wallet, payments or line items.
    pub fn new(id: RecordId, kind: RecordKind, total: f64, timestamp: &str) -> Self {
        Self {
            id,
            timestamp: timestamp.to_owned(),
            total,
            kind,
            status: RecordStatus::Paid,
            category_id: None,
            wallet_id: None,
            payments: Vec::new(),
            line_items: Vec::new(),
        }
    }

    /// Create a paid sale.
    pub fn sale(id: DatabaseId, total: f64, timestamp: &str) -> Self {
        Self::new(RecordId::Sale(id), RecordKind::Sale, total, timestamp)
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

    /// Set the payment parts.
    pub fn payments(mut self, payments: Vec<Payment>) -> Self {
        self.payments = payments;
        self
    }

    /// Set the line items.
    pub fn line_items(mut self, line_items: Vec<LineItem>) -> Self {
        self.line_items = line_items;
        self
    }

    /// The revenue attributed to this record: the sum of the payment parts
    /// when there are any, otherwise the record's own total.
    pub fn revenue(&self) -> f64 {
        if self.payments.is_empty() {
            self.total
        } else {
            self.payments.iter().map(|payment| payment.amount).sum()
        }
    }

    /// The number of units across all line items.
    pub fn item_count(&self) -> u64 {
        self.line_items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Whether the record was cancelled or voided.
    pub fn is_cancelled(&self) -> bool {
        self.status == RecordStatus::Cancelled
    }
}
