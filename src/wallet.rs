//! Wallets hold money: the cash drawer, bank accounts, cards.
//!
//! The stored balance is authoritative. The predicted balance adds what the
//! pending finance transactions will do to it once they settle and is
//! recomputed on every read, never stored.

use std::{collections::HashMap, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::DatabaseId,
    record::{RecordKind, RecordStatus, TransactionRecord},
};

/// Database identifier for a wallet.
pub type WalletId = DatabaseId;

/// What sort of place the money is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// A cash drawer or till.
    Cash,
    /// A bank account.
    Bank,
    /// A card whose balance is usually negative.
    CreditCard,
    /// A savings account.
    Savings,
}

impl WalletKind {
    /// The name used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            WalletKind::Cash => "cash",
            WalletKind::Bank => "bank",
            WalletKind::CreditCard => "credit_card",
            WalletKind::Savings => "savings",
        }
    }

    /// The name shown to people.
    pub fn label(self) -> &'static str {
        match self {
            WalletKind::Cash => "Cash",
            WalletKind::Bank => "Bank",
            WalletKind::CreditCard => "Credit Card",
            WalletKind::Savings => "Savings",
        }
    }
}

impl FromStr for WalletKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(WalletKind::Cash),
            "bank" => Ok(WalletKind::Bank),
            "credit_card" => Ok(WalletKind::CreditCard),
            "savings" => Ok(WalletKind::Savings),
            _ => Err(Error::InvalidWalletKind(s.to_owned())),
        }
    }
}

impl ToSql for WalletKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WalletKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The amount of money held in one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wallet {
    /// The ID of the wallet.
    pub id: WalletId,
    /// The name shown in the wallets table.
    pub name: String,
    /// The balance as last recorded.
    pub balance: f64,
    /// A CSS colour, e.g. "#3b82f6".
    pub color: String,
    /// What sort of wallet it is.
    pub kind: WalletKind,
}

/// A wallet to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    /// The name of the wallet.
    pub name: String,
    /// The opening balance.
    pub balance: f64,
    /// A CSS colour.
    pub color: String,
    /// What sort of wallet it is.
    pub kind: WalletKind,
}

impl NewWallet {
    /// Describe a new wallet.
    pub fn new(name: &str, kind: WalletKind, balance: f64, color: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            balance,
            color: color.to_owned(),
            kind,
        }
    }
}

/// A wallet together with the balance it will have once pending
/// transactions settle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletForecast {
    /// The wallet as stored.
    pub wallet: Wallet,
    /// The stored balance plus pending income minus pending expense.
    pub predicted_balance: f64,
}

/// Create the wallet table.
pub fn create_wallet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS wallet (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            balance REAL NOT NULL,
            color TEXT NOT NULL,
            kind TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create a wallet and return it with its generated ID.
pub fn create_wallet(wallet: NewWallet, connection: &Connection) -> Result<Wallet, Error> {
    connection.execute(
        "INSERT INTO wallet (name, balance, color, kind) VALUES (?1, ?2, ?3, ?4)",
        (&wallet.name, wallet.balance, &wallet.color, wallet.kind),
    )?;

    Ok(Wallet {
        id: connection.last_insert_rowid(),
        name: wallet.name,
        balance: wallet.balance,
        color: wallet.color,
        kind: wallet.kind,
    })
}

fn map_row_to_wallet(row: &Row) -> Result<Wallet, rusqlite::Error> {
    Ok(Wallet {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        color: row.get(3)?,
        kind: row.get(4)?,
    })
}

/// Get all wallets ordered by name.
pub fn get_all_wallets(connection: &Connection) -> Result<Vec<Wallet>, Error> {
    connection
        .prepare("SELECT id, name, balance, color, kind FROM wallet ORDER BY name ASC")?
        .query_map([], map_row_to_wallet)?
        .map(|maybe_wallet| maybe_wallet.map_err(|error| error.into()))
        .collect()
}

/// Predicted balances for every wallet, in the order given.
///
/// Pending records are grouped by wallet in one pass over `records`.
pub fn forecast_wallets(wallets: &[Wallet], records: &[TransactionRecord]) -> Vec<WalletForecast> {
    let mut pending: HashMap<WalletId, f64> = HashMap::new();

    for record in records {
        if let Some(wallet_id) = record.wallet_id {
            *pending.entry(wallet_id).or_default() += pending_change(record);
        }
    }

    wallets
        .iter()
        .map(|wallet| WalletForecast {
            wallet: wallet.clone(),
            predicted_balance: wallet.balance + pending.get(&wallet.id).copied().unwrap_or(0.0),
        })
        .collect()
}

fn pending_change(record: &TransactionRecord) -> f64 {
    if record.status != RecordStatus::Pending {
        return 0.0;
    }

    match record.kind {
        RecordKind::Income => record.total,
        RecordKind::Expense => -record.total,
        RecordKind::Sale | RecordKind::Transfer => 0.0,
    }
}
