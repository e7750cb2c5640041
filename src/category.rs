//! Categories for sales and finance transactions.
//!
//! A record has at most one category. Records without one, or whose category
//! has since been deleted, are grouped under the "Uncategorized" label in
//! reports.

use std::str::FromStr;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// Whether a category files money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// For sales and income.
    Income,
    /// For expenses.
    Expense,
}

impl CategoryKind {
    /// The name used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            _ => Err(Error::InvalidCategoryKind(s.to_owned())),
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A category, e.g. 'Drinks' or 'Rent'.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name shown in breakdowns.
    pub name: String,
    /// Whether the category is for income or expense.
    pub kind: CategoryKind,
    /// A CSS colour, e.g. "#22c55e".
    pub color: String,
    /// The name of an icon, e.g. "cup".
    pub icon: String,
}

/// A category to be inserted into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The name of the category.
    pub name: String,
    /// Whether the category is for income or expense.
    pub kind: CategoryKind,
    /// A CSS colour.
    pub color: String,
    /// The name of an icon.
    pub icon: String,
}

impl NewCategory {
    /// Describe a new category.
    pub fn new(name: &str, kind: CategoryKind, color: &str, icon: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            kind,
            color: color.to_owned(),
            icon: icon.to_owned(),
        }
    }
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            UNIQUE(name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, kind, color, icon) VALUES (?1, ?2, ?3, ?4);",
        (&category.name, category.kind, &category.color, &category.icon),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: category.name,
        kind: category.kind,
        color: category.color,
        icon: category.icon,
    })
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind, color, icon FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{
        CategoryKind, NewCategory, create_category, create_category_table, get_all_categories,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_category_table(&conn).unwrap();
        conn
    }

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_category_table(&connection));
    }

    #[test]
    fn create_and_list_categories() {
        let conn = get_test_connection();
        let rent = create_category(
            NewCategory::new("Rent", CategoryKind::Expense, "#ef4444", "home"),
            &conn,
        )
        .unwrap();
        let drinks = create_category(
            NewCategory::new(" Drinks ", CategoryKind::Income, "#22c55e", "cup"),
            &conn,
        )
        .unwrap();

        let categories = get_all_categories(&conn).unwrap();

        assert_eq!(categories, vec![drinks.clone(), rent]);
        assert_eq!(drinks.name, "Drinks");
    }

    #[test]
    fn same_name_is_allowed_for_different_kinds() {
        let conn = get_test_connection();

        create_category(
            NewCategory::new("Misc", CategoryKind::Expense, "#000", "box"),
            &conn,
        )
        .unwrap();
        let result = create_category(
            NewCategory::new("Misc", CategoryKind::Income, "#000", "box"),
            &conn,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn invalid_kind() {
        assert_eq!(
            "transfer".parse::<CategoryKind>(),
            Err(Error::InvalidCategoryKind("transfer".to_owned()))
        );
    }
}
