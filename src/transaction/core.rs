//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, Money, auth::UserID};

/// The database ID of a transaction.
pub type TransactionId = i64;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money added to an account.
    Income,
    /// Money spent from an account. Counts towards the monthly budget.
    Expense,
}

impl TransactionType {
    fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type {other:?}").into(),
            )),
        }
    }
}

/// The processing state of a transaction. The ledger only writes completed
/// transactions, the other states exist for records imported from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// The money has moved.
    Completed,
    /// The money has not moved yet.
    Pending,
    /// The money will not move.
    Failed,
}

impl TransactionStatus {
    fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Completed" => Ok(TransactionStatus::Completed),
            "Pending" => Ok(TransactionStatus::Pending),
            "Failed" => Ok(TransactionStatus::Failed),
            other => Err(FromSqlError::Other(
                format!("unknown transaction status {other:?}").into(),
            )),
        }
    }
}

/// A single entry in the ledger: an expense or income against one of the
/// user's accounts. Transactions are never updated or deleted.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The processing state.
    pub status: TransactionStatus,
    /// The amount of money spent or earned. Always positive.
    pub amount: Money,
    /// Where the money came from or went to, e.g. the account name.
    pub source: String,
    /// When the transaction was recorded.
    #[serde(rename = "createdat", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserID,
        transaction_type: TransactionType,
        amount: Money,
        created_at: OffsetDateTime,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            transaction_type,
            amount,
            created_at,
            description: String::new(),
            source: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The text fields default to empty strings. The ledger only records money
/// that has moved, so every transaction is written as
/// [TransactionStatus::Completed].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    user_id: UserID,
    transaction_type: TransactionType,
    amount: Money,
    created_at: OffsetDateTime,
    description: String,
    source: String,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the source for the transaction.
    pub fn source(mut self, source: &str) -> Self {
        self.source = source.to_owned();
        self
    }
}

/// The income and expense totals for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                status TEXT NOT NULL CHECK (status IN ('Completed', 'Pending', 'Failed')),
                amount INTEGER NOT NULL CHECK (amount > 0),
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the budget check, the transaction list and the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_created
         ON \"transaction\"(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction into the ledger.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the amount is not positive,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_positive() {
        return Err(Error::Validation(
            "Amount should be greater than 0.".to_owned(),
        ));
    }

    connection
        .prepare(
            "INSERT INTO \"transaction\"
             (user_id, description, type, status, amount, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, description, type, status, amount, source, created_at",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.description,
                builder.transaction_type,
                TransactionStatus::Completed,
                builder.amount,
                builder.source,
                builder.created_at,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Sum the user's expenses recorded in the half-open range `[start, end)`.
pub fn sum_expenses_between(
    user_id: UserID,
    start: OffsetDateTime,
    end: OffsetDateTime,
    connection: &Connection,
) -> Result<Money, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND type = ?2 AND created_at >= ?3 AND created_at < ?4",
            (user_id.as_i64(), TransactionType::Expense, start, end),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the user's transactions recorded in `[start, end)`, newest first.
///
/// If `search` is given, only transactions whose description, status or
/// source contain it are returned. Matching ignores ASCII case and treats
/// `%` and `_` literally.
pub fn get_transactions_in_window(
    user_id: UserID,
    start: OffsetDateTime,
    end: OffsetDateTime,
    search: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let pattern = search.map(|term| format!("%{}%", escape_like(term)));

    connection
        .prepare(
            "SELECT id, user_id, description, type, status, amount, source, created_at
             FROM \"transaction\"
             WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3
             AND (?4 IS NULL
                  OR description LIKE ?4 ESCAPE '\\'
                  OR status LIKE ?4 ESCAPE '\\'
                  OR source LIKE ?4 ESCAPE '\\')
             ORDER BY id DESC",
        )?
        .query_map((user_id.as_i64(), start, end, pattern), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Get the user's `limit` most recent transactions, newest first.
pub fn get_latest_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, description, type, status, amount, source, created_at
             FROM \"transaction\" WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Sum the amounts of all of the user's transactions by type.
pub fn get_totals(user_id: UserID, connection: &Connection) -> Result<Totals, Error> {
    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0)
             FROM \"transaction\" WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| {
                Ok(Totals {
                    income: row.get(0)?,
                    expense: row.get(1)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        transaction_type: row.get(3)?,
        status: row.get(4)?,
        amount: row.get(5)?,
        source: row.get(6)?,
        created_at: row.get(7)?,
    })
}
