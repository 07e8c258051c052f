//! The account model and the queries that read and move account balances.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, Money, auth::UserID};

/// The database ID of an account.
pub type AccountId = i64;

/// A balance-bearing account owned by a user, e.g. a bank account or cash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The name of the account, unique per user.
    #[serde(rename = "account_name")]
    pub name: String,
    /// The balance. Never negative.
    #[serde(rename = "account_balance")]
    pub balance: Money,
    /// When the balance was last changed.
    #[serde(rename = "updatedat", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The direction of a balance update.
///
/// Each variant maps to one fixed SQL statement so that the arithmetic never
/// has to be spliced into a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    /// Take money out of the account. Fails rather than going below zero.
    Debit,
    /// Put money into the account.
    Credit,
}

impl BalanceChange {
    fn statement(self) -> &'static str {
        match self {
            BalanceChange::Debit => {
                "UPDATE account SET balance = balance - ?1, updated_at = ?2
                 WHERE id = ?3 AND balance >= ?1
                 RETURNING id, user_id, name, balance, updated_at"
            }
            BalanceChange::Credit => {
                "UPDATE account SET balance = balance + ?1, updated_at = ?2
                 WHERE id = ?3
                 RETURNING id, user_id, name, balance, updated_at"
            }
        }
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            balance INTEGER NOT NULL CHECK (balance >= 0),
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        balance: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Create an account for `user_id` holding `opening_balance`.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `name` is blank or `opening_balance` is negative,
/// - [Error::DuplicateAccountName] if the user already has an account called `name`,
/// - [Error::SqlError] for any other SQL error.
pub fn create_account(
    user_id: UserID,
    name: &str,
    opening_balance: Money,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::Validation("Account name is required.".to_owned()));
    }

    if opening_balance.is_negative() {
        return Err(Error::Validation(
            "Opening balance cannot be negative.".to_owned(),
        ));
    }

    connection
        .prepare(
            "INSERT INTO account (user_id, name, balance, updated_at) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, balance, updated_at",
        )?
        .query_row(
            (user_id.as_i64(), name, opening_balance, now),
            map_row_to_account,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(name.to_owned()),
            error => error.into(),
        })
}

/// Get the account with `account_id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist or is owned
/// by another user.
pub fn get_user_account(
    user_id: UserID,
    account_id: AccountId,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, user_id, name, balance, updated_at FROM account
             WHERE id = ?1 AND user_id = ?2",
            (account_id, user_id.as_i64()),
            map_row_to_account,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound,
            error => error.into(),
        })
}

/// Get all of the user's accounts, newest first.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    query_accounts(user_id, -1, connection)
}

/// Get the `limit` most recently created accounts of the user, newest first.
pub fn get_latest_accounts(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    query_accounts(user_id, i64::from(limit), connection)
}

// A negative limit means no limit in SQLite.
fn query_accounts(
    user_id: UserID,
    limit: i64,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, updated_at FROM account
             WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Debit or credit `amount` to the account and stamp it with `now`.
///
/// Callers are expected to have checked that the account exists and belongs
/// to the user.
///
/// # Errors
/// Returns a:
/// - [Error::InsufficientBalance] if a debit would take the balance below zero,
/// - [Error::AccountNotFound] if a credit targets a missing account,
/// - [Error::SqlError] for any other SQL error.
pub fn apply_balance_change(
    account_id: AccountId,
    change: BalanceChange,
    amount: Money,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(change.statement())?
        .query_row((amount, now, account_id), map_row_to_account)
        .map_err(|error| match (error, change) {
            (rusqlite::Error::QueryReturnedNoRows, BalanceChange::Debit) => {
                Error::InsufficientBalance
            }
            (rusqlite::Error::QueryReturnedNoRows, BalanceChange::Credit) => {
                Error::AccountNotFound
            }
            (error, _) => error.into(),
        })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error, Money,
        account::core::{
            BalanceChange, apply_balance_change, create_account, get_accounts,
            get_latest_accounts, get_user_account,
        },
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "Jane",
            &Email::new_unchecked("jane@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    fn other_user(connection: &Connection) -> UserID {
        create_user(
            "John",
            &Email::new_unchecked("john@example.com"),
            PasswordHash::new_unchecked("hunter3"),
            connection,
        )
        .unwrap()
        .id
    }

    #[test]
    fn create_account_stores_opening_balance() {
        let (connection, user_id) = get_test_connection();
        let now = datetime!(2025-03-01 09:00 UTC);

        let account =
            create_account(user_id, " Savings ", Money::from_cents(10_050), now, &connection)
                .unwrap();

        assert_eq!(account.name, "Savings");
        assert_eq!(account.balance, Money::from_cents(10_050));
        assert_eq!(account.updated_at, now);
        assert_eq!(
            get_user_account(user_id, account.id, &connection),
            Ok(account)
        );
    }

    #[test]
    fn create_account_rejects_duplicate_name_for_same_user() {
        let (connection, user_id) = get_test_connection();
        let now = datetime!(2025-03-01 09:00 UTC);
        create_account(user_id, "Cash", Money::zero(), now, &connection).unwrap();

        let result = create_account(user_id, "Cash", Money::zero(), now, &connection);

        assert_eq!(result, Err(Error::DuplicateAccountName("Cash".to_owned())));
    }

    #[test]
    fn different_users_can_share_an_account_name() {
        let (connection, user_id) = get_test_connection();
        let other_user_id = other_user(&connection);
        let now = datetime!(2025-03-01 09:00 UTC);
        create_account(user_id, "Cash", Money::zero(), now, &connection).unwrap();

        let result = create_account(other_user_id, "Cash", Money::zero(), now, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn create_account_rejects_negative_balance() {
        let (connection, user_id) = get_test_connection();

        let result = create_account(
            user_id,
            "Cash",
            Money::from_cents(-1),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn get_user_account_hides_other_users_accounts() {
        let (connection, user_id) = get_test_connection();
        let other_user_id = other_user(&connection);
        let account = create_account(
            other_user_id,
            "Theirs",
            Money::from_cents(100),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_user_account(user_id, account.id, &connection),
            Err(Error::AccountNotFound)
        );
    }

    #[test]
    fn accounts_are_listed_newest_first() {
        let (connection, user_id) = get_test_connection();
        let now = datetime!(2025-03-01 09:00 UTC);
        for name in ["A", "B", "C", "D", "E"] {
            create_account(user_id, name, Money::zero(), now, &connection).unwrap();
        }

        let all: Vec<String> = get_accounts(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|account| account.name)
            .collect();
        let latest: Vec<String> = get_latest_accounts(user_id, 4, &connection)
            .unwrap()
            .into_iter()
            .map(|account| account.name)
            .collect();

        assert_eq!(all, ["E", "D", "C", "B", "A"]);
        assert_eq!(latest, ["E", "D", "C", "B"]);
    }

    #[test]
    fn debit_and_credit_update_balance_and_timestamp() {
        let (connection, user_id) = get_test_connection();
        let account = create_account(
            user_id,
            "Cash",
            Money::from_cents(10_000),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let later = datetime!(2025-03-02 10:30 UTC);

        let debited = apply_balance_change(
            account.id,
            BalanceChange::Debit,
            Money::from_cents(2_500),
            later,
            &connection,
        )
        .unwrap();
        let credited = apply_balance_change(
            account.id,
            BalanceChange::Credit,
            Money::from_cents(1_000),
            later,
            &connection,
        )
        .unwrap();

        assert_eq!(debited.balance, Money::from_cents(7_500));
        assert_eq!(debited.updated_at, later);
        assert_eq!(credited.balance, Money::from_cents(8_500));
    }

    #[test]
    fn debit_cannot_overdraw() {
        let (connection, user_id) = get_test_connection();
        let account = create_account(
            user_id,
            "Cash",
            Money::from_cents(1_000),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        let result = apply_balance_change(
            account.id,
            BalanceChange::Debit,
            Money::from_cents(1_001),
            datetime!(2025-03-02 09:00 UTC),
            &connection,
        );

        assert_eq!(result, Err(Error::InsufficientBalance));
        let unchanged = get_user_account(user_id, account.id, &connection).unwrap();
        assert_eq!(unchanged.balance, Money::from_cents(1_000));
    }

    #[test]
    fn debit_of_entire_balance_leaves_zero() {
        let (connection, user_id) = get_test_connection();
        let account = create_account(
            user_id,
            "Cash",
            Money::from_cents(1_000),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        let debited = apply_balance_change(
            account.id,
            BalanceChange::Debit,
            Money::from_cents(1_000),
            datetime!(2025-03-02 09:00 UTC),
            &connection,
        )
        .unwrap();

        assert!(debited.balance.is_zero());
    }
}
