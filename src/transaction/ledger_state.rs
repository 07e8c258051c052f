//! The state shared by the ledger route handlers.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, Clock, Error, ledger::Ledger};

/// The state needed to run ledger operations for a request.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading and writing the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl LedgerState {
    /// Run `operation` against a [Ledger] that holds the database lock and a
    /// clock read at the start of the call.
    pub fn with_ledger<T>(
        &self,
        operation: impl FnOnce(&Ledger) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let clock = Clock::system(&self.local_timezone)?;

        let connection = self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        operation(&Ledger::new(&connection, clock))
    }
}

#[cfg(test)]
pub mod test_utils {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Money,
        account::{AccountId, create_account},
        auth::{Email, PasswordHash, UserID, create_user},
        db::initialize,
        transaction::LedgerState,
    };

    /// A state backed by an in-memory database with one user, "Jane".
    pub fn get_test_state() -> (LedgerState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "Jane",
            &Email::new_unchecked("jane@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let state = LedgerState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id)
    }

    pub fn add_account(state: &LedgerState, user_id: UserID, name: &str, cents: i64) -> AccountId {
        let connection = state.db_connection.lock().unwrap();

        create_account(
            user_id,
            name,
            Money::from_cents(cents),
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap()
        .id
    }
}
