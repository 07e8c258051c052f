//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Clock, Error, Money,
    account::{Account, create_account},
    auth::UserID,
    envelope::{Envelope, JsonBody, render},
};

/// The state needed to create or list accounts.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// The name of the new account.
    pub account_name: Option<String>,
    /// The opening balance, zero if omitted.
    pub amount: Option<Money>,
}

#[derive(Serialize)]
struct AccountPayload {
    data: Account,
}

/// A route handler for creating a new account for the signed in user.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(request): JsonBody<CreateAccountRequest>,
) -> Response {
    let Some(name) = request.account_name else {
        return Error::Validation("Provide Required Fields!".to_owned()).into_response();
    };

    let clock = match Clock::system(&state.local_timezone) {
        Ok(clock) => clock,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_account(
        user_id,
        &name,
        request.amount.unwrap_or_else(Money::zero),
        clock.now(),
        &connection,
    ) {
        Ok(account) => render(
            StatusCode::CREATED,
            Envelope::success()
                .with_message(&format!("{} Account created successfully", account.name))
                .with_payload(AccountPayload { data: account }),
        ),
        Err(error) => {
            tracing::debug!("Could not create account for user {user_id}: {error}");
            error.into_response()
        }
    }
}
