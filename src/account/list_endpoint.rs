//! Defines the endpoint for listing the signed in user's accounts.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error,
    account::{Account, AccountState, get_accounts},
    auth::UserID,
    envelope::{Envelope, render},
};

#[derive(Serialize)]
struct AccountsPayload {
    data: Vec<Account>,
}

/// A route handler that returns every account of the user, newest first.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_accounts(user_id, &connection) {
        Ok(accounts) => render(
            StatusCode::OK,
            Envelope::success().with_payload(AccountsPayload { data: accounts }),
        ),
        Err(error) => error.into_response(),
    }
}
