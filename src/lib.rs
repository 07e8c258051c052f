//! Ledgerwise is a personal-finance backend for tracking accounts, spending and
//! a monthly budget.
//!
//! This library provides a JSON REST API. The money-moving operations live in
//! [Ledger], which applies balance updates and appends to the transaction
//! ledger inside a single database transaction.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod envelope;
mod ledger;
mod logging;
mod money;
mod not_found;
mod routing;
mod timezone;
mod transaction;

pub use account::{Account, AccountId, create_account};
pub use app_state::AppState;
pub use auth::{Email, PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use db::initialize as initialize_db;
pub use ledger::{
    BudgetDetails, BudgetStatus, BudgetUsage, DashboardSummary, ExpenseRequest, Ledger,
    MonthlyTotals, TransactionList, TransactionQuery, TransferReceipt, TransferRequest,
};
pub use logging::logging_middleware;
pub use money::Money;
pub use routing::build_router;
pub use timezone::Clock;
pub use transaction::{Transaction, TransactionStatus, TransactionType};

use crate::envelope::{Envelope, render};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request field was missing or had an invalid value.
    ///
    /// The string is shown to the client as-is, so it should explain how to
    /// fix the request.
    #[error("{0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The account does not exist or belongs to another user.
    #[error("the account could not be found")]
    AccountNotFound,

    /// The source account does not hold enough money for the debit.
    #[error("insufficient account balance")]
    InsufficientBalance,

    /// The expense would push this month's spending over the user's budget.
    ///
    /// Nothing is written to the ledger when this error is returned.
    #[error("this transaction would exceed the monthly budget")]
    BudgetExceeded(BudgetDetails),

    /// The email address is already used by another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The user already has an account with this name.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// The email and password combination did not match a user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid bearer token.
    #[error("missing or invalid bearer token")]
    Unauthorized,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The JSON web token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                render(StatusCode::FORBIDDEN, Envelope::failed(&message))
            }
            Error::NotFound => render(
                StatusCode::NOT_FOUND,
                Envelope::failed("The requested resource could not be found."),
            ),
            Error::AccountNotFound => render(
                StatusCode::NOT_FOUND,
                Envelope::failed("Invalid account information."),
            ),
            Error::InsufficientBalance => render(
                StatusCode::FORBIDDEN,
                Envelope::failed("Transaction failed. Insufficient account balance."),
            ),
            Error::BudgetExceeded(details) => render(
                StatusCode::FORBIDDEN,
                Envelope::warning("This transaction would exceed your monthly budget!")
                    .with_payload(BudgetExceededPayload {
                        budget_details: details,
                    }),
            ),
            Error::DuplicateEmail => render(
                StatusCode::CONFLICT,
                Envelope::failed("Email address already exists. Try logging in again"),
            ),
            Error::DuplicateAccountName(name) => render(
                StatusCode::CONFLICT,
                Envelope::failed(&format!(
                    "The account \"{name}\" already exists. Choose a different account name."
                )),
            ),
            Error::InvalidCredentials => render(
                StatusCode::NOT_FOUND,
                Envelope::failed("Invalid email or password."),
            ),
            Error::Unauthorized => render(
                StatusCode::UNAUTHORIZED,
                Envelope::failed("Authentication failed. Please sign in again."),
            ),
            Error::TooWeak(feedback) => render(
                StatusCode::FORBIDDEN,
                Envelope::failed(&format!("Password is too weak: {feedback}")),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failed(
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
            }
        }
    }
}

impl Error {
    /// Render the error for the sign-up and sign-in routes, which report bad
    /// input with 400 instead of 403.
    fn into_auth_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                render(StatusCode::BAD_REQUEST, Envelope::failed(&message))
            }
            Error::TooWeak(feedback) => render(
                StatusCode::BAD_REQUEST,
                Envelope::failed(&format!("Password is too weak: {feedback}")),
            ),
            error => error.into_response(),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetExceededPayload {
    budget_details: BudgetDetails,
}
