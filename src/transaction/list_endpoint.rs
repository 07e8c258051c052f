//! Defines the endpoint for listing transactions in a date window.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    auth::UserID,
    envelope::{Envelope, QueryParams, render},
    ledger::TransactionQuery,
    transaction::ledger_state::LedgerState,
};

/// The raw query parameters: `df` and `dt` are `YYYY-MM-DD` dates and `s` is
/// a search term.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub df: Option<String>,
    pub dt: Option<String>,
    pub s: Option<String>,
}

/// A route handler that lists the user's transactions, newest first.
///
/// Without dates the window covers the last seven days up to and including today.
pub async fn list_transactions_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(params): QueryParams<ListParams>,
) -> Response {
    let result = TransactionQuery::from_params(
        params.df.as_deref(),
        params.dt.as_deref(),
        params.s.as_deref(),
    )
    .and_then(|query| state.with_ledger(|ledger| ledger.list_transactions(user_id, &query)));

    match result {
        Ok(list) => render(StatusCode::OK, Envelope::success().with_payload(list)),
        Err(error) => error.into_response(),
    }
}
