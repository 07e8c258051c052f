//! Defines the endpoint for the dashboard summary.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    auth::UserID,
    envelope::{Envelope, render},
    transaction::ledger_state::LedgerState,
};

/// A route handler that returns the totals, the monthly chart for this year
/// and the latest transactions and accounts.
pub async fn dashboard_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match state.with_ledger(|ledger| ledger.dashboard_summary(user_id)) {
        Ok(summary) => render(StatusCode::OK, Envelope::success().with_payload(summary)),
        Err(error) => error.into_response(),
    }
}
