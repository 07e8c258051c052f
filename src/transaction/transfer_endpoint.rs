//! Defines the endpoint for moving money between two of the user's accounts.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Money,
    account::AccountId,
    auth::UserID,
    envelope::{Envelope, JsonBody, render},
    ledger::TransferRequest,
    transaction::ledger_state::LedgerState,
};

/// The request body for a transfer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransferMoneyRequest {
    pub from_account: Option<AccountId>,
    pub to_account: Option<AccountId>,
    pub amount: Option<Money>,
}

/// A route handler for transferring money, responds with 201 once both
/// balances and both ledger rows have been written.
pub async fn transfer_money_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(request): JsonBody<TransferMoneyRequest>,
) -> Response {
    let (Some(from_account), Some(to_account), Some(amount)) =
        (request.from_account, request.to_account, request.amount)
    else {
        return Error::Validation("Provide Required Fields!".to_owned()).into_response();
    };

    let result = TransferRequest::new(from_account, to_account, amount)
        .and_then(|transfer| state.with_ledger(|ledger| ledger.record_transfer(user_id, &transfer)));

    match result {
        Ok(_) => render(
            StatusCode::CREATED,
            Envelope::success().with_message("Transfer completed successfully"),
        ),
        Err(error) => error.into_response(),
    }
}
