//! Defines the endpoint for recording an expense (or income) against an account.

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
    envelope::{Envelope, JsonBody, PathParam, render},
    ledger::{BudgetStatus, ExpenseRequest},
    transaction::{Transaction, TransactionType, ledger_state::LedgerState},
};

/// The request body for adding a transaction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddTransactionRequest {
    pub description: Option<String>,
    pub source: Option<String>,
    pub amount: Option<Money>,
    /// Defaults to an expense.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpensePayload {
    budget_status: BudgetStatus,
}

#[derive(Serialize)]
struct IncomePayload {
    data: Transaction,
}

/// A route handler for recording a transaction against one of the user's accounts.
///
/// Expenses are checked against the monthly budget and the account balance.
/// A refused expense responds with 403, and with a `warning` status plus
/// `budgetDetails` when the budget is the reason.
pub async fn add_transaction_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    PathParam(account_id): PathParam<AccountId>,
    JsonBody(request): JsonBody<AddTransactionRequest>,
) -> Response {
    let (Some(description), Some(source), Some(amount)) =
        (request.description, request.source, request.amount)
    else {
        return Error::Validation("Provide Required Fields!".to_owned()).into_response();
    };

    let expense = match ExpenseRequest::new(&description, &source, amount) {
        Ok(expense) => expense,
        Err(error) => return error.into_response(),
    };

    match request.transaction_type.unwrap_or(TransactionType::Expense) {
        TransactionType::Expense => {
            match state.with_ledger(|ledger| ledger.record_expense(user_id, account_id, &expense)) {
                Ok(budget_status) => render(
                    StatusCode::OK,
                    Envelope::success()
                        .with_message("Transaction completed successfully.")
                        .with_payload(ExpensePayload { budget_status }),
                ),
                Err(error) => error.into_response(),
            }
        }
        TransactionType::Income => {
            match state.with_ledger(|ledger| ledger.record_income(user_id, account_id, &expense)) {
                Ok(income) => render(
                    StatusCode::OK,
                    Envelope::success()
                        .with_message("Transaction completed successfully.")
                        .with_payload(IncomePayload { data: income }),
                ),
                Err(error) => error.into_response(),
            }
        }
    }
}
