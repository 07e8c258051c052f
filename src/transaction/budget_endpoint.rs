//! Defines the endpoints for setting the monthly budget and checking spending against it.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Money,
    auth::UserID,
    envelope::{Envelope, JsonBody, render},
    ledger::BudgetStatus,
    transaction::ledger_state::LedgerState,
};

/// The request body for setting the monthly budget.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub monthly_budget: Option<Money>,
}

#[derive(Serialize)]
struct BudgetPayload {
    budget: Money,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetStatusPayload {
    budget_status: BudgetStatus,
}

/// A route handler that replaces the user's monthly budget.
pub async fn set_budget_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(request): JsonBody<BudgetRequest>,
) -> Response {
    let Some(monthly_budget) = request.monthly_budget else {
        return Error::Validation("Please provide a valid monthly budget amount.".to_owned())
            .into_response();
    };

    match state.with_ledger(|ledger| ledger.set_monthly_budget(user_id, monthly_budget)) {
        Ok(budget) => render(
            StatusCode::OK,
            Envelope::success()
                .with_message("Monthly budget updated successfully")
                .with_payload(BudgetPayload { budget }),
        ),
        Err(error) => error.into_response(),
    }
}

/// A route handler that reports this month's spending against the budget.
pub async fn budget_status_endpoint(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match state.with_ledger(|ledger| ledger.budget_status(user_id)) {
        Ok(budget_status) => render(
            StatusCode::OK,
            Envelope::success().with_payload(BudgetStatusPayload { budget_status }),
        ),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        http::StatusCode,
        routing::{get, put},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        auth::UserID,
        endpoints::{self, format_endpoint},
        transaction::{
            add_endpoint::add_transaction_endpoint,
            budget_endpoint::{budget_status_endpoint, set_budget_endpoint},
            ledger_state::{
                LedgerState,
                test_utils::{add_account, get_test_state},
            },
        },
    };

    fn get_test_server(state: LedgerState, user_id: UserID) -> TestServer {
        let app = Router::new()
            .route(endpoints::SET_BUDGET, put(set_budget_endpoint))
            .route(endpoints::BUDGET_STATUS, get(budget_status_endpoint))
            .route(
                endpoints::ADD_TRANSACTION,
                axum::routing::post(add_transaction_endpoint),
            )
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn status_without_budget_is_not_exceeded() {
        let (state, user_id) = get_test_state();
        let server = get_test_server(state, user_id);

        let response = server.get(endpoints::BUDGET_STATUS).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "status": "success",
            "budgetStatus": {"exceeded": false}
        }));
    }

    #[tokio::test]
    async fn set_budget_then_check_status() {
        let (state, user_id) = get_test_state();
        let account_id = add_account(&state, user_id, "Cash", 100_000);
        let server = get_test_server(state, user_id);

        let response = server
            .put(endpoints::SET_BUDGET)
            .json(&json!({"monthly_budget": 200}))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "status": "success",
            "message": "Monthly budget updated successfully",
            "budget": "200.00"
        }));
        server
            .post(&format_endpoint(endpoints::ADD_TRANSACTION, account_id))
            .json(&json!({"description": "Food", "source": "Market", "amount": 45.5}))
            .await
            .assert_status_ok();

        let response = server.get(endpoints::BUDGET_STATUS).await;

        response.assert_json(&json!({
            "status": "success",
            "budgetStatus": {
                "exceeded": false,
                "currentExpenses": "45.50",
                "monthlyBudget": "200.00",
                "remainingBudget": "154.50"
            }
        }));
    }

    #[tokio::test]
    async fn invalid_budget_is_forbidden() {
        let (state, user_id) = get_test_state();
        let server = get_test_server(state, user_id);

        for body in [json!({}), json!({"monthly_budget": 0}), json!({"monthly_budget": -10})] {
            let response = server.put(endpoints::SET_BUDGET).json(&body).await;

            response.assert_status(StatusCode::FORBIDDEN);
            let body = response.json::<serde_json::Value>();
            assert_eq!(body["message"], "Please provide a valid monthly budget amount.");
        }
    }
}
