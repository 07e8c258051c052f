//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    account::{create_account_endpoint, list_accounts_endpoint},
    auth::{auth_guard, sign_in, sign_up},
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        add_transaction_endpoint, budget_status_endpoint, dashboard_endpoint,
        list_transactions_endpoint, set_budget_endpoint, transfer_money_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::SIGN_IN, post(sign_in));

    let protected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(
            endpoints::TRANSACTIONS_NO_SLASH,
            get(list_transactions_endpoint),
        )
        .route(endpoints::ADD_TRANSACTION, post(add_transaction_endpoint))
        .route(endpoints::TRANSFER_MONEY, put(transfer_money_endpoint))
        .route(endpoints::SET_BUDGET, put(set_budget_endpoint))
        .route(endpoints::BUDGET_STATUS, get(budget_status_endpoint))
        .route(endpoints::DASHBOARD, get(dashboard_endpoint))
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNTS_NO_SLASH,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
