//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/add-transaction/{account_id}', use [format_endpoint].

/// The route for registering a new user.
pub const SIGN_UP: &str = "/api-v1/auth/sign-up";
/// The route for signing in and receiving a bearer token.
pub const SIGN_IN: &str = "/api-v1/auth/sign-in";

/// The route for listing transactions in a date window.
pub const TRANSACTIONS: &str = "/api-v1/transaction/";
/// The same as [TRANSACTIONS] without the trailing slash.
pub const TRANSACTIONS_NO_SLASH: &str = "/api-v1/transaction";
/// The route for recording an expense (or income) against an account.
pub const ADD_TRANSACTION: &str = "/api-v1/transaction/add-transaction/{account_id}";
/// The route for moving money between two accounts.
pub const TRANSFER_MONEY: &str = "/api-v1/transaction/transfer-money";
/// The route for setting the monthly budget.
pub const SET_BUDGET: &str = "/api-v1/transaction/set-budget";
/// The route for checking spending against the monthly budget.
pub const BUDGET_STATUS: &str = "/api-v1/transaction/budget-status";
/// The route for the dashboard summary.
pub const DASHBOARD: &str = "/api-v1/transaction/dashboard";

/// The route for creating and listing accounts.
pub const ACCOUNTS: &str = "/api-v1/account/";
/// The same as [ACCOUNTS] without the trailing slash.
pub const ACCOUNTS_NO_SLASH: &str = "/api-v1/account";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}', '{account_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
