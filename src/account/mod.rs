//! Accounts hold the balances that expenses, incomes and transfers move money between.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountId, BalanceChange, apply_balance_change, create_account,
    create_account_table, get_accounts, get_latest_accounts, get_user_account,
};
pub use create_endpoint::{AccountState, create_account_endpoint};
pub use list_endpoint::list_accounts_endpoint;
