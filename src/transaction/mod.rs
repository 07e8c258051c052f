//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and a builder for creating transactions
//! - Database functions for appending to and querying the ledger
//! - Route handlers for the ledger operations

mod add_endpoint;
mod budget_endpoint;
mod core;
mod dashboard_endpoint;
mod ledger_state;
mod list_endpoint;
mod transfer_endpoint;

pub use add_endpoint::add_transaction_endpoint;
pub use budget_endpoint::{budget_status_endpoint, set_budget_endpoint};
pub use core::{
    Transaction, TransactionStatus, TransactionType, create_transaction, create_transaction_table, get_latest_transactions, get_totals,
    get_transactions_in_window, sum_expenses_between,
};
pub use dashboard_endpoint::dashboard_endpoint;
pub use ledger_state::LedgerState;
pub use list_endpoint::list_transactions_endpoint;
pub use transfer_endpoint::transfer_money_endpoint;

#[cfg(test)]
pub use core::count_transactions;
