//! The figures shown on the dashboard: totals, a monthly chart for the
//! current year and the most recent activity.

use serde::Serialize;
use time::Month;

use crate::{
    Clock, Money,
    account::Account,
    transaction::{Transaction, TransactionType},
};

/// How many of the latest transactions the dashboard shows.
pub(super) const LATEST_TRANSACTIONS: u32 = 5;
/// How many of the latest accounts the dashboard shows.
pub(super) const LATEST_ACCOUNTS: u32 = 4;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// An overview of a user's finances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Total income minus total expenses over all time.
    pub available_balance: Money,
    /// The sum of all income.
    pub total_income: Money,
    /// The sum of all expenses.
    pub total_expense: Money,
    /// Income and expenses for each month of the current year, January first.
    pub chart_data: Vec<MonthlyTotals>,
    /// The most recent transactions, newest first.
    pub last_transactions: Vec<Transaction>,
    /// The most recently created accounts, newest first.
    pub last_account: Vec<Account>,
}

/// The income and expenses recorded in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// The three letter month name, e.g. "Jan".
    pub label: &'static str,
    /// The sum of income for the month.
    pub income: Money,
    /// The sum of expenses for the month.
    pub expense: Money,
}

/// Sum `transactions` into one bucket per month of the year, using the local
/// month each transaction was recorded in, with the timezone's offset at the
/// time it was recorded.
pub(super) fn chart_data(transactions: &[Transaction], clock: &Clock) -> Vec<MonthlyTotals> {
    let mut months: Vec<MonthlyTotals> = MONTH_LABELS
        .iter()
        .map(|&label| MonthlyTotals {
            label,
            income: Money::zero(),
            expense: Money::zero(),
        })
        .collect();

    for transaction in transactions {
        let month = clock.to_local(transaction.created_at).month();
        let bucket = &mut months[month_index(month)];

        match transaction.transaction_type {
            TransactionType::Income => bucket.income += transaction.amount,
            TransactionType::Expense => bucket.expense += transaction.amount,
        }
    }

    months
}

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month)) - 1
}
