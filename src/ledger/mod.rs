//! The ledger engine: moving money between accounts and recording it.
//!
//! Every operation that changes a balance runs inside one SQLite transaction
//! together with the ledger rows it writes. The checks that can refuse an
//! operation (budget, ownership, balance) read from that same transaction
//! before the first write, so a refused operation changes nothing and an
//! error part way through rolls everything back when the transaction is
//! dropped.

mod budget;
mod dashboard;
mod query;

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::{
    Clock, Error, Money,
    account::{
        Account, AccountId, BalanceChange, apply_balance_change, get_latest_accounts,
        get_user_account,
    },
    auth::{UserID, update_monthly_budget},
    transaction::{
        Transaction, TransactionType, create_transaction, get_latest_transactions, get_totals,
        get_transactions_in_window,
    },
};

pub use budget::{BudgetDetails, BudgetStatus, BudgetUsage};
pub use dashboard::{DashboardSummary, MonthlyTotals};
pub use query::{DateRange, Filters, ListMetadata, TransactionList, TransactionQuery};

/// A validated request to record an expense or income against one account.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRequest {
    description: String,
    source: String,
    amount: Money,
}

impl ExpenseRequest {
    /// Check the fields of an expense or income.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `description` or `source` is blank or
    /// `amount` is not positive.
    pub fn new(description: &str, source: &str, amount: Money) -> Result<Self, Error> {
        let description = description.trim();
        let source = source.trim();

        if description.is_empty() || source.is_empty() {
            return Err(Error::Validation("Provide Required Fields!".to_owned()));
        }

        if !amount.is_positive() {
            return Err(Error::Validation(
                "Amount should be greater than 0.".to_owned(),
            ));
        }

        Ok(Self {
            description: description.to_owned(),
            source: source.to_owned(),
            amount,
        })
    }
}

/// A validated request to move money from one of the user's accounts to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRequest {
    from_account: AccountId,
    to_account: AccountId,
    amount: Money,
}

impl TransferRequest {
    /// Check the fields of a transfer.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `amount` is not positive or both
    /// accounts are the same.
    pub fn new(from_account: AccountId, to_account: AccountId, amount: Money) -> Result<Self, Error> {
        if !amount.is_positive() {
            return Err(Error::Validation(
                "Amount should be greater than 0.".to_owned(),
            ));
        }

        if from_account == to_account {
            return Err(Error::Validation(
                "Cannot transfer money to the same account.".to_owned(),
            ));
        }

        Ok(Self {
            from_account,
            to_account,
            amount,
        })
    }
}

/// The accounts and ledger rows written by a completed transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    /// The source account after the debit.
    pub from_account: Account,
    /// The destination account after the credit.
    pub to_account: Account,
    /// The expense row recorded against the source account.
    pub expense: Transaction,
    /// The income row recorded against the destination account.
    pub income: Transaction,
}

/// The ledger engine for one request.
///
/// The connection is borrowed from the caller and `clock` fixes the time used
/// for every timestamp and calendar window in the request.
#[derive(Debug)]
pub struct Ledger<'c> {
    connection: &'c Connection,
    clock: Clock,
}

impl<'c> Ledger<'c> {
    /// Create a ledger that reads and writes through `connection`.
    pub fn new(connection: &'c Connection, clock: Clock) -> Self {
        Self { connection, clock }
    }

    fn begin(&self) -> Result<rusqlite::Transaction<'c>, Error> {
        rusqlite::Transaction::new_unchecked(self.connection, TransactionBehavior::Immediate)
            .map_err(Error::from)
    }

    /// Spend money from one of the user's accounts.
    ///
    /// The checks run in this order: the monthly budget, that the account
    /// exists and belongs to the user, then the account balance. On success
    /// the balance is debited, a completed expense is appended and the budget
    /// status after the expense is returned.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::BudgetExceeded] if the expense would take this month's
    ///   spending over a non-zero budget,
    /// - [Error::AccountNotFound] if the account is missing or not the user's,
    /// - [Error::InsufficientBalance] if the balance is less than the amount,
    /// - [Error::SqlError] if a write failed, in which case nothing is changed.
    pub fn record_expense(
        &self,
        user_id: UserID,
        account_id: AccountId,
        request: &ExpenseRequest,
    ) -> Result<BudgetStatus, Error> {
        let transaction = self.begin()?;

        if let BudgetStatus {
            exceeded: true,
            usage: Some(usage),
        } = budget::check_budget(user_id, request.amount, &self.clock, &transaction)?
        {
            return Err(Error::BudgetExceeded(BudgetDetails::new(
                usage.current_expenses,
                usage.monthly_budget,
                request.amount,
            )));
        }

        let account = get_user_account(user_id, account_id, &transaction)?;
        if account.balance < request.amount {
            return Err(Error::InsufficientBalance);
        }

        apply_balance_change(
            account.id,
            BalanceChange::Debit,
            request.amount,
            self.clock.now(),
            &transaction,
        )?;
        create_transaction(
            Transaction::build(
                user_id,
                TransactionType::Expense,
                request.amount,
                self.clock.now(),
            )
            .description(&request.description)
            .source(&request.source),
            &transaction,
        )?;

        let status = budget::check_budget(user_id, Money::zero(), &self.clock, &transaction)?;
        transaction.commit()?;

        tracing::info!(
            "User {user_id} spent {} from account {account_id}",
            request.amount
        );

        Ok(status)
    }

    /// Add money to one of the user's accounts and record it as income.
    ///
    /// # Errors
    /// Returns [Error::AccountNotFound] if the account is missing or not the user's.
    pub fn record_income(
        &self,
        user_id: UserID,
        account_id: AccountId,
        request: &ExpenseRequest,
    ) -> Result<Transaction, Error> {
        let transaction = self.begin()?;

        let account = get_user_account(user_id, account_id, &transaction)?;
        apply_balance_change(
            account.id,
            BalanceChange::Credit,
            request.amount,
            self.clock.now(),
            &transaction,
        )?;
        let income = create_transaction(
            Transaction::build(
                user_id,
                TransactionType::Income,
                request.amount,
                self.clock.now(),
            )
            .description(&request.description)
            .source(&request.source),
            &transaction,
        )?;

        transaction.commit()?;

        Ok(income)
    }

    /// Move money between two of the user's accounts.
    ///
    /// The source is debited and the destination credited, then an expense
    /// named after the source and an income named after the destination are
    /// appended, both describing the pair of accounts.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::AccountNotFound] if either account is missing or not the user's,
    /// - [Error::InsufficientBalance] if the source holds less than the amount,
    /// - [Error::SqlError] if a write failed, in which case nothing is changed.
    pub fn record_transfer(
        &self,
        user_id: UserID,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, Error> {
        let transaction = self.begin()?;

        let from = get_user_account(user_id, request.from_account, &transaction)?;
        let to = get_user_account(user_id, request.to_account, &transaction)?;

        if from.balance < request.amount {
            return Err(Error::InsufficientBalance);
        }

        let now = self.clock.now();
        let from_account =
            apply_balance_change(from.id, BalanceChange::Debit, request.amount, now, &transaction)?;
        let to_account =
            apply_balance_change(to.id, BalanceChange::Credit, request.amount, now, &transaction)?;

        let expense = create_transaction(
            Transaction::build(user_id, TransactionType::Expense, request.amount, now)
                .description(&format!("Transfer ({} - {})", from.name, to.name))
                .source(&from.name),
            &transaction,
        )?;
        let income = create_transaction(
            Transaction::build(user_id, TransactionType::Income, request.amount, now)
                .description(&format!("Received ({} - {})", from.name, to.name))
                .source(&to.name),
            &transaction,
        )?;

        transaction.commit()?;

        tracing::info!(
            "User {user_id} transferred {} from account {} to account {}",
            request.amount,
            from.id,
            to.id
        );

        Ok(TransferReceipt {
            from_account,
            to_account,
            expense,
            income,
        })
    }

    /// Compare this month's expenses with the user's monthly budget.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the user does not exist.
    pub fn budget_status(&self, user_id: UserID) -> Result<BudgetStatus, Error> {
        budget::check_budget(user_id, Money::zero(), &self.clock, self.connection)
    }

    /// Replace the user's monthly budget with `amount`.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::Validation] if `amount` is not positive,
    /// - [Error::NotFound] if the user does not exist.
    pub fn set_monthly_budget(&self, user_id: UserID, amount: Money) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::Validation(
                "Please provide a valid monthly budget amount.".to_owned(),
            ));
        }

        update_monthly_budget(user_id, amount, self.connection)?;

        Ok(amount)
    }

    /// List the user's transactions in the window described by `query`, newest first.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the window starts after it ends or
    /// reaches past the supported range of dates.
    pub fn list_transactions(
        &self,
        user_id: UserID,
        query: &TransactionQuery,
    ) -> Result<TransactionList, Error> {
        let (date_from, date_to) = query.resolve(self.clock.today())?;
        let (start, end) = self.clock.day_range(date_from, date_to)?;
        let search = query.search_term();

        let data = get_transactions_in_window(user_id, start, end, search, self.connection)?;

        Ok(TransactionList {
            metadata: ListMetadata {
                total_count: data.len(),
                date_range: DateRange {
                    start: date_from,
                    end: date_to,
                },
                filters: Filters {
                    search: search.map(str::to_owned),
                },
            },
            data,
        })
    }

    /// Summarise the user's income, spending and latest activity.
    pub fn dashboard_summary(&self, user_id: UserID) -> Result<DashboardSummary, Error> {
        let totals = get_totals(user_id, self.connection)?;

        let (year_start, year_end) = self.clock.current_year()?;
        let this_year =
            get_transactions_in_window(user_id, year_start, year_end, None, self.connection)?;

        Ok(DashboardSummary {
            available_balance: totals.income - totals.expense,
            total_income: totals.income,
            total_expense: totals.expense,
            chart_data: dashboard::chart_data(&this_year, &self.clock),
            last_transactions: get_latest_transactions(
                user_id,
                dashboard::LATEST_TRANSACTIONS,
                self.connection,
            )?,
            last_account: get_latest_accounts(
                user_id,
                dashboard::LATEST_ACCOUNTS,
                self.connection,
            )?,
        })
    }
}
