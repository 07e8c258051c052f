//! Comparing this month's spending against the user's monthly budget.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Clock, Error, Money,
    auth::{UserID, get_monthly_budget},
    transaction::sum_expenses_between,
};

/// How this month's spending compares with the monthly budget.
///
/// When the user has no budget (a budget of zero) only `exceeded: false` is
/// reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// Whether the spending, including any amount being checked, is over the budget.
    pub exceeded: bool,
    /// The spending figures, absent when there is no budget.
    #[serde(flatten)]
    pub usage: Option<BudgetUsage>,
}

/// The figures behind a [BudgetStatus].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUsage {
    /// The sum of this month's expenses.
    pub current_expenses: Money,
    /// The user's monthly budget.
    pub monthly_budget: Money,
    /// The budget minus this month's expenses. Negative if already overspent.
    pub remaining_budget: Money,
}

/// The details reported when an expense is refused for exceeding the budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetails {
    /// The sum of this month's expenses before the refused expense.
    pub current_expenses: Money,
    /// The user's monthly budget.
    pub monthly_budget: Money,
    /// The budget minus this month's expenses.
    pub remaining_budget: Money,
    /// How far over the remaining budget the refused expense would go.
    pub amount_exceeded: Money,
    /// A sentence describing the overspend for display to the user.
    pub exceedance_message: String,
}

impl BudgetDetails {
    /// Describe an attempt to spend `amount` with `current_expenses` already
    /// spent out of `monthly_budget`.
    pub fn new(current_expenses: Money, monthly_budget: Money, amount: Money) -> Self {
        let remaining_budget = monthly_budget - current_expenses;
        let amount_exceeded = amount - remaining_budget;

        Self {
            current_expenses,
            monthly_budget,
            remaining_budget,
            amount_exceeded,
            exceedance_message: format!(
                "You are attempting to spend ${amount_exceeded} more than your remaining budget."
            ),
        }
    }
}

/// Check whether spending `amount` more this month would exceed the user's budget.
///
/// Pass a zero `amount` to get the current status.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist.
pub(super) fn check_budget(
    user_id: UserID,
    amount: Money,
    clock: &Clock,
    connection: &Connection,
) -> Result<BudgetStatus, Error> {
    let monthly_budget = get_monthly_budget(user_id, connection)?;

    if monthly_budget.is_zero() {
        return Ok(BudgetStatus {
            exceeded: false,
            usage: None,
        });
    }

    let (month_start, month_end) = clock.current_month()?;
    let current_expenses = sum_expenses_between(user_id, month_start, month_end, connection)?;

    Ok(BudgetStatus {
        exceeded: current_expenses + amount > monthly_budget,
        usage: Some(BudgetUsage {
            current_expenses,
            monthly_budget,
            remaining_budget: monthly_budget - current_expenses,
        }),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        Money,
        ledger::budget::{BudgetDetails, BudgetStatus, BudgetUsage},
    };

    #[test]
    fn status_without_budget_only_reports_exceeded() {
        let status = BudgetStatus {
            exceeded: false,
            usage: None,
        };

        assert_eq!(serde_json::to_value(status).unwrap(), json!({"exceeded": false}));
    }

    #[test]
    fn status_with_budget_reports_usage_in_camel_case() {
        let status = BudgetStatus {
            exceeded: false,
            usage: Some(BudgetUsage {
                current_expenses: Money::from_cents(5_000),
                monthly_budget: Money::from_cents(20_000),
                remaining_budget: Money::from_cents(15_000),
            }),
        };

        assert_eq!(
            serde_json::to_value(status).unwrap(),
            json!({
                "exceeded": false,
                "currentExpenses": "50.00",
                "monthlyBudget": "200.00",
                "remainingBudget": "150.00"
            })
        );
    }

    #[test]
    fn details_compute_amount_exceeded_from_remaining_budget() {
        let details = BudgetDetails::new(
            Money::from_cents(18_000),
            Money::from_cents(20_000),
            Money::from_cents(5_000),
        );

        assert_eq!(details.remaining_budget, Money::from_cents(2_000));
        assert_eq!(details.amount_exceeded, Money::from_cents(3_000));
        assert_eq!(
            details.exceedance_message,
            "You are attempting to spend $30.00 more than your remaining budget."
        );
    }
}
