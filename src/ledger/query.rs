//! The parameters and result of listing transactions in a date window.

use serde::Serialize;
use time::{Date, Duration, macros::format_description};

use crate::{Error, transaction::Transaction};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// How many days before today the default window starts.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Which transactions to list.
///
/// Both dates are local calendar days and both are included in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// The first day of the window. Defaults to a week before today.
    pub date_from: Option<Date>,
    /// The last day of the window. Defaults to today.
    pub date_to: Option<Date>,
    /// Only keep transactions whose description, status or source contains this.
    pub search: Option<String>,
}

impl TransactionQuery {
    /// Build a query from the raw `df`, `dt` and `s` query parameters.
    ///
    /// Empty parameters are treated as missing.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a date is not formatted as `YYYY-MM-DD`.
    pub fn from_params(
        date_from: Option<&str>,
        date_to: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            date_from: parse_date(date_from)?,
            date_to: parse_date(date_to)?,
            search: non_empty(search).map(str::to_owned),
        })
    }

    /// Fill in the default window around `today` and check the dates are in order.
    pub(super) fn resolve(&self, today: Date) -> Result<(Date, Date), Error> {
        let date_to = self.date_to.unwrap_or(today);
        let date_from = self
            .date_from
            .unwrap_or_else(|| today - Duration::days(DEFAULT_WINDOW_DAYS));

        if date_from > date_to {
            return Err(Error::Validation(
                "The start date must not be after the end date.".to_owned(),
            ));
        }

        Ok((date_from, date_to))
    }

    pub(super) fn search_term(&self) -> Option<&str> {
        non_empty(self.search.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(raw: Option<&str>) -> Result<Option<Date>, Error> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|error| {
            tracing::debug!("Could not parse date {raw:?}: {error}");
            Error::Validation(format!("Invalid date \"{raw}\", expected YYYY-MM-DD."))
        })
}

/// The transactions in a window, newest first, plus a description of the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionList {
    /// The matching transactions.
    pub data: Vec<Transaction>,
    /// The window and filters that were applied.
    pub metadata: ListMetadata,
}

/// Describes how a [TransactionList] was selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    /// The number of transactions in the list.
    pub total_count: usize,
    /// The local days covered, both inclusive.
    pub date_range: DateRange,
    /// The search term, if any.
    pub filters: Filters,
}

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    /// The first day.
    #[serde(with = "iso_date")]
    pub start: Date,
    /// The last day.
    #[serde(with = "iso_date")]
    pub end: Date,
}

/// The filters applied to a transaction list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    /// The search term.
    pub search: Option<String>,
}
