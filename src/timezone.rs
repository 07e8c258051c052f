//! Local time helpers: the user's timezone and the calendar windows (day,
//! month, year) the ledger aggregates over.

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Where local calendar days are measured.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    /// The same offset all year round.
    Fixed(UtcOffset),
    /// A named timezone whose offset may change, e.g. for daylight saving.
    Named(&'static Tz),
}

impl Zone {
    fn to_local(self, instant: OffsetDateTime) -> OffsetDateTime {
        match self {
            Zone::Fixed(offset) => instant.checked_to_offset(offset).unwrap_or(instant),
            Zone::Named(tz) => {
                let offset = tz.get_offset_utc(&instant).to_utc();
                instant.checked_to_offset(offset).unwrap_or(instant)
            }
        }
    }

    /// The offset in effect at the local time `midnight`.
    fn midnight_offset(self, midnight: PrimitiveDateTime) -> Option<UtcOffset> {
        let tz = match self {
            Zone::Fixed(offset) => return Some(offset),
            Zone::Named(tz) => tz,
        };

        // An ambiguous midnight happens twice and the day starts at the first.
        if let Some(offset) = tz.get_offset_local(&midnight.assume_utc()).take_first() {
            return Some(offset.to_utc());
        }

        // Midnight was skipped by a forward jump, so the day starts at the
        // jump, which is midnight in the offset from before it.
        let day_before = midnight.assume_utc().checked_sub(Duration::DAY)?;
        Some(tz.get_offset_utc(&day_before).to_utc())
    }
}

/// A fixed point in time plus the user's timezone.
///
/// Each request builds one clock so that every timestamp written and every
/// calendar window computed while handling it agree with each other.
/// Timestamps are kept in UTC and truncated to whole seconds.
///
/// Calendar boundaries use the offset in effect at that boundary, so a month
/// that starts in daylight saving time starts at the daylight saving midnight
/// even when read from standard time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    now: OffsetDateTime,
    zone: Zone,
}

impl Clock {
    /// Create a clock that reads `now` in a timezone with the fixed offset `local_offset`.
    pub fn new(now: OffsetDateTime, local_offset: UtcOffset) -> Self {
        Self::with_zone(now, Zone::Fixed(local_offset))
    }

    /// Create a clock that reads `now` in `timezone`.
    pub fn in_timezone(now: OffsetDateTime, timezone: &'static Tz) -> Self {
        Self::with_zone(now, Zone::Named(timezone))
    }

    fn with_zone(now: OffsetDateTime, zone: Zone) -> Self {
        let now = now.to_offset(UtcOffset::UTC);
        let now = now - Duration::nanoseconds(i64::from(now.nanosecond()));

        Self { now, zone }
    }

    /// A clock for the current system time in `canonical_timezone`, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if the timezone name is not known.
    pub fn system(canonical_timezone: &str) -> Result<Self, Error> {
        let timezone = time_tz::timezones::get_by_name(canonical_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

        Ok(Self::in_timezone(OffsetDateTime::now_utc(), timezone))
    }

    /// The current time in UTC.
    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    /// `instant` expressed in the local timezone as it was at that instant.
    pub fn to_local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        self.zone.to_local(instant)
    }

    /// Today's date in the local timezone.
    pub fn today(&self) -> Date {
        self.to_local(self.now).date()
    }

    /// The UTC instant at which `date` begins in the local timezone.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the instant cannot be represented.
    pub fn start_of_day(&self, date: Date) -> Result<OffsetDateTime, Error> {
        let midnight = PrimitiveDateTime::new(date, Time::MIDNIGHT);

        self.zone
            .midnight_offset(midnight)
            .and_then(|offset| midnight.assume_offset(offset).checked_to_offset(UtcOffset::UTC))
            .ok_or_else(|| out_of_range(date))
    }

    /// The half-open UTC range covering the local calendar days `first..=last`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if either end of the range cannot be represented.
    pub fn day_range(
        &self,
        first: Date,
        last: Date,
    ) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
        let day_after_last = last.next_day().ok_or_else(|| out_of_range(last))?;

        Ok((
            self.start_of_day(first)?,
            self.start_of_day(day_after_last)?,
        ))
    }

    /// The half-open UTC range covering the current local calendar month.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the month ends past the last representable date.
    pub fn current_month(&self) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
        let today = self.today();
        let (next_year, next_month) = match today.month() {
            Month::December => (today.year() + 1, Month::January),
            month => (today.year(), month.next()),
        };

        Ok((
            self.start_of_day(first_of_month(today.year(), today.month())?)?,
            self.start_of_day(first_of_month(next_year, next_month)?)?,
        ))
    }

    /// The half-open UTC range covering the current local calendar year.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the year ends past the last representable date.
    pub fn current_year(&self) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
        let year = self.today().year();

        Ok((
            self.start_of_day(first_of_month(year, Month::January)?)?,
            self.start_of_day(first_of_month(year + 1, Month::January)?)?,
        ))
    }
}

fn first_of_month(year: i32, month: Month) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, 1).map_err(|error| {
        tracing::debug!("Could not build the first of {month} {year}: {error}");
        Error::Validation(format!(
            "Invalid date, {month} {year} is out of the supported range."
        ))
    })
}

fn out_of_range(date: Date) -> Error {
    Error::Validation(format!(
        "Invalid date \"{date}\", it is out of the supported range."
    ))
}

#[cfg(test)]
mod tests {
    use time::{
        Date, UtcOffset,
        macros::{date, datetime, offset},
    };

    use crate::{Error, timezone::Clock};

    fn auckland_clock(now: time::OffsetDateTime) -> Clock {
        Clock::in_timezone(
            now,
            time_tz::timezones::get_by_name("Pacific/Auckland").unwrap(),
        )
    }

    #[test]
    fn new_truncates_to_whole_seconds_in_utc() {
        let clock = Clock::new(datetime!(2025-03-14 10:20:30.999 +13:00), offset!(+13));

        assert_eq!(clock.now(), datetime!(2025-03-13 21:20:30 UTC));
    }

    #[test]
    fn today_uses_local_offset() {
        let clock = Clock::new(datetime!(2025-03-13 21:00:00 UTC), offset!(+13));

        assert_eq!(clock.today(), date!(2025 - 03 - 14));
    }

    #[test]
    fn current_month_starts_at_local_midnight() {
        let clock = Clock::new(datetime!(2025-03-13 21:00:00 UTC), offset!(+13));

        let (start, end) = clock.current_month().unwrap();

        assert_eq!(start, datetime!(2025-02-28 11:00:00 UTC));
        assert_eq!(end, datetime!(2025-03-31 11:00:00 UTC));
    }

    #[test]
    fn current_month_rolls_over_in_december() {
        let clock = Clock::new(datetime!(2025-12-24 12:00:00 UTC), UtcOffset::UTC);

        let (start, end) = clock.current_month().unwrap();

        assert_eq!(start, datetime!(2025-12-01 00:00:00 UTC));
        assert_eq!(end, datetime!(2026-01-01 00:00:00 UTC));
    }

    #[test]
    fn current_month_uses_offset_at_each_boundary() {
        // Daylight saving in Auckland ended on 2025-04-06, so April started
        // at +13 and ends at +12.
        let clock = auckland_clock(datetime!(2025-04-10 00:00:00 UTC));

        let (start, end) = clock.current_month().unwrap();

        assert_eq!(start, datetime!(2025-03-31 11:00:00 UTC));
        assert_eq!(end, datetime!(2025-04-30 12:00:00 UTC));
    }

    #[test]
    fn to_local_uses_offset_at_the_instant() {
        let clock = auckland_clock(datetime!(2025-04-10 00:00:00 UTC));

        let local = clock.to_local(datetime!(2025-03-31 11:30:00 UTC));

        assert_eq!(local.date(), date!(2025 - 04 - 01));
        assert_eq!(local.offset(), offset!(+13));
    }

    #[test]
    fn skipped_midnight_starts_day_at_the_jump() {
        // Santiago moved from -4 to -3 at midnight on 2024-09-08.
        let clock = Clock::in_timezone(
            datetime!(2024-09-10 12:00:00 UTC),
            time_tz::timezones::get_by_name("America/Santiago").unwrap(),
        );

        let start = clock.start_of_day(date!(2024 - 09 - 08)).unwrap();

        assert_eq!(start, datetime!(2024-09-08 04:00:00 UTC));
    }

    #[test]
    fn current_year_covers_january_to_december() {
        let clock = Clock::new(datetime!(2025-06-01 12:00:00 UTC), UtcOffset::UTC);

        let (start, end) = clock.current_year().unwrap();

        assert_eq!(start, datetime!(2025-01-01 00:00:00 UTC));
        assert_eq!(end, datetime!(2026-01-01 00:00:00 UTC));
    }

    #[test]
    fn day_range_includes_last_day() {
        let clock = Clock::new(datetime!(2025-06-01 12:00:00 UTC), UtcOffset::UTC);

        let (start, end) = clock
            .day_range(date!(2025 - 05 - 25), date!(2025 - 06 - 01))
            .unwrap();

        assert_eq!(start, datetime!(2025-05-25 00:00:00 UTC));
        assert_eq!(end, datetime!(2025-06-02 00:00:00 UTC));
    }

    #[test]
    fn day_range_rejects_last_representable_date() {
        let clock = Clock::new(datetime!(2025-06-01 12:00:00 UTC), UtcOffset::UTC);

        let result = clock.day_range(date!(9999 - 12 - 01), Date::MAX);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn start_of_day_rejects_dates_shifted_out_of_range() {
        let ahead = Clock::new(datetime!(2025-06-01 12:00:00 UTC), offset!(+13));
        let behind = Clock::new(datetime!(2025-06-01 12:00:00 UTC), offset!(-10));

        assert!(matches!(
            ahead.start_of_day(Date::MIN),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            behind.start_of_day(Date::MAX),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn system_rejects_unknown_timezone() {
        let result = Clock::system("Not/A_Timezone");

        assert_eq!(
            result,
            Err(Error::InvalidTimezoneError("Not/A_Timezone".to_owned()))
        );
    }

    #[test]
    fn system_accepts_canonical_timezone() {
        assert!(Clock::system("Pacific/Auckland").is_ok());
    }
}
