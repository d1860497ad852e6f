//! Upcoming-window computation for anniversaries.
//!
//! # Invariants
//! - One-off anniversaries are measured against their stored date.
//! - Recurring anniversaries are measured against their month/day projected
//!   onto today's year. Under `CurrentYear` an occurrence that already
//!   passed this year is not reported; `RollForward` moves it to next year.
//! - Feb 29 has no projection onto a non-leap year and is skipped there
//!   (`RollForward` still tries the following year).

use crate::model::anniversary::{Anniversary, UpcomingAnniversary};
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

/// Window used when the caller does not pass one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// How a recurring anniversary whose date already passed this year is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecurrencePolicy {
    /// Project onto the current year only; passed dates drop out until
    /// next January.
    #[default]
    CurrentYear,
    /// Project onto the next occurrence on or after today.
    RollForward,
}

impl RecurrencePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentYear => "current-year",
            Self::RollForward => "roll-forward",
        }
    }
}

impl FromStr for RecurrencePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current-year" | "current_year" => Ok(Self::CurrentYear),
            "roll-forward" | "roll_forward" => Ok(Self::RollForward),
            other => Err(format!(
                "unsupported recurrence policy `{other}`; expected current-year|roll-forward"
            )),
        }
    }
}

/// Days from `today` to the relevant occurrence of `anniversary`.
///
/// Negative for past one-off dates (and, under `CurrentYear`, for recurring
/// dates already passed this year). `None` when no projection exists.
pub fn days_until(
    anniversary: &Anniversary,
    today: NaiveDate,
    policy: RecurrencePolicy,
) -> Option<i64> {
    if !anniversary.is_recurring {
        return Some((anniversary.date - today).num_days());
    }

    let this_year = project(anniversary.date, today.year());
    let occurrence = match policy {
        RecurrencePolicy::CurrentYear => this_year,
        RecurrencePolicy::RollForward => match this_year {
            Some(date) if date >= today => Some(date),
            _ => project(anniversary.date, today.year() + 1),
        },
    }?;
    Some((occurrence - today).num_days())
}

/// Keeps anniversaries due within `[0, window_days]` days, soonest first.
pub fn select_upcoming(
    anniversaries: Vec<Anniversary>,
    today: NaiveDate,
    window_days: i64,
    policy: RecurrencePolicy,
) -> Vec<UpcomingAnniversary> {
    let mut upcoming = anniversaries
        .into_iter()
        .filter_map(|anniversary| {
            let days = days_until(&anniversary, today, policy)?;
            (0..=window_days).contains(&days).then_some(UpcomingAnniversary {
                anniversary,
                days_until: days,
            })
        })
        .collect::<Vec<_>>();
    upcoming.sort_by_key(|item| (item.days_until, item.anniversary.id));
    upcoming
}

fn project(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::{days_until, select_upcoming, RecurrencePolicy};
    use crate::model::anniversary::Anniversary;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn anniversary(id: i64, date: NaiveDate, is_recurring: bool) -> Anniversary {
        let stamp = ymd(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        Anniversary {
            id,
            title: format!("anniversary {id}"),
            date,
            description: None,
            category: "anniversary".to_string(),
            is_recurring,
            reminder_days: 0,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn recurring_date_is_projected_onto_current_year() {
        let today = ymd(2024, 6, 10);
        let item = anniversary(1, ymd(2015, 6, 15), true);
        assert_eq!(days_until(&item, today, RecurrencePolicy::CurrentYear), Some(5));
    }

    #[test]
    fn passed_recurring_date_does_not_roll_over_by_default() {
        let today = ymd(2024, 6, 10);
        let item = anniversary(1, ymd(2015, 6, 5), true);
        assert_eq!(days_until(&item, today, RecurrencePolicy::CurrentYear), Some(-5));
        assert!(select_upcoming(vec![item], today, 30, RecurrencePolicy::CurrentYear).is_empty());
    }

    #[test]
    fn roll_forward_moves_passed_date_to_next_year() {
        let today = ymd(2024, 12, 20);
        let item = anniversary(1, ymd(2019, 1, 3), true);
        assert_eq!(days_until(&item, today, RecurrencePolicy::RollForward), Some(14));
        let upcoming = select_upcoming(vec![item], today, 30, RecurrencePolicy::RollForward);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].days_until, 14);
    }

    #[test]
    fn leap_day_is_skipped_in_non_leap_year_unless_rolled_forward() {
        let today = ymd(2023, 2, 20);
        let item = anniversary(1, ymd(2020, 2, 29), true);
        assert_eq!(days_until(&item, today, RecurrencePolicy::CurrentYear), None);
        assert_eq!(days_until(&item, today, RecurrencePolicy::RollForward), Some(374));

        let leap_today = ymd(2024, 2, 20);
        assert_eq!(days_until(&item, leap_today, RecurrencePolicy::CurrentYear), Some(9));
    }

    #[test]
    fn window_is_inclusive_and_sorted_by_days_then_id() {
        let today = ymd(2024, 3, 1);
        let items = vec![
            anniversary(3, ymd(2024, 3, 31), false),
            anniversary(2, ymd(2024, 3, 1), false),
            anniversary(1, ymd(2010, 3, 31), true),
            anniversary(4, ymd(2024, 4, 1), false),
            anniversary(5, ymd(2024, 2, 29), false),
        ];
        let upcoming = select_upcoming(items, today, 30, RecurrencePolicy::CurrentYear);
        let ids = upcoming
            .iter()
            .map(|item| (item.anniversary.id, item.days_until))
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![(2, 0), (1, 30), (3, 30)]);
    }

    #[test]
    fn negative_window_selects_nothing() {
        let today = ymd(2024, 3, 1);
        let items = vec![anniversary(1, today, false)];
        assert!(select_upcoming(items, today, -1, RecurrencePolicy::CurrentYear).is_empty());
    }

    #[test]
    fn policy_parses_cli_labels() {
        assert_eq!(
            "roll-forward".parse::<RecurrencePolicy>(),
            Ok(RecurrencePolicy::RollForward)
        );
        assert_eq!(
            " Current_Year ".parse::<RecurrencePolicy>(),
            Ok(RecurrencePolicy::CurrentYear)
        );
        assert!("yearly".parse::<RecurrencePolicy>().is_err());
    }
}
