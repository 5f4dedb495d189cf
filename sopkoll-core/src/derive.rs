//! Read-time calculation of day-relative sensor attributes.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::PickupRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Week-boundary convention for the "this week" flag.
///
/// The upstream locale uses Monday-start weeks; the boundary is configurable
/// because the source API leaves its own convention undocumented.
pub struct WeekConvention {
    /// First day of the week window.
    pub week_start: Weekday,
}

impl Default for WeekConvention {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Convenience flags derived from a pickup record and the current date.
///
/// Computed fresh on every read and never cached; "today" moves
/// independently of the schedule.
pub struct DerivedAttributes {
    /// Whole days until the pickup. `None` means the recorded date has
    /// already passed (stale cache) and must be treated as unknown/overdue,
    /// not as a countdown.
    pub days_until_pickup: Option<u32>,
    /// Pickup is due today.
    pub is_today: bool,
    /// Pickup is due tomorrow.
    pub is_tomorrow: bool,
    /// Pickup date falls inside the week window containing today.
    pub is_this_week: bool,
    /// Full weekday name of the pickup date, e.g. "Monday".
    pub pickup_weekday: String,
}

/// Compute the derived attributes for one pickup record.
///
/// Pure function of its inputs: no clock access, no I/O.
#[must_use]
pub fn derive(record: &PickupRecord, today: NaiveDate, convention: WeekConvention) -> DerivedAttributes {
    let delta = (record.pickup_date - today).num_days();
    let days_until_pickup = u32::try_from(delta).ok();

    let week_start = today - Duration::days(i64::from(today.weekday().days_since(convention.week_start)));
    let week_end = week_start + Duration::days(6);
    let is_this_week = record.pickup_date >= week_start && record.pickup_date <= week_end;

    DerivedAttributes {
        days_until_pickup,
        is_today: delta == 0,
        is_tomorrow: delta == 1,
        is_this_week,
        pickup_weekday: record.pickup_date.format("%A").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WasteType;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn household_monday() -> PickupRecord {
        // 2024-06-10 is a Monday.
        PickupRecord::new(WasteType("Hushållsavfall".into()), date(2024, 6, 10))
    }

    #[test]
    fn day_before_pickup_is_tomorrow() {
        let attrs = derive(&household_monday(), date(2024, 6, 9), WeekConvention::default());

        assert_eq!(attrs.days_until_pickup, Some(1));
        assert!(attrs.is_tomorrow);
        assert!(!attrs.is_today);
        assert_eq!(attrs.pickup_weekday, "Monday");
    }

    #[test]
    fn pickup_day_is_today() {
        let attrs = derive(&household_monday(), date(2024, 6, 10), WeekConvention::default());

        assert_eq!(attrs.days_until_pickup, Some(0));
        assert!(attrs.is_today);
        assert!(!attrs.is_tomorrow);
        assert!(attrs.is_this_week);
    }

    #[test]
    fn passed_date_clamps_to_overdue_sentinel() {
        let attrs = derive(&household_monday(), date(2024, 6, 12), WeekConvention::default());

        assert_eq!(attrs.days_until_pickup, None);
        assert!(!attrs.is_today);
        assert!(!attrs.is_tomorrow);
    }

    #[test]
    fn monday_week_window_contains_following_sunday() {
        // Today Sunday 2024-06-09: with a Monday start the window is
        // 2024-06-03..=2024-06-09, so next day's pickup is outside it.
        let attrs = derive(&household_monday(), date(2024, 6, 9), WeekConvention::default());
        assert!(!attrs.is_this_week);

        // With a Sunday-start convention the window shifts to
        // 2024-06-09..=2024-06-15 and the Monday pickup is inside.
        let sunday_start = WeekConvention {
            week_start: Weekday::Sun,
        };
        let attrs = derive(&household_monday(), date(2024, 6, 9), sunday_start);
        assert!(attrs.is_this_week);
    }

    #[test]
    fn derive_is_deterministic() {
        let record = household_monday();
        let today = date(2024, 6, 9);
        let first = derive(&record, today, WeekConvention::default());
        let second = derive(&record, today, WeekConvention::default());
        assert_eq!(first, second);
    }
}
