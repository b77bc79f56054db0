//! Week generation for a calendar year.
//!
//! Weeks start on Monday. Week 1 of year `Y` begins on the first Monday on or
//! after January 1; the last week begins on the Monday on or before
//! December 31. The week count falls out of those two dates (52 or 53).
//!
//! A date in early January whose Monday lies in the previous December belongs
//! to the previous year's last week: `week_id(2026-01-01) == "2025-W52"`.
//! The reported year is always the year of the week's Monday.

use crate::error::{PlannerError, Result};
use crate::model::{format_week_id, Week, YearData};
use crate::paths;
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Earliest plannable year. Week ids carry a four-digit year.
pub const MIN_YEAR: i32 = 1000;
/// Latest plannable year.
pub const MAX_YEAR: i32 = 9999;

pub fn is_supported_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// Reject years outside [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn check_year(year: i32) -> Result<()> {
    if is_supported_year(year) {
        Ok(())
    } else {
        Err(PlannerError::InvalidYear(year))
    }
}

/// Monday that starts week 1 of `year`.
pub fn first_week_start(year: i32) -> NaiveDate {
    let jan1 = ymd(year, 1, 1);
    let offset = (7 - jan1.weekday().num_days_from_monday()) % 7;
    jan1 + Duration::days(i64::from(offset))
}

/// Monday that starts the final week of `year`.
pub fn last_week_start(year: i32) -> NaiveDate {
    week_start(ymd(year, 12, 31))
}

pub fn week_count(year: i32) -> u32 {
    let span = (last_week_start(year) - first_week_start(year)).num_days();
    (span / 7) as u32 + 1
}

/// The full, unassigned week partition for `year`.
pub fn generate_year(year: i32) -> Result<YearData> {
    check_year(year)?;
    let first = first_week_start(year);
    let weeks = (0..week_count(year))
        .map(|i| Week::new(year, i + 1, first + Duration::weeks(i64::from(i))))
        .collect();

    Ok(YearData {
        weeks,
        ..YearData::empty(year)
    })
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Ordinal of `date`'s week within the year of that week's Monday.
pub fn week_number(date: NaiveDate) -> u32 {
    let monday = week_start(date);
    let diff = (monday - first_week_start(monday.year())).num_days();
    (diff / 7) as u32 + 1
}

pub fn week_id(date: NaiveDate) -> String {
    format_week_id(week_start(date).year(), week_number(date))
}

/// Start and end date of week `week_number` in `year`, if the year has it.
pub fn week_range(year: i32, week_number: u32) -> Option<(NaiveDate, NaiveDate)> {
    if !is_supported_year(year) || week_number == 0 || week_number > week_count(year) {
        return None;
    }
    let start = first_week_start(year) + Duration::weeks(i64::from(week_number - 1));
    Some((start, start + Duration::days(6)))
}

/// Split a `YYYY-Wnn` id into its year and week number. Rejects week numbers
/// the year does not have.
pub fn parse_week_id(id: &str) -> Option<(i32, u32)> {
    if !paths::is_week_id(id) {
        return None;
    }
    let (year, week) = id.split_once("-W")?;
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    week_range(year, week).map(|_| (year, week))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_week_id() -> String {
    week_id(today())
}

pub fn current_year() -> i32 {
    today().year()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn year_2026_boundaries() {
        // Jan 1 2026 is a Thursday.
        assert_eq!(first_week_start(2026), d(2026, 1, 5));
        assert_eq!(last_week_start(2026), d(2026, 12, 28));
        assert_eq!(week_count(2026), 52);
    }

    #[test]
    fn monday_new_year_starts_week_one() {
        // Jan 1 2024 is a Monday.
        assert_eq!(first_week_start(2024), d(2024, 1, 1));
        assert_eq!(week_count(2024), 53);
    }

    #[test]
    fn every_year_is_contiguous_and_well_formed() {
        for year in 1990..=2100 {
            let data = generate_year(year).unwrap();
            let n = data.weeks.len();
            assert!(n == 52 || n == 53, "{year} has {n} weeks");
            for (i, week) in data.weeks.iter().enumerate() {
                assert_eq!(week.week_number as usize, i + 1);
                assert_eq!(week.order, week.week_number);
                assert_eq!(week.year, year);
                assert_eq!(week.start_date.weekday(), Weekday::Mon);
                assert_eq!(week.end_date, week.start_date + Duration::days(6));
                if i > 0 {
                    assert_eq!(week.start_date, data.weeks[i - 1].start_date + Duration::days(7));
                }
            }
            assert!(data.check_invariants().is_empty(), "{year}");
            assert!(data.sprints.is_empty());
            assert!(data.vacation_week_ids.is_empty());
            assert!(data.cooldown_week_ids.is_empty());
        }
    }

    #[test]
    fn week_ids_are_zero_padded() {
        let data = generate_year(2026).unwrap();
        assert_eq!(data.weeks[0].id, "2026-W01");
        assert_eq!(data.weeks[51].id, "2026-W52");
    }

    #[test]
    fn week_id_agrees_with_generated_year_for_every_day() {
        for year in [2020, 2021, 2024, 2025, 2026, 2027, 2032] {
            let mut date = d(year, 1, 1);
            while date.year() == year {
                let id = week_id(date);
                let owner_year = week_start(date).year();
                let generated = generate_year(owner_year).unwrap();
                let week = generated
                    .weeks
                    .iter()
                    .find(|w| w.contains(date))
                    .unwrap_or_else(|| panic!("no week of {owner_year} contains {date}"));
                assert_eq!(week.id, id, "{date}");
                date = date.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn early_january_belongs_to_previous_year() {
        assert_eq!(week_id(d(2026, 1, 1)), "2025-W52");
        assert_eq!(week_id(d(2026, 1, 4)), "2025-W52");
        assert_eq!(week_id(d(2026, 1, 5)), "2026-W01");
        assert_eq!(week_number(d(2026, 1, 1)), 52);
    }

    #[test]
    fn late_december_week_spills_into_next_year() {
        let data = generate_year(2026).unwrap();
        let last = data.weeks.last().unwrap();
        assert_eq!(last.end_date, d(2027, 1, 3));
        assert_eq!(week_id(d(2027, 1, 2)), "2026-W52");
    }

    #[test]
    fn week_range_and_parse() {
        assert_eq!(week_range(2026, 1), Some((d(2026, 1, 5), d(2026, 1, 11))));
        assert_eq!(week_range(2026, 53), None);
        assert_eq!(week_range(2026, 0), None);
        assert_eq!(parse_week_id("2026-W07"), Some((2026, 7)));
        assert_eq!(parse_week_id("2024-W53"), Some((2024, 53)));
        assert_eq!(parse_week_id("2026-W53"), None);
        assert_eq!(parse_week_id("2026-7"), None);
        assert_eq!(parse_week_id("garbage"), None);
    }

    #[test]
    fn unrepresentable_years_are_rejected() {
        for year in [300_000, -5, 0, 999, 10_000, i32::MAX, i32::MIN] {
            assert!(
                matches!(generate_year(year), Err(PlannerError::InvalidYear(y)) if y == year),
                "{year}"
            );
            assert_eq!(week_range(year, 1), None);
        }
        assert_eq!(generate_year(MIN_YEAR).unwrap().year, MIN_YEAR);
        assert_eq!(generate_year(MAX_YEAR).unwrap().year, MAX_YEAR);
        assert_eq!(parse_week_id("0999-W01"), None);
    }

    #[test]
    fn current_week_id_is_parseable() {
        assert!(parse_week_id(&current_week_id()).is_some());
    }
}
