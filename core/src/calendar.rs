use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};

use crate::models::parse_date;

/// One calendar row, Sunday first. `None` pads days outside the month.
pub type Week = [Option<NaiveDate>; 7];

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month: {year}-{month:02}"))
}

/// Days of the month laid out in Sunday-first weeks.
pub fn month_matrix(year: i32, month: u32) -> Result<Vec<Week>> {
    let first = first_of_month(year, month)?;
    let next = first
        .checked_add_months(Months::new(1))
        .with_context(|| format!("Month out of range: {year}-{month:02}"))?;

    let mut weeks = Vec::new();
    let mut week: Week = [None; 7];
    let mut col = first.weekday().num_days_from_sunday() as usize;
    for day in first.iter_days().take_while(|d| *d < next) {
        week[col] = Some(day);
        col += 1;
        if col == 7 {
            weeks.push(week);
            week = [None; 7];
            col = 0;
        }
    }
    if col > 0 {
        weeks.push(week);
    }
    Ok(weeks)
}

/// Days of the given month that have any logged data, from a set of stored date strings.
pub fn active_days_in_month<'a, I>(dates: I, year: i32, month: u32) -> Result<BTreeSet<u32>>
where
    I: IntoIterator<Item = &'a String>,
{
    first_of_month(year, month)?;
    Ok(dates
        .into_iter()
        .filter_map(|d| parse_date(d))
        .filter(|d| d.year() == year && d.month() == month)
        .map(|d| d.day())
        .collect())
}

/// Active days for every month of `year`, keyed 1-12. Months without data map to an empty set.
#[must_use]
pub fn active_days_in_year<'a, I>(dates: I, year: i32) -> BTreeMap<u32, BTreeSet<u32>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut months: BTreeMap<u32, BTreeSet<u32>> = (1..=12).map(|m| (m, BTreeSet::new())).collect();
    for date in dates.into_iter().filter_map(|d| parse_date(d)) {
        if date.year() == year {
            months.entry(date.month()).or_default().insert(date.day());
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_matrix_july_2025() {
        // 2025-07-01 is a Tuesday
        let weeks = month_matrix(2025, 7).unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0], None);
        assert_eq!(weeks[0][1], None);
        assert_eq!(weeks[0][2], NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(weeks[4][4], NaiveDate::from_ymd_opt(2025, 7, 31));
        assert_eq!(weeks[4][5], None);
        let days = weeks.iter().flatten().filter(|d| d.is_some()).count();
        assert_eq!(days, 31);
    }

    #[test]
    fn test_month_matrix_exact_fit() {
        // February 2026 starts on a Sunday and has 28 days
        let weeks = month_matrix(2026, 2).unwrap();
        assert_eq!(weeks.len(), 4);
        assert!(weeks.iter().flatten().all(Option::is_some));
    }

    #[test]
    fn test_month_matrix_leap_february() {
        let weeks = month_matrix(2024, 2).unwrap();
        let days = weeks.iter().flatten().filter(|d| d.is_some()).count();
        assert_eq!(days, 29);
    }

    #[test]
    fn test_month_matrix_invalid_month() {
        assert!(month_matrix(2025, 13).is_err());
        assert!(month_matrix(2025, 0).is_err());
    }

    #[test]
    fn test_active_days_in_month() {
        let dates: Vec<String> = ["2025-07-01", "2025-07-15", "2025-08-02", "garbage", "2024-07-03"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let days = active_days_in_month(&dates, 2025, 7).unwrap();
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 15]);
        assert!(active_days_in_month(&dates, 2025, 13).is_err());
    }

    #[test]
    fn test_active_days_in_year() {
        let dates: Vec<String> = ["2025-01-05", "2025-07-01", "2025-07-15", "2025-12-31", "2024-07-03", "2025-02-30"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let months = active_days_in_year(&dates, 2025);
        assert_eq!(months.len(), 12);
        assert_eq!(months[&1].iter().copied().collect::<Vec<_>>(), vec![5]);
        assert_eq!(months[&7].iter().copied().collect::<Vec<_>>(), vec![1, 15]);
        assert_eq!(months[&12].iter().copied().collect::<Vec<_>>(), vec![31]);
        assert!(months[&2].is_empty());

        let empty = active_days_in_year(&dates, 2030);
        assert!(empty.values().all(BTreeSet::is_empty));
    }
}
