use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::platforms::github::ContributionYear;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub longest: u32,
    pub current: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContributionSummary {
    pub total: u64,
    pub total_by_year: BTreeMap<i32, u64>,
    pub longest_streak: u32,
    pub current_streak: u32,
}

/// Totals per requested year plus one continuous streak across every supplied year
pub fn aggregate(years: &BTreeMap<i32, ContributionYear>, today: NaiveDate) -> ContributionSummary {
    let total_by_year: BTreeMap<i32, u64> = years
        .iter()
        .map(|(year, calendar)| {
            let total = calendar
                .contribution_calendar
                .days()
                .map(|day| u64::from(day.contribution_count))
                .sum();
            (*year, total)
        })
        .collect();

    let total = total_by_year.values().sum();

    // Flatten every year into one chronological series, merging duplicate dates
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for calendar in years.values() {
        for day in calendar.contribution_calendar.days() {
            *daily.entry(day.date).or_insert(0) += u64::from(day.contribution_count);
        }
    }

    let streaks = calculate_streaks(daily.range(..=today).map(|(date, count)| (*date, *count)));

    ContributionSummary {
        total,
        total_by_year,
        longest_streak: streaks.longest,
        current_streak: streaks.current,
    }
}

/// Single pass over chronologically ordered (date, count) pairs.
///
/// A contributing day extends the running streak only when the previous day seen was
/// also contributing and exactly one day earlier; a day without contributions ends it.
pub fn calculate_streaks<I>(days: I) -> StreakResult
where
    I: IntoIterator<Item = (NaiveDate, u64)>,
{
    let mut longest = 0;
    let mut running = 0;
    let mut last_contribution: Option<NaiveDate> = None;
    let mut streak_active = false;

    for (date, count) in days {
        if count > 0 {
            let consecutive = streak_active
                && last_contribution
                    .map(|last| date.signed_duration_since(last).num_days() == 1)
                    .unwrap_or(false);

            running = if consecutive { running + 1 } else { 1 };
            streak_active = true;
            last_contribution = Some(date);
            longest = longest.max(running);
        } else {
            streak_active = false;
            running = 0;
        }
    }

    StreakResult {
        longest,
        current: if streak_active { running } else { 0 },
    }
}
