use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Consecutive-day tolerance between two submission days
const MAX_GAP_HOURS: i64 = 25;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStats {
    pub total_submissions: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Streaks from a LeetCode submission calendar (JSON object of UNIX timestamp -> count).
///
/// Empty or malformed calendars yield all-zero stats. The current streak only counts
/// when `today` (UTC) itself has a submission.
pub fn calculate_streaks(calendar: &str, today: NaiveDate) -> StreakStats {
    if calendar.trim().is_empty() {
        return StreakStats::default();
    }

    let submissions: HashMap<String, i64> = match serde_json::from_str(calendar) {
        Ok(submissions) => submissions,
        Err(e) => {
            log::warn!("Ignoring malformed submission calendar: {}", e);
            return StreakStats::default();
        }
    };

    let mut total_submissions = 0;
    let mut days = BTreeSet::new();

    for timestamp in submissions.keys() {
        let day = match timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        {
            Some(moment) => moment.date_naive(),
            None => continue,
        };
        days.insert(day);
        total_submissions += 1;
    }

    let mut longest = 0;
    let mut current = 0;
    let mut last_day: Option<NaiveDate> = None;

    for day in &days {
        let extends = match last_day {
            None => true,
            Some(last) => day.signed_duration_since(last).num_hours() <= MAX_GAP_HOURS,
        };
        current = if extends { current + 1 } else { 1 };
        longest = longest.max(current);
        last_day = Some(*day);
    }

    if !days.contains(&today) {
        current = 0;
    }

    StreakStats {
        total_submissions,
        current_streak: current,
        longest_streak: longest,
    }
}
