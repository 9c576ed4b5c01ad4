use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::error::{Result, StatsError};
use crate::services::graphql::{run_query, string_literal, GraphQlExecutor};
use crate::services::submission_streaks::{calculate_streaks, StreakStats};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionCount {
    pub difficulty: String,
    pub count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionCount {
    pub difficulty: String,
    pub count: u32,
    pub submissions: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    #[serde(default)]
    pub ac_submission_num: Vec<SubmissionCount>,
    #[serde(default)]
    pub total_submission_num: Vec<SubmissionCount>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Contributions {
    #[serde(default)]
    pub points: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub ranking: i64,
    pub user_avatar: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub contributions: Contributions,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub submission_calendar: String,
    #[serde(default)]
    pub submit_stats: SubmitStats,
    #[serde(default)]
    pub streak: StreakStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSubmission {
    pub title: String,
    pub title_slug: String,
    pub timestamp: String,
    pub status_display: String,
    pub lang: String,
}

/// LeetCode profile, question counts, recent submissions and computed streaks
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeUserData {
    pub all_questions_count: Vec<QuestionCount>,
    pub matched_user: MatchedUser,
    pub recent_submission_list: Vec<RecentSubmission>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDataResponse {
    #[serde(default)]
    all_questions_count: Vec<QuestionCount>,
    matched_user: Option<MatchedUser>,
    #[serde(default)]
    recent_submission_list: Option<Vec<RecentSubmission>>,
}

pub struct LeetCodeClient {
    executor: Arc<dyn GraphQlExecutor>,
}

impl LeetCodeClient {
    pub fn new(executor: Arc<dyn GraphQlExecutor>) -> Self {
        Self { executor }
    }

    /// Fetch everything shown for a LeetCode user; streaks are computed against `today` (UTC)
    pub async fn fetch_user_data(&self, username: &str, today: NaiveDate) -> Result<LeetCodeUserData> {
        let query = build_user_query(username);

        let response: UserDataResponse = run_query(self.executor.as_ref(), &query, None).await?;

        let mut matched_user = response
            .matched_user
            .ok_or_else(|| StatsError::NoDataFound("user not found".to_string()))?;
        matched_user.streak = calculate_streaks(&matched_user.submission_calendar, today);

        log::info!(
            "Fetched LeetCode data for {}: {} submissions, longest streak {}",
            username,
            matched_user.streak.total_submissions,
            matched_user.streak.longest_streak
        );

        Ok(LeetCodeUserData {
            all_questions_count: response.all_questions_count,
            matched_user,
            recent_submission_list: response.recent_submission_list.unwrap_or_default(),
        })
    }
}

fn build_user_query(username: &str) -> String {
    let username = string_literal(username);

    format!(
        r#"{{
            allQuestionsCount {{
                difficulty
                count
            }}
            matchedUser(username: {username}) {{
                username
                firstName
                lastName
                contributions {{
                    points
                }}
                profile {{
                    reputation
                    ranking
                    userAvatar
                }}
                submissionCalendar
                submitStats {{
                    acSubmissionNum {{
                        difficulty
                        count
                        submissions
                    }}
                    totalSubmissionNum {{
                        difficulty
                        count
                        submissions
                    }}
                }}
            }}
            recentSubmissionList(username: {username}) {{
                title
                titleSlug
                timestamp
                statusDisplay
                lang
            }}
        }}"#
    )
}
