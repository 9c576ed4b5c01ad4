use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::services::error::{Result, StatsError};

const PROFILE_FIELDS: &str = "username,name,firstName,lastName,bio,picture,creationDate,streak,totalXp,courses,streakData";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub title: String,
    pub learning_language: String,
    pub from_language: String,
    pub xp: u64,
    pub crowns: u32,
    pub id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentStreak {
    pub start_date: Option<String>,
    pub length: u32,
    pub end_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakData {
    pub current_streak: Option<CurrentStreak>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageXp {
    pub language_id: String,
    pub percentage: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuolingoUser {
    pub username: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub picture: Option<String>,
    pub creation_date: i64,
    pub streak: u32,
    pub total_xp: u64,
    pub courses: Vec<Course>,
    pub streak_data: StreakData,
    #[serde(rename = "xp_by_language")]
    pub xp_by_language: Vec<LanguageXp>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<DuolingoUser>,
}

pub struct DuolingoClient {
    http: Client,
    base_url: String,
}

impl DuolingoClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch a public Duolingo profile and compute its XP share per course
    pub async fn fetch_user(&self, username: &str) -> Result<DuolingoUser> {
        let response = self
            .http
            .get(format!("{}/2017-06-30/users", self.base_url))
            .query(&[("username", username), ("fields", PROFILE_FIELDS)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            log::warn!("Duolingo returned status {} for {}", status, username);
            return Err(StatsError::UpstreamStatus {
                code: status.as_u16(),
            });
        }

        let data: UsersResponse = response
            .json()
            .await
            .map_err(|e| StatsError::UpstreamDecode(e.to_string()))?;

        let mut user = data
            .users
            .into_iter()
            .next()
            .ok_or_else(|| StatsError::NoDataFound("user not found".to_string()))?;

        user.xp_by_language = calculate_xp_by_language(&user.courses);

        Ok(user)
    }
}

/// Share of total XP per course title, largest first; empty when no XP was earned
pub fn calculate_xp_by_language(courses: &[Course]) -> Vec<LanguageXp> {
    let mut xp_by_title: HashMap<&str, u64> = HashMap::new();
    let mut total_xp: u64 = 0;

    for course in courses {
        *xp_by_title.entry(course.title.as_str()).or_insert(0) += course.xp;
        total_xp += course.xp;
    }

    if total_xp == 0 {
        return Vec::new();
    }

    let mut percentages: Vec<LanguageXp> = xp_by_title
        .into_iter()
        .map(|(title, xp)| LanguageXp {
            language_id: title.to_string(),
            percentage: xp as f64 / total_xp as f64 * 100.0,
        })
        .collect();

    percentages.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.language_id.cmp(&b.language_id))
    });

    percentages
}
