use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;

use super::{http_error, UserQuery};
use crate::services::platforms::LeetCodeClient;
use crate::utils::validators::require_user;

/// GET /api/leet/user?user=
/// LeetCode profile, recent submissions, question counts and submission streaks
pub async fn user(
    leetcode: web::Data<LeetCodeClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Failed to fetch LeetCode data";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;

    let data = leetcode
        .fetch_user_data(username, Utc::now().date_naive())
        .await
        .map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(data))
}
