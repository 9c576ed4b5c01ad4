use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, Utc};
use serde_json::json;

use super::{http_error, UserQuery};
use crate::services::contribution_aggregation::aggregate;
use crate::services::language_stats::calculate_language_percentages;
use crate::services::platforms::github::RepositoryFilter;
use crate::services::platforms::GitHubClient;
use crate::utils::config::Config;
use crate::utils::validators::require_user;

/// GET /api/git/user?user=
/// Basic GitHub profile
pub async fn user(
    github: web::Data<GitHubClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error fetching user data";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;

    let user_info = github
        .fetch_user_info(username)
        .await
        .map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(json!({
        "user": user_info,
    })))
}

/// GET /api/git/repos?user=
/// Public repositories with their languages and last commit date
pub async fn repos(
    github: web::Data<GitHubClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error fetching repositories";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;
    let token = github.tokens().primary().map_err(|e| http_error(context, e))?;

    let repositories = github
        .fetch_all_repositories(username, token, RepositoryFilter::Public)
        .await
        .map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(json!({
        "user": username,
        "count": repositories.len(),
        "repositories": repositories,
    })))
}

/// GET /api/git/repos_count?user=
pub async fn repos_count(
    github: web::Data<GitHubClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error fetching repositories";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;
    let token = github.tokens().primary().map_err(|e| http_error(context, e))?;

    let repositories = github
        .fetch_all_repositories(username, token, RepositoryFilter::Public)
        .await
        .map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(json!({
        "count": repositories.len(),
    })))
}

/// GET /api/git/langs?user=
/// Byte-weighted language percentages across non-fork repositories
pub async fn langs(
    github: web::Data<GitHubClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error calculating languages";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;
    let token = github.tokens().pick().map_err(|e| http_error(context, e))?;

    let repositories = github
        .fetch_all_repositories(username, token, RepositoryFilter::NonFork)
        .await
        .map_err(|e| http_error(context, e))?;

    let breakdown =
        calculate_language_percentages(&repositories).map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(json!({
        "user": username,
        "languages": breakdown.languages,
        "total_bytes": breakdown.total_bytes,
    })))
}

/// GET /api/git/commit?user=
/// Per-year contribution calendars and the grand total
pub async fn commit(
    github: web::Data<GitHubClient>,
    config: web::Data<Config>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error retrieving contributions";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;
    let today = Utc::now().date_naive();

    let years = github
        .fetch_contribution_years(username, config.contribution_start_year, today.year())
        .await
        .map_err(|e| http_error(context, e))?;

    let summary = aggregate(&years, today);

    Ok(HttpResponse::Ok().json(json!({
        "user": username,
        "commit": years,
        "total": summary.total,
        "total_by_year": summary.total_by_year,
    })))
}

/// GET /api/git/streak?user=
/// Contribution totals and the longest/current daily streak
pub async fn streak(
    github: web::Data<GitHubClient>,
    config: web::Data<Config>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error calculating streaks";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;
    let today = Utc::now().date_naive();

    let years = github
        .fetch_contribution_years(username, config.contribution_start_year, today.year())
        .await
        .map_err(|e| http_error(context, e))?;

    let summary = aggregate(&years, today);

    Ok(HttpResponse::Ok().json(json!({
        "user": username,
        "total": summary.total,
        "total_by_year": summary.total_by_year,
        "longest_streak": summary.longest_streak,
        "current_streak": summary.current_streak,
    })))
}
