use actix_web::{web, HttpResponse, Responder};

use super::{http_error, UserQuery};
use crate::services::platforms::DuolingoClient;
use crate::utils::validators::require_user;

/// GET /api/duo/user?user=
/// Duolingo profile, courses and XP share per course
pub async fn user(
    duolingo: web::Data<DuolingoClient>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let context = "Error fetching Duolingo data";
    let username = require_user(query.user.as_deref()).map_err(|e| http_error(context, e))?;

    let user = duolingo
        .fetch_user(username)
        .await
        .map_err(|e| http_error(context, e))?;

    Ok(HttpResponse::Ok().json(user))
}
