pub mod duo;
pub mod git;
pub mod leet;
pub mod static_files;

use actix_web::web;
use serde::Deserialize;

use crate::services::error::StatsError;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Option<String>,
}

/// Missing parameters are the caller's fault (400); everything else is reported as a 500
/// carrying the handler context and the upstream message.
pub(crate) fn http_error(context: &str, err: StatsError) -> actix_web::Error {
    if err.is_client_error() {
        log::warn!("{}: {}", context, err);
        return actix_web::error::ErrorBadRequest(err.to_string());
    }

    log::error!("{}: {}", context, err);
    actix_web::error::ErrorInternalServerError(format!("{}: {}", context, err))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/git")
            .route("/user", web::get().to(git::user))
            .route("/repos", web::get().to(git::repos))
            .route("/repos_count", web::get().to(git::repos_count))
            .route("/langs", web::get().to(git::langs))
            .route("/commit", web::get().to(git::commit))
            .route("/streak", web::get().to(git::streak)),
    )
    .route("/api/duo/user", web::get().to(duo::user))
    .route("/api/leet/user", web::get().to(leet::user))
    .route("/api/doc/", web::get().to(static_files::serve_docs));
}
