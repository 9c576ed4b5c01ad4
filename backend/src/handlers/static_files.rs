use actix_files::NamedFile;
use actix_web::{web, Responder};
use std::path::PathBuf;

use crate::utils::config::Config;

/// GET /api/doc/
/// Serve the API documentation page from the public directory
pub async fn serve_docs(config: web::Data<Config>) -> Result<impl Responder, actix_web::Error> {
    let file_path = PathBuf::from(&config.public_dir).join("index.html");

    if !file_path.exists() {
        log::warn!("Documentation page not found at {}", file_path.display());
        return Err(actix_web::error::ErrorNotFound("Documentation not found"));
    }

    let named_file = NamedFile::open(file_path).map_err(|e| {
        log::error!("Failed to open file: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to serve file")
    })?;

    Ok(named_file)
}
