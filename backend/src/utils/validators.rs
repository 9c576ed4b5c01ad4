use anyhow::{anyhow, Result};
use url::Url;

use crate::services::error::StatsError;

/// Parse an upstream endpoint URL; only absolute http(s) URLs with a host are accepted
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| anyhow!("Invalid URL format: {}", e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("URL must use http or https scheme, got: {}", url.scheme()));
    }
    if !url.has_host() {
        return Err(anyhow!("URL must have a host"));
    }

    Ok(url)
}

/// The `user` query parameter, required and non-blank on every API endpoint
pub fn require_user(user: Option<&str>) -> Result<&str, StatsError> {
    match user.map(str::trim) {
        Some(user) if !user.is_empty() => Ok(user),
        _ => Err(StatsError::MissingParameter("user")),
    }
}
