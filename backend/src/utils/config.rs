use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::utils::token_pool::TokenStrategy;
use crate::utils::validators::validate_url;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub github_graphql_url: String,
    pub leetcode_graphql_url: String,
    pub duolingo_api_url: String,
    pub github_tokens: Vec<String>,
    pub token_strategy: TokenStrategy,
    pub contribution_start_year: i32,
    pub max_repository_pages: usize,
    pub request_timeout_secs: u64,
    pub public_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let github_graphql_url = var_or("GITHUB_GRAPHQL_URL", "https://api.github.com/graphql");
        let leetcode_graphql_url = var_or("LEETCODE_GRAPHQL_URL", "https://leetcode.com/graphql");
        let duolingo_api_url = var_or("DUOLINGO_API_URL", "https://www.duolingo.com");

        for (key, value) in [
            ("GITHUB_GRAPHQL_URL", &github_graphql_url),
            ("LEETCODE_GRAPHQL_URL", &leetcode_graphql_url),
            ("DUOLINGO_API_URL", &duolingo_api_url),
        ] {
            validate_url(value).with_context(|| format!("{} is not a valid URL", key))?;
        }

        let max_repository_pages: usize = var_or("MAX_REPOSITORY_PAGES", "50")
            .parse()
            .context("MAX_REPOSITORY_PAGES must be a number")?;
        ensure!(max_repository_pages > 0, "MAX_REPOSITORY_PAGES must be at least 1");

        let request_timeout_secs: u64 = var_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a number")?;
        ensure!(request_timeout_secs > 0, "REQUEST_TIMEOUT_SECS must be at least 1");

        Ok(Config {
            host: var_or("HOST", "127.0.0.1"),
            port: var_or("PORT", "8080")
                .parse()
                .context("PORT must be a number")?,
            github_graphql_url,
            leetcode_graphql_url,
            duolingo_api_url: duolingo_api_url.trim_end_matches('/').to_string(),
            github_tokens: read_numbered_tokens(&lookup),
            token_strategy: var_or("TOKEN_STRATEGY", "random")
                .parse()
                .context("TOKEN_STRATEGY must be random or round_robin")?,
            contribution_start_year: var_or("CONTRIBUTION_START_YEAR", "2015")
                .parse()
                .context("CONTRIBUTION_START_YEAR must be a year")?,
            max_repository_pages,
            request_timeout_secs,
            public_dir: var_or("PUBLIC_DIR", "./public"),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// TOKEN, TOKEN2, TOKEN3, ... up to the first missing number
fn read_numbered_tokens<F>(lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut tokens = Vec::new();
    if let Some(token) = lookup("TOKEN") {
        tokens.push(token);
    }

    for i in 2.. {
        match lookup(&format!("TOKEN{}", i)) {
            Some(token) => tokens.push(token),
            None => break,
        }
    }

    tokens
}
