pub mod duolingo;
pub mod github;
pub mod leetcode;

use std::sync::Arc;

pub use duolingo::DuolingoClient;
pub use github::GitHubClient;
pub use leetcode::LeetCodeClient;

use crate::services::graphql::GraphQlClient;
use crate::utils::config::Config;
use crate::utils::http_client::create_http_client;
use crate::utils::token_pool::TokenPool;

/// One client per upstream platform, all sharing a single HTTP connection pool
pub struct PlatformClients {
    pub github: GitHubClient,
    pub leetcode: LeetCodeClient,
    pub duolingo: DuolingoClient,
}

impl PlatformClients {
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let http = create_http_client(config.request_timeout())?;

        let tokens = TokenPool::new(config.github_tokens.clone(), config.token_strategy);
        let github = GitHubClient::new(
            Arc::new(GraphQlClient::new(http.clone(), config.github_graphql_url.clone())),
            tokens,
            config.max_repository_pages,
        );
        let leetcode = LeetCodeClient::new(Arc::new(GraphQlClient::new(
            http.clone(),
            config.leetcode_graphql_url.clone(),
        )));
        let duolingo = DuolingoClient::new(http, config.duolingo_api_url.clone());

        Ok(Self {
            github,
            leetcode,
            duolingo,
        })
    }
}
