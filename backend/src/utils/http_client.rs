use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const USER_AGENT: &str = "stats-backend/1.0.0";

/// Create a configured HTTP client for making requests to upstream APIs
pub fn create_http_client(timeout: Duration) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
