use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{Result, StatsError};

/// Anything that can run a GraphQL query and hand back its `data` member
#[async_trait]
pub trait GraphQlExecutor: Send + Sync {
    async fn execute(&self, query: &str, token: Option<&str>) -> Result<Value>;
}

/// Run `query` and deserialize its `data` member into `T`
pub async fn run_query<T: DeserializeOwned>(
    executor: &dyn GraphQlExecutor,
    query: &str,
    token: Option<&str>,
) -> Result<T> {
    let data = executor.execute(query, token).await?;
    serde_json::from_value(data).map_err(|e| StatsError::UpstreamDecode(e.to_string()))
}

/// Render a value as a GraphQL string literal
pub fn string_literal(value: &str) -> String {
    // JSON string escaping is a valid subset of GraphQL string escaping
    Value::String(value.to_string()).to_string()
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// GraphQL over HTTP POST against one fixed endpoint
pub struct GraphQlClient {
    http: Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GraphQlExecutor for GraphQlClient {
    async fn execute(&self, query: &str, token: Option<&str>) -> Result<Value> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query }));

        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            log::warn!("GraphQL endpoint {} returned status {}", self.endpoint, status);
            return Err(StatsError::UpstreamStatus {
                code: status.as_u16(),
            });
        }

        let envelope: GraphQlEnvelope = response
            .json()
            .await
            .map_err(|e| StatsError::UpstreamDecode(e.to_string()))?;

        // Only the first reported error is surfaced
        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(StatsError::UpstreamGraphQl {
                message: first.message,
            });
        }

        match envelope.data {
            Some(Value::Null) | None => Err(StatsError::NoDataFound(
                "empty response data".to_string(),
            )),
            Some(data) => Ok(data),
        }
    }
}
