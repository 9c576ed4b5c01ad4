use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Missing '{0}' parameter")]
    MissingParameter(&'static str),
    #[error("no GitHub token available")]
    MissingToken,
    #[error("upstream request failed: {0}")]
    UpstreamTransport(#[from] reqwest::Error),
    #[error("upstream API error: status {code}")]
    UpstreamStatus { code: u16 },
    #[error("{message}")]
    UpstreamGraphQl { message: String },
    #[error("failed to decode upstream response: {0}")]
    UpstreamDecode(String),
    #[error("{0}")]
    NoDataFound(String),
    #[error("no language data found")]
    NoLanguageData,
    #[error("pagination stopped after {max_pages} pages")]
    PaginationLimitExceeded { max_pages: usize },
}

impl StatsError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, StatsError::MissingParameter(_))
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
