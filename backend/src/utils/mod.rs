pub mod config;
pub mod http_client;
pub mod token_pool;
pub mod validators;
