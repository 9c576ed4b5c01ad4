use rand::Rng;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::services::error::StatsError;

/// How a credential is chosen from the pool for each outbound call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    Random,
    RoundRobin,
}

impl FromStr for TokenStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(TokenStrategy::Random),
            "round_robin" | "round-robin" => Ok(TokenStrategy::RoundRobin),
            other => Err(anyhow::anyhow!("unknown token strategy '{}'", other)),
        }
    }
}

pub trait TokenSelector: Send + Sync {
    /// Index into a pool of `len` credentials; `len` is never zero
    fn select(&self, len: usize) -> usize;
}

pub struct RandomSelector;

impl TokenSelector for RandomSelector {
    fn select(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

#[derive(Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl TokenSelector for RoundRobinSelector {
    fn select(&self, len: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Ordered GitHub credentials injected into the GitHub client
#[derive(Clone)]
pub struct TokenPool {
    tokens: Vec<String>,
    selector: Arc<dyn TokenSelector>,
}

impl TokenPool {
    pub fn new(tokens: Vec<String>, strategy: TokenStrategy) -> Self {
        let selector: Arc<dyn TokenSelector> = match strategy {
            TokenStrategy::Random => Arc::new(RandomSelector),
            TokenStrategy::RoundRobin => Arc::new(RoundRobinSelector::default()),
        };
        Self::with_selector(tokens, selector)
    }

    pub fn with_selector(tokens: Vec<String>, selector: Arc<dyn TokenSelector>) -> Self {
        Self { tokens, selector }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The first configured token (`TOKEN`)
    pub fn primary(&self) -> Result<&str, StatsError> {
        self.tokens
            .first()
            .map(String::as_str)
            .ok_or(StatsError::MissingToken)
    }

    /// A token chosen by the configured selector
    pub fn pick(&self) -> Result<&str, StatsError> {
        if self.is_empty() {
            return Err(StatsError::MissingToken);
        }
        let index = self.selector.select(self.tokens.len());
        Ok(&self.tokens[index % self.tokens.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_pool_has_no_token() {
        let pool = TokenPool::new(vec![], TokenStrategy::Random);

        assert!(pool.is_empty());
        assert!(matches!(pool.primary(), Err(StatsError::MissingToken)));
        assert!(matches!(pool.pick(), Err(StatsError::MissingToken)));
    }

    #[test]
    fn test_primary_is_first_token() {
        let pool = TokenPool::new(tokens(&["first", "second"]), TokenStrategy::Random);

        assert_eq!(pool.primary().unwrap(), "first");
    }

    #[test]
    fn test_random_pick_stays_in_pool() {
        let values = tokens(&["a", "b", "c"]);
        let pool = TokenPool::new(values.clone(), TokenStrategy::Random);

        for _ in 0..50 {
            let picked = pool.pick().unwrap();
            assert!(values.iter().any(|v| v == picked));
        }
    }

    #[test]
    fn test_round_robin_cycles_in_order() {
        let pool = TokenPool::new(tokens(&["a", "b", "c"]), TokenStrategy::RoundRobin);

        let picked: Vec<&str> = (0..5).map(|_| pool.pick().unwrap()).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("random".parse::<TokenStrategy>().unwrap(), TokenStrategy::Random);
        assert_eq!(
            "Round_Robin".parse::<TokenStrategy>().unwrap(),
            TokenStrategy::RoundRobin
        );
        assert!("lru".parse::<TokenStrategy>().is_err());
    }
}
