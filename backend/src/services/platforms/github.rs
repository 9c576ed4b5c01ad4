use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::services::error::{Result, StatsError};
use crate::services::graphql::{run_query, string_literal, GraphQlExecutor};
use crate::utils::token_pool::TokenPool;

const REPOSITORY_PAGE_SIZE: usize = 100;

/// Used when the account creation year cannot be read from the response
const FALLBACK_CREATED_YEAR: i32 = 2005;

/// Basic GitHub profile
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: Option<String>,
    pub login: String,
    pub bio: Option<String>,
    pub avatar_url: String,
    pub created_at: String,
}

/// One language of a repository and the bytes written in it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LanguageEdge {
    pub name: String,
    pub size: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    pub created_at: String,
    pub last_commit_date: Option<String>,
    pub languages: Vec<LanguageEdge>,
}

/// Which repositories a paginated listing includes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepositoryFilter {
    /// Public repositories, most recently updated first
    Public,
    /// Every repository that is not a fork
    NonFork,
}

impl RepositoryFilter {
    fn arguments(&self) -> &'static str {
        match self {
            RepositoryFilter::Public => {
                ", privacy: PUBLIC, orderBy: {field: UPDATED_AT, direction: DESC}"
            }
            RepositoryFilter::NonFork => ", isFork: false",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub contribution_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    #[serde(default)]
    pub total_contributions: u64,
    pub weeks: Vec<ContributionWeek>,
}

impl ContributionCalendar {
    /// Days in week-then-day order
    pub fn days(&self) -> impl Iterator<Item = &ContributionDay> {
        self.weeks.iter().flat_map(|week| week.contribution_days.iter())
    }
}

/// Contribution calendar of one user for one calendar year
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionYear {
    pub created_at: Option<String>,
    pub contribution_calendar: ContributionCalendar,
    pub restricted_contributions_count: u64,
}

pub struct GitHubClient {
    executor: Arc<dyn GraphQlExecutor>,
    tokens: TokenPool,
    max_repository_pages: usize,
}

impl GitHubClient {
    pub fn new(
        executor: Arc<dyn GraphQlExecutor>,
        tokens: TokenPool,
        max_repository_pages: usize,
    ) -> Self {
        Self {
            executor,
            tokens,
            max_repository_pages,
        }
    }

    pub fn tokens(&self) -> &TokenPool {
        &self.tokens
    }

    /// Fetch the basic profile of `username` using the primary token
    pub async fn fetch_user_info(&self, username: &str) -> Result<UserInfo> {
        let token = self.tokens.primary()?;
        let query = build_user_query(username);

        let data: UserInfoData = run_query(self.executor.as_ref(), &query, Some(token)).await?;

        data.user
            .ok_or_else(|| StatsError::NoDataFound("user not found".to_string()))
    }

    /// Follow the repository cursor until the last page, concatenating pages in order
    pub async fn fetch_all_repositories(
        &self,
        username: &str,
        token: &str,
        filter: RepositoryFilter,
    ) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            if pages >= self.max_repository_pages {
                return Err(StatsError::PaginationLimitExceeded {
                    max_pages: self.max_repository_pages,
                });
            }

            let query = build_repository_query(username, cursor.as_deref(), filter);
            let data: RepositoriesData =
                run_query(self.executor.as_ref(), &query, Some(token)).await?;
            pages += 1;

            let connection = data
                .user
                .ok_or_else(|| StatsError::NoDataFound("user not found".to_string()))?
                .repositories;

            log::info!(
                "📦 Fetched {} repositories for {} (page {})",
                connection.nodes.len(),
                username,
                pages
            );

            repositories.extend(connection.nodes.into_iter().map(Repository::from));

            if !connection.page_info.has_next_page {
                break;
            }

            match connection.page_info.end_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    log::warn!(
                        "GitHub reported another repository page for {} without a cursor",
                        username
                    );
                    return Err(StatsError::UpstreamDecode(
                        "hasNextPage is true but endCursor is missing".to_string(),
                    ));
                }
            }
        }

        Ok(repositories)
    }

    /// Contribution calendars from `starting_year` (or the account creation year, whichever
    /// is later) up to and including `current_year`
    pub async fn fetch_contribution_years(
        &self,
        username: &str,
        starting_year: i32,
        current_year: i32,
    ) -> Result<BTreeMap<i32, ContributionYear>> {
        let mut years = BTreeMap::new();

        let current = self.fetch_contribution_year(username, current_year).await?;
        let created_year = current
            .created_at
            .as_deref()
            .and_then(parse_year)
            .unwrap_or(FALLBACK_CREATED_YEAR);
        years.insert(current_year, current);

        for year in starting_year.max(created_year)..current_year {
            let calendar = self.fetch_contribution_year(username, year).await?;
            years.insert(year, calendar);
        }

        log::info!(
            "📊 Fetched contribution calendars for {} across {} years",
            username,
            years.len()
        );

        Ok(years)
    }

    async fn fetch_contribution_year(&self, username: &str, year: i32) -> Result<ContributionYear> {
        let token = self.tokens.pick()?;
        let query = build_contribution_query(username, year);

        let data: ContributionsData =
            run_query(self.executor.as_ref(), &query, Some(token)).await?;
        let user = data
            .user
            .ok_or_else(|| StatsError::NoDataFound("user not found".to_string()))?;

        Ok(ContributionYear {
            created_at: user.created_at,
            contribution_calendar: user.contributions_collection.contribution_calendar,
            restricted_contributions_count: user
                .contributions_collection
                .restricted_contributions_count,
        })
    }
}

fn parse_year(created_at: &str) -> Option<i32> {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.year())
        .ok()
        .or_else(|| created_at.split('-').next()?.parse().ok())
}

pub fn build_user_query(username: &str) -> String {
    format!(
        r#"
        {{
            user(login: {}) {{
                name
                login
                bio
                avatarUrl
                createdAt
            }}
        }}
        "#,
        string_literal(username)
    )
}

pub fn build_repository_query(
    username: &str,
    cursor: Option<&str>,
    filter: RepositoryFilter,
) -> String {
    let after = cursor
        .map(|c| format!(", after: {}", string_literal(c)))
        .unwrap_or_default();

    format!(
        r#"
        {{
            user(login: {}) {{
                repositories(first: {}{}{}) {{
                    pageInfo {{
                        hasNextPage
                        endCursor
                    }}
                    nodes {{
                        name
                        createdAt
                        defaultBranchRef {{
                            target {{
                                ... on Commit {{
                                    committedDate
                                }}
                            }}
                        }}
                        languages(first: 100) {{
                            edges {{
                                size
                                node {{
                                    name
                                }}
                            }}
                        }}
                    }}
                }}
            }}
        }}
        "#,
        string_literal(username),
        REPOSITORY_PAGE_SIZE,
        filter.arguments(),
        after
    )
}

pub fn build_contribution_query(username: &str, year: i32) -> String {
    let from = format!("{}-01-01T00:00:00Z", year);
    let to = format!("{}-12-31T23:59:59Z", year);

    format!(
        r#"
        query {{
            user(login: {}) {{
                createdAt
                contributionsCollection(from: "{}", to: "{}") {{
                    contributionCalendar {{
                        totalContributions
                        weeks {{
                            contributionDays {{
                                contributionCount
                                date
                            }}
                        }}
                    }}
                    restrictedContributionsCount
                }}
            }}
        }}
        "#,
        string_literal(username),
        from,
        to
    )
}

// GitHub GraphQL response types

#[derive(Debug, Deserialize)]
struct UserInfoData {
    user: Option<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct RepositoriesData {
    user: Option<RepositoriesUser>,
}

#[derive(Debug, Deserialize)]
struct RepositoriesUser {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: String,
    created_at: String,
    default_branch_ref: Option<DefaultBranchRef>,
    languages: Option<LanguageConnection>,
}

#[derive(Debug, Deserialize)]
struct DefaultBranchRef {
    target: Option<CommitTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitTarget {
    committed_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageConnection {
    #[serde(default)]
    edges: Vec<LanguageEdgeNode>,
}

#[derive(Debug, Deserialize)]
struct LanguageEdgeNode {
    size: u64,
    node: LanguageNode,
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    name: String,
}

impl From<RepositoryNode> for Repository {
    fn from(node: RepositoryNode) -> Self {
        Repository {
            name: node.name,
            created_at: node.created_at,
            last_commit_date: node
                .default_branch_ref
                .and_then(|r| r.target)
                .and_then(|t| t.committed_date),
            languages: node
                .languages
                .map(|l| l.edges)
                .unwrap_or_default()
                .into_iter()
                .map(|edge| LanguageEdge {
                    name: edge.node.name,
                    size: edge.size,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContributionsData {
    user: Option<ContributionsUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsUser {
    created_at: Option<String>,
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
    #[serde(default)]
    restricted_contributions_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    use crate::utils::token_pool::TokenStrategy;

    /// Replays canned `data` payloads in order and records every query it saw
    struct ScriptedExecutor {
        responses: Mutex<Vec<Result<Value>>>,
        queries: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedExecutor {
        fn new(responses: Vec<Result<Value>>) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<(String, Option<String>)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GraphQlExecutor for ScriptedExecutor {
        async fn execute(&self, query: &str, token: Option<&str>) -> Result<Value> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), token.map(str::to_string)));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(StatsError::NoDataFound("script exhausted".to_string())))
        }
    }

    fn client(executor: Arc<ScriptedExecutor>, max_pages: usize) -> GitHubClient {
        let tokens = TokenPool::new(vec!["t1".to_string()], TokenStrategy::RoundRobin);
        GitHubClient::new(executor, tokens, max_pages)
    }

    fn repo_page(names: &[&str], next: Option<&str>) -> Result<Value> {
        let nodes: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "createdAt": "2020-01-01T00:00:00Z",
                    "defaultBranchRef": null,
                    "languages": { "edges": [ { "size": 10, "node": { "name": "Rust" } } ] }
                })
            })
            .collect();

        Ok(json!({
            "user": {
                "repositories": {
                    "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next },
                    "nodes": nodes
                }
            }
        }))
    }

    fn contribution_year(created_at: &str, date: &str, count: u32) -> Result<Value> {
        Ok(json!({
            "user": {
                "createdAt": created_at,
                "contributionsCollection": {
                    "contributionCalendar": {
                        "totalContributions": count,
                        "weeks": [ { "contributionDays": [ { "date": date, "contributionCount": count } ] } ]
                    },
                    "restrictedContributionsCount": 0
                }
            }
        }))
    }

    #[tokio::test]
    async fn test_pagination_concatenates_pages_in_order() {
        let executor = ScriptedExecutor::new(vec![
            repo_page(&["a", "b"], Some("cursor-1")),
            repo_page(&["c"], None),
        ]);
        let github = client(executor.clone(), 10);

        let repos = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::NonFork)
            .await
            .unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let queries = executor.queries();
        assert_eq!(queries.len(), 2);
        assert!(!queries[0].0.contains("after:"));
        assert!(queries[1].0.contains(r#"after: "cursor-1""#));
        assert!(queries[1].0.contains("isFork: false"));
        assert_eq!(queries[0].1.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_pagination_error_discards_earlier_pages() {
        let executor = ScriptedExecutor::new(vec![
            repo_page(&["a"], Some("cursor-1")),
            Err(StatsError::UpstreamStatus { code: 502 }),
        ]);
        let github = client(executor, 10);

        let result = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::Public)
            .await;

        assert!(matches!(result, Err(StatsError::UpstreamStatus { code: 502 })));
    }

    #[tokio::test]
    async fn test_pagination_stops_at_page_limit() {
        let executor = ScriptedExecutor::new(vec![
            repo_page(&["a"], Some("c1")),
            repo_page(&["b"], Some("c2")),
            repo_page(&["c"], Some("c3")),
        ]);
        let github = client(executor.clone(), 2);

        let result = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::Public)
            .await;

        assert!(matches!(
            result,
            Err(StatsError::PaginationLimitExceeded { max_pages: 2 })
        ));
        assert_eq!(executor.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_node_without_languages_or_branch() {
        let page = Ok(json!({
            "user": {
                "repositories": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": [ { "name": "solo", "createdAt": "2020-01-01T00:00:00Z" } ]
                }
            }
        }));
        let executor = ScriptedExecutor::new(vec![page]);
        let github = client(executor, 10);

        let repos = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::Public)
            .await
            .unwrap();

        assert_eq!(repos.len(), 1);
        assert!(repos[0].languages.is_empty());
        assert!(repos[0].last_commit_date.is_none());
    }

    #[tokio::test]
    async fn test_next_page_without_cursor_is_an_error() {
        let executor = ScriptedExecutor::new(vec![
            repo_page(&["a"], Some("cursor-1")),
            Ok(json!({
                "user": {
                    "repositories": {
                        "pageInfo": { "hasNextPage": true, "endCursor": null },
                        "nodes": [ { "name": "b", "createdAt": "2020-01-01T00:00:00Z" } ]
                    }
                }
            })),
        ]);
        let github = client(executor.clone(), 10);

        let result = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::Public)
            .await;

        assert!(matches!(result, Err(StatsError::UpstreamDecode(_))));
        assert_eq!(executor.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_repository_node_conversion() {
        let page = Ok(json!({
            "user": {
                "repositories": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": [ {
                        "name": "hello",
                        "createdAt": "2021-05-01T00:00:00Z",
                        "defaultBranchRef": { "target": { "committedDate": "2024-02-02T10:00:00Z" } },
                        "languages": { "edges": [
                            { "size": 300, "node": { "name": "Go" } },
                            { "size": 20, "node": { "name": "Shell" } }
                        ] }
                    } ]
                }
            }
        }));
        let github = client(ScriptedExecutor::new(vec![page]), 10);

        let repos = github
            .fetch_all_repositories("octocat", "t1", RepositoryFilter::Public)
            .await
            .unwrap();

        assert_eq!(repos[0].last_commit_date.as_deref(), Some("2024-02-02T10:00:00Z"));
        assert_eq!(
            repos[0].languages,
            vec![
                LanguageEdge { name: "Go".to_string(), size: 300 },
                LanguageEdge { name: "Shell".to_string(), size: 20 },
            ]
        );
    }

    #[tokio::test]
    async fn test_contribution_years_start_at_creation_year() {
        let executor = ScriptedExecutor::new(vec![
            contribution_year("2022-03-04T05:06:07Z", "2024-01-01", 3),
            contribution_year("2022-03-04T05:06:07Z", "2022-06-01", 1),
            contribution_year("2022-03-04T05:06:07Z", "2023-06-01", 2),
        ]);
        let github = client(executor.clone(), 10);

        let years = github
            .fetch_contribution_years("octocat", 2015, 2024)
            .await
            .unwrap();

        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2022, 2023, 2024]);

        let queries = executor.queries();
        assert!(queries[0].0.contains(r#"from: "2024-01-01T00:00:00Z""#));
        assert!(queries[1].0.contains(r#"to: "2022-12-31T23:59:59Z""#));
        assert!(queries[2].0.contains(r#"from: "2023-01-01T00:00:00Z""#));
    }

    #[tokio::test]
    async fn test_contribution_years_respect_starting_year() {
        let executor = ScriptedExecutor::new(vec![
            contribution_year("2010-01-01T00:00:00Z", "2017-01-01", 1),
            contribution_year("2010-01-01T00:00:00Z", "2015-01-01", 1),
            contribution_year("2010-01-01T00:00:00Z", "2016-01-01", 1),
        ]);
        let github = client(executor.clone(), 10);

        let years = github
            .fetch_contribution_years("octocat", 2015, 2017)
            .await
            .unwrap();

        assert_eq!(years.len(), 3);
        assert_eq!(executor.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_user_info_requires_token() {
        let executor = ScriptedExecutor::new(vec![]);
        let github = GitHubClient::new(
            executor.clone(),
            TokenPool::new(vec![], TokenStrategy::Random),
            10,
        );

        let result = github.fetch_user_info("octocat").await;

        assert!(matches!(result, Err(StatsError::MissingToken)));
        assert!(executor.queries().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_is_no_data() {
        let executor = ScriptedExecutor::new(vec![Ok(json!({ "user": null }))]);
        let github = client(executor, 10);

        let result = github.fetch_user_info("nobody").await;

        assert!(matches!(result, Err(StatsError::NoDataFound(_))));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2014-05-01T12:00:00Z"), Some(2014));
        assert_eq!(parse_year("2019-01-01"), Some(2019));
        assert_eq!(parse_year("garbage"), None);
    }

    #[test]
    fn test_query_escapes_username() {
        let query = build_user_query(r#"evil") { x"#);
        assert!(query.contains(r#"user(login: "evil\") { x")"#));
    }
}
