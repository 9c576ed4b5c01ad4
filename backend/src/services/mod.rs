pub mod contribution_aggregation;
pub mod error;
pub mod graphql;
pub mod language_stats;
pub mod platforms;
pub mod submission_streaks;
