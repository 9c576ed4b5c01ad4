use serde::Serialize;
use std::collections::HashMap;

use super::error::{Result, StatsError};
use super::platforms::github::Repository;

/// Languages that never count towards code statistics
const EXCLUDED_LANGUAGES: &[&str] = &["Jupyter Notebook"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LanguagePercentage {
    pub name: String,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LanguageBreakdown {
    pub languages: Vec<LanguagePercentage>,
    pub total_bytes: u64,
}

/// Byte-weighted share of every language across `repos`, largest first.
/// Equal shares are ordered by language name.
pub fn calculate_language_percentages(repos: &[Repository]) -> Result<LanguageBreakdown> {
    let mut language_bytes: HashMap<&str, u64> = HashMap::new();
    let mut total_bytes: u64 = 0;

    for repo in repos {
        for edge in &repo.languages {
            if EXCLUDED_LANGUAGES.contains(&edge.name.as_str()) {
                continue;
            }
            *language_bytes.entry(edge.name.as_str()).or_insert(0) += edge.size;
            total_bytes += edge.size;
        }
    }

    if total_bytes == 0 {
        return Err(StatsError::NoLanguageData);
    }

    let mut languages: Vec<LanguagePercentage> = language_bytes
        .into_iter()
        .map(|(name, bytes)| LanguagePercentage {
            name: name.to_string(),
            percentage: bytes as f64 / total_bytes as f64 * 100.0,
        })
        .collect();

    languages.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(LanguageBreakdown {
        languages,
        total_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::platforms::github::LanguageEdge;

    fn repo(languages: &[(&str, u64)]) -> Repository {
        Repository {
            name: "repo".to_string(),
            created_at: "2020-01-01T00:00:00Z".to_string(),
            last_commit_date: None,
            languages: languages
                .iter()
                .map(|(name, size)| LanguageEdge {
                    name: name.to_string(),
                    size: *size,
                })
                .collect(),
        }
    }

    #[test]
    fn test_only_excluded_languages_is_error() {
        let repos = vec![
            repo(&[("Jupyter Notebook", 1000)]),
            repo(&[("Jupyter Notebook", 5)]),
        ];

        assert!(matches!(
            calculate_language_percentages(&repos),
            Err(StatsError::NoLanguageData)
        ));
    }

    #[test]
    fn test_no_repositories_is_error() {
        assert!(matches!(
            calculate_language_percentages(&[]),
            Err(StatsError::NoLanguageData)
        ));
    }

    #[test]
    fn test_zero_sized_languages_is_error() {
        let repos = vec![repo(&[("Rust", 0)])];

        assert!(calculate_language_percentages(&repos).is_err());
    }

    #[test]
    fn test_percentages_sum_to_one_hundred() {
        let repos = vec![
            repo(&[("Rust", 7331), ("Python", 113), ("Jupyter Notebook", 99999)]),
            repo(&[("Go", 4241), ("Rust", 17)]),
            repo(&[("C", 1), ("Shell", 77)]),
        ];

        let breakdown = calculate_language_percentages(&repos).unwrap();
        let sum: f64 = breakdown.languages.iter().map(|l| l.percentage).sum();

        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(breakdown.total_bytes, 7331 + 113 + 4241 + 17 + 1 + 77);
        assert!(breakdown.languages.iter().all(|l| l.name != "Jupyter Notebook"));
    }

    #[test]
    fn test_sorted_descending_across_repositories() {
        let repos = vec![
            repo(&[("Python", 100), ("Rust", 300)]),
            repo(&[("Python", 100), ("Go", 500)]),
        ];

        let breakdown = calculate_language_percentages(&repos).unwrap();
        let names: Vec<&str> = breakdown.languages.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names, vec!["Go", "Rust", "Python"]);
        assert!((breakdown.languages[0].percentage - 50.0).abs() < 1e-9);
        assert!((breakdown.languages[2].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_percentages_ordered_by_name() {
        let repos = vec![repo(&[("Zig", 10), ("C", 10), ("Lua", 10)])];

        let breakdown = calculate_language_percentages(&repos).unwrap();
        let names: Vec<&str> = breakdown.languages.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names, vec!["C", "Lua", "Zig"]);
    }

    #[test]
    fn test_language_names_are_case_sensitive() {
        let repos = vec![repo(&[("rust", 50), ("Rust", 50)])];

        let breakdown = calculate_language_percentages(&repos).unwrap();

        assert_eq!(breakdown.languages.len(), 2);
    }
}
