//! Per-account ranking aggregation.
//!
//! Collapses all stored matches for an account into a best-per-memoria
//! table, then sums the point values of the top three memorias into the
//! account's score.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::matching::matcher::MatchRecord;
use crate::results::store::ResultStore;

/// How many memorias count toward an account's score.
pub const TOP_MEMORIA_COUNT: usize = 3;

/// One memoria contributing to an account's score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoriaEntry {
    /// Memoria name
    pub name: String,
    /// The memoria's point value
    pub score: u32,
}

/// An account's aggregated standing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRanking {
    /// Sum of point values over the top memorias
    pub score: u32,
    /// Up to three memorias, ordered by (point value desc, quality desc)
    pub matching_memorias: Vec<MemoriaEntry>,
}

/// Builds the leaderboard from the result store.
///
/// `known_accounts` lists accounts discovered from screenshot filenames;
/// accounts with zero matches still appear with score 0 so they are not
/// silently dropped from the leaderboard.
pub fn aggregate(
    store: &ResultStore,
    known_accounts: &BTreeSet<String>,
) -> BTreeMap<String, AccountRanking> {
    let mut rankings: BTreeMap<String, AccountRanking> = known_accounts
        .iter()
        .map(|account| (account.clone(), AccountRanking::default()))
        .collect();

    for (account_id, results) in store.accounts() {
        // Best record per memoria, across all of the account's screenshots
        let mut best: HashMap<&str, &MatchRecord> = HashMap::new();
        for result in results {
            for record in &result.matches {
                match best.get(record.template_name.as_str()) {
                    Some(current) if current.quality_score >= record.quality_score => {}
                    _ => {
                        best.insert(record.template_name.as_str(), record);
                    }
                }
            }
        }

        let mut bests: Vec<&MatchRecord> = best.into_values().collect();
        bests.sort_by(|a, b| {
            b.point_value
                .cmp(&a.point_value)
                .then_with(|| b.quality_score.total_cmp(&a.quality_score))
                .then_with(|| a.template_name.cmp(&b.template_name))
        });

        let matching_memorias: Vec<MemoriaEntry> = bests
            .iter()
            .take(TOP_MEMORIA_COUNT)
            .map(|record| MemoriaEntry {
                name: record.template_name.clone(),
                score: record.point_value,
            })
            .collect();
        let score = matching_memorias.iter().map(|entry| entry.score).sum();

        rankings.insert(
            account_id.clone(),
            AccountRanking {
                score,
                matching_memorias,
            },
        );
    }

    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scanner::ScreenshotResult;
    use chrono::Local;

    fn record(name: &str, point_value: u32, quality_score: f32) -> MatchRecord {
        MatchRecord {
            template_name: name.to_string(),
            confidence: 0.9,
            top_left: (0, 0),
            size: (8, 8),
            position_score: 0.5,
            size_score: 0.5,
            color_similarity: 0.5,
            quality_score,
            point_value,
        }
    }

    fn screenshot_result(account: &str, path: &str, matches: Vec<MatchRecord>) -> ScreenshotResult {
        ScreenshotResult {
            account_id: account.to_string(),
            source_path: path.to_string(),
            matches,
            processed_at: Local::now(),
        }
    }

    fn store_with(results: Vec<ScreenshotResult>) -> ResultStore {
        let mut store = ResultStore::default();
        let mut map = BTreeMap::new();
        for result in results {
            map.entry(result.account_id.clone())
                .or_insert_with(Vec::new)
                .push(result);
        }
        store.merge(map);
        store
    }

    #[test]
    fn sums_top_three_point_values() {
        let store = store_with(vec![screenshot_result(
            "user@example.com",
            "shot.png",
            vec![
                record("A", 20, 0.9),
                record("B", 5, 0.8),
                record("C", 1, 0.95),
            ],
        )]);

        let rankings = aggregate(&store, &BTreeSet::new());
        let ranking = &rankings["user@example.com"];
        assert_eq!(ranking.score, 26);
        let names: Vec<&str> = ranking
            .matching_memorias
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn keeps_at_most_three_memorias() {
        let store = store_with(vec![screenshot_result(
            "user@example.com",
            "shot.png",
            vec![
                record("A", 20, 0.9),
                record("B", 10, 0.9),
                record("C", 5, 0.9),
                record("D", 3, 0.9),
            ],
        )]);

        let rankings = aggregate(&store, &BTreeSet::new());
        let ranking = &rankings["user@example.com"];
        assert_eq!(ranking.matching_memorias.len(), TOP_MEMORIA_COUNT);
        assert_eq!(ranking.score, 35);
    }

    #[test]
    fn memoria_counts_once_with_best_quality() {
        // Template A appears in two screenshots with different quality;
        // it contributes once, at its best
        let store = store_with(vec![
            screenshot_result("user@example.com", "one.png", vec![record("A", 20, 0.6)]),
            screenshot_result("user@example.com", "two.png", vec![record("A", 20, 0.9)]),
        ]);

        let rankings = aggregate(&store, &BTreeSet::new());
        let ranking = &rankings["user@example.com"];
        assert_eq!(ranking.matching_memorias.len(), 1);
        assert_eq!(ranking.score, 20);
    }

    #[test]
    fn quality_breaks_point_ties_in_top_selection() {
        // Four memorias at the same point value; the three best qualities win
        let store = store_with(vec![screenshot_result(
            "user@example.com",
            "shot.png",
            vec![
                record("low", 5, 0.5),
                record("mid", 5, 0.7),
                record("high", 5, 0.9),
                record("top", 5, 0.95),
            ],
        )]);

        let rankings = aggregate(&store, &BTreeSet::new());
        let names: Vec<&str> = rankings["user@example.com"]
            .matching_memorias
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["top", "high", "mid"]);
    }

    #[test]
    fn zero_match_known_account_appears_with_score_zero() {
        let store = store_with(vec![screenshot_result(
            "quiet@example.com",
            "shot.png",
            Vec::new(),
        )]);
        let mut known = BTreeSet::new();
        known.insert("quiet@example.com".to_string());
        known.insert("absent@example.com".to_string());

        let rankings = aggregate(&store, &known);
        assert_eq!(rankings["quiet@example.com"].score, 0);
        assert!(rankings["quiet@example.com"].matching_memorias.is_empty());
        // Known from a filename alone, no stored results at all
        assert_eq!(rankings["absent@example.com"].score, 0);
    }

    #[test]
    fn fewer_than_three_memorias_sum_what_exists() {
        let store = store_with(vec![screenshot_result(
            "user@example.com",
            "shot.png",
            vec![record("A", 20, 0.9)],
        )]);

        let rankings = aggregate(&store, &BTreeSet::new());
        assert_eq!(rankings["user@example.com"].score, 20);
        assert_eq!(rankings["user@example.com"].matching_memorias.len(), 1);
    }
}
