//! Leaderboard export in JSON, CSV, and plain-text formats.

use anyhow::{Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::results::ranking::AccountRanking;

/// Rankings ordered for display: score descending, account id ascending.
pub fn sorted_rankings(
    rankings: &BTreeMap<String, AccountRanking>,
) -> Vec<(&String, &AccountRanking)> {
    let mut sorted: Vec<_> = rankings.iter().collect();
    sorted.sort_by(|(account_a, ranking_a), (account_b, ranking_b)| {
        ranking_b
            .score
            .cmp(&ranking_a.score)
            .then_with(|| account_a.cmp(account_b))
    });
    sorted
}

/// Writes the leaderboard document: account id mapped to score and the
/// contributing memorias, pretty-printed for human readability.
pub fn write_leaderboard_json(
    rankings: &BTreeMap<String, AccountRanking>,
    path: &Path,
) -> Result<()> {
    let json =
        serde_json::to_string_pretty(rankings).context("Failed to serialize leaderboard")?;

    let mut file = File::create(path)
        .context(format!("Failed to create leaderboard file: {}", path.display()))?;
    file.write_all(json.as_bytes())
        .context("Failed to write leaderboard data")?;

    info!("Leaderboard saved to {}", path.display());
    Ok(())
}

/// Writes a tabular rendition: rank, account, total score, and the memoria
/// list in one quoted column.
pub fn write_leaderboard_csv(
    rankings: &BTreeMap<String, AccountRanking>,
    path: &Path,
) -> Result<()> {
    let mut file = File::create(path)
        .context(format!("Failed to create CSV file: {}", path.display()))?;
    writeln!(file, "Rank,Email,Total Score,Memorias").context("Failed to write CSV header")?;

    for (rank, (account_id, ranking)) in sorted_rankings(rankings).iter().enumerate() {
        let memorias = ranking
            .matching_memorias
            .iter()
            .map(|entry| format!("{} ({})", entry.name, entry.score))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            file,
            "{},{},{},\"{}\"",
            rank + 1,
            account_id,
            ranking.score,
            memorias
        )
        .context("Failed to write CSV row")?;
    }

    info!("CSV export saved to {}", path.display());
    Ok(())
}

/// Writes a plain-text leaderboard.
pub fn write_leaderboard_text(
    rankings: &BTreeMap<String, AccountRanking>,
    path: &Path,
) -> Result<()> {
    let mut file = File::create(path)
        .context(format!("Failed to create text file: {}", path.display()))?;
    writeln!(file, "MEMORIA MATCH RESULTS")?;
    writeln!(file, "====================")?;
    writeln!(file)?;

    for (rank, (account_id, ranking)) in sorted_rankings(rankings).iter().enumerate() {
        writeln!(file, "#{} - {} (Score: {})", rank + 1, account_id, ranking.score)?;
        writeln!(file, "Memorias:")?;
        for entry in &ranking.matching_memorias {
            writeln!(file, "  - {} (Value: {})", entry.name, entry.score)?;
        }
        writeln!(file)?;
    }

    info!("Text export saved to {}", path.display());
    Ok(())
}
