//! Memoria Match
//!
//! Scores emulator screenshots against a library of memoria reference
//! images and ranks the email-identified accounts behind them. Screenshots
//! are produced by an external capture tool that names each file after the
//! window's email title plus a timestamp; this program consumes that corpus,
//! finds memoria occurrences with normalized cross-correlation, and ranks
//! each account by the summed point values of its top three memorias.

mod config;
mod matching;
mod paths;
mod results;

use anyhow::Result;
use log::{error, info};
use std::collections::HashSet;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    config::init_config();
    let config = config::get_config();
    paths::ensure_output_directories(config)?;

    // Load the memoria library; nothing to do without it
    let templates = match matching::load_templates(&config.memoria_dir, &config.point_values) {
        Ok(templates) => templates,
        Err(e) => {
            error!("{:#}", e);
            return Ok(());
        }
    };
    if templates.is_empty() {
        error!(
            "No memoria templates in {}; nothing to match",
            config.memoria_dir.display()
        );
        return Ok(());
    }

    // Resume from previous runs: already-recorded screenshots are skipped
    let mut store = results::ResultStore::load(&config.results_file);
    let already_processed = if config.skip_processed {
        let processed = store.already_processed();
        if !processed.is_empty() {
            info!("Found {} already processed screenshot(s)", processed.len());
        }
        processed
    } else {
        HashSet::new()
    };

    let outcome = matching::scan_screenshots(
        &config.screenshots_dir,
        &templates,
        config.threshold,
        &config.weights,
        &already_processed,
        config.account_filter.as_deref(),
    );

    let appended = store.merge(outcome.results);
    store.save(&config.results_file)?;
    info!(
        "Recorded {} new screenshot result(s) in {}",
        appended,
        config.results_file.display()
    );

    // Re-aggregate the full store, not just this run's additions
    let rankings = results::aggregate(&store, &outcome.known_accounts);
    results::write_leaderboard_json(&rankings, &config.leaderboard_file)?;
    results::write_leaderboard_csv(
        &rankings,
        &paths::timestamped_export_path(&config.export_dir, "csv"),
    )?;
    results::write_leaderboard_text(
        &rankings,
        &paths::timestamped_export_path(&config.export_dir, "txt"),
    )?;

    print_leaderboard(&rankings);
    Ok(())
}

/// Prints the final standings to stdout.
fn print_leaderboard(rankings: &std::collections::BTreeMap<String, results::AccountRanking>) {
    if rankings.is_empty() {
        println!("No accounts found.");
        return;
    }

    println!("Leaderboard ({} accounts):", rankings.len());
    for (rank, (account_id, ranking)) in results::sorted_rankings(rankings).iter().enumerate() {
        let memorias = ranking
            .matching_memorias
            .iter()
            .map(|entry| format!("{} ({})", entry.name, entry.score))
            .collect::<Vec<_>>()
            .join(", ");
        println!("#{} {} - {} [{}]", rank + 1, account_id, ranking.score, memorias);
    }
}
