//! Batch scanning of the screenshot corpus.
//!
//! Walks the screenshot directory, recovers the account id from each
//! filename, matches every loaded template against each screenshot, and
//! groups the per-screenshot results by account. Screenshots already present
//! in the result store are skipped so interrupted batches can resume.

use chrono::{DateTime, Local};
use image::{GrayImage, RgbImage};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crate::config::ScoringWeights;
use crate::matching::account::account_from_filename;
use crate::matching::matcher::{MatchRecord, match_templates};
use crate::matching::templates::{Template, is_image_file};

/// A loaded screenshot tagged with its account.
#[derive(Debug)]
pub struct Screenshot {
    /// Account recovered from the filename
    pub account_id: String,
    /// Full-color pixels
    pub rgb: RgbImage,
    /// Grayscale rendition for cross-correlation
    pub gray: GrayImage,
    /// Path the screenshot was loaded from, used as the dedup key
    pub source_path: String,
}

/// All matches found in one screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotResult {
    /// Account the screenshot belongs to
    pub account_id: String,
    /// Source path; at most one result per (account, path) is ever stored
    pub source_path: String,
    /// Qualifying matches, ordered by (point_value desc, quality desc)
    pub matches: Vec<MatchRecord>,
    /// When this screenshot was processed
    pub processed_at: DateTime<Local>,
}

/// Outcome of one batch scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// New per-screenshot results grouped by account
    pub results: BTreeMap<String, Vec<ScreenshotResult>>,
    /// Every account seen in a parseable filename, matched or not
    pub known_accounts: BTreeSet<String>,
    /// Screenshots skipped because they were already processed
    pub skipped: usize,
}

/// Scans all screenshots in a directory against the loaded templates.
///
/// Paths listed in `already_processed` are skipped. Files whose names do not
/// parse to an account id, or whose pixels cannot be decoded, are logged and
/// skipped. An absent directory is reported and yields an empty outcome.
pub fn scan_screenshots(
    dir: &Path,
    templates: &BTreeMap<String, Template>,
    threshold: f32,
    weights: &ScoringWeights,
    already_processed: &HashSet<String>,
    account_filter: Option<&str>,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    if !dir.is_dir() {
        error!("Screenshots directory {} does not exist", dir.display());
        return outcome;
    }

    let mut paths: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect(),
        Err(e) => {
            error!("Failed to list screenshots directory {}: {}", dir.display(), e);
            return outcome;
        }
    };
    // Sorted for reproducible append order
    paths.sort();

    for path in paths {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!("Skipping screenshot with non-UTF-8 name: {}", path.display());
            continue;
        };

        if let Some(filter) = account_filter {
            if !file_name.contains(filter) {
                continue;
            }
        }

        let Some(account_id) = account_from_filename(file_name) else {
            warn!(
                "Skipping {}: filename does not follow <local>_at_<domain>_<timestamp>",
                file_name
            );
            continue;
        };
        // The account is known from the filename alone, even if the
        // screenshot later fails to load or yields no matches
        outcome.known_accounts.insert(account_id.clone());

        let source_path = path.display().to_string();
        if already_processed.contains(&source_path) {
            debug!("Skipping already processed screenshot: {}", file_name);
            outcome.skipped += 1;
            continue;
        }

        let img = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping unreadable screenshot {}: {}", path.display(), e);
                continue;
            }
        };
        let screenshot = Screenshot {
            account_id,
            rgb: img.to_rgb8(),
            gray: img.to_luma8(),
            source_path,
        };

        let matches = match_templates(
            &screenshot.rgb,
            &screenshot.gray,
            templates,
            threshold,
            weights,
        );
        debug!(
            "{}: {} match(es) for {}",
            file_name,
            matches.len(),
            screenshot.account_id
        );

        outcome
            .results
            .entry(screenshot.account_id.clone())
            .or_default()
            .push(ScreenshotResult {
                account_id: screenshot.account_id,
                source_path: screenshot.source_path,
                matches,
                processed_at: Local::now(),
            });
    }

    let processed: usize = outcome.results.values().map(|results| results.len()).sum();
    info!(
        "Scanned {} screenshot(s) for {} account(s), skipped {}",
        processed,
        outcome.known_accounts.len(),
        outcome.skipped
    );
    outcome
}
