//! Persistent store for raw per-screenshot match results.
//!
//! The store is a JSON document keyed by account id, each holding the list
//! of per-screenshot results accumulated across runs. Merging is keyed by
//! source path so re-running a scan never duplicates or overwrites records.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::matching::scanner::ScreenshotResult;

/// All match results recorded so far, keyed by account id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultStore {
    accounts: BTreeMap<String, Vec<ScreenshotResult>>,
}

impl ResultStore {
    /// Loads the store from disk.
    ///
    /// A missing file yields an empty store. A file that cannot be parsed
    /// (e.g. a partially written previous run) is treated as empty rather
    /// than fatal.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No results file at {}, starting fresh", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(store) => {
                    info!(
                        "Loaded results for {} account(s) from {}",
                        store.accounts.len(),
                        path.display()
                    );
                    store
                }
                Err(e) => {
                    warn!(
                        "Results file {} is corrupt ({}); starting from an empty store",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read results file {} ({}); starting from an empty store",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Merges new scan results into the store.
    ///
    /// For each account, a new record is appended only if no existing record
    /// shares its source path; existing records are never overwritten or
    /// removed. Returns the number of records appended.
    pub fn merge(&mut self, new: BTreeMap<String, Vec<ScreenshotResult>>) -> usize {
        let mut appended = 0;
        for (account_id, results) in new {
            let entry = self.accounts.entry(account_id).or_default();
            let mut seen: HashSet<String> =
                entry.iter().map(|r| r.source_path.clone()).collect();
            for result in results {
                if seen.insert(result.source_path.clone()) {
                    entry.push(result);
                    appended += 1;
                }
            }
        }
        appended
    }

    /// Every source path present in the store, across all accounts.
    ///
    /// The batch scanner uses this set to skip rework.
    pub fn already_processed(&self) -> HashSet<String> {
        self.accounts
            .values()
            .flatten()
            .map(|result| result.source_path.clone())
            .collect()
    }

    /// Writes the store as pretty-printed JSON.
    ///
    /// The document is written to a temporary file in the same directory and
    /// moved into place, so a crash mid-write leaves the previous store
    /// intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize results")?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)
            .context(format!("Failed to create temp file in {}", dir.display()))?;
        file.write_all(json.as_bytes())
            .context("Failed to write results data")?;
        file.persist(path)
            .map_err(|e| anyhow!("Failed to move results into {}: {}", path.display(), e))?;
        Ok(())
    }

    /// Results grouped by account id.
    pub fn accounts(&self) -> &BTreeMap<String, Vec<ScreenshotResult>> {
        &self.accounts
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
