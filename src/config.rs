//! Configuration for the matching pipeline.
//!
//! Loads settings from match_config.json in the working directory at startup.
//! Provides directories, the match threshold, scoring weights, and the
//! memoria point-value table.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "match_config.json";

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<MatchConfig> = OnceLock::new();

/// Weights applied to the four match sub-scores.
///
/// They conventionally sum to 1.0 but are not required to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight for the raw template-match confidence
    pub confidence: f32,
    /// Weight for proximity of the match to the screenshot center
    pub position: f32,
    /// Weight for the matched area relative to the screenshot area
    pub size: f32,
    /// Weight for color-histogram similarity of the matched region
    pub color: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            confidence: 0.7,
            position: 0.1,
            size: 0.1,
            color: 0.1,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Directory containing the memoria template images
    pub memoria_dir: PathBuf,
    /// Directory containing the screenshots to match against
    pub screenshots_dir: PathBuf,
    /// Raw per-screenshot match results, merged across runs
    pub results_file: PathBuf,
    /// Aggregated per-account leaderboard document
    pub leaderboard_file: PathBuf,
    /// Directory for timestamped CSV and text exports
    pub export_dir: PathBuf,
    /// Minimum match confidence for a template occurrence to count (0.0-1.0)
    pub threshold: f32,
    /// Weights for the match quality score
    pub weights: ScoringWeights,
    /// Memoria name to point value; unlisted memorias score 0 points
    pub point_values: HashMap<String, u32>,
    /// Skip screenshots already present in the results file
    pub skip_processed: bool,
    /// Only process screenshots whose filename contains this substring
    pub account_filter: Option<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            memoria_dir: PathBuf::from("memorias"),
            screenshots_dir: PathBuf::from("screenshots"),
            results_file: PathBuf::from("match_results.json"),
            leaderboard_file: PathBuf::from("memoria_match_results.json"),
            export_dir: PathBuf::from("exports"),
            threshold: 0.7,
            weights: ScoringWeights::default(),
            point_values: HashMap::new(),
            skip_processed: true,
            account_filter: None,
        }
    }
}

/// Loads configuration from match_config.json or returns defaults.
fn load_config() -> MatchConfig {
    let config_path = Path::new(CONFIG_FILE);

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!("Config loaded from {}", CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", CONFIG_FILE, e);
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}. Using defaults.", CONFIG_FILE, e);
            }
        }
    } else {
        info!("{} not found. Using default config.", CONFIG_FILE);
    }

    MatchConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static MatchConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}
