use chrono::Local;
use std::path::{Path, PathBuf};

use crate::config::MatchConfig;

/// Ensures the directories that hold pipeline output exist. Call at startup.
///
/// Input directories (memorias, screenshots) are deliberately not created:
/// their absence is a reportable condition, not something to paper over with
/// an empty directory.
pub fn ensure_output_directories(config: &MatchConfig) -> std::io::Result<()> {
    for file in [&config.results_file, &config.leaderboard_file] {
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    std::fs::create_dir_all(&config.export_dir)?;
    Ok(())
}

/// Returns `<dir>/memoria_results_<YYYYMMDD>_<HHMMSS>.<extension>`.
pub fn timestamped_export_path(dir: &Path, extension: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("memoria_results_{}.{}", stamp, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_path_carries_extension() {
        let path = timestamped_export_path(Path::new("exports"), "csv");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("memoria_results_"));
        assert!(name.ends_with(".csv"));
    }
}
