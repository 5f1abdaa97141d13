use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Overrides the preference file location.
pub const CONFIG_ENV: &str = "TABULA_CONFIG";

// ---------------------------------------------------------------------------
// Chart kinds (persisted as the preferred chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Scatter,
    Line,
    Bar,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
    ];

    /// Histograms only use the x column.
    pub fn needs_y(self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Histogram => "Histogram",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// AppConfig – user preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of the last imported/exported file.
    pub last_directory: Option<PathBuf>,
    pub preferred_chart: ChartKind,
    /// Maximum undo depth. `None` keeps every snapshot.
    pub history_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_directory: None,
            preferred_chart: ChartKind::Scatter,
            history_limit: None,
        }
    }
}

impl AppConfig {
    /// `$TABULA_CONFIG`, else `<platform config dir>/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(p));
        }
        directories::ProjectDirs::from("org", "tabula", "tabula")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring preferences: {e:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Remember the directory containing `file`.
    pub fn remember_file(&mut self, file: &Path) {
        if let Some(parent) = file.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.preferred_chart, ChartKind::Scatter);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig {
            preferred_chart: ChartKind::Histogram,
            history_limit: Some(20),
            ..AppConfig::default()
        };
        config.remember_file(&dir.path().join("data.csv"));

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn corrupt_or_partial_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::write(&path, r#"{"preferred_chart": "bar"}"#).unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.preferred_chart, ChartKind::Bar);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn chart_kind_labels() {
        assert_eq!(ChartKind::Line.to_string(), "Line Chart");
        assert!(!ChartKind::Histogram.needs_y());
        assert!(ChartKind::Bar.needs_y());
    }
}
