use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::statement::DateOrder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Statement date ordering: "mdy", "dmy", or "ymd".
    #[serde(default = "default_date_order")]
    pub date_order: String,
    /// Description similarity at or above which a same-date/same-amount row
    /// is treated as a re-exported duplicate.
    #[serde(default = "default_duplicate_similarity")]
    pub duplicate_similarity: f64,
    /// Minimum fuzzy-match similarity for a category suggestion.
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

fn default_date_order() -> String {
    "mdy".to_string()
}

fn default_duplicate_similarity() -> f64 {
    0.9
}

fn default_suggestion_threshold() -> f64 {
    0.5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            date_order: default_date_order(),
            duplicate_similarity: default_duplicate_similarity(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

impl Settings {
    pub fn date_order(&self) -> DateOrder {
        DateOrder::from_key(&self.date_order).unwrap_or(DateOrder::MonthDayYear)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn db_path() -> PathBuf {
    PathBuf::from(&load_settings().data_dir).join("tally.db")
}
