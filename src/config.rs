// ⚙️ Facility Configuration
// Defaults describe the beach-club booking widget; a TOML file can override any field

use crate::schedule::{CourtStatus, FacilityGrid};
use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// STATUS VOCABULARY
// ============================================================================

/// Maps the widget's locale-specific status text onto `CourtStatus`
///
/// Anything that is neither a free nor a closed label counts as booked
/// (the widget shows reservation names there).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusVocabulary {
    pub free: Vec<String>,
    pub closed: Vec<String>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        StatusVocabulary {
            free: vec!["Volno".to_string(), "Free".to_string()],
            closed: vec!["Zavřeno".to_string(), "Closed".to_string()],
        }
    }
}

impl StatusVocabulary {
    pub fn classify(&self, text: &str) -> CourtStatus {
        let text = text.trim().to_lowercase();
        let listed = |labels: &Vec<String>| labels.iter().any(|l| l.to_lowercase() == text);

        if listed(&self.free) {
            CourtStatus::Free
        } else if listed(&self.closed) {
            CourtStatus::Closed
        } else {
            CourtStatus::Booked
        }
    }
}

// ============================================================================
// FACILITY CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Scheduling endpoint (date is appended as day/month/year query params)
    pub endpoint: String,

    /// Fixed query parameters the widget expects on every request
    pub extra_query: Vec<(String, String)>,

    /// Request timeout in seconds (no automatic retries)
    pub timeout_secs: u64,

    /// Grid cell size in minutes
    pub step_minutes: u32,

    /// Closing boundary, "HH:MM"; that cell is never bookable
    pub closing_time: String,

    /// CSS selector for the labelled cells
    pub cell_selector: String,

    /// Leading selected elements that are not grid cells (legend tooltip)
    pub header_cells: usize,

    pub status: StatusVocabulary,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        let extra = [
            ("id_sport", "1"),
            ("default_view", "day"),
            ("reset_date", "0"),
            ("event", "changeWeek"),
            ("id_infotab", "0"),
            ("time", ""),
            ("filterId", "false"),
            ("filterChecked", "false"),
            ("tab_type", "normal"),
            ("numberOfDays", "0"),
            ("display_type", "undefined"),
            ("labels", "undefined"),
            ("lastTimestamp", "undefined"),
        ];

        FacilityConfig {
            endpoint: "https://beachklub.isportsystem.cz/ajax/ajax.schema.php".to_string(),
            extra_query: extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timeout_secs: 15,
            step_minutes: 30,
            closing_time: "22:00".to_string(),
            cell_selector: "div.tooltip, td.tooltip, a.tooltip".to_string(),
            header_cells: 1,
            status: StatusVocabulary::default(),
        }
    }
}

impl FacilityConfig {
    /// Load from a TOML file; missing fields fall back to the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FacilityConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        log::debug!("loaded facility config from {}", path.display());
        Ok(config)
    }

    /// Default config, or the file at `path` when given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_minutes == 0 || 24 * 60 % self.step_minutes != 0 {
            anyhow::bail!("step_minutes must evenly divide a day, got {}", self.step_minutes);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        let grid = self.grid()?;
        if !grid.is_aligned(grid.closing_time) {
            anyhow::bail!("closing_time {} is not on the {}-minute grid", self.closing_time, self.step_minutes);
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<FacilityGrid> {
        let closing_time = NaiveTime::parse_from_str(&self.closing_time, "%H:%M")
            .with_context(|| format!("Invalid closing_time '{}', expected HH:MM", self.closing_time))?;
        Ok(FacilityGrid {
            step_minutes: self.step_minutes,
            closing_time,
        })
    }
}
