// 🌐 Fetch Collaborators
// Date → raw booking-grid markup (live HTTP, or saved pages for offline runs)

use crate::config::FacilityConfig;
use crate::error::{Result, ScheduleError};
use crate::schedule::format_date;
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use std::time::Duration;

/// Fetch the grid markup of one date
pub trait ScheduleFetcher: Send + Sync {
    fn fetch(&self, date: NaiveDate) -> Result<String>;
}

// ============================================================================
// HTTP
// ============================================================================

/// GET on the scheduling endpoint with day/month/year query params
///
/// Requests time out after the configured number of seconds and are never retried.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    endpoint: String,
    extra_query: Vec<(String, String)>,
}

impl HttpFetcher {
    pub fn new(config: &FacilityConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("court-slots/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpFetcher {
            client,
            endpoint: config.endpoint.clone(),
            extra_query: config.extra_query.clone(),
        })
    }

    /// Query string for one date, widget parameters after the date
    pub fn query(&self, date: NaiveDate) -> Vec<(String, String)> {
        let mut query = vec![
            ("day".to_string(), date.day().to_string()),
            ("month".to_string(), date.month().to_string()),
            ("year".to_string(), date.year().to_string()),
        ];
        query.extend(self.extra_query.iter().cloned());
        query
    }
}

impl ScheduleFetcher for HttpFetcher {
    fn fetch(&self, date: NaiveDate) -> Result<String> {
        let fail = |message: String| ScheduleError::Fetch { date, message };

        log::info!("fetching schedule for {}", format_date(date));
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(date))
            .send()
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {} from {}", status, self.endpoint)));
        }

        response.text().map_err(|e| fail(format!("failed to read body: {}", e)))
    }
}

// ============================================================================
// SAVED PAGES
// ============================================================================

/// Reads `<dir>/DD-MM-YYYY.html`, one saved widget response per date
pub struct DirectoryFetcher {
    dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryFetcher { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.html", format_date(date)))
    }
}

impl ScheduleFetcher for DirectoryFetcher {
    fn fetch(&self, date: NaiveDate) -> Result<String> {
        let path = self.path_for(date);
        log::debug!("reading saved schedule {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| ScheduleError::Fetch {
            date,
            message: format!("{}: {}", path.display(), e),
        })
    }
}
