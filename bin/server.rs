// Court Slots - Web Server
// REST API over the slot pipeline with Axum

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use court_slots::{
    live_aggregator, offline_aggregator, report_json, DateRange, FacilityConfig, Period,
    ScheduleError, SlotDuration,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<FacilityConfig>,
    /// Serve saved pages instead of hitting the widget
    pages_dir: Option<PathBuf>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Query string of GET /api/slots
#[derive(Debug, Deserialize)]
struct SlotsQuery {
    period: Option<String>,
    from: Option<String>,
    to: Option<String>,
    /// Comma-separated minutes, e.g. "60,90"
    durations: Option<String>,
}

impl SlotsQuery {
    fn range(&self, today: chrono::NaiveDate) -> Result<DateRange, ScheduleError> {
        match &self.period {
            Some(p) => Ok(p.parse::<Period>()?.range(today)),
            None => DateRange::parse(self.from.as_deref(), self.to.as_deref(), today),
        }
    }

    fn durations(&self) -> Result<Vec<i64>, ScheduleError> {
        let raw = self.durations.as_deref().unwrap_or("60");
        let minutes = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| ScheduleError::InvalidDuration(format!("'{}' is not a number of minutes", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        SlotDuration::parse_set(&minutes)?;
        Ok(minutes)
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/slots - Bookable slots for a period or explicit range
async fn get_slots(State(state): State<AppState>, Query(query): Query<SlotsQuery>) -> impl IntoResponse {
    let today = chrono::Local::now().date_naive();

    // Malformed requests are rejected before any fetch
    let (range, durations) = match query.range(today).and_then(|r| Ok((r, query.durations()?))) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::<serde_json::Value>::err(e.to_string())))
                .into_response()
        }
    };

    // The pipeline is blocking (reqwest::blocking), keep it off the async workers
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<serde_json::Value> {
        let aggregator = match &state.pages_dir {
            Some(dir) => offline_aggregator(&state.config, dir)?,
            None => live_aggregator(&state.config)?,
        };
        let report = aggregator.run(&range, &durations)?;
        Ok(report_json(&report))
    })
    .await;

    match result {
        Ok(Ok(report)) => (StatusCode::OK, Json(ApiResponse::ok(report))).into_response(),
        Ok(Err(e)) => {
            log::error!("Error computing slots: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::<serde_json::Value>::err(e.to_string())))
                .into_response()
        }
        Err(e) => {
            log::error!("Slot worker panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<serde_json::Value>::err("internal error".to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Court Slots - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config_path = std::env::var_os("COURT_SLOTS_CONFIG").map(PathBuf::from);
    let config = FacilityConfig::load_or_default(config_path.as_deref())?;
    println!("✓ Facility endpoint: {}", config.endpoint);

    let pages_dir = std::env::var_os("COURT_SLOTS_PAGES").map(PathBuf::from);
    if let Some(dir) = &pages_dir {
        println!("✓ Serving saved pages from {}", dir.display());
    }

    let state = AppState {
        config: Arc::new(config),
        pages_dir,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/slots", get(get_slots))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = std::env::var("COURT_SLOTS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/slots?period=week&durations=60,90", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
