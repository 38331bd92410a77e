use axum::{http::StatusCode, response::Json, routing::post, Router};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::AppState;
use shared::LogEntry;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(log_message))
}

/// Forward a client log line into the backend log
pub async fn log_message(Json(entry): Json<LogEntry>) -> Result<Json<LogResponse>, StatusCode> {
    let component = entry.component.as_deref().unwrap_or("client");
    let message = format!("[{}] {}", component, entry.message);

    match entry.level.to_lowercase().as_str() {
        "debug" => debug!("{}", message),
        "warn" | "warning" => warn!("{}", message),
        "error" => error!("{}", message),
        _ => info!("{}", message),
    }

    Ok(Json(LogResponse { success: true }))
}
