//! # REST API for Billing Alerts
//!
//! Alerts are derived from the payments in the caller's scope on every
//! request; nothing is stored.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use super::mappers::AlertMapper;
use super::{error_response, Access, DateQuery};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_alerts))
}

/// Alerts for today, or for `?today=YYYY-MM-DD`
pub async fn list_alerts(
    State(state): State<AppState>,
    Access(access): Access,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/alerts - role: {}, today: {:?}", access.role(), query.today);

    let today = match query.resolve() {
        Ok(today) => today,
        Err(e) => return error_response("list alerts", e),
    };

    let report = state.payment_service.alerts(&access, today).await;
    (StatusCode::OK, Json(AlertMapper::to_list_response(&report, today))).into_response()
}
