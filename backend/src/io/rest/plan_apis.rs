use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use super::{error_response, Access};
use crate::AppState;
use shared::UpdatePlansRequest;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_plans).put(update_plans))
}

pub async fn list_plans(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/plans");
    (StatusCode::OK, Json(state.plan_service.list_plans().await)).into_response()
}

pub async fn update_plans(
    State(state): State<AppState>,
    Access(access): Access,
    Json(request): Json<UpdatePlansRequest>,
) -> impl IntoResponse {
    info!("PUT /api/plans - {} plans", request.plans.len());

    match state.plan_service.update_plans(&access, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("update plans", e),
    }
}
