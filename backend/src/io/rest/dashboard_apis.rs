use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use super::{error_response, Access, DateQuery};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// Manager or student dashboard, depending on the access context
pub async fn get_dashboard(
    State(state): State<AppState>,
    Access(access): Access,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/dashboard - role: {}", access.role());

    let today = match query.resolve() {
        Ok(today) => today,
        Err(e) => return error_response("build dashboard", e),
    };
    (StatusCode::OK, Json(state.dashboard_service.dashboard(&access, today).await)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, send};
    use crate::storage::test_utils::{sample_payment, sample_student};
    use crate::test_app::test_router;
    use axum::http::StatusCode;
    use shared::{DashboardResponse, PaymentStatus};

    #[tokio::test]
    async fn test_dashboard_per_role() {
        let (router, _store) = test_router(
            vec![sample_student("1", "Marina Fontoura")],
            vec![sample_payment("p1", "1", "2024-05-23", PaymentStatus::Pending)],
            Vec::new(),
        )
        .await;

        let (status, body): (_, DashboardResponse) =
            send(router.clone(), get("/api/dashboard?today=2024-05-20")).await;
        assert_eq!(status, StatusCode::OK);
        match body {
            DashboardResponse::Manager(dashboard) => {
                assert_eq!(dashboard.active_students, 1);
                assert_eq!(dashboard.pending_alerts, 1);
            }
            other => panic!("Expected manager dashboard, got {:?}", other),
        }

        let (_, body): (_, DashboardResponse) =
            send(router, get("/api/dashboard?today=2024-05-20&studentId=1")).await;
        match body {
            DashboardResponse::Student(dashboard) => assert!(dashboard.has_warning),
            other => panic!("Expected student dashboard, got {:?}", other),
        }
    }
}
