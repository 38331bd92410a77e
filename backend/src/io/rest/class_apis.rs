//! # REST API for Class Sessions
//!
//! Booking, rescheduling, slot lookup, the weekly agenda and the day summary.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use log::info;
use serde::Deserialize;

use super::{error_response, Access, DateQuery};
use crate::domain::StudioError;
use crate::AppState;
use shared::{RescheduleClassRequest, ScheduleClassRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(schedule_session))
        .route("/week", get(week_grid))
        .route("/slot", get(find_session))
        .route("/summary", get(summarize_day))
        .route("/:id", put(reschedule_session))
}

/// `?date=YYYY-MM-DD`, today when absent
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: String,
    pub time: String,
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Access(access): Access,
) -> impl IntoResponse {
    info!("GET /api/classes - role: {}", access.role());
    (StatusCode::OK, Json(state.schedule_service.list_sessions(&access).await)).into_response()
}

pub async fn schedule_session(
    State(state): State<AppState>,
    Access(access): Access,
    Json(request): Json<ScheduleClassRequest>,
) -> impl IntoResponse {
    info!("POST /api/classes - request: {:?}", request);

    match state.schedule_service.schedule_session(&access, request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => error_response("schedule class", e),
    }
}

pub async fn reschedule_session(
    State(state): State<AppState>,
    Access(access): Access,
    Path(session_id): Path<String>,
    Json(request): Json<RescheduleClassRequest>,
) -> impl IntoResponse {
    info!("PUT /api/classes/{} - request: {:?}", session_id, request);

    match state
        .schedule_service
        .reschedule_session(&access, &session_id, request)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("reschedule class", e),
    }
}

pub async fn find_session(
    State(state): State<AppState>,
    Access(access): Access,
    Query(query): Query<SlotQuery>,
) -> impl IntoResponse {
    info!("GET /api/classes/slot - {} {}", query.date, query.time);

    match state
        .schedule_service
        .find_session(&access, &query.date, &query.time)
        .await
    {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => error_response(
            "find class",
            StudioError::not_found(format!("Class on {} at {}", query.date, query.time)),
        ),
    }
}

pub async fn week_grid(
    State(state): State<AppState>,
    Access(access): Access,
    Query(query): Query<DayQuery>,
) -> impl IntoResponse {
    info!("GET /api/classes/week - date: {:?}", query.date);

    let day = match (DateQuery { today: query.date }).resolve() {
        Ok(day) => day,
        Err(e) => return error_response("build week grid", e),
    };
    (StatusCode::OK, Json(state.schedule_service.week_grid(&access, day).await)).into_response()
}

pub async fn summarize_day(
    State(state): State<AppState>,
    Access(access): Access,
    Query(query): Query<DayQuery>,
) -> impl IntoResponse {
    info!("GET /api/classes/summary - role: {}, date: {:?}", access.role(), query.date);

    let day = match (DateQuery { today: query.date }).resolve() {
        Ok(day) => day,
        Err(e) => return error_response("summarize day", e),
    };
    (StatusCode::OK, Json(state.schedule_service.summarize_day(&access, day).await)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, json, send};
    use crate::storage::test_utils::{sample_session, sample_student};
    use crate::test_app::test_router;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{
        ClassListResponse, ClassSession, ClassSessionResponse, ErrorResponse,
        ScheduleSummaryResponse, WeekGrid,
    };

    async fn setup_test() -> axum::Router {
        let (router, _store) = test_router(
            vec![
                sample_student("1", "Marina Fontoura"),
                sample_student("2", "Ricardo Silveira"),
            ],
            Vec::new(),
            vec![
                sample_session("c1", "1", "2024-05-20", "08:00"),
                sample_session("c2", "2", "2024-05-21", "09:00"),
            ],
        )
        .await;
        router
    }

    #[tokio::test]
    async fn test_schedule_and_list() {
        let router = setup_test().await;

        let (status, body): (_, ClassSessionResponse) = send(
            router.clone(),
            json(
                "POST",
                "/api/classes",
                json!({
                    "student_id": "2",
                    "instructor": "Roberta",
                    "date": "2024-05-22",
                    "time": "10:00"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.session.student_name, "Ricardo Silveira");

        let (_, body): (_, ClassListResponse) = send(router, get("/api/classes?studentId=2")).await;
        assert_eq!(body.sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_reschedule_other_students_class_forbidden() {
        let router = setup_test().await;

        let (status, _body): (_, ErrorResponse) = send(
            router,
            json(
                "PUT",
                "/api/classes/c2?studentId=1",
                json!({ "date": "2024-05-23", "time": "07:00" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_week_and_slot() {
        let router = setup_test().await;

        let (status, grid): (_, WeekGrid) =
            send(router.clone(), get("/api/classes/week?date=2024-05-21")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(grid.days[0], "2024-05-20");
        assert_eq!(grid.slots[1][0].session.as_ref().unwrap().id, "c1");

        let (status, session): (_, ClassSession) = send(
            router.clone(),
            get("/api/classes/slot?date=2024-05-21&time=09:00"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session.id, "c2");

        let (status, _): (_, ErrorResponse) =
            send(router, get("/api/classes/slot?date=2024-05-21&time=11:00")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_uses_fallback_without_ai() {
        let router = setup_test().await;

        let (status, body): (_, ScheduleSummaryResponse) =
            send(router, get("/api/classes/summary?date=2024-05-20")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.summary.contains("Roberta"));
    }
}
