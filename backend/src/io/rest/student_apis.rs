//! # REST API for Students
//!
//! Listing, enrollment, profile updates and removal.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use chrono::Local;
use log::info;

use super::{error_response, Access};
use crate::AppState;
use shared::{EnrollStudentRequest, StudentListRequest, UpdateStudentRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(enroll_student))
        .route("/:id", put(update_student).delete(remove_student))
}

/// List students, optionally filtered with `?search=`
pub async fn list_students(
    State(state): State<AppState>,
    Access(access): Access,
    Query(request): Query<StudentListRequest>,
) -> impl IntoResponse {
    info!("GET /api/students - role: {}, search: {:?}", access.role(), request.search);

    let response = state
        .student_service
        .list_students(request.search.as_deref())
        .await;
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn enroll_student(
    State(state): State<AppState>,
    Access(access): Access,
    Json(request): Json<EnrollStudentRequest>,
) -> impl IntoResponse {
    info!("POST /api/students - name: {}, plan: {}", request.name, request.plan);

    let today = Local::now().date_naive();
    match state.student_service.enroll_student(&access, request, today).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => error_response("enroll student", e),
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Access(access): Access,
    Path(student_id): Path<String>,
    Json(request): Json<UpdateStudentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/students/{} - request: {:?}", student_id, request);

    match state.student_service.update_student(&access, &student_id, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("update student", e),
    }
}

pub async fn remove_student(
    State(state): State<AppState>,
    Access(access): Access,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/students/{}", student_id);

    match state.student_service.remove_student(&access, &student_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("remove student", e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, json, send};
    use crate::storage::test_utils::{
        sample_payment, sample_session, sample_student, FailingBlobStore,
    };
    use crate::storage::{Collection, MemoryBlobStore, Store};
    use crate::test_app::{router_over, test_router};
    use std::sync::Arc;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{
        EnrollStudentResponse, ErrorResponse, PaymentStatus, RemoveStudentResponse,
        StudentListResponse, StudentResponse,
    };

    async fn setup_test() -> (axum::Router, crate::storage::Store) {
        test_router(
            vec![
                sample_student("1", "Marina Fontoura"),
                sample_student("2", "Ricardo Silveira"),
            ],
            vec![sample_payment("p1", "1", "2024-05-25", PaymentStatus::Pending)],
            vec![sample_session("c1", "1", "2024-05-20", "08:00")],
        )
        .await
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let (router, _store) = setup_test().await;

        let (status, body): (_, StudentListResponse) =
            send(router, get("/api/students?search=ricardo")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.students.len(), 1);
        assert_eq!(body.students[0].id, "2");
    }

    #[tokio::test]
    async fn test_enroll_returns_created() {
        let (router, store) = setup_test().await;
        let request = json(
            "POST",
            "/api/students",
            json!({
                "name": "Helena Prado",
                "email": "helena@me.com",
                "phone": "(51) 91234-5678",
                "plan": "Anual - VIP",
                "photo": null,
                "password": null
            }),
        );

        let (status, body): (_, EnrollStudentResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.initial_payment.amount, 650.0);
        assert!(body.access_link.contains(&format!("studentId={}", body.student.id)));
        assert_eq!(store.read(|d| d.students.len()).await, 3);
    }

    #[tokio::test]
    async fn test_enroll_as_student_is_forbidden() {
        let (router, _store) = setup_test().await;
        let request = json(
            "POST",
            "/api/students?studentId=1",
            json!({
                "name": "Helena Prado",
                "email": "helena@me.com",
                "phone": "(51) 91234-5678",
                "plan": "Anual - VIP",
                "photo": null,
                "password": null
            }),
        );

        let (status, body): (_, ErrorResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.error.contains("manager"));
    }

    #[tokio::test]
    async fn test_student_updates_own_profile_through_header() {
        let (router, _store) = setup_test().await;
        let mut request = json("PUT", "/api/students/1", json!({ "phone": "(51) 99999-0000" }));
        request
            .headers_mut()
            .insert("x-student-id", "1".parse().unwrap());

        let (status, body): (_, StudentResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.student.phone, "(51) 99999-0000");
    }

    #[tokio::test]
    async fn test_remove_cascades() {
        let (router, store) = setup_test().await;
        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/api/students/1")
            .body(axum::body::Body::empty())
            .unwrap();

        let (status, body): (_, RemoveStudentResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.removed_payments, 1);
        assert_eq!(body.removed_sessions, 1);
        assert!(store.read(|d| d.payments.is_empty() && d.classes.is_empty()).await);
    }

    #[tokio::test]
    async fn test_remove_missing_student() {
        let (router, _store) = setup_test().await;
        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/api/students/missing")
            .body(axum::body::Body::empty())
            .unwrap();

        let (status, body): (_, ErrorResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Student missing not found");
    }

    #[tokio::test]
    async fn test_remove_storage_failure_is_500() {
        let failing = FailingBlobStore::new(MemoryBlobStore::new(), Collection::Payments.key());
        failing.set_failing(false);
        let store = Store::open(Arc::new(failing.clone()), Vec::new()).await.unwrap();
        store
            .mutate(&Collection::ALL, |data| {
                data.students.push(sample_student("1", "Marina Fontoura"));
                data.payments.push(sample_payment("p1", "1", "2024-05-25", PaymentStatus::Pending));
                Ok(())
            })
            .await
            .unwrap();
        failing.set_failing(true);
        let router = router_over(store.clone());
        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/api/students/1")
            .body(axum::body::Body::empty())
            .unwrap();

        let (status, body): (_, ErrorResponse) = send(router, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Storage failure, the change was not saved");
        assert_eq!(store.read(|d| d.students.len()).await, 1);
    }
}
