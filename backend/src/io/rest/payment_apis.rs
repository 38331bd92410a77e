//! # REST API for Payments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Local;
use log::info;

use super::{error_response, Access};
use crate::AppState;
use shared::AddPaymentRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(add_payment))
        .route("/:id/toggle", post(toggle_payment))
        .route("/:id/reminder", post(compose_reminder))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Access(access): Access,
) -> impl IntoResponse {
    info!("GET /api/payments - role: {}", access.role());

    let response = state.payment_service.list_payments(&access).await;
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn add_payment(
    State(state): State<AppState>,
    Access(access): Access,
    Json(request): Json<AddPaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/payments - request: {:?}", request);

    match state.payment_service.add_payment(&access, request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => error_response("add payment", e),
    }
}

pub async fn toggle_payment(
    State(state): State<AppState>,
    Access(access): Access,
    Path(payment_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/payments/{}/toggle", payment_id);

    match state.payment_service.toggle_payment(&access, &payment_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("toggle payment", e),
    }
}

pub async fn compose_reminder(
    State(state): State<AppState>,
    Access(access): Access,
    Path(payment_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/payments/{}/reminder", payment_id);

    let today = Local::now().date_naive();
    match state.payment_service.compose_reminder(&access, &payment_id, today).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("compose reminder", e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, json, send};
    use crate::storage::test_utils::{sample_payment, sample_student};
    use crate::test_app::test_router;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{
        ErrorResponse, PaymentListResponse, PaymentReminderResponse, PaymentResponse, PaymentStatus,
    };

    async fn setup_test() -> axum::Router {
        let (router, _store) = test_router(
            vec![
                sample_student("1", "Marina Fontoura"),
                sample_student("2", "Ricardo Silveira"),
            ],
            vec![
                sample_payment("p1", "1", "2024-05-25", PaymentStatus::Pending),
                sample_payment("p2", "2", "2024-04-25", PaymentStatus::Paid),
            ],
            Vec::new(),
        )
        .await;
        router
    }

    #[tokio::test]
    async fn test_list_scoped_by_access_link() {
        let router = setup_test().await;

        let (status, body): (_, PaymentListResponse) =
            send(router.clone(), get("/api/payments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.payments.len(), 2);
        assert_eq!(body.paid_total, 380.0);

        let (_, body): (_, PaymentListResponse) =
            send(router, get("/api/payments?studentId=1")).await;
        assert_eq!(body.payments.len(), 1);
        assert_eq!(body.paid_total, 0.0);
    }

    #[tokio::test]
    async fn test_toggle() {
        let router = setup_test().await;

        let (status, body): (_, PaymentResponse) =
            send(router, json("POST", "/api/payments/p1/toggle", json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.payment.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_student_cannot_toggle() {
        let router = setup_test().await;

        let (status, _body): (_, ErrorResponse) = send(
            router,
            json("POST", "/api/payments/p1/toggle?studentId=1", json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_add_payment_bad_date() {
        let router = setup_test().await;

        let (status, body): (_, ErrorResponse) = send(
            router,
            json(
                "POST",
                "/api/payments",
                json!({ "student_id": "1", "amount": 380.0, "due_date": "25/06/2024" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("25/06/2024"));
    }

    #[tokio::test]
    async fn test_reminder() {
        let router = setup_test().await;

        let (status, body): (_, PaymentReminderResponse) =
            send(router, json("POST", "/api/payments/p1/reminder", json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.message.contains("2024-05-25"));
        assert!(body.payment.last_reminder_sent.is_some());
        assert!(body.whatsapp_link.is_some());
    }
}
