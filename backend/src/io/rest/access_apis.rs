//! # REST API for Access and Navigation
//!
//! Resolves an individual access link and returns the tabs for the context.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;

use super::{error_response, Access};
use crate::domain::navigation::navigation;
use crate::AppState;
use shared::AccessResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/access", get(resolve_access))
        .route("/navigation", get(get_navigation))
}

/// Who the caller is; unknown access links are rejected by the extractor
pub async fn resolve_access(
    State(state): State<AppState>,
    Access(access): Access,
) -> impl IntoResponse {
    info!("GET /api/access - role: {}", access.role());

    let student = match access.student_id() {
        Some(id) => match state.student_service.get_student(id).await {
            Ok(student) => Some(student),
            Err(e) => return error_response("resolve access", e),
        },
        None => None,
    };

    let response = AccessResponse {
        role: access.role().to_string(),
        student,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn get_navigation(Access(access): Access) -> impl IntoResponse {
    info!("GET /api/navigation - role: {}", access.role());
    (StatusCode::OK, Json(navigation(&access))).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, send};
    use crate::storage::test_utils::sample_student;
    use crate::test_app::test_router;
    use axum::http::StatusCode;
    use shared::{AccessResponse, ErrorResponse, NavigationResponse};

    #[tokio::test]
    async fn test_access_link_resolution() {
        let (router, _store) =
            test_router(vec![sample_student("1", "Marina Fontoura")], Vec::new(), Vec::new()).await;

        let (status, body): (_, AccessResponse) = send(router.clone(), get("/api/access")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.role, "MANAGER");
        assert!(body.student.is_none());

        let (_, body): (_, AccessResponse) =
            send(router.clone(), get("/api/access?studentId=1")).await;
        assert_eq!(body.role, "STUDENT");
        assert_eq!(body.student.unwrap().name, "Marina Fontoura");

        let (status, _): (_, ErrorResponse) = send(router, get("/api/access?studentId=2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_navigation() {
        let (router, _store) =
            test_router(vec![sample_student("1", "Marina Fontoura")], Vec::new(), Vec::new()).await;

        let (status, body): (_, NavigationResponse) =
            send(router, get("/api/navigation?studentId=1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.role, "STUDENT");
        assert_eq!(body.items.len(), 6);
    }
}
