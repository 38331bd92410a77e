//! # REST API Interface Layer
//!
//! HTTP endpoints of the studio backend, all nested under `/api`.
//!
//! Every handler resolves the caller's [`AccessContext`] from the
//! `studentId` query parameter (the individual access link) or the
//! `x-student-id` header. Without either the caller is the manager.
//!
//! Domain errors map to status codes in one place:
//!
//! | error | status |
//! |---|---|
//! | `NotFound` | 404 |
//! | `Validation` | 400 |
//! | `Forbidden` | 403 |
//! | `Storage` | 500 |
//!
//! with a JSON body `{ "error": "<message>" }`.

pub mod access_apis;
pub mod alert_apis;
pub mod class_apis;
pub mod dashboard_apis;
pub mod logging_apis;
pub mod mappers;
pub mod payment_apis;
pub mod plan_apis;
pub mod student_apis;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Local, NaiveDate};
use log::error;
use serde::Deserialize;

use crate::domain::{AccessContext, StudioError};
use crate::AppState;
use shared::{ErrorResponse, DATE_FORMAT};

pub const STUDENT_ID_HEADER: &str = "x-student-id";
pub const STUDENT_ID_PARAM: &str = "studentId";

/// Extractor for the caller's access context
pub struct Access(pub AccessContext);

#[async_trait]
impl FromRequestParts<AppState> for Access {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_query = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == STUDENT_ID_PARAM)
                .map(|(_, value)| value.into_owned())
        });
        let from_header = parts
            .headers
            .get(STUDENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        state
            .student_service
            .resolve_access(from_query.or(from_header).as_deref())
            .await
            .map(Access)
            .map_err(|e| error_response("resolve access", e))
    }
}

/// Optional `?today=YYYY-MM-DD` override of the reference date
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub today: Option<String>,
}

impl DateQuery {
    pub fn resolve(&self) -> Result<NaiveDate, StudioError> {
        match self.today.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                StudioError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
            }),
            None => Ok(Local::now().date_naive()),
        }
    }
}

pub fn status_for(error: &StudioError) -> StatusCode {
    match error {
        StudioError::NotFound(_) => StatusCode::NOT_FOUND,
        StudioError::Validation(_) => StatusCode::BAD_REQUEST,
        StudioError::Forbidden(_) => StatusCode::FORBIDDEN,
        StudioError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a failed operation and turn it into a JSON error response
pub fn error_response(operation: &str, error: StudioError) -> Response {
    error!("Failed to {}: {}", operation, error);
    let status = status_for(&error);
    let message = match &error {
        StudioError::Storage(_) => "Storage failure, the change was not saved".to_string(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}
