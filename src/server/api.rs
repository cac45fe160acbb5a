//! REST API handlers for the reporting server
//!
//! This module defines the API routes and handlers. Every handler maps its
//! own failures to a status code; store errors are logged and answered with a
//! generic body.

use std::any::Any;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCategory};
use crate::models::{DateWindow, DriveWithAttendees, MentorMenteeCount, RecruitingDrive, TopicWithTasks};
use crate::reports::{self, LearnerCount, ProblemsSolved};

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Error body returned for every failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Failure of a request, rendered as a JSON error body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log `err` and hide it behind a generic server error
    pub fn internal(err: Error, operation: &str) -> Self {
        tracing::error!(
            error = %err,
            category = err.category().as_str(),
            operation,
            "Request failed"
        );
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Query parameters of the drive date-range endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/topics-tasks/october", get(october_topics))
        .route("/company-drives/date-range", get(drives_in_range))
        .route("/company-drives-with-students", get(drives_with_students))
        .route("/codekata/problems-solved/{user_id}", get(problems_solved))
        .route("/mentors/with-mentees-count", get(mentors_with_mentees_count))
        .route("/users/absent-no-task", get(absent_without_task))
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(endpoint_not_found)
        .with_state(state)
}

// ============================================================================
// Curriculum Handlers
// ============================================================================

/// Topics taught in October, tasks expanded
async fn october_topics(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopicWithTasks>>, ApiError> {
    reports::october_topics(state.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e, "fetching October topics and tasks"))
}

// ============================================================================
// Recruiting Drive Handlers
// ============================================================================

/// Drives between `startDate` and `endDate` inclusive
async fn drives_in_range(
    State(state): State<AppState>,
    query: Result<Query<DriveRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<RecruitingDrive>>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::bad_request("Invalid date format"))?;
    let window = reports::drive_window(query.start_date.as_deref(), query.end_date.as_deref())
        .map_err(|_| ApiError::bad_request("Invalid date format"))?;

    reports::drives_in_window(state.store.as_ref(), window)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e, "fetching company drives by date range"))
}

/// Drives with the learners who appeared
async fn drives_with_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriveWithAttendees>>, ApiError> {
    reports::drives_with_attendees(state.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e, "fetching company drives with students"))
}

// ============================================================================
// Learner Handlers
// ============================================================================

async fn problems_solved(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ProblemsSolved>, ApiError> {
    let Path(user_id) = user_id.map_err(|_| ApiError::bad_request("Invalid user ID"))?;
    reports::problems_solved(state.store.as_ref(), &user_id)
        .await
        .map(Json)
        .map_err(|e| match e.category() {
            ErrorCategory::Input => ApiError::bad_request("Invalid user ID"),
            ErrorCategory::NotFound => ApiError::not_found("Codekata record not found for user"),
            _ => ApiError::internal(e, "fetching problems solved by user"),
        })
}

async fn mentors_with_mentees_count(
    State(state): State<AppState>,
) -> Result<Json<Vec<MentorMenteeCount>>, ApiError> {
    reports::mentors_over_threshold(state.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e, "fetching mentors by mentee count"))
}

/// Learners absent between 15 and 31 Oct 2020 without a task submission
async fn absent_without_task(
    State(state): State<AppState>,
) -> Result<Json<LearnerCount>, ApiError> {
    reports::absent_without_submission(state.store.as_ref(), DateWindow::reporting_default())
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e, "fetching absent learners without task submission"))
}

// ============================================================================
// Fallbacks
// ============================================================================

async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

/// Panic handler for `CatchPanicLayer`
pub fn internal_error_for_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        String::from("unknown panic payload")
    };

    tracing::error!(panic = %detail, "Unhandled error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

// ============================================================================
// Tests
// ============================================================================
