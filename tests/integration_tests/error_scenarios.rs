//! Error scenario integration tests
//!
//! Covers the failure paths every endpoint shares:
//! 1. Unknown routes
//! 2. Record store failures
//! 3. Panics inside a handler

use std::sync::Arc;

use async_trait::async_trait;
use zenclass::error::Result;
use zenclass::models::{
    CodingProgress, DateWindow, DriveWithAttendees, MentorMenteeCount, RecordId,
    RecruitingDrive, TaskSubmission, TopicWithTasks,
};
use zenclass::storage::{MemoryRecordStore, RecordStore};

use super::fixtures::Campus;
use crate::common::{get, spawn_app};

const ENDPOINTS: [&str; 5] = [
    "/topics-tasks/october",
    "/company-drives/date-range",
    "/company-drives-with-students",
    "/mentors/with-mentees-count",
    "/users/absent-no-task",
];

/// Store whose every query panics
struct PanickingStore;

#[async_trait]
impl RecordStore for PanickingStore {
    async fn topics_taught_in_month(&self, _month: u32) -> Result<Vec<TopicWithTasks>> {
        panic!("topics exploded")
    }

    async fn drives_between(&self, _window: DateWindow) -> Result<Vec<RecruitingDrive>> {
        panic!("drives exploded")
    }

    async fn drives_with_attendees(&self) -> Result<Vec<DriveWithAttendees>> {
        panic!("attendees exploded")
    }

    async fn coding_progress_for(&self, _learner: &RecordId) -> Result<Option<CodingProgress>> {
        panic!("codekata exploded")
    }

    async fn mentors_with_more_mentees_than(
        &self,
        _threshold: u64,
    ) -> Result<Vec<MentorMenteeCount>> {
        panic!("mentors exploded")
    }

    async fn absent_learners(&self, _window: DateWindow) -> Result<Vec<RecordId>> {
        panic!("attendance exploded")
    }

    async fn task_submission_candidates(
        &self,
        _window: DateWindow,
    ) -> Result<Vec<TaskSubmission>> {
        panic!("tasks exploded")
    }
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_unknown_paths_return_not_found() {
    let addr = spawn_app(Arc::new(MemoryRecordStore::new())).await;

    for path in ["/", "/users", "/topics-tasks/november", "/codekata/problems-solved"] {
        let (status, body) = get(addr, path).await;
        assert_eq!(status, 404, "{path}");
        assert_eq!(body, r#"{"error":"Endpoint not found"}"#, "{path}");
    }
}

// ============================================================================
// Store Failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_returns_generic_server_error() {
    let campus = Campus::seed();
    campus.store.set_unavailable(true);
    let addr = spawn_app(campus.store.clone()).await;

    let problems = format!("/codekata/problems-solved/{}", campus.asha.id);
    for path in ENDPOINTS.into_iter().chain([problems.as_str()]) {
        let (status, body) = get(addr, path).await;
        assert_eq!(status, 500, "{path}");
        assert_eq!(body, r#"{"error":"Server error"}"#, "{path}");
        assert!(!body.contains("unavailable"));
    }
}

#[tokio::test]
async fn test_store_recovers_after_failure() {
    let campus = Campus::seed();
    campus.store.set_unavailable(true);
    let addr = spawn_app(campus.store.clone()).await;

    let (status, _) = get(addr, "/users/absent-no-task").await;
    assert_eq!(status, 500);

    campus.store.set_unavailable(false);
    let (status, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"count":1}"#);
}

#[tokio::test]
async fn test_input_errors_checked_before_store() {
    let campus = Campus::seed();
    campus.store.set_unavailable(true);
    let addr = spawn_app(campus.store.clone()).await;

    let (status, body) = get(addr, "/codekata/problems-solved/12345").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid user ID"}"#);

    let (status, body) = get(addr, "/company-drives/date-range?endDate=31-10-2020").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid date format"}"#);
}

// ============================================================================
// Panics
// ============================================================================

#[tokio::test]
async fn test_handler_panic_returns_internal_error() {
    let addr = spawn_app(Arc::new(PanickingStore)).await;

    let problems = format!("/codekata/problems-solved/{}", RecordId::generate());
    for path in ENDPOINTS.into_iter().chain([problems.as_str()]) {
        let (status, body) = get(addr, path).await;
        assert_eq!(status, 500, "{path}");
        assert_eq!(body, r#"{"error":"Internal server error"}"#, "{path}");
    }
}

#[tokio::test]
async fn test_server_survives_panics() {
    let addr = spawn_app(Arc::new(PanickingStore)).await;

    let (status, _) = get(addr, "/mentors/with-mentees-count").await;
    assert_eq!(status, 500);

    let (status, body) = get(addr, "/no-such-endpoint").await;
    assert_eq!(status, 404);
    assert_eq!(body, r#"{"error":"Endpoint not found"}"#);
}

#[tokio::test]
async fn test_wrong_method_on_known_path_is_not_found() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;
    let client = reqwest::Client::new();

    for path in ["/users/absent-no-task", "/topics-tasks/october"] {
        let response = client
            .post(format!("http://{addr}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status().as_u16(), 404, "{path}");
        assert_eq!(
            response.text().await.expect("body"),
            r#"{"error":"Endpoint not found"}"#
        );
    }

    let response = client
        .delete(format!("http://{addr}/mentors/with-mentees-count"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_malformed_query_and_path_use_error_body() {
    let addr = spawn_app(Arc::new(MemoryRecordStore::new())).await;

    let (status, body) = get(
        addr,
        "/company-drives/date-range?startDate=2020-10-01&startDate=2020-10-02",
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid date format"}"#);

    let (status, body) = get(addr, "/codekata/problems-solved/%FF").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid user ID"}"#);
}
