//! Report endpoint tests
//!
//! Runs every endpoint against the seeded campus data set.

use std::sync::Arc;

use serde_json::Value;
use zenclass::models::{
    Attendance, AttendanceStatus, CodingProgress, Learner, ProblemTally, RecordId, Task,
};
use zenclass::storage::{MemoryRecordStore, SharedRecordStore};

use super::fixtures::Campus;
use crate::common::{day, get, get_json, spawn_app};

fn names(json: &Value, key: &str) -> Vec<String> {
    json.as_array()
        .expect("array body")
        .iter()
        .map(|item| item[key].as_str().expect("string field").to_string())
        .collect()
}

// ============================================================================
// Topics
// ============================================================================

#[tokio::test]
async fn test_october_topics_match_any_year() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(addr, "/topics-tasks/october").await;
    assert_eq!(status, 200);
    assert_eq!(names(&json, "name"), vec!["Promises", "Async/Await"]);

    let tasks = json[0]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["_id"], campus.closures_task.id.as_str());
    assert_eq!(tasks[0]["title"], "Closures");
    assert_eq!(json[0]["teachingDate"], "2019-10-01T12:00:00.000Z");
}

#[tokio::test]
async fn test_october_topics_empty_store() {
    let addr = spawn_app(Arc::new(MemoryRecordStore::new())).await;

    let (status, body) = get(addr, "/topics-tasks/october").await;
    assert_eq!(status, 200);
    assert_eq!(body, "[]");
}

// ============================================================================
// Recruiting drives
// ============================================================================

#[tokio::test]
async fn test_drives_default_window_is_inclusive() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(addr, "/company-drives/date-range").await;
    assert_eq!(status, 200);
    assert_eq!(names(&json, "companyName"), vec!["Acme", "Globex"]);
    assert_eq!(json[0]["driveDate"], "2020-10-15T00:00:00.000Z");
    assert_eq!(json[1]["driveDate"], "2020-10-31T23:59:59.999Z");
}

#[tokio::test]
async fn test_drives_explicit_range() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(
        addr,
        "/company-drives/date-range?startDate=2020-11-01T00:00:00.000Z&endDate=2020-11-30",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(names(&json, "companyName"), vec!["Initech"]);
}

#[tokio::test]
async fn test_drives_single_bound_falls_back_to_default_window() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) =
        get_json(addr, "/company-drives/date-range?startDate=2020-11-01").await;
    assert_eq!(status, 200);
    assert_eq!(names(&json, "companyName"), vec!["Acme", "Globex"]);
}

#[tokio::test]
async fn test_drives_invalid_date_is_bad_request() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, body) = get(addr, "/company-drives/date-range?startDate=not-a-date").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid date format"}"#);

    let (status, _) = get(
        addr,
        "/company-drives/date-range?startDate=2020-10-01&endDate=whenever",
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_drives_with_students_project_learner_summary() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(addr, "/company-drives-with-students").await;
    assert_eq!(status, 200);
    assert_eq!(json.as_array().unwrap().len(), 4);

    let acme = &json[1];
    assert_eq!(acme["companyName"], "Acme");
    let students = acme["appearedStudents"].as_array().unwrap();
    assert_eq!(students.len(), 2);

    let asha = students[0].as_object().unwrap();
    let mut keys: Vec<_> = asha.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["_id", "email", "enrollmentDate", "name"]);
    assert_eq!(asha["_id"], campus.asha.id.as_str());
    assert_eq!(asha["email"], "asha@example.com");

    assert_eq!(json[2]["appearedStudents"][0]["name"], campus.chitra.name);
}

// ============================================================================
// Coding progress
// ============================================================================

#[tokio::test]
async fn test_problems_solved_for_existing_record() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(
        addr,
        &format!("/codekata/problems-solved/{}", campus.asha.id),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["userId"], campus.asha.id.as_str());
    assert_eq!(json["problemsSolved"], 42);
}

#[tokio::test]
async fn test_problems_solved_invalid_and_missing_ids() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, body) = get(addr, "/codekata/problems-solved/not-an-id").await;
    assert_eq!(status, 400);
    assert_eq!(body, r#"{"error":"Invalid user ID"}"#);

    let (status, body) = get(
        addr,
        &format!("/codekata/problems-solved/{}", campus.bala.id),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body, r#"{"error":"Codekata record not found for user"}"#);
}

#[tokio::test]
async fn test_problems_solved_echoes_stored_value() {
    let store = Arc::new(MemoryRecordStore::new());
    let learner = RecordId::generate();
    let mut progress = CodingProgress::new(learner.clone(), 0);
    progress.problems_solved = ProblemTally::new(12.5);
    store.insert_coding_progress(progress);
    let addr = spawn_app(store).await;

    let (status, body) = get(addr, &format!("/codekata/problems-solved/{learner}")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        format!(r#"{{"userId":"{learner}","problemsSolved":12.5}}"#)
    );
}

// ============================================================================
// Mentors
// ============================================================================

#[tokio::test]
async fn test_mentor_threshold_is_strictly_greater() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, json) = get_json(addr, "/mentors/with-mentees-count").await;
    assert_eq!(status, 200);
    assert_eq!(names(&json, "name"), vec!["Sixteen Mentees"]);
    assert_eq!(json[0]["menteesCount"], 16);
    assert_eq!(json[0]["expertise"], "Full stack");
    assert!(json[0].get("mentees").is_none());
}

// ============================================================================
// Absent without task submission
// ============================================================================

#[tokio::test]
async fn test_absent_without_task_counts_only_non_submitters() {
    let campus = Campus::seed();
    let addr = spawn_app(campus.store.clone()).await;

    let (status, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"count":1}"#);
}

#[tokio::test]
async fn test_submission_in_window_excludes_learner() {
    let store = Arc::new(MemoryRecordStore::new());
    let learner = Learner::new("Dev", "dev@example.com", day(2020, 8, 1));
    store.insert_learner(learner.clone());
    store.insert_attendance(Attendance::new(
        learner.id.clone(),
        day(2020, 10, 20),
        AttendanceStatus::Absent,
    ));
    let addr = spawn_app(store.clone()).await;

    let (_, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(body, r#"{"count":1}"#);

    store.insert_task(
        Task::new("Forms", "Validate a form", day(2020, 10, 15))
            .submitted(day(2020, 10, 21), vec![learner.id.clone()]),
    );

    let (_, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(body, r#"{"count":0}"#);
}

#[tokio::test]
async fn test_submission_outside_window_does_not_exclude() {
    let store = Arc::new(MemoryRecordStore::new());
    let learner = RecordId::generate();
    store.insert_attendance(Attendance::new(
        learner.clone(),
        day(2020, 10, 30),
        AttendanceStatus::Absent,
    ));
    store.insert_task(
        Task::new("Late", "Handed in after the window", day(2020, 10, 20))
            .submitted(day(2020, 11, 3), vec![learner]),
    );
    let addr = spawn_app(store).await;

    let (status, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"count":1}"#);
}

#[tokio::test]
async fn test_submitted_task_without_date_excludes_learner() {
    let store = Arc::new(MemoryRecordStore::new());
    let learner = RecordId::generate();
    store.insert_attendance(Attendance::new(
        learner.clone(),
        day(2020, 10, 19),
        AttendanceStatus::Absent,
    ));
    let mut task = Task::new("Undated", "Marked submitted, no date", day(2020, 10, 15))
        .submitted(day(2020, 10, 19), vec![learner]);
    task.submission_date = None;
    store.insert_task(task);
    let addr = spawn_app(store).await;

    let (status, body) = get(addr, "/users/absent-no-task").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"count":0}"#);
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_repeated_requests_return_identical_bodies() {
    let campus = Campus::seed();
    let store: SharedRecordStore = campus.store.clone();
    let addr = spawn_app(store).await;

    let problems = format!("/codekata/problems-solved/{}", campus.asha.id);
    let paths = [
        "/topics-tasks/october",
        "/company-drives/date-range",
        "/company-drives-with-students",
        problems.as_str(),
        "/mentors/with-mentees-count",
        "/users/absent-no-task",
    ];

    for path in paths {
        let first = get(addr, path).await;
        let second = get(addr, path).await;
        assert_eq!(first, second, "{path} changed between calls");
        assert_eq!(first.0, 200, "{path} failed");
    }
}
