//! Report queries behind the HTTP endpoints
//!
//! Each function validates its input, runs one or more [`RecordStore`] queries
//! and shapes the result. None of them keep state between calls.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{
    DateWindow, DriveWithAttendees, MentorMenteeCount, ProblemTally, RecordId, RecruitingDrive,
    TaskStatus, TaskSubmission, TopicWithTasks,
};
use crate::storage::RecordStore;
use crate::utils::parse_iso_datetime;

/// Calendar month reported by the topics endpoint
pub const OCTOBER: u32 = 10;

/// Mentors need strictly more mentees than this to be reported
pub const MENTEE_THRESHOLD: u64 = 15;

/// Solved-problem count of one learner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemsSolved {
    pub user_id: String,
    pub problems_solved: ProblemTally,
}

/// Number of learners matching a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LearnerCount {
    pub count: usize,
}

/// Topics taught in October of any year, tasks expanded
pub async fn october_topics(store: &dyn RecordStore) -> Result<Vec<TopicWithTasks>> {
    let topics = store.topics_taught_in_month(OCTOBER).await?;
    tracing::debug!(topics = topics.len(), "Loaded October topics");
    Ok(topics)
}

/// Resolve the drive window from optional query bounds.
///
/// Supplied bounds must parse. If either bound is missing the default
/// reporting window is used for both.
pub fn drive_window(start: Option<&str>, end: Option<&str>) -> Result<DateWindow> {
    let parse = |raw: Option<&str>| -> Result<Option<_>> {
        match raw.filter(|s| !s.is_empty()) {
            Some(raw) => parse_iso_datetime(raw)
                .map(Some)
                .ok_or_else(|| Error::invalid_input(format!("Invalid date: {raw}"))),
            None => Ok(None),
        }
    };

    match (parse(start)?, parse(end)?) {
        (Some(start), Some(end)) => Ok(DateWindow::new(start, end)),
        _ => Ok(DateWindow::reporting_default()),
    }
}

/// Drives dated inside `window`
pub async fn drives_in_window(
    store: &dyn RecordStore,
    window: DateWindow,
) -> Result<Vec<RecruitingDrive>> {
    let drives = store.drives_between(window).await?;
    tracing::debug!(
        start = %window.start,
        end = %window.end,
        drives = drives.len(),
        "Loaded drives in window"
    );
    Ok(drives)
}

/// All drives with their attendees
pub async fn drives_with_attendees(store: &dyn RecordStore) -> Result<Vec<DriveWithAttendees>> {
    store.drives_with_attendees().await
}

/// Problems solved by the learner identified by `raw_user_id`
pub async fn problems_solved(store: &dyn RecordStore, raw_user_id: &str) -> Result<ProblemsSolved> {
    let learner = RecordId::parse(raw_user_id)?;

    let progress = store
        .coding_progress_for(&learner)
        .await?
        .ok_or_else(|| Error::not_found(format!("No coding progress for learner {learner}")))?;

    Ok(ProblemsSolved {
        user_id: raw_user_id.to_string(),
        problems_solved: progress.problems_solved,
    })
}

/// Mentors with more than [`MENTEE_THRESHOLD`] mentees
pub async fn mentors_over_threshold(store: &dyn RecordStore) -> Result<Vec<MentorMenteeCount>> {
    store.mentors_with_more_mentees_than(MENTEE_THRESHOLD).await
}

/// Learners absent inside `window` who did not submit a task in it
pub async fn absent_without_submission(
    store: &dyn RecordStore,
    window: DateWindow,
) -> Result<LearnerCount> {
    let absent: HashSet<RecordId> = store.absent_learners(window).await?.into_iter().collect();
    if absent.is_empty() {
        return Ok(LearnerCount { count: 0 });
    }

    let candidates = store.task_submission_candidates(window).await?;
    let count = count_without_submission(&absent, &candidates);

    tracing::debug!(
        absent = absent.len(),
        candidate_tasks = candidates.len(),
        count,
        "Correlated absences with task submissions"
    );
    Ok(LearnerCount { count })
}

/// Count learners in `absent` not listed as submitter of any submitted task.
///
/// Submission status is per task, so every submitter of a submitted task
/// counts as having submitted.
pub fn count_without_submission(absent: &HashSet<RecordId>, tasks: &[TaskSubmission]) -> usize {
    let submitted: HashSet<&RecordId> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Submitted)
        .flat_map(|task| task.submitted_by.iter())
        .filter(|learner| absent.contains(*learner))
        .collect();

    absent.len() - submitted.len()
}
