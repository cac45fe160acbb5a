//! Repository Pattern for Record Store Abstraction
//!
//! Report logic talks to the record store only through [`RecordStore`], so the
//! same reports run against MongoDB in production and against an in-memory
//! store in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   HTTP handlers / reports                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RecordStore trait                       │
//! └─────────────────────────────────────────────────────────────┘
//!                   │                         │
//!                   ▼                         ▼
//!        ┌─────────────────────┐   ┌─────────────────────┐
//!        │  MongoRecordStore   │   │  MemoryRecordStore  │
//!        └─────────────────────┘   └─────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use chrono::Datelike;

use crate::error::{Error, Result};
use crate::models::{
    Attendance, AttendanceStatus, CodingProgress, DateWindow, DriveWithAttendees, Learner,
    Mentor, MentorMenteeCount, RecordId, RecruitingDrive, Task, TaskSubmission, Topic,
    TopicWithTasks,
};

// ============================================================================
// Repository Trait
// ============================================================================

/// Read-only queries over the bootcamp collections
///
/// Implementations return records in natural (insertion) order and never
/// modify the underlying data.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Topics whose teaching date falls in calendar `month` (1-12, UTC) of any
    /// year, with task references expanded
    async fn topics_taught_in_month(&self, month: u32) -> Result<Vec<TopicWithTasks>>;

    /// Drives whose date lies inside `window` (inclusive)
    async fn drives_between(&self, window: DateWindow) -> Result<Vec<RecruitingDrive>>;

    /// All drives with attendees reduced to learner summaries
    async fn drives_with_attendees(&self) -> Result<Vec<DriveWithAttendees>>;

    /// Coding progress record of one learner
    async fn coding_progress_for(&self, learner: &RecordId) -> Result<Option<CodingProgress>>;

    /// Mentors whose mentee count is strictly greater than `threshold`
    async fn mentors_with_more_mentees_than(
        &self,
        threshold: u64,
    ) -> Result<Vec<MentorMenteeCount>>;

    /// Learner of every `absent` attendance inside `window`; may repeat
    async fn absent_learners(&self, window: DateWindow) -> Result<Vec<RecordId>>;

    /// Tasks assigned on or before the window end whose submission date is
    /// inside the window or missing
    async fn task_submission_candidates(&self, window: DateWindow)
        -> Result<Vec<TaskSubmission>>;
}

/// Thread-safe shared record store
pub type SharedRecordStore = Arc<dyn RecordStore>;

// ============================================================================
// In-memory Implementation
// ============================================================================

/// In-memory implementation of RecordStore
///
/// Holds every collection in a `Vec`, preserving insertion order. Useful for
/// tests and for serving without a database.
#[derive(Default)]
pub struct MemoryRecordStore {
    learners: RwLock<Vec<Learner>>,
    mentors: RwLock<Vec<Mentor>>,
    attendance: RwLock<Vec<Attendance>>,
    coding_progress: RwLock<Vec<CodingProgress>>,
    topics: RwLock<Vec<Topic>>,
    tasks: RwLock<Vec<Task>>,
    drives: RwLock<Vec<RecruitingDrive>>,
    unavailable: AtomicBool,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::storage("memory store lock poisoned"))
}

fn push<T>(lock: &RwLock<Vec<T>>, record: T) {
    match lock.write() {
        Ok(mut records) => records.push(record),
        Err(poisoned) => poisoned.into_inner().push(record),
    }
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every query fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::storage("record store unavailable"));
        }
        Ok(())
    }

    pub fn insert_learner(&self, learner: Learner) {
        push(&self.learners, learner);
    }

    pub fn insert_mentor(&self, mentor: Mentor) {
        push(&self.mentors, mentor);
    }

    pub fn insert_attendance(&self, attendance: Attendance) {
        push(&self.attendance, attendance);
    }

    pub fn insert_coding_progress(&self, progress: CodingProgress) {
        push(&self.coding_progress, progress);
    }

    pub fn insert_topic(&self, topic: Topic) {
        push(&self.topics, topic);
    }

    pub fn insert_task(&self, task: Task) {
        push(&self.tasks, task);
    }

    pub fn insert_drive(&self, drive: RecruitingDrive) {
        push(&self.drives, drive);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn topics_taught_in_month(&self, month: u32) -> Result<Vec<TopicWithTasks>> {
        self.check_available()?;
        let topics = read(&self.topics)?;
        let tasks = read(&self.tasks)?;
        let by_id: HashMap<&RecordId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();

        Ok(topics
            .iter()
            .filter(|topic| topic.teaching_date.month() == month)
            .map(|topic| TopicWithTasks {
                id: topic.id.clone(),
                name: topic.name.clone(),
                teaching_date: topic.teaching_date,
                tasks: topic
                    .tasks
                    .iter()
                    .filter_map(|id| by_id.get(id).map(|task| (*task).clone()))
                    .collect(),
                timestamps: topic.timestamps,
            })
            .collect())
    }

    async fn drives_between(&self, window: DateWindow) -> Result<Vec<RecruitingDrive>> {
        self.check_available()?;
        let drives = read(&self.drives)?;

        Ok(drives
            .iter()
            .filter(|drive| window.contains(drive.drive_date))
            .cloned()
            .collect())
    }

    async fn drives_with_attendees(&self) -> Result<Vec<DriveWithAttendees>> {
        self.check_available()?;
        let drives = read(&self.drives)?;
        let learners = read(&self.learners)?;
        let by_id: HashMap<&RecordId, &Learner> = learners.iter().map(|l| (&l.id, l)).collect();

        Ok(drives
            .iter()
            .map(|drive| DriveWithAttendees {
                id: drive.id.clone(),
                company_name: drive.company_name.clone(),
                drive_date: drive.drive_date,
                appeared_students: drive
                    .appeared_students
                    .iter()
                    .filter_map(|id| by_id.get(id).map(|learner| learner.summary()))
                    .collect(),
                timestamps: drive.timestamps,
            })
            .collect())
    }

    async fn coding_progress_for(&self, learner: &RecordId) -> Result<Option<CodingProgress>> {
        self.check_available()?;
        let records = read(&self.coding_progress)?;

        Ok(records.iter().find(|r| &r.user == learner).cloned())
    }

    async fn mentors_with_more_mentees_than(
        &self,
        threshold: u64,
    ) -> Result<Vec<MentorMenteeCount>> {
        self.check_available()?;
        let mentors = read(&self.mentors)?;

        Ok(mentors
            .iter()
            .map(MentorMenteeCount::from)
            .filter(|m| m.mentees_count > threshold)
            .collect())
    }

    async fn absent_learners(&self, window: DateWindow) -> Result<Vec<RecordId>> {
        self.check_available()?;
        let attendance = read(&self.attendance)?;

        Ok(attendance
            .iter()
            .filter(|a| a.status == AttendanceStatus::Absent && window.contains(a.date))
            .map(|a| a.user.clone())
            .collect())
    }

    async fn task_submission_candidates(
        &self,
        window: DateWindow,
    ) -> Result<Vec<TaskSubmission>> {
        self.check_available()?;
        let tasks = read(&self.tasks)?;

        Ok(tasks
            .iter()
            .filter(|task| task.assigned_date <= window.end)
            .filter(|task| match task.submission_date {
                Some(submitted) => window.contains(submitted),
                None => true,
            })
            .map(Task::submission)
            .collect())
    }
}

/// Create a shared in-memory store
pub fn create_memory_store() -> SharedRecordStore {
    Arc::new(MemoryRecordStore::new())
}

// ============================================================================
// Tests
// ============================================================================
