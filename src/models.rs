// Core data structures for the zenclass reporting API

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::normalize_email;

/// Identifier of a stored record (24 lowercase hex digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Parse a structurally valid identifier
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(Error::invalid_input(format!("Invalid record id: {raw}")))
        }
    }

    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(bson::oid::ObjectId::new().to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<bson::oid::ObjectId> for RecordId {
    fn from(oid: bson::oid::ObjectId) -> Self {
        Self(oid.to_hex())
    }
}

impl std::str::FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Date windows
// ============================================================================

/// Inclusive UTC date-time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The reporting window used when no range is supplied:
    /// 2020-10-15T00:00:00.000Z ..= 2020-10-31T23:59:59.999Z
    pub fn reporting_default() -> Self {
        let start = Utc.with_ymd_and_hms(2020, 10, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 10, 31, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Creation and update timestamps maintained by the writer of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::millis_opt"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::millis_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Enumerations
// ============================================================================

/// Attendance status for a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

/// Task lifecycle status, shared by every submitter of the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Submitted,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Bootcamp participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Learner {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(with = "crate::utils::millis")]
    pub enrollment_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<RecordId>,
    #[serde(default)]
    pub tasks_submitted: Vec<RecordId>,
    #[serde(default)]
    pub attendance_records: Vec<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codekata_record: Option<RecordId>,
    #[serde(default)]
    pub placement_status: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Learner {
    /// Create a learner with a generated id and normalized email
    pub fn new(name: impl Into<String>, email: &str, enrollment_date: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            enrollment_date,
            mentor: None,
            tasks_submitted: Vec::new(),
            attendance_records: Vec::new(),
            codekata_record: None,
            placement_status: false,
            timestamps: Timestamps::default(),
        }
    }

    /// Reduced projection used when expanding drive attendees
    pub fn summary(&self) -> LearnerSummary {
        LearnerSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            enrollment_date: self.enrollment_date,
        }
    }
}

/// Learner projection: name, email and enrollment date only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSummary {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(with = "crate::utils::millis")]
    pub enrollment_date: DateTime<Utc>,
}

/// Mentor with an optional list of mentees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentees: Option<Vec<RecordId>>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Mentor {
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            expertise: None,
            mentees: None,
            timestamps: Timestamps::default(),
        }
    }

    /// Number of mentees; a missing list counts as zero
    pub fn mentees_count(&self) -> usize {
        self.mentees.as_ref().map_or(0, Vec::len)
    }
}

/// Mentor projection with the computed mentee count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorMenteeCount {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    pub mentees_count: u64,
}

impl From<&Mentor> for MentorMenteeCount {
    fn from(mentor: &Mentor) -> Self {
        Self {
            id: mentor.id.clone(),
            name: mentor.name.clone(),
            email: mentor.email.clone(),
            expertise: mentor.expertise.clone(),
            mentees_count: mentor.mentees_count() as u64,
        }
    }
}

/// One attendance mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub user: RecordId,
    #[serde(with = "crate::utils::millis")]
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Attendance {
    pub fn new(user: RecordId, date: DateTime<Utc>, status: AttendanceStatus) -> Self {
        Self {
            id: RecordId::generate(),
            user,
            date,
            status,
            timestamps: Timestamps::default(),
        }
    }
}

/// A solved coding-practice problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    pub problem_id: String,
    #[serde(with = "crate::utils::millis")]
    pub solved_date: DateTime<Utc>,
}

/// Solved-problem count as stored
///
/// Usually a whole number, but documents written by other tools may hold a
/// double. Whole values serialize as integers, anything else as stored.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ProblemTally(f64);

impl ProblemTally {
    /// Negative and NaN values count as zero
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<u64> for ProblemTally {
    fn from(count: u64) -> Self {
        Self(count as f64)
    }
}

impl Serialize for ProblemTally {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0 <= u64::MAX as f64 {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ProblemTally {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// Per-learner coding-practice tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingProgress {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub user: RecordId,
    #[serde(default)]
    pub problems_solved: ProblemTally,
    #[serde(default)]
    pub problem_details: Vec<ProblemDetail>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl CodingProgress {
    pub fn new(user: RecordId, problems_solved: u64) -> Self {
        Self {
            id: RecordId::generate(),
            user,
            problems_solved: ProblemTally::from(problems_solved),
            problem_details: Vec::new(),
            timestamps: Timestamps::default(),
        }
    }
}

/// Curriculum task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub title: String,
    pub description: String,
    #[serde(with = "crate::utils::millis")]
    pub assigned_date: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::millis_opt"
    )]
    pub submission_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_by: Vec<RecordId>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        assigned_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            title: title.into(),
            description: description.into(),
            assigned_date,
            submission_date: None,
            submitted_by: Vec::new(),
            status: TaskStatus::Pending,
            timestamps: Timestamps::default(),
        }
    }

    /// Mark the task submitted on `date` by `learners`
    pub fn submitted(mut self, date: DateTime<Utc>, learners: Vec<RecordId>) -> Self {
        self.submission_date = Some(date);
        self.submitted_by = learners;
        self.status = TaskStatus::Submitted;
        self
    }

    /// Reduced projection used by the absence report
    pub fn submission(&self) -> TaskSubmission {
        TaskSubmission {
            id: self.id.clone(),
            submitted_by: self.submitted_by.clone(),
            status: self.status,
        }
    }
}

/// Task projection: submitters and status
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSubmission {
    pub id: RecordId,
    pub submitted_by: Vec<RecordId>,
    pub status: TaskStatus,
}

/// Curriculum topic referencing its tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(with = "crate::utils::millis")]
    pub teaching_date: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<RecordId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Topic {
    pub fn new(name: impl Into<String>, teaching_date: DateTime<Utc>, tasks: Vec<RecordId>) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
            teaching_date,
            tasks,
            timestamps: Timestamps::default(),
        }
    }
}

/// Topic with its task references expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicWithTasks {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(with = "crate::utils::millis")]
    pub teaching_date: DateTime<Utc>,
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Company hiring event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitingDrive {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub company_name: String,
    #[serde(with = "crate::utils::millis")]
    pub drive_date: DateTime<Utc>,
    #[serde(default)]
    pub appeared_students: Vec<RecordId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl RecruitingDrive {
    pub fn new(
        company_name: impl Into<String>,
        drive_date: DateTime<Utc>,
        appeared_students: Vec<RecordId>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            company_name: company_name.into().trim().to_string(),
            drive_date,
            appeared_students,
            timestamps: Timestamps::default(),
        }
    }
}

/// Drive with attendee references expanded to learner summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveWithAttendees {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub company_name: String,
    #[serde(with = "crate::utils::millis")]
    pub drive_date: DateTime<Utc>,
    pub appeared_students: Vec<LearnerSummary>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
