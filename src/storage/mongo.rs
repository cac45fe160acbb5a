//! MongoDB implementation of the record store
//!
//! Collection names match the ones created by the admin tooling that writes
//! the data (`users`, `mentors`, `attendances`, `codekatas`, `topics`,
//! `tasks`, `companydrives`).

use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::models::{
    CodingProgress, DateWindow, DriveWithAttendees, LearnerSummary, MentorMenteeCount,
    ProblemDetail, ProblemTally, RecordId, RecruitingDrive, Task, TaskStatus, TaskSubmission,
    Timestamps, TopicWithTasks,
};

use super::repository::RecordStore;

pub const USERS: &str = "users";
pub const MENTORS: &str = "mentors";
pub const ATTENDANCES: &str = "attendances";
pub const CODEKATAS: &str = "codekatas";
pub const TOPICS: &str = "topics";
pub const TASKS: &str = "tasks";
pub const COMPANY_DRIVES: &str = "companydrives";

// ============================================================================
// Stored document shapes
// ============================================================================

fn timestamps(created_at: Option<bson::DateTime>, updated_at: Option<bson::DateTime>) -> Timestamps {
    Timestamps {
        created_at: created_at.map(bson::DateTime::to_chrono),
        updated_at: updated_at.map(bson::DateTime::to_chrono),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    teaching_date: bson::DateTime,
    #[serde(default)]
    tasks: Vec<ObjectId>,
    #[serde(default)]
    created_at: Option<bson::DateTime>,
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    assigned_date: bson::DateTime,
    #[serde(default)]
    submission_date: Option<bson::DateTime>,
    #[serde(default)]
    submitted_by: Vec<ObjectId>,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    created_at: Option<bson::DateTime>,
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

impl From<TaskDocument> for Task {
    fn from(doc: TaskDocument) -> Self {
        Self {
            id: doc.id.into(),
            title: doc.title,
            description: doc.description,
            assigned_date: doc.assigned_date.to_chrono(),
            submission_date: doc.submission_date.map(bson::DateTime::to_chrono),
            submitted_by: doc.submitted_by.into_iter().map(RecordId::from).collect(),
            status: doc.status,
            timestamps: timestamps(doc.created_at, doc.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskSubmissionDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    submitted_by: Vec<ObjectId>,
    #[serde(default)]
    status: TaskStatus,
}

impl From<TaskSubmissionDocument> for TaskSubmission {
    fn from(doc: TaskSubmissionDocument) -> Self {
        Self {
            id: doc.id.into(),
            submitted_by: doc.submitted_by.into_iter().map(RecordId::from).collect(),
            status: doc.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    company_name: String,
    drive_date: bson::DateTime,
    #[serde(default)]
    appeared_students: Vec<ObjectId>,
    #[serde(default)]
    created_at: Option<bson::DateTime>,
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

impl From<DriveDocument> for RecruitingDrive {
    fn from(doc: DriveDocument) -> Self {
        Self {
            id: doc.id.into(),
            company_name: doc.company_name,
            drive_date: doc.drive_date.to_chrono(),
            appeared_students: doc.appeared_students.into_iter().map(RecordId::from).collect(),
            timestamps: timestamps(doc.created_at, doc.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearnerSummaryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    enrollment_date: bson::DateTime,
}

impl From<LearnerSummaryDocument> for LearnerSummary {
    fn from(doc: LearnerSummaryDocument) -> Self {
        Self {
            id: doc.id.into(),
            name: doc.name,
            email: doc.email,
            enrollment_date: doc.enrollment_date.to_chrono(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemDetailDocument {
    problem_id: String,
    solved_date: bson::DateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodekataDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    user: ObjectId,
    #[serde(default)]
    problems_solved: Option<Bson>,
    #[serde(default)]
    problem_details: Vec<ProblemDetailDocument>,
    #[serde(default)]
    created_at: Option<bson::DateTime>,
    #[serde(default)]
    updated_at: Option<bson::DateTime>,
}

/// Numeric fields may be stored as int32, int64 or double
fn count_from_bson(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Double(n)) if *n > 0.0 => *n as u64,
        _ => 0,
    }
}

/// Solved count as stored, doubles kept unrounded
fn tally_from_bson(value: Option<&Bson>) -> ProblemTally {
    match value {
        Some(Bson::Double(n)) => ProblemTally::new(*n),
        other => ProblemTally::from(count_from_bson(other)),
    }
}

impl From<CodekataDocument> for CodingProgress {
    fn from(doc: CodekataDocument) -> Self {
        Self {
            id: doc.id.into(),
            user: doc.user.into(),
            problems_solved: tally_from_bson(doc.problems_solved.as_ref()),
            problem_details: doc
                .problem_details
                .into_iter()
                .map(|d| ProblemDetail {
                    problem_id: d.problem_id,
                    solved_date: d.solved_date.to_chrono(),
                })
                .collect(),
            timestamps: timestamps(doc.created_at, doc.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MentorCountDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    #[serde(default)]
    expertise: Option<String>,
    mentees_count: Bson,
}

impl From<MentorCountDocument> for MentorMenteeCount {
    fn from(doc: MentorCountDocument) -> Self {
        Self {
            id: doc.id.into(),
            name: doc.name,
            email: doc.email,
            expertise: doc.expertise,
            mentees_count: count_from_bson(Some(&doc.mentees_count)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttendanceUserDocument {
    user: ObjectId,
}

fn object_id(id: &RecordId) -> Result<ObjectId> {
    ObjectId::parse_str(id.as_str())
        .map_err(|e| Error::invalid_input(format!("Invalid record id {id}: {e}")))
}

fn window_filter(window: DateWindow) -> Document {
    doc! {
        "$gte": bson::DateTime::from_chrono(window.start),
        "$lte": bson::DateTime::from_chrono(window.end),
    }
}

// ============================================================================
// MongoDB Record Store
// ============================================================================

/// Record store backed by a MongoDB database
#[derive(Clone)]
pub struct MongoRecordStore {
    client: Client,
    db: Database,
}

impl MongoRecordStore {
    /// Connect and verify the server answers a `ping`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database_name));

        db.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database = %db.name(), "MongoDB connected successfully");
        Ok(Self { client, db })
    }

    /// Underlying client, for shutdown
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    async fn find_all<T>(
        &self,
        name: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        let collection = self.collection::<T>(name);
        let mut find = collection.find(filter);
        if let Some(projection) = projection {
            find = find.projection(projection);
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    /// Create the unique and secondary indexes the reports rely on
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        let plan: [(&str, Vec<IndexModel>); 7] = [
            (
                USERS,
                vec![
                    IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build(),
                    IndexModel::builder().keys(doc! { "mentor": 1 }).build(),
                ],
            ),
            (
                MENTORS,
                vec![IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build()],
            ),
            (
                CODEKATAS,
                vec![IndexModel::builder().keys(doc! { "user": 1 }).options(unique()).build()],
            ),
            (
                ATTENDANCES,
                vec![
                    IndexModel::builder().keys(doc! { "user": 1 }).build(),
                    IndexModel::builder().keys(doc! { "date": 1 }).build(),
                ],
            ),
            (TOPICS, vec![IndexModel::builder().keys(doc! { "teachingDate": 1 }).build()]),
            (TASKS, vec![IndexModel::builder().keys(doc! { "assignedDate": 1 }).build()]),
            (
                COMPANY_DRIVES,
                vec![IndexModel::builder().keys(doc! { "driveDate": 1 }).build()],
            ),
        ];

        for (name, indexes) in plan {
            let created = self.collection::<Document>(name).create_indexes(indexes).await?;
            tracing::debug!(collection = name, indexes = ?created.index_names, "Indexes ensured");
        }

        tracing::info!("Collection indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn topics_taught_in_month(&self, month: u32) -> Result<Vec<TopicWithTasks>> {
        let month = i32::try_from(month).map_err(|_| Error::invalid_input("month out of range"))?;
        let filter = doc! {
            "$expr": { "$eq": [ { "$month": "$teachingDate" }, month ] }
        };
        let topics: Vec<TopicDocument> = self.find_all(TOPICS, filter, None).await?;

        let task_ids: Vec<ObjectId> = topics.iter().flat_map(|t| t.tasks.iter().copied()).collect();
        let mut tasks: HashMap<ObjectId, Task> = HashMap::new();
        if !task_ids.is_empty() {
            let found: Vec<TaskDocument> = self
                .find_all(TASKS, doc! { "_id": { "$in": task_ids } }, None)
                .await?;
            tasks.extend(found.into_iter().map(|t| (t.id, Task::from(t))));
        }

        Ok(topics
            .into_iter()
            .map(|topic| TopicWithTasks {
                id: topic.id.into(),
                name: topic.name,
                teaching_date: topic.teaching_date.to_chrono(),
                tasks: topic.tasks.iter().filter_map(|id| tasks.get(id).cloned()).collect(),
                timestamps: timestamps(topic.created_at, topic.updated_at),
            })
            .collect())
    }

    async fn drives_between(&self, window: DateWindow) -> Result<Vec<RecruitingDrive>> {
        let drives: Vec<DriveDocument> = self
            .find_all(COMPANY_DRIVES, doc! { "driveDate": window_filter(window) }, None)
            .await?;
        Ok(drives.into_iter().map(RecruitingDrive::from).collect())
    }

    async fn drives_with_attendees(&self) -> Result<Vec<DriveWithAttendees>> {
        let drives: Vec<DriveDocument> = self.find_all(COMPANY_DRIVES, doc! {}, None).await?;

        let learner_ids: Vec<ObjectId> = drives
            .iter()
            .flat_map(|d| d.appeared_students.iter().copied())
            .collect();
        let mut learners: HashMap<ObjectId, LearnerSummary> = HashMap::new();
        if !learner_ids.is_empty() {
            let found: Vec<LearnerSummaryDocument> = self
                .find_all(
                    USERS,
                    doc! { "_id": { "$in": learner_ids } },
                    Some(doc! { "name": 1, "email": 1, "enrollmentDate": 1 }),
                )
                .await?;
            learners.extend(found.into_iter().map(|l| (l.id, LearnerSummary::from(l))));
        }

        Ok(drives
            .into_iter()
            .map(|drive| DriveWithAttendees {
                id: drive.id.into(),
                company_name: drive.company_name,
                drive_date: drive.drive_date.to_chrono(),
                appeared_students: drive
                    .appeared_students
                    .iter()
                    .filter_map(|id| learners.get(id).cloned())
                    .collect(),
                timestamps: timestamps(drive.created_at, drive.updated_at),
            })
            .collect())
    }

    async fn coding_progress_for(&self, learner: &RecordId) -> Result<Option<CodingProgress>> {
        let record = self
            .collection::<CodekataDocument>(CODEKATAS)
            .find_one(doc! { "user": object_id(learner)? })
            .await?;
        Ok(record.map(CodingProgress::from))
    }

    async fn mentors_with_more_mentees_than(
        &self,
        threshold: u64,
    ) -> Result<Vec<MentorMenteeCount>> {
        let threshold = i64::try_from(threshold).unwrap_or(i64::MAX);
        let pipeline = vec![
            doc! {
                "$project": {
                    "name": 1,
                    "email": 1,
                    "expertise": 1,
                    "menteesCount": { "$size": { "$ifNull": [ "$mentees", [] ] } },
                }
            },
            doc! { "$match": { "menteesCount": { "$gt": threshold } } },
        ];

        let documents: Vec<Document> = self
            .collection::<Document>(MENTORS)
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|d| Ok(bson::from_document::<MentorCountDocument>(d)?.into()))
            .collect()
    }

    async fn absent_learners(&self, window: DateWindow) -> Result<Vec<RecordId>> {
        let records: Vec<AttendanceUserDocument> = self
            .find_all(
                ATTENDANCES,
                doc! { "status": "absent", "date": window_filter(window) },
                Some(doc! { "user": 1 }),
            )
            .await?;
        Ok(records.into_iter().map(|r| r.user.into()).collect())
    }

    async fn task_submission_candidates(
        &self,
        window: DateWindow,
    ) -> Result<Vec<TaskSubmission>> {
        let filter = doc! {
            "assignedDate": { "$lte": bson::DateTime::from_chrono(window.end) },
            "$or": [
                { "submissionDate": window_filter(window) },
                { "submissionDate": Bson::Null },
            ],
        };
        let tasks: Vec<TaskSubmissionDocument> = self
            .find_all(
                TASKS,
                filter,
                Some(doc! { "_id": 1, "submittedBy": 1, "status": 1 }),
            )
            .await?;
        Ok(tasks.into_iter().map(TaskSubmission::from).collect())
    }
}
