//! Test fixtures for integration tests
//!
//! Builds a small in-memory data set covering every report boundary.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use zenclass::models::{
    Attendance, AttendanceStatus, CodingProgress, Learner, Mentor, RecordId, RecruitingDrive,
    Task, Topic,
};
use zenclass::storage::MemoryRecordStore;

use crate::common::day;

/// Seeded store plus the records tests refer to
pub struct Campus {
    pub store: Arc<MemoryRecordStore>,
    pub asha: Learner,
    pub bala: Learner,
    pub chitra: Learner,
    pub closures_task: Task,
}

impl Campus {
    pub fn seed() -> Self {
        let store = Arc::new(MemoryRecordStore::new());

        let asha = Learner::new("Asha", "Asha@Example.com", day(2020, 8, 1));
        let bala = Learner::new("Bala", "bala@example.com", day(2020, 8, 3));
        let chitra = Learner::new("Chitra", "chitra@example.com", day(2020, 8, 5));
        for learner in [&asha, &bala, &chitra] {
            store.insert_learner(learner.clone());
        }

        // Mentors on both sides of the mentee threshold
        let mut fifteen = Mentor::new("Fifteen Mentees", "fifteen@example.com");
        fifteen.mentees = Some((0..15).map(|_| RecordId::generate()).collect());
        let mut sixteen = Mentor::new("Sixteen Mentees", "sixteen@example.com");
        sixteen.expertise = Some(String::from("Full stack"));
        sixteen.mentees = Some((0..16).map(|_| RecordId::generate()).collect());
        store.insert_mentor(fifteen);
        store.insert_mentor(sixteen);
        store.insert_mentor(Mentor::new("No Mentees", "none@example.com"));

        // Curriculum: October topics in two different years, one September topic
        let closures_task = Task::new("Closures", "Write three closures", day(2019, 10, 2));
        let async_task = Task::new("Async", "Fetch with async/await", day(2021, 10, 6));
        let callbacks_task = Task::new("Callbacks", "Callback hell", day(2020, 9, 20));
        for task in [&closures_task, &async_task, &callbacks_task] {
            store.insert_task(task.clone());
        }
        store.insert_topic(Topic::new(
            "Promises",
            day(2019, 10, 1),
            vec![closures_task.id.clone()],
        ));
        store.insert_topic(Topic::new(
            "Callbacks",
            day(2020, 9, 15),
            vec![callbacks_task.id.clone()],
        ));
        store.insert_topic(Topic::new(
            "Async/Await",
            day(2021, 10, 5),
            vec![async_task.id.clone()],
        ));

        // Drives on and just outside the default window
        let window_start = Utc.with_ymd_and_hms(2020, 10, 15, 0, 0, 0).unwrap();
        let window_end =
            Utc.with_ymd_and_hms(2020, 10, 31, 23, 59, 59).unwrap() + Duration::milliseconds(999);
        store.insert_drive(RecruitingDrive::new(
            "Hooli",
            window_start - Duration::milliseconds(1),
            vec![],
        ));
        store.insert_drive(RecruitingDrive::new(
            "Acme",
            window_start,
            vec![asha.id.clone(), bala.id.clone()],
        ));
        store.insert_drive(RecruitingDrive::new(
            "Globex",
            window_end,
            vec![chitra.id.clone()],
        ));
        store.insert_drive(RecruitingDrive::new("Initech", day(2020, 11, 10), vec![]));

        // Asha absent with nothing submitted, Bala absent but submitted in window
        store.insert_attendance(Attendance::new(
            asha.id.clone(),
            day(2020, 10, 20),
            AttendanceStatus::Absent,
        ));
        store.insert_attendance(Attendance::new(
            bala.id.clone(),
            day(2020, 10, 20),
            AttendanceStatus::Absent,
        ));
        store.insert_attendance(Attendance::new(
            chitra.id.clone(),
            day(2020, 10, 20),
            AttendanceStatus::Present,
        ));
        store.insert_task(
            Task::new("Portfolio", "Publish a portfolio page", day(2020, 10, 16))
                .submitted(day(2020, 10, 25), vec![bala.id.clone()]),
        );

        store.insert_coding_progress(CodingProgress::new(asha.id.clone(), 42));

        Self {
            store,
            asha,
            bala,
            chitra,
            closures_task,
        }
    }
}
