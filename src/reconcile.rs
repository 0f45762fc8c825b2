use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::models::{Course, Enrollment, EnrollmentStatus, WaitlistEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseState {
    NotEnrolled,
    EnrolledActive,
    EnrolledCompleted,
    Waitlisted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseView {
    pub course: Course,
    pub state: CourseState,
    pub enrollment: Option<Enrollment>,
    pub waitlist: Option<WaitlistEntry>,
}

/// Merge independently fetched collections into one display state per course.
///
/// The lookup tables are rebuilt on every call. A record without a course id
/// is matched on `course_code` instead, since list payloads only carry the
/// code. When two live enrollments map to the same course the later one
/// wins. Dropped enrollments and non-waiting waitlist entries are ignored;
/// an enrollment outranks a waitlist entry. Output keeps the order of
/// `courses`.
pub fn reconcile(
    courses: &[Course],
    enrollments: &[Enrollment],
    waitlists: &[WaitlistEntry],
) -> Vec<CourseView> {
    let by_code: HashMap<&str, i64> = courses
        .iter()
        .filter(|c| !c.code.is_empty())
        .map(|c| (c.code.as_str(), c.id))
        .collect();
    let course_of = |id: Option<i64>, code: Option<&str>| {
        id.or_else(|| code.and_then(|code| by_code.get(code).copied()))
    };

    let mut by_course: HashMap<i64, &Enrollment> = HashMap::new();
    for enrollment in enrollments.iter().filter(|e| e.status.is_live()) {
        match course_of(enrollment.course_id(), enrollment.course_code.as_deref()) {
            Some(course_id) => {
                by_course.insert(course_id, enrollment);
            }
            None => debug!("enrollment {} has no course reference, skipped", enrollment.id),
        }
    }

    let mut waiting: HashMap<i64, &WaitlistEntry> = HashMap::new();
    for entry in waitlists.iter().filter(|w| w.is_waiting()) {
        match course_of(entry.course, entry.course_code.as_deref()) {
            Some(course_id) => {
                waiting.insert(course_id, entry);
            }
            None => debug!("waitlist entry {} has no course reference, skipped", entry.id),
        }
    }

    courses
        .iter()
        .map(|course| {
            let enrollment = by_course.get(&course.id).copied();
            let waitlist = waiting.get(&course.id).copied();

            let state = match (enrollment, waitlist) {
                (Some(e), _) if e.status == EnrollmentStatus::Completed => {
                    CourseState::EnrolledCompleted
                }
                (Some(_), _) => CourseState::EnrolledActive,
                (None, Some(_)) => CourseState::Waitlisted,
                (None, None) => CourseState::NotEnrolled,
            };

            CourseView {
                course: course.clone(),
                state,
                enrollment: enrollment.cloned(),
                waitlist: if enrollment.is_none() {
                    waitlist.cloned()
                } else {
                    None
                },
            }
        })
        .collect()
}
