use std::fmt;

use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    /// Every status except `dropped` counts as being enrolled.
    pub fn is_live(self) -> bool {
        !matches!(self, EnrollmentStatus::Dropped)
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRef {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub course: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub student: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub batch: i64,
    /// Derived by the backend from `batch.course`; not every endpoint sends it.
    #[serde(default)]
    pub course: Option<i64>,
    #[serde(default)]
    pub batch_details: Option<BatchRef>,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub enrollment_date: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl Enrollment {
    pub fn course_id(&self) -> Option<i64> {
        self.course
            .or_else(|| self.batch_details.as_ref().map(|b| b.course))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEnrollmentRequest {
    pub batch: i64,
    pub student: i64,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEnrollmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnrollmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}
