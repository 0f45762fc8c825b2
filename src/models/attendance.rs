use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub enrollment: i64,
    #[serde(default)]
    pub schedule: Option<i64>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub marked_date: Option<String>,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub course_name: Option<String>,
}
