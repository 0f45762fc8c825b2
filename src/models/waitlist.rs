use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    Waiting,
    Enrolled,
    Cancelled,
    Expired,
}

/// Position is assigned and owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub student: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub batch: i64,
    #[serde(default)]
    pub position: Option<u32>,
    pub status: WaitlistStatus,
    #[serde(default)]
    pub course: Option<i64>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string_or_number")]
    pub batch_number: Option<String>,
    #[serde(default, alias = "joined_date")]
    pub created_at: Option<String>,
}

impl WaitlistEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == WaitlistStatus::Waiting
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinWaitlistRequest {
    pub batch: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistPosition {
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub total_waiting: Option<u32>,
    #[serde(default)]
    pub status: Option<WaitlistStatus>,
}
