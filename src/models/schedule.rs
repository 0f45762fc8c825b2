use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub batch: i64,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_string_or_number")]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub day_display: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
}
