use serde::{Deserialize, Serialize};

use super::wire;

/// One offering of a course with finite capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    #[serde(deserialize_with = "wire::id_or_object")]
    pub course: i64,
    #[serde(default)]
    pub available_seats: i64,
    #[serde(default, deserialize_with = "wire::opt_string_or_number")]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub enrolled_count: Option<i64>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Batch {
    pub fn has_capacity(&self) -> bool {
        self.available_seats > 0
    }
}
