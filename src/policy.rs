//! Prerequisite and schedule-conflict advisories.
//!
//! The backend decides the enforcement mode per course or batch; this
//! module only turns its verdicts into banners and gates the enroll action
//! when a strict policy has violations.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    Strict,
    #[default]
    Advisory,
}

impl Enforcement {
    /// Only the exact literal `strict` blocks; any other value, including
    /// other casings, is advisory.
    pub fn from_mode(mode: &str) -> Self {
        if mode == "strict" {
            Enforcement::Strict
        } else {
            Enforcement::Advisory
        }
    }

    pub fn is_strict(self) -> bool {
        self == Enforcement::Strict
    }
}

impl<'de> Deserialize<'de> for Enforcement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Enforcement::Advisory, Enforcement::from_mode))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    #[serde(default)]
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
}

impl fmt::Display for ScheduleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start_time, self.end_time)?;
        match (&self.room, &self.building) {
            (Some(room), Some(building)) => write!(f, " @ {room}, {building}"),
            (Some(room), None) => write!(f, " @ {room}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub existing_schedule: ScheduleSlot,
    pub new_schedule: ScheduleSlot,
    #[serde(default)]
    pub conflict_description: String,
    #[serde(default)]
    pub existing_course: Option<String>,
    #[serde(default)]
    pub existing_course_code: Option<String>,
    #[serde(default)]
    pub new_course: Option<String>,
    #[serde(default)]
    pub new_course_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub items: Vec<String>,
    pub footnote: Option<String>,
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        writeln!(f, "[{tag}] {}", self.title)?;
        writeln!(f, "{}", self.message)?;
        for item in &self.items {
            writeln!(f, "  - {item}")?;
        }
        if let Some(note) = &self.footnote {
            writeln!(f, "{note}")?;
        }
        Ok(())
    }
}

fn severity(mode: Enforcement) -> Severity {
    if mode.is_strict() {
        Severity::Error
    } else {
        Severity::Warning
    }
}

/// One status line per prerequisite.
pub fn prerequisite_lines(prerequisites: &[Prerequisite]) -> Vec<String> {
    if prerequisites.is_empty() {
        return vec!["No prerequisites required for this course.".to_string()];
    }

    prerequisites
        .iter()
        .map(|p| {
            let status = if p.completed {
                match &p.grade {
                    Some(grade) => format!("Completed (Grade: {grade})"),
                    None => "Completed".to_string(),
                }
            } else {
                "Not completed".to_string()
            };
            format!("{} - {}: {}", p.code, p.name, status)
        })
        .collect()
}

pub fn missing_prerequisites(prerequisites: &[Prerequisite]) -> Vec<Prerequisite> {
    prerequisites
        .iter()
        .filter(|p| !p.completed)
        .cloned()
        .collect()
}

pub fn prerequisite_banner(missing: &[Prerequisite], mode: Enforcement) -> Option<Banner> {
    if missing.is_empty() {
        return None;
    }

    let (title, message) = if mode.is_strict() {
        (
            "Prerequisites Not Met",
            "You must complete the following courses before enrolling:",
        )
    } else {
        (
            "Prerequisite Warning",
            "It is recommended to complete the following courses first:",
        )
    };

    Some(Banner {
        severity: severity(mode),
        title: title.to_string(),
        message: message.to_string(),
        items: missing
            .iter()
            .map(|p| format!("{} - {}", p.code, p.name))
            .collect(),
        footnote: None,
    })
}

pub fn conflict_banner(conflicts: &[ScheduleConflict], mode: Enforcement) -> Option<Banner> {
    if conflicts.is_empty() {
        return None;
    }

    let count = conflicts.len();
    let (title, message, footnote) = if mode.is_strict() {
        (
            "Schedule Conflict - Cannot Enroll",
            format!("Found {count} schedule conflict(s). You cannot enroll in this batch."),
            None,
        )
    } else {
        (
            "Schedule Conflict Warning",
            format!(
                "Found {count} schedule conflict(s). Enrollment is allowed but not recommended."
            ),
            Some(
                "Proceeding with conflicting schedules may affect your ability to attend all classes."
                    .to_string(),
            ),
        )
    };

    let items = conflicts
        .iter()
        .map(|c| {
            format!(
                "{} | current {}: {} | new {}: {}",
                c.conflict_description,
                c.existing_course_code.as_deref().unwrap_or("?"),
                c.existing_schedule,
                c.new_course_code.as_deref().unwrap_or("?"),
                c.new_schedule
            )
        })
        .collect();

    Some(Banner {
        severity: severity(mode),
        title: title.to_string(),
        message,
        items,
        footnote,
    })
}

/// Whether the enroll action is available, plus the banners to show.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollGate {
    pub allowed: bool,
    pub banners: Vec<Banner>,
}

impl EnrollGate {
    pub fn evaluate(
        prerequisites: &[Prerequisite],
        prerequisite_mode: Enforcement,
        conflicts: &[ScheduleConflict],
        conflict_mode: Enforcement,
    ) -> Self {
        let missing = missing_prerequisites(prerequisites);

        let blocked = (prerequisite_mode.is_strict() && !missing.is_empty())
            || (conflict_mode.is_strict() && !conflicts.is_empty());

        let banners = [
            prerequisite_banner(&missing, prerequisite_mode),
            conflict_banner(conflicts, conflict_mode),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            allowed: !blocked,
            banners,
        }
    }
}

/// Policy verdicts as the backend sends them for one course/batch pair.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnrollmentPolicy {
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    #[serde(default, alias = "enforcement")]
    pub prerequisite_enforcement: Enforcement,
    #[serde(default)]
    pub conflicts: Vec<ScheduleConflict>,
    #[serde(default, alias = "checking_mode")]
    pub conflict_checking_mode: Enforcement,
}

impl EnrollmentPolicy {
    pub fn gate(&self) -> EnrollGate {
        EnrollGate::evaluate(
            &self.prerequisites,
            self.prerequisite_enforcement,
            &self.conflicts,
            self.conflict_checking_mode,
        )
    }
}
