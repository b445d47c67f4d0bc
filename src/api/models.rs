//! Request parameter shapes and identifiers
//!
//! Response bodies are passed through as [`serde_json::Value`]; only the
//! shapes the console *sends* are typed here. Each operation takes exactly
//! one of these structures.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Opaque backend identifier.
///
/// The backend issues numeric ids; the console never does arithmetic on
/// them, so they are held as text and written back as numbers when they
/// look like one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accept a JSON string or integer
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Id(s.clone())),
            Value::Number(n) => Some(Id(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id(n.to_string())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Id::from(s))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only canonical integers go out as numbers; "007" stays text
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Id::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a string or integer id"))
    }
}

/// Lifecycle of a student record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

impl StudentStatus {
    /// INACTIVE -> ACTIVE
    pub fn activate(self) -> Self {
        StudentStatus::Active
    }

    /// ACTIVE -> INACTIVE
    pub fn deactivate(self) -> Self {
        StudentStatus::Inactive
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "ACTIVE",
            StudentStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream fixed for every class below the senior levels
pub const FOUNDATION_STREAM: &str = "Foundation";

/// Whether the stream selector applies to a class level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChoice {
    /// Senior classes pick a stream (science, commerce, ...)
    Selectable,
    /// Every other class is on a fixed stream
    Fixed(&'static str),
}

impl StreamChoice {
    pub fn for_class_level(level: &str) -> Self {
        match level.trim() {
            "11" | "12" => StreamChoice::Selectable,
            _ => StreamChoice::Fixed(FOUNDATION_STREAM),
        }
    }

    pub fn shows_selector(&self) -> bool {
        matches!(self, StreamChoice::Selectable)
    }
}

/// Payload for creating a student
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_level_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<Id>,
    /// New students start ACTIVE unless the caller says otherwise
    #[serde(default)]
    pub status: StudentStatus,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, roll_no: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_no: roll_no.into(),
            ..Default::default()
        }
    }
}

/// Fields to change on an existing student; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Id>,
}

impl StudentUpdate {
    /// Change the class level and derive stream/board from it once.
    ///
    /// Senior levels clear stream and board so the caller picks them;
    /// other levels pin the fixed stream and clear the board.
    pub fn with_class_level(mut self, level: impl Into<String>) -> Self {
        let level = level.into();
        match StreamChoice::for_class_level(&level) {
            StreamChoice::Selectable => {
                self.stream = Some(String::new());
            }
            StreamChoice::Fixed(stream) => {
                self.stream = Some(stream.to_string());
            }
        }
        self.board = Some(String::new());
        self.class_level = Some(level);
        self
    }

    /// Pick a stream after the class level has been chosen
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &StudentUpdate::default()
    }
}

/// Batch create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Id>,
}

/// Subject create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for attaching a subject to a batch
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubjectLink<'a> {
    pub subject_id: &'a Id,
}

/// Per-student mark within an attendance sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: Id,
    pub status: AttendanceMark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceMark {
    Present,
    Absent,
    Late,
}

impl std::str::FromStr for AttendanceMark {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceMark::Present),
            "absent" | "a" => Ok(AttendanceMark::Absent),
            "late" | "l" => Ok(AttendanceMark::Late),
            other => Err(crate::error::Error::Other(format!(
                "Unknown attendance mark: {}",
                other
            ))),
        }
    }
}

/// One batch/subject/day of attendance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSheet {
    pub batch_id: Id,
    pub subject_id: Id,
    pub attendance_date: NaiveDate,
    pub attendance_details: Vec<AttendanceEntry>,
}

/// Filter for attendance on a single day
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceQuery {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Id>,
}

impl AttendanceQuery {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            batch_id: None,
            subject_id: None,
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Range where either bound may be left open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Editable institute fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
