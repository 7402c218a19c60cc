use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::ABSENT_VALUE;

/// Pool configuration of a meet. Short-course-yards meets need their listed
/// distances converted to meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Course {
    /// Long course meters
    Lcm,
    /// Short course meters
    Scm,
    /// Short course yards
    Scy,
}

impl Course {
    pub fn parse(value: &str) -> Option<Course> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LCM" => Some(Course::Lcm),
            "SCM" => Some(Course::Scm),
            "SCY" => Some(Course::Scy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Lcm => "LCM",
            Course::Scm => "SCM",
            Course::Scy => "SCY",
        }
    }

    pub fn is_yards(&self) -> bool {
        matches!(self, Course::Scy)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meet metadata from the file header section.
#[derive(Debug, Clone, PartialEq)]
pub struct Meet {
    pub name: String,
    pub city: String,
    pub nation: String,
    pub course: Course,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub number: u32,
}

/// Swim-style attributes joined onto an event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SwimStyle {
    /// Distance in meters, already unit-converted for yards meets.
    pub distance: f64,
    pub stroke: String,
}

/// One event of a session. `style` is absent when the swim-style join
/// failed; rows for such events are dropped downstream, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    pub event_id: u32,
    pub session: u32,
    pub round: String,
    pub style: Option<SwimStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Club {
    pub code: String,
    pub name: String,
}

/// Identity attributes of one athlete.
#[derive(Debug, Clone, PartialEq)]
pub struct Vitals {
    pub athlete_id: u32,
    pub club: String,
    pub firstname: String,
    pub lastname: String,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub event_id: u32,
    pub entry_time: Option<String>,
    pub heat: Option<String>,
    pub lane: Option<String>,
}

/// One intermediate time of a race, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub distance: f64,
    pub seconds: Option<f64>,
}

/// One finished race of an athlete.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub event_id: u32,
    /// Raw swim time text as written in the file.
    pub swimtime: String,
    /// Elapsed seconds, absent for no-time markers.
    pub seconds: Option<f64>,
    pub splits: Vec<Split>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Athlete {
    pub vitals: Vitals,
    pub entries: Vec<Entry>,
    pub results: Vec<RaceResult>,
}

/// Canonical flat output row. Every parser variant produces this shape.
///
/// Biometric and derived fields are `None` only in include-N/A mode, where
/// they render as the `N/A` sentinel; otherwise rows with unresolved fields
/// are dropped before they get here.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub meet: String,
    pub city: String,
    pub nation: String,
    pub course: String,
    pub event_id: String,
    pub distance: f64,
    pub stroke: String,
    pub round: String,
    pub gender: String,
    pub firstname: String,
    pub lastname: String,
    /// Kept textual: one source falls back to the raw cell when the
    /// birth year is not numeric.
    pub birthyear: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub speed_per_kg: Option<f64>,
    pub speed: Option<f64>,
    pub swimtime: f64,
}

impl ResultRow {
    /// Ordered output fields for the database file.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.meet.clone(),
            self.city.clone(),
            self.nation.clone(),
            self.course.clone(),
            self.event_id.clone(),
            self.distance.to_string(),
            self.stroke.clone(),
            self.round.clone(),
            self.gender.clone(),
            self.firstname.clone(),
            self.lastname.clone(),
            self.birthyear.clone(),
            absent_or(self.height),
            absent_or(self.weight),
            absent_or(self.bmi),
            absent_or(self.speed_per_kg),
            absent_or(self.speed),
            self.swimtime.to_string(),
        ]
    }

    /// Rebuilds a row from a database file record. `None` for records that
    /// are malformed or too short; callers skip those.
    pub fn from_record(record: &csv::StringRecord) -> Option<ResultRow> {
        if record.len() < 18 {
            return None;
        }
        Some(ResultRow {
            meet: record.get(0)?.to_string(),
            city: record.get(1)?.to_string(),
            nation: record.get(2)?.to_string(),
            course: record.get(3)?.to_string(),
            event_id: record.get(4)?.to_string(),
            distance: record.get(5)?.parse().ok()?,
            stroke: record.get(6)?.to_string(),
            round: record.get(7)?.to_string(),
            gender: record.get(8)?.to_string(),
            firstname: record.get(9)?.to_string(),
            lastname: record.get(10)?.to_string(),
            birthyear: record.get(11)?.to_string(),
            height: parse_absent_or(record.get(12)?)?,
            weight: parse_absent_or(record.get(13)?)?,
            bmi: parse_absent_or(record.get(14)?)?,
            speed_per_kg: parse_absent_or(record.get(15)?)?,
            speed: parse_absent_or(record.get(16)?)?,
            swimtime: record.get(17)?.parse().ok()?,
        })
    }
}

fn absent_or(value: Option<f64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => ABSENT_VALUE.to_string(),
    }
}

fn parse_absent_or(text: &str) -> Option<Option<f64>> {
    if text == ABSENT_VALUE {
        return Some(None);
    }
    text.parse().ok().map(Some)
}
