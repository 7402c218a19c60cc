use std::collections::BTreeMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::constants::DATABASE_DELIMITER;
use crate::domain::ResultRow;
use crate::error::Result;

/// Which extremal time survives deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremal {
    /// Keep the minimum time per superkey (personal bests).
    Fastest,
    /// Keep the maximum time per superkey (anonymized aggregation).
    Slowest,
}

#[derive(Debug, Clone)]
pub struct BestsOptions {
    pub extremal: Extremal,
    /// Case-insensitive course filter; rows of other courses are excluded.
    pub course: Option<String>,
    /// Keep one extremal per event instead of one per athlete by adding an
    /// event discriminator to the superkey.
    pub per_event: bool,
}

impl Default for BestsOptions {
    fn default() -> Self {
        Self {
            extremal: Extremal::Fastest,
            course: None,
            per_event: false,
        }
    }
}

/// Derived measures kept for one grouping slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMeasures {
    pub bmi: f64,
    pub speed_per_kg: f64,
    pub speed: f64,
}

/// Deterministic, order-independent grouping key: a content hash of the
/// row's identity fields. Doubles as the anonymization token for
/// downstream analytics.
pub fn superkey(row: &ResultRow, per_event: bool) -> String {
    let distance = (row.distance.trunc() as i64).to_string();
    let event = if per_event {
        format!(
            "{}{}{}{}{}",
            row.meet, row.city, row.nation, row.course, row.event_id
        )
    } else {
        String::new()
    };

    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{}{}{}{}{}",
            row.firstname, row.lastname, row.stroke, distance, event
        )
        .as_bytes(),
    );
    hex::encode(hasher.finalize())
}

type GenderMap = BTreeMap<String, RowMeasures>;
type DistanceMap = BTreeMap<String, GenderMap>;
type StrokeMap = BTreeMap<String, DistanceMap>;

/// Extremal results per athlete/event grouping, keyed by
/// superkey → stroke → distance → gender.
///
/// Built in two passes: the first tracks the extremal swimtime per
/// superkey, the second keeps only rows whose time equals it. When two rows
/// tie on the extremal time, the later one in iteration order wins the
/// grouping slot; that last-wins behavior is accepted, not an oversight.
#[derive(Debug, Default)]
pub struct PersonalBests {
    groups: BTreeMap<String, StrokeMap>,
}

impl PersonalBests {
    pub fn from_rows(rows: &[ResultRow], options: &BestsOptions) -> Self {
        let eligible = |row: &ResultRow| {
            let course_ok = options
                .course
                .as_deref()
                .map_or(true, |course| row.course.eq_ignore_ascii_case(course));
            // Rows with N/A measures carry nothing worth grouping.
            course_ok && row.bmi.is_some() && row.speed_per_kg.is_some() && row.speed.is_some()
        };

        let mut extremes: BTreeMap<String, f64> = BTreeMap::new();
        for row in rows.iter().filter(|row| eligible(row)) {
            let key = superkey(row, options.per_event);
            extremes
                .entry(key)
                .and_modify(|tracked| {
                    *tracked = match options.extremal {
                        Extremal::Fastest => tracked.min(row.swimtime),
                        Extremal::Slowest => tracked.max(row.swimtime),
                    };
                })
                .or_insert(row.swimtime);
        }

        let mut groups: BTreeMap<String, StrokeMap> = BTreeMap::new();
        for row in rows.iter().filter(|row| eligible(row)) {
            let key = superkey(row, options.per_event);
            if extremes.get(&key) != Some(&row.swimtime) {
                continue;
            }
            let distance = (row.distance.trunc() as i64).to_string();
            groups
                .entry(key)
                .or_default()
                .entry(row.stroke.clone())
                .or_default()
                .entry(distance)
                .or_default()
                .insert(
                    row.gender.clone(),
                    RowMeasures {
                        bmi: row.bmi.unwrap_or_default(),
                        speed_per_kg: row.speed_per_kg.unwrap_or_default(),
                        speed: row.speed.unwrap_or_default(),
                    },
                );
        }

        Self { groups }
    }

    /// Reads a database file written by the build pipeline. Malformed rows
    /// are skipped.
    pub fn from_csv(path: &Path, options: &BestsOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DATABASE_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(row) = ResultRow::from_record(&record) {
                rows.push(row);
            }
        }
        Ok(Self::from_rows(&rows, options))
    }

    /// Superkeys in sorted order.
    pub fn superkeys(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Number of grouping slots.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every grouping slot as (superkey, stroke, distance, gender,
    /// measures), ordered by superkey then stroke/distance/gender.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, &str, RowMeasures)> {
        self.groups.iter().flat_map(|(key, strokes)| {
            strokes.iter().flat_map(move |(stroke, distances)| {
                distances.iter().flat_map(move |(distance, genders)| {
                    genders.iter().map(move |(gender, measures)| {
                        (
                            key.as_str(),
                            stroke.as_str(),
                            distance.as_str(),
                            gender.as_str(),
                            *measures,
                        )
                    })
                })
            })
        })
    }

    /// BMI values ordered by superkey, with optional stroke/distance/gender
    /// filters. The plotting collaborator consumes these.
    pub fn bmi(
        &self,
        stroke: Option<&str>,
        distance: Option<&str>,
        gender: Option<&str>,
    ) -> Vec<f64> {
        self.measurements(stroke, distance, gender, |m| m.bmi)
    }

    pub fn speed(
        &self,
        stroke: Option<&str>,
        distance: Option<&str>,
        gender: Option<&str>,
    ) -> Vec<f64> {
        self.measurements(stroke, distance, gender, |m| m.speed)
    }

    pub fn speed_per_kg(
        &self,
        stroke: Option<&str>,
        distance: Option<&str>,
        gender: Option<&str>,
    ) -> Vec<f64> {
        self.measurements(stroke, distance, gender, |m| m.speed_per_kg)
    }

    fn measurements(
        &self,
        stroke: Option<&str>,
        distance: Option<&str>,
        gender: Option<&str>,
        value: impl Fn(RowMeasures) -> f64,
    ) -> Vec<f64> {
        self.iter()
            .filter(|(_, row_stroke, row_distance, row_gender, _)| {
                stroke.map_or(true, |s| *row_stroke == s)
                    && distance.map_or(true, |d| *row_distance == d)
                    && gender.map_or(true, |g| *row_gender == g)
            })
            .map(|(_, _, _, _, measures)| value(measures))
            .collect()
    }
}
