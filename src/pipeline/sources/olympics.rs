use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::constants::{OLYMPIC_CITY, OLYMPIC_MEET_NAME};
use crate::domain::{Course, ResultRow};
use crate::error::{PipelineError, Result};
use crate::names;
use crate::pipeline::sorter;
use crate::profiles::ProfileStore;

use super::{olympic_seconds, resolve_biometrics, Extraction, Resolved, ResultSource, SkipCounts};

/// One participant row of the Olympics spreadsheet export.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub event: String,
    pub round: String,
    pub stroke: String,
    pub event_id: u32,
    pub distance: f64,
    pub gender: String,
    pub rank: String,
    pub heat: String,
    pub lane: String,
    pub firstname: String,
    pub lastname: String,
    pub birthyear: String,
    pub nation: String,
    /// Formatted time as written in the sheet.
    pub swimtime: String,
    /// Elapsed seconds from the synthetic column.
    pub seconds: Option<f64>,
}

/// The 2016 Olympics spreadsheet results file.
///
/// One data sheet with one header row; the header's non-empty cell count
/// defines the active columns, and data in trailing columns beyond it is
/// excluded. The rightmost active column holds the swim time, which gets a
/// synthetic elapsed-seconds column appended.
pub struct OlympicsFile {
    path: PathBuf,
    participants: Vec<Participant>,
    parse_skips: SkipCounts,
    profiles: Arc<ProfileStore>,
    with_na: bool,
}

impl OlympicsFile {
    pub fn open(
        path: impl AsRef<Path>,
        profiles: Arc<ProfileStore>,
        with_na: bool,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut workbook: Xlsx<_> = open_workbook(&path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PipelineError::MissingSheet { path: path.clone() })??;
        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(Self::from_grid(path, &grid, profiles, with_na))
    }

    /// Decodes an already-extracted cell grid. The first row is the header.
    pub fn from_grid(
        path: PathBuf,
        grid: &[Vec<String>],
        profiles: Arc<ProfileStore>,
        with_na: bool,
    ) -> Self {
        let mut participants = Vec::new();
        let mut parse_skips = SkipCounts::default();

        let num_cols = grid
            .first()
            .map(|header| header.iter().filter(|cell| !cell.is_empty()).count())
            .unwrap_or(0);

        for row in grid.iter().skip(1) {
            let mut fields: Vec<String> = Vec::with_capacity(num_cols + 1);
            for col in 0..num_cols {
                let cell = row.get(col).map(|c| c.trim().to_string()).unwrap_or_default();
                if col != num_cols - 1 {
                    fields.push(cell);
                } else {
                    // Rightmost active column: append elapsed seconds. A
                    // plain numeric value is duplicated, not converted.
                    let seconds = olympic_seconds(&cell)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| cell.clone());
                    fields.push(cell);
                    fields.push(seconds);
                }
            }
            if fields.len() < 14 {
                parse_skips.incomplete += 1;
                continue;
            }

            let Some((firstname, lastname)) = names::olympic_name(&fields[9]) else {
                parse_skips.unmatched_name += 1;
                continue;
            };
            let (Some(event_id), Some(distance)) =
                (int_value(&fields[3]), int_value(&fields[4]))
            else {
                parse_skips.incomplete += 1;
                continue;
            };

            participants.push(Participant {
                event: fields[0].clone(),
                round: fields[1].clone(),
                stroke: fields[2].clone(),
                event_id: event_id as u32,
                distance: distance as f64,
                gender: fields[5].clone(),
                rank: int_string(&fields[6]),
                heat: fields[7].clone(),
                lane: int_string(&fields[8]),
                birthyear: int_string(&fields[10]),
                nation: fields[11].clone(),
                swimtime: fields[12].clone(),
                seconds: fields[13].parse().ok(),
                firstname,
                lastname,
            });
        }

        Self {
            path,
            participants,
            parse_skips,
            profiles,
            with_na,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Canonical rows for the whole sheet, joined against the profile store
    /// by name only: this format carries no birthdate.
    pub fn results_csv(&self) -> Extraction {
        let mut extraction = Extraction::default();
        extraction.skips.absorb(self.parse_skips);

        for participant in &self.participants {
            let swimtime = match participant.seconds {
                Some(seconds) if seconds > 0.0 => seconds,
                _ => {
                    extraction.skips.no_time += 1;
                    continue;
                }
            };

            let profile =
                self.profiles
                    .lookup(&participant.lastname, &participant.firstname, None);
            let (height, weight, measures) =
                match resolve_biometrics(profile, participant.distance, swimtime, self.with_na) {
                    Resolved::Known {
                        height,
                        weight,
                        measures,
                    } => (Some(height), Some(weight), Some(measures)),
                    Resolved::Absent => (None, None, None),
                    Resolved::Skip => {
                        extraction.skips.no_profile += 1;
                        continue;
                    }
                };

            extraction.rows.push(ResultRow {
                meet: OLYMPIC_MEET_NAME.to_string(),
                city: OLYMPIC_CITY.to_string(),
                nation: participant.nation.clone(),
                course: Course::Lcm.to_string(),
                event_id: participant.event_id.to_string(),
                distance: participant.distance,
                stroke: participant.stroke.clone(),
                round: participant.round.clone(),
                gender: participant.gender.clone(),
                firstname: participant.firstname.clone(),
                lastname: participant.lastname.clone(),
                birthyear: participant.birthyear.clone(),
                height,
                weight,
                bmi: measures.map(|m| m.bmi),
                speed_per_kg: measures.map(|m| m.speed_per_kg),
                speed: measures.map(|m| m.speed),
                swimtime,
            });
        }

        extraction
    }

    /// All rows, sorted. `stage` is accepted for interface symmetry with
    /// the hierarchical parser; this format holds single-round data.
    pub fn allresults_csv(&self, _stage: Option<&str>) -> Extraction {
        let mut extraction = self.results_csv();
        sorter::sort_rows(&mut extraction.rows);
        extraction
    }
}

impl ResultSource for OlympicsFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn extract(&self, stage: Option<&str>) -> Extraction {
        self.allresults_csv(stage)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn int_value(text: &str) -> Option<i64> {
    text.parse::<f64>().ok().map(|value| value.trunc() as i64)
}

/// Numeric cells arrive as floats; render them as integers, keeping the
/// raw text when the cell is not numeric.
fn int_string(text: &str) -> String {
    int_value(text)
        .map(|value| value.to_string())
        .unwrap_or_else(|| text.to_string())
}
