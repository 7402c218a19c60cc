use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use roxmltree::{Document, Node};
use tracing::warn;

use crate::constants::{SUPPORTED_LENEX_VERSIONS, YARDS_PER_METER};
use crate::domain::{
    Athlete, Club, Course, Entry, EventDef, Meet, RaceResult, ResultRow, Session, Split, SwimStyle,
    Vitals,
};
use crate::error::{PipelineError, Result};
use crate::pipeline::sorter;
use crate::profiles::ProfileStore;

use super::{lenex_seconds, resolve_biometrics, Extraction, Resolved, ResultSource};

/// A hierarchical meet results file from a timing vendor.
///
/// The document is walked once into typed records at open time; the
/// version marker is validated first since field positions are
/// version-locked.
#[derive(Debug)]
pub struct LenexFile {
    path: PathBuf,
    meet: Meet,
    sessions: Vec<Session>,
    events: Vec<EventDef>,
    clubs: Vec<Club>,
    athletes: Vec<Athlete>,
    profiles: Arc<ProfileStore>,
    with_na: bool,
}

impl LenexFile {
    pub fn open(
        path: impl AsRef<Path>,
        profiles: Arc<ProfileStore>,
        with_na: bool,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path)?;
        Self::from_text(path, &text, profiles, with_na)
    }

    pub fn from_text(
        path: PathBuf,
        text: &str,
        profiles: Arc<ProfileStore>,
        with_na: bool,
    ) -> Result<Self> {
        let document = Document::parse(text)?;
        let root = document.root_element();
        let lenex = if root.has_tag_name("LENEX") {
            root
        } else {
            root.descendants()
                .find(|node| node.has_tag_name("LENEX"))
                .ok_or_else(|| PipelineError::MissingVersion { path: path.clone() })?
        };

        let version = lenex
            .attribute("version")
            .ok_or_else(|| PipelineError::MissingVersion { path: path.clone() })?
            .trim();
        if !SUPPORTED_LENEX_VERSIONS.contains(&version) {
            return Err(PipelineError::UnsupportedVersion {
                path,
                version: version.to_string(),
            });
        }

        let meet_node = first_child(lenex, "MEETS")
            .and_then(|meets| first_child(meets, "MEET"))
            .ok_or_else(|| PipelineError::MissingField("MEETS/MEET".to_string()))?;
        let meet = parse_meet(meet_node, &path)?;

        let mut sessions = Vec::new();
        let mut events = Vec::new();
        if let Some(sessions_node) = first_child(meet_node, "SESSIONS") {
            for session_node in children(sessions_node, "SESSION") {
                let Some(number) = parse_attr::<u32>(session_node, "number") else {
                    warn!(file = %path.display(), "session without a number, skipping");
                    continue;
                };
                sessions.push(Session { number });
                if let Some(events_node) = first_child(session_node, "EVENTS") {
                    for event_node in children(events_node, "EVENT") {
                        if let Some(event) = parse_event(event_node, number, meet.course) {
                            events.push(event);
                        } else {
                            warn!(file = %path.display(), "event without an id, skipping");
                        }
                    }
                }
            }
        }

        let mut clubs = Vec::new();
        let mut athletes = Vec::new();
        if let Some(clubs_node) = first_child(meet_node, "CLUBS") {
            for club_node in children(clubs_node, "CLUB") {
                let Some(code) = attr(club_node, "code") else {
                    warn!(file = %path.display(), "club without a code, skipping");
                    continue;
                };
                clubs.push(Club {
                    code: code.clone(),
                    name: attr(club_node, "name").unwrap_or_default(),
                });
                if let Some(athletes_node) = first_child(club_node, "ATHLETES") {
                    for athlete_node in children(athletes_node, "ATHLETE") {
                        if let Some(athlete) = parse_athlete(athlete_node, &code) {
                            athletes.push(athlete);
                        } else {
                            warn!(file = %path.display(), "athlete without an id, skipping");
                        }
                    }
                }
            }
        }

        Ok(Self {
            path,
            meet,
            sessions,
            events,
            clubs,
            athletes,
            profiles,
            with_na,
        })
    }

    pub fn meet(&self) -> &Meet {
        &self.meet
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Event definitions, optionally restricted to one round.
    pub fn events(&self, stage: Option<&str>) -> Vec<&EventDef> {
        self.events
            .iter()
            .filter(|event| match stage {
                Some(stage) => event.round.eq_ignore_ascii_case(stage),
                None => true,
            })
            .collect()
    }

    pub fn event(&self, event_id: u32) -> Option<&EventDef> {
        self.events.iter().find(|event| event.event_id == event_id)
    }

    pub fn clubs(&self) -> &[Club] {
        &self.clubs
    }

    pub fn athletes(&self) -> &[Athlete] {
        &self.athletes
    }

    /// Every finished race for one event.
    pub fn results(&self, event_id: u32) -> Vec<(&Vitals, &RaceResult)> {
        self.athletes
            .iter()
            .flat_map(|athlete| {
                athlete
                    .results
                    .iter()
                    .filter(move |result| result.event_id == event_id)
                    .map(move |result| (&athlete.vitals, result))
            })
            .collect()
    }

    /// Canonical rows for one event, joined against the profile store.
    ///
    /// A row is emitted only when every field resolves; profile matching
    /// uses the athlete's birthdate when the file carries one.
    pub fn results_csv(&self, event_id: u32) -> Extraction {
        let mut extraction = Extraction::default();
        let event = self.event(event_id);
        let style = event.and_then(|event| event.style.as_ref());

        for (vitals, result) in self.results(event_id) {
            let swimtime = match result.seconds {
                Some(seconds) if seconds > 0.0 => seconds,
                _ => {
                    extraction.skips.no_time += 1;
                    continue;
                }
            };
            // A failed swim-style join drops the event's rows, never the run.
            let (Some(event), Some(style)) = (event, style) else {
                extraction.skips.incomplete += 1;
                continue;
            };

            let profile =
                self.profiles
                    .lookup(&vitals.lastname, &vitals.firstname, vitals.birthdate);
            let (height, weight, measures) =
                match resolve_biometrics(profile, style.distance, swimtime, self.with_na) {
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

            let Some(birthyear) = vitals.birthdate.map(|date| {
                use chrono::Datelike;
                date.year().to_string()
            }) else {
                extraction.skips.incomplete += 1;
                continue;
            };

            extraction.rows.push(ResultRow {
                meet: self.meet.name.clone(),
                city: self.meet.city.clone(),
                nation: self.meet.nation.clone(),
                course: self.meet.course.to_string(),
                event_id: event.event_id.to_string(),
                distance: style.distance,
                stroke: style.stroke.clone(),
                round: event.round.clone(),
                gender: vitals.gender.clone(),
                firstname: vitals.firstname.clone(),
                lastname: vitals.lastname.clone(),
                birthyear,
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

    /// Rows for every event in ascending event id order, sorted.
    pub fn allresults_csv(&self, stage: Option<&str>) -> Extraction {
        let mut event_ids: Vec<u32> = self
            .events(stage)
            .iter()
            .map(|event| event.event_id)
            .collect();
        event_ids.sort_unstable();

        let mut extraction = Extraction::default();
        for event_id in event_ids {
            extraction.absorb(self.results_csv(event_id));
        }
        sorter::sort_rows(&mut extraction.rows);
        extraction
    }
}

impl ResultSource for LenexFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn extract(&self, stage: Option<&str>) -> Extraction {
        self.allresults_csv(stage)
    }
}

fn parse_meet(node: Node<'_, '_>, path: &Path) -> Result<Meet> {
    let course_text = attr(node, "course")
        .ok_or_else(|| PipelineError::MissingField("MEET/@course".to_string()))?;
    let course = Course::parse(&course_text).unwrap_or_else(|| {
        warn!(file = %path.display(), course = %course_text, "unknown course, assuming LCM");
        Course::Lcm
    });
    Ok(Meet {
        name: attr(node, "name")
            .ok_or_else(|| PipelineError::MissingField("MEET/@name".to_string()))?,
        city: attr(node, "city")
            .ok_or_else(|| PipelineError::MissingField("MEET/@city".to_string()))?,
        nation: attr(node, "nation")
            .ok_or_else(|| PipelineError::MissingField("MEET/@nation".to_string()))?,
        course,
    })
}

fn parse_event(node: Node<'_, '_>, session: u32, course: Course) -> Option<EventDef> {
    let event_id = parse_attr::<u32>(node, "eventid")?;
    let style = first_child(node, "SWIMSTYLE").and_then(|style_node| {
        let mut distance = parse_attr::<f64>(style_node, "distance")?;
        if course.is_yards() {
            distance *= YARDS_PER_METER;
        }
        Some(SwimStyle {
            distance,
            stroke: attr(style_node, "stroke")?,
        })
    });
    Some(EventDef {
        event_id,
        session,
        round: attr(node, "round").unwrap_or_default(),
        style,
    })
}

fn parse_athlete(node: Node<'_, '_>, club_code: &str) -> Option<Athlete> {
    let athlete_id = parse_attr::<u32>(node, "athleteid")?;
    let vitals = Vitals {
        athlete_id,
        club: club_code.to_string(),
        firstname: attr(node, "firstname").unwrap_or_default(),
        lastname: attr(node, "lastname").unwrap_or_default(),
        gender: attr(node, "gender").unwrap_or_default(),
        birthdate: attr(node, "birthdate").and_then(|text| text.parse().ok()),
    };

    let entries = first_child(node, "ENTRIES")
        .map(|entries_node| {
            children(entries_node, "ENTRY")
                .filter_map(|entry_node| {
                    Some(Entry {
                        event_id: parse_attr::<u32>(entry_node, "eventid")?,
                        entry_time: attr(entry_node, "entrytime"),
                        heat: attr(entry_node, "heat"),
                        lane: attr(entry_node, "lane"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let results = first_child(node, "RESULTS")
        .map(|results_node| {
            children(results_node, "RESULT")
                .filter_map(parse_result)
                .collect()
        })
        .unwrap_or_default();

    Some(Athlete {
        vitals,
        entries,
        results,
    })
}

fn parse_result(node: Node<'_, '_>) -> Option<RaceResult> {
    let event_id = parse_attr::<u32>(node, "eventid")?;
    let swimtime = attr(node, "swimtime").unwrap_or_default();
    let seconds = lenex_seconds(&swimtime);

    let splits = first_child(node, "SPLITS")
        .map(|splits_node| {
            children(splits_node, "SPLIT")
                .filter_map(|split_node| {
                    Some(Split {
                        distance: parse_attr::<f64>(split_node, "distance")?,
                        seconds: attr(split_node, "swimtime")
                            .and_then(|text| lenex_seconds(&text)),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(RaceResult {
        event_id,
        swimtime,
        seconds,
        splits,
    })
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.has_tag_name(name))
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(|value| value.trim().to_string())
}

fn parse_attr<T: std::str::FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    node.attribute(name)?.trim().parse().ok()
}
