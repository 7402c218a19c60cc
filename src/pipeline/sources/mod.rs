use std::path::Path;

use crate::domain::ResultRow;
use crate::measures::{self, Measures};
use crate::profiles::Biometrics;

pub mod lenex;
pub mod olympics;

pub use lenex::LenexFile;
pub use olympics::OlympicsFile;

/// Per-record skip accounting. Skips are silent by default but surfaced to
/// the caller for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Empty, zero or unparseable swim time.
    pub no_time: u64,
    /// Name Normalizer could not find a surname boundary.
    pub unmatched_name: u64,
    /// No profile match and include-N/A mode was off.
    pub no_profile: u64,
    /// Some other required field did not resolve.
    pub incomplete: u64,
}

impl SkipCounts {
    pub fn absorb(&mut self, other: SkipCounts) {
        self.no_time += other.no_time;
        self.unmatched_name += other.unmatched_name;
        self.no_profile += other.no_profile;
        self.incomplete += other.incomplete;
    }

    pub fn total(&self) -> u64 {
        self.no_time + self.unmatched_name + self.no_profile + self.incomplete
    }
}

/// Rows extracted from one source plus the records it dropped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub rows: Vec<ResultRow>,
    pub skips: SkipCounts,
}

impl Extraction {
    pub fn absorb(&mut self, other: Extraction) {
        self.rows.extend(other.rows);
        self.skips.absorb(other.skips);
    }
}

/// A meet results file that can be reduced to canonical result rows.
pub trait ResultSource {
    fn path(&self) -> &Path;

    /// All rows of the file, optionally restricted to one round, in
    /// deterministic order.
    fn extract(&self, stage: Option<&str>) -> Extraction;
}

/// Elapsed seconds from an `HH:MM:SS.fff` swim time.
///
/// Values without a colon are taken as literal seconds, a deliberate
/// leniency. Non-numeric markers (NT, DSQ, empty) resolve to no time.
pub(crate) fn lenex_seconds(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.contains(':') {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 3 {
            return None;
        }
        let hours: u32 = parts[0].parse().ok()?;
        let minutes: u32 = parts[1].parse().ok()?;
        let seconds: f64 = parts[2].parse().ok()?;
        Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
    } else {
        text.parse().ok()
    }
}

/// Elapsed seconds from an `MM:SS.fff` spreadsheet time, rounded to three
/// decimals. Plain numeric values pass through unchanged.
pub(crate) fn olympic_seconds(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.contains(':') {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 2 {
            return None;
        }
        let minutes: f64 = parts[0].parse().ok()?;
        let seconds: f64 = parts[1].parse().ok()?;
        Some(((minutes * 60.0 + seconds) * 1e3).round() / 1e3)
    } else {
        text.parse().ok()
    }
}

/// Outcome of joining a participant against the profile store.
pub(crate) enum Resolved {
    /// Profile found: biometrics plus derived measures.
    Known {
        height: f64,
        weight: f64,
        measures: Measures,
    },
    /// No profile, include-N/A mode: emit the row with absent markers.
    Absent,
    /// No profile: drop the row.
    Skip,
}

pub(crate) fn resolve_biometrics(
    profile: Option<Biometrics>,
    distance: f64,
    swimtime: f64,
    with_na: bool,
) -> Resolved {
    match profile {
        Some(biometrics) => Resolved::Known {
            height: biometrics.height,
            weight: biometrics.weight,
            measures: measures::derive(distance, swimtime, biometrics.height, biometrics.weight),
        },
        None if with_na => Resolved::Absent,
        None => Resolved::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenex_time_with_colons() {
        assert_eq!(lenex_seconds("00:01:02.34"), Some(62.34));
        assert_eq!(lenex_seconds("01:00:00.00"), Some(3600.0));
    }

    #[test]
    fn lenex_time_without_colon_is_literal_seconds() {
        assert_eq!(lenex_seconds("59.99"), Some(59.99));
    }

    #[test]
    fn lenex_no_time_markers() {
        assert_eq!(lenex_seconds(""), None);
        assert_eq!(lenex_seconds("NT"), None);
        assert_eq!(lenex_seconds("1:02.34"), None);
    }

    #[test]
    fn olympic_time_minutes_seconds() {
        assert_eq!(olympic_seconds("1:56.32"), Some(116.32));
        assert_eq!(olympic_seconds("0:21.073"), Some(21.073));
    }

    #[test]
    fn olympic_time_plain_number_passes_through() {
        assert_eq!(olympic_seconds("21.07"), Some(21.07));
        assert_eq!(olympic_seconds("DNS"), None);
    }
}
