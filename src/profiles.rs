use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// One athlete biometric record as supplied by the profile ingestion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub firstname: String,
    pub lastname: String,
    pub height: f64,
    pub weight: f64,
    pub birthdate: NaiveDate,
}

/// On-disk shape of a profile file: `{"data": [record, ...]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub data: Vec<ProfileRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biometrics {
    pub height: f64,
    pub weight: f64,
}

/// Read-only lookup of athlete biometrics keyed by
/// lastname → firstname → birthdate.
///
/// Built once per run, then shared immutably across workers. Several
/// profiles may share a name with different birthdates; a lookup without a
/// birthdate falls back to the first entry in birthdate order.
#[derive(Debug, Default, Clone)]
pub struct ProfileStore {
    athletes: BTreeMap<String, BTreeMap<String, BTreeMap<NaiveDate, Biometrics>>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ProfileRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&mut self, record: ProfileRecord) {
        self.athletes
            .entry(record.lastname)
            .or_default()
            .entry(record.firstname)
            .or_default()
            .insert(
                record.birthdate,
                Biometrics {
                    height: record.height,
                    weight: record.weight,
                },
            );
    }

    /// Reads every `*.json` profile file in `directory` (sorted filename
    /// order) and merges all records into one store.
    pub fn load_dir(directory: &Path) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        paths.sort();

        let mut store = Self::new();
        for path in &paths {
            let content = fs::read_to_string(path)?;
            let document: ProfileDocument = match serde_json::from_str(&content) {
                Ok(document) => document,
                Err(error) => {
                    warn!(file = %path.display(), %error, "skipping unreadable profile file");
                    continue;
                }
            };
            for record in document.data {
                store.insert(record);
            }
        }

        info!(files = paths.len(), profiles = store.len(), "profile store built");
        Ok(store)
    }

    /// Height and weight for an athlete. With a birthdate the match must be
    /// exact; without one the first profile in birthdate order is used.
    pub fn lookup(
        &self,
        lastname: &str,
        firstname: &str,
        birthdate: Option<NaiveDate>,
    ) -> Option<Biometrics> {
        let by_birthdate = self.athletes.get(lastname)?.get(firstname)?;
        match birthdate {
            Some(date) => by_birthdate.get(&date).copied(),
            None => by_birthdate.values().next().copied(),
        }
    }

    /// Number of profile records in the store.
    pub fn len(&self) -> usize {
        self.athletes
            .values()
            .flat_map(|by_first| by_first.values())
            .map(|by_birth| by_birth.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str, last: &str, birthdate: &str, height: f64, weight: f64) -> ProfileRecord {
        ProfileRecord {
            firstname: first.to_string(),
            lastname: last.to_string(),
            height,
            weight,
            birthdate: birthdate.parse().unwrap(),
        }
    }

    #[test]
    fn exact_birthdate_lookup() {
        let store = ProfileStore::from_records([
            record("Jane", "DOE", "1990-01-01", 170.0, 60.0),
            record("Jane", "DOE", "1995-06-15", 180.0, 70.0),
        ]);

        let found = store
            .lookup("DOE", "Jane", Some("1995-06-15".parse().unwrap()))
            .unwrap();
        assert_eq!(found.height, 180.0);
        assert_eq!(found.weight, 70.0);
    }

    #[test]
    fn unknown_birthdate_degrades_to_first_sorted() {
        let store = ProfileStore::from_records([
            record("Jane", "DOE", "1995-06-15", 180.0, 70.0),
            record("Jane", "DOE", "1990-01-01", 170.0, 60.0),
        ]);

        let found = store.lookup("DOE", "Jane", None).unwrap();
        assert_eq!(found.height, 170.0);
    }

    #[test]
    fn wrong_birthdate_is_no_match() {
        let store = ProfileStore::from_records([record("Jane", "DOE", "1990-01-01", 170.0, 60.0)]);
        assert!(store
            .lookup("DOE", "Jane", Some("1991-01-01".parse().unwrap()))
            .is_none());
        assert!(store.lookup("ROE", "Jane", None).is_none());
    }
}
