use std::path::PathBuf;
use std::sync::Arc;

use swimdb::measures;
use swimdb::pipeline::sources::OlympicsFile;
use swimdb::profiles::{ProfileRecord, ProfileStore};

fn grid(rows: &[Vec<&str>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn header() -> Vec<&'static str> {
    vec![
        "Event", "Round", "Stroke", "Event ID", "Distance", "Gender", "Rank", "Heat", "Lane",
        "Name", "Birth Year", "Nation", "Time",
    ]
}

fn profiles() -> Arc<ProfileStore> {
    Arc::new(ProfileStore::from_records([ProfileRecord {
        firstname: "Jane".to_string(),
        lastname: "DOE".to_string(),
        height: 180.0,
        weight: 70.0,
        birthdate: "1995-06-15".parse().unwrap(),
    }]))
}

fn open(grid_rows: Vec<Vec<String>>, with_na: bool) -> OlympicsFile {
    OlympicsFile::from_grid(PathBuf::from("results.xlsx"), &grid_rows, profiles(), with_na)
}

#[test]
fn decodes_participants_with_synthetic_seconds_column() {
    let mut rows = vec![header()];
    rows.push(vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "0:58.50",
    ]);
    let file = open(grid(&rows), false);

    assert_eq!(file.participants().len(), 1);
    let participant = &file.participants()[0];
    assert_eq!(participant.event_id, 4);
    assert_eq!(participant.distance, 100.0);
    assert_eq!(participant.rank, "1");
    assert_eq!(participant.lane, "4");
    assert_eq!(participant.birthyear, "1995");
    assert_eq!(participant.firstname, "Jane");
    assert_eq!(participant.lastname, "DOE");
    assert_eq!(participant.swimtime, "0:58.50");
    assert_eq!(participant.seconds, Some(58.5));
}

#[test]
fn trailing_empty_header_cells_are_excluded() {
    let mut head = header();
    head.push("");
    head.push("");
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "0:58.50",
        "stray",
        "stray",
    ];
    let file = open(grid(&[head, data]), false);

    // Data beyond the active columns never reaches the participant.
    assert_eq!(file.participants().len(), 1);
    assert_eq!(file.participants()[0].seconds, Some(58.5));
}

#[test]
fn plain_numeric_time_is_duplicated_not_converted() {
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "58.50",
    ];
    let file = open(grid(&[header(), data]), false);

    let participant = &file.participants()[0];
    assert_eq!(participant.swimtime, "58.50");
    assert_eq!(participant.seconds, Some(58.5));
}

#[test]
fn unmatched_names_are_skipped_and_counted() {
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "Doe Jane",
        "1995.0",
        "USA",
        "0:58.50",
    ];
    let file = open(grid(&[header(), data]), false);

    assert!(file.participants().is_empty());
    let extraction = file.results_csv();
    assert_eq!(extraction.skips.unmatched_name, 1);
}

#[test]
fn rows_join_profiles_with_fixed_meet_context() {
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "0:58.50",
    ];
    let file = open(grid(&[header(), data]), false);
    let extraction = file.results_csv();

    assert_eq!(extraction.rows.len(), 1);
    let row = &extraction.rows[0];
    assert_eq!(row.meet, "2016 Olympics");
    assert_eq!(row.city, "Rio de Janeiro");
    assert_eq!(row.course, "LCM");
    assert_eq!(row.nation, "USA");
    assert_eq!(row.event_id, "4");
    assert_eq!(row.swimtime, 58.5);

    let expected = measures::derive(100.0, 58.5, 180.0, 70.0);
    assert_eq!(row.bmi, Some(expected.bmi));
}

#[test]
fn no_time_and_no_profile_rows_are_dropped() {
    let no_time = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "DNS",
    ];
    let no_profile = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "2.0",
        "2",
        "5.0",
        "ROE Amy",
        "1993.0",
        "CAN",
        "0:59.10",
    ];
    let file = open(grid(&[header(), no_time, no_profile]), false);
    let extraction = file.results_csv();

    assert!(extraction.rows.is_empty());
    assert_eq!(extraction.skips.no_time, 1);
    assert_eq!(extraction.skips.no_profile, 1);
}

#[test]
fn include_na_mode_emits_absent_biometrics() {
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "2.0",
        "2",
        "5.0",
        "ROE Amy",
        "1993.0",
        "CAN",
        "0:59.10",
    ];
    let file = open(grid(&[header(), data]), true);
    let extraction = file.results_csv();

    assert_eq!(extraction.rows.len(), 1);
    let row = &extraction.rows[0];
    assert_eq!(row.height, None);
    assert_eq!(row.weight, None);
    assert_eq!(row.bmi, None);
    assert_eq!(row.to_record()[12], "N/A");
}

#[test]
fn stage_filter_has_no_effect_on_single_round_data() {
    let data = vec![
        "Women's 100m Freestyle",
        "FIN",
        "FREE",
        "4.0",
        "100.0",
        "Women",
        "1.0",
        "2",
        "4.0",
        "DOE Jane",
        "1995.0",
        "USA",
        "0:58.50",
    ];
    let file = open(grid(&[header(), data]), false);

    assert_eq!(file.allresults_csv(None).rows.len(), 1);
    assert_eq!(file.allresults_csv(Some("PRE")).rows.len(), 1);
}
