use std::path::PathBuf;
use std::sync::Arc;

use swimdb::error::{PipelineError, CODE_MISSING_VERSION, CODE_UNSUPPORTED_VERSION};
use swimdb::measures;
use swimdb::pipeline::sources::LenexFile;
use swimdb::profiles::{ProfileRecord, ProfileStore};

const MEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<LENEX version="3.0">
  <MEETS>
    <MEET name="Test Open, 2019" city="Budapest" nation="HUN" course="LCM">
      <SESSIONS>
        <SESSION number="1">
          <EVENTS>
            <EVENT eventid="1" round="FIN">
              <SWIMSTYLE distance="100" stroke="FREE"/>
            </EVENT>
            <EVENT eventid="2" round="PRE">
              <SWIMSTYLE distance="200" stroke="BACK"/>
            </EVENT>
          </EVENTS>
        </SESSION>
      </SESSIONS>
      <CLUBS>
        <CLUB code="AAA" name="Alpha">
          <ATHLETES>
            <ATHLETE athleteid="10" firstname="Jane" lastname="DOE" gender="F" birthdate="1995-06-15">
              <RESULTS>
                <RESULT eventid="1" swimtime="00:00:58.50">
                  <SPLITS>
                    <SPLIT distance="50" swimtime="00:00:28.10"/>
                  </SPLITS>
                </RESULT>
                <RESULT eventid="2" swimtime="00:02:08.40"/>
              </RESULTS>
            </ATHLETE>
            <ATHLETE athleteid="11" firstname="Amy" lastname="ROE" gender="F" birthdate="1993-02-01">
              <RESULTS>
                <RESULT eventid="1" swimtime="NT"/>
              </RESULTS>
            </ATHLETE>
            <ATHLETE athleteid="12" firstname="Eva" lastname="POE" gender="F" birthdate="1990-12-24">
              <RESULTS>
                <RESULT eventid="1" swimtime="59.99"/>
              </RESULTS>
            </ATHLETE>
          </ATHLETES>
        </CLUB>
      </CLUBS>
    </MEET>
  </MEETS>
</LENEX>
"#;

fn profiles() -> Arc<ProfileStore> {
    Arc::new(ProfileStore::from_records([ProfileRecord {
        firstname: "Jane".to_string(),
        lastname: "DOE".to_string(),
        height: 180.0,
        weight: 70.0,
        birthdate: "1995-06-15".parse().unwrap(),
    }]))
}

fn open(xml: &str, with_na: bool) -> LenexFile {
    LenexFile::from_text(PathBuf::from("meet.xml"), xml, profiles(), with_na).unwrap()
}

#[test]
fn reads_meet_sessions_and_events() {
    let file = open(MEET_XML, false);

    let meet = file.meet();
    assert_eq!(meet.name, "Test Open, 2019");
    assert_eq!(meet.city, "Budapest");
    assert_eq!(meet.nation, "HUN");
    assert_eq!(meet.course.as_str(), "LCM");

    assert_eq!(file.sessions().len(), 1);
    assert_eq!(file.events(None).len(), 2);
    assert_eq!(file.events(Some("fin")).len(), 1);

    let event = file.event(1).unwrap();
    let style = event.style.as_ref().unwrap();
    assert_eq!(style.distance, 100.0);
    assert_eq!(style.stroke, "FREE");
    assert_eq!(event.round, "FIN");
}

#[test]
fn reads_athletes_with_entries_results_and_splits() {
    let file = open(MEET_XML, false);
    assert_eq!(file.clubs().len(), 1);
    assert_eq!(file.athletes().len(), 3);

    let jane = &file.athletes()[0];
    assert_eq!(jane.vitals.firstname, "Jane");
    assert_eq!(jane.results.len(), 2);
    assert_eq!(jane.results[0].seconds, Some(58.5));
    assert_eq!(jane.results[0].splits.len(), 1);
    assert_eq!(jane.results[0].splits[0].seconds, Some(28.1));

    // A bare-seconds swim time is taken literally.
    let eva = &file.athletes()[2];
    assert_eq!(eva.results[0].seconds, Some(59.99));
}

#[test]
fn results_join_profiles_and_drop_unresolved_rows() {
    let file = open(MEET_XML, false);
    let extraction = file.results_csv(1);

    // Jane has a profile; Amy has no time; Eva has no profile.
    assert_eq!(extraction.rows.len(), 1);
    assert_eq!(extraction.skips.no_time, 1);
    assert_eq!(extraction.skips.no_profile, 1);

    let row = &extraction.rows[0];
    assert_eq!(row.lastname, "DOE");
    assert_eq!(row.birthyear, "1995");
    let expected = measures::derive(100.0, 58.5, 180.0, 70.0);
    assert_eq!(row.bmi, Some(expected.bmi));
    assert_eq!(row.speed, Some(expected.speed));
    assert_eq!(row.speed_per_kg, Some(expected.speed_per_kg));
}

#[test]
fn include_na_mode_keeps_unresolved_rows() {
    let file = open(MEET_XML, true);
    let extraction = file.results_csv(1);

    assert_eq!(extraction.rows.len(), 2);
    let eva = extraction
        .rows
        .iter()
        .find(|row| row.lastname == "POE")
        .unwrap();
    assert_eq!(eva.height, None);
    assert_eq!(eva.bmi, None);
    assert_eq!(eva.swimtime, 59.99);
}

#[test]
fn allresults_concatenates_events_in_ascending_order() {
    let file = open(MEET_XML, false);
    let extraction = file.allresults_csv(None);
    assert_eq!(extraction.rows.len(), 2);

    let stage_limited = file.allresults_csv(Some("FIN"));
    assert_eq!(stage_limited.rows.len(), 1);
    assert_eq!(stage_limited.rows[0].event_id, "1");
}

#[test]
fn yards_course_distances_convert_to_meters() {
    let xml = MEET_XML.replace("course=\"LCM\"", "course=\"SCY\"");
    let file = open(&xml, false);

    let event = file.event(2).unwrap();
    let style = event.style.as_ref().unwrap();
    assert!((style.distance - 182.88).abs() < 1e-9);
}

#[test]
fn unsupported_version_is_fatal_with_code() {
    let xml = MEET_XML.replace("version=\"3.0\"", "version=\"1.0\"");
    let result = LenexFile::from_text(PathBuf::from("meet.xml"), &xml, profiles(), false);

    match result {
        Err(error @ PipelineError::UnsupportedVersion { .. }) => {
            assert_eq!(error.fatal_code(), Some(CODE_UNSUPPORTED_VERSION));
        }
        other => panic!("expected unsupported version error, got {other:?}"),
    }
}

#[test]
fn missing_version_is_fatal_with_code() {
    let xml = MEET_XML.replace(" version=\"3.0\"", "");
    let result = LenexFile::from_text(PathBuf::from("meet.xml"), &xml, profiles(), false);

    match result {
        Err(error @ PipelineError::MissingVersion { .. }) => {
            assert_eq!(error.fatal_code(), Some(CODE_MISSING_VERSION));
        }
        other => panic!("expected missing version error, got {other:?}"),
    }
}

#[test]
fn supported_versions_both_parse() {
    let xml = MEET_XML.replace("version=\"3.0\"", "version=\"2.0\"");
    assert!(LenexFile::from_text(PathBuf::from("meet.xml"), &xml, profiles(), false).is_ok());
}

#[test]
fn missing_swimstyle_drops_rows_without_aborting() {
    let xml = MEET_XML
        .replace("<SWIMSTYLE distance=\"100\" stroke=\"FREE\"/>", "")
        .to_string();
    let file = open(&xml, false);

    let extraction = file.results_csv(1);
    assert!(extraction.rows.is_empty());
    // Jane and Eva lose their event join; Amy already had no time.
    assert_eq!(extraction.skips.incomplete, 2);
    assert_eq!(extraction.skips.no_time, 1);
}
