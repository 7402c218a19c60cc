/// Versions of the hierarchical meet format this parser understands.
/// Field positions are version-locked, so anything else is fatal.
pub const SUPPORTED_LENEX_VERSIONS: &[&str] = &["2.0", "3.0"];

/// Delimiter for the database file. Meet names may contain commas.
pub const DATABASE_DELIMITER: u8 = b'|';

/// Placeholder written for unresolved biometric fields in include-N/A mode.
pub const ABSENT_VALUE: &str = "N/A";

/// Yards to meters.
pub const YARDS_PER_METER: f64 = 0.9144;

// The Olympics spreadsheet export covers exactly one meet, so its
// meet context is fixed.
pub const OLYMPIC_MEET_NAME: &str = "2016 Olympics";
pub const OLYMPIC_CITY: &str = "Rio de Janeiro";
