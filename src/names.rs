use once_cell::sync::Lazy;
use regex::Regex;

// Surname tokens are fully upper-cased in source data, optionally with
// hyphens or apostrophes.
static SURNAME_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\-']+$").unwrap());

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\pL \-]").unwrap());

/// Strips characters that never belong in a name, keeping letters, spaces
/// and hyphens, and collapses runs of whitespace.
pub fn fix_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    DISALLOWED.replace_all(&collapsed, "").into_owned()
}

/// Splits a free-text athlete name into `(firstname, lastname)`.
///
/// Names come in the shapes `LASTNAME Firstname`, `LAST NAME Firstname`,
/// `LAST-NAME Firstname`, `O'LASTNAME Firstname` and `McLASTNAME Firstname`,
/// sometimes suffixed with an asterisk annotation. Tokens are scanned from
/// the end of the string backward; the rightmost surname-like token marks
/// the boundary. Everything through the boundary is the surname
/// (upper-cased), the rest is the given name.
///
/// Returns `None` when no boundary can be determined, including for
/// single-token inputs, which are ambiguous. Callers skip the record.
pub fn olympic_name(raw: &str) -> Option<(String, String)> {
    let name = fix_name(raw);
    let tokens: Vec<&str> = name.split_whitespace().collect();

    for index in (0..tokens.len()).rev() {
        // The Mc prefix is folded to uppercase for matching purposes only.
        let candidate = tokens[index].replace('*', "").replace("Mc", "MC");
        if SURNAME_TOKEN.is_match(&candidate) {
            let lastname = tokens[..=index].join(" ").to_uppercase();
            let firstname = tokens[index + 1..].join(" ");
            if firstname.is_empty() {
                return None;
            }
            return Some((firstname, lastname));
        }
    }

    None
}
