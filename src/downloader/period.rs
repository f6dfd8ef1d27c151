use crate::constants::{MONTHS, MONTH_REGEX_PATTERN, YEAR_REGEX_PATTERN};
use crate::models::Period;
use regex::Regex;
use std::sync::OnceLock;

/// Cached regex for the four-digit year run.
/// Compiled once at initialization for performance.
static YEAR_REGEX: OnceLock<Regex> = OnceLock::new();

/// Cached regex for the one-or-two-digit month run.
static MONTH_REGEX: OnceLock<Regex> = OnceLock::new();

/// Normalizes free-form human period input into a [`Period`].
///
/// Accepts anything a person might type for a month/year: `"março 2024"`,
/// `"03/2024"`, `"2024-03"`, `"Marco de 2024"`, or just `"2024"`.
///
/// Extraction rules, in order:
/// 1. The first four-digit run is the year.
/// 2. With the year digits removed (so they cannot be mistaken for a month),
///    the first one-or-two-digit run, zero-padded, is the month number.
/// 3. Failing that, the month table is scanned in 01→12 order for a full
///    name or its three-letter prefix anywhere in the lowercased input.
///
/// Unresolvable fields are left absent; this function never fails. Note that
/// when several month names appear in the input, the table order decides,
/// not the position in the string.
pub fn parse_period(input: &str) -> Period {
    let year_regex = YEAR_REGEX.get_or_init(|| {
        Regex::new(YEAR_REGEX_PATTERN).expect("YEAR_REGEX_PATTERN is a valid regex pattern")
    });
    let month_regex = MONTH_REGEX.get_or_init(|| {
        Regex::new(MONTH_REGEX_PATTERN).expect("MONTH_REGEX_PATTERN is a valid regex pattern")
    });

    let year = year_regex.find(input).map(|m| m.as_str().to_string());

    // Strip the year digits before looking for a numeric month
    let cleaned = match &year {
        Some(y) => input.replace(y.as_str(), ""),
        None => input.to_string(),
    };

    let mut month_number = month_regex
        .find(&cleaned)
        .map(|m| format!("{:0>2}", m.as_str()));

    if month_number.is_none() {
        let lowered = input.to_lowercase();
        for (number, name) in MONTHS {
            if lowered.contains(name) || lowered.contains(&name[..3]) {
                month_number = Some((*number).to_string());
                break;
            }
        }
    }

    let month_name = month_number.as_deref().and_then(Period::month_name_for);

    Period {
        year,
        month_number,
        month_name,
    }
}
