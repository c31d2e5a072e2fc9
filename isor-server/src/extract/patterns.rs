//! Compiled patterns for scraping portal pages.
//!
//! The portal renders its answers as fixed-width text inside `<pre>`
//! blocks. None of these patterns is a contract; they describe what the
//! pages have looked like so far.

use std::sync::LazyLock;

use regex::Regex;

/// Heading that precedes the reservation table on a locomotive page.
pub(super) const RESERVATION_HEADING: &str = "stanice zahájení     funkce               vlak   stanice cílová/odst  stanice zahájení     funkce               vlak   stanice cílová/odst";

/// Width of the row counter (`dddd `) in front of the place column.
pub(super) const ROW_PREFIX_LEN: usize = 5;

/// Width of the vehicle number (`ddddd dddddd-d`) in front of a last known position.
pub(super) const LOCO_PREFIX_LEN: usize = 14;

/// A current position row: counter, signed place, date, time, train, function.
pub(super) static CURRENT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d\d\d\d [+|-]\D* \d\d.\d\d.\d\d\d\d \d\d:\d\d \d\d\d\d\d\d \d.\D*")
        .expect("current row regex is valid") // Static pattern, safe to panic
});

/// Function of the locomotive within its train, e.g. `1. vedoucí HV`.
pub(super) static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d\. \D* HV").expect("function regex is valid") // Static pattern, safe to panic
});

/// Place column: everything up to the last space before the next digit.
pub(super) static PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\D* ").expect("place regex is valid") // Static pattern, safe to panic
});

/// Portal timestamp, `dd.mm.yyyy hh:mm`.
pub(super) static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d\d.\d\d.\d\d\d\d \d\d:\d\d").expect("date regex is valid") // Static pattern, safe to panic
});

/// Zero-padded six digit train number surrounded by spaces.
pub(super) static TRAIN_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" \d\d\d\d\d\d ").expect("train number regex is valid") // Static pattern, safe to panic
});

/// Last known position: vehicle number, place, timestamp.
pub(super) static LAST_KNOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d\d\d\d\d \d\d\d\d\d\d-\d  \D*[\+\-]?.*\d\d.\d\d.\d\d\d\d \d\d:\d\d")
        .expect("last known position regex is valid") // Static pattern, safe to panic
});

/// The route block of a train page. Greedy: first `<pre>` to last `</pre>`.
pub(super) static ROUTE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<pre>(.*)</pre>").expect("route regex is valid") // Static pattern, safe to panic
});
