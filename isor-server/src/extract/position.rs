//! Position extraction from a locomotive query page.
//!
//! The page is processed by a chain of small stages. Each stage takes the
//! text left over by the previous one and returns what it matched together
//! with the offset just past the match. The strict branch reads the current
//! position row; whenever one of its required stages fails, the looser
//! last-known-position branch is used instead. Reservations are looked up
//! independently of the branch taken.
//!
//! Extraction never fails: an unrecognised page yields the default
//! [`ScrapedPosition`].

use tracing::debug;

use crate::domain::{NO_TRAIN, ScrapedPosition};

use super::patterns::{
    CURRENT_ROW, DATE_TIME, FUNCTION, LAST_KNOWN, LOCO_PREFIX_LEN, PLACE, RESERVATION_HEADING,
    ROW_PREFIX_LEN, TRAIN_NUMBER,
};

/// A stage match: the matched text (trimmed) and the offset just past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    end: usize,
}

/// Position fields read from the current position row.
#[derive(Debug, PartialEq, Eq)]
struct CurrentPosition {
    function: String,
    place: String,
    time: String,
    train_number: String,
}

/// Place and time read from a last known position fragment.
#[derive(Debug, PartialEq, Eq)]
struct LastKnownPosition {
    place: String,
    time: String,
}

/// Extract the position of a locomotive from its query page.
pub fn extract_position(html: &str) -> ScrapedPosition {
    let mut scraped = ScrapedPosition::default();

    match current_position(html) {
        Some(current) => {
            scraped.function = current.function;
            scraped.place = current.place;
            scraped.time = current.time;
            scraped.train_number = current.train_number;
        }
        None => {
            debug!("no current position row, looking for last known position");
            match last_known_position(html) {
                Some(last) => {
                    scraped.place = last.place;
                    scraped.time = last.time;
                }
                None => debug!("no last known position either"),
            }
        }
    }

    let candidates = reservation_candidates(html);
    scraped.reservation = select_reservation(&candidates, &scraped.train_number);

    scraped
}

/// Strict branch: every stage but the function is required.
fn current_position(html: &str) -> Option<CurrentPosition> {
    let row = current_row(html)?;
    let function = function(row).unwrap_or_default();

    let rest = row.get(ROW_PREFIX_LEN..)?;
    let place = place(rest)?;

    let rest = &rest[place.end..];
    let time = date_time(rest)?;

    let rest = &rest[time.end..];
    let train = train_number(rest)?;

    Some(CurrentPosition {
        function: function.to_string(),
        place: place.text.to_string(),
        time: time.text.to_string(),
        train_number: strip_train_padding(train.text),
    })
}

fn current_row(html: &str) -> Option<&str> {
    CURRENT_ROW.find(html).map(|m| m.as_str().trim())
}

fn function(row: &str) -> Option<&str> {
    FUNCTION.find(row).map(|m| m.as_str().trim())
}

fn place(rest: &str) -> Option<Token<'_>> {
    token(&PLACE, rest)
}

fn date_time(rest: &str) -> Option<Token<'_>> {
    token(&DATE_TIME, rest)
}

fn train_number(rest: &str) -> Option<Token<'_>> {
    token(&TRAIN_NUMBER, rest)
}

fn token<'a>(re: &regex::Regex, text: &'a str) -> Option<Token<'a>> {
    let m = re.find(text)?;
    let trimmed = m.as_str().trim();
    if m.as_str().is_empty() {
        return None;
    }
    Some(Token {
        text: trimmed,
        end: m.end(),
    })
}

/// Fallback branch: vehicle number, place and timestamp on one fragment.
fn last_known_position(html: &str) -> Option<LastKnownPosition> {
    let fragment = LAST_KNOWN.find(html)?.as_str();
    let time = DATE_TIME.find(fragment)?.as_str();

    // The fragment ends with the timestamp; drop it and the vehicle number.
    let trimmed = fragment.trim();
    let body = trimmed
        .get(LOCO_PREFIX_LEN..trimmed.len().saturating_sub(time.len()))
        .unwrap_or_default()
        .trim();

    let place = place_from_fragment(body).unwrap_or_default();
    if place.is_empty() {
        debug!(fragment = body, "no place in last known position");
    }

    Some(LastKnownPosition {
        place,
        time: time.to_string(),
    })
}

/// Place within a last known position fragment.
///
/// A signed station (` +NAME` / ` -NAME`) wins; otherwise the columns are
/// separated by runs of two spaces and the place is the second one.
fn place_from_fragment(body: &str) -> Option<String> {
    for sign in ['+', '-'] {
        let marker = format!(" {sign}");
        if let Some(suffix) = body.split(marker.as_str()).nth(1) {
            return Some(format!("{sign}{}", suffix.trim()));
        }
    }

    body.split("  ")
        .filter(|segment| !segment.is_empty())
        .nth(1)
        .map(|segment| segment.trim().to_string())
}

/// Train numbers listed after the reservation heading, in page order.
fn reservation_candidates(html: &str) -> Vec<String> {
    let Some(start) = html.find(RESERVATION_HEADING) else {
        return Vec::new();
    };

    TRAIN_NUMBER
        .find_iter(&html[start..])
        .take(2)
        .map(|m| strip_train_padding(m.as_str().trim()))
        .collect()
}

/// Pick the next reservation given the current train number.
///
/// The first table entry usually restates the current assignment, so the
/// second entry is consulted when the first one equals the current train.
pub fn select_reservation(candidates: &[String], current_train: &str) -> String {
    candidates
        .iter()
        .take(2)
        .find(|candidate| candidate.as_str() != current_train)
        .cloned()
        .unwrap_or_else(|| NO_TRAIN.to_string())
}

fn strip_train_padding(number: &str) -> String {
    number.trim_start_matches('0').to_string()
}
