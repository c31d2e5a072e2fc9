//! Scraped position record.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::locomotive::LocoNumber;

/// Placeholder used when a locomotive has no current or reserved train.
pub const NO_TRAIN: &str = "---";

/// Format of the portal's timestamps (Central European local time).
pub const PORTAL_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Time zone of the portal's timestamps.
pub const PORTAL_TIME_ZONE: Tz = chrono_tz::Europe::Prague;

/// Wall-clock time at the portal for `instant`.
///
/// This is the `now` to compare scraped timestamps against.
pub fn portal_time(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&PORTAL_TIME_ZONE).naive_local()
}

/// How long after its last movement a locomotive still counts as active.
const ACTIVE_WINDOW_HOURS: i64 = 24;

/// The fields scraped from a locomotive query page.
///
/// Every field has a well-defined empty value, so a page that could not be
/// parsed at all still yields a usable (if uninformative) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedPosition {
    /// Function of the locomotive in its train (e.g. `1. vedoucí HV`).
    pub function: String,
    /// Current train number, or [`NO_TRAIN`].
    pub train_number: String,
    /// Next reserved train number, or [`NO_TRAIN`].
    pub reservation: String,
    /// Last known station (may carry a `+`/`-` prefix from the portal).
    pub place: String,
    /// Last known timestamp as printed by the portal.
    pub time: String,
}

impl Default for ScrapedPosition {
    fn default() -> Self {
        Self {
            function: String::new(),
            train_number: NO_TRAIN.to_string(),
            reservation: NO_TRAIN.to_string(),
            place: String::new(),
            time: String::new(),
        }
    }
}

/// Position and assignment of a single locomotive.
///
/// Built once per query and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    id: String,
    full_id: String,
    color: Option<String>,
    #[serde(flatten)]
    scraped: ScrapedPosition,
}

impl PositionRecord {
    /// Build a record from the locomotive identity and the scraped fields.
    pub fn new(loco: &LocoNumber, color: Option<String>, scraped: ScrapedPosition) -> Self {
        Self {
            id: loco.display_id(),
            full_id: loco.full().to_string(),
            color,
            scraped,
        }
    }

    /// A record carrying only identity and color.
    pub fn unknown(loco: &LocoNumber, color: Option<String>) -> Self {
        Self::new(loco, color, ScrapedPosition::default())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn full_id(&self) -> &str {
        &self.full_id
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn function(&self) -> &str {
        &self.scraped.function
    }

    pub fn train_number(&self) -> &str {
        &self.scraped.train_number
    }

    pub fn reservation(&self) -> &str {
        &self.scraped.reservation
    }

    pub fn place(&self) -> &str {
        &self.scraped.place
    }

    pub fn time(&self) -> &str {
        &self.scraped.time
    }

    /// Whether anything beyond identity was scraped.
    pub fn has_position(&self) -> bool {
        !self.scraped.time.is_empty()
    }

    /// Parse the portal timestamp, if present and well-formed.
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.scraped.time, PORTAL_TIME_FORMAT).ok()
    }

    /// A locomotive is active if it has a reservation or moved recently.
    ///
    /// `now` must be in the portal's local time, see [`portal_time`].
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        if self.scraped.reservation != NO_TRAIN {
            return true;
        }

        self.parsed_time()
            .is_some_and(|t| now - t <= chrono::Duration::hours(ACTIVE_WINDOW_HOURS))
    }
}
