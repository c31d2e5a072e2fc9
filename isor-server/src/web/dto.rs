//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{PositionRecord, RouteText};

/// Request to refresh a list of locomotives.
#[derive(Debug, Deserialize)]
pub struct FleetRequest {
    /// Locomotive numbers (6, 7 or 12 digits)
    pub numbers: Vec<String>,
}

/// One locomotive in a fleet response.
#[derive(Debug, Serialize)]
pub struct FleetEntry {
    #[serde(flatten)]
    pub record: PositionRecord,

    /// Reserved for a train, or moved within the last day
    pub active: bool,
}

/// Response to a fleet refresh.
#[derive(Debug, Serialize)]
pub struct FleetResponse {
    pub locomotives: Vec<FleetEntry>,

    /// Number of active locomotives
    pub active_count: usize,
}

impl FleetResponse {
    /// Classify `records` as active or idle relative to `now`.
    pub fn new(records: Vec<PositionRecord>, now: NaiveDateTime) -> Self {
        let locomotives: Vec<_> = records
            .into_iter()
            .map(|record| FleetEntry {
                active: record.is_active(now),
                record,
            })
            .collect();
        let active_count = locomotives.iter().filter(|e| e.active).count();

        Self {
            locomotives,
            active_count,
        }
    }
}

/// Response to a train query.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TrainResponse {
    Route { route: String },
    Failure { error: String },
}

impl From<RouteText> for TrainResponse {
    fn from(route: RouteText) -> Self {
        match route {
            RouteText::Route(route) => TrainResponse::Route { route },
            other => TrainResponse::Failure {
                error: other.as_text().to_string(),
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}
